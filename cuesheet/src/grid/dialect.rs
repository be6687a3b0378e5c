//! Delimited-text dialects and dialect sniffing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{GridError, GridResult};

/// Number of leading bytes inspected when sniffing.
pub const SNIFF_SAMPLE_BYTES: usize = 1024;

/// Delimiters considered by the sniffer, in fallback preference order.
const CANDIDATE_DELIMITERS: [u8; 5] = [b',', b'\t', b';', b'|', b':'];

/// Delimiter and quoting convention of a delimited text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialect {
    pub delimiter: u8,
    /// `None` disables quote handling.
    pub quote: Option<u8>,
}

impl Dialect {
    /// Comma separated, double-quoted.
    pub const EXCEL: Dialect = Dialect { delimiter: b',', quote: Some(b'"') };
    /// Tab separated, double-quoted.
    pub const EXCEL_TAB: Dialect = Dialect { delimiter: b'\t', quote: Some(b'"') };
    /// Comma separated, double-quoted (unix line endings are accepted by every dialect).
    pub const UNIX: Dialect = Dialect { delimiter: b',', quote: Some(b'"') };

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter, quote: Some(b'"') }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::EXCEL
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delimiter = match self.delimiter {
            b'\t' => "\\t".to_string(),
            d => (d as char).to_string(),
        };
        match self.quote {
            Some(q) => write!(f, "delimiter '{}', quote '{}'", delimiter, q as char),
            None => write!(f, "delimiter '{}', no quoting", delimiter),
        }
    }
}

impl FromStr for Dialect {
    type Err = GridError;

    /// Accepts a preset name (`excel`, `excel-tab`, `unix`) or a single
    /// delimiter character (`\t` spelled out is accepted too).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "excel" | "csv" => Ok(Self::EXCEL),
            "excel-tab" | "tsv" | "tab" | "\\t" => Ok(Self::EXCEL_TAB),
            "unix" => Ok(Self::UNIX),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii() && !c.is_ascii_alphanumeric() => {
                        Ok(Self::with_delimiter(c as u8))
                    }
                    _ => Err(GridError::Dialect(format!("unknown dialect '{s}'"))),
                }
            }
        }
    }
}

/// Take at most [`SNIFF_SAMPLE_BYTES`] of `content` on a char boundary.
pub fn sample(content: &str) -> &str {
    let mut end = content.len().min(SNIFF_SAMPLE_BYTES);
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

/// Sniff the dialect from the first [`SNIFF_SAMPLE_BYTES`] of `content`.
///
/// `preferred` wins when several delimiters fit equally well.
pub fn sniff(content: &str, preferred: u8) -> GridResult<Dialect> {
    let prefix = sample(content);
    let truncated = prefix.len() < content.len();
    let lines = sample_lines(prefix, truncated);
    if lines.is_empty() {
        return Err(GridError::Dialect("sample contains no data".to_string()));
    }

    if let Some(dialect) = guess_from_quotes(&lines, preferred) {
        debug!(%dialect, "dialect sniffed from quoted fields");
        return Ok(dialect);
    }

    match guess_from_consistency(&lines, preferred) {
        Some(dialect) => {
            debug!(%dialect, "dialect sniffed from delimiter frequency");
            Ok(dialect)
        }
        None => Err(GridError::Dialect(
            "no delimiter occurs consistently in the first lines".to_string(),
        )),
    }
}

/// Non-empty sample lines; a trailing partial line of a truncated sample is dropped.
fn sample_lines(prefix: &str, truncated: bool) -> Vec<&str> {
    let mut lines: Vec<&str> = prefix.split('\n').collect();
    if truncated && lines.len() > 1 {
        lines.pop();
    }
    lines
        .into_iter()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Look for quoted fields followed or preceded by a delimiter.
fn guess_from_quotes(lines: &[&str], preferred: u8) -> Option<Dialect> {
    let mut best: Option<(u8, u8, usize)> = None;

    for quote in [b'"', b'\''] {
        let q = quote as char;
        let patterns = [
            format!(r#"{q}[^{q}\n]*{q}[ ]?([^\w\n"'])"#),
            format!(r#"([^\w\n"'])[ ]?{q}[^{q}\n]*{q}"#),
        ];
        let mut counts: HashMap<u8, usize> = HashMap::new();
        for pattern in &patterns {
            let Ok(regex) = Regex::new(pattern) else {
                continue;
            };
            for line in lines {
                for capture in regex.captures_iter(line) {
                    if let Some(delimiter) = capture.get(1).and_then(|m| m.as_str().bytes().next()) {
                        if delimiter != b' ' && delimiter.is_ascii() {
                            *counts.entry(delimiter).or_default() += 1;
                        }
                    }
                }
            }
        }

        let winner = counts
            .iter()
            .max_by_key(|(d, n)| (**n, **d == preferred, candidate_rank(**d), **d))
            .map(|(d, n)| (*d, *n));
        if let Some((delimiter, hits)) = winner {
            if best.map_or(true, |(_, _, best_hits)| hits > best_hits) {
                best = Some((quote, delimiter, hits));
            }
        }
    }

    best.map(|(quote, delimiter, _)| Dialect { delimiter, quote: Some(quote) })
}

/// Higher for delimiters earlier in [`CANDIDATE_DELIMITERS`], zero for others.
fn candidate_rank(delimiter: u8) -> usize {
    CANDIDATE_DELIMITERS
        .iter()
        .position(|d| *d == delimiter)
        .map_or(0, |position| CANDIDATE_DELIMITERS.len() - position)
}

/// Pick the candidate whose per-line count is most consistent across lines.
fn guess_from_consistency(lines: &[&str], preferred: u8) -> Option<Dialect> {
    let mut order = vec![preferred];
    order.extend(CANDIDATE_DELIMITERS.iter().copied().filter(|d| *d != preferred));

    let scores: Vec<(u8, f64)> = order
        .iter()
        .filter_map(|&delimiter| {
            let counts: Vec<usize> = lines.iter().map(|line| count_unquoted(line, delimiter)).collect();
            let (mode, frequency) = mode(&counts)?;
            if mode == 0 {
                return None;
            }
            Some((delimiter, frequency as f64 / lines.len() as f64))
        })
        .collect();

    let mut threshold = 1.0;
    while threshold >= 0.9 - f64::EPSILON {
        if let Some((delimiter, _)) = scores.iter().find(|(_, ratio)| *ratio >= threshold - f64::EPSILON) {
            return Some(Dialect::with_delimiter(*delimiter));
        }
        threshold -= 0.01;
    }
    None
}

/// Occurrences of `delimiter` outside double quotes.
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut quoted = false;
    let mut count = 0;
    for byte in line.bytes() {
        if byte == b'"' {
            quoted = !quoted;
        } else if byte == delimiter && !quoted {
            count += 1;
        }
    }
    count
}

/// Most frequent value and how often it occurs; ties go to the larger value.
fn mode(values: &[usize]) -> Option<(usize, usize)> {
    let mut frequencies: HashMap<usize, usize> = HashMap::new();
    for value in values {
        *frequencies.entry(*value).or_default() += 1;
    }
    frequencies.into_iter().max_by_key(|(value, freq)| (*freq, *value))
}
