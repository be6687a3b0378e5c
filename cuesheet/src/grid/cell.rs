//! Cell value normalization.
//!
//! Every source resolves a cell to [`CellValue`]: absent or text. Native
//! representations are collapsed to text here and nowhere else, so the lossy
//! rules live in one pure function.

use tracing::warn;

/// Resolved content of one cell.
pub type CellValue = Option<String>;

/// A cell as the underlying format reports it, before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeValue<'a> {
    /// Empty or null cell.
    Empty,
    /// Text, taken as-is.
    Text(&'a str),
    /// Whole number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Anything else, tagged with a short type code (`d` date, `e` error, ...).
    Other(&'static str),
}

/// Collapse a native value to text or absent.
///
/// - empty → absent
/// - text → as-is
/// - numbers → their text rendering (`42`, `3.0`, `2.5`)
/// - booleans → `"True"` / `"False"`
/// - other → `"????<tag>"` placeholder
pub fn normalize(value: NativeValue<'_>) -> CellValue {
    match value {
        NativeValue::Empty => None,
        NativeValue::Text(text) => Some(text.to_string()),
        NativeValue::Int(number) => Some(number.to_string()),
        NativeValue::Float(number) => Some(render_float(number)),
        NativeValue::Bool(flag) => Some(if flag { "True" } else { "False" }.to_string()),
        NativeValue::Other(tag) => {
            warn!(tag, "unrecognized cell type, substituting placeholder");
            Some(format!("????{tag}"))
        }
    }
}

/// Floats always keep a fractional part, so `3.0` stays `"3.0"`.
fn render_float(number: f64) -> String {
    if number.is_nan() {
        "nan".to_string()
    } else if number.is_infinite() {
        if number > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if number.fract() == 0.0 && number.abs() < 1e16 {
        format!("{number:.1}")
    } else {
        number.to_string()
    }
}

/// True when the cell holds no usable text (absent or empty string).
pub fn is_blank(value: &CellValue) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}
