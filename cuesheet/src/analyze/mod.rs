//! Table analysis: cue table rows to [`StageRecord`]s.
//!
//! Row 0 is the header. Stage rows follow from row 1 and end at the first
//! row whose `stage` cell is absent or empty, or where the source runs out
//! of rows. Per row:
//!
//! 1. Stage fields resolve against the whole header.
//! 2. Auto-action fields resolve inside the auto zone only.
//! 3. Each code group resolves inside its own zone, so repeated labels in
//!    other groups are never seen.

pub mod columns;
pub mod zones;

use tracing::{debug, info};

use crate::error::GridResult;
use crate::grid::{is_blank, CellSource, CellValue};
use crate::models::{
    ActionFields, AutoActionRecord, CodeActionRecord, ColumnZone, StageEffects, StageRecord,
};

pub use columns::HeaderRow;
pub use zones::{column_index, column_letters, CodeGroupZone, TableZones, ZoneLayout};

/// Rows logged in detail at debug level.
const DEBUG_ROWS: usize = 5;

/// Extracts stage records from rows sharing one header.
#[derive(Debug, Clone)]
pub struct TableAnalyzer {
    header: HeaderRow,
    zones: TableZones,
}

impl TableAnalyzer {
    pub fn new(header: HeaderRow, layout: &ZoneLayout) -> Self {
        let zones = TableZones::carve(&header, layout);
        Self { header, zones }
    }

    pub fn header(&self) -> &HeaderRow {
        &self.header
    }

    pub fn zones(&self) -> &TableZones {
        &self.zones
    }

    /// Record for one row, or `None` when the row has no stage id.
    pub fn record(&self, row: &[CellValue]) -> Option<StageRecord> {
        let field = |name: &str| self.header.get(row, name, ColumnZone::ALL);

        let stage = field("stage");
        if is_blank(&stage) {
            return None;
        }
        let stage = stage.unwrap_or_default();

        let effects = StageEffects {
            none: field("no_effect"),
            rain: field("rain_effect"),
            snow: field("snow_effect"),
            wind: field("wind_effect"),
            storm: field("storm_effect"),
            sun: field("sun_effect"),
        };

        let auto = self.zones.auto;
        let auto_actions = AutoActionRecord {
            zone: auto,
            actions: ActionFields::resolve(|name| self.header.get(row, name, auto)),
        };

        let code_actions = self
            .zones
            .code_groups
            .iter()
            .map(|group| self.code_action(row, group))
            .collect();

        Some(StageRecord {
            next: field("next"),
            meifile: field("meifile"),
            default_cue: field("default_cue"),
            stage,
            effects,
            auto_actions,
            code_actions,
        })
    }

    /// Code actions carry no secondary MIDI timing: `midi2` and `delay`
    /// stay absent whatever the zone holds.
    ///
    /// `v.background` is kept: a code group with that column fills
    /// `climb:action_background_visual` in its actions document. Every other
    /// field also resolves inside the zone.
    fn code_action(&self, row: &[CellValue], group: &CodeGroupZone) -> CodeActionRecord {
        let Some(zone) = group.zone else {
            return CodeActionRecord::unmapped(group.group);
        };
        let lookup = |name: &str| self.header.get(row, name, zone);
        let mut actions = ActionFields::resolve(lookup);
        actions.midi2 = None;
        actions.delay = None;

        CodeActionRecord {
            group: group.group,
            header: self.header.label(zone.begin),
            trigger: row.get(zone.begin).cloned().flatten(),
            name: lookup("name"),
            zone: Some(zone),
            actions,
        }
    }
}

/// Analyze a whole table.
///
/// Only source errors other than out-of-range are returned.
pub fn analyze_table<S: CellSource + ?Sized>(
    source: &S,
    layout: &ZoneLayout,
) -> GridResult<Vec<StageRecord>> {
    let header = HeaderRow::new(source.row(0).values()?);
    debug!(columns = header.len(), "header row read");
    let analyzer = TableAnalyzer::new(header, layout);

    let mut records = Vec::new();
    for row in source.rows(1) {
        let row = row?;
        let values = row.values()?;
        if row.index() <= DEBUG_ROWS {
            debug!(?row, "stage row");
        }
        match analyzer.record(&values) {
            Some(record) => records.push(record),
            None => {
                info!(row = row.index(), "blank stage id, end of stage rows");
                break;
            }
        }
    }

    info!(stages = records.len(), "table analyzed");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{DelimitedGrid, Dialect, SourceFormat};

    fn csv(content: &str) -> DelimitedGrid {
        DelimitedGrid::from_bytes(content.as_bytes(), SourceFormat::Csv, Some(Dialect::EXCEL)).unwrap()
    }

    #[test]
    fn test_minimal_table() {
        let grid = DelimitedGrid::from_bytes(
            b"stage,next,mc1:\n\"A\",\"B\",\"X\"\n",
            SourceFormat::Csv,
            None,
        )
        .unwrap();
        let records = analyze_table(&grid, &ZoneLayout::default()).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.stage, "A");
        assert_eq!(record.next.as_deref(), Some("B"));
        assert!(record.auto_actions.actions.is_empty());

        assert_eq!(record.code_actions.len(), 5);
        let group = &record.code_actions[0];
        assert_eq!(group.zone, Some(ColumnZone::new(2, 3)));
        assert_eq!(group.header.as_deref(), Some("mc1:"));
        assert_eq!(group.trigger.as_deref(), Some("X"));
        assert!(group.name.is_none());
        assert!(record.code_actions[1..].iter().all(|g| g.zone.is_none() && g.trigger.is_none()));
    }

    #[test]
    fn test_blank_stage_ends_table() {
        let grid = csv("stage,next\nS1,S2\nS2,S3\nS3,S1\n,S9\nS9,S1\n");
        let records = analyze_table(&grid, &ZoneLayout::default()).unwrap();
        let stages: Vec<&str> = records.iter().map(|r| r.stage.as_str()).collect();
        assert_eq!(stages, vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn test_blank_line_ends_table() {
        let grid = csv("stage,next\nS1,S2\n\nS9,S1\n");
        assert_eq!(grid.extent(), (4, 2));
        let records = analyze_table(&grid, &ZoneLayout::default()).unwrap();
        let stages: Vec<&str> = records.iter().map(|r| r.stage.as_str()).collect();
        assert_eq!(stages, vec!["S1"]);
    }

    #[test]
    fn test_short_row_without_stage_ends_table() {
        let grid = csv("next,stage\nS2,S1\nS3\nS4,S4\n");
        let records = analyze_table(&grid, &ZoneLayout::default()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_end_of_data_is_not_an_error() {
        let grid = csv("stage,next\nS1,S2\nS2,S1\n");
        let records = analyze_table(&grid, &ZoneLayout::default()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_stage_fields_and_effects() {
        let grid = csv(
            "stage,next,meifile,default_cue,no_effect,rain_effect,sun_effect\n\
             S1,S2,s1.mei,S3,1,0,\n",
        );
        let records = analyze_table(&grid, &ZoneLayout::default()).unwrap();
        let record = &records[0];
        assert_eq!(record.meifile.as_deref(), Some("s1.mei"));
        assert_eq!(record.default_cue.as_deref(), Some("S3"));
        assert_eq!(record.effects.none.as_deref(), Some("1"));
        assert_eq!(record.effects.rain.as_deref(), Some("0"));
        assert_eq!(record.effects.sun.as_deref(), Some(""));
        assert_eq!(record.effects.snow, None);
    }

    /// Header laid out like the production sheets: stage columns A..J,
    /// auto columns K..R, then code groups.
    fn production_header() -> Vec<&'static str> {
        let mut header = vec![
            "stage", "next", "meifile", "no_effect", "rain_effect", "snow_effect", "wind_effect",
            "storm_effect", "sun_effect", "default_cue",
        ];
        header.extend(["cue", "midi", "midi2", "delay", "monitor", "v.animate", "v.background", "app"]);
        header.extend(["app", "mc1:", "name", "cue", "midi", "midi2", "delay", "v.background"]);
        header.extend(["mc2:", "name", "cue", "app"]);
        header
    }

    #[test]
    fn test_zones_isolate_repeated_labels() {
        let header = production_header();
        let mut row: Vec<String> = header.iter().enumerate().map(|(i, _)| format!("c{i}")).collect();
        row[0] = "S1".to_string();
        let content = format!("{}\n{}\n", header.join(","), row.join(","));
        let grid = csv(&content);

        let records = analyze_table(&grid, &ZoneLayout::default()).unwrap();
        let record = &records[0];

        let auto = &record.auto_actions.actions;
        assert_eq!(auto.cue.as_deref(), Some("c10"));
        assert_eq!(auto.midi2.as_deref(), Some("c12"));
        assert_eq!(auto.delay.as_deref(), Some("c13"));
        assert_eq!(auto.background.as_deref(), Some("c16"));
        // Column S (18) repeats "app" but is past the auto block
        assert_eq!(auto.app.as_deref(), Some("c17"));
        assert_eq!(auto.code_visual, None);

        let mc1 = &record.code_actions[0];
        assert_eq!(mc1.zone, Some(ColumnZone::new(19, 26)));
        assert_eq!(mc1.trigger.as_deref(), Some("c19"));
        assert_eq!(mc1.name.as_deref(), Some("c20"));
        assert_eq!(mc1.actions.cue.as_deref(), Some("c21"));
        assert_eq!(mc1.actions.midi.as_deref(), Some("c22"));
        assert_eq!(mc1.actions.midi2, None);
        assert_eq!(mc1.actions.delay, None);
        assert_eq!(mc1.actions.background.as_deref(), Some("c25"));
        assert_eq!(mc1.actions.app, None);

        let mc2 = &record.code_actions[1];
        assert_eq!(mc2.zone, Some(ColumnZone::new(26, 30)));
        assert_eq!(mc2.name.as_deref(), Some("c27"));
        assert_eq!(mc2.actions.cue.as_deref(), Some("c28"));
        assert_eq!(mc2.actions.app.as_deref(), Some("c29"));
        assert_eq!(mc2.actions.midi, None);
    }

    #[test]
    fn test_records_are_detached() {
        let records = {
            let grid = csv("stage,next\nS1,S2\n");
            analyze_table(&grid, &ZoneLayout::default()).unwrap()
        };
        assert_eq!(records[0].stage, "S1");
    }

    #[test]
    fn test_empty_source() {
        let grid = csv("");
        assert!(analyze_table(&grid, &ZoneLayout::default()).unwrap().is_empty());
    }

    #[test]
    fn test_workbook_numbers_and_booleans() {
        use crate::grid::testing::{write_xlsx, XCell};
        use crate::grid::WorkbookGrid;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cues.xlsx");
        write_xlsx(
            &path,
            &[
                vec![XCell::text("stage"), XCell::text("next"), XCell::text("rain_effect")],
                vec![XCell::number("42"), XCell::number("3.5"), XCell::boolean(true)],
            ],
        );
        let grid = WorkbookGrid::open(&path).unwrap();
        let records = analyze_table(&grid, &ZoneLayout::default()).unwrap();
        assert_eq!(records[0].stage, "42");
        assert_eq!(records[0].next.as_deref(), Some("3.5"));
        assert_eq!(records[0].effects.rain.as_deref(), Some("True"));
    }
}
