//! Reference pile database and pile matching.
//!
//! The reference database holds one sheet (or CSV export) per building with a
//! title row above the header row. Each building is loaded into a
//! [`ReferenceTable`] keyed by pile number; a pile from a test report is
//! matched against it by the number embedded in its label.

use crate::constants::{REFERENCE_HEADER_OFFSET, reference_columns};
use crate::error::{PileError, Result};
use crate::models::{PileRecord, ReferenceRecord, parse_locale_decimal};
use calamine::{Data, Reader, open_workbook_auto};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Header names of the reference columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceColumns {
    pub pile_number: String,
    pub toe_design_level: String,
    pub cutoff_level: String,
    pub pile_type: String,
    pub pile_diameter: String,
    pub building_name: String,
    /// Rows above the header row
    pub header_offset: usize,
}

impl Default for ReferenceColumns {
    fn default() -> Self {
        Self {
            pile_number: reference_columns::PILE_NUMBER.to_string(),
            toe_design_level: reference_columns::TOE_DESIGN_LEVEL.to_string(),
            cutoff_level: reference_columns::CUTOFF_LEVEL.to_string(),
            pile_type: reference_columns::PILE_TYPE.to_string(),
            pile_diameter: reference_columns::PILE_DIAMETER.to_string(),
            building_name: reference_columns::BUILDING_NAME.to_string(),
            header_offset: REFERENCE_HEADER_OFFSET,
        }
    }
}

/// Result of looking a pile up in the reference table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchOutcome<'a> {
    Found(&'a ReferenceRecord),
    NotFound,
}

/// Reference records of one building, keyed by pile number
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    building: String,
    full_building_name: Option<String>,
    records: HashMap<u32, ReferenceRecord>,
}

impl ReferenceTable {
    /// Create an empty table for a building
    pub fn new(building: impl Into<String>) -> Self {
        Self {
            building: building.into(),
            full_building_name: None,
            records: HashMap::new(),
        }
    }

    /// Build a table from raw rows, the header located at `columns.header_offset`
    pub fn from_rows(
        building: &str,
        rows: &[Vec<String>],
        columns: &ReferenceColumns,
    ) -> Result<Self> {
        let header = rows.get(columns.header_offset).ok_or_else(|| {
            PileError::reference(
                building,
                format!("no header row at offset {}", columns.header_offset),
            )
        })?;
        let index = ColumnIndex::locate(building, header, columns)?;

        let mut table = Self::new(building);
        for (offset, row) in rows.iter().enumerate().skip(columns.header_offset + 1) {
            let Some(record) = index.record(building, offset, row)? else {
                continue;
            };
            table.insert(record);
        }

        debug!(
            "Loaded {} reference piles for building {}",
            table.len(),
            building
        );
        Ok(table)
    }

    /// Add a record; the first record for a pile number wins
    pub fn insert(&mut self, record: ReferenceRecord) {
        if self.full_building_name.is_none() && !record.building_full_name.is_empty() {
            self.full_building_name = Some(record.building_full_name.clone());
        }
        if self.records.contains_key(&record.pile_number) {
            warn!(
                "Building {}: duplicate reference row for pile {}, keeping the first",
                self.building, record.pile_number
            );
            return;
        }
        self.records.insert(record.pile_number, record);
    }

    /// Look up a pile by its report label
    pub fn match_pile(&self, pile: &PileRecord) -> MatchOutcome<'_> {
        match pile_number_from_label(&pile.pile_label).and_then(|n| self.records.get(&n)) {
            Some(record) => MatchOutcome::Found(record),
            None => MatchOutcome::NotFound,
        }
    }

    pub fn get(&self, pile_number: u32) -> Option<&ReferenceRecord> {
        self.records.get(&pile_number)
    }

    pub fn building(&self) -> &str {
        &self.building
    }

    /// Full building name from the first reference row
    pub fn full_building_name(&self) -> Option<&str> {
        self.full_building_name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Pile number between the leading `P` and the first hyphen
pub fn pile_number_from_label(label: &str) -> Option<u32> {
    let (head, _) = label.trim().split_once('-')?;
    let digits = head.strip_prefix('P')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

struct ColumnIndex {
    pile_number: usize,
    toe_design_level: usize,
    cutoff_level: usize,
    pile_type: usize,
    pile_diameter: usize,
    building_name: usize,
}

impl ColumnIndex {
    fn locate(building: &str, header: &[String], columns: &ReferenceColumns) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|cell| cell.trim() == name)
                .ok_or_else(|| PileError::reference(building, format!("missing column '{}'", name)))
        };

        Ok(Self {
            pile_number: find(&columns.pile_number)?,
            toe_design_level: find(&columns.toe_design_level)?,
            cutoff_level: find(&columns.cutoff_level)?,
            pile_type: find(&columns.pile_type)?,
            pile_diameter: find(&columns.pile_diameter)?,
            building_name: find(&columns.building_name)?,
        })
    }

    fn record(&self, building: &str, offset: usize, row: &[String]) -> Result<Option<ReferenceRecord>> {
        let cell = |index: usize| row.get(index).map(|s| s.trim()).unwrap_or("");

        let number_text = cell(self.pile_number);
        if number_text.is_empty() {
            return Ok(None);
        }

        let pile_number = parse_locale_decimal(number_text)
            .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
            .map(|n| n as u32)
            .ok_or_else(|| {
                PileError::reference(
                    building,
                    format!("row {}: '{}' is not a pile number", offset, number_text),
                )
            })?;

        let level = |index: usize, name: &str| {
            parse_locale_decimal(cell(index)).ok_or_else(|| {
                PileError::reference(
                    building,
                    format!(
                        "row {}: {} of pile {} is '{}'",
                        offset,
                        name,
                        pile_number,
                        cell(index)
                    ),
                )
            })
        };

        Ok(Some(ReferenceRecord {
            pile_number,
            toe_design_level: level(self.toe_design_level, "toe design level")?,
            cutoff_level: level(self.cutoff_level, "cutoff level")?,
            pile_type: cell(self.pile_type).to_string(),
            pile_diameter: cell(self.pile_diameter).to_string(),
            building_full_name: cell(self.building_name).to_string(),
        }))
    }
}

/// Where reference tables come from
pub trait ReferenceSource {
    /// Load the reference table for one building
    fn load_building(&self, building: &str) -> Result<ReferenceTable>;

    /// Human-readable location for logs
    fn describe(&self) -> String;
}

/// Excel-family workbook with one sheet per building
#[derive(Debug, Clone)]
pub struct WorkbookReference {
    path: PathBuf,
    columns: ReferenceColumns,
}

impl WorkbookReference {
    pub fn new(path: impl Into<PathBuf>, columns: ReferenceColumns) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }
}

impl ReferenceSource for WorkbookReference {
    fn load_building(&self, building: &str) -> Result<ReferenceTable> {
        if !self.path.exists() {
            return Err(PileError::InputNotFound {
                path: self.path.clone(),
            });
        }

        let mut workbook = open_workbook_auto(&self.path)?;
        if !workbook.sheet_names().iter().any(|name| name == building) {
            return Err(PileError::reference(
                building,
                format!("no sheet named '{}' in {}", building, self.path.display()),
            ));
        }

        // The range starts at the first used cell; the header offset counts from row 1
        let range = workbook.worksheet_range(building)?;
        let leading_rows = range.start().map_or(0, |(row, _)| row as usize);
        let rows: Vec<Vec<String>> = std::iter::repeat_with(Vec::new)
            .take(leading_rows)
            .chain(range.rows().map(|row| row.iter().map(cell_text).collect()))
            .collect();

        ReferenceTable::from_rows(building, &rows, &self.columns)
    }

    fn describe(&self) -> String {
        format!("workbook {}", self.path.display())
    }
}

/// Directory of `<building>.csv` exports
#[derive(Debug, Clone)]
pub struct CsvReferenceDirectory {
    dir: PathBuf,
    columns: ReferenceColumns,
}

impl CsvReferenceDirectory {
    pub fn new(dir: impl Into<PathBuf>, columns: ReferenceColumns) -> Self {
        Self {
            dir: dir.into(),
            columns,
        }
    }

    fn building_path(&self, building: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", building))
    }
}

impl ReferenceSource for CsvReferenceDirectory {
    fn load_building(&self, building: &str) -> Result<ReferenceTable> {
        let path = self.building_path(building);
        if !path.exists() {
            return Err(PileError::reference(
                building,
                format!("no reference file at {}", path.display()),
            ));
        }

        let rows = read_csv_rows(&path)?;
        ReferenceTable::from_rows(building, &rows, &self.columns)
    }

    fn describe(&self) -> String {
        format!("CSV directory {}", self.dir.display())
    }
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Render a workbook cell the way it reads in the sheet
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        Data::Float(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn rows(lines: &[&[&str]]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|line| line.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn header() -> &'static [&'static str] {
        &[
            "Cölöp jele",
            "Visszavésési szint",
            "Cölöpcsúcs",
            "Cölöp típus",
            "Cölöp átmérő",
            "Épület neve",
        ]
    }

    fn pile(label: &str) -> PileRecord {
        PileRecord {
            pile_label: label.to_string(),
            peak_velocity: String::new(),
            peak_acceleration: String::new(),
            t50: String::new(),
            measured_length: 10.0,
        }
    }

    #[test]
    fn test_pile_number_from_label() {
        assert_eq!(pile_number_from_label("P14-A"), Some(14));
        assert_eq!(pile_number_from_label("P007-B-2"), Some(7));
        assert_eq!(pile_number_from_label("P14"), None);
        assert_eq!(pile_number_from_label("X14-A"), None);
        assert_eq!(pile_number_from_label("P-A"), None);
    }

    #[test]
    fn test_from_rows_skips_title_row() {
        let data = rows(&[
            &["Building B7 piles", "", "", "", "", ""],
            header(),
            &["14", "17,35", "5,10", "CFA", "600", "Hall B7"],
            &["15", "17.40", "5.20", "CFA", "800", "Hall B7"],
            &["", "", "", "", "", ""],
        ]);

        let table = ReferenceTable::from_rows("BLD7", &data, &ReferenceColumns::default()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.full_building_name(), Some("Hall B7"));
        let record = table.get(14).unwrap();
        assert_eq!(record.toe_design_level, 17.35);
        assert_eq!(record.cutoff_level, 5.10);
        assert_eq!(record.pile_diameter, "600");
    }

    #[test]
    fn test_match_pile() {
        let data = rows(&[&["title"], header(), &["14", "17", "5", "CFA", "600", "Hall"]]);
        let table = ReferenceTable::from_rows("BLD7", &data, &ReferenceColumns::default()).unwrap();

        assert!(matches!(table.match_pile(&pile("P14-A")), MatchOutcome::Found(r) if r.pile_number == 14));
        assert_eq!(table.match_pile(&pile("P15-A")), MatchOutcome::NotFound);
        assert_eq!(table.match_pile(&pile("garbage")), MatchOutcome::NotFound);
    }

    #[test]
    fn test_duplicate_reference_rows_keep_first() {
        let data = rows(&[
            &["title"],
            header(),
            &["14", "17", "5", "CFA", "600", "Hall"],
            &["14", "99", "9", "CFA", "900", "Hall"],
        ]);
        let table = ReferenceTable::from_rows("BLD7", &data, &ReferenceColumns::default()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(14).unwrap().toe_design_level, 17.0);
    }

    #[test]
    fn test_missing_column_is_reference_error() {
        let data = rows(&[&["title"], &["Cölöp jele", "Cölöpcsúcs"], &["1", "2"]]);
        let error = ReferenceTable::from_rows("BLD7", &data, &ReferenceColumns::default())
            .unwrap_err();
        assert!(matches!(error, PileError::Reference { .. }));
        assert!(error.to_string().contains("Visszavésési szint"));
    }

    #[test]
    fn test_unparsable_level_is_reference_error() {
        let data = rows(&[&["title"], header(), &["14", "high", "5", "CFA", "600", "Hall"]]);
        let error = ReferenceTable::from_rows("BLD7", &data, &ReferenceColumns::default())
            .unwrap_err();
        assert!(error.to_string().contains("toe design level of pile 14"));
    }

    #[test]
    fn test_csv_reference_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(temp_dir.path().join("BLD7.csv")).unwrap();
        writeln!(file, "Reference piles,,,,,").unwrap();
        writeln!(file, "{}", header().join(",")).unwrap();
        writeln!(file, "14,\"17,35\",\"5,10\",CFA,600,Hall B7").unwrap();

        let source = CsvReferenceDirectory::new(temp_dir.path(), ReferenceColumns::default());
        let table = source.load_building("BLD7").unwrap();
        assert_eq!(table.get(14).unwrap().cutoff_level, 5.10);

        let missing = source.load_building("BLD9").unwrap_err();
        assert!(matches!(missing, PileError::Reference { .. }));
    }

    #[test]
    fn test_workbook_reference_missing_file() {
        let source = WorkbookReference::new("/nonexistent/piles.xlsx", ReferenceColumns::default());
        assert!(matches!(
            source.load_building("BLD7"),
            Err(PileError::InputNotFound { .. })
        ));
    }

    /// Workbook with one sheet per building; the header sits in row 2
    fn write_workbook(path: &Path, sheets: &[(&str, bool)]) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        for (name, with_title) in sheets {
            let sheet = workbook.add_worksheet();
            sheet.set_name(*name).unwrap();
            if *with_title {
                sheet.write_string(0, 0, format!("Reference piles {}", name)).unwrap();
            }
            for (col, title) in header().iter().enumerate() {
                sheet.write_string(1, col as u16, *title).unwrap();
            }
            sheet.write_number(2, 0, 14.0).unwrap();
            sheet.write_number(2, 1, 17.35).unwrap();
            sheet.write_number(2, 2, 5.1).unwrap();
            sheet.write_string(2, 3, "CFA").unwrap();
            sheet.write_number(2, 4, 800.0).unwrap();
            sheet.write_string(2, 5, "Hall B7").unwrap();
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_workbook_reference_reads_sheet() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("piles.xlsx");
        write_workbook(&path, &[("BLD7", true)]);

        let table = WorkbookReference::new(&path, ReferenceColumns::default())
            .load_building("BLD7")
            .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.full_building_name(), Some("Hall B7"));
        let record = table.get(14).unwrap();
        assert_eq!(record.toe_design_level, 17.35);
        assert_eq!(record.cutoff_level, 5.1);
        assert_eq!(record.pile_diameter, "800");
    }

    #[test]
    fn test_workbook_header_offset_counts_from_first_row() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("piles.xlsx");
        write_workbook(&path, &[("BLD7", false)]);

        let table = WorkbookReference::new(&path, ReferenceColumns::default())
            .load_building("BLD7")
            .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(14).unwrap().pile_type, "CFA");
    }

    #[test]
    fn test_workbook_missing_sheet() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("piles.xlsx");
        write_workbook(&path, &[("BLD7", true)]);

        let error = WorkbookReference::new(&path, ReferenceColumns::default())
            .load_building("BLD9")
            .unwrap_err();

        match error {
            PileError::Reference { building, .. } => assert_eq!(building, "BLD9"),
            other => panic!("Expected Reference error, got {:?}", other),
        }
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(600.0)), "600");
        assert_eq!(cell_text(&Data::Float(5.1)), "5.1");
        assert_eq!(cell_text(&Data::Int(14)), "14");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("CFA".to_string())), "CFA");
    }
}
