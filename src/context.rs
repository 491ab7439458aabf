//! Templating context for the inspection report document.
//!
//! Flattens a validated report into the key/value structure the document
//! template expects. Nothing is rendered here; the context is serialized as
//! JSON and handed to the templating step.

use crate::constants::{ADVISORY_BASE_PAGES, ADVISORY_BASE_PILES, ADVISORY_PILES_PER_PAGE};
use crate::error::Result;
use crate::models::{ReportMetadata, ValidationReport, format2};
use crate::reference::ReferenceTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Page counts of the two documents attached to the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttachmentPages {
    pub text: usize,
    pub graphics: usize,
}

impl AttachmentPages {
    pub fn total(&self) -> usize {
        self.text + self.graphics
    }
}

/// One row of the pile table in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub pile: u32,
    /// Cutoff level
    pub ccs: String,
    /// Toe design level
    pub vvs: String,
    pub measured_pile_length: String,
    pub measured_pile_toe_level: String,
    pub min_length: String,
    pub max_length: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContext {
    pub table_rows: Vec<TableRow>,
    pub date: String,
    pub building_notation: String,
    pub full_building_name: String,
    pub min_length: Option<String>,
    pub max_length: Option<String>,
    pub type_of_piles: String,
    pub diameter_of_piles: String,
    pub expert_advice_length: usize,
    pub attachment_length: usize,
}

impl ReportContext {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Pages needed for the expert advice section
///
/// Four pages hold the table for up to 25 piles; every further 46 piles
/// start one more page.
pub fn advisory_section_length(pile_count: usize) -> usize {
    if pile_count <= ADVISORY_BASE_PILES {
        ADVISORY_BASE_PAGES
    } else {
        ADVISORY_BASE_PAGES + 1 + (pile_count - ADVISORY_BASE_PILES) / ADVISORY_PILES_PER_PAGE
    }
}

/// Alphabetical, comma separated
fn join_sorted(values: &BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Assemble the templating context for one report
pub fn build_context(
    metadata: &ReportMetadata,
    report: &ValidationReport,
    reference: &ReferenceTable,
    attachments: AttachmentPages,
) -> ReportContext {
    let table_rows = report
        .piles
        .iter()
        .map(|pile| TableRow {
            pile: pile.reference.pile_number,
            ccs: format2(pile.reference.cutoff_level),
            vvs: format2(pile.reference.toe_design_level),
            measured_pile_length: format2(pile.record.measured_length),
            measured_pile_toe_level: format2(pile.measured_toe_level),
            min_length: format2(pile.min_length),
            max_length: format2(pile.max_length),
        })
        .collect();

    let outcome = &report.outcome;
    ReportContext {
        table_rows,
        date: metadata.test_date.clone(),
        building_notation: metadata.building.clone(),
        full_building_name: reference.full_building_name().unwrap_or_default().to_string(),
        min_length: outcome.min_length.map(format2),
        max_length: outcome.max_length.map(format2),
        type_of_piles: join_sorted(&outcome.pile_types),
        diameter_of_piles: join_sorted(&outcome.pile_diameters),
        expert_advice_length: advisory_section_length(outcome.matched_count),
        attachment_length: attachments.total(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PileRecord, ReferenceRecord};
    use crate::validator::{ToleranceConfig, validate_piles};

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            building: "BLD7".to_string(),
            test_date: "2023.05.17".to_string(),
            declared_page_count: "12".to_string(),
            expected_blow_count: 2,
        }
    }

    fn reference(pile_number: u32, pile_type: &str, diameter: &str) -> ReferenceRecord {
        ReferenceRecord {
            pile_number,
            toe_design_level: 17.35,
            cutoff_level: 5.1,
            pile_type: pile_type.to_string(),
            pile_diameter: diameter.to_string(),
            building_full_name: "Hall B7".to_string(),
        }
    }

    fn pile(label: &str, measured_length: f64) -> PileRecord {
        PileRecord {
            pile_label: label.to_string(),
            peak_velocity: "1".to_string(),
            peak_acceleration: "1".to_string(),
            t50: "1".to_string(),
            measured_length,
        }
    }

    #[test]
    fn test_advisory_section_length() {
        assert_eq!(advisory_section_length(0), 4);
        assert_eq!(advisory_section_length(25), 4);
        assert_eq!(advisory_section_length(26), 5);
        assert_eq!(advisory_section_length(70), 5);
        assert_eq!(advisory_section_length(71), 6);
        assert_eq!(advisory_section_length(117), 7);
    }

    #[test]
    fn test_build_context() {
        let mut table = ReferenceTable::new("BLD7");
        table.insert(reference(14, "CFA", "800"));
        table.insert(reference(15, "Bored", "600"));
        let report = validate_piles(
            &[pile("P14-A", 12.35), pile("P15-A", 12.3), pile("P16-A", 1.0)],
            &table,
            &ToleranceConfig::default(),
        );

        let context = build_context(
            &metadata(),
            &report,
            &table,
            AttachmentPages {
                text: 12,
                graphics: 7,
            },
        );

        assert_eq!(context.building_notation, "BLD7");
        assert_eq!(context.full_building_name, "Hall B7");
        assert_eq!(context.type_of_piles, "Bored, CFA");
        assert_eq!(context.diameter_of_piles, "600, 800");
        assert_eq!(context.attachment_length, 19);
        assert_eq!(context.expert_advice_length, 4);
        assert_eq!(context.min_length.as_deref(), Some("12.30"));
        assert_eq!(context.max_length.as_deref(), Some("12.35"));

        assert_eq!(context.table_rows.len(), 2);
        let first = &context.table_rows[0];
        assert_eq!(first.pile, 14);
        assert_eq!(first.ccs, "5.10");
        assert_eq!(first.vvs, "17.35");
        assert_eq!(first.measured_pile_length, "12.35");
        assert_eq!(first.measured_pile_toe_level, "5.00");
        assert_eq!(first.min_length, "12.35");
        assert_eq!(context.table_rows[1].min_length, "12.30");
    }

    #[test]
    fn test_context_json_field_names() {
        let table = ReferenceTable::new("BLD7");
        let report = validate_piles(&[], &table, &ToleranceConfig::default());
        let context = build_context(&metadata(), &report, &table, AttachmentPages::default());

        let json: serde_json::Value = serde_json::from_str(&context.to_json().unwrap()).unwrap();
        for key in [
            "table_rows",
            "date",
            "building_notation",
            "full_building_name",
            "min_length",
            "max_length",
            "type_of_piles",
            "diameter_of_piles",
            "expert_advice_length",
            "attachment_length",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["min_length"].is_null());
    }
}
