//! Core data structures for pile report processing.
//!
//! Report metadata, parsed pile rows, reference records, validation results
//! and the decimal helpers shared by the validator and the context builder.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Header information from the first page of a test report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub building: String,
    /// Date exactly as printed in the report
    pub test_date: String,
    pub declared_page_count: String,
    pub expected_blow_count: u32,
}

/// One measured pile from the report table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileRecord {
    pub pile_label: String,
    pub peak_velocity: String,
    pub peak_acceleration: String,
    pub t50: String,
    pub measured_length: f64,
}

/// A parsed report: header plus pile rows in source order
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub metadata: ReportMetadata,
    pub piles: Vec<PileRecord>,
}

/// Design data for one pile from the reference database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub pile_number: u32,
    pub toe_design_level: f64,
    pub cutoff_level: f64,
    pub pile_type: String,
    pub pile_diameter: String,
    pub building_full_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PileStatus {
    Ok,
    Faulty,
}

/// A matched pile after the tolerance check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPile {
    pub record: PileRecord,
    pub reference: ReferenceRecord,
    pub measured_toe_level: f64,
    pub status: PileStatus,
    /// Shortest measured length seen up to and including this pile
    pub min_length: f64,
    /// Longest measured length seen up to and including this pile
    pub max_length: f64,
}

/// Per-report validation result
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationOutcome {
    pub faulty: Vec<String>,
    pub missing: Vec<String>,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
    pub pile_types: BTreeSet<String>,
    pub pile_diameters: BTreeSet<String>,
    /// Piles listed in the report, matched or not
    pub pile_count: usize,
    /// Piles that had a reference record
    pub matched_count: usize,
}

impl ValidationOutcome {
    /// True when every pile was found and within tolerance
    pub fn is_ok(&self) -> bool {
        self.faulty.is_empty() && self.missing.is_empty()
    }
}

/// Validated rows together with the report-level outcome
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub piles: Vec<ValidatedPile>,
    pub outcome: ValidationOutcome,
}

/// Either the literal "OK" or the offending pile labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListOrOk {
    Ok,
    Piles(Vec<String>),
}

impl ListOrOk {
    pub fn from_labels(labels: &[String]) -> Self {
        if labels.is_empty() {
            ListOrOk::Ok
        } else {
            ListOrOk::Piles(labels.to_vec())
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ListOrOk::Ok)
    }
}

impl fmt::Display for ListOrOk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListOrOk::Ok => write!(f, "{}", crate::constants::OK_MARKER),
            ListOrOk::Piles(labels) => write!(f, "[{}]", labels.join(", ")),
        }
    }
}

/// Round to the engineering precision of two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Value in integer hundredths, used for exact tolerance comparisons
pub fn hundredths(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

/// Fixed two-decimal display format
pub fn format2(value: f64) -> String {
    format!("{:.*}", crate::constants::DECIMALS, value)
}

/// Parse a decimal that may use a comma as the decimal separator
pub fn parse_locale_decimal(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_decimal() {
        assert_eq!(parse_locale_decimal("12,35"), Some(12.35));
        assert_eq!(parse_locale_decimal(" 9.5 "), Some(9.5));
        assert_eq!(parse_locale_decimal("abc"), None);
        assert_eq!(parse_locale_decimal(""), None);
        assert_eq!(parse_locale_decimal("1,2,3"), None);
        assert_eq!(parse_locale_decimal("NaN"), None);
    }

    #[test]
    fn test_format_round_trip_stays_within_half_a_hundredth() {
        for value in [0.0, 1.005, 4.899_999, 12.345, 123.456_78, -3.214] {
            let reparsed: f64 = format2(value).parse().unwrap();
            assert!((reparsed - value).abs() <= 0.005 + 1e-9, "{value}");
        }
    }

    #[test]
    fn test_hundredths_absorbs_float_noise() {
        assert_eq!(hundredths(5.10 - 0.2), 490);
        assert_eq!(hundredths(4.9), 490);
        assert_eq!(round2(5.1 - 0.1), 5.0);
    }

    #[test]
    fn test_list_or_ok_display() {
        assert_eq!(ListOrOk::from_labels(&[]).to_string(), "OK");
        let labels = vec!["P1-A".to_string(), "P2-B".to_string()];
        assert_eq!(ListOrOk::from_labels(&labels).to_string(), "[P1-A, P2-B]");
        assert!(!ListOrOk::from_labels(&labels).is_ok());
    }
}
