//! Test report parsing.
//!
//! Combines the header of the first page with the pile tables of every page
//! into a [`ParsedReport`]. A row that cannot be read is a layout problem,
//! so it fails the whole report instead of being skipped.

use crate::error::{PileError, Result, RowParseError};
use crate::header::parse_header;
use crate::layout::ReportLayout;
use crate::models::{ParsedReport, PileRecord, parse_locale_decimal};
use crate::normalizer::normalize_page;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static PILE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^P(\d+)-(.+)$").expect("pile label pattern is valid"));

/// Check a label against the `P<digits>-<suffix>` format
pub fn is_valid_pile_label(label: &str) -> bool {
    PILE_LABEL.is_match(label)
}

/// Parse the decoded pages of one test report
pub fn parse_report<S: AsRef<str>>(pages: &[S], layout: &ReportLayout) -> Result<ParsedReport> {
    let first = pages
        .first()
        .ok_or_else(|| PileError::format("report has no pages"))?;
    let metadata = parse_header(first.as_ref(), layout)?;

    let mut rows = Vec::new();
    for (index, page) in pages.iter().enumerate() {
        let page_rows = normalize_page(page.as_ref(), layout).map_err(|e| match e {
            PileError::Format { reason } => {
                PileError::format(format!("page {}: {}", index + 1, reason))
            }
            other => other,
        })?;
        rows.extend(page_rows);
    }

    let mut seen = HashSet::new();
    let mut piles = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let record = parse_pile_row(index, row, layout.column_count)?;
        if !seen.insert(record.pile_label.clone()) {
            return Err(RowParseError::new(
                index,
                format!("duplicate pile label '{}'", record.pile_label),
            )
            .into());
        }
        piles.push(record);
    }

    debug!(
        "Parsed report for {} ({}): {} pages, {} piles",
        metadata.building,
        metadata.test_date,
        pages.len(),
        piles.len()
    );

    Ok(ParsedReport { metadata, piles })
}

/// Turn one normalized row into a pile record
pub fn parse_pile_row(
    index: usize,
    row: &[String],
    column_count: usize,
) -> std::result::Result<PileRecord, RowParseError> {
    // The five pile fields are positional, whatever the layout adds after them
    let required = column_count.max(5);
    if row.len() < required {
        return Err(RowParseError::new(
            index,
            format!("expected {} columns, found {}", required, row.len()),
        ));
    }

    let pile_label = row[0].trim().to_string();
    if !is_valid_pile_label(&pile_label) {
        return Err(RowParseError::new(
            index,
            format!("'{}' is not a pile label", pile_label),
        ));
    }

    let length_text = &row[4];
    let measured_length = parse_locale_decimal(length_text).ok_or_else(|| {
        RowParseError::new(
            index,
            format!(
                "measured length '{}' of {} is not a number",
                length_text.trim(),
                pile_label
            ),
        )
    })?;

    Ok(PileRecord {
        pile_label,
        peak_velocity: row[1].trim().to_string(),
        peak_acceleration: row[2].trim().to_string(),
        t50: row[3].trim().to_string(),
        measured_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn page(header: &str, columns: &[&str], footer: &str) -> String {
        format!(
            "{}\nMeasured Length [m]\n\n{}\n\nnotes\n\nremarks\n\n{}",
            header,
            columns.join("\n\n"),
            footer
        )
    }

    const HEADER: &str = "HBM Pile Test - BLD7 - Debrecen\nProject\nOperator\nInstrument\nNumber of blows: 3";
    const FOOTER: &str = "2023.05.17-i mérés\nInspector\n1 of 2\nHBM\n";

    #[test]
    fn test_parse_pile_row() {
        let record = parse_pile_row(0, &row(&["P14-A", "10,2", "1,1", "3,4", "12,35"]), 5).unwrap();

        assert_eq!(record.pile_label, "P14-A");
        assert_eq!(record.peak_velocity, "10,2");
        assert_eq!(record.peak_acceleration, "1,1");
        assert_eq!(record.t50, "3,4");
        assert_eq!(record.measured_length, 12.35);
    }

    #[test]
    fn test_parse_pile_row_errors() {
        let short = parse_pile_row(2, &row(&["P1-A", "1", "2", "3"]), 5).unwrap_err();
        assert_eq!(short.row, 2);

        let bad_length = parse_pile_row(0, &row(&["P1-A", "1", "2", "3", "n/a"]), 5).unwrap_err();
        assert!(bad_length.reason.contains("n/a"));

        let bad_label = parse_pile_row(0, &row(&["Pile", "1", "2", "3", "4"]), 5).unwrap_err();
        assert!(bad_label.reason.contains("not a pile label"));
    }

    #[test]
    fn test_pile_label_format() {
        assert!(is_valid_pile_label("P14-A"));
        assert!(is_valid_pile_label("P7-12b"));
        assert!(!is_valid_pile_label("14-A"));
        assert!(!is_valid_pile_label("P14"));
        assert!(!is_valid_pile_label("PX-A"));
    }

    #[test]
    fn test_parse_report_concatenates_pages_in_order() {
        let first = page(
            HEADER,
            &["P1-A\nP2-A", "1\n2", "1\n2", "1\n2", "10,00\n11,50"],
            FOOTER,
        );
        let second = page(
            "continued",
            &["P3-B", "3", "3", "3", "9,75"],
            "footer\n2 of 2\n",
        );

        let report = parse_report(&[first, second], &ReportLayout::v1()).unwrap();

        assert_eq!(report.metadata.building, "BLD7");
        assert_eq!(report.metadata.declared_page_count, "2");
        let labels: Vec<_> = report.piles.iter().map(|p| p.pile_label.as_str()).collect();
        assert_eq!(labels, vec!["P1-A", "P2-A", "P3-B"]);
        assert_eq!(report.piles[2].measured_length, 9.75);
    }

    #[test]
    fn test_parse_report_rejects_malformed_rows() {
        let first = page(
            HEADER,
            &["P1-A\nP2-A", "1\n2", "1\n2", "1\n2", "10,00\nbroken"],
            FOOTER,
        );

        let error = parse_report(&[first], &ReportLayout::v1()).unwrap_err();
        assert!(error.is_format_error());
        match error {
            PileError::MalformedRow(row) => assert_eq!(row.row, 1),
            other => panic!("Expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_report_rejects_duplicate_labels() {
        let first = page(
            HEADER,
            &["P1-A\nP1-A", "1\n2", "1\n2", "1\n2", "10,00\n11,00"],
            FOOTER,
        );

        let error = parse_report(&[first], &ReportLayout::v1()).unwrap_err();
        assert!(error.to_string().contains("duplicate pile label 'P1-A'"));
    }

    #[test]
    fn test_parse_report_page_without_marker() {
        let first = page(HEADER, &["P1-A", "1", "1", "1", "10,00"], FOOTER);
        let error = parse_report(&[first, "blank page".to_string()], &ReportLayout::v1())
            .unwrap_err();
        assert!(error.to_string().contains("page 2"));
    }

    #[test]
    fn test_parse_report_without_pages() {
        let pages: Vec<String> = Vec::new();
        let error = parse_report(&pages, &ReportLayout::v1()).unwrap_err();
        assert!(matches!(error, PileError::Format { .. }));
    }
}
