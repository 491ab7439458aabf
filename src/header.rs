//! Report header parsing.
//!
//! Reads building, test date, declared page count and expected blow count
//! from the first page of a test report using the line positions of the
//! report layout.

use crate::error::{PileError, Result};
use crate::layout::{LinePosition, ReportLayout};
use crate::models::ReportMetadata;
use tracing::debug;

/// Extract report metadata from the first page
pub fn parse_header(first_page: &str, layout: &ReportLayout) -> Result<ReportMetadata> {
    let lines: Vec<&str> = first_page.split('\n').collect();

    let title = header_line(&lines, layout.title_line, "building")?;
    let building = parse_building(title)?;

    let counter = header_line(&lines, layout.page_counter_line, "page count")?;
    let declared_page_count = parse_page_count(counter, &layout.page_counter_prefix)?;

    let date_line = header_line(&lines, layout.date_line, "date")?;
    let test_date = parse_date(date_line, &layout.date_suffix)?;

    let blow_line = header_line(&lines, layout.blow_count_line, "blow count")?;
    let expected_blow_count = parse_blow_count(blow_line)?;

    debug!(
        "Parsed header: building={}, date={}, pages={}, blows={}",
        building, test_date, declared_page_count, expected_blow_count
    );

    Ok(ReportMetadata {
        building,
        test_date,
        declared_page_count,
        expected_blow_count,
    })
}

fn header_line<'a>(
    lines: &[&'a str],
    position: LinePosition,
    field: &'static str,
) -> Result<&'a str> {
    position.resolve(lines).ok_or_else(|| {
        PileError::header(
            field,
            format!("page has {} lines, no line at {:?}", lines.len(), position),
        )
    })
}

/// Second hyphen-delimited token of the title line
fn parse_building(title: &str) -> Result<String> {
    let building = title
        .split('-')
        .nth(1)
        .map(str::trim)
        .ok_or_else(|| PileError::header("building", format!("no '-' in title '{}'", title)))?;

    if building.is_empty() {
        return Err(PileError::header(
            "building",
            format!("empty building token in '{}'", title),
        ));
    }
    Ok(building.to_string())
}

/// "1 of 12" -> "12"
fn parse_page_count(line: &str, prefix: &str) -> Result<String> {
    let count = line
        .trim_start()
        .strip_prefix(prefix)
        .map(str::trim)
        .ok_or_else(|| {
            PileError::header(
                "page count",
                format!("expected '{}<pages>', found '{}'", prefix, line),
            )
        })?;

    if count.is_empty() || !count.chars().all(|c| c.is_ascii_digit()) {
        return Err(PileError::header(
            "page count",
            format!("'{}' is not a page number", count),
        ));
    }
    Ok(count.to_string())
}

fn parse_date(line: &str, suffix: &str) -> Result<String> {
    let trimmed = line.trim();
    let date = trimmed.strip_suffix(suffix).unwrap_or(trimmed).trim();
    if date.is_empty() {
        return Err(PileError::header("date", "date line is empty"));
    }
    Ok(date.to_string())
}

/// Integer after the first colon
fn parse_blow_count(line: &str) -> Result<u32> {
    let value = line
        .split(':')
        .nth(1)
        .map(str::trim)
        .ok_or_else(|| PileError::header("blow count", format!("no ':' in '{}'", line)))?;

    value.parse::<u32>().map_err(|e| {
        PileError::header("blow count", format!("'{}' is not a count: {}", value, e))
    })
}
