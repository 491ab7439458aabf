//! Versioned description of the report template.
//!
//! Every offset the parser relies on lives here instead of being scattered
//! through the code, so a template revision means a new layout value rather
//! than a silent parse failure.

use crate::constants::*;
use crate::error::{PileError, Result};
use serde::{Deserialize, Serialize};

/// Position of a line inside a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinePosition {
    /// Zero-based index from the first line
    FromStart(usize),
    /// One-based index from the end (1 is the last line)
    FromEnd(usize),
}

impl LinePosition {
    /// Resolve against a page split into lines
    pub fn resolve<'a>(&self, lines: &[&'a str]) -> Option<&'a str> {
        let index = match *self {
            LinePosition::FromStart(index) => index,
            LinePosition::FromEnd(offset) => lines.len().checked_sub(offset)?,
        };
        lines.get(index).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLayout {
    pub version: String,

    /// Text after which the pile table starts on every page
    pub table_marker: String,

    /// Blank-line delimited blocks at the end of a page that carry no pile data
    pub trailing_blocks: usize,

    /// Minimum number of columns a pile row must have
    pub column_count: usize,

    pub title_line: LinePosition,
    pub blow_count_line: LinePosition,
    pub page_counter_line: LinePosition,
    pub date_line: LinePosition,

    pub page_counter_prefix: String,
    pub date_suffix: String,
}

impl ReportLayout {
    /// The template produced by the current version of the test software
    pub fn v1() -> Self {
        Self {
            version: LAYOUT_VERSION_V1.to_string(),
            table_marker: MEASURED_LENGTH_MARKER.to_string(),
            trailing_blocks: TRAILING_BLOCKS,
            column_count: PILE_TABLE_COLUMNS,
            title_line: LinePosition::FromStart(TITLE_LINE),
            blow_count_line: LinePosition::FromStart(BLOW_COUNT_LINE),
            page_counter_line: LinePosition::FromEnd(PAGE_COUNTER_LINE_FROM_END),
            date_line: LinePosition::FromEnd(DATE_LINE_FROM_END),
            page_counter_prefix: PAGE_COUNTER_PREFIX.to_string(),
            date_suffix: DATE_SUFFIX.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_marker.is_empty() {
            return Err(PileError::configuration(format!(
                "layout {}: table marker must not be empty",
                self.version
            )));
        }
        if self.column_count == 0 {
            return Err(PileError::configuration(format!(
                "layout {}: column count must be at least 1",
                self.version
            )));
        }
        for position in [
            self.title_line,
            self.blow_count_line,
            self.page_counter_line,
            self.date_line,
        ] {
            if position == LinePosition::FromEnd(0) {
                return Err(PileError::configuration(format!(
                    "layout {}: offsets from the end start at 1",
                    self.version
                )));
            }
        }
        Ok(())
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::v1()
    }
}
