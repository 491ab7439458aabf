//! Error handling for pile report processing.
//!
//! Separates layout problems (the report does not look like the template
//! we know how to read) from reference data problems and plain I/O. A pile
//! without a reference record is not an error and never shows up here.

use std::path::PathBuf;
use thiserror::Error;

/// A single table row that could not be turned into a pile record.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("row {row}: {reason}")]
pub struct RowParseError {
    /// Zero-based row index across the whole report (page order, then row order)
    pub row: usize,
    pub reason: String,
}

impl RowParseError {
    pub fn new(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum PileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report does not match the expected template: {reason}")]
    Format { reason: String },

    #[error("Header field '{field}' could not be parsed: {reason}")]
    HeaderParse { field: &'static str, reason: String },

    #[error("Report does not match the expected template: malformed pile {0}")]
    MalformedRow(#[from] RowParseError),

    #[error("Reference data for building '{building}' is unusable: {reason}")]
    Reference { building: String, reason: String },

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not decode PDF {path}: {reason}")]
    Pdf { path: PathBuf, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl PileError {
    pub fn format(reason: impl Into<String>) -> Self {
        Self::Format {
            reason: reason.into(),
        }
    }

    pub fn header(field: &'static str, reason: impl Into<String>) -> Self {
        Self::HeaderParse {
            field,
            reason: reason.into(),
        }
    }

    pub fn reference(building: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Reference {
            building: building.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for every error that means "the report layout is not the one we expect"
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::Format { .. } | Self::HeaderParse { .. } | Self::MalformedRow(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PileError>;
