//! Pile Checker Library
//!
//! Reconciles pile integrity test reports with the reference pile database
//! of a construction site.
//!
//! This library provides tools for:
//! - Cutting the pile table out of decoded report pages and parsing the header
//! - Matching every tested pile against its building's reference record
//! - Classifying measured toe levels against the cutoff tolerance window
//! - Aggregating results across reports into a run summary
//! - Building the templating context for the inspection report document

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod header;
pub mod layout;
pub mod models;
pub mod normalizer;
pub mod pages;
pub mod parser;
pub mod processor;
pub mod reference;
pub mod validator;

// Re-export commonly used types
pub use aggregator::{BatchSummary, ReportResult};
pub use config::Config;
pub use context::{ReportContext, build_context};
pub use error::{PileError, Result, RowParseError};
pub use layout::ReportLayout;
pub use models::{ParsedReport, PileRecord, PileStatus, ReferenceRecord, ReportMetadata};
pub use parser::parse_report;
pub use processor::{BatchProcessor, RunStats};
pub use reference::{MatchOutcome, ReferenceSource, ReferenceTable};
pub use validator::{ToleranceConfig, validate_piles};
