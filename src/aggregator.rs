//! Cross-report aggregation.
//!
//! [`BatchSummary`] is an explicit accumulator: every processed report is
//! folded in with [`BatchSummary::record`], which takes the summary by value
//! and hands it back. Keys keep the order in which reports were processed.

use crate::models::{ListOrOk, ValidationOutcome};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Identifies one measurement campaign
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SummaryKey {
    pub building: String,
    pub date: String,
}

/// Per-report line of the run summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// "<measured piles>/<expected blows>"
    pub blow_ratio: String,
    pub missing: ListOrOk,
    pub faulty: ListOrOk,
    /// Measured pile count differs from the expected blow count
    pub blow_mismatch: bool,
}

/// What a successfully processed report contributes to the summary
#[derive(Debug, Clone, PartialEq)]
pub struct ReportResult {
    pub building: String,
    pub date: String,
    pub pile_count: usize,
    pub expected_blow_count: u32,
    pub faulty: Vec<String>,
    pub missing: Vec<String>,
}

impl ReportResult {
    pub fn new(
        building: impl Into<String>,
        date: impl Into<String>,
        expected_blow_count: u32,
        outcome: &ValidationOutcome,
    ) -> Self {
        Self {
            building: building.into(),
            date: date.into(),
            pile_count: outcome.pile_count,
            expected_blow_count,
            faulty: outcome.faulty.clone(),
            missing: outcome.missing.clone(),
        }
    }

    pub fn blow_count_matches(&self) -> bool {
        self.pile_count == self.expected_blow_count as usize
    }
}

/// A report that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedReport {
    pub path: PathBuf,
    pub reason: String,
}

/// Run-wide accumulation of report results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    entries: IndexMap<SummaryKey, SummaryEntry>,
    failures: Vec<FailedReport>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one report into the summary
    ///
    /// Recording the same building and date twice replaces the earlier entry,
    /// including its blow count verdict, but keeps its position.
    pub fn record(mut self, result: ReportResult) -> Self {
        let blow_mismatch = !result.blow_count_matches();
        if blow_mismatch {
            warn!(
                "{} {}: {} piles measured but {} blows expected",
                result.building, result.date, result.pile_count, result.expected_blow_count
            );
        }

        let key = SummaryKey {
            building: result.building,
            date: result.date,
        };
        let entry = SummaryEntry {
            blow_ratio: format!("{}/{}", result.pile_count, result.expected_blow_count),
            missing: ListOrOk::from_labels(&result.missing),
            faulty: ListOrOk::from_labels(&result.faulty),
            blow_mismatch,
        };
        self.entries.insert(key, entry);
        self
    }

    /// Register a report that failed; it gets no summary line
    pub fn record_failure(mut self, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        self.failures.push(FailedReport {
            path: path.into(),
            reason: reason.into(),
        });
        self
    }

    /// True when nothing in the run needs attention
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
            && self.entries.values().all(|entry| {
                !entry.blow_mismatch && entry.missing.is_ok() && entry.faulty.is_ok()
            })
    }

    pub fn entries(&self) -> impl Iterator<Item = (&SummaryKey, &SummaryEntry)> {
        self.entries.iter()
    }

    pub fn get(&self, building: &str, date: &str) -> Option<&SummaryEntry> {
        self.entries.get(&SummaryKey {
            building: building.to_string(),
            date: date.to_string(),
        })
    }

    pub fn failures(&self) -> &[FailedReport] {
        &self.failures
    }

    /// Entries whose measured pile count differs from the expected blow count
    pub fn blow_mismatches(&self) -> usize {
        self.entries.values().filter(|entry| entry.blow_mismatch).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Summary file lines in processing order
    pub fn render(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(key, entry)| {
                format!(
                    "{:<6}{:<15} {}\t\tMissing: {}\t\tFaulty: {}",
                    key.building,
                    format!("{}:", key.date),
                    entry.blow_ratio,
                    entry.missing,
                    entry.faulty
                )
            })
            .collect()
    }
}
