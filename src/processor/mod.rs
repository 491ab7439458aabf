//! Batch processing of pile test reports.
//!
//! Reports are handled one after another: decode pages, parse, look up the
//! building's reference table, validate, then write the templating context
//! and diagnostic file. Each result is folded into a [`BatchSummary`] which
//! is written once the whole batch is done.

pub mod discovery;
pub mod writer;

#[cfg(test)]
mod tests;

use self::discovery::{FileDiscovery, ReportPair};
use self::writer::{ReportOutputs, ReportWriter};

use crate::aggregator::{BatchSummary, ReportResult};
use crate::config::Config;
use crate::context::{AttachmentPages, ReportContext, build_context};
use crate::error::{PileError, Result};
use crate::models::{ReportMetadata, ValidationReport};
use crate::pages::PageSource;
use crate::parser::parse_report;
use crate::reference::{ReferenceSource, ReferenceTable};
use crate::validator::validate_piles;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Everything produced for one successfully processed report
#[derive(Debug, Clone)]
pub struct ProcessedReport {
    pub metadata: ReportMetadata,
    pub validation: ValidationReport,
    pub context: ReportContext,
    pub outputs: ReportOutputs,
}

/// Statistics of a batch run
#[derive(Debug, Clone)]
pub struct RunStats {
    pub reports_processed: usize,
    pub reports_failed: usize,
    /// Processed reports with faulty or missing piles
    pub reports_with_findings: usize,
    pub summary_path: PathBuf,
    pub summary: BatchSummary,
    pub processing_time_ms: u128,
}

impl RunStats {
    pub fn is_clean(&self) -> bool {
        self.summary.is_clean()
    }
}

/// Sequential report processor
pub struct BatchProcessor {
    config: Config,
    pages: Box<dyn PageSource>,
    reference: Box<dyn ReferenceSource>,
    writer: ReportWriter,
    tables: HashMap<String, ReferenceTable>,
    show_progress: bool,
}

impl BatchProcessor {
    pub fn new(
        config: Config,
        pages: Box<dyn PageSource>,
        reference: Box<dyn ReferenceSource>,
        output_path: PathBuf,
    ) -> Self {
        let writer = ReportWriter::new(output_path, config.output.clone());
        Self {
            config,
            pages,
            reference,
            writer,
            tables: HashMap::new(),
            show_progress: true,
        }
    }

    /// Parse and validate without writing any files
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.writer = self.writer.with_dry_run(dry_run);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Discover the report pairs in a directory and process them
    pub fn run_directory(&mut self, input_path: &Path) -> Result<RunStats> {
        let discovery = FileDiscovery::new(input_path.to_path_buf(), self.pages.extension());
        let pairs = discovery.discover_pairs()?;
        println!(
            "  {} {} reports in {}",
            "Found".bright_green(),
            pairs.len().to_string().bright_white().bold(),
            discovery.input_path().display()
        );
        self.run(&pairs)
    }

    /// Process every pair in order and write the run summary
    ///
    /// A report that fails is logged and recorded as a failure; the batch
    /// carries on with the next one.
    pub fn run(&mut self, pairs: &[ReportPair]) -> Result<RunStats> {
        let start_time = Instant::now();
        info!(
            "Processing {} reports against {}",
            pairs.len(),
            self.reference.describe()
        );

        let progress = self.progress_bar(pairs.len());
        let mut summary = BatchSummary::new();
        let mut processed = 0;
        let mut with_findings = 0;

        for pair in pairs {
            progress.set_message(pair.name.clone());
            summary = match self.process_report(pair) {
                Ok(report) => {
                    processed += 1;
                    if !report.validation.outcome.is_ok() {
                        with_findings += 1;
                    }
                    summary.record(ReportResult::new(
                        &report.metadata.building,
                        &report.metadata.test_date,
                        report.metadata.expected_blow_count,
                        &report.validation.outcome,
                    ))
                }
                Err(e) => {
                    error!("Failed to process {}: {}", pair.text.display(), e);
                    progress.suspend(|| {
                        eprintln!(
                            "  {} {}: {}",
                            "Failed".bright_red().bold(),
                            pair.text.display(),
                            e
                        )
                    });
                    summary.record_failure(&pair.text, e.to_string())
                }
            };
            progress.inc(1);
        }
        progress.finish_and_clear();

        let summary_path = self.writer.write_summary(&summary)?;
        let stats = RunStats {
            reports_processed: processed,
            reports_failed: summary.failures().len(),
            reports_with_findings: with_findings,
            summary_path,
            summary,
            processing_time_ms: start_time.elapsed().as_millis(),
        };
        print_run_summary(&stats);
        Ok(stats)
    }

    /// Run one report through the whole pipeline
    pub fn process_report(&mut self, pair: &ReportPair) -> Result<ProcessedReport> {
        debug!("Processing report '{}'", pair.name);
        let pages = self.pages.pages(&pair.text)?;
        let parsed = parse_report(&pages, &self.config.layout)?;
        let metadata = parsed.metadata;

        if metadata.declared_page_count != pages.len().to_string() {
            warn!(
                "{}: header declares {} pages but {} were decoded",
                pair.name,
                metadata.declared_page_count,
                pages.len()
            );
        }

        self.load_reference(&metadata.building)?;
        let table = self
            .tables
            .get(&metadata.building)
            .ok_or_else(|| PileError::reference(&metadata.building, "reference table not loaded"))?;

        let validation = validate_piles(&parsed.piles, table, &self.config.tolerance);
        let attachments = AttachmentPages {
            text: pages.len(),
            graphics: match &pair.graphics {
                Some(path) => self.pages.page_count(path)?,
                None => 0,
            },
        };
        let context = build_context(&metadata, &validation, table, attachments);
        let outputs = self.writer.write_report(&context, &validation.outcome)?;

        if self.config.output.archive_inputs {
            if let Err(e) = self.writer.archive_inputs(&outputs.dir, pair) {
                self.writer.discard(&outputs);
                return Err(e);
            }
        }

        info!(
            "{} {}: {} piles, {} faulty, {} missing",
            metadata.building,
            metadata.test_date,
            validation.outcome.pile_count,
            validation.outcome.faulty.len(),
            validation.outcome.missing.len()
        );

        Ok(ProcessedReport {
            metadata,
            validation,
            context,
            outputs,
        })
    }

    /// Load a building's reference table once per run
    fn load_reference(&mut self, building: &str) -> Result<()> {
        if !self.tables.contains_key(building) {
            let table = self.reference.load_building(building)?;
            if table.is_empty() {
                warn!("Reference table for {} has no piles", building);
            }
            self.tables.insert(building.to_string(), table);
        }
        Ok(())
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        progress.set_style(style);
        progress
    }
}

fn print_run_summary(stats: &RunStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Reports processed:".bright_cyan(),
        stats.reports_processed.to_string().bright_white()
    );
    if stats.reports_with_findings > 0 {
        println!(
            "  {} {}",
            "With faulty or missing piles:".bright_yellow(),
            stats.reports_with_findings.to_string().bright_yellow().bold()
        );
    }
    if stats.summary.blow_mismatches() > 0 {
        println!(
            "  {} {}",
            "Blow count mismatches:".bright_yellow(),
            stats.summary.blow_mismatches().to_string().bright_yellow().bold()
        );
    }
    if stats.reports_failed > 0 {
        println!(
            "  {} {}",
            "Reports failed:".bright_red(),
            stats.reports_failed.to_string().bright_red().bold()
        );
    }
    for line in stats.summary.render() {
        println!("  {}", line);
    }
    let verdict = if stats.is_clean() {
        "All piles OK".bright_green().bold()
    } else {
        "Faulty or missing piles found".bright_red().bold()
    };
    println!(
        "  {} ({})",
        verdict,
        stats.summary_path.display().to_string().bright_white()
    );
}
