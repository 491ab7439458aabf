//! Output writing for processed reports
//!
//! Every report gets its own directory under `<output>/<building>/` holding the
//! templating context, a diagnostic file and optionally the archived inputs.
//! The run summary is written once at the output root.

use super::discovery::ReportPair;
use crate::aggregator::BatchSummary;
use crate::config::OutputConfig;
use crate::constants::{
    ARCHIVE_DIR_NAME, REPORT_ERROR_FILE, REPORT_OK_FILE, SUMMARY_ERROR_FILE, SUMMARY_OK_FILE,
};
use crate::context::ReportContext;
use crate::error::Result;
use crate::models::ValidationOutcome;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Files produced for one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutputs {
    pub dir: PathBuf,
    pub context: PathBuf,
    pub diagnostic: PathBuf,
}

/// Writes report outputs below an output root
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_root: PathBuf,
    config: OutputConfig,
    dry_run: bool,
}

impl ReportWriter {
    pub fn new(output_root: PathBuf, config: OutputConfig) -> Self {
        Self {
            output_root,
            config,
            dry_run: false,
        }
    }

    /// Compute paths without touching the filesystem
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn report_dir(&self, building: &str, date: &str) -> PathBuf {
        self.output_root
            .join(building)
            .join(format!("{}{}", date, self.config.date_dir_suffix))
    }

    /// `<prefix> - <building>_<date without dots>_report.json`
    pub fn context_file_name(&self, building: &str, date: &str) -> String {
        format!(
            "{} - {}_{}_report.json",
            self.config.project_prefix,
            building,
            date.replace('.', "")
        )
    }

    /// Write the context and diagnostic files of one report
    pub fn write_report(
        &self,
        context: &ReportContext,
        outcome: &ValidationOutcome,
    ) -> Result<ReportOutputs> {
        let building = &context.building_notation;
        let date = &context.date;
        let dir = self.report_dir(building, date);
        let context_path = dir.join(self.context_file_name(building, date));
        let diagnostic_path = dir.join(diagnostic_file_name(outcome));

        if self.dry_run {
            debug!("Dry run: skipping {}", dir.display());
        } else {
            fs::create_dir_all(&dir)?;
            fs::write(&context_path, context.to_json()?)?;
            fs::write(&diagnostic_path, diagnostic_contents(outcome))?;
            debug!("Wrote {} and {}", context_path.display(), diagnostic_path.display());
        }

        Ok(ReportOutputs {
            dir,
            context: context_path,
            diagnostic: diagnostic_path,
        })
    }

    /// Write the run summary, named after whether the run was clean
    pub fn write_summary(&self, summary: &BatchSummary) -> Result<PathBuf> {
        let name = if summary.is_clean() {
            SUMMARY_OK_FILE
        } else {
            SUMMARY_ERROR_FILE
        };
        let path = self.output_root.join(name);

        if !self.dry_run {
            fs::create_dir_all(&self.output_root)?;
            let mut contents = summary.render().join("\n");
            if !contents.is_empty() {
                contents.push('\n');
            }
            fs::write(&path, contents)?;
            info!("Summary written to {}", path.display());
        }

        Ok(path)
    }

    /// Move both input files of a report into `<report dir>/pdf/`
    pub fn archive_inputs(&self, report_dir: &Path, pair: &ReportPair) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }

        let archive = report_dir.join(ARCHIVE_DIR_NAME);
        fs::create_dir_all(&archive)?;
        for source in std::iter::once(&pair.text).chain(pair.graphics.as_ref()) {
            if let Some(name) = source.file_name() {
                move_file(source, &archive.join(name))?;
            }
        }
        debug!("Archived inputs of '{}' to {}", pair.name, archive.display());
        Ok(())
    }

    /// Remove the files of a report whose processing could not be completed
    pub fn discard(&self, outputs: &ReportOutputs) {
        if self.dry_run {
            return;
        }

        for path in [&outputs.context, &outputs.diagnostic] {
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Cannot remove {}: {}", path.display(), e),
            }
        }
    }
}

/// Rename, falling back to copy and delete across filesystems
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_err() {
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}

pub fn diagnostic_file_name(outcome: &ValidationOutcome) -> &'static str {
    if outcome.is_ok() {
        REPORT_OK_FILE
    } else {
        REPORT_ERROR_FILE
    }
}

/// Faulty piles first, then missing ones, each in encounter order
pub fn diagnostic_contents(outcome: &ValidationOutcome) -> String {
    outcome
        .faulty
        .iter()
        .map(|label| format!("Faulty: {}\n", label))
        .chain(outcome.missing.iter().map(|label| format!("Missing: {}\n", label)))
        .collect()
}
