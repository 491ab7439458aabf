//! Command-line argument definitions for the pile checker

use crate::constants::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use crate::error::{PileError, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How test reports are stored in the input directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// PDF reports, decoded page by page
    Pdf,
    /// Pre-decoded UTF-8 text, pages separated by form feeds
    Text,
}

/// How the reference pile database is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReferenceFormat {
    /// One workbook with a sheet per building
    Workbook,
    /// A directory with one `<building>.csv` per building
    Csv,
}

/// CLI arguments for the pile checker
///
/// Checks pile integrity test reports against the reference pile database
/// and writes per-report diagnostics plus a run summary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pile_checker",
    version,
    about = "Validate pile integrity test reports against the reference pile database"
)]
pub struct Args {
    /// Directory containing text_<name> and graphics_<name> report pairs
    #[arg(short = 'i', long = "input", value_name = "PATH", default_value = DEFAULT_INPUT_DIR)]
    pub input_path: PathBuf,

    /// Directory receiving per-report output and the run summary
    #[arg(short = 'o', long = "output", value_name = "PATH", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_path: PathBuf,

    /// Reference pile database (workbook file or CSV directory)
    #[arg(short = 'r', long = "reference", value_name = "PATH")]
    pub reference_path: PathBuf,

    #[arg(long, value_enum, default_value_t = ReferenceFormat::Workbook)]
    pub reference_format: ReferenceFormat,

    #[arg(long, value_enum, default_value_t = InputFormat::Pdf)]
    pub input_format: InputFormat,

    /// JSON configuration file (defaults to the user config directory)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Override the tolerance below the cutoff level, in metres
    #[arg(long, value_name = "METRES")]
    pub lower_margin: Option<f64>,

    /// Override the prefix of generated report file names
    #[arg(long, value_name = "PREFIX")]
    pub project_prefix: Option<String>,

    /// Move processed inputs into the report directory
    #[arg(long)]
    pub archive_inputs: bool,

    /// Parse and validate without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and hide the progress bar
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Validate the arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.input_path.is_dir() {
            return Err(PileError::InputNotFound {
                path: self.input_path.clone(),
            });
        }

        let reference_ok = match self.reference_format {
            ReferenceFormat::Workbook => self.reference_path.is_file(),
            ReferenceFormat::Csv => self.reference_path.is_dir(),
        };
        if !reference_ok {
            return Err(PileError::InputNotFound {
                path: self.reference_path.clone(),
            });
        }

        if let Some(margin) = self.lower_margin {
            if !margin.is_finite() || margin < 0.0 {
                return Err(PileError::configuration(format!(
                    "Lower margin must be a non-negative number, got {}",
                    margin
                )));
            }
        }

        Ok(())
    }

    /// Get the log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}
