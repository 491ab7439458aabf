//! Command implementation for the pile checker CLI
//!
//! Sets up logging, layers the configuration, chooses the page and reference
//! sources and hands the input directory to the batch processor.

use crate::cli::args::{Args, InputFormat, ReferenceFormat};
use crate::config::{Config, default_config_path};
use crate::error::Result;
use crate::pages::{PageSource, PdfPageSource, TextPageSource};
use crate::processor::{BatchProcessor, RunStats};
use crate::reference::{CsvReferenceDirectory, ReferenceSource, WorkbookReference};
use colored::*;
use tracing::{debug, info};

/// Main command runner
pub fn run(args: Args) -> Result<RunStats> {
    setup_logging(&args);

    info!("Starting pile checker");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let config = load_configuration(&args)?;
    debug!("Loaded configuration: {:?}", config);

    let pages: Box<dyn PageSource> = match args.input_format {
        InputFormat::Pdf => Box::new(PdfPageSource),
        InputFormat::Text => Box::new(TextPageSource),
    };
    let reference: Box<dyn ReferenceSource> = match args.reference_format {
        ReferenceFormat::Workbook => Box::new(WorkbookReference::new(
            &args.reference_path,
            config.reference.clone(),
        )),
        ReferenceFormat::Csv => Box::new(CsvReferenceDirectory::new(
            &args.reference_path,
            config.reference.clone(),
        )),
    };

    println!("{}", "Starting pile report validation".bright_green().bold());
    println!("  {} {}", "Input:".bright_cyan(), args.input_path.display());
    println!("  {} {}", "Reference:".bright_cyan(), reference.describe());
    println!("  {} {}", "Output:".bright_cyan(), args.output_path.display());
    if args.dry_run {
        println!("  {}", "Dry run: no files will be written".bright_yellow());
    }

    let mut processor = BatchProcessor::new(config, pages, reference, args.output_path.clone())
        .with_dry_run(args.dry_run)
        .with_progress(args.show_progress());

    processor.run_directory(&args.input_path)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pile_checker={}", log_level)));

    // try_init: a subscriber may already be installed
    if args.quiet {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Layer defaults, the configuration file and CLI overrides
fn load_configuration(args: &Args) -> Result<Config> {
    match (&args.config_file, default_config_path()) {
        (Some(path), _) => info!("Using config file: {}", path.display()),
        (None, Some(path)) if path.is_file() => info!("Using config file: {}", path.display()),
        _ => info!("No config file found, using defaults"),
    }

    let mut config = Config::load_layered(args.config_file.as_deref())?;

    if let Some(margin) = args.lower_margin {
        config = config.with_lower_margin(margin);
    }
    if let Some(prefix) = &args.project_prefix {
        config = config.with_project_prefix(prefix.clone());
    }
    if args.archive_inputs {
        config = config.with_archive_inputs();
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_overrides_take_precedence() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{ "tolerance": { "lower_margin": 0.3 }, "output": { "project_prefix": "FILE" } }"#,
        )
        .unwrap();

        let config_arg = config_path.to_string_lossy().to_string();
        let args = Args::try_parse_from([
            "pile_checker",
            "-r",
            "piles.xlsx",
            "-c",
            &config_arg,
            "--lower-margin",
            "0.1",
            "--archive-inputs",
        ])
        .unwrap();

        let config = load_configuration(&args).unwrap();
        assert_eq!(config.tolerance.lower_margin, 0.1);
        assert_eq!(config.output.project_prefix, "FILE");
        assert!(config.output.archive_inputs);
    }
}
