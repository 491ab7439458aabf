use anyhow::Context;
use clap::Parser;
use pile_checker::cli::{self, Args};
use std::process;

/// Exit code when the run completed but found faulty or missing piles
const EXIT_FINDINGS: i32 = 2;

fn main() {
    let args = Args::parse();
    let input = args.input_path.clone();

    let result = cli::run(args)
        .with_context(|| format!("Failed to check reports in {}", input.display()));

    match result {
        Ok(stats) if stats.is_clean() => process::exit(0),
        Ok(_) => process::exit(EXIT_FINDINGS),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
