//! Command-line interface for the pile checker

pub mod args;
pub mod commands;

pub use args::{Args, InputFormat, ReferenceFormat};
pub use commands::run;
