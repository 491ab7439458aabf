//! Input discovery for report batches
//!
//! Reports come as two files sharing a name: `text_<name>` with the measured
//! pile table and `graphics_<name>` with the signal plots. Only the text file
//! is parsed; the graphics file is counted as an attachment.

use crate::constants::{GRAPHICS_PREFIX, TEXT_PREFIX};
use crate::error::{PileError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Text report with its optional graphics attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPair {
    pub name: String,
    pub text: PathBuf,
    pub graphics: Option<PathBuf>,
}

/// Finds report pairs in an input directory
#[derive(Debug)]
pub struct FileDiscovery {
    input_path: PathBuf,
    extension: String,
}

impl FileDiscovery {
    pub fn new(input_path: PathBuf, extension: impl Into<String>) -> Self {
        Self {
            input_path,
            extension: extension.into(),
        }
    }

    /// Discover all text reports and pair them with their graphics files
    ///
    /// Pairs are returned sorted by their shared name so a run always
    /// processes reports in the same order.
    pub fn discover_pairs(&self) -> Result<Vec<ReportPair>> {
        if !self.input_path.is_dir() {
            return Err(PileError::InputNotFound {
                path: self.input_path.clone(),
            });
        }

        let pattern = self
            .input_path
            .join(format!("*.{}", self.extension))
            .to_string_lossy()
            .to_string();
        debug!("Searching for reports with pattern: {}", pattern);

        let name_pattern = Regex::new(&format!(
            r"^({}|{})_(.+)\.{}$",
            TEXT_PREFIX,
            GRAPHICS_PREFIX,
            regex::escape(&self.extension)
        ))
        .map_err(|e| PileError::configuration(format!("invalid extension pattern: {}", e)))?;

        let entries = glob::glob(&pattern)
            .map_err(|e| PileError::configuration(format!("invalid input pattern: {}", e)))?;

        let mut texts = BTreeMap::new();
        let mut graphics = BTreeMap::new();
        for entry in entries {
            let path = entry.map_err(|e| PileError::Io(e.into()))?;
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(captures) = name_pattern.captures(file_name) else {
                debug!("Ignoring {}", path.display());
                continue;
            };
            let shared = captures[2].to_string();
            if &captures[1] == TEXT_PREFIX {
                texts.insert(shared, path);
            } else {
                graphics.insert(shared, path);
            }
        }

        let pairs: Vec<ReportPair> = texts
            .into_iter()
            .map(|(name, text)| {
                let graphics = graphics.remove(&name);
                if graphics.is_none() {
                    warn!("No graphics attachment for report '{}'", name);
                }
                ReportPair {
                    name,
                    text,
                    graphics,
                }
            })
            .collect();

        for orphan in graphics.keys() {
            warn!("Graphics file '{}' has no matching text report", orphan);
        }

        debug!("Found {} report pairs", pairs.len());
        Ok(pairs)
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }
}
