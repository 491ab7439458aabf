//! Configuration for the pile checker
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! command line overrides applied with the `with_*` builders.

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DATE_SUFFIX, DEFAULT_PROJECT_PREFIX};
use crate::error::{PileError, Result};
use crate::layout::ReportLayout;
use crate::reference::ReferenceColumns;
use crate::validator::ToleranceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where and under which names results are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Prefix of every generated report file name
    pub project_prefix: String,

    /// Appended to the test date to name the per-report directory
    pub date_dir_suffix: String,

    /// Move processed inputs next to their report
    pub archive_inputs: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            project_prefix: DEFAULT_PROJECT_PREFIX.to_string(),
            date_dir_suffix: DATE_SUFFIX.to_string(),
            archive_inputs: false,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Positions of header fields and the pile table in a report page
    pub layout: ReportLayout,

    pub tolerance: ToleranceConfig,

    /// Column headers of the reference database
    pub reference: ReferenceColumns,

    pub output: OutputConfig,
}

impl Config {
    /// Read a JSON configuration file; absent keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            PileError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&text)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Explicit file if given, else the user config file when it exists, else defaults
    pub fn load_layered(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::load(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::load(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;

        let margin = self.tolerance.lower_margin;
        if !margin.is_finite() || margin < 0.0 {
            return Err(PileError::configuration(format!(
                "lower margin must be a non-negative number, got {}",
                margin
            )));
        }

        if self.reference.pile_number.trim().is_empty() {
            return Err(PileError::configuration(
                "reference pile number column must not be empty",
            ));
        }

        if self.output.project_prefix.trim().is_empty() {
            return Err(PileError::configuration("project prefix must not be empty"));
        }

        Ok(())
    }

    pub fn with_layout(mut self, layout: ReportLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_lower_margin(mut self, lower_margin: f64) -> Self {
        self.tolerance.lower_margin = lower_margin;
        self
    }

    pub fn with_project_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output.project_prefix = prefix.into();
        self
    }

    pub fn with_archive_inputs(mut self) -> Self {
        self.output.archive_inputs = true;
        self
    }
}

/// `<user config dir>/pile_checker/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
