use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::ReportFormat;
use crate::parentage::VerdictThresholds;

/// Settings read from an optional TOML file. CLI flags override them.
///
/// ```toml
/// threads = 4
///
/// [verdict]
/// very_strong = 0.01
/// strong = 0.02
/// supporting = 0.02
/// min_autosomal_markers = 500
///
/// [output]
/// dir = "./reports"
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Worker threads for batch runs (0 = auto-detect)
    pub threads: usize,
    pub verdict: VerdictThresholds,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub format: ReportFormat,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./reports"),
            format: ReportFormat::Json,
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
