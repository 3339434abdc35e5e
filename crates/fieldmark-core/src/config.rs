use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Candidates longer than this (in chars) skip the longest-substring
    /// strategy. `None` keeps it for every candidate.
    pub fuzzy_candidate_cap: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Map fields on the rayon pool. Output order is the same either way.
    pub parallel: bool,
    pub locator: LocatorConfig,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            locator: LocatorConfig::default(),
        }
    }
}

impl MapperConfig {
    pub fn serial() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse mapper config")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid config in {}", path.display()))
    }
}
