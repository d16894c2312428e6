//! Catalog configuration and record sources.

use crate::binning::DEFAULT_BIN_COUNT;
use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::PathBuf;

/// Bin counts above this are accepted but logged; each row allocates
/// `~2N` cells, so memory grows quadratically.
const LARGE_BIN_COUNT: usize = 5_000;

/// A place flat-text catalog records are read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogSource {
    /// A file on disk, one record per line
    Path(PathBuf),
    /// Records held in memory
    Inline { name: String, text: String },
}

impl CatalogSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        CatalogSource::Path(path.into())
    }

    pub fn inline(name: impl Into<String>, text: impl Into<String>) -> Self {
        CatalogSource::Inline {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Human-readable name used in logs and error messages.
    pub fn name(&self) -> String {
        match self {
            CatalogSource::Path(path) => path.display().to_string(),
            CatalogSource::Inline { name, .. } => name.clone(),
        }
    }

    /// Open the source for line-by-line reading.
    pub fn open(&self) -> Result<Box<dyn BufRead + '_>> {
        match self {
            CatalogSource::Path(path) => {
                let file = File::open(path).map_err(|e| CatalogError::io(self.name(), e))?;
                Ok(Box::new(BufReader::new(file)))
            }
            CatalogSource::Inline { text, .. } => Ok(Box::new(Cursor::new(text.as_bytes()))),
        }
    }
}

impl From<PathBuf> for CatalogSource {
    fn from(path: PathBuf) -> Self {
        CatalogSource::Path(path)
    }
}

impl From<&str> for CatalogSource {
    fn from(path: &str) -> Self {
        CatalogSource::Path(PathBuf::from(path))
    }
}

/// Catalog configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Number of latitude rows; `0` selects the default
    #[serde(default = "CatalogConfig::default_bin_count")]
    pub bin_count: usize,

    /// Record sources, loaded in order
    #[serde(default)]
    pub sources: Vec<CatalogSource>,
}

impl CatalogConfig {
    const fn default_bin_count() -> usize {
        DEFAULT_BIN_COUNT
    }

    pub fn with_bin_count(mut self, bin_count: usize) -> Self {
        if bin_count > LARGE_BIN_COUNT {
            log::warn!(
                "Bin count of {} is very large; the grid will hold roughly {} cells.",
                bin_count,
                bin_count.saturating_mul(bin_count).saturating_mul(4) / 3
            );
        }
        self.bin_count = bin_count;
        self
    }

    pub fn with_source(mut self, source: impl Into<CatalogSource>) -> Self {
        self.sources.push(source.into());
        self
    }

    /// Row count the catalog will actually use.
    pub fn effective_bin_count(&self) -> usize {
        if self.bin_count >= 1 {
            self.bin_count
        } else {
            DEFAULT_BIN_COUNT
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(CatalogError::Config(
                "At least one catalog source is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: CatalogConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: CatalogConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            bin_count: Self::default_bin_count(),
            sources: Vec::new(),
        }
    }
}
