//! Catalog builder for flexible configuration
//!
//! Collects a bin count and an ordered list of sources, then loads either a
//! standalone [`Catalog`] or one shared through a [`CatalogCache`].

use crate::cache::CatalogCache;
use crate::catalog::Catalog;
use crate::config::{CatalogConfig, CatalogSource};
use crate::error::Result;
use std::sync::Arc;

/// Builder for catalogs.
///
/// ```
/// use quakecat::CatalogBuilder;
///
/// let catalog = CatalogBuilder::new()
///     .bin_count(90)
///     .inline("mem", "us 1 1600000000000 4.2 35.0 139.0 10 1 us1 -\n")
///     .build()?;
/// assert_eq!(catalog.bin_count(), 90);
/// # Ok::<(), quakecat::CatalogError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    config: CatalogConfig,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of latitude rows; `0` selects the default.
    pub fn bin_count(mut self, bin_count: usize) -> Self {
        self.config = self.config.with_bin_count(bin_count);
        self
    }

    /// Append a source. Sources load in the order they are added.
    pub fn source(mut self, source: impl Into<CatalogSource>) -> Self {
        self.config.sources.push(source.into());
        self
    }

    pub fn sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CatalogSource>,
    {
        self.config
            .sources
            .extend(sources.into_iter().map(Into::into));
        self
    }

    /// Append in-memory records.
    pub fn inline(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.source(CatalogSource::inline(name, text))
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: CatalogConfig) -> Self {
        self.config = config;
        self
    }

    pub fn get_config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Load the catalog.
    pub fn build(self) -> Result<Catalog> {
        self.config.validate()?;
        Catalog::load(self.config.bin_count, &self.config.sources)
    }

    /// Load through `cache`, reusing its catalog when the sources match.
    pub fn build_cached(self, cache: &CatalogCache) -> Result<Arc<Catalog>> {
        self.config.validate()?;
        cache.get_or_load(&self.config.sources, self.config.bin_count)
    }
}
