//! Process-wide slot holding at most one loaded catalog.
//!
//! The slot is keyed by the exact, ordered list of sources the catalog was
//! loaded from. Reloads are serialized by a single coarse lock held for the
//! whole load. Callers receive an `Arc<Catalog>`; replacing or unloading the
//! slot never affects catalogs already handed out, so in-flight queries keep
//! working against the catalog they started with.
//!
//! ```rust
//! use quakecat::{CatalogCache, CatalogSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = CatalogCache::new();
//! let sources = vec![CatalogSource::inline(
//!     "mem",
//!     "us 1 1600000000000 4.2 35.0 139.0 10 1 us1 -\n",
//! )];
//!
//! let first = cache.get_or_load(&sources, 0)?;
//! let again = cache.get_or_load(&sources, 0)?;
//! assert!(std::sync::Arc::ptr_eq(&first, &again));
//!
//! cache.unload();
//! assert_eq!(first.len(), 1); // still usable
//! # Ok(())
//! # }
//! ```

use crate::catalog::Catalog;
use crate::config::CatalogSource;
use crate::error::Result;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;

static GLOBAL_CACHE: Lazy<CatalogCache> = Lazy::new(CatalogCache::new);

#[derive(Debug)]
struct CachedCatalog {
    sources: Vec<CatalogSource>,
    catalog: Arc<Catalog>,
}

/// Thread-safe holder of one shared catalog.
#[derive(Debug, Default)]
pub struct CatalogCache {
    slot: Mutex<Option<CachedCatalog>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared process-wide cache.
    pub fn global() -> &'static CatalogCache {
        &GLOBAL_CACHE
    }

    /// Return the cached catalog if it was loaded from exactly `sources`,
    /// otherwise load a fresh one and replace the slot.
    ///
    /// A failed load leaves the previous slot untouched.
    pub fn get_or_load(
        &self,
        sources: &[CatalogSource],
        bin_count_hint: usize,
    ) -> Result<Arc<Catalog>> {
        let mut slot = self.slot.lock();
        if let Some(cached) = slot.as_ref()
            && cached.sources.as_slice() == sources
        {
            return Ok(Arc::clone(&cached.catalog));
        }

        log::info!("Loading catalog from {} sources", sources.len());
        let catalog = Arc::new(Catalog::load(bin_count_hint, sources)?);
        *slot = Some(CachedCatalog {
            sources: sources.to_vec(),
            catalog: Arc::clone(&catalog),
        });
        Ok(catalog)
    }

    /// Drop the cached catalog, returning it if one was loaded.
    pub fn unload(&self) -> Option<Arc<Catalog>> {
        self.slot.lock().take().map(|cached| cached.catalog)
    }

    /// Currently cached catalog, if any.
    pub fn current(&self) -> Option<Arc<Catalog>> {
        self.slot
            .lock()
            .as_ref()
            .map(|cached| Arc::clone(&cached.catalog))
    }

    /// Whether the slot holds a catalog loaded from exactly `sources`.
    pub fn is_loaded_for(&self, sources: &[CatalogSource]) -> bool {
        self.slot
            .lock()
            .as_ref()
            .is_some_and(|cached| cached.sources.as_slice() == sources)
    }
}
