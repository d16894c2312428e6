//! The in-memory seismic event catalog.
//!
//! A [`Catalog`] is built once by [`Catalog::load`] and is immutable
//! afterwards, so it can be shared across threads and queried concurrently
//! without locking.

use crate::binning::BinningScheme;
use crate::config::CatalogSource;
use crate::entry::CatalogEntry;
use crate::error::Result;
use crate::identity::{EntryHandle, IdentityIndex};
use quakecat_types::stats::CatalogStats;

mod loader;
mod query;

pub(crate) use loader::for_each_record;
pub use query::CatalogQuery;

/// Binned, time-sorted collection of seismic events.
///
/// Events live in an arena owned by the identity index; the grid holds
/// handles into it. Row `r` of the grid has `lon_bin_count(r)` cells and each
/// cell is sorted ascending by origin time.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub(crate) scheme: BinningScheme,
    pub(crate) index: IdentityIndex,
    pub(crate) grid: Vec<Vec<Box<[EntryHandle]>>>,
    pub(crate) stats: CatalogStats,
}

impl Catalog {
    /// Load a catalog from flat-text sources, in the order given.
    ///
    /// `bin_count_hint` is the number of latitude rows; `0` selects the
    /// default of 200. Identity conflicts are resolved as records arrive and
    /// hard duplicates are dropped. Any unreadable source or malformed record
    /// aborts the whole load.
    ///
    /// ```
    /// use quakecat::{Catalog, CatalogSource};
    ///
    /// let records = "us 1000a 1600000000000 4.2 35.0 139.0 10 1 us1000a Tokyo\n";
    /// let catalog = Catalog::load(0, &[CatalogSource::inline("mem", records)])?;
    /// assert_eq!(catalog.len(), 1);
    /// assert_eq!(catalog.bin_count(), 200);
    /// # Ok::<(), quakecat::CatalogError>(())
    /// ```
    pub fn load(bin_count_hint: usize, sources: &[CatalogSource]) -> Result<Self> {
        loader::load_sources(bin_count_hint, sources)
    }

    /// Build a catalog from entries that are already in memory.
    pub fn from_entries<I>(bin_count_hint: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        let mut loader = loader::CatalogLoader::new(bin_count_hint);
        for entry in entries {
            loader.ingest(entry);
        }
        loader.finish()
    }

    /// Entry owning `id`, by primary id or alias.
    pub fn lookup(&self, id: &str) -> Option<&CatalogEntry> {
        self.index.resolve(id)
    }

    /// Accepted entries in load order.
    pub fn entries(&self) -> &[CatalogEntry] {
        self.index.entries()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of latitude rows.
    pub fn bin_count(&self) -> usize {
        self.scheme.lat_bin_count()
    }

    pub fn scheme(&self) -> &BinningScheme {
        &self.scheme
    }

    pub fn stats(&self) -> &CatalogStats {
        &self.stats
    }

    /// Entries stored in one cell, time-ascending. Columns wrap around the row.
    pub fn cell(&self, row: usize, col: usize) -> impl Iterator<Item = &CatalogEntry> + '_ {
        let cells = self.grid.get(row);
        let handles: &[EntryHandle] = match cells {
            Some(cells) if !cells.is_empty() => &cells[col % cells.len()][..],
            _ => &[],
        };
        handles.iter().map(|&handle| self.index.get(handle))
    }

    /// Population of every cell, row by row.
    pub fn cell_populations(&self) -> Vec<Vec<usize>> {
        self.grid
            .iter()
            .map(|row| row.iter().map(|cell| cell.len()).collect())
            .collect()
    }
}
