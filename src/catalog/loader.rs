//! Reading record sources into a catalog.

use super::Catalog;
use crate::binning::BinningScheme;
use crate::config::CatalogSource;
use crate::entry::CatalogEntry;
use crate::error::{CatalogError, Result};
use crate::identity::{EntryHandle, IdentityIndex, Registration};
use quakecat_types::stats::CatalogStats;
use std::io::BufRead;
use std::time::Instant;

/// Parse every record of `source` in order, handing each to `visit` along with
/// its 1-based line number. Blank lines are skipped; the first malformed
/// record aborts the scan.
pub(crate) fn for_each_record<F>(source: &CatalogSource, mut visit: F) -> Result<()>
where
    F: FnMut(usize, CatalogEntry) -> Result<()>,
{
    let name = source.name();
    log::debug!("Reading catalog source {}", name);

    let reader = source.open()?;
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| CatalogError::io(format!("{}:{}", name, line_no), e))?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = CatalogEntry::parse_strict(&line).map_err(|e| e.at_line(&name, line_no))?;
        visit(line_no, entry)?;
    }
    Ok(())
}

/// Mutable state of a load in progress.
pub(crate) struct CatalogLoader {
    scheme: BinningScheme,
    index: IdentityIndex,
    cells: Vec<Vec<Vec<EntryHandle>>>,
    stats: CatalogStats,
}

impl CatalogLoader {
    pub(crate) fn new(bin_count_hint: usize) -> Self {
        let scheme = BinningScheme::new(bin_count_hint);
        let cells = scheme
            .lon_bin_counts()
            .iter()
            .map(|&count| vec![Vec::new(); count])
            .collect();
        Self {
            scheme,
            index: IdentityIndex::new(),
            cells,
            stats: CatalogStats::new(),
        }
    }

    /// Resolve the entry's ids and bin it, unless it is a hard duplicate.
    pub(crate) fn ingest(&mut self, entry: CatalogEntry) -> Option<EntryHandle> {
        let (time_ms, depth, magnitude) = (entry.time_ms(), entry.depth_km(), entry.magnitude());
        let (row, col) = self.scheme.cell_of(entry.latitude(), entry.longitude());

        match self.index.register_identities(entry) {
            Registration::Accepted(handle) => {
                self.stats.record_event(time_ms, depth, magnitude);
                self.cells[row][col].push(handle);
                Some(handle)
            }
            Registration::Duplicate(_) => {
                self.stats.record_duplicate();
                None
            }
        }
    }

    pub(crate) fn read_source(&mut self, source: &CatalogSource) -> Result<()> {
        for_each_record(source, |_, entry| {
            self.ingest(entry);
            Ok(())
        })
    }

    /// Sort every cell by time, freeze it and fold it into the statistics.
    pub(crate) fn finish(self) -> Catalog {
        let CatalogLoader {
            scheme,
            index,
            cells,
            mut stats,
        } = self;

        let mut grid: Vec<Vec<Box<[EntryHandle]>>> = Vec::with_capacity(cells.len());
        for row in cells {
            let mut frozen = Vec::with_capacity(row.len());
            for mut cell in row {
                // Stable: equal times keep load order
                cell.sort_by_key(|&handle| index.get(handle).time_ms());
                stats.record_cell(cell.len());
                frozen.push(cell.into_boxed_slice());
            }
            grid.push(frozen);
        }

        Catalog {
            scheme,
            index,
            grid,
            stats,
        }
    }
}

pub(crate) fn load_sources(bin_count_hint: usize, sources: &[CatalogSource]) -> Result<Catalog> {
    let started = Instant::now();
    let mut loader = CatalogLoader::new(bin_count_hint);
    for source in sources {
        loader.read_source(source)?;
    }
    let catalog = loader.finish();

    let stats = catalog.stats();
    log::info!(
        "Loaded {} events from {} sources ({} duplicates skipped) into {} cells in {:?}",
        stats.event_count,
        sources.len(),
        stats.duplicates_discarded,
        stats.cell_count,
        started.elapsed()
    );
    Ok(catalog)
}
