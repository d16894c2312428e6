use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Catalog load statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Number of accepted (non-duplicate) events
    pub event_count: usize,
    /// Records discarded because their primary id was already loaded
    pub duplicates_discarded: usize,
    /// Earliest and latest origin time, milliseconds since the epoch
    pub time_range: Option<(i64, i64)>,
    /// Shallowest and deepest depth, kilometers
    pub depth_range: Option<(f64, f64)>,
    /// Smallest and largest magnitude
    pub magnitude_range: Option<(f64, f64)>,
    /// Total number of grid cells
    pub cell_count: usize,
    /// Largest number of events held by a single cell
    pub max_cell_population: usize,
    /// Cell population -> number of cells with that population
    pub population_histogram: BTreeMap<usize, usize>,
}

impl CatalogStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an accepted event into the counters and ranges.
    pub fn record_event(&mut self, time_ms: i64, depth_km: f64, magnitude: f64) {
        self.event_count += 1;
        self.time_range = Some(match self.time_range {
            Some((lo, hi)) => (lo.min(time_ms), hi.max(time_ms)),
            None => (time_ms, time_ms),
        });
        self.depth_range = Some(widen(self.depth_range, depth_km));
        self.magnitude_range = Some(widen(self.magnitude_range, magnitude));
    }

    pub fn record_duplicate(&mut self) {
        self.duplicates_discarded += 1;
    }

    /// Fold a finished cell's population into the histogram.
    pub fn record_cell(&mut self, population: usize) {
        self.cell_count += 1;
        self.max_cell_population = self.max_cell_population.max(population);
        *self.population_histogram.entry(population).or_insert(0) += 1;
    }

    /// Sum of `population * cells` over the histogram; equals `event_count`
    /// once every cell has been recorded.
    pub fn histogram_total(&self) -> usize {
        self.population_histogram
            .iter()
            .map(|(population, cells)| population * cells)
            .sum()
    }

    /// Number of cells holding at least one event.
    pub fn occupied_cells(&self) -> usize {
        self.population_histogram
            .iter()
            .filter(|(population, _)| **population > 0)
            .map(|(_, cells)| cells)
            .sum()
    }
}

fn widen(range: Option<(f64, f64)>, value: f64) -> (f64, f64) {
    match range {
        Some((lo, hi)) => (lo.min(value), hi.max(value)),
        None => (value, value),
    }
}

impl fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "events:              {}", self.event_count)?;
        writeln!(f, "duplicates skipped:  {}", self.duplicates_discarded)?;
        if let Some((lo, hi)) = self.time_range {
            writeln!(f, "time range (ms):     {} .. {}", lo, hi)?;
        }
        if let Some((lo, hi)) = self.depth_range {
            writeln!(f, "depth range (km):    {} .. {}", lo, hi)?;
        }
        if let Some((lo, hi)) = self.magnitude_range {
            writeln!(f, "magnitude range:     {} .. {}", lo, hi)?;
        }
        writeln!(
            f,
            "cells:               {} ({} occupied)",
            self.cell_count,
            self.occupied_cells()
        )?;
        writeln!(f, "max cell population: {}", self.max_cell_population)?;
        writeln!(f, "population histogram:")?;
        for (population, cells) in &self.population_histogram {
            writeln!(f, "  {:>8} {:>8}", population, cells)?;
        }
        Ok(())
    }
}
