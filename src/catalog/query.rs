//! Region / time / depth / magnitude queries over a loaded catalog.

use super::Catalog;
use crate::binning::lon_bin;
use crate::entry::CatalogEntry;
use crate::error::{CatalogError, Result};
use quakecat_types::region::Region;
use smallvec::SmallVec;
use std::ops::ControlFlow;
use std::time::{SystemTime, UNIX_EPOCH};

/// Filter for [`Catalog::visit`].
///
/// A window with `end_time_ms == start_time_ms` is open-ended: it reaches up
/// to the time of the query.
///
/// ```
/// use quakecat::CatalogQuery;
/// use quakecat_types::region::Region;
///
/// let query = CatalogQuery::new()
///     .region(Region::circle(35.0, 139.0, 300.0))
///     .time_window(1_600_000_000_000, 1_600_086_400_000)
///     .depth_range(0.0, 100.0)
///     .min_magnitude(4.5)
///     .exclude("us1000abcd");
/// assert_eq!(query.exclude_id.as_deref(), Some("us1000abcd"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub region: Region,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub min_depth_km: f64,
    pub max_depth_km: f64,
    pub min_magnitude: f64,
    /// Event to leave out of the results, by primary id or alias
    pub exclude_id: Option<String>,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn time_window(mut self, start_time_ms: i64, end_time_ms: i64) -> Self {
        self.start_time_ms = start_time_ms;
        self.end_time_ms = end_time_ms;
        self
    }

    pub fn depth_range(mut self, min_depth_km: f64, max_depth_km: f64) -> Self {
        self.min_depth_km = min_depth_km;
        self.max_depth_km = max_depth_km;
        self
    }

    pub fn min_magnitude(mut self, min_magnitude: f64) -> Self {
        self.min_magnitude = min_magnitude;
        self
    }

    pub fn exclude(mut self, id: impl Into<String>) -> Self {
        self.exclude_id = Some(id.into());
        self
    }

    /// Check the query against the current time `now_ms`.
    pub fn validate(&self, now_ms: i64) -> Result<()> {
        let depths_ordered = self.min_depth_km < self.max_depth_km;
        if !depths_ordered {
            return Err(CatalogError::InvalidArgument(format!(
                "Minimum depth {} must be below maximum depth {}",
                self.min_depth_km, self.max_depth_km
            )));
        }
        if self.start_time_ms >= now_ms {
            return Err(CatalogError::InvalidArgument(format!(
                "Start time {} must be before now ({})",
                self.start_time_ms, now_ms
            )));
        }
        if self.start_time_ms > self.end_time_ms {
            return Err(CatalogError::InvalidArgument(format!(
                "Start time {} is after end time {}",
                self.start_time_ms, self.end_time_ms
            )));
        }
        Ok(())
    }

    /// Inclusive end of the window, resolving the open-ended convention.
    ///
    /// An explicit end is inclusive. An open-ended window is `[start, now)`,
    /// so its last included millisecond is `now_ms - 1`.
    pub fn effective_end(&self, now_ms: i64) -> i64 {
        if self.end_time_ms == self.start_time_ms {
            now_ms - 1
        } else {
            self.end_time_ms
        }
    }
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            region: Region::world(),
            start_time_ms: 0,
            end_time_ms: 0,
            min_depth_km: -100.0,
            max_depth_km: 1000.0,
            min_magnitude: -10.0,
            exclude_id: None,
        }
    }
}

/// Milliseconds since the Unix epoch; zero if the clock is before it.
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

impl Catalog {
    /// Call `visitor` for every entry matching `query`.
    ///
    /// The visitor can stop the scan by returning [`ControlFlow::Break`]; the
    /// break value is handed back as is. Entries come out time-ascending
    /// within a cell, with no ordering guarantee across cells.
    ///
    /// ```
    /// use quakecat::{Catalog, CatalogQuery, CatalogSource};
    /// use std::ops::ControlFlow;
    ///
    /// let records = "us 1 1600000000000 4.2 35.0 139.0 10 1 us1 -\n\
    ///                us 2 1600000001000 5.0 35.1 139.1 12 1 us2 -\n";
    /// let catalog = Catalog::load(0, &[CatalogSource::inline("mem", records)])?;
    ///
    /// let first_big = catalog.visit(&CatalogQuery::new().min_magnitude(4.5), |entry| {
    ///     ControlFlow::Break(entry.primary_id().to_string())
    /// })?;
    /// assert_eq!(first_big, ControlFlow::Break("us2".to_string()));
    /// # Ok::<(), quakecat::CatalogError>(())
    /// ```
    pub fn visit<'a, B, F>(&'a self, query: &CatalogQuery, visitor: F) -> Result<ControlFlow<B>>
    where
        F: FnMut(&'a CatalogEntry) -> ControlFlow<B>,
    {
        self.visit_at(now_ms(), query, visitor)
    }

    /// [`Catalog::visit`] with an explicit notion of "now".
    pub fn visit_at<'a, B, F>(
        &'a self,
        now_ms: i64,
        query: &CatalogQuery,
        mut visitor: F,
    ) -> Result<ControlFlow<B>>
    where
        F: FnMut(&'a CatalogEntry) -> ControlFlow<B>,
    {
        query.validate(now_ms)?;
        let start = query.start_time_ms;
        let end = query.effective_end(now_ms);

        let mut excluded: SmallVec<[&str; 2]> = SmallVec::new();
        if let Some(id) = query.exclude_id.as_deref() {
            excluded.push(id);
            if let Some(owner) = self.lookup(id) {
                excluded.push(owner.primary_id());
            }
        }

        let bounds = query.region.bounds();
        let first_row = self.scheme.lat_bin(bounds.min_lat);
        let last_row = self.scheme.lat_bin(bounds.max_lat);

        for row in first_row..=last_row {
            let count = self.scheme.lon_bin_count(row);
            let first_col = lon_bin(bounds.min_lon, count);
            let mut last_col = lon_bin(bounds.max_lon, count).max(first_col);
            // One full wrap at most, so no cell is visited twice
            if last_col - first_col >= count {
                last_col = first_col + count - 1;
            }

            for col in first_col..=last_col {
                let cell = &self.grid[row][col % count];
                let first = cell.partition_point(|&handle| self.index.get(handle).time_ms() < start);

                for &handle in &cell[first..] {
                    let entry = self.index.get(handle);
                    if entry.time_ms() > end {
                        break;
                    }
                    if entry.magnitude() >= query.min_magnitude
                        && query.region.contains(entry.latitude(), entry.longitude())
                        && entry.depth_km() >= query.min_depth_km
                        && entry.depth_km() <= query.max_depth_km
                        && !excluded.contains(&entry.primary_id())
                    {
                        if let ControlFlow::Break(value) = visitor(entry) {
                            return Ok(ControlFlow::Break(value));
                        }
                    }
                }
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Collect every entry matching `query`.
    pub fn fetch_list(&self, query: &CatalogQuery) -> Result<Vec<&CatalogEntry>> {
        let mut found = Vec::new();
        let _ = self.visit(query, |entry| {
            found.push(entry);
            ControlFlow::<()>::Continue(())
        })?;
        Ok(found)
    }

    /// Number of entries matching `query`.
    pub fn count(&self, query: &CatalogQuery) -> Result<usize> {
        let mut count = 0;
        let _ = self.visit(query, |_| {
            count += 1;
            ControlFlow::<()>::Continue(())
        })?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quakecat_types::event::EventSummary;

    const NOW: i64 = 1_700_000_000_000;

    fn entry(id: &str, time_ms: i64, mag: f64, lat: f64, lon: f64, depth: f64) -> CatalogEntry {
        CatalogEntry::from_event(&EventSummary::new(id, time_ms, mag, lat, lon, depth)).unwrap()
    }

    fn fixture() -> Catalog {
        Catalog::from_entries(
            60,
            vec![
                entry("ak1", NOW - 5_000, 3.0, 61.0, -150.0, 40.0),
                entry("ak2", NOW - 4_000, 5.5, 61.2, -149.8, 10.0),
                entry("fj1", NOW - 3_000, 6.0, -18.0, 179.9, 550.0),
                entry("fj2", NOW - 2_000, 4.0, -18.2, -179.9, 600.0),
                entry("ci1", NOW - 1_000, 2.5, 34.0, -118.0, 8.0),
            ],
        )
    }

    fn ids(found: &[&CatalogEntry]) -> Vec<String> {
        let mut ids: Vec<String> = found.iter().map(|e| e.primary_id().to_string()).collect();
        ids.sort();
        ids
    }

    fn fetch(catalog: &Catalog, query: &CatalogQuery) -> Vec<String> {
        let mut found = Vec::new();
        let _ = catalog
            .visit_at(NOW, query, |entry| {
                found.push(entry);
                ControlFlow::<()>::Continue(())
            })
            .unwrap();
        ids(&found)
    }

    #[test]
    fn test_world_query_sees_everything() {
        let catalog = fixture();
        assert_eq!(fetch(&catalog, &CatalogQuery::new()).len(), 5);
    }

    #[test]
    fn test_rectangle_across_date_line() {
        let catalog = fixture();
        let query = CatalogQuery::new().region(Region::rectangle(-20.0, -15.0, 179.0, 181.0));
        assert_eq!(fetch(&catalog, &query), vec!["fj1", "fj2"]);
    }

    #[test]
    fn test_circle_query() {
        let catalog = fixture();
        let query = CatalogQuery::new().region(Region::circle(61.1, -149.9, 50.0));
        assert_eq!(fetch(&catalog, &query), vec!["ak1", "ak2"]);
    }

    #[test]
    fn test_magnitude_and_depth_filters() {
        let catalog = fixture();
        let query = CatalogQuery::new().min_magnitude(4.0);
        assert_eq!(fetch(&catalog, &query), vec!["ak2", "fj1", "fj2"]);

        let query = CatalogQuery::new().depth_range(500.0, 580.0);
        assert_eq!(fetch(&catalog, &query), vec!["fj1"]);
    }

    #[test]
    fn test_time_window_is_inclusive() {
        let catalog = fixture();
        let query = CatalogQuery::new().time_window(NOW - 4_000, NOW - 2_000);
        assert_eq!(fetch(&catalog, &query), vec!["ak2", "fj1", "fj2"]);
    }

    #[test]
    fn test_equal_start_and_end_reaches_now() {
        let catalog = fixture();
        let query = CatalogQuery::new().time_window(NOW - 2_000, NOW - 2_000);
        assert_eq!(fetch(&catalog, &query), vec!["ci1", "fj2"]);
    }

    #[test]
    fn test_open_ended_window_stops_before_now() {
        let catalog = Catalog::from_entries(
            20,
            vec![
                entry("tt1", NOW - 1, 1.0, 0.0, 0.0, 1.0),
                entry("tt2", NOW, 1.0, 0.0, 0.0, 1.0),
            ],
        );
        let open = CatalogQuery::new().time_window(NOW - 10, NOW - 10);
        assert_eq!(open.effective_end(NOW), NOW - 1);
        assert_eq!(fetch(&catalog, &open), vec!["tt1"]);

        // An explicit end keeps its last millisecond
        let closed = CatalogQuery::new().time_window(NOW - 10, NOW);
        assert_eq!(fetch(&catalog, &closed), vec!["tt1", "tt2"]);
    }

    #[test]
    fn test_rectangle_given_past_a_full_turn() {
        let catalog = Catalog::from_entries(
            60,
            vec![
                entry("w1", NOW - 40, 1.0, 0.0, -100.0, 1.0),
                entry("w2", NOW - 30, 1.0, 0.0, 0.0, 1.0),
                entry("w3", NOW - 20, 1.0, 0.0, 60.0, 1.0),
                entry("w4", NOW - 10, 1.0, 0.0, 100.0, 1.0),
                entry("w5", NOW - 5, 1.0, 0.0, 150.0, 1.0),
            ],
        );
        let query = CatalogQuery::new().region(Region::rectangle(-10.0, 10.0, 240.0, 428.0));
        assert_eq!(fetch(&catalog, &query), vec!["w1", "w2", "w3"]);

        let query = CatalogQuery::new().region(Region::rectangle(-10.0, 10.0, 170.0, 500.0));
        assert_eq!(fetch(&catalog, &query), vec!["w1", "w2", "w3", "w4"]);
    }

    #[test]
    fn test_exclude_by_alias() {
        let event = EventSummary::new("pp1", NOW - 10, 1.0, 0.0, 0.0, 1.0).with_alias("alias1");
        let catalog = Catalog::from_entries(
            20,
            vec![
                CatalogEntry::from_event(&event).unwrap(),
                entry("pp2", NOW - 20, 1.0, 0.0, 0.0, 1.0),
            ],
        );
        let query = CatalogQuery::new().exclude("alias1");
        assert_eq!(fetch(&catalog, &query), vec!["pp2"]);
        let query = CatalogQuery::new().exclude("pp2");
        assert_eq!(fetch(&catalog, &query), vec!["pp1"]);
    }

    #[test]
    fn test_break_stops_the_scan() {
        let catalog = fixture();
        let mut calls = 0;
        let flow = catalog
            .visit_at(NOW, &CatalogQuery::new(), |_| {
                calls += 1;
                if calls == 2 {
                    ControlFlow::Break(7)
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(flow, ControlFlow::Break(7));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_invalid_arguments() {
        let catalog = fixture();
        let mut visited = false;
        let mut visit = |query: CatalogQuery| {
            catalog.visit_at(NOW, &query, |_| {
                visited = true;
                ControlFlow::<()>::Continue(())
            })
        };

        assert!(matches!(
            visit(CatalogQuery::new().depth_range(10.0, 10.0)),
            Err(CatalogError::InvalidArgument(_))
        ));
        assert!(matches!(
            visit(CatalogQuery::new().time_window(NOW, NOW + 10)),
            Err(CatalogError::InvalidArgument(_))
        ));
        assert!(matches!(
            visit(CatalogQuery::new().time_window(NOW - 10, NOW - 20)),
            Err(CatalogError::InvalidArgument(_))
        ));
        assert!(!visited);
    }

    #[test]
    fn test_wide_box_visits_each_cell_once() {
        let catalog = fixture();
        let query = CatalogQuery::new().region(Region::rectangle(-90.0, 90.0, -360.0, 360.0));
        assert_eq!(fetch(&catalog, &query).len(), 5);
    }

    #[test]
    fn test_fetch_list_and_count() {
        let catalog = Catalog::from_entries(10, vec![entry("zz1", 1_000, 1.0, 1.0, 1.0, 1.0)]);
        let query = CatalogQuery::new().time_window(0, 2_000);
        assert_eq!(catalog.fetch_list(&query).unwrap().len(), 1);
        assert_eq!(catalog.count(&query).unwrap(), 1);
    }
}
