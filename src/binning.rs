//! Latitude/longitude binning for the catalog grid.
//!
//! Rows split latitude into `N` equal bands. Each row gets roughly
//! `2N·sin(colatitude)` longitude columns so that a cell covers about the same
//! area near the poles as at the equator.
//!
//! Longitudes are scaled over `[-360, 360]` rather than `[-180, 180]` so that a
//! query box crossing the date line (e.g. `170..=190`) maps to a contiguous
//! column range. Columns are folded back with `col % count` for storage and
//! lookup.

/// Row count used when the caller does not ask for one.
pub const DEFAULT_BIN_COUNT: usize = 200;

/// Row index for a latitude, clamped to `[0, n - 1]`.
///
/// ```
/// use quakecat::binning::lat_bin;
///
/// assert_eq!(lat_bin(-90.0, 200), 0);
/// assert_eq!(lat_bin(0.0, 200), 100);
/// assert_eq!(lat_bin(90.0, 200), 199);
/// ```
pub fn lat_bin(lat: f64, n: usize) -> usize {
    let scaled = ((lat + 90.0) / 180.0 * n as f64).floor();
    clamp_index(scaled, n)
}

/// Number of longitude columns in `row`, at least one.
pub fn lon_bin_count(row: usize, n: usize) -> usize {
    let colatitude = std::f64::consts::PI * (row as f64 + 0.5) / n as f64;
    let count = (2.0 * n as f64 * colatitude.sin()).round();
    if count < 1.0 { 1 } else { count as usize }
}

/// Unfolded column index for a longitude in a row with `count` columns.
///
/// The result lies in `[0, 2 * count - 1]`; reduce it with `% count` to get
/// the stored column.
pub fn lon_bin(lon: f64, count: usize) -> usize {
    let scaled = ((lon + 360.0) / 360.0 * count as f64).floor();
    clamp_index(scaled, 2 * count)
}

fn clamp_index(scaled: f64, len: usize) -> usize {
    // NaN and negatives both land in the first bin
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else {
        (scaled as usize).min(len - 1)
    }
}

/// Precomputed layout of a catalog grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinningScheme {
    lon_counts: Vec<usize>,
}

impl BinningScheme {
    /// Build the layout for `hint` latitude rows; `0` selects [`DEFAULT_BIN_COUNT`].
    pub fn new(hint: usize) -> Self {
        let n = if hint >= 1 { hint } else { DEFAULT_BIN_COUNT };
        let lon_counts = (0..n).map(|row| lon_bin_count(row, n)).collect();
        Self { lon_counts }
    }

    /// Number of latitude rows.
    pub fn lat_bin_count(&self) -> usize {
        self.lon_counts.len()
    }

    /// Number of longitude columns in `row`.
    pub fn lon_bin_count(&self, row: usize) -> usize {
        self.lon_counts[row]
    }

    pub fn lon_bin_counts(&self) -> &[usize] {
        &self.lon_counts
    }

    pub fn lat_bin(&self, lat: f64) -> usize {
        lat_bin(lat, self.lat_bin_count())
    }

    /// Stored `(row, column)` of a point.
    pub fn cell_of(&self, lat: f64, lon: f64) -> (usize, usize) {
        let row = self.lat_bin(lat);
        let count = self.lon_counts[row];
        (row, lon_bin(lon, count) % count)
    }

    /// Total number of cells across all rows.
    pub fn total_cells(&self) -> usize {
        self.lon_counts.iter().sum()
    }
}

impl Default for BinningScheme {
    fn default() -> Self {
        Self::new(DEFAULT_BIN_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_bin_stays_in_range() {
        for i in -1000..=1000 {
            let lat = i as f64 * 0.1;
            let row = lat_bin(lat, 200);
            assert!(row < 200, "lat {} mapped to row {}", lat, row);
        }
        assert_eq!(lat_bin(f64::NAN, 200), 0);
        assert_eq!(lat_bin(1000.0, 200), 199);
    }

    #[test]
    fn test_lon_bin_count_shrinks_towards_poles() {
        let n = 200;
        let equator = lon_bin_count(n / 2, n);
        let polar = lon_bin_count(0, n);
        assert_eq!(equator, 400);
        assert_eq!(polar, 3);
        assert_eq!(lon_bin_count(0, n), lon_bin_count(n - 1, n));
        assert_eq!(lon_bin_count(0, 1), 2);
    }

    #[test]
    fn test_lon_bin_count_minimum_one() {
        for n in 1..50 {
            for row in 0..n {
                assert!(lon_bin_count(row, n) >= 1);
            }
        }
    }

    #[test]
    fn test_lon_bin_folds_onto_row() {
        let count = 40;
        for i in -1800..=1800 {
            let lon = i as f64 * 0.1;
            let col = lon_bin(lon, count);
            assert!(col < 2 * count);
        }
        // 190 and -170 are the same meridian
        assert_eq!(lon_bin(190.0, count) % count, lon_bin(-170.0, count) % count);
        assert_eq!(lon_bin(-400.0, count), 0);
        assert_eq!(lon_bin(400.0, count), 2 * count - 1);
    }

    #[test]
    fn test_scheme_default_and_total_cells() {
        let scheme = BinningScheme::new(0);
        assert_eq!(scheme.lat_bin_count(), DEFAULT_BIN_COUNT);
        let expected: usize = (0..200).map(|row| lon_bin_count(row, 200)).sum();
        assert_eq!(scheme.total_cells(), expected);
    }

    #[test]
    fn test_cell_of_is_in_bounds() {
        let scheme = BinningScheme::new(17);
        for lat in [-90.0, -45.5, 0.0, 12.25, 90.0] {
            for lon in [-180.0, -179.99, -0.1, 0.0, 90.0, 179.99, 180.0] {
                let (row, col) = scheme.cell_of(lat, lon);
                assert!(row < scheme.lat_bin_count());
                assert!(col < scheme.lon_bin_count(row));
            }
        }
    }
}
