use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers, matching the radius `geo`'s haversine uses.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A spherical-coordinate area used to filter catalog queries.
///
/// Longitudes of a rectangle may lie outside `[-180, 180]` so that a region
/// can cross the date line (for example `170..=190`).
///
/// # Examples
///
/// ```
/// use quakecat_types::region::Region;
///
/// // Fiji area, crossing the antimeridian
/// let fiji = Region::rectangle(-25.0, -10.0, 170.0, 190.0);
/// assert!(fiji.contains(-18.0, 178.0));
/// assert!(fiji.contains(-18.0, -178.0));
/// assert!(!fiji.contains(-18.0, 160.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Region {
    /// Every point within `radius_km` great-circle distance of the center.
    Circle {
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    },
    /// A latitude/longitude rectangle, bounds inclusive.
    Rectangle {
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },
}

/// Lat/lon bounding box of a region.
///
/// Longitudes may extend beyond `[-180, 180]` when the region crosses the
/// date line; consumers fold them back onto the globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl RegionBounds {
    /// Longitudinal extent in degrees.
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }
}

impl Region {
    /// Create a circular region around `(latitude, longitude)`.
    pub fn circle(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Region::Circle {
            latitude,
            longitude,
            radius_km,
        }
    }

    /// Create a rectangular region.
    ///
    /// A `max_lon` smaller than `min_lon` is read as a rectangle crossing the
    /// date line and shifted by a full turn. Both longitudes are then moved by
    /// whole turns so the box starts inside [-180, 180).
    pub fn rectangle(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        let max_lon = if max_lon < min_lon {
            max_lon + 360.0
        } else {
            max_lon
        };
        let (min_lon, max_lon) = wrap_lon_span(min_lon, max_lon);
        Region::Rectangle {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// The whole globe.
    pub fn world() -> Self {
        Region::Rectangle {
            min_lat: -90.0,
            max_lat: 90.0,
            min_lon: -180.0,
            max_lon: 180.0,
        }
    }

    /// Check whether a point lies inside the region.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        match *self {
            Region::Circle {
                latitude,
                longitude,
                radius_km,
            } => {
                let center = Point::new(longitude, latitude);
                let point = Point::new(lon, lat);
                Haversine.distance(center, point) <= radius_km * 1000.0
            }
            Region::Rectangle {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            } => {
                if lat < min_lat || lat > max_lat {
                    return false;
                }
                if max_lon - min_lon >= 360.0 {
                    return true;
                }
                // Shift lon into [min_lon, min_lon + 360) before comparing.
                let shifted = min_lon + (lon - min_lon).rem_euclid(360.0);
                shifted <= max_lon
            }
        }
    }

    /// Bounding box enclosing the region.
    ///
    /// For circles the latitude extent is exact on the sphere; the longitude
    /// extent is the tangent-meridian extent, or the full globe when the
    /// circle covers a pole.
    pub fn bounds(&self) -> RegionBounds {
        match *self {
            Region::Circle {
                latitude,
                longitude,
                radius_km,
            } => {
                let angular = radius_km.max(0.0) / EARTH_RADIUS_KM;
                let delta_lat = angular.to_degrees();
                let min_lat = latitude - delta_lat;
                let max_lat = latitude + delta_lat;

                if min_lat <= -90.0 || max_lat >= 90.0 || angular >= std::f64::consts::PI {
                    return RegionBounds {
                        min_lat: min_lat.max(-90.0),
                        max_lat: max_lat.min(90.0),
                        min_lon: -180.0,
                        max_lon: 180.0,
                    };
                }

                let ratio = angular.sin() / latitude.to_radians().cos();
                if ratio >= 1.0 {
                    return RegionBounds {
                        min_lat,
                        max_lat,
                        min_lon: -180.0,
                        max_lon: 180.0,
                    };
                }

                let delta_lon = ratio.asin().to_degrees();
                let (min_lon, max_lon) = wrap_lon_span(longitude - delta_lon, longitude + delta_lon);
                RegionBounds {
                    min_lat,
                    max_lat,
                    min_lon,
                    max_lon,
                }
            }
            Region::Rectangle {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            } => {
                // Deserialized rectangles skip the constructor
                let (min_lon, max_lon) = wrap_lon_span(min_lon, max_lon);
                RegionBounds {
                    min_lat,
                    max_lat,
                    min_lon,
                    max_lon,
                }
            }
        }
    }
}

/// Move a longitude span by whole turns so it lies within [-360, 360] and
/// starts at or after -180 unless that would push its end past 360.
/// Spans of a full turn or more become the whole globe.
fn wrap_lon_span(min_lon: f64, max_lon: f64) -> (f64, f64) {
    if max_lon - min_lon >= 360.0 {
        return (-180.0, 180.0);
    }
    let (mut min_lon, mut max_lon) = (min_lon, max_lon);
    if !(-180.0..180.0).contains(&min_lon) {
        let turns = ((min_lon + 180.0) / 360.0).floor() * 360.0;
        min_lon -= turns;
        max_lon -= turns;
    }
    if max_lon > 360.0 {
        min_lon -= 360.0;
        max_lon -= 360.0;
    }
    (min_lon, max_lon)
}

impl Default for Region {
    fn default() -> Self {
        Region::world()
    }
}
