//! Catalog entries and their flat-text record format.
//!
//! One record per line, whitespace separated:
//!
//! ```text
//! network code time_ms magnitude lat lon depth id_count id_1 .. id_n place
//! ```
//!
//! The place text is percent-encoded so it always occupies exactly one token.

use crate::error::{CatalogError, Result};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use quakecat_types::event::EventSummary;
use std::fmt;
use std::str::FromStr;

/// Deepest hypocenter accepted from an external event, kilometers.
pub const MAX_DEPTH_KM: f64 = 700.0;

/// Characters escaped in the place token. `-` is escaped so that the bare
/// token `-` can stand for an empty place.
const PLACE_ENCODE_SET: &AsciiSet = &CONTROLS.add(b' ').add(b'%').add(b'-');

const EMPTY_PLACE: &str = "-";

/// One seismic event in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    ids: Vec<String>,
    network: String,
    code: String,
    place: String,
    time_ms: i64,
    magnitude: f64,
    latitude: f64,
    longitude: f64,
    depth_km: f64,
}

impl CatalogEntry {
    /// Build an entry from an externally produced event.
    ///
    /// Latitude is clamped to `[-90, 90]`, longitude normalized into
    /// `(-180, 180]` and negative depths raised to zero. Depths beyond
    /// [`MAX_DEPTH_KM`] are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use quakecat::CatalogEntry;
    /// use quakecat_types::event::EventSummary;
    ///
    /// let event = EventSummary::new("us1000abcd", 0, 5.0, 95.0, 190.0, -2.0);
    /// let entry = CatalogEntry::from_event(&event)?;
    /// assert_eq!(entry.latitude(), 90.0);
    /// assert_eq!(entry.longitude(), -170.0);
    /// assert_eq!(entry.depth_km(), 0.0);
    /// # Ok::<(), quakecat::CatalogError>(())
    /// ```
    pub fn from_event(event: &EventSummary) -> Result<Self> {
        if event.ids.is_empty() {
            return Err(CatalogError::InvalidArgument(
                "Event must carry at least one id".to_string(),
            ));
        }
        for id in &event.ids {
            check_token("id", id)?;
        }
        check_token("network", &event.network)?;
        check_token("code", &event.code)?;

        for (field, value) in [
            ("latitude", event.latitude),
            ("longitude", event.longitude),
            ("depth", event.depth_km),
            ("magnitude", event.magnitude),
        ] {
            if !value.is_finite() {
                return Err(CatalogError::InvalidArgument(format!(
                    "Event {} {} must be finite, got: {}",
                    event.ids[0], field, value
                )));
            }
        }

        if event.depth_km > MAX_DEPTH_KM {
            return Err(CatalogError::InvalidArgument(format!(
                "Event {} depth {} km exceeds {} km",
                event.ids[0], event.depth_km, MAX_DEPTH_KM
            )));
        }

        Ok(Self {
            ids: event.ids.clone(),
            network: event.network.clone(),
            code: event.code.clone(),
            place: event.place.clone(),
            time_ms: event.time_ms,
            magnitude: event.magnitude,
            latitude: event.latitude.clamp(-90.0, 90.0),
            longitude: normalize_longitude(event.longitude),
            depth_km: event.depth_km.max(0.0),
        })
    }

    /// Parse a record line, ignoring anything after the place token.
    pub fn parse(line: &str) -> Result<Self> {
        Self::parse_tokens(&mut line.split_whitespace())
    }

    /// Parse a record line that must end right after the place token.
    pub fn parse_strict(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let entry = Self::parse_tokens(&mut tokens)?;
        if let Some(extra) = tokens.next() {
            return Err(CatalogError::Format(format!(
                "unexpected trailing token `{}` after place",
                extra
            )));
        }
        Ok(entry)
    }

    fn parse_tokens<'a, I>(tokens: &mut I) -> Result<Self>
    where
        I: Iterator<Item = &'a str>,
    {
        let network = next_token(tokens, "network")?.to_string();
        let code = next_token(tokens, "code")?.to_string();
        let time_ms: i64 = parse_field(tokens, "time")?;
        let magnitude = parse_finite(tokens, "magnitude")?;
        let latitude = parse_finite(tokens, "latitude")?;
        let longitude = parse_finite(tokens, "longitude")?;
        let depth_km = parse_finite(tokens, "depth")?;

        let id_count: i64 = parse_field(tokens, "id count")?;
        if id_count < 1 {
            return Err(CatalogError::Format(format!(
                "id count must be at least 1, got {}",
                id_count
            )));
        }

        // Capacity is only a hint; a bogus count fails on the missing tokens.
        let mut ids = Vec::with_capacity((id_count as usize).min(16));
        for _ in 0..id_count {
            ids.push(next_token(tokens, "id")?.to_string());
        }

        let place = decode_place(next_token(tokens, "place")?)?;

        Ok(Self {
            ids,
            network,
            code,
            place,
            time_ms,
            magnitude,
            latitude,
            longitude,
            depth_km,
        })
    }

    /// Render the entry as a record line; the inverse of [`CatalogEntry::parse`].
    pub fn to_line(&self) -> String {
        self.to_string()
    }

    /// Primary (canonical) id.
    pub fn primary_id(&self) -> &str {
        &self.ids[0]
    }

    /// All ids, primary first.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Aliases after the primary id.
    pub fn secondary_ids(&self) -> &[String] {
        &self.ids[1..]
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.ids.iter().any(|own| own == id)
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    /// Origin time, milliseconds since the Unix epoch.
    pub fn time_ms(&self) -> i64 {
        self.time_ms
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn depth_km(&self) -> f64 {
        self.depth_km
    }

    /// Drop a secondary id. The primary id is never removed.
    pub(crate) fn remove_alias(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        let mut position = 0;
        self.ids.retain(|own| {
            let keep = position == 0 || own != id;
            position += 1;
            keep
        });
        self.ids.len() != before
    }

    /// Keep only the secondary ids for which `keep` returns true.
    pub(crate) fn retain_aliases<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        let mut position = 0;
        self.ids.retain(|own| {
            let kept = position == 0 || keep(own);
            position += 1;
            kept
        });
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {}",
            self.network,
            self.code,
            self.time_ms,
            self.magnitude,
            self.latitude,
            self.longitude,
            self.depth_km,
            self.ids.len()
        )?;
        for id in &self.ids {
            write!(f, " {}", id)?;
        }
        write!(f, " {}", encode_place(&self.place))
    }
}

impl FromStr for CatalogEntry {
    type Err = CatalogError;

    fn from_str(line: &str) -> Result<Self> {
        Self::parse_strict(line)
    }
}

/// Normalize a longitude into `(-180, 180]`.
pub fn normalize_longitude(lon: f64) -> f64 {
    if lon > -180.0 && lon <= 180.0 {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

fn check_token(field: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(CatalogError::InvalidArgument(format!(
            "Event {} must be a non-empty token without whitespace, got: {:?}",
            field, value
        )));
    }
    Ok(())
}

fn next_token<'a, I>(tokens: &mut I, field: &str) -> Result<&'a str>
where
    I: Iterator<Item = &'a str>,
{
    tokens
        .next()
        .ok_or_else(|| CatalogError::Format(format!("record ended before {}", field)))
}

fn parse_field<'a, T, I>(tokens: &mut I, field: &str) -> Result<T>
where
    T: FromStr,
    I: Iterator<Item = &'a str>,
{
    let token = next_token(tokens, field)?;
    token
        .parse()
        .map_err(|_| CatalogError::Format(format!("invalid {} `{}`", field, token)))
}

fn parse_finite<'a, I>(tokens: &mut I, field: &str) -> Result<f64>
where
    I: Iterator<Item = &'a str>,
{
    let value: f64 = parse_field(tokens, field)?;
    if !value.is_finite() {
        return Err(CatalogError::Format(format!(
            "{} must be finite, got {}",
            field, value
        )));
    }
    Ok(value)
}

fn encode_place(place: &str) -> String {
    if place.is_empty() {
        EMPTY_PLACE.to_string()
    } else {
        utf8_percent_encode(place, PLACE_ENCODE_SET).to_string()
    }
}

fn decode_place(token: &str) -> Result<String> {
    if token == EMPTY_PLACE {
        return Ok(String::new());
    }
    percent_decode_str(token)
        .decode_utf8()
        .map(|place| place.into_owned())
        .map_err(|e| CatalogError::Format(format!("place `{}` is not UTF-8: {}", token, e)))
}
