use serde::{Deserialize, Serialize};

/// An event description produced outside the catalog, e.g. by a product
/// parser or a rupture model.
///
/// Values are taken as reported; the catalog normalizes coordinates and
/// checks depth when it builds an entry from one of these.
///
/// # Examples
///
/// ```
/// use quakecat_types::event::EventSummary;
///
/// let event = EventSummary::new("us7000abcd", 1_700_000_000_000, 6.1, 38.3, 142.4, 29.0)
///     .with_alias("jma2023xyz")
///     .with_source("us", "7000abcd")
///     .with_place("off the east coast of Honshu, Japan");
/// assert_eq!(event.ids, vec!["us7000abcd", "jma2023xyz"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Identity tokens, primary first
    pub ids: Vec<String>,
    /// Network that produced the event
    pub network: String,
    /// Network-assigned event code
    pub code: String,
    /// Free-text location description
    #[serde(default)]
    pub place: String,
    /// Origin time, milliseconds since the Unix epoch
    pub time_ms: i64,
    pub magnitude: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Hypocentral depth in kilometers
    pub depth_km: f64,
}

impl EventSummary {
    /// Create a summary with a single primary id.
    ///
    /// Network and code default to the primary id split after its first two
    /// characters, the usual ComCat convention (`us7000abcd` -> `us`, `7000abcd`).
    pub fn new(
        id: impl Into<String>,
        time_ms: i64,
        magnitude: f64,
        latitude: f64,
        longitude: f64,
        depth_km: f64,
    ) -> Self {
        let id = id.into();
        let split = id.char_indices().nth(2).map_or(id.len(), |(idx, _)| idx);
        let (network, code) = if split < id.len() {
            (id[..split].to_string(), id[split..].to_string())
        } else {
            (id.clone(), id.clone())
        };
        Self {
            ids: vec![id],
            network,
            code,
            place: String::new(),
            time_ms,
            magnitude,
            latitude,
            longitude,
            depth_km,
        }
    }

    /// Append a secondary id.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.ids.push(alias.into());
        self
    }

    /// Set network and code.
    pub fn with_source(mut self, network: impl Into<String>, code: impl Into<String>) -> Self {
        self.network = network.into();
        self.code = code.into();
        self
    }

    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = place.into();
        self
    }

    /// Primary id, if any.
    pub fn primary_id(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }
}
