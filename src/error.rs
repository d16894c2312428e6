//! Error types for catalog loading and querying.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// A record line could not be parsed. Fatal to the whole load.
    #[error("Malformed catalog record: {0}")]
    Format(String),

    /// A caller passed an unusable argument (inverted ranges, bad event fields).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error on {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CatalogError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CatalogError::Io {
            context: context.into(),
            source,
        }
    }

    /// Prefix a format error with the record's location; other variants pass through.
    pub(crate) fn at_line(self, source_name: &str, line: usize) -> Self {
        match self {
            CatalogError::Format(msg) => {
                CatalogError::Format(format!("{}:{}: {}", source_name, line, msg))
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for CatalogError {
    fn from(err: toml::de::Error) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}
