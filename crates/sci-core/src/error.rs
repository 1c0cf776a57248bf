use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the SCI dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Backend connection parameters are missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// One of the record-source fetches failed; the whole aggregation is void.
    #[error("Failed to fetch {source_name}: {message}")]
    DataSource {
        source_name: String,
        message: String,
    },

    /// A fixture file could not be opened or read from disk.
    #[error("Failed to read fixture {path}: {source}")]
    FixtureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DashboardError {
    /// Build a [`DashboardError::DataSource`] for the named record source.
    pub fn data_source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// `true` for errors raised before any fetch was attempted.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
