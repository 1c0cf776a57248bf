use std::sync::Arc;

use sci_core::error::Result;
use sci_core::settings::{BackendConfig, Settings};
use sci_data::rest::PostgrestStore;
use sci_data::store::{MemoryStore, RecordStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a configured level name onto a `tracing` filter directive.
///
/// Unknown names pass through unchanged so `EnvFilter` can still try them.
pub fn normalise_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Falls back to `"info"` if the level string is not a valid directive.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Record store bootstrap ─────────────────────────────────────────────────────

/// Open the record store the settings point at.
pub fn build_store(settings: &Settings) -> Result<Arc<dyn RecordStore>> {
    let backend = settings.backend()?;
    tracing::info!("reading records from {}", backend.describe());

    let store: Arc<dyn RecordStore> = match backend {
        BackendConfig::Rest(config) => Arc::new(PostgrestStore::new(config)?),
        BackendConfig::Fixture(path) => Arc::new(MemoryStore::load(&path)?),
    };
    Ok(store)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
