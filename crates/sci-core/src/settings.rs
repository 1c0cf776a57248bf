use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DashboardError, Result};

// ── Settings (CLI + env) ───────────────────────────────────────────────────────

/// Operational dashboard API for the airport firefighting unit
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sci-dashboard",
    about = "Operational dashboard API for the airport firefighting unit",
    version
)]
pub struct Settings {
    /// Address to bind the HTTP server to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Base URL of the managed backend (PostgREST / Supabase)
    #[arg(long, env = "SUPABASE_URL")]
    pub backend_url: Option<String>,

    /// Service key for the managed backend
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub backend_key: Option<String>,

    /// Serve records from a JSON fixture file instead of the backend
    #[arg(long, env = "SCI_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Timezone the month window is anchored in (auto-detected if "auto")
    #[arg(long, env = "SCI_TIMEZONE", default_value = "auto")]
    pub timezone: String,

    /// Per-request timeout for backend queries, in seconds (1-300)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..=300))]
    pub request_timeout_secs: u64,

    /// Rows requested per backend page (1-10000)
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u32).range(1..=10_000))]
    pub page_size: u32,

    /// Logging level
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Backend configuration ──────────────────────────────────────────────────────

/// Connection parameters for the PostgREST record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    /// Base URL without a trailing slash.
    pub url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub page_size: u32,
}

/// Where records are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Rest(RestConfig),
    Fixture(PathBuf),
}

impl BackendConfig {
    /// Short human-readable description for startup logs.
    pub fn describe(&self) -> String {
        match self {
            BackendConfig::Rest(rest) => format!("backend at {}", rest.url),
            BackendConfig::Fixture(path) => format!("fixture file {}", path.display()),
        }
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and environment, then apply `--debug`.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`Settings::load`] but from an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Settings::try_parse_from(args).map(Self::resolve)
    }

    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve where records come from.
    ///
    /// A fixture file wins over backend credentials. Without a fixture, both
    /// the backend URL and key must be present; otherwise a
    /// [`DashboardError::Config`] explains what is missing.
    pub fn backend(&self) -> Result<BackendConfig> {
        if let Some(path) = &self.fixture {
            if !path.is_file() {
                return Err(DashboardError::Config(format!(
                    "fixture file {} does not exist",
                    path.display()
                )));
            }
            return Ok(BackendConfig::Fixture(path.clone()));
        }

        let url = non_blank(self.backend_url.as_deref())
            .ok_or_else(|| DashboardError::Config("SUPABASE_URL is not set".to_string()))?;
        let api_key = non_blank(self.backend_key.as_deref()).ok_or_else(|| {
            DashboardError::Config("SUPABASE_SERVICE_ROLE_KEY is not set".to_string())
        })?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DashboardError::Config(format!(
                "SUPABASE_URL must be an http(s) URL, got \"{}\"",
                url
            )));
        }

        Ok(BackendConfig::Rest(RestConfig {
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            page_size: self.page_size,
        }))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
