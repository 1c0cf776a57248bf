//! HTTP surface: the dashboard summary endpoint and a health probe.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sci_core::error::DashboardError;
use sci_data::snapshot::DashboardSnapshot;
use sci_runtime::service::{DashboardRequest, DashboardService};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

// ── State ──────────────────────────────────────────────────────────────────────

#[derive(Clone)]
enum Backend {
    Ready(Arc<DashboardService>),
    /// Startup could not open a record store; carries the reason.
    Unconfigured(String),
}

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    backend: Backend,
}

impl AppState {
    pub fn ready(service: DashboardService) -> Self {
        Self {
            backend: Backend::Ready(Arc::new(service)),
        }
    }

    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            backend: Backend::Unconfigured(reason.into()),
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.backend, Backend::Ready(_))
    }
}

// ── Errors ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Failure of a dashboard request. Every kind answers `500 { error }`.
#[derive(Debug)]
pub enum AppError {
    Config(String),
    DataSource(String),
    Internal(String),
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Config(msg) => AppError::Config(msg),
            e @ DashboardError::DataSource { .. } => AppError::DataSource(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = match self {
            AppError::Config(msg) => {
                tracing::error!(error = %msg, "dashboard request rejected: backend not configured");
                msg
            }
            AppError::DataSource(msg) => {
                tracing::error!(error = %msg, "dashboard request failed: data source error");
                msg
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "dashboard request failed");
                msg
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error })).into_response()
    }
}

// ── Handlers ───────────────────────────────────────────────────────────────────

/// Raw query string of `GET /api/dashboard`.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(rename = "secaoId")]
    pub secao_id: Option<String>,
    #[serde(rename = "equipeId")]
    pub equipe_id: Option<String>,
    pub meses: Option<String>,
}

impl DashboardQuery {
    fn into_request(self) -> DashboardRequest {
        DashboardRequest::from_raw(self.meses.as_deref(), self.secao_id, self.equipe_id)
    }
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardSnapshot>, AppError> {
    let service = match &state.backend {
        Backend::Ready(service) => Arc::clone(service),
        Backend::Unconfigured(reason) => return Err(AppError::Config(reason.clone())),
    };

    let snapshot = service.snapshot(&query.into_request()).await?;
    Ok(Json(snapshot))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    backend: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        backend: if state.is_configured() {
            "configured"
        } else {
            "unconfigured"
        },
    })
}

// ── Router ─────────────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/dashboard", get(dashboard))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
