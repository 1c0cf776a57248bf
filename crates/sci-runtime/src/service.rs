//! Request-scoped dashboard pipeline.
//!
//! [`DashboardService`] owns nothing but the store handle and the timezone the
//! month window is anchored in; every call builds a fresh window and fresh
//! accumulators.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use chrono_tz::Tz;
use sci_core::error::Result;
use sci_core::time_utils::today_in;
use sci_core::window::{build_month_sequence, clamp_months, DEFAULT_MONTHS};
use sci_data::records::SourceRows;
use sci_data::reducers::reduce_all;
use sci_data::snapshot::{assemble, DashboardSnapshot};
use sci_data::store::{RecordStore, Scope};

use crate::orchestrator::{FetchOrchestrator, FetchPlan};

// ── DashboardRequest ──────────────────────────────────────────────────────────

/// Validated request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRequest {
    /// Window length, already clamped.
    pub months: u32,
    pub scope: Scope,
}

impl Default for DashboardRequest {
    fn default() -> Self {
        Self {
            months: DEFAULT_MONTHS,
            scope: Scope::default(),
        }
    }
}

impl DashboardRequest {
    /// Build a request from raw query values.
    ///
    /// `months` is clamped to the allowed range; a missing or non-integer
    /// value means the default. Blank ids mean no filter.
    pub fn from_raw(
        months: Option<&str>,
        section_id: Option<String>,
        team_id: Option<String>,
    ) -> Self {
        let months = months
            .and_then(|m| m.trim().parse::<i64>().ok())
            .map(clamp_months)
            .unwrap_or(DEFAULT_MONTHS);
        Self {
            months,
            scope: Scope::new(section_id, team_id),
        }
    }
}

// ── DashboardService ──────────────────────────────────────────────────────────

pub struct DashboardService {
    orchestrator: FetchOrchestrator,
    timezone: Tz,
}

impl DashboardService {
    pub fn new(store: Arc<dyn RecordStore>, timezone: Tz) -> Self {
        Self {
            orchestrator: FetchOrchestrator::new(store),
            timezone,
        }
    }

    /// Build a snapshot for the window ending in the current month.
    pub async fn snapshot(&self, request: &DashboardRequest) -> Result<DashboardSnapshot> {
        self.snapshot_at(request, today_in(self.timezone)).await
    }

    /// Build a snapshot for the window whose last bucket contains `anchor`.
    pub async fn snapshot_at(
        &self,
        request: &DashboardRequest,
        anchor: NaiveDate,
    ) -> Result<DashboardSnapshot> {
        let started = Instant::now();
        let window = build_month_sequence(request.months, anchor);
        let plan = FetchPlan::for_window(&window, request.scope.clone())?;

        let raw = self.orchestrator.fetch_all(&plan).await?;
        let rows = SourceRows::decode(&raw);
        let snapshot = assemble(reduce_all(&rows, &window), &window);

        tracing::debug!(
            months = request.months,
            section = ?request.scope.section_id,
            team = ?request.scope.team_id,
            rows = raw.total_rows(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dashboard snapshot assembled"
        );
        Ok(snapshot)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
