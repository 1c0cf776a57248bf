//! Concurrent per-source fetch.
//!
//! One tokio task per record source runs against a shared
//! [`RecordStore`]. Every task is awaited before anything is decided, and a
//! single failure anywhere fails the whole fetch with the first failure in
//! source order, so callers never see a partial record set.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use sci_core::error::{DashboardError, Result};
use sci_core::models::RecordSource;
use sci_core::window::TimeWindow;
use sci_data::records::RawRecordSet;
use sci_data::store::{RangeQuery, RecordStore, Scope, StoreResult};
use serde_json::Value;
use tokio::task::JoinHandle;

// ── FetchPlan ─────────────────────────────────────────────────────────────────

/// Lower date bound and scope shared by every source query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub since: NaiveDate,
    pub scope: Scope,
}

impl FetchPlan {
    /// Plan a fetch from the first day of `window`'s earliest bucket.
    pub fn for_window(window: &TimeWindow, scope: Scope) -> Result<Self> {
        let since = window.start().ok_or_else(|| {
            DashboardError::Other(anyhow::anyhow!("month window has no buckets"))
        })?;
        Ok(Self { since, scope })
    }

    /// One query per source, in source order.
    pub fn queries(&self) -> Vec<(RecordSource, RangeQuery)> {
        RecordSource::ALL
            .iter()
            .map(|&source| (source, RangeQuery::for_source(source, self.since, &self.scope)))
            .collect()
    }
}

// ── FetchOrchestrator ─────────────────────────────────────────────────────────

pub struct FetchOrchestrator {
    store: Arc<dyn RecordStore>,
}

impl FetchOrchestrator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Fetch every source concurrently and wait for all of them.
    ///
    /// On any failure the error of the earliest failing source (in
    /// [`RecordSource::ALL`] order) is returned and the rows of the sources
    /// that did succeed are dropped. A task that panics or is cancelled counts
    /// as a failure of its source.
    pub async fn fetch_all(&self, plan: &FetchPlan) -> Result<RawRecordSet> {
        let (sources, tasks): (Vec<RecordSource>, Vec<JoinHandle<StoreResult<Vec<Value>>>>) = plan
            .queries()
            .into_iter()
            .map(|(source, query)| {
                let store = Arc::clone(&self.store);
                (source, tokio::spawn(async move { store.select(&query).await }))
            })
            .unzip();

        let settled = join_all(tasks).await;

        let mut records = RawRecordSet::default();
        let mut first_failure: Option<DashboardError> = None;

        for (source, outcome) in sources.into_iter().zip(settled) {
            let message = match outcome {
                Ok(Ok(rows)) => {
                    records.insert(source, rows);
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(join_error) => format!("fetch task did not complete: {}", join_error),
            };

            tracing::warn!(source = %source, error = %message, "record source fetch failed");
            if first_failure.is_none() {
                first_failure = Some(DashboardError::data_source(source.table(), message));
            }
        }

        if let Some(err) = first_failure {
            return Err(err);
        }

        tracing::debug!(
            since = %plan.since,
            rows = ?records.row_counts(),
            "fetched all record sources"
        );
        Ok(records)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
