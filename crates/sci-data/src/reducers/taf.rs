//! TAF (physical fitness test) sessions and results.

use std::ops::AddAssign;

use sci_core::formatting::percentage;
use sci_core::models::{TafResultRow, TafSessionRow};
use sci_core::window::{MonthSeries, TimeWindow};
use serde::Serialize;

use super::{fold_monthly, CountPoint};

/// Lowest score that passes the test.
pub const TAF_PASSING_SCORE: f64 = 7.0;

/// Months of approved/failed history shown for TAF results.
pub const TAF_RECENT_MONTHS: usize = 6;

/// How a single result counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TafOutcome {
    Approved,
    Failed,
    NotEvaluated,
}

impl TafOutcome {
    pub fn classify(score: Option<f64>) -> Self {
        match score {
            None => Self::NotEvaluated,
            Some(s) if s >= TAF_PASSING_SCORE => Self::Approved,
            Some(_) => Self::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TafPoint {
    pub approved: u64,
    pub failed: u64,
}

impl AddAssign<&TafPoint> for TafPoint {
    fn add_assign(&mut self, other: &TafPoint) {
        self.approved += other.approved;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TafReport {
    pub approved: u64,
    pub failed: u64,
    pub not_evaluated: u64,
    /// Approved over evaluated, as a percentage.
    pub approval_rate: f64,
    /// Approved/failed over the trailing `min(N, 6)` months.
    pub series: MonthSeries<TafPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TafSessionReport {
    pub total: u64,
    pub series: MonthSeries<CountPoint>,
}

pub fn reduce_taf_sessions(rows: &[TafSessionRow], window: &TimeWindow) -> TafSessionReport {
    TafSessionReport {
        total: rows.len() as u64,
        series: fold_monthly(rows, window, |acc: &mut CountPoint, _| acc.count += 1),
    }
}

/// Global counts cover every fetched result; the monthly series only the
/// recent part of the window, and never holds unevaluated results.
pub fn reduce_taf_results(rows: &[TafResultRow], window: &TimeWindow) -> TafReport {
    let mut totals = TafPoint::default();
    let mut not_evaluated = 0;
    for row in rows {
        match TafOutcome::classify(row.desempenho) {
            TafOutcome::Approved => totals.approved += 1,
            TafOutcome::Failed => totals.failed += 1,
            TafOutcome::NotEvaluated => not_evaluated += 1,
        }
    }

    let recent = window.last_months(window.len().min(TAF_RECENT_MONTHS));
    let series = fold_monthly(rows, &recent, |acc: &mut TafPoint, row| {
        match TafOutcome::classify(row.desempenho) {
            TafOutcome::Approved => acc.approved += 1,
            TafOutcome::Failed => acc.failed += 1,
            TafOutcome::NotEvaluated => {}
        }
    });

    TafReport {
        approved: totals.approved,
        failed: totals.failed,
        not_evaluated,
        approval_rate: percentage(
            totals.approved as f64,
            (totals.approved + totals.failed) as f64,
            1,
        ),
        series,
    }
}
