//! EPR donning drills: timing averages and quality tiers.

use std::ops::AddAssign;

use sci_core::models::EprRow;
use sci_core::time_codec::parse_clock_to_minutes;
use sci_core::window::{MonthSeries, TimeWindow};
use serde::Serialize;

use super::{fold_monthly, sum_series, SampleMean};

/// Quality tier a drill was graded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EprStatus {
    Ideal,
    Tolerable,
    Failed,
}

impl EprStatus {
    /// Map a recorded status onto a tier. Blank or unknown statuses grade as
    /// failed; the unaccented `Toleravel` is accepted for older rows.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("Ideal") => Self::Ideal,
            Some("Tolerável") | Some("Toleravel") => Self::Tolerable,
            _ => Self::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EprStatusCounts {
    pub ideal: u64,
    pub tolerable: u64,
    pub failed: u64,
}

impl EprStatusCounts {
    fn record(&mut self, status: EprStatus) {
        match status {
            EprStatus::Ideal => self.ideal += 1,
            EprStatus::Tolerable => self.tolerable += 1,
            EprStatus::Failed => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct EprAcc {
    timing: SampleMean,
    statuses: EprStatusCounts,
}

impl AddAssign<&EprAcc> for EprAcc {
    fn add_assign(&mut self, other: &EprAcc) {
        self.timing += &other.timing;
        self.statuses.ideal += other.statuses.ideal;
        self.statuses.tolerable += other.statuses.tolerable;
        self.statuses.failed += other.statuses.failed;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EprPoint {
    pub total_minutes: f64,
    pub samples: u64,
    pub average_minutes: f64,
    #[serde(flatten)]
    pub statuses: EprStatusCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EprReport {
    /// Tier counts over every fetched drill.
    pub statuses: EprStatusCounts,
    pub samples: u64,
    /// Sample-weighted average over the window.
    pub average_minutes: f64,
    pub series: MonthSeries<EprPoint>,
}

pub fn reduce_epr(rows: &[EprRow], window: &TimeWindow) -> EprReport {
    let mut statuses = EprStatusCounts::default();
    for row in rows {
        statuses.record(EprStatus::normalize(row.status.as_deref()));
    }

    let monthly = fold_monthly(rows, window, |acc: &mut EprAcc, row| {
        acc.timing.add(parse_clock_to_minutes(row.tempo_epr.as_deref()));
        acc.statuses.record(EprStatus::normalize(row.status.as_deref()));
    });
    let in_window = sum_series(&monthly);

    EprReport {
        statuses,
        samples: in_window.timing.samples,
        average_minutes: in_window.timing.average(),
        series: monthly.map(|acc| EprPoint {
            total_minutes: acc.timing.total,
            samples: acc.timing.samples,
            average_minutes: acc.timing.average(),
            statuses: acc.statuses,
        }),
    }
}
