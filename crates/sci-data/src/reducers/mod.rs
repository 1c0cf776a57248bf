//! Domain reducers.
//!
//! Each reducer folds one source's typed rows onto the month window with its
//! own business rule and returns a month series plus domain totals. Reducers
//! never fail: rows whose date does not resolve into the window are left out
//! of the monthly buckets (but still count in a domain's unbounded totals
//! where it keeps one).

pub mod agents;
pub mod epr;
pub mod exam;
pub mod occurrences;
pub mod response_time;
pub mod taf;
pub mod training;
pub mod uniforms;
pub mod upkeep;

use std::ops::AddAssign;

use sci_core::models::DatedRow;
use sci_core::window::{MonthSeries, TimeWindow};
use serde::Serialize;

use crate::records::SourceRows;

use self::agents::AgentsReport;
use self::epr::EprReport;
use self::exam::ExamReport;
use self::occurrences::OccurrenceReport;
use self::response_time::ResponseTimeReport;
use self::taf::{TafReport, TafSessionReport};
use self::training::TrainingReport;
use self::uniforms::UniformReport;
use self::upkeep::{
    ActivityPoint, InspectionPoint, SwapPoint, TpHygienePoint, TpVerificationReport,
};

// ── Shared folding helpers ────────────────────────────────────────────────────

/// Fold `rows` into a fresh series over `window`.
///
/// `apply` only sees rows whose date resolves to a bucket of the window.
pub fn fold_monthly<R, A, F>(rows: &[R], window: &TimeWindow, mut apply: F) -> MonthSeries<A>
where
    R: DatedRow,
    A: Default,
    F: FnMut(&mut A, &R),
{
    let mut series = MonthSeries::new(window);
    for row in rows {
        if let Some(bucket) = series.bucket_for(row.record_date()) {
            apply(bucket, row);
        }
    }
    series
}

/// Sum every bucket of a series.
pub fn sum_series<A>(series: &MonthSeries<A>) -> A
where
    A: Default + for<'a> AddAssign<&'a A>,
{
    let mut total = A::default();
    for value in series.values() {
        total += value;
    }
    total
}

/// Running sum of non-zero samples, for averages that skip missing values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleMean {
    pub total: f64,
    pub samples: u64,
}

impl SampleMean {
    /// Record `value`; zero or negative values stay out of the denominator.
    pub fn add(&mut self, value: f64) {
        if value > 0.0 {
            self.total += value;
            self.samples += 1;
        }
    }

    pub fn average(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total / self.samples as f64
        }
    }
}

impl AddAssign<&SampleMean> for SampleMean {
    fn add_assign(&mut self, other: &SampleMean) {
        self.total += other.total;
        self.samples += other.samples;
    }
}

/// A month that only counts rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountPoint {
    pub count: u64,
}

impl AddAssign<&CountPoint> for CountPoint {
    fn add_assign(&mut self, other: &CountPoint) {
        self.count += other.count;
    }
}

/// Totals plus monthly series for domains that only sum numeric fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesReport<A> {
    pub totals: A,
    pub series: MonthSeries<A>,
}

impl<A> SeriesReport<A>
where
    A: Default + for<'a> AddAssign<&'a A>,
{
    pub fn from_series(series: MonthSeries<A>) -> Self {
        Self {
            totals: sum_series(&series),
            series,
        }
    }
}

// ── DomainReports ─────────────────────────────────────────────────────────────

/// Output of every reducer for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainReports {
    pub aeronautical_occurrences: OccurrenceReport,
    pub non_aeronautical_occurrences: OccurrenceReport,
    pub taf_sessions: TafSessionReport,
    pub taf_results: TafReport,
    pub response_time: ResponseTimeReport,
    pub training_hours: TrainingReport,
    pub theoretical_exam: ExamReport,
    pub epr: EprReport,
    pub extinguishing_agents: AgentsReport,
    pub uniforms: UniformReport,
    pub swaps: SeriesReport<SwapPoint>,
    pub vehicle_inspections: SeriesReport<InspectionPoint>,
    pub tp_verification: TpVerificationReport,
    pub tp_hygiene: SeriesReport<TpHygienePoint>,
    pub accessory_activities: SeriesReport<ActivityPoint>,
}

/// Run every reducer over its own rows. Domains share nothing but the window.
pub fn reduce_all(rows: &SourceRows, window: &TimeWindow) -> DomainReports {
    DomainReports {
        aeronautical_occurrences: occurrences::reduce_occurrences(
            &rows.aeronautical_occurrences,
            window,
        ),
        non_aeronautical_occurrences: occurrences::reduce_occurrences(
            &rows.non_aeronautical_occurrences,
            window,
        ),
        taf_sessions: taf::reduce_taf_sessions(&rows.taf_sessions, window),
        taf_results: taf::reduce_taf_results(&rows.taf_results, window),
        response_time: response_time::reduce_response_time(&rows.response_time, window),
        training_hours: training::reduce_training_hours(&rows.training_hours, window),
        theoretical_exam: exam::reduce_theoretical_exam(&rows.theoretical_exam, window),
        epr: epr::reduce_epr(&rows.epr, window),
        extinguishing_agents: agents::reduce_agents(&rows.extinguishing_agents, window),
        uniforms: uniforms::reduce_uniforms(&rows.uniform_delivery, window),
        swaps: upkeep::reduce_swaps(&rows.swaps, window),
        vehicle_inspections: upkeep::reduce_inspections(&rows.vehicle_inspections, window),
        tp_verification: upkeep::reduce_tp_verification(&rows.tp_verification, window),
        tp_hygiene: upkeep::reduce_tp_hygiene(&rows.tp_hygiene, window),
        accessory_activities: upkeep::reduce_activities(&rows.accessory_activities, window),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::test_support::{text, window};
    use super::*;
    use sci_core::models::{OccurrenceRow, SwapRow};

    fn swap(date: &str, n: f64) -> SwapRow {
        SwapRow {
            data_referencia: text(date),
            quantidade_troca: n,
        }
    }

    // ── fold_monthly ──────────────────────────────────────────────────────────

    #[test]
    fn test_fold_monthly_skips_rows_outside_window() {
        let rows = vec![
            swap("2024-03-31", 9.0),
            swap("2024-04-01", 1.0),
            swap("2024-05-20", 2.0),
            swap("2024-06-01", 9.0),
            SwapRow::default(),
        ];
        let series: MonthSeries<CountPoint> = fold_monthly(&rows, &window(2), |acc: &mut CountPoint, _| acc.count += 1);
        let counts: Vec<u64> = series.values().map(|p| p.count).collect();
        assert_eq!(counts, vec![1, 1]);
    }

    // ── sum_series ────────────────────────────────────────────────────────────

    #[test]
    fn test_sum_series_adds_every_bucket() {
        let rows = vec![swap("2024-04-01", 1.0), swap("2024-05-01", 1.0), swap("2024-05-02", 1.0)];
        let series: MonthSeries<CountPoint> = fold_monthly(&rows, &window(3), |acc: &mut CountPoint, _| acc.count += 1);
        assert_eq!(sum_series(&series), CountPoint { count: 3 });
    }

    // ── SampleMean ────────────────────────────────────────────────────────────

    #[test]
    fn test_sample_mean_ignores_zero() {
        let mut m = SampleMean::default();
        m.add(0.0);
        m.add(10.0);
        m.add(20.0);
        assert_eq!(m.samples, 2);
        assert_eq!(m.average(), 15.0);
        assert_eq!(SampleMean::default().average(), 0.0);
    }

    // ── reduce_all ────────────────────────────────────────────────────────────

    #[test]
    fn test_reduce_all_empty_rows_yields_zeroed_window() {
        let reports = reduce_all(&SourceRows::default(), &window(3));
        assert_eq!(reports.aeronautical_occurrences.total, 0);
        assert_eq!(reports.swaps.series.len(), 3);
        assert_eq!(reports.taf_results.series.len(), 3);
        assert_eq!(reports.response_time.overall_average_seconds, 0.0);
    }

    #[test]
    fn test_reduce_all_keeps_domains_apart() {
        let rows = SourceRows {
            aeronautical_occurrences: vec![OccurrenceRow {
                data_ocorrencia: text("2024-05-02"),
                ..Default::default()
            }],
            swaps: vec![swap("2024-05-02", 4.0)],
            ..Default::default()
        };
        let reports = reduce_all(&rows, &window(2));
        assert_eq!(reports.aeronautical_occurrences.total, 1);
        assert_eq!(reports.non_aeronautical_occurrences.total, 0);
        assert_eq!(reports.swaps.totals.swaps, 4.0);
    }
}
