//! Aeronautical and non-aeronautical occurrences.

use sci_core::models::OccurrenceRow;
use sci_core::time_codec::diff_with_wraparound;
use sci_core::window::{MonthSeries, TimeWindow};
use serde::Serialize;

use super::{fold_monthly, SampleMean};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct OccurrenceAcc {
    count: u64,
    attendance: SampleMean,
}

impl OccurrenceAcc {
    fn add_row(&mut self, row: &OccurrenceRow) {
        self.count += 1;
        self.attendance.add(attendance_seconds(row));
    }
}

/// One month of occurrences.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrencePoint {
    pub count: u64,
    pub average_attendance_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceReport {
    /// Every fetched occurrence, dated inside the window or not.
    pub total: u64,
    pub average_attendance_seconds: f64,
    pub series: MonthSeries<OccurrencePoint>,
}

/// Seconds from dispatch to arrival (or end of attendance), wrapping past
/// midnight. Zero when either time is missing.
fn attendance_seconds(row: &OccurrenceRow) -> f64 {
    row.attendance_span()
        .map(|(start, end)| diff_with_wraparound(Some(start), Some(end)))
        .unwrap_or(0.0)
}

pub fn reduce_occurrences(rows: &[OccurrenceRow], window: &TimeWindow) -> OccurrenceReport {
    let mut overall = OccurrenceAcc::default();
    for row in rows {
        overall.add_row(row);
    }

    let series = fold_monthly(rows, window, OccurrenceAcc::add_row).map(|acc| OccurrencePoint {
        count: acc.count,
        average_attendance_seconds: acc.attendance.average(),
    });

    OccurrenceReport {
        total: overall.count,
        average_attendance_seconds: overall.attendance.average(),
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducers::test_support::{text, window};

    fn occurrence(date: &str) -> OccurrenceRow {
        OccurrenceRow {
            data_ocorrencia: text(date),
            ..Default::default()
        }
    }

    fn timed(date: &str, start: &str, end: &str) -> OccurrenceRow {
        OccurrenceRow {
            data_ocorrencia: text(date),
            hora_acionamento: text(start),
            hora_chegada: text(end),
            ..Default::default()
        }
    }

    // ── counts ────────────────────────────────────────────────────────────────

    #[test]
    fn test_counts_per_month_in_window_order() {
        let rows = vec![
            occurrence("2024-04-02"),
            occurrence("2024-04-20"),
            occurrence("2024-05-01"),
        ];
        let report = reduce_occurrences(&rows, &window(2));
        let counts: Vec<(&str, u64)> = report
            .series
            .iter()
            .map(|slot| (slot.key.as_str(), slot.value.count))
            .collect();
        assert_eq!(counts, vec![("2024-04", 2), ("2024-05", 1)]);
        assert_eq!(report.total, 3);
    }

    #[test]
    fn test_out_of_window_rows_only_in_total() {
        let rows = vec![
            occurrence("2023-01-10"),
            occurrence("2024-05-01"),
            occurrence("sem data"),
            OccurrenceRow::default(),
        ];
        let report = reduce_occurrences(&rows, &window(2));
        assert_eq!(report.total, 4);
        assert_eq!(report.series.values().map(|p| p.count).sum::<u64>(), 1);
    }

    // ── attendance ────────────────────────────────────────────────────────────

    #[test]
    fn test_attendance_average_skips_missing_times() {
        let rows = vec![
            timed("2024-05-01", "10:00:00", "10:10:00"),
            timed("2024-05-02", "23:50:00", "00:10:00"),
            occurrence("2024-05-03"),
        ];
        let report = reduce_occurrences(&rows, &window(1));
        let may = report.series.get("2024-05").unwrap();
        assert_eq!(may.count, 3);
        assert_eq!(may.average_attendance_seconds, 900.0);
        assert_eq!(report.average_attendance_seconds, 900.0);
    }

    #[test]
    fn test_attendance_uses_end_time_for_non_aeronautical() {
        let row = OccurrenceRow {
            data_ocorrencia: text("2024-05-01"),
            hora_acionamento: text("08:00:00"),
            hora_termino: text("09:30:00"),
            ..Default::default()
        };
        let report = reduce_occurrences(&[row], &window(1));
        assert_eq!(report.average_attendance_seconds, 5400.0);
    }
}
