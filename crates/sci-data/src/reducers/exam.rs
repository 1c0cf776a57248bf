//! PTR-BA theoretical exam.

use std::ops::AddAssign;

use sci_core::formatting::percentage;
use sci_core::models::TheoreticalExamRow;
use sci_core::window::{MonthSeries, TimeWindow};
use serde::Serialize;

use super::{fold_monthly, sum_series};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPoint {
    pub approved: u64,
    pub failed: u64,
}

impl AddAssign<&ExamPoint> for ExamPoint {
    fn add_assign(&mut self, other: &ExamPoint) {
        self.approved += other.approved;
        self.failed += other.failed;
    }
}

impl ExamPoint {
    /// Count a status. Only `Aprovado` and `Reprovado` are recognised.
    fn record(&mut self, status: Option<&str>) {
        match status.map(str::trim) {
            Some("Aprovado") => self.approved += 1,
            Some("Reprovado") => self.failed += 1,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamReport {
    pub approved: u64,
    pub failed: u64,
    pub approval_rate: f64,
    pub series: MonthSeries<ExamPoint>,
}

pub fn reduce_theoretical_exam(rows: &[TheoreticalExamRow], window: &TimeWindow) -> ExamReport {
    let series = fold_monthly(rows, window, |acc: &mut ExamPoint, row| {
        acc.record(row.status.as_deref())
    });
    let totals = sum_series(&series);

    ExamReport {
        approved: totals.approved,
        failed: totals.failed,
        approval_rate: percentage(
            totals.approved as f64,
            (totals.approved + totals.failed) as f64,
            1,
        ),
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducers::test_support::{text, window};

    fn exam(date: &str, status: Option<&str>) -> TheoreticalExamRow {
        TheoreticalExamRow {
            data_prova: text(date),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn test_counts_only_recognised_statuses() {
        let rows = vec![
            exam("2024-05-01", Some("Aprovado")),
            exam("2024-05-02", Some(" Aprovado ")),
            exam("2024-05-03", Some("Reprovado")),
            exam("2024-05-04", Some("Pendente")),
            exam("2024-05-05", Some("")),
            exam("2024-05-06", None),
        ];
        let report = reduce_theoretical_exam(&rows, &window(1));
        assert_eq!(
            report.series.get("2024-05"),
            Some(&ExamPoint { approved: 2, failed: 1 })
        );
        assert_eq!(report.approval_rate, 66.7);
    }

    #[test]
    fn test_empty_rate_is_zero() {
        let report = reduce_theoretical_exam(&[], &window(1));
        assert_eq!(report.approval_rate, 0.0);
        assert_eq!(report.approved + report.failed, 0);
    }
}
