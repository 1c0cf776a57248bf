//! PTR-BA training hours.

use std::ops::AddAssign;

use sci_core::models::TrainingHoursRow;
use sci_core::window::{MonthSeries, TimeWindow};
use serde::Serialize;

use super::{fold_monthly, sum_series};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPoint {
    pub hours: f64,
    pub records: u64,
}

impl AddAssign<&TrainingPoint> for TrainingPoint {
    fn add_assign(&mut self, other: &TrainingPoint) {
        self.hours += other.hours;
        self.records += other.records;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    /// Sum of the monthly sums.
    pub total_hours: f64,
    pub records: u64,
    pub series: MonthSeries<TrainingPoint>,
}

pub fn reduce_training_hours(rows: &[TrainingHoursRow], window: &TimeWindow) -> TrainingReport {
    let series = fold_monthly(rows, window, |acc: &mut TrainingPoint, row| {
        acc.hours += row.hora_ptr_diaria;
        acc.records += 1;
    });
    let totals = sum_series(&series);

    TrainingReport {
        total_hours: totals.hours,
        records: totals.records,
        series,
    }
}
