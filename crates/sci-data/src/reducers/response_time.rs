//! CCI response-time drills.

use sci_core::formatting::mean;
use sci_core::models::ResponseTimeRow;
use sci_core::time_codec::parse_clock_to_seconds;
use sci_core::window::{MonthSeries, TimeWindow};
use serde::Serialize;

use super::{fold_monthly, SampleMean};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTimePoint {
    pub total_seconds: f64,
    pub samples: u64,
    pub average_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTimeReport {
    pub samples: u64,
    /// Mean of the monthly averages; months without samples are left out.
    pub overall_average_seconds: f64,
    pub series: MonthSeries<ResponseTimePoint>,
}

pub fn reduce_response_time(rows: &[ResponseTimeRow], window: &TimeWindow) -> ResponseTimeReport {
    let series = fold_monthly(rows, window, |acc: &mut SampleMean, row| {
        acc.add(parse_clock_to_seconds(row.tempo_exercicio.as_deref()));
    })
    .map(|acc| ResponseTimePoint {
        total_seconds: acc.total,
        samples: acc.samples,
        average_seconds: acc.average(),
    });

    let monthly_averages: Vec<f64> = series
        .values()
        .filter(|p| p.samples > 0)
        .map(|p| p.average_seconds)
        .collect();

    ResponseTimeReport {
        samples: series.values().map(|p| p.samples).sum(),
        overall_average_seconds: mean(&monthly_averages),
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducers::test_support::{text, window};

    fn drill(date: &str, time: Option<&str>) -> ResponseTimeRow {
        ResponseTimeRow {
            data_referencia: text(date),
            tempo_exercicio: time.map(str::to_string),
        }
    }

    #[test]
    fn test_monthly_average_over_non_zero_samples() {
        let rows = vec![
            drill("2024-05-01", Some("00:02:00")),
            drill("2024-05-02", Some("00:03:00")),
            drill("2024-05-03", Some("")),
            drill("2024-05-04", None),
        ];
        let report = reduce_response_time(&rows, &window(1));
        let may = report.series.get("2024-05").unwrap();
        assert_eq!(may.samples, 2);
        assert_eq!(may.total_seconds, 300.0);
        assert_eq!(may.average_seconds, 150.0);
    }

    #[test]
    fn test_overall_is_mean_of_monthly_averages() {
        // April: one 60 s sample. May: three 180 s samples.
        let rows = vec![
            drill("2024-04-10", Some("00:01:00")),
            drill("2024-05-01", Some("00:03:00")),
            drill("2024-05-02", Some("00:03:00")),
            drill("2024-05-03", Some("00:03:00")),
        ];
        let report = reduce_response_time(&rows, &window(3));
        assert_eq!(report.overall_average_seconds, 120.0);
        assert_eq!(report.samples, 4);
    }

    #[test]
    fn test_no_samples_is_zero() {
        let rows = vec![drill("2024-05-01", Some("bad"))];
        let report = reduce_response_time(&rows, &window(2));
        assert_eq!(report.overall_average_seconds, 0.0);
        assert!(report.series.values().all(|p| p.average_seconds == 0.0));
    }
}
