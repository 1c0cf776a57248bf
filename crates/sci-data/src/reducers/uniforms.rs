//! Uniform and EPI delivery.

use sci_core::formatting::percentage;
use sci_core::models::UniformDeliveryRow;
use sci_core::window::{MonthSeries, TimeWindow};
use serde::Serialize;

use super::fold_monthly;

/// Delivered quantities for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniformPoint {
    pub epi_delivered: f64,
    pub uniform_delivered: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniformReport {
    pub epi_delivered: f64,
    pub epi_forecast: f64,
    pub uniform_delivered: f64,
    pub uniform_forecast: f64,
    pub epi_delivery_rate: f64,
    pub uniform_delivery_rate: f64,
    pub series: MonthSeries<UniformPoint>,
}

pub fn reduce_uniforms(rows: &[UniformDeliveryRow], window: &TimeWindow) -> UniformReport {
    let (mut epi_delivered, mut epi_forecast) = (0.0, 0.0);
    let (mut uniform_delivered, mut uniform_forecast) = (0.0, 0.0);
    for row in rows {
        epi_delivered += row.epi_entregue;
        epi_forecast += row.epi_previsto;
        uniform_delivered += row.uniforme_entregue;
        uniform_forecast += row.uniforme_previsto;
    }

    let series = fold_monthly(rows, window, |acc: &mut UniformPoint, row| {
        acc.epi_delivered += row.epi_entregue;
        acc.uniform_delivered += row.uniforme_entregue;
    });

    UniformReport {
        epi_delivered,
        epi_forecast,
        uniform_delivered,
        uniform_forecast,
        epi_delivery_rate: percentage(epi_delivered, epi_forecast, 1),
        uniform_delivery_rate: percentage(uniform_delivered, uniform_forecast, 1),
        series,
    }
}
