//! Sum-only domains: swaps, vehicle inspections, TP verification and
//! hygiene, accessory activities.

use std::ops::AddAssign;

use sci_core::formatting::percentage;
use sci_core::models::{
    AccessoryActivityRow, SwapRow, TpHygieneRow, TpVerificationRow, VehicleInspectionRow,
};
use sci_core::time_codec::parse_clock_to_minutes;
use sci_core::window::{MonthSeries, TimeWindow};
use serde::Serialize;

use super::{fold_monthly, SeriesReport};

macro_rules! additive {
    ($point:ident { $($field:ident),+ }) => {
        impl AddAssign<&$point> for $point {
            fn add_assign(&mut self, other: &$point) {
                $(self.$field += other.$field;)+
            }
        }
    };
}

// ── Swaps ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SwapPoint {
    pub swaps: f64,
}
additive!(SwapPoint { swaps });

pub fn reduce_swaps(rows: &[SwapRow], window: &TimeWindow) -> SeriesReport<SwapPoint> {
    SeriesReport::from_series(fold_monthly(rows, window, |acc: &mut SwapPoint, row| {
        acc.swaps += row.quantidade_troca;
    }))
}

// ── Vehicle inspections ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionPoint {
    pub inspections: f64,
    pub nonconforming_items: f64,
}
additive!(InspectionPoint { inspections, nonconforming_items });

pub fn reduce_inspections(
    rows: &[VehicleInspectionRow],
    window: &TimeWindow,
) -> SeriesReport<InspectionPoint> {
    SeriesReport::from_series(fold_monthly(rows, window, |acc: &mut InspectionPoint, row| {
        acc.inspections += row.quantidade_de_inspecoes;
        acc.nonconforming_items += row.quantidade_itens_nao_conforme;
    }))
}

// ── TP verification ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TpVerificationPoint {
    pub compliant: f64,
    pub verified: f64,
    pub total_ba: f64,
}
additive!(TpVerificationPoint { compliant, verified, total_ba });

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TpVerificationReport {
    pub totals: TpVerificationPoint,
    /// Compliant outfits over verified ones, as a percentage.
    pub compliance_rate: f64,
    pub series: MonthSeries<TpVerificationPoint>,
}

pub fn reduce_tp_verification(
    rows: &[TpVerificationRow],
    window: &TimeWindow,
) -> TpVerificationReport {
    let report = SeriesReport::from_series(fold_monthly(
        rows,
        window,
        |acc: &mut TpVerificationPoint, row| {
            acc.compliant += row.conformes;
            acc.verified += row.verificados;
            acc.total_ba += row.total_ba;
        },
    ));

    TpVerificationReport {
        compliance_rate: percentage(report.totals.compliant, report.totals.verified, 1),
        totals: report.totals,
        series: report.series,
    }
}

// ── TP hygiene ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TpHygienePoint {
    pub sanitized: f64,
    pub total: f64,
}
additive!(TpHygienePoint { sanitized, total });

pub fn reduce_tp_hygiene(rows: &[TpHygieneRow], window: &TimeWindow) -> SeriesReport<TpHygienePoint> {
    SeriesReport::from_series(fold_monthly(rows, window, |acc: &mut TpHygienePoint, row| {
        acc.sanitized += row.tp_higienizado;
        acc.total += row.total_tp;
    }))
}

// ── Accessory activities ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPoint {
    pub activities: u64,
    pub equipment: f64,
    pub firefighters: f64,
    pub minutes: f64,
}
additive!(ActivityPoint { activities, equipment, firefighters, minutes });

pub fn reduce_activities(
    rows: &[AccessoryActivityRow],
    window: &TimeWindow,
) -> SeriesReport<ActivityPoint> {
    SeriesReport::from_series(fold_monthly(rows, window, |acc: &mut ActivityPoint, row| {
        acc.activities += 1;
        acc.equipment += row.qtd_equipamentos;
        acc.firefighters += row.qtd_bombeiros;
        acc.minutes += parse_clock_to_minutes(row.tempo_gasto.as_deref());
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
