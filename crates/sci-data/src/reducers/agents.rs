//! Extinguishing-agent stock against required quantities.

use std::ops::AddAssign;

use sci_core::formatting::percentage;
use sci_core::models::ExtinguishingAgentRow;
use sci_core::window::{MonthSeries, TimeWindow};
use serde::Serialize;

use super::fold_monthly;

/// One quantity per substance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentQuantities {
    pub po_quimico: f64,
    pub lge: f64,
    pub nitrogenio: f64,
}

impl AddAssign<&AgentQuantities> for AgentQuantities {
    fn add_assign(&mut self, other: &AgentQuantities) {
        self.po_quimico += other.po_quimico;
        self.lge += other.lge;
        self.nitrogenio += other.nitrogenio;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsPoint {
    pub stock: AgentQuantities,
    pub required: AgentQuantities,
    pub records: u64,
}

impl AgentsPoint {
    fn add_row(&mut self, row: &ExtinguishingAgentRow) {
        self.stock += &AgentQuantities {
            po_quimico: row.quantidade_estoque_po_quimico,
            lge: row.quantidade_estoque_lge,
            nitrogenio: row.quantidade_estoque_nitrogenio,
        };
        self.required += &AgentQuantities {
            po_quimico: row.quantidade_exigida_po_quimico,
            lge: row.quantidade_exigida_lge,
            nitrogenio: row.quantidade_exigida_nitrogenio,
        };
        self.records += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsReport {
    /// Sums over every fetched check.
    pub stock: AgentQuantities,
    pub required: AgentQuantities,
    pub records: u64,
    /// Stock as a percentage of the required quantity, per substance.
    pub coverage: AgentQuantities,
    pub series: MonthSeries<AgentsPoint>,
}

pub fn reduce_agents(rows: &[ExtinguishingAgentRow], window: &TimeWindow) -> AgentsReport {
    let mut totals = AgentsPoint::default();
    for row in rows {
        totals.add_row(row);
    }

    let coverage = AgentQuantities {
        po_quimico: percentage(totals.stock.po_quimico, totals.required.po_quimico, 1),
        lge: percentage(totals.stock.lge, totals.required.lge, 1),
        nitrogenio: percentage(totals.stock.nitrogenio, totals.required.nitrogenio, 1),
    };

    AgentsReport {
        stock: totals.stock,
        required: totals.required,
        records: totals.records,
        coverage,
        series: fold_monthly(rows, window, AgentsPoint::add_row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducers::test_support::{text, window};

    fn check(date: &str, stock: f64, required: f64) -> ExtinguishingAgentRow {
        ExtinguishingAgentRow {
            data_referencia: text(date),
            quantidade_estoque_po_quimico: stock,
            quantidade_estoque_lge: stock * 2.0,
            quantidade_estoque_nitrogenio: 0.0,
            quantidade_exigida_po_quimico: required,
            quantidade_exigida_lge: required,
            quantidade_exigida_nitrogenio: 0.0,
        }
    }

    #[test]
    fn test_sums_six_quantities_globally_and_monthly() {
        let rows = vec![
            check("2024-04-01", 50.0, 100.0),
            check("2024-05-01", 25.0, 100.0),
            check("2019-05-01", 25.0, 0.0),
        ];
        let report = reduce_agents(&rows, &window(2));
        assert_eq!(report.records, 3);
        assert_eq!(report.stock.po_quimico, 100.0);
        assert_eq!(report.stock.lge, 200.0);
        assert_eq!(report.required.po_quimico, 200.0);

        let april = report.series.get("2024-04").unwrap();
        assert_eq!(april.stock.po_quimico, 50.0);
        assert_eq!(april.records, 1);
    }

    #[test]
    fn test_coverage_percentages() {
        let rows = vec![check("2024-05-01", 50.0, 100.0)];
        let report = reduce_agents(&rows, &window(1));
        assert_eq!(report.coverage.po_quimico, 50.0);
        assert_eq!(report.coverage.lge, 100.0);
        assert_eq!(report.coverage.nitrogenio, 0.0);
    }
}
