//! Raw row sets and their decoding into typed per-source rows.

use std::collections::BTreeMap;

use sci_core::models::{
    AccessoryActivityRow, EprRow, ExtinguishingAgentRow, OccurrenceRow, RecordSource,
    ResponseTimeRow, SwapRow, TafResultRow, TafSessionRow, TheoreticalExamRow, TpHygieneRow,
    TpVerificationRow, TrainingHoursRow, UniformDeliveryRow, VehicleInspectionRow,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

// ── RawRecordSet ──────────────────────────────────────────────────────────────

/// Rows exactly as the store returned them, one set per source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecordSet {
    rows: BTreeMap<RecordSource, Vec<Value>>,
}

impl RawRecordSet {
    pub fn insert(&mut self, source: RecordSource, rows: Vec<Value>) {
        self.rows.insert(source, rows);
    }

    /// Rows fetched for `source`; empty when nothing was fetched.
    pub fn get(&self, source: RecordSource) -> &[Value] {
        self.rows.get(&source).map_or(&[], Vec::as_slice)
    }

    /// Row counts keyed by table name, for logging.
    pub fn row_counts(&self) -> BTreeMap<&'static str, usize> {
        self.rows
            .iter()
            .map(|(source, rows)| (source.table(), rows.len()))
            .collect()
    }

    pub fn total_rows(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }
}

// ── SourceRows ────────────────────────────────────────────────────────────────

/// Every source decoded into its typed row shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRows {
    pub aeronautical_occurrences: Vec<OccurrenceRow>,
    pub non_aeronautical_occurrences: Vec<OccurrenceRow>,
    pub taf_sessions: Vec<TafSessionRow>,
    pub taf_results: Vec<TafResultRow>,
    pub response_time: Vec<ResponseTimeRow>,
    pub training_hours: Vec<TrainingHoursRow>,
    pub theoretical_exam: Vec<TheoreticalExamRow>,
    pub epr: Vec<EprRow>,
    pub extinguishing_agents: Vec<ExtinguishingAgentRow>,
    pub uniform_delivery: Vec<UniformDeliveryRow>,
    pub swaps: Vec<SwapRow>,
    pub vehicle_inspections: Vec<VehicleInspectionRow>,
    pub tp_verification: Vec<TpVerificationRow>,
    pub tp_hygiene: Vec<TpHygieneRow>,
    pub accessory_activities: Vec<AccessoryActivityRow>,
}

impl SourceRows {
    /// Decode every raw set. Rows that are not JSON objects are skipped.
    pub fn decode(raw: &RawRecordSet) -> Self {
        use RecordSource::*;

        Self {
            aeronautical_occurrences: decode_rows(AeronauticalOccurrences, raw),
            non_aeronautical_occurrences: decode_rows(NonAeronauticalOccurrences, raw),
            taf_sessions: decode_rows(TafSessions, raw),
            taf_results: decode_rows(TafResults, raw),
            response_time: decode_rows(ResponseTime, raw),
            training_hours: decode_rows(TrainingHours, raw),
            theoretical_exam: decode_rows(TheoreticalExam, raw),
            epr: decode_rows(EprTime, raw),
            extinguishing_agents: decode_rows(ExtinguishingAgents, raw),
            uniform_delivery: decode_rows(UniformDelivery, raw),
            swaps: decode_rows(Swaps, raw),
            vehicle_inspections: decode_rows(VehicleInspections, raw),
            tp_verification: decode_rows(TpVerification, raw),
            tp_hygiene: decode_rows(TpHygiene, raw),
            accessory_activities: decode_rows(AccessoryActivities, raw),
        }
    }
}

fn decode_rows<T: DeserializeOwned>(source: RecordSource, raw: &RawRecordSet) -> Vec<T> {
    let rows = raw.get(source);
    let mut decoded = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;

    for row in rows {
        if !row.is_object() {
            skipped += 1;
            continue;
        }
        match T::deserialize(row) {
            Ok(typed) => decoded.push(typed),
            Err(e) => {
                warn!(source = %source, error = %e, "skipping undecodable row");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(source = %source, skipped, "skipped malformed rows");
    }
    decoded
}

// ── Tests ─────────────────────────────────────────────────────────────────────
