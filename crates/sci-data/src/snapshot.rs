//! Snapshot assembly: domain reports plus the KPI cards rendered from them.

use chrono::{DateTime, Utc};
use sci_core::formatting::{format_decimal, format_percent};
use sci_core::time_codec::{format_minutes_human, format_seconds_clock};
use sci_core::window::{MonthBucket, TimeWindow};
use serde::Serialize;

use crate::reducers::DomainReports;

// ── KpiCard ───────────────────────────────────────────────────────────────────

/// One headline indicator, pre-formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiCard {
    pub id: &'static str,
    pub title: &'static str,
    /// Display value, pt-BR formatted.
    pub value: String,
    /// The raw number behind `value`.
    pub numeric: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl KpiCard {
    fn new(id: &'static str, title: &'static str, value: String, numeric: f64) -> Self {
        Self {
            id,
            title,
            value,
            numeric,
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ── DashboardSnapshot ─────────────────────────────────────────────────────────

/// Everything one dashboard render needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub months: Vec<MonthBucket>,
    pub kpis: Vec<KpiCard>,
    #[serde(flatten)]
    pub domains: DomainReports,
}

impl DashboardSnapshot {
    pub fn kpi(&self, id: &str) -> Option<&KpiCard> {
        self.kpis.iter().find(|card| card.id == id)
    }
}

/// Assemble a snapshot stamped with the current time.
pub fn assemble(reports: DomainReports, window: &TimeWindow) -> DashboardSnapshot {
    assemble_at(reports, window, Utc::now())
}

/// Assemble a snapshot stamped with `generated_at`.
pub fn assemble_at(
    reports: DomainReports,
    window: &TimeWindow,
    generated_at: DateTime<Utc>,
) -> DashboardSnapshot {
    DashboardSnapshot {
        generated_at,
        months: window.buckets().to_vec(),
        kpis: build_kpis(&reports),
        domains: reports,
    }
}

/// Headline cards, in display order.
pub fn build_kpis(reports: &DomainReports) -> Vec<KpiCard> {
    let mut cards = Vec::with_capacity(10);

    for (id, title, report) in [
        (
            "ocorrencias_aeronauticas",
            "Ocorrências aeronáuticas",
            &reports.aeronautical_occurrences,
        ),
        (
            "ocorrencias_nao_aeronauticas",
            "Ocorrências não aeronáuticas",
            &reports.non_aeronautical_occurrences,
        ),
    ] {
        let total = report.total as f64;
        let mut card = KpiCard::new(id, title, format_decimal(total), total);
        if report.average_attendance_seconds > 0.0 {
            card = card.with_detail(format!(
                "atendimento médio {}",
                format_seconds_clock(report.average_attendance_seconds)
            ));
        }
        cards.push(card);
    }

    let taf = &reports.taf_results;
    cards.push(
        KpiCard::new(
            "taf_aprovados",
            "Aprovados no TAF",
            format_decimal(taf.approved as f64),
            taf.approved as f64,
        )
        .with_detail(format!(
            "{} reprovados, {} não avaliados",
            format_decimal(taf.failed as f64),
            format_decimal(taf.not_evaluated as f64)
        )),
    );

    let response = &reports.response_time;
    cards.push(KpiCard::new(
        "tempo_resposta_medio",
        "Tempo resposta médio",
        format_seconds_clock(response.overall_average_seconds),
        response.overall_average_seconds,
    ));

    let training = &reports.training_hours;
    cards.push(
        KpiCard::new(
            "horas_treinamento",
            "Horas de treinamento PTR-BA",
            format_minutes_human(training.total_hours * 60.0),
            training.total_hours,
        )
        .with_detail(format!("{} registros", format_decimal(training.records as f64))),
    );

    let exam = &reports.theoretical_exam;
    cards.push(
        KpiCard::new(
            "prova_teorica_aprovacao",
            "Aprovação na prova teórica",
            format_percent(exam.approval_rate),
            exam.approval_rate,
        )
        .with_detail(format!(
            "{} aprovados de {}",
            format_decimal(exam.approved as f64),
            format_decimal((exam.approved + exam.failed) as f64)
        )),
    );

    let epr = &reports.epr;
    cards.push(
        KpiCard::new(
            "tempo_epr_medio",
            "Tempo médio de EPR",
            format_seconds_clock(epr.average_minutes * 60.0),
            epr.average_minutes,
        )
        .with_detail(format!(
            "{} ideal, {} tolerável, {} reprovado",
            format_decimal(epr.statuses.ideal as f64),
            format_decimal(epr.statuses.tolerable as f64),
            format_decimal(epr.statuses.failed as f64)
        )),
    );

    let swaps = reports.swaps.totals.swaps;
    cards.push(KpiCard::new("trocas", "Trocas realizadas", format_decimal(swaps), swaps));

    let inspections = &reports.vehicle_inspections.totals;
    cards.push(
        KpiCard::new(
            "inspecoes_viatura",
            "Inspeções de viaturas",
            format_decimal(inspections.inspections),
            inspections.inspections,
        )
        .with_detail(format!(
            "{} itens não conformes",
            format_decimal(inspections.nonconforming_items)
        )),
    );

    let activities = &reports.accessory_activities.totals;
    cards.push(
        KpiCard::new(
            "atividades_acessorias",
            "Atividades acessórias",
            format_decimal(activities.activities as f64),
            activities.activities as f64,
        )
        .with_detail(format_minutes_human(activities.minutes)),
    );

    cards
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SourceRows;
    use crate::reducers::reduce_all;
    use chrono::{NaiveDate, TimeZone};
    use sci_core::models::{
        AccessoryActivityRow, EprRow, OccurrenceRow, ResponseTimeRow, SwapRow, TafResultRow,
        TheoreticalExamRow, TrainingHoursRow,
    };
    use sci_core::window::build_month_sequence;

    fn window() -> TimeWindow {
        build_month_sequence(2, NaiveDate::from_ymd_opt(2024, 5, 15).unwrap())
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    fn text(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn sample_rows() -> SourceRows {
        SourceRows {
            aeronautical_occurrences: vec![
                OccurrenceRow {
                    data_ocorrencia: text("2024-04-02"),
                    hora_acionamento: text("10:00:00"),
                    hora_chegada: text("10:03:00"),
                    ..Default::default()
                },
                OccurrenceRow {
                    data_ocorrencia: text("2024-05-01"),
                    ..Default::default()
                },
            ],
            taf_results: vec![
                TafResultRow { data_taf: text("2024-05-01"), desempenho: Some(9.0), taf_registros: None },
                TafResultRow { data_taf: text("2024-05-01"), desempenho: Some(4.0), taf_registros: None },
                TafResultRow { data_taf: text("2024-05-01"), desempenho: None, taf_registros: None },
            ],
            response_time: vec![ResponseTimeRow {
                data_referencia: text("2024-05-02"),
                tempo_exercicio: text("00:02:30"),
            }],
            training_hours: vec![TrainingHoursRow {
                data_ptr_ba: text("2024-05-02"),
                hora_ptr_diaria: 1500.5,
            }],
            theoretical_exam: vec![
                TheoreticalExamRow { data_prova: text("2024-05-01"), status: text("Aprovado") },
                TheoreticalExamRow { data_prova: text("2024-05-01"), status: text("Aprovado") },
                TheoreticalExamRow { data_prova: text("2024-05-01"), status: text("Reprovado") },
            ],
            epr: vec![EprRow {
                data_exercicio_epr: text("2024-05-03"),
                tempo_epr: text("00:00:50"),
                status: text("Ideal"),
            }],
            swaps: vec![SwapRow { data_referencia: text("2024-04-20"), quantidade_troca: 1234.0 }],
            accessory_activities: vec![AccessoryActivityRow {
                data: text("2024-05-01"),
                tempo_gasto: text("01:05:00"),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn snapshot() -> DashboardSnapshot {
        let w = window();
        assemble_at(reduce_all(&sample_rows(), &w), &w, stamp())
    }

    // ── build_kpis ────────────────────────────────────────────────────────────

    #[test]
    fn test_kpi_ids_in_display_order() {
        let ids: Vec<&str> = snapshot().kpis.iter().map(|k| k.id).collect();
        assert_eq!(
            ids,
            vec![
                "ocorrencias_aeronauticas",
                "ocorrencias_nao_aeronauticas",
                "taf_aprovados",
                "tempo_resposta_medio",
                "horas_treinamento",
                "prova_teorica_aprovacao",
                "tempo_epr_medio",
                "trocas",
                "inspecoes_viatura",
                "atividades_acessorias",
            ]
        );
    }

    #[test]
    fn test_kpi_values_are_formatted() {
        let snap = snapshot();
        let value = |id: &str| snap.kpi(id).unwrap().value.clone();

        assert_eq!(value("ocorrencias_aeronauticas"), "2");
        assert_eq!(value("taf_aprovados"), "1");
        assert_eq!(value("tempo_resposta_medio"), "00:02:30");
        assert_eq!(value("horas_treinamento"), "1500h 30min");
        assert_eq!(value("prova_teorica_aprovacao"), "66,7%");
        assert_eq!(value("tempo_epr_medio"), "00:00:50");
        assert_eq!(value("trocas"), "1.234");
        assert_eq!(value("atividades_acessorias"), "1");
    }

    #[test]
    fn test_kpi_details() {
        let snap = snapshot();
        assert_eq!(
            snap.kpi("ocorrencias_aeronauticas").unwrap().detail.as_deref(),
            Some("atendimento médio 00:03:00")
        );
        assert_eq!(snap.kpi("ocorrencias_nao_aeronauticas").unwrap().detail, None);
        assert_eq!(
            snap.kpi("taf_aprovados").unwrap().detail.as_deref(),
            Some("1 reprovados, 1 não avaliados")
        );
        assert_eq!(
            snap.kpi("atividades_acessorias").unwrap().detail.as_deref(),
            Some("1h 05min")
        );
    }

    #[test]
    fn test_empty_reports_format_as_zero() {
        let w = window();
        let snap = assemble_at(reduce_all(&SourceRows::default(), &w), &w, stamp());
        assert_eq!(snap.kpi("tempo_resposta_medio").unwrap().value, "00:00:00");
        assert_eq!(snap.kpi("horas_treinamento").unwrap().value, "0 min");
        assert_eq!(snap.kpi("prova_teorica_aprovacao").unwrap().value, "0%");
    }

    #[test]
    fn test_epr_detail_groups_thousands() {
        let w = window();
        let mut reports = reduce_all(&SourceRows::default(), &w);
        reports.epr.statuses.ideal = 1234;
        reports.epr.statuses.tolerable = 2;
        reports.epr.statuses.failed = 10500;
        let snap = assemble_at(reports, &w, stamp());
        assert_eq!(
            snap.kpi("tempo_epr_medio").unwrap().detail.as_deref(),
            Some("1.234 ideal, 2 tolerável, 10.500 reprovado")
        );
    }

    // ── assemble_at ───────────────────────────────────────────────────────────

    #[test]
    fn test_snapshot_months_match_window() {
        let snap = snapshot();
        let keys: Vec<&str> = snap.months.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-04", "2024-05"]);
        assert_eq!(snap.generated_at, stamp());
    }

    #[test]
    fn test_snapshot_is_deterministic_for_same_input() {
        assert_eq!(snapshot(), snapshot());
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let json = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(json["generatedAt"], "2024-05-15T12:00:00Z");
        assert_eq!(json["months"][0]["label"], "abr/24");
        assert_eq!(json["aeronauticalOccurrences"]["series"][0]["count"], 1);
        assert_eq!(json["aeronauticalOccurrences"]["series"][0]["key"], "2024-04");
        assert_eq!(json["tafResults"]["notEvaluated"], 1);
        assert_eq!(json["swaps"]["totals"]["swaps"], 1234.0);
        assert!(json["kpis"][3].get("detail").is_none());
    }
}
