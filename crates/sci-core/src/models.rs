//! Record sources and their typed row shapes.
//!
//! Every backend table gets its own row struct so a reducer can only read
//! fields that exist for its source. Decoding is lenient: numbers may arrive
//! as JSON numbers, numeric strings or null, and anything unusable becomes
//! `0` (or `None` where absence carries meaning).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::time_utils::first_present;

// ── RecordSource ──────────────────────────────────────────────────────────────

/// The fifteen record sources the dashboard aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordSource {
    AeronauticalOccurrences,
    NonAeronauticalOccurrences,
    TafSessions,
    TafResults,
    ResponseTime,
    TrainingHours,
    TheoreticalExam,
    EprTime,
    ExtinguishingAgents,
    UniformDelivery,
    Swaps,
    VehicleInspections,
    TpVerification,
    TpHygiene,
    AccessoryActivities,
}

/// Parent relation TAF results are joined through.
pub const TAF_PARENT_RELATION: &str = "taf_registros";

impl RecordSource {
    /// Every source, in the order fetches are issued and failures reported.
    pub const ALL: [RecordSource; 15] = [
        Self::AeronauticalOccurrences,
        Self::NonAeronauticalOccurrences,
        Self::TafSessions,
        Self::TafResults,
        Self::ResponseTime,
        Self::TrainingHours,
        Self::TheoreticalExam,
        Self::EprTime,
        Self::ExtinguishingAgents,
        Self::UniformDelivery,
        Self::Swaps,
        Self::VehicleInspections,
        Self::TpVerification,
        Self::TpHygiene,
        Self::AccessoryActivities,
    ];

    /// Backend table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::AeronauticalOccurrences => "ocorrencias_aeronauticas",
            Self::NonAeronauticalOccurrences => "ocorrencias_nao_aeronauticas",
            Self::TafSessions => "taf_registros",
            Self::TafResults => "taf_resultados",
            Self::ResponseTime => "tempo_resposta",
            Self::TrainingHours => "ptr_ba_horas_treinamento",
            Self::TheoreticalExam => "ptr_ba_prova_teorica",
            Self::EprTime => "tempo_epr",
            Self::ExtinguishingAgents => "agentes_extintores",
            Self::UniformDelivery => "controle_uniformes_recebidos",
            Self::Swaps => "controle_trocas",
            Self::VehicleInspections => "inspecoes_viatura",
            Self::TpVerification => "verificacao_tps",
            Self::TpHygiene => "higienizacao_tps",
            Self::AccessoryActivities => "atividades_acessorias",
        }
    }

    /// Date column the window's lower bound is applied to.
    ///
    /// TAF results are bounded by their parent session's date.
    pub fn date_column(self) -> &'static str {
        match self {
            Self::AeronauticalOccurrences | Self::NonAeronauticalOccurrences => "data_ocorrencia",
            Self::TafSessions => "data_teste",
            Self::TafResults => "taf_registros.data_teste",
            Self::ResponseTime | Self::ExtinguishingAgents | Self::Swaps => "data_referencia",
            Self::TrainingHours => "data_ptr_ba",
            Self::TheoreticalExam => "data_prova",
            Self::EprTime => "data_exercicio_epr",
            Self::UniformDelivery
            | Self::VehicleInspections
            | Self::TpVerification
            | Self::TpHygiene
            | Self::AccessoryActivities => "data",
        }
    }

    /// Column projection, including the inner join for TAF results.
    pub fn projection(self) -> &'static str {
        match self {
            Self::TafResults => "*,taf_registros!inner(data_teste,secao_id,equipe_id)",
            _ => "*",
        }
    }

    /// Relation the section/team filters go through, when they do not live
    /// on the row itself.
    pub fn scope_relation(self) -> Option<&'static str> {
        match self {
            Self::TafResults => Some(TAF_PARENT_RELATION),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

// ── Dated rows ────────────────────────────────────────────────────────────────

/// A row that can be placed on the month calendar.
pub trait DatedRow {
    /// The date-like value that decides the row's month, if any.
    fn record_date(&self) -> Option<&str>;
}

macro_rules! dated_by {
    ($row:ty, $field:ident) => {
        impl DatedRow for $row {
            fn record_date(&self) -> Option<&str> {
                self.$field.as_deref()
            }
        }
    };
}

// ── Row shapes ────────────────────────────────────────────────────────────────

/// Aeronautical or non-aeronautical occurrence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OccurrenceRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data_ocorrencia: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub hora_acionamento: Option<String>,
    /// Arrival on scene (aeronautical occurrences).
    #[serde(default, deserialize_with = "de_opt_text")]
    pub hora_chegada: Option<String>,
    /// End of attendance (non-aeronautical occurrences).
    #[serde(default, deserialize_with = "de_opt_text")]
    pub hora_termino: Option<String>,
}
dated_by!(OccurrenceRow, data_ocorrencia);

impl OccurrenceRow {
    /// Dispatch time and the first recorded end-of-attendance time.
    pub fn attendance_span(&self) -> Option<(&str, &str)> {
        let start = first_present(&[self.hora_acionamento.as_deref()])?;
        let end = first_present(&[self.hora_chegada.as_deref(), self.hora_termino.as_deref()])?;
        Some((start, end))
    }
}

/// A TAF session (the parent record of individual results).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TafSessionRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data_teste: Option<String>,
}
dated_by!(TafSessionRow, data_teste);

/// The parent session embedded in a TAF result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TafParentRef {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data_teste: Option<String>,
}

/// One firefighter's TAF result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TafResultRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data_taf: Option<String>,
    /// Score from 0 to 10; `None` when not evaluated.
    #[serde(default, deserialize_with = "de_opt_number")]
    pub desempenho: Option<f64>,
    #[serde(default, deserialize_with = "de_parent")]
    pub taf_registros: Option<TafParentRef>,
}

impl DatedRow for TafResultRow {
    fn record_date(&self) -> Option<&str> {
        let parent = self
            .taf_registros
            .as_ref()
            .and_then(|p| p.data_teste.as_deref());
        first_present(&[self.data_taf.as_deref(), parent])
    }
}

/// CCI response-time drill.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseTimeRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data_referencia: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub tempo_exercicio: Option<String>,
}
dated_by!(ResponseTimeRow, data_referencia);

/// PTR-BA training hours logged for a day.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrainingHoursRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data_ptr_ba: Option<String>,
    #[serde(default, deserialize_with = "de_number")]
    pub hora_ptr_diaria: f64,
}
dated_by!(TrainingHoursRow, data_ptr_ba);

/// PTR-BA theoretical exam result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TheoreticalExamRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data_prova: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub status: Option<String>,
}
dated_by!(TheoreticalExamRow, data_prova);

/// EPR donning drill.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EprRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data_exercicio_epr: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub tempo_epr: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub status: Option<String>,
}
dated_by!(EprRow, data_exercicio_epr);

/// Extinguishing-agent stock check.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtinguishingAgentRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data_referencia: Option<String>,
    #[serde(default, deserialize_with = "de_number")]
    pub quantidade_estoque_po_quimico: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub quantidade_estoque_lge: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub quantidade_estoque_nitrogenio: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub quantidade_exigida_po_quimico: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub quantidade_exigida_lge: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub quantidade_exigida_nitrogenio: f64,
}
dated_by!(ExtinguishingAgentRow, data_referencia);

/// Uniform and EPI delivery control.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UniformDeliveryRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "de_number")]
    pub epi_entregue: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub epi_previsto: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub uniforme_entregue: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub uniforme_previsto: f64,
}
dated_by!(UniformDeliveryRow, data);

/// Equipment swap log.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SwapRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data_referencia: Option<String>,
    #[serde(default, deserialize_with = "de_number")]
    pub quantidade_troca: f64,
}
dated_by!(SwapRow, data_referencia);

/// Vehicle inspection log.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VehicleInspectionRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "de_number")]
    pub quantidade_de_inspecoes: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub quantidade_itens_nao_conforme: f64,
}
dated_by!(VehicleInspectionRow, data);

/// Protective-outfit (TP) verification.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TpVerificationRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "de_number")]
    pub conformes: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub verificados: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub total_ba: f64,
}
dated_by!(TpVerificationRow, data);

/// Protective-outfit (TP) hygiene.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TpHygieneRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "de_number")]
    pub tp_higienizado: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub total_tp: f64,
}
dated_by!(TpHygieneRow, data);

/// Accessory activity (equipment maintenance, inspections, lectures…).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccessoryActivityRow {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "de_number")]
    pub qtd_equipamentos: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub qtd_bombeiros: f64,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub tempo_gasto: Option<String>,
}
dated_by!(AccessoryActivityRow, data);

// ── Lenient field decoding ────────────────────────────────────────────────────

/// Read a number out of a loosely-typed JSON value.
///
/// Accepts JSON numbers and numeric strings, with either `.` or `,` as the
/// decimal separator. Non-finite values count as unparsable.
pub fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn de_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value).unwrap_or(0.0))
}

fn de_opt_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

fn de_opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// An embedded parent arrives as an object, or as a one-element array when
/// the relation is declared one-to-many.
fn de_parent<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<TafParentRef>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let object = match value {
        Value::Array(items) => items.into_iter().next(),
        Value::Object(map) => Some(Value::Object(map)),
        _ => None,
    };
    Ok(object.and_then(|v| serde_json::from_value(v).ok()))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
