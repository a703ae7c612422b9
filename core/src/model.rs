//! Fixture records: read-only snapshots loaded once per report.
//!
//! JSON keys follow the fixture files exactly (camelCase for ads,
//! methods and closers; Spanish keys for branches and notes).

use crate::types::{AdId, CloserName, Count, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Ads ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CampaignName {
    H1,
    H2,
    H3,
    H4,
}

impl CampaignName {
    pub const ALL: [CampaignName; 4] = [Self::H1, Self::H2, Self::H3, Self::H4];

    pub fn label(&self) -> &'static str {
        match self {
            Self::H1 => "H1",
            Self::H2 => "H2",
            Self::H3 => "H3",
            Self::H4 => "H4",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubCampaign {
    pub name: CampaignName,
    pub spend: Money,
    pub agendas_q: Count,
    pub shows_q: Count,
    pub sales: Count,
    pub cash: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpaq: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpsq: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cac: Option<Money>,
    pub roas: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdRecord {
    pub ad_id: AdId,
    pub ad_name: String,
    pub medium: String,
    pub spend: Money,
    pub agendas: Count,
    pub agendas_q: Count,
    pub shows_q: Count,
    pub sales: Count,
    pub cash: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaigns: Option<Vec<SubCampaign>>,
}

pub const META_ADS: &str = "Meta Ads";

impl AdRecord {
    pub fn is_meta(&self) -> bool {
        self.medium == META_ADS
    }
}

// ── Methods (acquisition channels) ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub method: String,
    pub spend: Money,
    pub agendas: Count,
    pub agendas_q: Count,
    pub shows_q: Count,
    pub sales: Count,
    pub cash: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Count>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Count>,
}

pub const PROSPECTING: &str = "Prospección";
pub const ORGANIC: &str = "Orgánico";

impl ChannelSummary {
    pub fn is_paid(&self) -> bool {
        self.spend > 0.0
    }
}

// ── Closers ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CloserRecord {
    pub closer: CloserName,
    pub leads: Count,
    pub agendas: Count,
    pub shows: Count,
    pub offers: Count,
    pub sales: Count,
    pub cash: Money,
    #[serde(default)]
    pub notes: String,
}

// ── Branches ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalespersonRecord {
    pub id: u32,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "leadsAsignados")]
    pub leads_assigned: Count,
    #[serde(rename = "citasRealizadas")]
    pub appointments: Count,
    #[serde(rename = "clientesMitigados")]
    pub clients: Count,
    #[serde(rename = "ventasRealizadas")]
    pub sales: Count,
    #[serde(rename = "tasaConversion")]
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchRecord {
    pub id: u32,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "inversionPublicidad")]
    pub ad_investment: Money,
    #[serde(rename = "leadsDistribuidos")]
    pub leads: Count,
    #[serde(rename = "leadsCalificados")]
    pub qualified_leads: Count,
    #[serde(rename = "citasConcretadas")]
    pub appointments: Count,
    #[serde(rename = "clientesMitigados")]
    pub clients: Count,
    #[serde(rename = "costosOficina")]
    pub office_costs: Money,
    #[serde(rename = "vendedores", default)]
    pub sellers: Vec<SalespersonRecord>,
}

// ── Calls ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CallOutcome {
    #[serde(rename = "Show")]
    Show,
    #[serde(rename = "No Show")]
    NoShow,
    #[serde(rename = "Conectada")]
    Connected,
    #[serde(rename = "No contesta")]
    NoAnswer,
    #[serde(rename = "Buzón")]
    Voicemail,
    #[serde(rename = "Rechazada")]
    Rejected,
}

impl CallOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Show => "Show",
            Self::NoShow => "No Show",
            Self::Connected => "Conectada",
            Self::NoAnswer => "No contesta",
            Self::Voicemail => "Buzón",
            Self::Rejected => "Rechazada",
        }
    }

    pub fn attended(&self) -> bool {
        matches!(self, Self::Show | Self::Connected)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CallResult {
    #[serde(rename = "Venta", alias = "Venta cerrada")]
    Sale,
    #[serde(rename = "Oferta enviada")]
    OfferSent,
    #[serde(rename = "Seguimiento")]
    FollowUp,
    #[serde(rename = "Perdida")]
    Lost,
    #[serde(rename = "No calificada")]
    Unqualified,
    #[serde(rename = "Agendada")]
    Booked,
}

impl CallResult {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sale => "Venta",
            Self::OfferSent => "Oferta enviada",
            Self::FollowUp => "Seguimiento",
            Self::Lost => "Perdida",
            Self::Unqualified => "No calificada",
            Self::Booked => "Agendada",
        }
    }

    /// Parse a display label, accepting the fixtures' "Venta cerrada" alias.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Venta" | "Venta cerrada" => Some(Self::Sale),
            "Oferta enviada" => Some(Self::OfferSent),
            "Seguimiento" => Some(Self::FollowUp),
            "Perdida" => Some(Self::Lost),
            "No calificada" => Some(Self::Unqualified),
            "Agendada" => Some(Self::Booked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub id: String,
    pub closer: CloserName,
    pub ts: DateTime<Utc>,
    pub lead: String,
    pub phone: String,
    pub duration_sec: u32,
    pub outcome: CallOutcome,
    pub result: CallResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
}

// ── Notes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadNote {
    pub id: String,
    pub closer: CloserName,
    pub lead: String,
    pub phone: String,
    pub email: String,
    #[serde(rename = "fuente")]
    pub source: String,
    #[serde(rename = "campania")]
    pub campaign: String,
    #[serde(rename = "adId")]
    pub ad_id: String,
    pub score: u32,
    #[serde(rename = "estatus")]
    pub status: String,
    #[serde(rename = "interacciones")]
    pub interactions: u32,
    #[serde(rename = "ultimoMensaje")]
    pub last_message: String,
    #[serde(rename = "valorEstimado")]
    pub estimated_value: Money,
    #[serde(rename = "resultado")]
    pub result: String,
    #[serde(rename = "cita")]
    pub appointment: String,
    #[serde(rename = "siguientePaso")]
    pub next_step: String,
    #[serde(rename = "notas")]
    pub notes: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CallObjective {
    #[serde(rename = "Descubrimiento")]
    Discovery,
    Demo,
    #[serde(rename = "Cierre")]
    Closing,
    #[serde(rename = "Seguimiento")]
    FollowUp,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sentiment {
    #[serde(rename = "Positivo")]
    Positive,
    #[serde(rename = "Neutro")]
    Neutral,
    #[serde(rename = "Negativo")]
    Negative,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallAnalysisNote {
    pub id: String,
    #[serde(rename = "leadName")]
    pub lead_name: String,
    pub phone: String,
    pub closer: CloserName,
    #[serde(rename = "objetivo")]
    pub objective: CallObjective,
    #[serde(rename = "resultado")]
    pub result: CallResult,
    #[serde(rename = "objecciones")]
    pub objections: Vec<String>,
    #[serde(rename = "sentimiento")]
    pub sentiment: Sentiment,
    #[serde(rename = "resumen")]
    pub summary: String,
    #[serde(rename = "acciones")]
    pub actions: Vec<String>,
    #[serde(rename = "cita", default, skip_serializing_if = "Option::is_none")]
    pub appointment: Option<String>,
    #[serde(rename = "transcripcion")]
    pub transcript: Vec<String>,
}
