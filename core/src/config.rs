use crate::{
    error::{TrackerError, TrackerResult},
    model::{
        AdRecord, BranchRecord, CallAnalysisNote, CallRecord, ChannelSummary, CloserRecord,
        LeadNote, SubCampaign,
    },
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ── Thresholds ───────────────────────────────────────────────────────────────

/// Lower-is-better badge cut-offs: below `good` is Bueno,
/// below `review` is A revisar, anything else is Malo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BadgeThresholds {
    pub good: f64,
    pub review: f64,
}

/// Higher-is-better ROAS bands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RoasBands {
    pub good: f64,
    pub review: f64,
}

impl Default for RoasBands {
    fn default() -> Self {
        Self {
            good: 3.0,
            review: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    #[serde(default)]
    pub roas: RoasBands,
    /// Ad ranking tiers, highest first.
    #[serde(default = "default_ad_roas_tiers")]
    pub ad_roas_tiers: [f64; 3],
    #[serde(default)]
    pub cpa_q: Option<BadgeThresholds>,
    #[serde(default)]
    pub cps_q: Option<BadgeThresholds>,
    #[serde(default)]
    pub cac: Option<BadgeThresholds>,
}

fn default_ad_roas_tiers() -> [f64; 3] {
    [4.0, 3.0, 2.0]
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            roas: RoasBands::default(),
            ad_roas_tiers: default_ad_roas_tiers(),
            cpa_q: None,
            cps_q: None,
            cac: None,
        }
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// Every record the tracker reads, loaded once and never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSet {
    pub ads: Vec<AdRecord>,
    pub methods: Vec<ChannelSummary>,
    pub closers: Vec<CloserRecord>,
    pub branches: Vec<BranchRecord>,
    pub calls: Vec<CallRecord>,
    pub lead_notes: Vec<LeadNote>,
    pub call_analyses: Vec<CallAnalysisNote>,
}

impl FixtureSet {
    pub fn closer(&self, name: &str) -> TrackerResult<&CloserRecord> {
        self.closers
            .iter()
            .find(|c| c.closer == name)
            .ok_or_else(|| TrackerError::UnknownCloser { name: name.into() })
    }

    /// Reject negative monetary fields. Counts are unsigned already.
    pub fn validate(&self) -> TrackerResult<()> {
        for ad in &self.ads {
            let record = format!("ad {}", ad.ad_id);
            non_negative(&record, "spend", ad.spend)?;
            non_negative(&record, "cash", ad.cash)?;
            for campaign in ad.campaigns.iter().flatten() {
                validate_campaign(&record, campaign)?;
            }
        }
        for method in &self.methods {
            let record = format!("method {}", method.method);
            non_negative(&record, "spend", method.spend)?;
            non_negative(&record, "cash", method.cash)?;
            if let Some(billing) = method.billing {
                non_negative(&record, "billing", billing)?;
            }
        }
        for closer in &self.closers {
            non_negative(&format!("closer {}", closer.closer), "cash", closer.cash)?;
        }
        for branch in &self.branches {
            let record = format!("branch {}", branch.name);
            non_negative(&record, "inversionPublicidad", branch.ad_investment)?;
            non_negative(&record, "costosOficina", branch.office_costs)?;
        }
        for call in &self.calls {
            if let Some(amount) = call.amount {
                non_negative(&format!("call {}", call.id), "amount", amount)?;
            }
        }
        Ok(())
    }
}

fn validate_campaign(record: &str, campaign: &SubCampaign) -> TrackerResult<()> {
    let record = format!("{record} / {}", campaign.name.label());
    non_negative(&record, "spend", campaign.spend)?;
    non_negative(&record, "cash", campaign.cash)
}

fn non_negative(record: &str, field: &'static str, value: f64) -> TrackerResult<()> {
    if value < 0.0 {
        return Err(TrackerError::NegativeAmount {
            record: record.to_string(),
            field,
            value,
        });
    }
    Ok(())
}

// ── Config ───────────────────────────────────────────────────────────────────

pub const ADS_FILE: &str = "ads.json";
pub const METHODS_FILE: &str = "methods.json";
pub const CLOSERS_FILE: &str = "closers.json";
pub const BRANCHES_FILE: &str = "branches.json";
pub const CALLS_FILE: &str = "calls.json";
pub const LEAD_NOTES_FILE: &str = "lead_notes.json";
pub const CALL_ANALYSIS_FILE: &str = "call_analysis.json";
pub const THRESHOLDS_FILE: &str = "thresholds.json";

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub data_dir: Option<PathBuf>,
    pub fixtures: FixtureSet,
    pub thresholds: Thresholds,
}

impl TrackerConfig {
    /// Load from a fixture directory.
    /// ads, methods and closers are required; everything else is optional.
    /// In tests, use TrackerConfig::default_test().
    pub fn load(data_dir: impl AsRef<Path>) -> TrackerResult<Self> {
        let dir = data_dir.as_ref();

        let fixtures = FixtureSet {
            ads: read_json(&dir.join(ADS_FILE))?,
            methods: read_json(&dir.join(METHODS_FILE))?,
            closers: read_json(&dir.join(CLOSERS_FILE))?,
            branches: read_optional_json(&dir.join(BRANCHES_FILE))?.unwrap_or_default(),
            calls: read_optional_json(&dir.join(CALLS_FILE))?.unwrap_or_default(),
            lead_notes: read_optional_json(&dir.join(LEAD_NOTES_FILE))?.unwrap_or_default(),
            call_analyses: read_optional_json(&dir.join(CALL_ANALYSIS_FILE))?
                .unwrap_or_default(),
        };
        fixtures.validate()?;

        let thresholds = read_optional_json(&dir.join(THRESHOLDS_FILE))?.unwrap_or_default();

        log::info!(
            "Loaded fixtures from {}: {} ads, {} methods, {} closers, {} branches, {} calls",
            dir.display(),
            fixtures.ads.len(),
            fixtures.methods.len(),
            fixtures.closers.len(),
            fixtures.branches.len(),
            fixtures.calls.len(),
        );

        Ok(Self {
            data_dir: Some(dir.to_path_buf()),
            fixtures,
            thresholds,
        })
    }

    /// Small in-memory fixture set for unit and integration tests.
    pub fn default_test() -> Self {
        let fixtures: FixtureSet = serde_json::from_str(TEST_FIXTURES)
            .unwrap_or_else(|e| panic!("built-in test fixtures are malformed: {e}"));
        Self {
            data_dir: None,
            fixtures,
            thresholds: Thresholds {
                cac: Some(BadgeThresholds {
                    good: 400.0,
                    review: 800.0,
                }),
                ..Thresholds::default()
            },
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> TrackerResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| TrackerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| TrackerError::Fixture {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional_json<T: DeserializeOwned>(path: &Path) -> TrackerResult<Option<T>> {
    if !path.exists() {
        log::debug!("Optional fixture {} not present", path.display());
        return Ok(None);
    }
    read_json(path).map(Some)
}

const TEST_FIXTURES: &str = r#"{
  "ads": [
    { "adId": "FB-01", "adName": "Meta Carousel A", "medium": "Meta Ads",
      "spend": 1200, "agendas": 40, "agendasQ": 30, "showsQ": 20, "sales": 6, "cash": 4800,
      "campaigns": [
        { "name": "H1", "spend": 700, "agendasQ": 18, "showsQ": 12, "sales": 4, "cash": 3200, "roas": 4.6 },
        { "name": "H2", "spend": 500, "agendasQ": 12, "showsQ": 8, "sales": 2, "cash": 1600, "cac": 240, "roas": 3.2 }
      ] },
    { "adId": "FB-02", "adName": "Meta Video B", "medium": "Meta Ads",
      "spend": 800, "agendas": 25, "agendasQ": 20, "showsQ": 10, "sales": 4, "cash": 2000 },
    { "adId": "GG-01", "adName": "Google Search A", "medium": "Google Ads",
      "spend": 1000, "agendas": 20, "agendasQ": 10, "showsQ": 10, "sales": 2, "cash": 1200 },
    { "adId": "TT-01", "adName": "TT Lead Gen A", "medium": "TikTok Ads",
      "spend": 0, "agendas": 5, "agendasQ": 4, "showsQ": 2, "sales": 1, "cash": 900 }
  ],
  "methods": [
    { "method": "Meta Ads", "spend": 2000, "agendas": 65, "agendasQ": 50, "showsQ": 30, "sales": 10, "cash": 6800 },
    { "method": "Google Ads", "spend": 1000, "agendas": 20, "agendasQ": 10, "showsQ": 10, "sales": 2, "cash": 1200 },
    { "method": "Prospección", "spend": 0, "agendas": 12, "agendasQ": 10, "showsQ": 8, "sales": 3, "cash": 2400, "messages": 340 },
    { "method": "Orgánico", "spend": 0, "agendas": 6, "agendasQ": 5, "showsQ": 4, "sales": 1, "cash": 600, "videos": 12 }
  ],
  "closers": [
    { "closer": "Ana Torres", "leads": 40, "agendas": 10, "shows": 8, "offers": 5, "sales": 3, "cash": 3300, "notes": "Buen cierre" },
    { "closer": "Luis Pérez", "leads": 30, "agendas": 12, "shows": 6, "offers": 6, "sales": 5, "cash": 5100, "notes": "" },
    { "closer": "Sofía Díaz", "leads": 0, "agendas": 0, "shows": 0, "offers": 0, "sales": 0, "cash": 0, "notes": "Nueva" }
  ],
  "branches": [
    { "id": 1, "nombre": "Miami", "inversionPublicidad": 6000, "leadsDistribuidos": 300, "leadsCalificados": 150,
      "citasConcretadas": 60, "clientesMitigados": 15, "costosOficina": 2500,
      "vendedores": [
        { "id": 1, "nombre": "Carla Ruiz", "leadsAsignados": 160, "citasRealizadas": 32, "clientesMitigados": 8, "ventasRealizadas": 8, "tasaConversion": 5.0 },
        { "id": 2, "nombre": "Diego Mora", "leadsAsignados": 140, "citasRealizadas": 28, "clientesMitigados": 7, "ventasRealizadas": 7, "tasaConversion": 5.0 }
      ] },
    { "id": 2, "nombre": "Tampa", "inversionPublicidad": 4000, "leadsDistribuidos": 200, "leadsCalificados": 80,
      "citasConcretadas": 40, "clientesMitigados": 10, "costosOficina": 1800,
      "vendedores": [
        { "id": 3, "nombre": "Elena Vidal", "leadsAsignados": 200, "citasRealizadas": 40, "clientesMitigados": 10, "ventasRealizadas": 10, "tasaConversion": 5.0 }
      ] }
  ],
  "calls": [
    { "id": "c1", "closer": "Ana Torres", "ts": "2024-01-10T15:00:00Z", "lead": "María García", "phone": "+57 310 555 1234",
      "durationSec": 620, "outcome": "Show", "result": "Venta", "amount": 1100 },
    { "id": "c2", "closer": "Ana Torres", "ts": "2024-01-20T09:30:00Z", "lead": "Carlos López", "phone": "+57 301 555 9876",
      "durationSec": 0, "outcome": "No contesta", "result": "Seguimiento" },
    { "id": "c3", "closer": "Luis Pérez", "ts": "2024-01-15T11:00:00Z", "lead": "Laura Flores", "phone": "+57 315 555 4321",
      "durationSec": 300, "outcome": "Conectada", "result": "Agendada" }
  ],
  "lead_notes": [
    { "id": "ln_1", "closer": "Ana Torres", "lead": "María García", "phone": "+57 310 555 1234",
      "email": "maria.garcia@gmail.com", "fuente": "Meta Ads", "campania": "Meta Carousel A", "adId": "FB-01",
      "score": 92, "estatus": "Cliente", "interacciones": 4, "ultimoMensaje": "Contrato firmado.",
      "valorEstimado": 1100, "resultado": "Venta", "cita": "", "siguientePaso": "Onboarding",
      "notas": "Cliente premium.", "tags": ["cliente", "meta"] }
  ],
  "call_analyses": [
    { "id": "ca_1", "leadName": "María García", "phone": "+57 310 555 1234", "closer": "Ana Torres",
      "objetivo": "Cierre", "resultado": "Venta", "objecciones": [], "sentimiento": "Positivo",
      "resumen": "María cerró plan anual.", "acciones": ["Enviar factura"],
      "transcripcion": ["Lead: Vamos adelante."] }
  ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_test_fixtures_parse_and_validate() {
        let config = TrackerConfig::default_test();
        assert_eq!(config.fixtures.ads.len(), 4);
        assert_eq!(config.fixtures.closers.len(), 3);
        assert_eq!(config.fixtures.branches.len(), 2);
        config.fixtures.validate().expect("test fixtures are valid");
    }

    #[test]
    fn negative_spend_is_rejected() {
        let mut fixtures = TrackerConfig::default_test().fixtures;
        fixtures.ads[0].spend = -1.0;
        let err = fixtures.validate().unwrap_err();
        assert!(matches!(
            err,
            TrackerError::NegativeAmount { field: "spend", .. }
        ));
    }

    #[test]
    fn unknown_closer_is_reported() {
        let fixtures = TrackerConfig::default_test().fixtures;
        assert!(fixtures.closer("Ana Torres").is_ok());
        assert!(matches!(
            fixtures.closer("Nadie"),
            Err(TrackerError::UnknownCloser { .. })
        ));
    }

    #[test]
    fn thresholds_fill_defaults_from_partial_json() {
        let thresholds: Thresholds =
            serde_json::from_str(r#"{ "cac": { "good": 300, "review": 600 } }"#).unwrap();
        assert_eq!(thresholds.roas, RoasBands::default());
        assert_eq!(thresholds.ad_roas_tiers, [4.0, 3.0, 2.0]);
        assert_eq!(thresholds.cac.map(|b| b.good), Some(300.0));
    }

    #[test]
    fn missing_required_fixture_is_an_io_error() {
        let dir = std::env::temp_dir().join("tracker-config-missing-fixture");
        std::fs::create_dir_all(&dir).unwrap();
        let err = TrackerConfig::load(&dir).unwrap_err();
        assert!(matches!(err, TrackerError::Io { .. }), "{err}");
    }
}
