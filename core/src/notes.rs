//! Lead notes and call analyses shown from the call drill-down.
//!
//! Both look up the fixtures first. A lead without a stored note gets a
//! placeholder derived from its name alone, so the same lead always
//! shows the same note. Call analyses without a fixture are generated
//! from the CallAnalysis random stream.
//!
//! RULE: Placeholder lead notes use no random source at all.

use crate::{
    clock::ReportClock,
    config::FixtureSet,
    model::{CallAnalysisNote, CallObjective, CallResult, LeadNote, Sentiment},
    name_generator::NameGenerator,
    rng::RandomSource,
    types::Money,
};
use chrono::Duration;
use uuid::Builder;

const EMAIL_DOMAINS: [&str; 6] = [
    "gmail.com",
    "hotmail.com",
    "empresa.com",
    "startup.co",
    "tech.com",
    "mail.com",
];

const LEAD_FIRST_NAMES: [&str; 10] = [
    "Carlos", "María", "Luis", "Ana", "Pedro", "Sofia", "Juan", "Laura", "Diego", "Carmen",
];

const LEAD_LAST_NAMES: [&str; 10] = [
    "Pérez", "González", "Rodríguez", "López", "Castro", "Martínez", "Silva", "Torres", "Morales",
    "Díaz",
];

const SOURCES: [(&str, [&str; 3]); 5] = [
    ("Meta Ads", ["Meta Carousel A", "Meta Video B", "Meta Lead Gen"]),
    ("TikTok Ads", ["TT Lead Gen A", "TT Lead Gen B", "TT Video Campaign"]),
    ("Google Ads", ["Google Search A", "Google Display B", "Google Shopping"]),
    ("Prospección", ["LinkedIn Outreach", "Cold Email", "WhatsApp"]),
    ("Orgánico", ["Blog Content", "Social Media", "Referrals"]),
];

// ── Lead notes ───────────────────────────────────────────────────────────────

/// The stored note for (lead, closer), or a placeholder.
pub fn lead_note(
    fixtures: &FixtureSet,
    lead: &str,
    closer: &str,
    result: Option<CallResult>,
    clock: &ReportClock,
) -> LeadNote {
    fixtures
        .lead_notes
        .iter()
        .find(|note| note.lead == lead && note.closer == closer)
        .cloned()
        .unwrap_or_else(|| placeholder_lead_note(lead, closer, result, clock))
}

/// Stored notes for one closer.
pub fn lead_notes_for_closer<'a>(fixtures: &'a FixtureSet, closer: &str) -> Vec<&'a LeadNote> {
    fixtures
        .lead_notes
        .iter()
        .filter(|note| note.closer == closer)
        .collect()
}

/// Name-derived seed: sum of UTF-16 code units, modulo 1000.
pub fn lead_seed(lead: &str) -> usize {
    let hash: u32 = lead.encode_utf16().map(u32::from).sum();
    (hash % 1000) as usize
}

/// Deterministic note for a lead with no stored record.
pub fn placeholder_lead_note(
    lead: &str,
    closer: &str,
    result: Option<CallResult>,
    clock: &ReportClock,
) -> LeadNote {
    let seed = lead_seed(lead);
    let mut parts = lead.split(' ').filter(|p| !p.is_empty());
    let first_name = parts
        .next()
        .unwrap_or(LEAD_FIRST_NAMES[seed % LEAD_FIRST_NAMES.len()]);
    let last_name = parts
        .next()
        .unwrap_or(LEAD_LAST_NAMES[seed % LEAD_LAST_NAMES.len()]);

    let (source, campaigns) = SOURCES[seed % SOURCES.len()];
    let campaign = campaigns[seed % campaigns.len()];
    let source_tag = source.to_lowercase().replace(" ads", "");

    let email = format!(
        "{}.{}@{}",
        first_name.to_lowercase(),
        last_name.to_lowercase(),
        EMAIL_DOMAINS[seed % EMAIL_DOMAINS.len()]
    );
    let digits = (300_000_000 + (seed * 123) % 100_000_000).to_string();
    let phone = format!(
        "+57 {} {} {}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..digits.len().min(10)]
    );

    let profile = LeadProfile::for_result(result, seed, &source_tag, clock);

    LeadNote {
        id: format!("mock_{}_{}", slug(lead), slug(closer)),
        closer: closer.to_string(),
        lead: lead.to_string(),
        phone,
        email,
        source: source.to_string(),
        campaign: campaign.to_string(),
        ad_id: ad_id_for_source(source).to_string(),
        score: profile.score,
        status: profile.status.to_string(),
        interactions: 1 + (seed % 5) as u32,
        last_message: profile.last_message.to_string(),
        estimated_value: profile.estimated_value,
        result: result.unwrap_or(CallResult::FollowUp).label().to_string(),
        appointment: profile.appointment,
        next_step: profile.next_step.to_string(),
        notes: profile.notes.to_string(),
        tags: profile.tags,
    }
}

struct LeadProfile {
    estimated_value: Money,
    score: u32,
    status: &'static str,
    last_message: &'static str,
    next_step: &'static str,
    notes: &'static str,
    tags: Vec<String>,
    appointment: String,
}

impl LeadProfile {
    fn for_result(
        result: Option<CallResult>,
        seed: usize,
        source_tag: &str,
        clock: &ReportClock,
    ) -> Self {
        let tags = |first: &str, last: &str| vec![first.to_string(), source_tag.to_string(), last.to_string()];
        let seed_u32 = seed as u32;
        match result {
            Some(CallResult::Sale) => Self {
                estimated_value: (500 + seed % 1000) as Money,
                score: 80 + seed_u32 % 20,
                status: "Cliente",
                last_message: "Contrato firmado. Cliente satisfecho.",
                next_step: "Onboarding programado",
                notes: "Venta exitosa. Cliente premium con alto potencial.",
                tags: tags("cliente", "cerrado"),
                appointment: String::new(),
            },
            Some(CallResult::OfferSent) => {
                let follow_up = clock.now + Duration::days(1 + (seed % 7) as i64);
                Self {
                    estimated_value: (300 + seed % 900) as Money,
                    score: 60 + seed_u32 % 30,
                    status: "Calificado",
                    last_message: "Propuesta enviada, pendiente respuesta.",
                    next_step: "Seguimiento en 3 días",
                    notes: "Interesado en la propuesta. Evaluando opciones.",
                    tags: tags("propuesta", "seguimiento"),
                    appointment: follow_up.format("%Y-%m-%d %H:%M").to_string(),
                }
            }
            Some(CallResult::Lost) => Self {
                estimated_value: 0.0,
                score: 20 + seed_u32 % 40,
                status: "No calificado",
                last_message: "No hay interés en el momento.",
                next_step: "Archivo por 6 meses",
                notes: "Fuera del presupuesto. No es target actual.",
                tags: tags("descartado", "presupuesto"),
                appointment: String::new(),
            },
            Some(CallResult::Unqualified) => Self {
                estimated_value: 0.0,
                score: 10 + seed_u32 % 30,
                status: "No calificado",
                last_message: "No cumple criterios de calificación.",
                next_step: "Descartado",
                notes: "Lead no calificado según criterios establecidos.",
                tags: tags("no-calificado", "descartado"),
                appointment: String::new(),
            },
            _ => Self {
                estimated_value: 0.0,
                score: 50,
                status: "Seguimiento",
                last_message: "Contacto inicial realizado.",
                next_step: "Programar seguimiento",
                notes: "Lead generado automáticamente.",
                tags: vec![source_tag.to_string(), "nuevo".to_string()],
                appointment: String::new(),
            },
        }
    }
}

fn ad_id_for_source(source: &str) -> &'static str {
    if source.contains("Meta") {
        "FB-01"
    } else if source.contains("TikTok") {
        "TT-01"
    } else if source.contains("Google") {
        "GG-01"
    } else {
        ""
    }
}

/// Lowercase with whitespace runs collapsed to `_`.
fn slug(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

// ── Call analyses ────────────────────────────────────────────────────────────

/// The stored analysis for (lead, closer), or a generated one.
/// A missing result is treated as a follow-up call.
pub fn call_analysis<R: RandomSource>(
    fixtures: &FixtureSet,
    lead: &str,
    closer: &str,
    result: Option<CallResult>,
    amount: Option<Money>,
    clock: &ReportClock,
    rng: &mut R,
) -> CallAnalysisNote {
    if let Some(stored) = fixtures
        .call_analyses
        .iter()
        .find(|note| note.lead_name == lead && note.closer == closer)
    {
        return stored.clone();
    }
    generate_call_analysis(
        lead,
        closer,
        result.unwrap_or(CallResult::FollowUp),
        amount,
        clock,
        rng,
    )
}

pub fn generate_call_analysis<R: RandomSource>(
    lead: &str,
    closer: &str,
    result: CallResult,
    amount: Option<Money>,
    clock: &ReportClock,
    rng: &mut R,
) -> CallAnalysisNote {
    let (first_name, _) = NameGenerator::split_or_generate(lead, rng);
    let phone = NameGenerator::generate_phone(rng);
    let appointment_in = |rng: &mut R, min: u64, max: u64| {
        let days = rng.next_in_range(min, max) as i64;
        Some(
            (clock.now + Duration::days(days))
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
        )
    };

    let analysis = match result {
        CallResult::Sale => {
            let objective = if rng.next_f64() > 0.5 {
                CallObjective::Closing
            } else {
                CallObjective::Demo
            };
            let objections = if rng.next_f64() > 0.6 {
                Vec::new()
            } else {
                vec![pick(rng, &["precio", "tiempo"])]
            };
            let closed_for = match amount {
                Some(amount) if amount > 0.0 => format!("por {amount}"),
                _ => "plan anual".to_string(),
            };
            AnalysisBody {
                objective,
                objections,
                sentiment: Sentiment::Positive,
                summary: format!(
                    "{first_name} mostró interés desde el inicio. Presentamos la solución y cerró {closed_for}."
                ),
                actions: &["Enviar factura", "Agendar onboarding", "Confirmar datos de pago"],
                appointment: appointment_in(&mut *rng, 1, 3),
                transcript: &[
                    "Lead: Me gusta lo que veo, ¿cuáles son los pasos?",
                    "Closer: Te explico el proceso de implementación...",
                    "Lead: Perfecto, vamos adelante.",
                ],
            }
        }
        CallResult::OfferSent => {
            let objective = *rng.pick(&[CallObjective::Demo, CallObjective::FollowUp]);
            let objections = vec![pick(rng, &["precio", "tiempo", "confianza", "presupuesto"])];
            let sentiment = if rng.next_f64() > 0.3 {
                Sentiment::Neutral
            } else {
                Sentiment::Positive
            };
            AnalysisBody {
                objective,
                objections,
                sentiment,
                summary: format!(
                    "{first_name} mostró interés pero necesita evaluar. Envié propuesta personalizada."
                ),
                actions: &[
                    "Enviar propuesta",
                    "Seguimiento en 48h",
                    "Preparar caso de éxito similar",
                ],
                appointment: appointment_in(&mut *rng, 2, 5),
                transcript: &[
                    "Lead: Me parece interesante, ¿podrían enviar más detalles?",
                    "Closer: Por supuesto, te preparo una propuesta personalizada.",
                    "Lead: Perfecto, la revisaré con el equipo.",
                ],
            }
        }
        CallResult::Lost => {
            let objective = *rng.pick(&[CallObjective::Discovery, CallObjective::Closing]);
            AnalysisBody {
                objective,
                objections: vec![pick(rng, &["precio", "presupuesto", "timing", "necesidad"])],
                sentiment: Sentiment::Negative,
                summary: format!(
                    "{first_name} no ve valor suficiente o no tiene presupuesto. No es el momento adecuado."
                ),
                actions: &["Marcar para re-contacto en 6 meses", "Actualizar perfil"],
                appointment: None,
                transcript: &[
                    "Lead: No creo que sea lo que necesitamos ahora.",
                    "Closer: ¿Qué te preocupa específicamente?",
                    "Lead: El presupuesto y timing no nos funciona.",
                ],
            }
        }
        CallResult::FollowUp => {
            let objective = *rng.pick(&[CallObjective::Discovery, CallObjective::Demo]);
            AnalysisBody {
                objective,
                objections: vec![pick(rng, &["tiempo", "información"])],
                sentiment: Sentiment::Neutral,
                summary: format!(
                    "Primera llamada con {first_name}. Identifiqué interés, pero necesita más información."
                ),
                actions: &[
                    "Enviar material informativo",
                    "Agendar demo",
                    "Calificar mejor el lead",
                ],
                appointment: appointment_in(&mut *rng, 3, 7),
                transcript: &[
                    "Lead: Cuéntame más sobre lo que hacen.",
                    "Closer: Te explico nuestro enfoque y casos de éxito...",
                    "Lead: Interesante, me gustaría ver una demo.",
                ],
            }
        }
        CallResult::Unqualified | CallResult::Booked => AnalysisBody {
            objective: CallObjective::Discovery,
            objections: vec![pick(rng, &["necesidad", "timing", "presupuesto"])],
            sentiment: Sentiment::Negative,
            summary: format!("{first_name} no cumple con el perfil o no hay necesidad real."),
            actions: &["Descalificar y archivar"],
            appointment: None,
            transcript: &[
                "Lead: No tenemos esa necesidad actualmente.",
                "Closer: ¿En qué momento podría ser relevante?",
                "Lead: Realmente no veo que aplique para nosotros.",
            ],
        },
    };

    let id = Builder::from_random_bytes(rng.next_bytes16()).into_uuid();
    log::debug!("notes: generated call analysis for {lead} / {closer} ({})", result.label());

    CallAnalysisNote {
        id: format!("ca_{}", id.simple()),
        lead_name: lead.to_string(),
        phone,
        closer: closer.to_string(),
        objective: analysis.objective,
        result,
        objections: analysis.objections,
        sentiment: analysis.sentiment,
        summary: analysis.summary,
        actions: analysis.actions.iter().map(|a| a.to_string()).collect(),
        appointment: analysis.appointment,
        transcript: analysis.transcript.iter().map(|t| t.to_string()).collect(),
    }
}

struct AnalysisBody {
    objective: CallObjective,
    objections: Vec<String>,
    sentiment: Sentiment,
    summary: String,
    actions: &'static [&'static str],
    appointment: Option<String>,
    transcript: &'static [&'static str],
}

fn pick<R: RandomSource>(rng: &mut R, items: &[&str]) -> String {
    rng.pick(items).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::rng::ScriptedRng;
    use chrono::NaiveDate;

    fn clock() -> ReportClock {
        ReportClock::fixed(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
    }

    #[test]
    fn seed_sums_code_units() {
        // 'A' + 'b' = 65 + 98
        assert_eq!(lead_seed("Ab"), 163);
        assert_eq!(lead_seed(""), 0);
    }

    #[test]
    fn placeholder_is_stable_per_name() {
        let a = placeholder_lead_note("Pedro Castro", "Ana Torres", Some(CallResult::Sale), &clock());
        let b = placeholder_lead_note("Pedro Castro", "Ana Torres", Some(CallResult::Sale), &clock());
        assert_eq!(a, b);
        assert_eq!(a.id, "mock_pedro_castro_ana_torres");
        assert_eq!(a.status, "Cliente");
        assert!(a.email.starts_with("pedro.castro@"));
        assert!((80..100).contains(&a.score));
        assert_eq!(a.result, "Venta");
    }

    #[test]
    fn placeholder_fields_follow_the_seed() {
        // "Ab" -> seed 163: source index 3 (Prospección), campaign 1, domain 1.
        let note = placeholder_lead_note("Ab", "Luis", None, &clock());
        assert_eq!(note.source, "Prospección");
        assert_eq!(note.campaign, "Cold Email");
        assert_eq!(note.ad_id, "");
        assert_eq!(note.phone, "+57 300 020 049");
        assert_eq!(note.interactions, 4);
        assert_eq!(note.result, "Seguimiento");
        assert_eq!(note.tags, vec!["prospección".to_string(), "nuevo".to_string()]);
        // Single-word lead borrows a last name: 163 % 10 = 3.
        assert_eq!(note.email, "ab.lópez@hotmail.com");
    }

    #[test]
    fn offer_placeholder_books_a_follow_up() {
        let note = placeholder_lead_note("Ab", "Luis", Some(CallResult::OfferSent), &clock());
        // 1 + 163 % 7 = 3 days after 2024-02-01 12:00.
        assert_eq!(note.appointment, "2024-02-04 12:00");
        assert_eq!(note.status, "Calificado");
    }

    #[test]
    fn fixture_note_wins_over_placeholder() {
        let config = TrackerConfig::default_test();
        let note = lead_note(&config.fixtures, "María García", "Ana Torres", None, &clock());
        assert_eq!(note.id, "ln_1");
        assert_eq!(lead_notes_for_closer(&config.fixtures, "Ana Torres").len(), 1);
    }

    #[test]
    fn generated_analysis_matches_result() {
        let config = TrackerConfig::default_test();
        let mut rng = ScriptedRng::constant(0.0);
        let note = call_analysis(
            &config.fixtures,
            "Pedro Castro",
            "Ana Torres",
            Some(CallResult::Lost),
            None,
            &clock(),
            &mut rng,
        );
        assert_eq!(note.result, CallResult::Lost);
        assert_eq!(note.sentiment, Sentiment::Negative);
        assert_eq!(note.objective, CallObjective::Discovery);
        assert_eq!(note.objections, vec!["precio".to_string()]);
        assert!(note.appointment.is_none());
        assert!(note.summary.starts_with("Pedro "));
        assert_eq!(note.phone, "+57 300 100 1000");
        assert!(note.id.starts_with("ca_"));
    }

    #[test]
    fn sale_analysis_books_onboarding() {
        let mut rng = ScriptedRng::constant(0.0);
        let note = generate_call_analysis(
            "Laura Flores",
            "Luis Pérez",
            CallResult::Sale,
            Some(1200.0),
            &clock(),
            &mut rng,
        );
        assert_eq!(note.objective, CallObjective::Demo);
        assert_eq!(note.appointment.as_deref(), Some("2024-02-02T12:00:00"));
        assert!(note.summary.ends_with("cerró por 1200."), "{}", note.summary);
    }
}
