use chrono::NaiveDate;
use std::path::PathBuf;
use tracker_core::{
    clock::ReportClock,
    config::TrackerConfig,
    model::{CallObjective, CallResult, Sentiment},
    notes::{call_analysis, lead_note, lead_notes_for_closer},
    rng::{GeneratorSlot, RngBank},
};

fn config() -> TrackerConfig {
    TrackerConfig::load(PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../data"))).unwrap()
}

fn clock() -> ReportClock {
    ReportClock::fixed(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
}

#[test]
fn stored_note_is_returned_verbatim() {
    let config = config();
    let note = lead_note(&config.fixtures, "José Rodríguez", "Luis Pérez", None, &clock());
    assert_eq!(note.id, "ln_2");
    assert_eq!(note.appointment, "2024-01-29 15:00");
    assert_eq!(lead_notes_for_closer(&config.fixtures, "Ana Torres").len(), 1);
}

#[test]
fn placeholder_note_is_stable_per_lead() {
    let config = config();
    let a = lead_note(&config.fixtures, "Agenda 4", "Sofía Díaz", Some(CallResult::Lost), &clock());
    let b = lead_note(&config.fixtures, "Agenda 4", "Sofía Díaz", Some(CallResult::Lost), &clock());
    assert_eq!(a, b);
    assert!(a.id.starts_with("mock_"));
    assert!(a.email.starts_with("agenda.4@"));
    assert!(a.phone.starts_with("+57 3"));
}

#[test]
fn stored_analysis_wins_over_generation() {
    let config = config();
    let mut rng = RngBank::new(1).for_generator(GeneratorSlot::CallAnalysis);
    let analysis = call_analysis(
        &config.fixtures,
        "María García",
        "Ana Torres",
        Some(CallResult::Lost),
        None,
        &clock(),
        &mut rng,
    );
    assert_eq!(analysis.id, "ca_1");
    assert_eq!(analysis.objective, CallObjective::Closing);
    assert_eq!(analysis.transcript.len(), 3);
}

#[test]
fn generated_sale_analysis_is_positive() {
    let config = config();
    let mut rng = RngBank::new(1).for_generator(GeneratorSlot::CallAnalysis);
    let analysis = call_analysis(
        &config.fixtures,
        "Agenda 2",
        "Jorge Ramírez",
        Some(CallResult::Sale),
        Some(980.0),
        &clock(),
        &mut rng,
    );
    assert!(analysis.id.starts_with("ca_"));
    assert_eq!(analysis.result, CallResult::Sale);
    assert_eq!(analysis.sentiment, Sentiment::Positive);
    assert!(analysis.summary.contains("cerró por 980."), "{}", analysis.summary);
    assert!(!analysis.transcript.is_empty());
}
