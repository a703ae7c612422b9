use chrono::NaiveDate;
use tracker_core::{
    calls::generate_calls,
    clock::ReportClock,
    config::TrackerConfig,
    date_range::DateRange,
    export::{
        call_analysis_export, closer_calls_export, closers_export, generate_filename,
        lead_note_export, methods_export, Cell, ExportFormat,
    },
    model::CallResult,
    notes::{call_analysis, lead_note},
    rng::{GeneratorSlot, RngBank},
};

fn january() -> DateRange {
    DateRange::days(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
    .unwrap()
}

fn clock() -> ReportClock {
    ReportClock::fixed(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
}

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("tracker-export-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn filename_carries_range_and_export_date() {
    assert_eq!(
        generate_filename("tracker", Some(&january()), clock().today(), ExportFormat::Xlsx),
        "tracker_2024-01-01_2024-01-31_2024-02-01.xlsx"
    );
}

#[test]
fn closers_export_names_and_sorts() {
    let config = TrackerConfig::default_test();
    let file = closers_export(&config.fixtures.closers, &january(), &clock(), ExportFormat::Csv);
    assert_eq!(file.filename, "tracker_closers_2024-01-01_2024-01-31_2024-02-01.csv");
    let sales: Vec<&Cell> = file.table.rows.iter().map(|row| &row[5]).collect();
    assert_eq!(sales, vec![&Cell::Integer(5), &Cell::Integer(3), &Cell::Integer(0)]);
}

#[test]
fn calls_export_includes_analysis_summary() {
    let config = TrackerConfig::default_test();
    let bank = RngBank::new(42);
    let closer = config.fixtures.closer("Luis Pérez").unwrap();
    let calls = generate_calls(closer, &january(), &mut bank.for_generator(GeneratorSlot::Calls));
    let refs: Vec<_> = calls.iter().collect();

    let file = closer_calls_export(
        &config.fixtures,
        "Luis Pérez",
        &refs,
        &january(),
        &clock(),
        ExportFormat::Xlsx,
        &mut bank.for_generator(GeneratorSlot::CallAnalysis),
    );
    assert!(file.filename.starts_with("agendas_luis_pérez_2024-01-01"));
    assert_eq!(file.table.rows.len(), 12);
    for row in &file.table.rows {
        match &row[6] {
            Cell::Text(summary) => assert!(!summary.is_empty()),
            other => panic!("summary cell should be text, got {other:?}"),
        }
    }
}

#[test]
fn csv_and_xlsx_land_on_disk() {
    let config = TrackerConfig::default_test();
    let dir = scratch_dir("save");
    let file = methods_export(&config.fixtures.methods, &clock(), ExportFormat::Csv);
    assert_eq!(file.filename, "metodos_marketing_2024-02-01.csv");

    let csv_path = file.table.save(&dir, &file.filename, ExportFormat::Csv).unwrap();
    let text = std::fs::read_to_string(&csv_path).unwrap();
    assert!(text.starts_with("Medio,Spend"));
    assert_eq!(text.lines().count(), 5);

    let xlsx_path = file
        .table
        .save(&dir, "metodos_marketing_2024-02-01.xlsx", ExportFormat::Xlsx)
        .unwrap();
    let bytes = std::fs::read(&xlsx_path).unwrap();
    // XLSX is a zip container.
    assert_eq!(&bytes[..2], b"PK");
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn lead_note_export_writes_one_row_csv() {
    let config = TrackerConfig::default_test();
    let note = lead_note(&config.fixtures, "María García", "Ana Torres", None, &clock());
    let file = lead_note_export(&note, &clock());
    assert_eq!(file.filename, "lead_maría_garcía_2024-02-01.csv");
    assert_eq!(file.table.headers.len(), 16);
    assert_eq!(file.table.rows[0][15], Cell::from("cliente, meta"));

    let dir = scratch_dir("lead-note");
    let path = file.table.save(&dir, &file.filename, ExportFormat::Csv).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Lead,Teléfono,Email,Closer,Fuente"));
    assert!(text.trim_end().ends_with("\"cliente, meta\""));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn placeholder_lead_note_filename_joins_name_words() {
    let config = TrackerConfig::default_test();
    let note = lead_note(
        &config.fixtures,
        "Pedro   Díaz",
        "Luis Pérez",
        Some(CallResult::Booked),
        &clock(),
    );
    let file = lead_note_export(&note, &clock());
    assert_eq!(file.filename, "lead_pedro_díaz_2024-02-01.csv");
    assert_eq!(file.table.rows[0][0], Cell::from("Pedro   Díaz"));
}

#[test]
fn call_analysis_export_spans_today() {
    let config = TrackerConfig::default_test();
    let bank = RngBank::new(42);
    let note = call_analysis(
        &config.fixtures,
        "María García",
        "Ana Torres",
        None,
        None,
        &clock(),
        &mut bank.for_generator(GeneratorSlot::CallAnalysis),
    );
    let file = call_analysis_export(&note, &clock());
    assert_eq!(
        file.filename,
        "analisis_maría_garcía_2024-02-01_2024-02-01_2024-02-01.csv"
    );
    assert_eq!(
        file.table.rows[0],
        vec![
            Cell::from("María García"),
            Cell::from("Venta"),
            Cell::from("+57 310 555 1234"),
            Cell::from("Ana Torres"),
        ]
    );
}
