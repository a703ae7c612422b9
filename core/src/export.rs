//! Spreadsheet exports: closers table, per-closer calls, methods table,
//! plus single-row lead-note and call-analysis CSVs.
//!
//! Tables are built as plain header + row data, then written either as
//! a single-sheet XLSX workbook or as CSV. Filenames carry the exported
//! range and the export date so repeated downloads never collide.

use crate::{
    clock::ReportClock,
    config::FixtureSet,
    date_range::{end_of_day, start_of_day, DateRange},
    error::{TrackerError, TrackerResult},
    format::{pct, time_of_day},
    metrics::{closer_close_rate, closer_show_rate, method_roas},
    model::{CallAnalysisNote, CallRecord, ChannelSummary, CloserRecord, LeadNote},
    notes::call_analysis,
    rng::RandomSource,
};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CLOSERS_PREFIX: &str = "tracker_closers";
pub const CLOSERS_SHEET: &str = "Tracker de Closers";
pub const METHODS_PREFIX: &str = "metodos_marketing";
pub const METHODS_SHEET: &str = "Métodos de Marketing";
pub const LEAD_NOTE_SHEET: &str = "Ficha de Lead";
pub const CALL_ANALYSIS_SHEET: &str = "Análisis de Llamada";
const PLACEHOLDER: &str = "—";
const MAX_SHEET_NAME: usize = 31;

// ── Filenames ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

/// `{prefix}_{start}_{end}_{today}.{ext}`; the range part is left out
/// when no range is given. Dates are ISO `yyyy-mm-dd`.
pub fn generate_filename(
    prefix: &str,
    range: Option<&DateRange>,
    today: NaiveDate,
    format: ExportFormat,
) -> String {
    let range_part = range
        .map(|r| format!("_{}_{}", r.start_date(), r.end_date()))
        .unwrap_or_default();
    format!("{prefix}{range_part}_{today}.{}", format.extension())
}

/// Replace characters that are unsafe in filenames (and runs of
/// whitespace) with `_`, then lowercase.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => out.push('_'),
            other => out.extend(other.to_lowercase()),
        }
    }
    out
}

// ── Tables ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Cell {
    Integer(u64),
    Number(f64),
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportTable {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ExportTable {
    pub fn new(sheet_name: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.headers.len(), "row width must match headers");
        self.rows.push(row);
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> TrackerResult<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(&self.headers)?;
        for row in &self.rows {
            out.write_record(row.iter().map(Cell::to_string))?;
        }
        out.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn write_xlsx(&self, path: &Path) -> TrackerResult<()> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(&self.sheet_name))?;

        for (col, header) in self.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
        }
        for (r, row) in self.rows.iter().enumerate() {
            let row_index = (r + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Integer(v) => worksheet.write_number(row_index, col, *v as f64)?,
                    Cell::Number(v) => worksheet.write_number(row_index, col, *v)?,
                    Cell::Text(v) => worksheet.write_string(row_index, col, v)?,
                };
            }
        }
        workbook.save(path)?;
        Ok(())
    }

    /// Write the table into `dir` under `filename`, in the given format.
    pub fn save(&self, dir: &Path, filename: &str, format: ExportFormat) -> TrackerResult<PathBuf> {
        let path = dir.join(filename);
        match format {
            ExportFormat::Xlsx => self.write_xlsx(&path)?,
            ExportFormat::Csv => {
                let file = File::create(&path).map_err(|source| TrackerError::Io {
                    path: path.clone(),
                    source,
                })?;
                self.write_csv(file)?;
            }
        }
        log::info!(
            "export: wrote {} rows to {}",
            self.rows.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Excel rejects `[]:*?/\` in sheet names and caps them at 31 characters.
fn sheet_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME)
        .collect()
}

/// A table paired with the filename it should be saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub table: ExportTable,
}

// ── Builders ─────────────────────────────────────────────────────────────────

/// All closers, sorted by sales descending.
pub fn closers_table(closers: &[CloserRecord]) -> ExportTable {
    let mut table = ExportTable::new(
        CLOSERS_SHEET,
        &[
            "Closer",
            "Leads",
            "Agendas",
            "Shows",
            "Ofertas",
            "Ventas",
            "Cash",
            "Porcentaje Cierre",
            "Porcentaje Show",
            "Notas",
        ],
    );
    let mut sorted: Vec<&CloserRecord> = closers.iter().collect();
    sorted.sort_by(|a, b| b.sales.cmp(&a.sales));
    for closer in sorted {
        table.push_row(vec![
            closer.closer.as_str().into(),
            closer.leads.into(),
            closer.agendas.into(),
            closer.shows.into(),
            closer.offers.into(),
            closer.sales.into(),
            closer.cash.into(),
            pct(closer_close_rate(closer)).into(),
            pct(closer_show_rate(closer)).into(),
            closer.notes.as_str().into(),
        ]);
    }
    table
}

pub fn closers_export(
    closers: &[CloserRecord],
    range: &DateRange,
    clock: &ReportClock,
    format: ExportFormat,
) -> ExportFile {
    ExportFile {
        filename: generate_filename(CLOSERS_PREFIX, Some(range), clock.today(), format),
        table: closers_table(closers),
    }
}

/// One closer's (already filtered) calls, with the call-analysis summary.
pub fn closer_calls_table<R: RandomSource>(
    fixtures: &FixtureSet,
    closer: &str,
    calls: &[&CallRecord],
    clock: &ReportClock,
    rng: &mut R,
) -> ExportTable {
    let mut table = ExportTable::new(
        format!("Agendas {closer}"),
        &[
            "Closer",
            "Lead",
            "Fecha",
            "Estado",
            "Resultado",
            "Monto",
            "Resumen",
            "Notas",
        ],
    );
    for call in calls {
        let analysis = call_analysis(
            fixtures,
            &call.lead,
            &call.closer,
            Some(call.result),
            call.amount,
            clock,
            rng,
        );
        table.push_row(vec![
            call.closer.as_str().into(),
            call.lead.as_str().into(),
            time_of_day(call.ts).into(),
            call.outcome.label().into(),
            call.result.label().into(),
            call.amount.unwrap_or(0.0).into(),
            analysis.summary.into(),
            call.notes.clone().unwrap_or_default().into(),
        ]);
    }
    table
}

pub fn closer_calls_export<R: RandomSource>(
    fixtures: &FixtureSet,
    closer: &str,
    calls: &[&CallRecord],
    range: &DateRange,
    clock: &ReportClock,
    format: ExportFormat,
    rng: &mut R,
) -> ExportFile {
    let prefix = sanitize_filename(&format!("agendas_{closer}"));
    ExportFile {
        filename: generate_filename(&prefix, Some(range), clock.today(), format),
        table: closer_calls_table(fixtures, closer, calls, clock, rng),
    }
}

pub fn methods_table(methods: &[ChannelSummary]) -> ExportTable {
    let mut table = ExportTable::new(
        METHODS_SHEET,
        &[
            "Medio", "Spend", "Agendas", "Shows", "Ventas", "Cash", "ROAS", "Mensajes", "Videos",
        ],
    );
    let optional_count = |value: Option<u64>| match value {
        Some(n) if n > 0 => Cell::Integer(n),
        _ => Cell::from(PLACEHOLDER),
    };
    for method in methods {
        let roas = method_roas(method)
            .map(|r| Cell::Text(format!("{r:.2}")))
            .unwrap_or_else(|| Cell::from(PLACEHOLDER));
        table.push_row(vec![
            method.method.as_str().into(),
            method.spend.into(),
            method.agendas_q.into(),
            method.shows_q.into(),
            method.sales.into(),
            method.cash.into(),
            roas,
            optional_count(method.messages),
            optional_count(method.videos),
        ]);
    }
    table
}

/// Methods export carries no range in its filename.
pub fn methods_export(
    methods: &[ChannelSummary],
    clock: &ReportClock,
    format: ExportFormat,
) -> ExportFile {
    ExportFile {
        filename: generate_filename(METHODS_PREFIX, None, clock.today(), format),
        table: methods_table(methods),
    }
}

/// One lead note as a single CSV row, tags joined with `, `.
pub fn lead_note_table(note: &LeadNote) -> ExportTable {
    let mut table = ExportTable::new(
        LEAD_NOTE_SHEET,
        &[
            "Lead",
            "Teléfono",
            "Email",
            "Closer",
            "Fuente",
            "Campaña",
            "Score",
            "Estatus",
            "Interacciones",
            "Último Mensaje",
            "Valor Estimado",
            "Resultado",
            "Cita",
            "Siguiente Paso",
            "Notas",
            "Tags",
        ],
    );
    table.push_row(vec![
        note.lead.as_str().into(),
        note.phone.as_str().into(),
        note.email.as_str().into(),
        note.closer.as_str().into(),
        note.source.as_str().into(),
        note.campaign.as_str().into(),
        u64::from(note.score).into(),
        note.status.as_str().into(),
        u64::from(note.interactions).into(),
        note.last_message.as_str().into(),
        note.estimated_value.into(),
        note.result.as_str().into(),
        note.appointment.as_str().into(),
        note.next_step.as_str().into(),
        note.notes.as_str().into(),
        note.tags.join(", ").into(),
    ]);
    table
}

/// `lead_{lead}_{today}.csv`, whitespace runs in the lead name becoming `_`.
pub fn lead_note_export(note: &LeadNote, clock: &ReportClock) -> ExportFile {
    let lead = note
        .lead
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    ExportFile {
        filename: format!(
            "lead_{lead}_{}.{}",
            clock.today(),
            ExportFormat::Csv.extension()
        ),
        table: lead_note_table(note),
    }
}

pub fn call_analysis_table(note: &CallAnalysisNote) -> ExportTable {
    let mut table = ExportTable::new(
        CALL_ANALYSIS_SHEET,
        &["Lead", "Estado", "Teléfono", "Closer"],
    );
    table.push_row(vec![
        note.lead_name.as_str().into(),
        note.result.label().into(),
        note.phone.as_str().into(),
        note.closer.as_str().into(),
    ]);
    table
}

/// The analysis filename spans today only: `analisis_{lead}_{today}_{today}_{today}.csv`.
pub fn call_analysis_export(note: &CallAnalysisNote, clock: &ReportClock) -> ExportFile {
    let today = clock.today();
    let range = DateRange {
        start: start_of_day(today),
        end: end_of_day(today),
    };
    let prefix = sanitize_filename(&format!("analisis_{}", note.lead_name));
    ExportFile {
        filename: generate_filename(&prefix, Some(&range), today, ExportFormat::Csv),
        table: call_analysis_table(note),
    }
}
