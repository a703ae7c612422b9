//! tracker-report: headless runner for the closer tracker dashboard.
//!
//! Usage:
//!   tracker-report --data-dir ./data summary
//!   tracker-report --range 7days --seed 7 json
//!   tracker-report --start 2024-01-01 --end 2024-01-31 calls --closer "Ana Torres"
//!   tracker-report export --kind closers --format csv --out ./exports

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracker_core::{
    branches::BranchesReport,
    calls::calls_for_closer,
    clock::ReportClock,
    config::TrackerConfig,
    dashboard::{DashboardReport, KpiCard},
    date_range::{DateFilter, DateRange, RangeSelection},
    export::{
        call_analysis_export, closer_calls_export, closers_export, lead_note_export,
        methods_export, ExportFile, ExportFormat,
    },
    format::{duration, mask_phone, money0, pct, time_of_day},
    funnel::Funnel,
    model::CallResult,
    notes::{call_analysis, lead_note},
    rng::{GeneratorSlot, RngBank},
    view_state::{CloserDrilldown, DrilldownView},
};

#[derive(Parser, Debug)]
#[command(
    name = "tracker-report",
    about = "Print, dump and export the closer tracker dashboard",
    version
)]
struct Cli {
    /// Fixture directory (ads.json, methods.json, closers.json, ...)
    #[arg(long, env = "TRACKER_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,
    /// Master seed for every synthetic generator
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Date preset: today, yesterday, 7days, 30days or custom
    #[arg(long, default_value_t = DateFilter::Last30Days)]
    range: DateFilter,
    /// Custom range start (YYYY-MM-DD); requires --end
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,
    /// Custom range end (YYYY-MM-DD); requires --start
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,
    /// Pin "today" instead of reading the wall clock
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// KPI cards, methods, closers and warnings as text
    Summary,
    /// The full dashboard report as JSON
    Json,
    /// Closer table sorted by sales
    Closers,
    /// Drill-down calls for one closer
    Calls(CallsArgs),
    /// Lead note for a lead handled by a closer
    Notes(NoteArgs),
    /// Call analysis for a lead handled by a closer
    Analysis(AnalysisArgs),
    /// Branch cards, ranking and conversion funnel
    Branches,
    /// Write an XLSX or CSV export
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct CallsArgs {
    #[arg(long)]
    closer: String,
    /// Accent-insensitive lead search
    #[arg(long, default_value = "")]
    search: String,
    /// Show calls from calls.json instead of generated ones
    #[arg(long)]
    logged: bool,
}

#[derive(Args, Debug)]
struct NoteArgs {
    #[arg(long)]
    closer: String,
    #[arg(long)]
    lead: String,
    /// Call result label, e.g. "Venta" or "Oferta enviada"
    #[arg(long, value_parser = parse_result)]
    result: Option<CallResult>,
}

#[derive(Args, Debug)]
struct AnalysisArgs {
    #[command(flatten)]
    note: NoteArgs,
    #[arg(long)]
    amount: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportKind {
    Closers,
    Calls,
    Methods,
    /// One lead's note card, always CSV
    LeadNote,
    /// One call analysis header row, always CSV
    Analysis,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum FormatArg {
    #[default]
    Xlsx,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Xlsx => ExportFormat::Xlsx,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long, value_enum)]
    kind: ExportKind,
    #[arg(long, value_enum, default_value_t = FormatArg::Xlsx)]
    format: FormatArg,
    /// Required for --kind calls, lead-note and analysis
    #[arg(long)]
    closer: Option<String>,
    /// Lead search applied to --kind calls
    #[arg(long, default_value = "")]
    search: String,
    /// Required for --kind lead-note and analysis
    #[arg(long)]
    lead: Option<String>,
    #[arg(long, value_parser = parse_result)]
    result: Option<CallResult>,
    #[arg(long)]
    amount: Option<f64>,
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = TrackerConfig::load(&cli.data_dir)
        .with_context(|| format!("loading fixtures from {}", cli.data_dir.display()))?;
    let clock = cli
        .today
        .map(ReportClock::fixed)
        .unwrap_or_else(ReportClock::system);
    let range = resolve_range(&cli, &clock)?;
    let bank = RngBank::new(cli.seed);
    log::debug!("range {} seed {}", range.label(), cli.seed);

    match &cli.command {
        Command::Summary => {
            let report = DashboardReport::build(&config, &range, &clock, &bank);
            print_summary(&report);
        }
        Command::Json => {
            let report = DashboardReport::build(&config, &range, &clock, &bank);
            println!("{}", report.to_json()?);
        }
        Command::Closers => {
            let report = DashboardReport::build(&config, &range, &clock, &bank);
            print_closers(&report);
        }
        Command::Calls(args) => print_calls(&config, &range, &bank, args)?,
        Command::Notes(args) => {
            config.fixtures.closer(&args.closer)?;
            let note = lead_note(&config.fixtures, &args.lead, &args.closer, args.result, &clock);
            println!("{}", serde_json::to_string_pretty(&note)?);
        }
        Command::Analysis(args) => {
            config.fixtures.closer(&args.note.closer)?;
            let mut rng = bank.for_generator(GeneratorSlot::CallAnalysis);
            let analysis = call_analysis(
                &config.fixtures,
                &args.note.lead,
                &args.note.closer,
                args.note.result,
                args.amount,
                &clock,
                &mut rng,
            );
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Command::Branches => {
            if config.fixtures.branches.is_empty() {
                println!("No branches.json in {}", cli.data_dir.display());
            } else {
                print_branches(
                    &BranchesReport::build(&config.fixtures.branches),
                    &Funnel::from_branches(&config.fixtures.branches),
                );
            }
        }
        Command::Export(args) => {
            let (file, format) = build_export(&config, &range, &clock, &bank, args)?;
            std::fs::create_dir_all(&args.out)
                .with_context(|| format!("creating {}", args.out.display()))?;
            let path = file.table.save(&args.out, &file.filename, format)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn resolve_range(cli: &Cli, clock: &ReportClock) -> Result<DateRange> {
    let selection = match (cli.start, cli.end) {
        (Some(start), Some(end)) => RangeSelection::Explicit(DateRange::days(start, end)?),
        (None, None) => RangeSelection::Preset(cli.range),
        _ => bail!("--start and --end must be given together"),
    };
    Ok(selection.resolve(clock))
}

fn build_export(
    config: &TrackerConfig,
    range: &DateRange,
    clock: &ReportClock,
    bank: &RngBank,
    args: &ExportArgs,
) -> Result<(ExportFile, ExportFormat)> {
    let format = ExportFormat::from(args.format);
    let file = match args.kind {
        ExportKind::Closers => closers_export(&config.fixtures.closers, range, clock, format),
        ExportKind::Methods => methods_export(&config.fixtures.methods, clock, format),
        ExportKind::Calls => {
            let Some(closer) = args.closer.as_deref() else {
                bail!("--closer is required for --kind calls");
            };
            let mut drilldown = CloserDrilldown::new(*range);
            let mut call_rng = bank.for_generator(GeneratorSlot::Calls);
            drilldown.toggle(&config.fixtures.closers, closer, &mut call_rng)?;
            drilldown.set_search(closer, args.search.as_str());
            let calls = match drilldown.view(closer) {
                DrilldownView::Calls(calls) => calls,
                _ => Vec::new(),
            };
            let mut analysis_rng = bank.for_generator(GeneratorSlot::CallAnalysis);
            closer_calls_export(
                &config.fixtures,
                closer,
                &calls,
                range,
                clock,
                format,
                &mut analysis_rng,
            )
        }
        ExportKind::LeadNote => {
            let (closer, lead) = note_target(config, args)?;
            let note = lead_note(&config.fixtures, lead, closer, args.result, clock);
            return Ok((lead_note_export(&note, clock), ExportFormat::Csv));
        }
        ExportKind::Analysis => {
            let (closer, lead) = note_target(config, args)?;
            let note = call_analysis(
                &config.fixtures,
                lead,
                closer,
                args.result,
                args.amount,
                clock,
                &mut bank.for_generator(GeneratorSlot::CallAnalysis),
            );
            return Ok((call_analysis_export(&note, clock), ExportFormat::Csv));
        }
    };
    Ok((file, format))
}

/// The (closer, lead) pair a per-lead export needs; the closer must exist.
fn note_target<'a>(config: &TrackerConfig, args: &'a ExportArgs) -> Result<(&'a str, &'a str)> {
    let (Some(closer), Some(lead)) = (args.closer.as_deref(), args.lead.as_deref()) else {
        bail!("--closer and --lead are required for --kind lead-note and analysis");
    };
    config.fixtures.closer(closer)?;
    Ok((closer, lead))
}

// ── Text output ──────────────────────────────────────────────────────────────

fn print_cards(title: &str, cards: &[KpiCard]) {
    println!("=== {title} ===");
    for card in cards {
        let mut line = format!("  {:<24} {:>16}", card.title, card.value);
        if let Some(variation) = &card.variation {
            line.push_str(&format!("  {variation:>7}"));
        }
        if let Some(badge) = card.badge {
            line.push_str(&format!("  [{}]", badge.label()));
        }
        println!("{line}");
    }
    println!();
}

fn print_summary(report: &DashboardReport) {
    println!("Dashboard Tracker");
    println!("  range: {}", report.range_label);
    println!("  seed:  {}", report.seed);
    println!();
    print_cards("TOTAL (Adquisición)", &report.acquisition_cards);
    print_cards("Resultados", &report.outcome_cards);

    println!("=== MÉTODOS ===");
    for m in &report.methods {
        println!(
            "  {:<14} spend {:>14}  cash {:>14}  ventas {:>4}  ROAS {:>6}  {}",
            m.method,
            money0(m.spend),
            money0(m.cash),
            m.sales,
            m.roas_display,
            m.extra.as_deref().unwrap_or("")
        );
    }
    println!();

    println!("=== META ADS ===");
    for ad in &report.meta_ads {
        println!(
            "  {} {:<20} ventas {:>4}  ROAS {:.1}x ({:?})",
            ad.ad_id, ad.ad_name, ad.sales, ad.roas, ad.tier
        );
        if ad.expanded {
            for row in &ad.campaigns {
                println!(
                    "      {} spend {:>12}  ventas {:>3}  CPA-Q {:>12}  CAC {:>12}",
                    row.campaign.name.label(),
                    money0(row.campaign.spend),
                    row.campaign.sales,
                    money0(row.metrics.cpa_q),
                    money0(row.metrics.cac)
                );
            }
        }
    }
    println!();

    print_cards("VENTAS (Tracker de Closers)", &report.sales_cards);
    print_closers(report);

    if !report.warnings.is_empty() {
        println!();
        println!("=== WARNINGS ===");
        for warning in &report.warnings {
            println!("  {warning}");
        }
    }
}

fn print_closers(report: &DashboardReport) {
    println!(
        "  {:<18} {:>6} {:>8} {:>6} {:>7} {:>6} {:>14} {:>8} {:>8}",
        "Closer", "Leads", "Agendas", "Shows", "Ofertas", "Ventas", "Cash", "% Cierre", "% Show"
    );
    for c in &report.closers {
        println!(
            "  {:<18} {:>6} {:>8} {:>6} {:>7} {:>6} {:>14} {:>8} {:>8}",
            c.closer,
            c.leads,
            c.agendas,
            c.shows,
            c.offers,
            c.sales,
            c.cash_display,
            c.close_rate_display,
            c.show_rate_display
        );
    }
}

fn print_calls(
    config: &TrackerConfig,
    range: &DateRange,
    bank: &RngBank,
    args: &CallsArgs,
) -> Result<()> {
    if args.logged {
        config.fixtures.closer(&args.closer)?;
        let calls = calls_for_closer(&config.fixtures.calls, &args.closer, range);
        println!("{} logged calls for {} in {}", calls.len(), args.closer, range.label());
        for call in calls {
            println!(
                "  {} {} {:<20} {:<18} {:>5}  {} / {}",
                call.ts.format("%d/%m/%Y"),
                time_of_day(call.ts),
                call.lead,
                mask_phone(&call.phone),
                duration(call.duration_sec),
                call.outcome.label(),
                call.result.label()
            );
        }
        return Ok(());
    }

    let mut drilldown = CloserDrilldown::new(*range);
    let mut rng = bank.for_generator(GeneratorSlot::Calls);
    drilldown.toggle(&config.fixtures.closers, &args.closer, &mut rng)?;
    drilldown.set_search(&args.closer, args.search.as_str());

    let metrics = drilldown.metrics(&args.closer);
    println!(
        "Agendas del período · {} | Shows: {} ({:.1}%) | Ventas: {} | Cash: {}",
        metrics.total_agendas,
        metrics.shows,
        metrics.show_rate,
        metrics.sales,
        money0(metrics.cash)
    );

    match drilldown.view(&args.closer) {
        DrilldownView::Calls(calls) => {
            for call in calls {
                println!(
                    "  {:<4} {} {:<10} {:<12} {:>5}  {:<8} {:<15} {:>12}  {}",
                    call.id,
                    time_of_day(call.ts),
                    call.lead,
                    call.phone,
                    duration(call.duration_sec),
                    call.outcome.label(),
                    call.result.label(),
                    money0(call.amount.unwrap_or(0.0)),
                    call.notes.as_deref().unwrap_or("")
                );
            }
        }
        DrilldownView::NoMatches { query } => {
            println!("  No se encontraron leads para \"{query}\"");
        }
        DrilldownView::Closed => {}
    }
    Ok(())
}

fn print_branches(report: &BranchesReport, funnel: &Funnel) {
    let o = &report.overview;
    println!("=== SUCURSALES ===");
    println!("  Inversión Total:        {}", money0(o.total_investment));
    println!("  Leads Total:            {}", o.total_leads);
    println!("  Citas Total:            {}", o.total_appointments);
    println!("  Ventas Total:           {}", o.total_clients);
    println!("  Vendedores:             {}", o.total_sellers);
    println!("  Conversión Total:       {:.1}%", o.total_conversion_pct);
    println!("  Costo Promedio por Lead {}", money0(o.cost_per_lead));
    println!("  Costo por Venta         {}", money0(o.cost_per_sale));
    println!();

    for card in &report.cards {
        println!(
            "  {:<12} inversión {:>12} ({:.1}%)  leads {:>5} ({:.1}%)  conversión {:.1}%  CPL {}  mejor: {}",
            card.name,
            money0(card.ad_investment),
            card.investment_share_pct,
            card.leads,
            card.leads_share_pct,
            card.total_conversion_pct,
            money0(card.cost_per_lead),
            card.best_seller.as_deref().unwrap_or("—")
        );
    }
    println!();

    println!("=== RANKING ===");
    for rank in &report.ranking {
        println!(
            "  #{} {:<12} clientes {:>4}  conversión {:.1}%",
            rank.position, rank.name, rank.clients, rank.conversion_pct
        );
    }
    println!();

    println!("=== EMBUDO ===");
    for stage in &funnel.stages {
        println!(
            "  {:<18} {:>6}  {:>6.1}%  {}",
            stage.stage,
            stage.count,
            stage.step_pct,
            bar(stage.width_pct)
        );
    }
    for loss in &funnel.losses {
        println!(
            "  {}: {} ({})",
            loss.label,
            loss.lost,
            pct(loss.lost_pct / 100.0)
        );
    }
}

fn bar(width_pct: f64) -> String {
    "#".repeat((width_pct / 2.5).round().clamp(0.0, 40.0) as usize)
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_result(raw: &str) -> Result<CallResult, String> {
    CallResult::from_label(raw).ok_or_else(|| format!("unknown call result '{raw}'"))
}
