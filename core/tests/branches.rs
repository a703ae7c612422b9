use approx::assert_relative_eq;
use std::path::PathBuf;
use tracker_core::{branches::BranchesReport, config::TrackerConfig, funnel::Funnel};

fn config() -> TrackerConfig {
    TrackerConfig::load(PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../data"))).unwrap()
}

#[test]
fn overview_totals_span_every_branch() {
    let report = BranchesReport::build(&config().fixtures.branches);
    let o = &report.overview;
    assert_eq!(o.total_investment, 26_000.0);
    assert_eq!(o.total_leads, 1300);
    assert_eq!(o.total_appointments, 254);
    assert_eq!(o.total_clients, 64);
    assert_eq!(o.total_sellers, 7);
    assert_relative_eq!(o.cost_per_lead, 20.0, epsilon = 1e-9);
    assert_relative_eq!(o.cost_per_sale, 406.25, epsilon = 1e-9);
    assert_relative_eq!(o.total_conversion_pct, 64.0 / 1300.0 * 100.0, epsilon = 1e-9);
}

#[test]
fn cards_carry_shares_and_best_seller() {
    let report = BranchesReport::build(&config().fixtures.branches);
    let miami = &report.cards[0];
    assert_eq!(miami.name, "Miami");
    assert_relative_eq!(miami.investment_share_pct, 12_000.0 / 26_000.0 * 100.0, epsilon = 1e-9);
    assert_relative_eq!(miami.qualification_pct, 50.0, epsilon = 1e-9);
    assert_relative_eq!(miami.appointment_pct, 40.0, epsilon = 1e-9);
    assert_relative_eq!(miami.sale_pct, 31.0 / 124.0 * 100.0, epsilon = 1e-9);
    assert_eq!(miami.best_seller.as_deref(), Some("Carla Ruiz"));

    let shares: f64 = report.cards.iter().map(|c| c.leads_share_pct).sum();
    assert_relative_eq!(shares, 100.0, epsilon = 1e-9);
}

#[test]
fn ranking_orders_by_clients() {
    let report = BranchesReport::build(&config().fixtures.branches);
    let ranking: Vec<(usize, &str)> = report
        .ranking
        .iter()
        .map(|r| (r.position, r.name.as_str()))
        .collect();
    assert_eq!(ranking, vec![(1, "Miami"), (2, "Orlando"), (3, "Tampa")]);
}

#[test]
fn funnel_reports_stage_losses() {
    let funnel = Funnel::from_branches(&config().fixtures.branches);
    let counts: Vec<u64> = funnel.stages.iter().map(|s| s.count).collect();
    assert_eq!(counts, vec![1300, 610, 254, 64]);
    let lost: Vec<u64> = funnel.losses.iter().map(|l| l.lost).collect();
    assert_eq!(lost, vec![690, 356, 190]);
    assert_relative_eq!(funnel.stages[0].width_pct, 100.0, epsilon = 1e-9);
    assert_relative_eq!(funnel.stages[1].step_pct, 610.0 / 1300.0 * 100.0, epsilon = 1e-9);
    assert_relative_eq!(
        funnel.losses[2].lost_pct,
        100.0 - 64.0 / 254.0 * 100.0,
        epsilon = 1e-9
    );
}
