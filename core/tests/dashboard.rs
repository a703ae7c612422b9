use chrono::NaiveDate;
use std::path::PathBuf;
use tracker_core::{
    clock::ReportClock,
    config::TrackerConfig,
    dashboard::DashboardReport,
    date_range::DateFilter,
    format::Badge,
    rng::RngBank,
    view_state::AdExpansion,
};

fn config() -> TrackerConfig {
    TrackerConfig::load(PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../data"))).unwrap()
}

fn clock() -> ReportClock {
    ReportClock::fixed(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
}

fn build(config: &TrackerConfig) -> DashboardReport {
    let clock = clock();
    let range = DateFilter::Last30Days.range(&clock);
    DashboardReport::build(config, &range, &clock, &RngBank::new(42))
}

#[test]
fn acquisition_cards_from_bundled_fixtures() {
    let report = build(&config());
    let values: Vec<&str> = report
        .acquisition_cards
        .iter()
        .map(|c| c.value.as_str())
        .collect();
    assert_eq!(
        values,
        vec![
            "13.800\u{a0}US$",
            "261",
            "52,87\u{a0}US$",
            "86,25\u{a0}US$",
            "337\u{a0}US$"
        ]
    );
    assert!(report
        .acquisition_cards
        .iter()
        .skip(2)
        .all(|c| c.badge == Some(Badge::Good)));
    assert!(report.acquisition_cards.iter().all(|c| c.variation.is_some()));
}

#[test]
fn outcome_cards_fall_back_to_cash_for_billing() {
    let report = build(&config());
    assert_eq!(report.outcome_cards[0].value, "51");
    assert_eq!(report.outcome_cards[1].value, "59.700\u{a0}US$");
    assert_eq!(report.outcome_cards[2].value, "59.700\u{a0}US$");
    assert_eq!(report.outcome_cards[3].value, "3.5x");
    assert!(!report.channel_totals.billing_reported);
    assert_eq!(
        report.warnings,
        vec!["No method reports billing; Facturación shows cash collected".to_string()]
    );
}

#[test]
fn sales_section_sorts_closers_and_rates_over_agendas() {
    let report = build(&config());
    let names: Vec<&str> = report.closers.iter().map(|c| c.closer.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Ana Torres",
            "Luis Pérez",
            "Sofía Díaz",
            "Jorge Ramírez",
            "Valentina Gómez",
            "Andrés Castro"
        ]
    );
    assert_eq!(report.sales_cards[0].value, "47");
    assert_eq!(report.sales_cards[1].value, "55.000\u{a0}US$");
    assert_eq!(report.sales_cards[3].value, "20.8%");
    assert_eq!(report.sales_cards[4].value, "64.2%");
    assert_eq!(report.closers[5].close_rate_display, "0.0%");
}

#[test]
fn meta_ads_keep_fixture_campaigns_and_generate_the_rest() {
    let config = config();
    let report = build(&config);
    let ids: Vec<&str> = report.meta_ads.iter().map(|a| a.ad_id.as_str()).collect();
    assert_eq!(ids, vec!["FB-01", "FB-02", "FB-03"]);
    assert_eq!(report.meta_ads[0].campaigns.len(), 3);
    assert_eq!(report.meta_ads[0].campaigns[0].campaign.cac, Some(211.0));
    for ad in &report.meta_ads[1..] {
        assert!((2..=4).contains(&ad.campaigns.len()));
    }

    let mut expansion = AdExpansion::new(&config.fixtures.ads);
    expansion.toggle("FB-02");
    let clock = clock();
    let range = DateFilter::Last30Days.range(&clock);
    let collapsed =
        DashboardReport::build_with_expansion(&config, &range, &clock, &RngBank::new(42), &expansion);
    assert!(collapsed.meta_ads[0].expanded);
    assert!(!collapsed.meta_ads[1].expanded);
}

#[test]
fn methods_chart_series_cover_paid_channels_only() {
    let report = build(&config());
    let names: Vec<&str> = report.roas_series.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Meta Ads", "Google Ads", "TikTok Ads"]);
    assert_eq!(report.cash_vs_spend.len(), 3);
    assert_eq!(report.methods[3].extra.as_deref(), Some("1240 Mensajes"));
    assert_eq!(report.methods[4].extra.as_deref(), Some("36 Videos"));
}

#[test]
fn branches_and_funnel_are_attached_when_present() {
    let report = build(&config());
    let branches = report.branches.as_ref().unwrap();
    assert_eq!(branches.cards.len(), 3);
    let funnel = report.funnel.as_ref().unwrap();
    assert_eq!(funnel.stages[3].count, 64);
}
