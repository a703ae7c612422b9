//! Dashboard report: every card, row and chart series the tracker shows.
//!
//! The report is a pure function of the fixtures, the selected range,
//! the clock and the RngBank. Rendering is left to the caller; values
//! arrive pre-formatted alongside the raw numbers they came from.
//!
//! RULE: Only the KPI variations and synthetic sub-campaigns draw
//! randomness here, each from its own generator slot.

use crate::{
    branches::BranchesReport,
    campaigns::ad_campaigns,
    clock::ReportClock,
    config::{BadgeThresholds, Thresholds, TrackerConfig},
    date_range::DateRange,
    format::{
        badge, count, money0, money2, multiple, pct, random_variation, roas_band, roas_tier, Badge,
        RoasTier,
    },
    funnel::{funnel_violations, Funnel},
    metrics::{
        closer_close_rate, closer_show_rate, method_roas, safe_div, AcquisitionTotals,
        CampaignMetrics, ChannelTotals, SalesTotals,
    },
    model::{AdRecord, ChannelSummary, CloserRecord, SubCampaign, ORGANIC, PROSPECTING},
    rng::{GeneratorSlot, RngBank},
    types::{Count, Money},
    view_state::AdExpansion,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

const NO_VALUE: &str = "—";
const VARIATION_COUNT: usize = 9;

// ── Report types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct KpiCard {
    pub title: String,
    pub value: String,
    pub raw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
}

impl KpiCard {
    fn new(title: &str, value: String, raw: Option<f64>) -> Self {
        Self {
            title: title.to_string(),
            value,
            raw,
            variation: None,
            badge: None,
        }
    }

    fn with_variation(mut self, variation: Option<&String>) -> Self {
        self.variation = variation.cloned();
        self
    }

    fn with_badge(mut self, value: f64, thresholds: Option<BadgeThresholds>) -> Self {
        self.badge = thresholds.map(|t| badge(value, t));
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MethodRow {
    pub method: String,
    pub spend: Money,
    pub agendas_q: Count,
    pub shows_q: Count,
    pub sales: Count,
    pub cash: Money,
    pub roas: Option<f64>,
    pub roas_display: String,
    pub roas_band: Option<Badge>,
    /// `340 Mensajes` for prospecting, `12 Videos` for organic.
    pub extra: Option<String>,
}

impl MethodRow {
    fn build(method: &ChannelSummary, thresholds: &Thresholds) -> Self {
        let roas = method_roas(method);
        Self {
            method: method.method.clone(),
            spend: method.spend,
            agendas_q: method.agendas_q,
            shows_q: method.shows_q,
            sales: method.sales,
            cash: method.cash,
            roas,
            roas_display: roas.map(multiple).unwrap_or_else(|| NO_VALUE.to_string()),
            roas_band: roas.map(|r| roas_band(r, thresholds.roas)),
            extra: method_extra(method),
        }
    }
}

fn method_extra(method: &ChannelSummary) -> Option<String> {
    match method.method.as_str() {
        PROSPECTING => method
            .messages
            .filter(|&n| n > 0)
            .map(|n| format!("{n} Mensajes")),
        ORGANIC => method
            .videos
            .filter(|&n| n > 0)
            .map(|n| format!("{n} Videos")),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CashVsSpendPoint {
    pub name: String,
    pub spend: Money,
    pub cash: Money,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoasPoint {
    pub name: String,
    pub roas: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CampaignRow {
    #[serde(flatten)]
    pub campaign: SubCampaign,
    pub metrics: CampaignMetrics,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdRow {
    pub ad_id: String,
    pub ad_name: String,
    pub spend: Money,
    pub agendas_q: Count,
    pub shows_q: Count,
    pub sales: Count,
    pub cash: Money,
    pub roas: f64,
    pub tier: RoasTier,
    pub expanded: bool,
    pub campaigns: Vec<CampaignRow>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CloserRow {
    pub closer: String,
    pub leads: Count,
    pub agendas: Count,
    pub shows: Count,
    pub offers: Count,
    pub sales: Count,
    pub cash: Money,
    pub cash_display: String,
    pub close_rate: f64,
    pub close_rate_display: String,
    pub show_rate: f64,
    pub show_rate_display: String,
    pub notes: String,
}

impl CloserRow {
    fn build(closer: &CloserRecord) -> Self {
        let close_rate = closer_close_rate(closer);
        let show_rate = closer_show_rate(closer);
        Self {
            closer: closer.closer.clone(),
            leads: closer.leads,
            agendas: closer.agendas,
            shows: closer.shows,
            offers: closer.offers,
            sales: closer.sales,
            cash: closer.cash,
            cash_display: money0(closer.cash),
            close_rate,
            close_rate_display: pct(close_rate),
            show_rate,
            show_rate_display: pct(show_rate),
            notes: closer.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub range: DateRange,
    pub range_label: String,
    pub acquisition_totals: AcquisitionTotals,
    pub channel_totals: ChannelTotals,
    pub sales_totals: SalesTotals,
    /// Inversión, Agendas, CPA-Q, CPS-Q, CAC.
    pub acquisition_cards: Vec<KpiCard>,
    /// Ventas, Cash Collected, Facturación, ROAS General.
    pub outcome_cards: Vec<KpiCard>,
    pub methods: Vec<MethodRow>,
    pub cash_vs_spend: Vec<CashVsSpendPoint>,
    pub roas_series: Vec<RoasPoint>,
    pub meta_ads: Vec<AdRow>,
    pub sales_cards: Vec<KpiCard>,
    pub closers: Vec<CloserRow>,
    pub branches: Option<BranchesReport>,
    pub funnel: Option<Funnel>,
    pub warnings: Vec<String>,
}

// ── Assembly ─────────────────────────────────────────────────────────────────

impl DashboardReport {
    /// Build with the initial view: every Meta ad expanded.
    pub fn build(
        config: &TrackerConfig,
        range: &DateRange,
        clock: &ReportClock,
        bank: &RngBank,
    ) -> Self {
        let expansion = AdExpansion::new(&config.fixtures.ads);
        Self::build_with_expansion(config, range, clock, bank, &expansion)
    }

    pub fn build_with_expansion(
        config: &TrackerConfig,
        range: &DateRange,
        clock: &ReportClock,
        bank: &RngBank,
        expansion: &AdExpansion,
    ) -> Self {
        let fixtures = &config.fixtures;
        let thresholds = &config.thresholds;

        let acquisition = AcquisitionTotals::from_ads(&fixtures.ads);
        let channel = ChannelTotals::from_methods(&fixtures.methods);
        let sales = SalesTotals::from_closers(&fixtures.closers);

        let mut variation_rng = bank.for_generator(GeneratorSlot::Variations);
        let variations: Vec<String> = (0..VARIATION_COUNT)
            .map(|_| random_variation(&mut variation_rng))
            .collect();
        let variation = |i: usize| variations.get(i);

        let acquisition_cards = vec![
            KpiCard::new(
                "Inversión total en Ads",
                money0(acquisition.spend),
                Some(acquisition.spend),
            )
            .with_variation(variation(0)),
            KpiCard::new(
                "Agendas conseguidas",
                acquisition.agendas_q.to_string(),
                Some(acquisition.agendas_q as f64),
            )
            .with_variation(variation(1)),
            KpiCard::new("CPA-Q", money2(acquisition.cpa_q()), Some(acquisition.cpa_q()))
                .with_variation(variation(2))
                .with_badge(acquisition.cpa_q(), thresholds.cpa_q),
            KpiCard::new("CPS-Q", money2(acquisition.cps_q()), Some(acquisition.cps_q()))
                .with_variation(variation(3))
                .with_badge(acquisition.cps_q(), thresholds.cps_q),
            KpiCard::new("CAC", money0(acquisition.cac()), Some(acquisition.cac()))
                .with_variation(variation(7))
                .with_badge(acquisition.cac(), thresholds.cac),
        ];

        let roas_general = acquisition.roas();
        let outcome_cards = vec![
            KpiCard::new(
                "Ventas realizadas",
                count(channel.sales),
                Some(channel.sales as f64),
            )
            .with_variation(variation(4)),
            KpiCard::new("Cash Collected", money0(channel.cash), Some(channel.cash))
                .with_variation(variation(5)),
            KpiCard::new("Facturación", money0(channel.billing), Some(channel.billing))
                .with_variation(variation(6)),
            KpiCard::new(
                "ROAS General",
                roas_general
                    .map(multiple)
                    .unwrap_or_else(|| NO_VALUE.to_string()),
                roas_general,
            )
            .with_variation(variation(8)),
        ];

        let methods: Vec<MethodRow> = fixtures
            .methods
            .iter()
            .map(|m| MethodRow::build(m, thresholds))
            .collect();
        let paid: Vec<&ChannelSummary> = fixtures.methods.iter().filter(|m| m.is_paid()).collect();
        let cash_vs_spend = paid
            .iter()
            .map(|m| CashVsSpendPoint {
                name: m.method.clone(),
                spend: m.spend,
                cash: m.cash,
            })
            .collect();
        let roas_series = paid
            .iter()
            .map(|m| RoasPoint {
                name: m.method.clone(),
                roas: safe_div(m.cash, m.spend),
            })
            .collect();

        let mut campaign_rng = bank.for_generator(GeneratorSlot::Campaigns);
        let mut meta: Vec<&AdRecord> = fixtures.ads.iter().filter(|ad| ad.is_meta()).collect();
        meta.sort_by(|a, b| b.sales.cmp(&a.sales));
        let meta_ads = meta
            .into_iter()
            .map(|ad| {
                let roas = safe_div(ad.cash, ad.spend);
                AdRow {
                    ad_id: ad.ad_id.clone(),
                    ad_name: ad.ad_name.clone(),
                    spend: ad.spend,
                    agendas_q: ad.agendas_q,
                    shows_q: ad.shows_q,
                    sales: ad.sales,
                    cash: ad.cash,
                    roas,
                    tier: roas_tier(roas, thresholds.ad_roas_tiers),
                    expanded: expansion.is_expanded(&ad.ad_id),
                    campaigns: ad_campaigns(ad, &mut campaign_rng)
                        .into_iter()
                        .map(|campaign| CampaignRow {
                            metrics: CampaignMetrics::for_campaign(&campaign),
                            campaign,
                        })
                        .collect(),
                }
            })
            .collect();

        let sales_cards = vec![
            KpiCard::new("Cierres", sales.sales.to_string(), Some(sales.sales as f64)),
            KpiCard::new("Cash Collected", money0(sales.cash), Some(sales.cash)),
            KpiCard::new("Facturación", money0(sales.cash), Some(sales.cash)),
            KpiCard::new("% Cierre", pct(sales.close_rate()), Some(sales.close_rate())),
            KpiCard::new("% Show", pct(sales.show_rate()), Some(sales.show_rate())),
        ];

        let mut sorted_closers: Vec<&CloserRecord> = fixtures.closers.iter().collect();
        sorted_closers.sort_by(|a, b| b.sales.cmp(&a.sales));
        let closers = sorted_closers.into_iter().map(CloserRow::build).collect();

        let (branches, funnel) = if fixtures.branches.is_empty() {
            (None, None)
        } else {
            (
                Some(BranchesReport::build(&fixtures.branches)),
                Some(Funnel::from_branches(&fixtures.branches)),
            )
        };

        let mut warnings: Vec<String> = funnel_violations(&fixtures.closers)
            .iter()
            .map(|v| v.message())
            .collect();
        if !channel.billing_reported {
            warnings.push("No method reports billing; Facturación shows cash collected".to_string());
        }

        log::info!(
            "dashboard: built report for {} ({} methods, {} closers, {} warnings)",
            range.label(),
            fixtures.methods.len(),
            fixtures.closers.len(),
            warnings.len()
        );

        Self {
            generated_at: clock.now,
            seed: bank.master_seed(),
            range: *range,
            range_label: range.label(),
            acquisition_totals: acquisition,
            channel_totals: channel,
            sales_totals: sales,
            acquisition_cards,
            outcome_cards,
            methods,
            cash_vs_spend,
            roas_series,
            meta_ads,
            sales_cards,
            closers,
            branches,
            funnel,
            warnings,
        }
    }

    pub fn to_json(&self) -> crate::error::TrackerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::DateFilter;
    use chrono::NaiveDate;

    fn report() -> DashboardReport {
        let config = TrackerConfig::default_test();
        let clock = ReportClock::fixed(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        let range = DateFilter::Last30Days.range(&clock);
        DashboardReport::build(&config, &range, &clock, &RngBank::new(42))
    }

    #[test]
    fn acquisition_cards_follow_paid_ads() {
        let report = report();
        let titles: Vec<&str> = report
            .acquisition_cards
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec!["Inversión total en Ads", "Agendas conseguidas", "CPA-Q", "CPS-Q", "CAC"]
        );
        // TikTok has no spend, so its sale is excluded: 3000 / 12.
        assert_eq!(report.acquisition_cards[4].value, "250\u{a0}US$");
        assert_eq!(report.acquisition_cards[4].badge, Some(Badge::Good));
        assert_eq!(report.acquisition_cards[2].badge, None);
    }

    #[test]
    fn method_rows_carry_extras_and_bands() {
        let report = report();
        assert_eq!(report.methods[0].roas_display, "3.4x");
        assert_eq!(report.methods[0].roas_band, Some(Badge::Good));
        assert_eq!(report.methods[2].roas_display, "—");
        assert_eq!(report.methods[2].extra.as_deref(), Some("340 Mensajes"));
        assert_eq!(report.methods[3].extra.as_deref(), Some("12 Videos"));
        assert_eq!(report.cash_vs_spend.len(), 2);
        assert_eq!(report.roas_series.len(), 2);
    }

    #[test]
    fn meta_ads_are_sorted_and_expanded() {
        let report = report();
        let ids: Vec<&str> = report.meta_ads.iter().map(|a| a.ad_id.as_str()).collect();
        assert_eq!(ids, vec!["FB-01", "FB-02"]);
        assert!(report.meta_ads.iter().all(|a| a.expanded));
        assert_eq!(report.meta_ads[0].campaigns.len(), 2);
        assert_eq!(report.meta_ads[0].campaigns[1].metrics.cac, 240.0);
        assert!((2..=4).contains(&report.meta_ads[1].campaigns.len()));
    }

    #[test]
    fn closers_are_sorted_by_sales_and_billing_falls_back() {
        let report = report();
        assert_eq!(report.closers[0].closer, "Luis Pérez");
        assert_eq!(report.sales_cards[3].value, "36.4%");
        assert_eq!(report.outcome_cards[2].value, report.outcome_cards[1].value);
        assert!(report.warnings.iter().any(|w| w.contains("billing")));
    }

    #[test]
    fn agenda_and_close_counts_render_without_grouping() {
        let mut config = TrackerConfig::default_test();
        config.fixtures.ads[0].agendas_q = 12_345;
        config.fixtures.closers[0].sales = 20_000;
        let clock = ReportClock::fixed(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        let range = DateFilter::Last30Days.range(&clock);
        let report = DashboardReport::build(&config, &range, &clock, &RngBank::new(42));
        // 12_345 + 20 + 10 from the other paid ads.
        assert_eq!(report.acquisition_cards[1].value, "12375");
        assert_eq!(report.sales_cards[0].value, "20005");
    }
}
