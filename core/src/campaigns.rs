//! Sub-campaign breakdown for ads.
//!
//! Ads whose fixture carries no campaign list get a synthetic split into
//! two to four campaigns (H1..H4). Totals are shared out by random
//! weights with per-campaign jitter, so the parts only approximate the ad.

use crate::{
    model::{AdRecord, CampaignName, SubCampaign},
    rng::RandomSource,
    types::Count,
};

const MIN_CAMPAIGNS: u64 = 2;
const MAX_CAMPAIGNS: u64 = 4;

/// Campaigns for an ad: the fixture's own list when non-empty, else generated.
pub fn ad_campaigns<R: RandomSource>(ad: &AdRecord, rng: &mut R) -> Vec<SubCampaign> {
    match &ad.campaigns {
        Some(campaigns) if !campaigns.is_empty() => campaigns.clone(),
        _ => generate_campaigns(ad, rng),
    }
}

/// Split an ad into 2..=4 synthetic sub-campaigns, sorted by sales descending.
pub fn generate_campaigns<R: RandomSource>(ad: &AdRecord, rng: &mut R) -> Vec<SubCampaign> {
    let n = rng.next_in_range(MIN_CAMPAIGNS, MAX_CAMPAIGNS) as usize;
    let weights: Vec<f64> = (0..n).map(|_| rng.next_f64()).collect();
    let weight_sum: f64 = weights.iter().sum();

    let mut campaigns: Vec<SubCampaign> = CampaignName::ALL
        .iter()
        .zip(weights.iter())
        .map(|(&name, &raw_weight)| {
            let weight = if weight_sum > 0.0 {
                raw_weight / weight_sum
            } else {
                1.0 / n as f64
            };
            let spend_variation = 0.8 + rng.next_f64() * 0.4;
            let performance_variation = 0.85 + rng.next_f64() * 0.3;
            let share = |total: Count| (total as f64 * weight * performance_variation).round() as Count;

            let spend = (ad.spend * weight * spend_variation).round();
            let agendas_q = share(ad.agendas_q);
            let shows_q = share(ad.shows_q);
            let sales = share(ad.sales);
            let cash = (ad.cash * weight * (0.9 + rng.next_f64() * 0.2)).round();
            let roas = if spend > 0.0 {
                (cash / spend * 10.0).round() / 10.0
            } else {
                0.0
            };

            SubCampaign {
                name,
                spend,
                agendas_q,
                shows_q,
                sales,
                cash,
                cpaq: None,
                cpsq: None,
                cac: None,
                roas,
            }
        })
        .collect();

    campaigns.sort_by(|a, b| b.sales.cmp(&a.sales));
    log::debug!(
        "campaigns: generated {} sub-campaigns for ad {}",
        campaigns.len(),
        ad.ad_id
    );
    campaigns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    fn ad() -> AdRecord {
        AdRecord {
            ad_id: "FB-01".into(),
            ad_name: "Webinar".into(),
            medium: "Meta Ads".into(),
            spend: 1000.0,
            agendas: 60,
            agendas_q: 40,
            shows_q: 30,
            sales: 10,
            cash: 5000.0,
            campaigns: None,
        }
    }

    #[test]
    fn constant_draws_split_evenly() {
        // n = 2 + floor(0.5 * 3) = 3; equal weights; variations 1.0.
        let campaigns = generate_campaigns(&ad(), &mut ScriptedRng::constant(0.5));
        assert_eq!(campaigns.len(), 3);
        for c in &campaigns {
            assert_eq!(c.spend, 333.0);
            assert_eq!(c.cash, 1667.0);
            assert_eq!(c.agendas_q, 13);
            assert_eq!(c.roas, 5.0);
        }
        let names: Vec<CampaignName> = campaigns.iter().map(|c| c.name).collect();
        assert_eq!(names, vec![CampaignName::H1, CampaignName::H2, CampaignName::H3]);
    }

    #[test]
    fn zero_spend_ad_gets_zero_roas() {
        let mut free = ad();
        free.spend = 0.0;
        let campaigns = generate_campaigns(&free, &mut ScriptedRng::constant(0.1));
        assert_eq!(campaigns.len(), 2);
        assert!(campaigns.iter().all(|c| c.roas == 0.0));
    }

    #[test]
    fn fixture_campaigns_win() {
        let mut with_campaigns = ad();
        let fixed = SubCampaign {
            name: CampaignName::H4,
            spend: 10.0,
            agendas_q: 1,
            shows_q: 1,
            sales: 1,
            cash: 50.0,
            cpaq: Some(10.0),
            cpsq: None,
            cac: None,
            roas: 5.0,
        };
        with_campaigns.campaigns = Some(vec![fixed.clone()]);
        let mut rng = ScriptedRng::constant(0.5);
        assert_eq!(ad_campaigns(&with_campaigns, &mut rng), vec![fixed]);
        assert_eq!(rng.draws(), 0);
    }
}
