//! Aggregation layer: sums and guarded ratios over fixture records.
//!
//! Every derived metric is `sum` and `safe_div` composed over a
//! filtered subset. There are no error conditions: a ratio with a
//! zero (or negative) denominator is 0, never NaN or infinity.

use crate::{
    model::{AdRecord, ChannelSummary, CloserRecord, SubCampaign},
    types::{Count, Money},
};
use serde::{Deserialize, Serialize};

/// Total of a sequence of values. 0 for an empty sequence.
pub fn sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

/// `numerator / denominator` when the denominator is positive, else 0.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// `safe_div` over two funnel counters.
pub fn count_ratio(numerator: Count, denominator: Count) -> f64 {
    safe_div(numerator as f64, denominator as f64)
}

// ── Acquisition (paid ads) ───────────────────────────────────────────────────

/// Totals over ads with positive spend only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct AcquisitionTotals {
    pub spend: Money,
    pub agendas_q: Count,
    pub shows_q: Count,
    pub sales: Count,
    pub cash: Money,
}

impl AcquisitionTotals {
    pub fn from_ads(ads: &[AdRecord]) -> Self {
        let paid: Vec<&AdRecord> = ads.iter().filter(|ad| ad.spend > 0.0).collect();
        Self {
            spend: sum(paid.iter().map(|ad| ad.spend)),
            agendas_q: paid.iter().map(|ad| ad.agendas_q).sum(),
            shows_q: paid.iter().map(|ad| ad.shows_q).sum(),
            sales: paid.iter().map(|ad| ad.sales).sum(),
            cash: sum(paid.iter().map(|ad| ad.cash)),
        }
    }

    /// Cost per qualified agenda.
    pub fn cpa_q(&self) -> f64 {
        safe_div(self.spend, self.agendas_q as f64)
    }

    /// Cost per qualified show.
    pub fn cps_q(&self) -> f64 {
        safe_div(self.spend, self.shows_q as f64)
    }

    /// Customer acquisition cost.
    pub fn cac(&self) -> f64 {
        safe_div(self.spend, self.sales as f64)
    }

    /// Return on ad spend; `None` when nothing was spent.
    pub fn roas(&self) -> Option<f64> {
        (self.spend > 0.0).then(|| safe_div(self.cash, self.spend))
    }
}

// ── Channels (all acquisition methods) ───────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ChannelTotals {
    pub sales: Count,
    pub cash: Money,
    pub billing: Money,
    /// False when no method reports billing and `billing` fell back to cash.
    pub billing_reported: bool,
}

impl ChannelTotals {
    pub fn from_methods(methods: &[ChannelSummary]) -> Self {
        let cash = sum(methods.iter().map(|m| m.cash));
        let billing_reported = methods.iter().any(|m| m.billing.is_some());
        let billing = if billing_reported {
            sum(methods.iter().map(|m| m.billing.unwrap_or(0.0)))
        } else {
            cash
        };
        Self {
            sales: methods.iter().map(|m| m.sales).sum(),
            cash,
            billing,
            billing_reported,
        }
    }
}

/// ROAS for one method; `None` for unpaid channels.
pub fn method_roas(method: &ChannelSummary) -> Option<f64> {
    method
        .is_paid()
        .then(|| safe_div(method.cash, method.spend))
}

// ── Sales (closers) ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SalesTotals {
    pub sales: Count,
    pub cash: Money,
    pub agendas: Count,
    pub shows: Count,
    pub leads: Count,
}

impl SalesTotals {
    pub fn from_closers(closers: &[CloserRecord]) -> Self {
        Self {
            sales: closers.iter().map(|c| c.sales).sum(),
            cash: sum(closers.iter().map(|c| c.cash)),
            agendas: closers.iter().map(|c| c.agendas).sum(),
            shows: closers.iter().map(|c| c.shows).sum(),
            leads: closers.iter().map(|c| c.leads).sum(),
        }
    }

    /// Share of agendas that closed.
    pub fn close_rate(&self) -> f64 {
        count_ratio(self.sales, self.agendas)
    }

    /// Share of agendas that showed up.
    pub fn show_rate(&self) -> f64 {
        count_ratio(self.shows, self.agendas)
    }
}

pub fn closer_close_rate(closer: &CloserRecord) -> f64 {
    count_ratio(closer.sales, closer.agendas)
}

pub fn closer_show_rate(closer: &CloserRecord) -> f64 {
    count_ratio(closer.shows, closer.agendas)
}

// ── Sub-campaigns ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CampaignMetrics {
    pub cpa_q: f64,
    pub cps_q: f64,
    pub cac: f64,
}

impl CampaignMetrics {
    /// Precomputed fixture values win over derived ones.
    pub fn for_campaign(campaign: &SubCampaign) -> Self {
        Self {
            cpa_q: campaign
                .cpaq
                .unwrap_or_else(|| safe_div(campaign.spend, campaign.agendas_q as f64)),
            cps_q: campaign
                .cpsq
                .unwrap_or_else(|| safe_div(campaign.spend, campaign.shows_q as f64)),
            cac: campaign
                .cac
                .unwrap_or_else(|| safe_div(campaign.spend, campaign.sales as f64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_of_empty_is_zero() {
        assert_eq!(sum(Vec::<f64>::new()), 0.0);
        assert_eq!(sum([1.5, 2.5, 3.0]), 7.0);
    }

    #[test]
    fn safe_div_guards_zero_and_negative_denominators() {
        assert_eq!(safe_div(10.0, 4.0), 2.5);
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(10.0, -2.0), 0.0);
        assert_eq!(count_ratio(3, 0), 0.0);
    }
}
