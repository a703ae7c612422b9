//! Branch (sucursal) performance: per-branch cards, overview, ranking.
//!
//! All percentages are 0..=100 and guarded against empty denominators.

use crate::{
    metrics::{count_ratio, safe_div, sum},
    model::{BranchRecord, SalespersonRecord},
    types::{Count, Money},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchCard {
    pub id: u32,
    pub name: String,
    pub ad_investment: Money,
    pub leads: Count,
    pub qualified_leads: Count,
    pub appointments: Count,
    pub clients: Count,
    pub office_costs: Money,
    /// Share of total investment across all branches.
    pub investment_share_pct: f64,
    /// Share of total leads across all branches.
    pub leads_share_pct: f64,
    pub qualification_pct: f64,
    pub appointment_pct: f64,
    pub sale_pct: f64,
    pub total_conversion_pct: f64,
    pub cost_per_lead: Money,
    pub best_seller: Option<String>,
    pub sellers: Vec<SalespersonRecord>,
}

impl BranchCard {
    pub fn build(branch: &BranchRecord, total_investment: Money, total_leads: Count) -> Self {
        Self {
            id: branch.id,
            name: branch.name.clone(),
            ad_investment: branch.ad_investment,
            leads: branch.leads,
            qualified_leads: branch.qualified_leads,
            appointments: branch.appointments,
            clients: branch.clients,
            office_costs: branch.office_costs,
            investment_share_pct: safe_div(branch.ad_investment, total_investment) * 100.0,
            leads_share_pct: count_ratio(branch.leads, total_leads) * 100.0,
            qualification_pct: count_ratio(branch.qualified_leads, branch.leads) * 100.0,
            appointment_pct: count_ratio(branch.appointments, branch.qualified_leads) * 100.0,
            sale_pct: count_ratio(branch.clients, branch.appointments) * 100.0,
            total_conversion_pct: count_ratio(branch.clients, branch.leads) * 100.0,
            cost_per_lead: safe_div(branch.ad_investment, branch.leads as f64),
            best_seller: best_seller(&branch.sellers).map(|s| s.name.clone()),
            sellers: branch.sellers.clone(),
        }
    }
}

/// Seller with the most sales. Ties go to the later seller in the list.
pub fn best_seller(sellers: &[SalespersonRecord]) -> Option<&SalespersonRecord> {
    sellers
        .iter()
        .reduce(|best, current| if best.sales > current.sales { best } else { current })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchesOverview {
    pub total_investment: Money,
    pub total_leads: Count,
    pub total_appointments: Count,
    pub total_clients: Count,
    pub total_sellers: usize,
    pub total_conversion_pct: f64,
    pub cost_per_lead: Money,
    pub cost_per_sale: Money,
}

impl BranchesOverview {
    pub fn from_branches(branches: &[BranchRecord]) -> Self {
        let total_investment = sum(branches.iter().map(|b| b.ad_investment));
        let total_leads: Count = branches.iter().map(|b| b.leads).sum();
        let total_clients: Count = branches.iter().map(|b| b.clients).sum();
        Self {
            total_investment,
            total_leads,
            total_appointments: branches.iter().map(|b| b.appointments).sum(),
            total_clients,
            total_sellers: branches.iter().map(|b| b.sellers.len()).sum(),
            total_conversion_pct: count_ratio(total_clients, total_leads) * 100.0,
            cost_per_lead: safe_div(total_investment, total_leads as f64),
            cost_per_sale: safe_div(total_investment, total_clients as f64),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchRanking {
    pub position: usize,
    pub name: String,
    pub clients: Count,
    pub conversion_pct: f64,
    pub best_seller: Option<String>,
}

/// Branches ordered by clients descending, positions from 1.
pub fn rank_branches(branches: &[BranchRecord]) -> Vec<BranchRanking> {
    let mut ordered: Vec<&BranchRecord> = branches.iter().collect();
    ordered.sort_by(|a, b| b.clients.cmp(&a.clients));
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, branch)| BranchRanking {
            position: i + 1,
            name: branch.name.clone(),
            clients: branch.clients,
            conversion_pct: count_ratio(branch.clients, branch.leads) * 100.0,
            best_seller: best_seller(&branch.sellers).map(|s| s.name.clone()),
        })
        .collect()
}

/// Everything the branches section shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchesReport {
    pub overview: BranchesOverview,
    pub cards: Vec<BranchCard>,
    pub ranking: Vec<BranchRanking>,
}

impl BranchesReport {
    pub fn build(branches: &[BranchRecord]) -> Self {
        let overview = BranchesOverview::from_branches(branches);
        let cards = branches
            .iter()
            .map(|b| BranchCard::build(b, overview.total_investment, overview.total_leads))
            .collect();
        Self {
            cards,
            ranking: rank_branches(branches),
            overview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seller(id: u32, name: &str, sales: Count) -> SalespersonRecord {
        SalespersonRecord {
            id,
            name: name.into(),
            leads_assigned: 10,
            appointments: 5,
            clients: sales,
            sales,
            conversion_rate: 0.0,
        }
    }

    #[test]
    fn best_seller_ties_go_to_the_later_seller() {
        let sellers = vec![seller(1, "Carla", 4), seller(2, "Diego", 4), seller(3, "Eva", 1)];
        assert_eq!(best_seller(&sellers).map(|s| s.id), Some(2));
        assert!(best_seller(&[]).is_none());
    }

    #[test]
    fn branch_without_leads_has_zero_ratios() {
        let branch = BranchRecord {
            id: 9,
            name: "Vacía".into(),
            ad_investment: 500.0,
            leads: 0,
            qualified_leads: 0,
            appointments: 0,
            clients: 0,
            office_costs: 0.0,
            sellers: vec![],
        };
        let card = BranchCard::build(&branch, 0.0, 0);
        assert_eq!(card.cost_per_lead, 0.0);
        assert_eq!(card.investment_share_pct, 0.0);
        assert_eq!(card.total_conversion_pct, 0.0);
        assert_eq!(card.best_seller, None);
    }
}
