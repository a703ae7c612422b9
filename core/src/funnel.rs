//! Conversion funnel: leads → qualified → appointments → sales.
//!
//! Also checks closer counters against the implied funnel order
//! (sales ≤ offers ≤ shows ≤ agendas ≤ leads). Violations are reported,
//! never rejected; the call generator clamps the affected buckets.

use crate::{
    metrics::count_ratio,
    model::{BranchRecord, CloserRecord},
    types::Count,
};
use serde::{Deserialize, Serialize};

pub const STAGE_LEADS: &str = "Leads Generados";
pub const STAGE_QUALIFIED: &str = "Leads Calificados";
pub const STAGE_APPOINTMENTS: &str = "Citas Concretadas";
pub const STAGE_SALES: &str = "Ventas Realizadas";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunnelStage {
    pub stage: String,
    pub count: Count,
    /// Percentage of the previous stage; 100 for the first.
    pub step_pct: f64,
    /// Bar width as a percentage of the first stage.
    pub width_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunnelLoss {
    pub label: String,
    pub lost: Count,
    /// Percentage of the previous stage that dropped out.
    pub lost_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Funnel {
    pub stages: Vec<FunnelStage>,
    pub losses: Vec<FunnelLoss>,
    /// Sales as a percentage of leads.
    pub total_conversion_pct: f64,
}

impl Funnel {
    pub fn new(leads: Count, qualified: Count, appointments: Count, sales: Count) -> Self {
        let counts = [
            (STAGE_LEADS, leads),
            (STAGE_QUALIFIED, qualified),
            (STAGE_APPOINTMENTS, appointments),
            (STAGE_SALES, sales),
        ];
        let loss_labels = [
            "Leads no calificados",
            "Calificados sin cita",
            "Citas sin venta",
        ];

        let stages: Vec<FunnelStage> = counts
            .iter()
            .enumerate()
            .map(|(i, &(stage, count))| FunnelStage {
                stage: stage.to_string(),
                count,
                step_pct: if i == 0 {
                    100.0
                } else {
                    count_ratio(count, counts[i - 1].1) * 100.0
                },
                width_pct: count_ratio(count, leads) * 100.0,
            })
            .collect();

        let losses = stages
            .windows(2)
            .zip(loss_labels)
            .map(|(pair, label)| FunnelLoss {
                label: label.to_string(),
                lost: pair[0].count.saturating_sub(pair[1].count),
                lost_pct: 100.0 - pair[1].step_pct,
            })
            .collect();

        Self {
            stages,
            losses,
            total_conversion_pct: count_ratio(sales, leads) * 100.0,
        }
    }

    /// Funnel over the totals of every branch.
    pub fn from_branches(branches: &[BranchRecord]) -> Self {
        Self::new(
            branches.iter().map(|b| b.leads).sum(),
            branches.iter().map(|b| b.qualified_leads).sum(),
            branches.iter().map(|b| b.appointments).sum(),
            branches.iter().map(|b| b.clients).sum(),
        )
    }
}

// ── Counter ordering ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FunnelViolation {
    pub closer: String,
    pub lower: &'static str,
    pub lower_value: Count,
    pub upper: &'static str,
    pub upper_value: Count,
}

impl FunnelViolation {
    pub fn message(&self) -> String {
        format!(
            "{}: {} ({}) exceeds {} ({})",
            self.closer, self.lower, self.lower_value, self.upper, self.upper_value
        )
    }
}

/// Every adjacent pair of closer counters that breaks the funnel order.
pub fn funnel_violations(closers: &[CloserRecord]) -> Vec<FunnelViolation> {
    let mut violations = Vec::new();
    for closer in closers {
        let chain = [
            ("sales", closer.sales),
            ("offers", closer.offers),
            ("shows", closer.shows),
            ("agendas", closer.agendas),
            ("leads", closer.leads),
        ];
        for pair in chain.windows(2) {
            let (lower, lower_value) = pair[0];
            let (upper, upper_value) = pair[1];
            if lower_value > upper_value {
                log::warn!(
                    "closer {}: {lower}={lower_value} exceeds {upper}={upper_value}",
                    closer.closer
                );
                violations.push(FunnelViolation {
                    closer: closer.closer.clone(),
                    lower,
                    lower_value,
                    upper,
                    upper_value,
                });
            }
        }
    }
    violations
}
