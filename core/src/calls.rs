//! Synthetic call records for the closer drill-down.
//!
//! A closer's summary counters are expanded into one fabricated record
//! per unit count, so the detail view always agrees with the table row.
//!
//! RULE: Bucket counts must match the closer's counters exactly.
//! RULE: Every record's timestamp lies inside the requested window.
//!
//! Inconsistent counters (e.g. offers < sales) clamp the affected
//! bucket to zero instead of failing.

use crate::{
    date_range::DateRange,
    format::normalize,
    metrics::{count_ratio, sum},
    model::{CallOutcome, CallRecord, CallResult, CloserRecord},
    name_generator::NameGenerator,
    rng::RandomSource,
    types::{Count, Money},
};
use chrono::Duration;
use serde::{Deserialize, Serialize};

const SALE_NOTE: &str = "Plan anual contratado";
const FOLLOW_UP_NOTES: [&str; 2] = ["Interesado, seguimiento pendiente", "Evalúa propuesta"];
const LOST_NOTE: &str = "No calificado, fuera del presupuesto";
const NO_SHOW_NOTE: &str = "Cliente no se presentó a la cita";

// ── Buckets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CallBucket {
    Sale,
    OfferNoSale,
    AttendedNoOffer,
    NoShow,
}

impl CallBucket {
    /// Generation order. Record ids are assigned in this order.
    pub const ALL: [CallBucket; 4] = [
        Self::Sale,
        Self::OfferNoSale,
        Self::AttendedNoOffer,
        Self::NoShow,
    ];

    pub fn of(record: &CallRecord) -> Self {
        match (record.outcome, record.result) {
            (CallOutcome::NoShow, _) => Self::NoShow,
            (_, CallResult::Sale) => Self::Sale,
            (_, CallResult::OfferSent | CallResult::FollowUp) => Self::OfferNoSale,
            _ => Self::AttendedNoOffer,
        }
    }
}

/// How many records each bucket gets for a closer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BucketCounts {
    pub sale: Count,
    pub offer_no_sale: Count,
    pub attended_no_offer: Count,
    pub no_show: Count,
}

impl BucketCounts {
    pub fn from_closer(closer: &CloserRecord) -> Self {
        Self {
            sale: closer.sales,
            offer_no_sale: closer.offers.saturating_sub(closer.sales),
            attended_no_offer: closer.shows.saturating_sub(closer.offers),
            no_show: closer.agendas.saturating_sub(closer.shows),
        }
    }

    pub fn get(&self, bucket: CallBucket) -> Count {
        match bucket {
            CallBucket::Sale => self.sale,
            CallBucket::OfferNoSale => self.offer_no_sale,
            CallBucket::AttendedNoOffer => self.attended_no_offer,
            CallBucket::NoShow => self.no_show,
        }
    }

    pub fn total(&self) -> Count {
        self.sale + self.offer_no_sale + self.attended_no_offer + self.no_show
    }
}

// ── Generator ────────────────────────────────────────────────────────────────

/// Fabricate the closer's calls inside `range`, newest first.
pub fn generate_calls<R: RandomSource>(
    closer: &CloserRecord,
    range: &DateRange,
    rng: &mut R,
) -> Vec<CallRecord> {
    let counts = BucketCounts::from_closer(closer);
    let mut calls = Vec::with_capacity(counts.total() as usize);
    let mut next_id: u64 = 1;

    for bucket in CallBucket::ALL {
        for _ in 0..counts.get(bucket) {
            calls.push(generate_call(&closer.closer, bucket, next_id, range, rng));
            next_id += 1;
        }
    }

    calls.sort_by(|a, b| b.ts.cmp(&a.ts));
    log::debug!(
        "calls: generated {} records for {} ({} sale, {} offer, {} lost, {} no-show)",
        calls.len(),
        closer.closer,
        counts.sale,
        counts.offer_no_sale,
        counts.attended_no_offer,
        counts.no_show
    );
    calls
}

fn generate_call<R: RandomSource>(
    closer: &str,
    bucket: CallBucket,
    n: u64,
    range: &DateRange,
    rng: &mut R,
) -> CallRecord {
    let offset_ms = (rng.next_f64() * range.span_millis() as f64) as i64;
    let ts = range.start + Duration::milliseconds(offset_ms);
    let phone = NameGenerator::generate_masked_phone(rng);

    let (duration_sec, outcome, result, notes, amount) = match bucket {
        CallBucket::Sale => {
            let duration = rng.next_in_range(300, 899) as u32;
            let amount = rng.next_in_range(500, 1499) as Money;
            (duration, CallOutcome::Show, CallResult::Sale, SALE_NOTE, amount)
        }
        CallBucket::OfferNoSale => {
            let duration = rng.next_in_range(200, 599) as u32;
            let result = if rng.next_f64() > 0.5 {
                CallResult::OfferSent
            } else {
                CallResult::FollowUp
            };
            let notes = if rng.next_f64() > 0.5 {
                FOLLOW_UP_NOTES[0]
            } else {
                FOLLOW_UP_NOTES[1]
            };
            (duration, CallOutcome::Show, result, notes, 0.0)
        }
        CallBucket::AttendedNoOffer => {
            let duration = rng.next_in_range(100, 399) as u32;
            (duration, CallOutcome::Show, CallResult::Lost, LOST_NOTE, 0.0)
        }
        CallBucket::NoShow => (
            0,
            CallOutcome::NoShow,
            CallResult::Unqualified,
            NO_SHOW_NOTE,
            0.0,
        ),
    };

    CallRecord {
        id: format!("a{n}"),
        closer: closer.to_string(),
        ts,
        lead: format!("Agenda {n}"),
        phone,
        duration_sec,
        outcome,
        result,
        notes: Some(notes.to_string()),
        amount: Some(amount),
    }
}

// ── Call log queries ─────────────────────────────────────────────────────────

/// Logged calls for one closer inside `range`, newest first.
pub fn calls_for_closer<'a>(
    log: &'a [CallRecord],
    closer: &str,
    range: &DateRange,
) -> Vec<&'a CallRecord> {
    let mut calls: Vec<&CallRecord> = log
        .iter()
        .filter(|call| call.closer == closer && range.contains(call.ts))
        .collect();
    calls.sort_by(|a, b| b.ts.cmp(&a.ts));
    calls
}

/// Calls whose lead name contains `query`, ignoring case and accents.
/// A blank query matches everything.
pub fn filter_by_lead<'a>(calls: &'a [CallRecord], query: &str) -> Vec<&'a CallRecord> {
    let needle = normalize(query.trim());
    if needle.is_empty() {
        return calls.iter().collect();
    }
    calls
        .iter()
        .filter(|call| normalize(&call.lead).contains(&needle))
        .collect()
}

/// Header figures shown above a closer's call list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CallMetrics {
    pub total_agendas: Count,
    pub shows: Count,
    /// Percentage, 0..=100.
    pub show_rate: f64,
    pub sales: Count,
    pub cash: Money,
}

impl CallMetrics {
    pub fn from_calls<'a, I>(calls: I) -> Self
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        let calls: Vec<&CallRecord> = calls.into_iter().collect();
        let total_agendas = calls.len() as Count;
        let shows = calls
            .iter()
            .filter(|c| c.outcome == CallOutcome::Show)
            .count() as Count;
        Self {
            total_agendas,
            shows,
            show_rate: count_ratio(shows, total_agendas) * 100.0,
            sales: calls
                .iter()
                .filter(|c| c.result == CallResult::Sale)
                .count() as Count,
            cash: sum(calls.iter().map(|c| c.amount.unwrap_or(0.0))),
        }
    }
}
