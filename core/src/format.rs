//! Display formatting and threshold bands.
//!
//! Money follows the es-ES convention the dashboard was built for:
//! `.` groups thousands (only once the integer part reaches five
//! digits), `,` separates decimals, and the currency code trails
//! after a non-breaking space. Output is independent of the host locale.

use crate::{
    config::{BadgeThresholds, RoasBands},
    model::{CallOutcome, CallResult},
    rng::RandomSource,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NBSP: char = '\u{a0}';
const CURRENCY_SUFFIX: &str = "US$";
const VARIATION_SPREAD: f64 = 30.0;

// ── Numbers ──────────────────────────────────────────────────────────────────

/// Money with no decimals, e.g. `12.345 US$`.
pub fn money0(amount: f64) -> String {
    money(amount, 0)
}

/// Money with two decimals, e.g. `1234,50 US$`.
pub fn money2(amount: f64) -> String {
    money(amount, 2)
}

fn money(amount: f64, decimals: usize) -> String {
    format!("{}{NBSP}{CURRENCY_SUFFIX}", decimal(amount, decimals))
}

/// Integer count with es-ES grouping.
pub fn count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Fixed-decimal number with es-ES separators.
pub fn decimal(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, round_half_up(value, decimals).abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// Round to `decimals` places with ties away from zero. `{:.N}`
/// alone would send exact ties such as 2.25 to the even digit.
pub fn round_half_up(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn group_thousands(digits: &str) -> String {
    // es-ES leaves four-digit numbers ungrouped.
    if digits.len() < 5 {
        return digits.to_string();
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Ratio as a percentage with one decimal: 0.256 → `25.6%`.
pub fn pct(ratio: f64) -> String {
    format!("{:.1}%", round_half_up(ratio * 100.0, 1))
}

/// Return multiple with one decimal: 3.25 → `3.3x`.
pub fn multiple(value: f64) -> String {
    format!("{:.1}x", round_half_up(value, 1))
}

/// Call duration as `m:ss`.
pub fn duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Time of day as 24-hour `HH:MM`.
pub fn time_of_day(ts: DateTime<Utc>) -> String {
    ts.format("%H:%M").to_string()
}

// ── Random KPI variation ─────────────────────────────────────────────────────

/// Demo-only period-over-period variation, uniform in [-15%, 15%).
pub fn random_variation<R: RandomSource>(rng: &mut R) -> String {
    let raw = rng.next_f64() * VARIATION_SPREAD - VARIATION_SPREAD / 2.0;
    let rounded = round_half_up(raw, 1);
    if rounded >= 0.0 {
        format!("+{:.1}%", rounded.abs())
    } else {
        format!("{rounded:.1}%")
    }
}

// ── Badges and bands ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Badge {
    #[serde(rename = "Bueno")]
    Good,
    #[serde(rename = "A revisar")]
    Review,
    #[serde(rename = "Malo")]
    Bad,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Bueno",
            Self::Review => "A revisar",
            Self::Bad => "Malo",
        }
    }
}

/// Lower-is-better classification.
pub fn badge(value: f64, thresholds: BadgeThresholds) -> Badge {
    if value < thresholds.good {
        Badge::Good
    } else if value < thresholds.review {
        Badge::Review
    } else {
        Badge::Bad
    }
}

/// Higher-is-better classification of a return multiple.
pub fn roas_band(roas: f64, bands: RoasBands) -> Badge {
    if roas >= bands.good {
        Badge::Good
    } else if roas >= bands.review {
        Badge::Review
    } else {
        Badge::Bad
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RoasTier {
    Excellent,
    Strong,
    Healthy,
    Weak,
}

/// Tier an ad's ROAS against descending cut-offs.
pub fn roas_tier(roas: f64, tiers: [f64; 3]) -> RoasTier {
    if roas >= tiers[0] {
        RoasTier::Excellent
    } else if roas >= tiers[1] {
        RoasTier::Strong
    } else if roas >= tiers[2] {
        RoasTier::Healthy
    } else {
        RoasTier::Weak
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Positive,
    Warning,
    Negative,
    Info,
    Neutral,
}

pub fn outcome_tone(outcome: CallOutcome) -> StatusTone {
    match outcome {
        CallOutcome::Show | CallOutcome::Connected => StatusTone::Positive,
        CallOutcome::NoShow | CallOutcome::NoAnswer | CallOutcome::Voicemail => {
            StatusTone::Warning
        }
        CallOutcome::Rejected => StatusTone::Negative,
    }
}

pub fn result_tone(result: CallResult) -> StatusTone {
    match result {
        CallResult::Sale => StatusTone::Positive,
        CallResult::OfferSent | CallResult::FollowUp => StatusTone::Warning,
        CallResult::Lost | CallResult::Unqualified => StatusTone::Negative,
        CallResult::Booked => StatusTone::Info,
    }
}

// ── Text ─────────────────────────────────────────────────────────────────────

/// Hide all but the last four digits of a phone number.
///
/// `+57 310 555 1234` keeps the country and area code: `+57 310 •••1234`.
/// Anything not split into at least three groups masks every digit that
/// is followed by four more.
pub fn mask_phone(phone: &str) -> String {
    if phone.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = phone.split(' ').collect();
    if parts.len() >= 3 {
        let last = parts[parts.len() - 1];
        let tail: String = last
            .chars()
            .skip(last.chars().count().saturating_sub(4))
            .collect();
        return format!("{} {} •••{tail}", parts[0], parts[1]);
    }

    let chars: Vec<char> = phone.chars().collect();
    let mut digits_after = vec![0usize; chars.len()];
    let mut run = 0;
    for i in (0..chars.len()).rev() {
        digits_after[i] = run;
        if chars[i].is_ascii_digit() {
            run += 1;
        } else {
            run = 0;
        }
    }
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if c.is_ascii_digit() && digits_after[i] >= 4 {
                '•'
            } else {
                c
            }
        })
        .collect()
}

/// Lowercase and strip Latin diacritics so searches ignore accents.
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}
