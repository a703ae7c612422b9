//! Date ranges and the preset filters offered next to every report.
//!
//! A range is an inclusive pair of instants. Presets expand whole
//! calendar days relative to the ReportClock's "today": from
//! 00:00:00.000 of the first day to 23:59:59.999 of the last.

use crate::{
    clock::ReportClock,
    error::{TrackerError, TrackerResult},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> TrackerResult<Self> {
        if start > end {
            return Err(TrackerError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Whole days from `first` through `last`, both inclusive.
    pub fn days(first: NaiveDate, last: NaiveDate) -> TrackerResult<Self> {
        if first > last {
            return Err(TrackerError::InvalidDateRange {
                start: first.to_string(),
                end: last.to_string(),
            });
        }
        Ok(Self {
            start: start_of_day(first),
            end: end_of_day(last),
        })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Span in milliseconds; 0 for a single instant.
    pub fn span_millis(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }

    /// `dd/mm/yyyy - dd/mm/yyyy`, or a single date when both ends share a day.
    pub fn label(&self) -> String {
        let start = format_date(self.start_date());
        let end = format_date(self.end_date());
        if start == end {
            start
        } else {
            format!("{start} - {end}")
        }
    }
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last_milli = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(last_milli).and_utc()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn is_same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

// ── Presets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "yesterday")]
    Yesterday,
    #[serde(rename = "7days")]
    Last7Days,
    #[default]
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "custom")]
    Custom,
}

impl DateFilter {
    pub const ALL: [DateFilter; 5] = [
        Self::Today,
        Self::Yesterday,
        Self::Last7Days,
        Self::Last30Days,
        Self::Custom,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Last7Days => "7days",
            Self::Last30Days => "30days",
            Self::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Today => "Hoy",
            Self::Yesterday => "Ayer",
            Self::Last7Days => "7 días",
            Self::Last30Days => "30 días",
            Self::Custom => "Personalizado",
        }
    }

    /// The range this preset covers. Custom starts from the 30-day window
    /// until explicit dates replace it.
    pub fn range(&self, clock: &ReportClock) -> DateRange {
        let today = clock.today();
        let (first, last) = match self {
            Self::Today => (today, today),
            Self::Yesterday => {
                let yesterday = clock.days_from_today(-1);
                (yesterday, yesterday)
            }
            Self::Last7Days => (clock.days_from_today(-6), today),
            Self::Last30Days | Self::Custom => (clock.days_from_today(-29), today),
        };
        DateRange {
            start: start_of_day(first),
            end: end_of_day(last),
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.id() == s.trim())
            .ok_or_else(|| format!("unknown date filter '{s}'"))
    }
}

/// The range the dashboard opens with.
pub fn default_range(clock: &ReportClock) -> DateRange {
    DateFilter::default().range(clock)
}

/// Selection made in the filter bar: a preset, or an explicit custom range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelection {
    Preset(DateFilter),
    Explicit(DateRange),
}

impl RangeSelection {
    pub fn resolve(&self, clock: &ReportClock) -> DateRange {
        match self {
            Self::Preset(filter) => filter.range(clock),
            Self::Explicit(range) => *range,
        }
    }
}
