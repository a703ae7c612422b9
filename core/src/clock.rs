//! Report clock: owns the notion of "today" and "now".
//!
//! RULE: Nothing below the CLI reads the wall clock directly.
//! Date presets, export filenames and generated appointment dates
//! all take a ReportClock so tests can pin the calendar.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportClock {
    pub now: DateTime<Utc>,
}

impl ReportClock {
    /// Clock pinned to the current wall-clock instant.
    pub fn system() -> Self {
        Self { now: Utc::now() }
    }

    /// Clock pinned to midday (UTC) of the given date.
    pub fn fixed(date: NaiveDate) -> Self {
        let now = date
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self { now }
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// Today shifted by a whole number of days.
    pub fn days_from_today(&self, days: i64) -> NaiveDate {
        self.today() + Duration::days(days)
    }
}
