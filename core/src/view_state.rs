//! Interactive view state, keyed by closer name or ad id.
//!
//! RULE: Only this module mutates anything after fixtures load.
//! Synthetic calls are generated on first open and cached per closer
//! until the date range changes.

use crate::{
    calls::{filter_by_lead, generate_calls, CallMetrics},
    config::FixtureSet,
    date_range::DateRange,
    error::{TrackerError, TrackerResult},
    model::{AdRecord, CallRecord, CloserRecord},
    rng::RandomSource,
    types::{AdId, CloserName},
};
use std::collections::{BTreeSet, HashMap};

// ── Closer drill-down ────────────────────────────────────────────────────────

/// What the drill-down panel shows for a closer.
#[derive(Debug, PartialEq)]
pub enum DrilldownView<'a> {
    /// The closer's row is not open.
    Closed,
    /// Calls matching the current search (all calls for a blank search).
    Calls(Vec<&'a CallRecord>),
    /// A non-blank search matched nothing.
    NoMatches { query: String },
}

#[derive(Debug, Clone)]
pub struct CloserDrilldown {
    range: DateRange,
    open_row: Option<CloserName>,
    cached_calls: HashMap<CloserName, Vec<CallRecord>>,
    search: HashMap<CloserName, String>,
}

impl CloserDrilldown {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            open_row: None,
            cached_calls: HashMap::new(),
            search: HashMap::new(),
        }
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn open_row(&self) -> Option<&str> {
        self.open_row.as_deref()
    }

    /// Open the closer's row (closing any other) or close it if already open.
    /// Returns whether the row is open afterwards.
    pub fn toggle<R: RandomSource>(
        &mut self,
        closers: &[CloserRecord],
        name: &str,
        rng: &mut R,
    ) -> TrackerResult<bool> {
        if self.open_row.as_deref() == Some(name) {
            self.open_row = None;
            return Ok(false);
        }
        let closer = closers
            .iter()
            .find(|c| c.closer == name)
            .ok_or_else(|| TrackerError::UnknownCloser { name: name.into() })?;
        if !self.cached_calls.contains_key(name) {
            let calls = generate_calls(closer, &self.range, rng);
            self.cached_calls.insert(name.to_string(), calls);
        }
        self.open_row = Some(name.to_string());
        Ok(true)
    }

    /// Cached calls for a closer, if its row was ever opened in this range.
    pub fn calls(&self, name: &str) -> Option<&[CallRecord]> {
        self.cached_calls.get(name).map(Vec::as_slice)
    }

    pub fn set_search(&mut self, name: &str, query: impl Into<String>) {
        self.search.insert(name.to_string(), query.into());
    }

    pub fn search(&self, name: &str) -> &str {
        self.search.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn view(&self, name: &str) -> DrilldownView<'_> {
        if self.open_row.as_deref() != Some(name) {
            return DrilldownView::Closed;
        }
        let calls = self.calls(name).unwrap_or(&[]);
        let query = self.search(name);
        let matches = filter_by_lead(calls, query);
        if matches.is_empty() && !query.trim().is_empty() {
            DrilldownView::NoMatches {
                query: query.to_string(),
            }
        } else {
            DrilldownView::Calls(matches)
        }
    }

    /// Header metrics over the closer's unfiltered calls.
    pub fn metrics(&self, name: &str) -> CallMetrics {
        CallMetrics::from_calls(self.calls(name).unwrap_or(&[]))
    }

    /// Switch the date window. Cached calls belong to the old window
    /// and are dropped; the open row and search text stay.
    pub fn set_range(&mut self, range: DateRange) {
        if range == self.range {
            return;
        }
        log::debug!(
            "view_state: range changed to {}, dropping {} cached call lists",
            range.label(),
            self.cached_calls.len()
        );
        self.range = range;
        self.cached_calls.clear();
    }

    /// Regenerate calls for the open row after a range change.
    pub fn refresh_open<R: RandomSource>(
        &mut self,
        fixtures: &FixtureSet,
        rng: &mut R,
    ) -> TrackerResult<()> {
        let Some(name) = self.open_row.clone() else {
            return Ok(());
        };
        if !self.cached_calls.contains_key(&name) {
            let closer = fixtures.closer(&name)?;
            let calls = generate_calls(closer, &self.range, rng);
            self.cached_calls.insert(name, calls);
        }
        Ok(())
    }
}

// ── Ad expansion ─────────────────────────────────────────────────────────────

/// Which ads show their sub-campaign rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdExpansion {
    expanded: BTreeSet<AdId>,
}

impl AdExpansion {
    /// Every Meta Ads ad starts expanded.
    pub fn new(ads: &[AdRecord]) -> Self {
        Self {
            expanded: ads
                .iter()
                .filter(|ad| ad.is_meta())
                .map(|ad| ad.ad_id.clone())
                .collect(),
        }
    }

    /// Flip one ad. Returns whether it is expanded afterwards.
    pub fn toggle(&mut self, ad_id: &str) -> bool {
        if self.expanded.remove(ad_id) {
            false
        } else {
            self.expanded.insert(ad_id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, ad_id: &str) -> bool {
        self.expanded.contains(ad_id)
    }

    pub fn expanded(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::rng::ScriptedRng;
    use chrono::NaiveDate;

    fn january() -> DateRange {
        DateRange::days(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn only_one_row_is_open_at_a_time() {
        let config = TrackerConfig::default_test();
        let closers = &config.fixtures.closers;
        let mut rng = ScriptedRng::constant(0.3);
        let mut state = CloserDrilldown::new(january());

        assert!(state.toggle(closers, "Ana Torres", &mut rng).unwrap());
        assert!(state.toggle(closers, "Luis Pérez", &mut rng).unwrap());
        assert_eq!(state.open_row(), Some("Luis Pérez"));
        assert_eq!(state.view("Ana Torres"), DrilldownView::Closed);
        assert!(!state.toggle(closers, "Luis Pérez", &mut rng).unwrap());
        assert_eq!(state.open_row(), None);
    }

    #[test]
    fn calls_are_generated_once_per_range() {
        let config = TrackerConfig::default_test();
        let closers = &config.fixtures.closers;
        let mut rng = ScriptedRng::constant(0.3);
        let mut state = CloserDrilldown::new(january());

        state.toggle(closers, "Ana Torres", &mut rng).unwrap();
        let draws = rng.draws();
        state.toggle(closers, "Ana Torres", &mut rng).unwrap();
        state.toggle(closers, "Ana Torres", &mut rng).unwrap();
        assert_eq!(rng.draws(), draws);
        assert_eq!(state.calls("Ana Torres").map(|c| c.len()), Some(10));

        let february = DateRange::days(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        )
        .unwrap();
        state.set_range(february);
        assert!(state.calls("Ana Torres").is_none());
        state.refresh_open(&config.fixtures, &mut rng).unwrap();
        assert!(state
            .calls("Ana Torres")
            .unwrap()
            .iter()
            .all(|c| february.contains(c.ts)));
    }

    #[test]
    fn search_with_no_hits_is_distinct_from_empty_list() {
        let config = TrackerConfig::default_test();
        let mut rng = ScriptedRng::constant(0.3);
        let mut state = CloserDrilldown::new(january());
        state
            .toggle(&config.fixtures.closers, "Sofía Díaz", &mut rng)
            .unwrap();
        assert_eq!(state.view("Sofía Díaz"), DrilldownView::Calls(vec![]));

        state.set_search("Sofía Díaz", "pedro");
        assert_eq!(
            state.view("Sofía Díaz"),
            DrilldownView::NoMatches {
                query: "pedro".into()
            }
        );
    }

    #[test]
    fn unknown_closer_does_not_open() {
        let config = TrackerConfig::default_test();
        let mut state = CloserDrilldown::new(january());
        let err = state
            .toggle(&config.fixtures.closers, "Nadie", &mut ScriptedRng::constant(0.1))
            .unwrap_err();
        assert!(matches!(err, TrackerError::UnknownCloser { .. }));
        assert_eq!(state.open_row(), None);
    }

    #[test]
    fn meta_ads_start_expanded() {
        let config = TrackerConfig::default_test();
        let mut ads = AdExpansion::new(&config.fixtures.ads);
        assert!(ads.is_expanded("FB-01"));
        assert!(ads.is_expanded("FB-02"));
        assert!(!ads.is_expanded("GG-01"));
        assert!(!ads.toggle("FB-01"));
        assert!(ads.toggle("GG-01"));
        assert_eq!(ads.expanded().collect::<Vec<_>>(), vec!["FB-02", "GG-01"]);
    }
}
