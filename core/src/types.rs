//! Shared primitive types used across the tracker.

/// A monetary amount in US dollars. Never negative in loaded fixtures.
pub type Money = f64;

/// A funnel counter (leads, agendas, shows, offers, sales).
pub type Count = u64;

/// Closers are keyed by their display name throughout the fixtures.
pub type CloserName = String;

/// Stable ad identifier (`adId` in the fixtures).
pub type AdId = String;
