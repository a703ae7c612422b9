//! Closer tracker core: fixture loading, aggregation, synthetic drill-down
//! data and exports for the marketing/sales dashboard.

pub mod branches;
pub mod calls;
pub mod campaigns;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod date_range;
pub mod error;
pub mod export;
pub mod format;
pub mod funnel;
pub mod metrics;
pub mod model;
pub mod name_generator;
pub mod notes;
pub mod rng;
pub mod types;
pub mod view_state;
