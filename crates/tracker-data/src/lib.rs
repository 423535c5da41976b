//! Storage and reporting layer for the machine tracker.
//!
//! Key-value backends, the hourly record store built on top of them, and the
//! aggregations that feed the daily and trend reports.

pub mod aggregator;
pub mod records;
pub mod store;

pub use tracker_core as core;
