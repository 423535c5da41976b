//! Core domain for the machine utilization tracker.
//!
//! Machine catalog, per-reading metric calculations, the hourly record
//! model and its wire format, small statistics helpers, and CLI settings.

pub mod calculations;
pub mod catalog;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod stats;
pub mod time_utils;

pub use error::{Result, TrackerError};
