//! Data ingestion and normalization for the bonus-rollover simulator.
//!
//! This crate handles:
//! - Price file loading (ISO month mappings and Yahoo chart JSON)
//! - Month normalization and null-close filtering
//! - Two-instrument alignment by calendar month

pub mod aligner;
pub mod loader;

pub use aligner::{align, AlignedSeries, AlignmentReport};
pub use loader::{load_series, parse_series};
