//! Core types and configuration for the bonus-rollover simulator.
//!
//! This crate provides shared types used across all other crates:
//! - Monthly price series and month arithmetic
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
