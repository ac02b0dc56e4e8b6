//! Error types for the bonus-rollover simulator.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the bonus-rollover simulator.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (invalid or missing data).
    #[error("Data error: {0}")]
    Data(String),

    /// Non-positive or non-finite price fed to a lot or revaluation step.
    #[error("Invalid price {price} at month {month}")]
    InvalidPrice { month: usize, price: f64 },

    /// Fewer months of overlapping data than one run needs.
    #[error("Insufficient data: need at least {required} months, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// Annualized return is undefined for the given inputs.
    #[error("Math domain error: {0}")]
    MathDomain(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create an invalid price error.
    pub fn invalid_price(month: usize, price: f64) -> Self {
        Error::InvalidPrice { month, price }
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(required: usize, available: usize) -> Self {
        Error::InsufficientData { required, available }
    }

    /// Create a math domain error.
    pub fn math_domain(msg: impl Into<String>) -> Self {
        Error::MathDomain(msg.into())
    }
}
