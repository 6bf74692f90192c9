//! Error types for touchpath-core

use rust_decimal::Decimal;
use thiserror::Error;

use crate::allocation::ModelId;

/// Configuration rejected at startup
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Lookback window must be at least one day
    #[error("Attribution window must be a positive number of days, got {0}")]
    NonPositiveWindow(i64),

    /// Lookback window beyond the supported range
    #[error("Attribution window of {days} days exceeds the maximum of {max} days")]
    WindowTooLong { days: i64, max: i64 },

    /// A position-based weight was negative
    #[error("Position split weight '{name}' cannot be negative: {value}")]
    NegativeWeight { name: &'static str, value: Decimal },

    /// Position-based weights do not add up to one
    #[error(
        "Position split must sum to 1 (first_touch + last_touch + middle), got {first_touch} + {last_touch} + {middle} = {sum}"
    )]
    SplitSum {
        first_touch: Decimal,
        last_touch: Decimal,
        middle: Decimal,
        sum: Decimal,
    },

    /// Pathway separator would make paths ambiguous
    #[error("Pathway separator cannot be empty")]
    EmptySeparator,

    /// TOML could not be parsed into a config
    #[error("Invalid config file: {0}")]
    Parse(String),
}

/// Top-level error type for touchpath-core
#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credits for one conversion do not add back up to its revenue.
    ///
    /// Always an allocation defect, never a data problem.
    #[error(
        "Allocation invariant violated for conversion {conversion_id} under {model}: credits sum to {actual}, revenue is {expected}"
    )]
    InvariantViolation {
        conversion_id: String,
        model: ModelId,
        expected: Decimal,
        actual: Decimal,
    },

    /// Allocation was asked to split revenue over zero touchpoints
    #[error("Conversion {0} has an empty journey and cannot be allocated")]
    EmptyJourney(String),
}

/// Result type alias for attribution operations
pub type Result<T> = std::result::Result<T, AttributionError>;
