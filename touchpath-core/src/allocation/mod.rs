//! Allocation engine for splitting conversion revenue across touchpoints
//!
//! Each attribution model is a strategy object behind [`AllocationModel`],
//! keyed by [`ModelId`]. The engine runs every registered model over a
//! journey and then checks that each model handed out exactly the
//! conversion's revenue.

mod engine;
mod invariant;
mod models;

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use engine::AllocationEngine;
pub use invariant::{INVARIANT_TOLERANCE, verify_credits};
pub use models::{FirstTouch, LastTouch, Linear, PositionBased};

/// Identifier of an attribution model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    FirstTouch,
    LastTouch,
    Linear,
    PositionBased,
}

impl ModelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstTouch => "first_touch",
            Self::LastTouch => "last_touch",
            Self::Linear => "linear",
            Self::PositionBased => "position_based",
        }
    }

    /// All models in report column order
    pub fn all() -> &'static [ModelId] {
        &[
            Self::FirstTouch,
            Self::LastTouch,
            Self::Linear,
            Self::PositionBased,
        ]
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing ModelId from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModelIdError(String);

impl fmt::Display for ParseModelIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown attribution model: {}", self.0)
    }
}

impl std::error::Error for ParseModelIdError {}

impl FromStr for ModelId {
    type Err = ParseModelIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_touch" => Ok(Self::FirstTouch),
            "last_touch" => Ok(Self::LastTouch),
            "linear" => Ok(Self::Linear),
            "position_based" => Ok(Self::PositionBased),
            _ => Err(ParseModelIdError(s.to_string())),
        }
    }
}

/// A rule for crediting one touchpoint of a journey
pub trait AllocationModel: Send + Sync {
    /// Which credit column this model fills
    fn id(&self) -> ModelId;

    /// Credit for the touchpoint at 1-based `position` of a `total`-long
    /// journey converting for `revenue`.
    ///
    /// Callers guarantee `1 <= position <= total`.
    fn credit(&self, revenue: Decimal, position: u32, total: u32) -> Decimal;
}
