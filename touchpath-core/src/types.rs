//! Core attribution types
//!
//! Touchpoints and conversions are the validated inputs of a run;
//! attribution rows are its output, one per (conversion, touchpoint) pair.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::ModelId;

/// Where a touchpoint came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchpointType {
    /// A web session start
    Session,
    /// A viewable ad impression
    Impression,
}

impl TouchpointType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Impression => "impression",
        }
    }
}

impl fmt::Display for TouchpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single marketing interaction tied to a user and an instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Touchpoint {
    /// Session id or impression id
    pub touchpoint_id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub channel: String,
    #[serde(rename = "type")]
    pub touchpoint_type: TouchpointType,
    /// Informational only
    pub device: Option<String>,
}

impl Touchpoint {
    /// Ordering key within one user's journey: time, then id.
    pub fn journey_key(&self) -> (DateTime<Utc>, &str) {
        (self.timestamp, self.touchpoint_id.as_str())
    }
}

/// A revenue-bearing event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    /// Transaction id
    pub conversion_id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    /// Always strictly positive
    pub revenue: Decimal,
}

/// Revenue credit a touchpoint receives under each model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(rename = "first_touch_revenue")]
    pub first_touch: Decimal,
    #[serde(rename = "last_touch_revenue")]
    pub last_touch: Decimal,
    #[serde(rename = "linear_revenue")]
    pub linear: Decimal,
    #[serde(rename = "position_based_revenue")]
    pub position_based: Decimal,
}

impl Credits {
    pub fn get(&self, model: ModelId) -> Decimal {
        match model {
            ModelId::FirstTouch => self.first_touch,
            ModelId::LastTouch => self.last_touch,
            ModelId::Linear => self.linear,
            ModelId::PositionBased => self.position_based,
        }
    }

    pub fn set(&mut self, model: ModelId, value: Decimal) {
        match model {
            ModelId::FirstTouch => self.first_touch = value,
            ModelId::LastTouch => self.last_touch = value,
            ModelId::Linear => self.linear = value,
            ModelId::PositionBased => self.position_based = value,
        }
    }
}

/// One (conversion, touchpoint) pair inside the attribution window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionRow {
    // Conversion
    pub conversion_id: String,
    pub user_id: String,
    pub conversion_timestamp: DateTime<Utc>,
    pub revenue: Decimal,

    // Touchpoint
    pub touchpoint_id: String,
    pub touchpoint_timestamp: DateTime<Utc>,
    pub channel: String,
    pub touchpoint_type: TouchpointType,
    pub device: Option<String>,

    // Journey
    /// 1-based rank within the conversion's journey
    pub position: u32,
    pub total_touchpoints: u32,
    pub days_to_conversion: i64,

    #[serde(flatten)]
    pub credits: Credits,
}

/// A conversion with no touchpoints inside its window.
///
/// Its revenue is reported as unattributed rather than silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnattributedConversion {
    pub conversion_id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub revenue: Decimal,
}

impl From<&Conversion> for UnattributedConversion {
    fn from(conversion: &Conversion) -> Self {
        Self {
            conversion_id: conversion.conversion_id.clone(),
            user_id: conversion.user_id.clone(),
            timestamp: conversion.timestamp,
            revenue: conversion.revenue,
        }
    }
}
