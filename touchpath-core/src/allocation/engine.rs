//! Runs the registered models over a journey

use tracing::debug;

use super::invariant::verify_credits;
use super::models::{FirstTouch, LastTouch, Linear, PositionBased};
use super::{AllocationModel, ModelId};
use crate::config::PositionSplit;
use crate::error::{AttributionError, Result};
use crate::types::{AttributionRow, Credits};
use crate::window::Journey;

/// Applies every registered model to each touchpoint of a journey
pub struct AllocationEngine {
    models: Vec<Box<dyn AllocationModel>>,
}

impl AllocationEngine {
    /// Engine with the four standard models
    pub fn new(split: PositionSplit) -> Self {
        Self {
            models: vec![
                Box::new(FirstTouch),
                Box::new(LastTouch),
                Box::new(Linear),
                Box::new(PositionBased::new(split)),
            ],
        }
    }

    /// Register a model, replacing any model with the same id
    pub fn with_model(mut self, model: Box<dyn AllocationModel>) -> Self {
        self.models.retain(|m| m.id() != model.id());
        self.models.push(model);
        self
    }

    /// Ids of the registered models, in registration order
    pub fn model_ids(&self) -> Vec<ModelId> {
        self.models.iter().map(|m| m.id()).collect()
    }

    /// Credit every touchpoint of `journey` and verify the sums.
    ///
    /// Fails with [`AttributionError::EmptyJourney`] for a journey with no
    /// touchpoints (those are reported as unattributed, never allocated) and
    /// with [`AttributionError::InvariantViolation`] if a model's credits do
    /// not add up to the revenue.
    pub fn allocate(&self, journey: &Journey) -> Result<Vec<AttributionRow>> {
        let conversion = &journey.conversion;
        if journey.is_unattributed() {
            return Err(AttributionError::EmptyJourney(
                conversion.conversion_id.clone(),
            ));
        }

        let total = journey.total_touchpoints();
        let rows: Vec<AttributionRow> = journey
            .touchpoints
            .iter()
            .map(|matched| {
                let mut credits = Credits::default();
                for model in &self.models {
                    credits.set(
                        model.id(),
                        model.credit(conversion.revenue, matched.position, total),
                    );
                }

                let tp = &matched.touchpoint;
                AttributionRow {
                    conversion_id: conversion.conversion_id.clone(),
                    user_id: conversion.user_id.clone(),
                    conversion_timestamp: conversion.timestamp,
                    revenue: conversion.revenue,
                    touchpoint_id: tp.touchpoint_id.clone(),
                    touchpoint_timestamp: tp.timestamp,
                    channel: tp.channel.clone(),
                    touchpoint_type: tp.touchpoint_type,
                    device: tp.device.clone(),
                    position: matched.position,
                    total_touchpoints: total,
                    days_to_conversion: matched.days_to_conversion,
                    credits,
                }
            })
            .collect();

        let credits: Vec<Credits> = rows.iter().map(|r| r.credits).collect();
        verify_credits(&conversion.conversion_id, conversion.revenue, &credits)?;

        debug!(
            conversion_id = %conversion.conversion_id,
            touchpoints = total,
            "Allocated conversion"
        );
        Ok(rows)
    }
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(PositionSplit::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Conversion, Touchpoint, TouchpointType};
    use crate::window::MatchedTouchpoint;
    use chrono::{DateTime, Duration, Utc};
    use rust_decimal::Decimal;

    fn journey(revenue: Decimal, channels: &[&str]) -> Journey {
        let at: DateTime<Utc> = "2024-12-01T12:00:00Z".parse().unwrap();
        let n = channels.len() as i64;
        let touchpoints = channels
            .iter()
            .enumerate()
            .map(|(i, channel)| MatchedTouchpoint {
                touchpoint: Touchpoint {
                    touchpoint_id: format!("tp_{i}"),
                    user_id: "u".into(),
                    timestamp: at - Duration::days(n - i as i64),
                    channel: channel.to_string(),
                    touchpoint_type: TouchpointType::Session,
                    device: None,
                },
                position: i as u32 + 1,
                days_to_conversion: n - i as i64,
            })
            .collect();
        Journey {
            conversion: Conversion {
                conversion_id: "txn_1".into(),
                user_id: "u".into(),
                timestamp: at,
                revenue,
            },
            touchpoints,
        }
    }

    /// Deliberately broken model for exercising the invariant check
    struct HalfFirstTouch;

    impl AllocationModel for HalfFirstTouch {
        fn id(&self) -> ModelId {
            ModelId::FirstTouch
        }

        fn credit(&self, revenue: Decimal, position: u32, _total: u32) -> Decimal {
            if position == 1 {
                revenue / Decimal::from(2)
            } else {
                Decimal::ZERO
            }
        }
    }

    #[test]
    fn test_four_touch_rows() {
        let engine = AllocationEngine::default();
        let rows = engine
            .allocate(&journey(
                Decimal::from(100),
                &["prospecting_video", "google_organic", "direct", "email"],
            ))
            .unwrap();

        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.total_touchpoints == 4));
        let position_based: Vec<Decimal> =
            rows.iter().map(|r| r.credits.position_based).collect();
        assert_eq!(
            position_based,
            vec![
                Decimal::from(40),
                Decimal::from(10),
                Decimal::from(10),
                Decimal::from(40)
            ]
        );
        assert_eq!(rows[0].credits.first_touch, Decimal::from(100));
        assert_eq!(rows[3].credits.last_touch, Decimal::from(100));
        assert!(rows.iter().all(|r| r.credits.linear == Decimal::from(25)));
    }

    #[test]
    fn test_rows_carry_conversion_and_touchpoint_metadata() {
        let engine = AllocationEngine::default();
        let rows = engine
            .allocate(&journey(Decimal::new(5050, 2), &["direct"]))
            .unwrap();
        let row = &rows[0];
        assert_eq!(row.conversion_id, "txn_1");
        assert_eq!(row.touchpoint_id, "tp_0");
        assert_eq!(row.channel, "direct");
        assert_eq!(row.position, 1);
        assert_eq!(row.days_to_conversion, 1);
        assert_eq!(row.revenue, Decimal::new(5050, 2));
    }

    #[test]
    fn test_empty_journey_rejected() {
        let engine = AllocationEngine::default();
        let err = engine
            .allocate(&journey(Decimal::from(10), &[]))
            .unwrap_err();
        assert!(matches!(err, AttributionError::EmptyJourney(id) if id == "txn_1"));
    }

    #[test]
    fn test_broken_model_trips_invariant() {
        let engine = AllocationEngine::default().with_model(Box::new(HalfFirstTouch));
        let err = engine
            .allocate(&journey(Decimal::from(100), &["direct", "email"]))
            .unwrap_err();
        assert!(matches!(
            err,
            AttributionError::InvariantViolation {
                model: ModelId::FirstTouch,
                ..
            }
        ));
    }

    #[test]
    fn test_with_model_replaces_same_id() {
        let engine = AllocationEngine::default().with_model(Box::new(HalfFirstTouch));
        let ids = engine.model_ids();
        assert_eq!(ids.len(), 4);
        assert_eq!(
            ids.iter().filter(|id| **id == ModelId::FirstTouch).count(),
            1
        );
    }
}
