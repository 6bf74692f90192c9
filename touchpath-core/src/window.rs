//! Windowed join of conversions to touchpoints
//!
//! For each conversion, picks the same user's touchpoints that happened
//! strictly before it and no earlier than the lookback window, then ranks
//! them into a journey.

use chrono::{DateTime, Duration, Utc};

use crate::config::WindowConfig;
use crate::error::ConfigError;
use crate::types::{Conversion, Touchpoint};
use crate::unify::UserTouchpoints;

/// A touchpoint placed in a conversion's journey
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedTouchpoint {
    pub touchpoint: Touchpoint,
    /// 1-based rank by (timestamp, touchpoint id)
    pub position: u32,
    /// Whole days between the touchpoint and the conversion, rounded down
    pub days_to_conversion: i64,
}

/// A conversion and the touchpoints that lead to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    pub conversion: Conversion,
    /// In position order
    pub touchpoints: Vec<MatchedTouchpoint>,
}

impl Journey {
    pub fn total_touchpoints(&self) -> u32 {
        self.touchpoints.len() as u32
    }

    /// True when nothing fell inside the window; the revenue is unattributed.
    pub fn is_unattributed(&self) -> bool {
        self.touchpoints.is_empty()
    }
}

/// Joins conversions to the touchpoints inside their lookback window
#[derive(Debug, Clone)]
pub struct WindowJoiner {
    window: Duration,
}

impl WindowJoiner {
    /// Create a joiner, rejecting a non-positive or oversized window.
    pub fn new(config: &WindowConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            window: config.duration()?,
        })
    }

    /// `conversion - window <= touchpoint < conversion`
    ///
    /// When `conversion - window` falls before the earliest representable
    /// instant there is no lower bound.
    pub fn includes(&self, conversion_at: DateTime<Utc>, touchpoint_at: DateTime<Utc>) -> bool {
        if touchpoint_at >= conversion_at {
            return false;
        }
        conversion_at
            .checked_sub_signed(self.window)
            .is_none_or(|earliest| touchpoint_at >= earliest)
    }

    /// Build the journey for one conversion.
    ///
    /// `touchpoints` may hold other users' touchpoints; only the
    /// converting user's are considered.
    pub fn join(&self, conversion: &Conversion, touchpoints: &[Touchpoint]) -> Journey {
        let mut matched: Vec<&Touchpoint> = touchpoints
            .iter()
            .filter(|tp| tp.user_id == conversion.user_id)
            .filter(|tp| self.includes(conversion.timestamp, tp.timestamp))
            .collect();
        matched.sort_by(|a, b| a.journey_key().cmp(&b.journey_key()));

        let touchpoints = matched
            .into_iter()
            .enumerate()
            .map(|(idx, tp)| MatchedTouchpoint {
                touchpoint: tp.clone(),
                position: idx as u32 + 1,
                days_to_conversion: (conversion.timestamp - tp.timestamp).num_days(),
            })
            .collect();

        Journey {
            conversion: conversion.clone(),
            touchpoints,
        }
    }

    /// Build journeys for every conversion, ordered by (timestamp, conversion id).
    pub fn join_all(&self, conversions: &[Conversion], partitions: &UserTouchpoints) -> Vec<Journey> {
        let mut ordered: Vec<&Conversion> = conversions.iter().collect();
        ordered.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.conversion_id.cmp(&b.conversion_id))
        });

        ordered
            .into_iter()
            .map(|conversion| self.join(conversion, partitions.for_user(&conversion.user_id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TouchpointType;
    use rust_decimal::Decimal;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn touchpoint(id: &str, user: &str, at: DateTime<Utc>) -> Touchpoint {
        Touchpoint {
            touchpoint_id: id.into(),
            user_id: user.into(),
            timestamp: at,
            channel: "direct".into(),
            touchpoint_type: TouchpointType::Session,
            device: None,
        }
    }

    fn conversion(id: &str, user: &str, at: DateTime<Utc>) -> Conversion {
        Conversion {
            conversion_id: id.into(),
            user_id: user.into(),
            timestamp: at,
            revenue: Decimal::from(100),
        }
    }

    fn joiner(days: i64) -> WindowJoiner {
        WindowJoiner::new(&WindowConfig { days }).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_window() {
        assert!(WindowJoiner::new(&WindowConfig { days: 0 }).is_err());
        assert!(WindowJoiner::new(&WindowConfig { days: -1 }).is_err());
    }

    #[test]
    fn test_rejects_oversized_window() {
        let err = WindowJoiner::new(&WindowConfig {
            days: 200_000_000_000_000,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::WindowTooLong { .. }));
    }

    #[test]
    fn test_window_reaching_past_earliest_instant_is_unbounded() {
        let at = DateTime::<Utc>::MIN_UTC + Duration::days(10);
        let j = joiner(crate::config::MAX_WINDOW_DAYS);
        assert!(j.includes(at, DateTime::<Utc>::MIN_UTC));
        assert!(j.includes(at, at - Duration::days(1)));
        assert!(!j.includes(at, at));
    }

    #[test]
    fn test_window_boundaries() {
        let at = ts("2024-12-01T12:00:00Z");
        let tps = vec![
            touchpoint("too_old", "u", at - Duration::days(31)),
            touchpoint("inside", "u", at - Duration::days(29)),
            touchpoint("after", "u", at + Duration::minutes(1)),
        ];
        let journey = joiner(30).join(&conversion("c", "u", at), &tps);
        let ids: Vec<&str> = journey
            .touchpoints
            .iter()
            .map(|m| m.touchpoint.touchpoint_id.as_str())
            .collect();
        assert_eq!(ids, vec!["inside"]);
    }

    #[test]
    fn test_exact_window_edge_included_and_same_instant_excluded() {
        let at = ts("2024-12-01T12:00:00Z");
        let j = joiner(30);
        assert!(j.includes(at, at - Duration::days(30)));
        assert!(!j.includes(at, at - Duration::days(30) - Duration::seconds(1)));
        assert!(!j.includes(at, at));
    }

    #[test]
    fn test_other_users_ignored() {
        let at = ts("2024-12-01T12:00:00Z");
        let tps = vec![
            touchpoint("mine", "u1", at - Duration::days(1)),
            touchpoint("theirs", "u2", at - Duration::days(1)),
        ];
        let journey = joiner(30).join(&conversion("c", "u1", at), &tps);
        assert_eq!(journey.total_touchpoints(), 1);
        assert_eq!(journey.touchpoints[0].touchpoint.touchpoint_id, "mine");
    }

    #[test]
    fn test_positions_and_days() {
        let at = ts("2024-12-01T12:00:00Z");
        let tps = vec![
            touchpoint("b", "u", at - Duration::hours(36)),
            touchpoint("a", "u", at - Duration::days(10)),
            touchpoint("c", "u", at - Duration::hours(2)),
        ];
        let journey = joiner(30).join(&conversion("c1", "u", at), &tps);

        let summary: Vec<(&str, u32, i64)> = journey
            .touchpoints
            .iter()
            .map(|m| {
                (
                    m.touchpoint.touchpoint_id.as_str(),
                    m.position,
                    m.days_to_conversion,
                )
            })
            .collect();
        assert_eq!(summary, vec![("a", 1, 10), ("b", 2, 1), ("c", 3, 0)]);
        assert_eq!(journey.total_touchpoints(), 3);
    }

    #[test]
    fn test_tie_broken_by_touchpoint_id() {
        let at = ts("2024-12-01T12:00:00Z");
        let same = at - Duration::days(2);
        let tps = vec![touchpoint("z", "u", same), touchpoint("m", "u", same)];
        let journey = joiner(30).join(&conversion("c", "u", at), &tps);
        assert_eq!(journey.touchpoints[0].touchpoint.touchpoint_id, "m");
        assert_eq!(journey.touchpoints[1].touchpoint.touchpoint_id, "z");
    }

    #[test]
    fn test_no_touchpoints_is_unattributed() {
        let at = ts("2024-12-01T12:00:00Z");
        let journey = joiner(30).join(&conversion("c", "u", at), &[]);
        assert!(journey.is_unattributed());
        assert_eq!(journey.total_touchpoints(), 0);
    }

    #[test]
    fn test_join_all_orders_conversions() {
        let early = ts("2024-11-01T00:00:00Z");
        let late = ts("2024-11-20T00:00:00Z");
        let partitions = UserTouchpoints::from_stream(vec![touchpoint(
            "t",
            "u",
            early - Duration::days(1),
        )]);
        let conversions = vec![
            conversion("txn_b", "u", late),
            conversion("txn_a", "u", early),
            conversion("txn_0", "u", late),
        ];

        let journeys = joiner(30).join_all(&conversions, &partitions);
        let ids: Vec<&str> = journeys
            .iter()
            .map(|j| j.conversion.conversion_id.as_str())
            .collect();
        assert_eq!(ids, vec!["txn_a", "txn_0", "txn_b"]);
        // The touchpoint reaches both later conversions too
        assert!(journeys.iter().all(|j| j.total_touchpoints() == 1));
    }
}
