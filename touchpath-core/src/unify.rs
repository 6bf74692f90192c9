//! Touchpoint unification
//!
//! Merges sessions and viewable impressions into one stream ordered by
//! (user, time, touchpoint id). The id tie-break keeps positions stable
//! across runs when two touchpoints share an instant.

use std::collections::BTreeMap;

use crate::source::{Impression, Session};
use crate::types::Touchpoint;

/// Merge sessions and impressions into one ordered touchpoint stream.
///
/// No deduplication across sources: a session and an impression at the
/// same instant stay two touchpoints.
pub fn unify(sessions: &[Session], impressions: &[Impression]) -> Vec<Touchpoint> {
    let mut touchpoints: Vec<Touchpoint> = sessions
        .iter()
        .map(Session::to_touchpoint)
        .chain(impressions.iter().map(Impression::to_touchpoint))
        .collect();

    touchpoints.sort_by(|a, b| {
        a.user_id
            .cmp(&b.user_id)
            .then_with(|| a.journey_key().cmp(&b.journey_key()))
    });
    touchpoints
}

/// Touchpoints partitioned by user, each partition in journey order.
#[derive(Debug, Clone, Default)]
pub struct UserTouchpoints {
    by_user: BTreeMap<String, Vec<Touchpoint>>,
}

impl UserTouchpoints {
    /// Partition an ordered stream from [`unify`].
    ///
    /// Partitions are re-sorted, so any input order is accepted.
    pub fn from_stream(touchpoints: Vec<Touchpoint>) -> Self {
        let mut by_user: BTreeMap<String, Vec<Touchpoint>> = BTreeMap::new();
        for tp in touchpoints {
            by_user.entry(tp.user_id.clone()).or_default().push(tp);
        }
        for journey in by_user.values_mut() {
            journey.sort_by(|a, b| a.journey_key().cmp(&b.journey_key()));
        }
        Self { by_user }
    }

    /// One user's touchpoints in journey order (empty if none).
    pub fn for_user(&self, user_id: &str) -> &[Touchpoint] {
        self.by_user.get(user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    pub fn touchpoint_count(&self) -> usize {
        self.by_user.values().map(Vec::len).sum()
    }
}
