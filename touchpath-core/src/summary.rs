//! Per-channel credit totals, the side-by-side view of the four models

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::ModelId;
use crate::types::{AttributionRow, Credits};

/// Credit a channel earned under every model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel: String,
    /// Attribution rows (touches) carrying this channel
    pub touchpoints: usize,
    #[serde(flatten)]
    pub credits: Credits,
}

impl ChannelSummary {
    pub fn credit(&self, model: ModelId) -> Decimal {
        self.credits.get(model)
    }
}

/// Sum every model's credit per channel, sorted by channel name.
pub fn summarize_channels(rows: &[AttributionRow]) -> Vec<ChannelSummary> {
    let mut by_channel: BTreeMap<&str, (usize, Credits)> = BTreeMap::new();
    for row in rows {
        let (touches, totals) = by_channel.entry(row.channel.as_str()).or_default();
        *touches += 1;
        for model in ModelId::all() {
            totals.set(*model, totals.get(*model) + row.credits.get(*model));
        }
    }

    by_channel
        .into_iter()
        .map(|(channel, (touchpoints, credits))| ChannelSummary {
            channel: channel.to_string(),
            touchpoints,
            credits,
        })
        .collect()
}
