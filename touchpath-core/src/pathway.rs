//! Channel pathways
//!
//! Rolls attribution rows up into one ordered channel path per conversion,
//! then groups identical paths into summary statistics.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PathwayConfig;
use crate::types::AttributionRow;

/// The ordered channels one conversion's journey went through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionPathway {
    pub conversion_id: String,
    pub user_id: String,
    pub conversion_timestamp: DateTime<Utc>,
    /// Channels joined by the configured separator
    pub path: String,
    /// Channels in position order
    pub channels: Vec<String>,
    pub revenue: Decimal,
    pub total_touchpoints: u32,
}

/// Statistics for all conversions sharing one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwaySummary {
    pub path: String,
    pub conversion_count: usize,
    pub total_revenue: Decimal,
    pub avg_revenue: Decimal,
    pub avg_journey_length: Decimal,
    /// Share of all attributed conversions, 0-100
    pub pct_of_conversions: Decimal,
}

/// Builds pathways and their grouped summary
pub struct PathwayAggregator {
    config: PathwayConfig,
}

impl PathwayAggregator {
    /// Create with default configuration
    pub fn new() -> Self {
        Self {
            config: PathwayConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(config: PathwayConfig) -> Self {
        Self { config }
    }

    /// One pathway per conversion, ordered by (conversion timestamp, conversion id).
    ///
    /// Rows may arrive in any order; channels are placed by `position`.
    pub fn pathways(&self, rows: &[AttributionRow]) -> Vec<ConversionPathway> {
        let mut by_conversion: BTreeMap<(DateTime<Utc>, &str), Vec<&AttributionRow>> =
            BTreeMap::new();
        for row in rows {
            by_conversion
                .entry((row.conversion_timestamp, row.conversion_id.as_str()))
                .or_default()
                .push(row);
        }

        by_conversion
            .into_values()
            .filter_map(|mut journey| {
                journey.sort_by_key(|row| row.position);
                let first = *journey.first()?;
                let channels: Vec<String> = journey.iter().map(|r| r.channel.clone()).collect();
                Some(ConversionPathway {
                    conversion_id: first.conversion_id.clone(),
                    user_id: first.user_id.clone(),
                    conversion_timestamp: first.conversion_timestamp,
                    path: channels.join(self.config.separator.as_str()),
                    channels,
                    revenue: first.revenue,
                    total_touchpoints: first.total_touchpoints,
                })
            })
            .collect()
    }

    /// Group pathways by path string.
    ///
    /// Paths seen fewer than `min_occurrences` times are left out; the
    /// percentage is still taken over every pathway passed in. Sorted by
    /// conversion count descending, then path ascending.
    pub fn summarize(&self, pathways: &[ConversionPathway]) -> Vec<PathwaySummary> {
        if pathways.is_empty() {
            return Vec::new();
        }

        struct Group {
            count: usize,
            revenue: Decimal,
            touchpoints: u64,
        }

        let mut groups: HashMap<&str, Group> = HashMap::new();
        for pathway in pathways {
            let group = groups.entry(pathway.path.as_str()).or_insert(Group {
                count: 0,
                revenue: Decimal::ZERO,
                touchpoints: 0,
            });
            group.count += 1;
            group.revenue += pathway.revenue;
            group.touchpoints += u64::from(pathway.total_touchpoints);
        }

        let all = Decimal::from(pathways.len());
        let mut summaries: Vec<PathwaySummary> = groups
            .into_iter()
            .filter(|(_, g)| g.count >= self.config.min_occurrences)
            .map(|(path, g)| {
                let count = Decimal::from(g.count);
                PathwaySummary {
                    path: path.to_string(),
                    conversion_count: g.count,
                    total_revenue: g.revenue,
                    avg_revenue: g.revenue / count,
                    avg_journey_length: Decimal::from(g.touchpoints) / count,
                    pct_of_conversions: count * Decimal::ONE_HUNDRED / all,
                }
            })
            .collect();

        summaries.sort_by(|a, b| {
            b.conversion_count
                .cmp(&a.conversion_count)
                .then_with(|| a.path.cmp(&b.path))
        });
        summaries
    }
}

impl Default for PathwayAggregator {
    fn default() -> Self {
        Self::new()
    }
}
