//! End-to-end attribution run
//!
//! validate → unify → window-join → allocate → verify → aggregate. Each
//! stage is a pure transformation of the previous stage's output; a run
//! either produces a complete [`AttributionReport`] or fails without one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::allocation::AllocationEngine;
use crate::config::AttributionConfig;
use crate::error::Result;
use crate::pathway::{ConversionPathway, PathwayAggregator, PathwaySummary};
use crate::source::{IngestReport, SourceBatch};
use crate::summary::{ChannelSummary, summarize_channels};
use crate::types::{AttributionRow, UnattributedConversion};
use crate::unify::{UserTouchpoints, unify};
use crate::window::WindowJoiner;

/// Revenue split between attributed and unattributed conversions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueTotals {
    pub conversions: usize,
    pub total: Decimal,
    pub attributed_conversions: usize,
    pub attributed: Decimal,
    pub unattributed_conversions: usize,
    pub unattributed: Decimal,
}

/// Everything one run produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionReport {
    /// Ordered by (conversion timestamp, conversion id, position)
    pub rows: Vec<AttributionRow>,
    pub pathways: Vec<ConversionPathway>,
    /// Grouped pathways after the minimum-occurrence filter
    pub pathway_summary: Vec<PathwaySummary>,
    pub channel_summary: Vec<ChannelSummary>,
    /// Conversions with no touchpoint inside their window
    pub unattributed: Vec<UnattributedConversion>,
    pub ingest: IngestReport,
    pub totals: RevenueTotals,
}

/// A validated configuration bound to the engine components
pub struct AttributionPipeline {
    joiner: WindowJoiner,
    engine: AllocationEngine,
    pathways: PathwayAggregator,
}

impl AttributionPipeline {
    /// Validate `config` and build the pipeline.
    ///
    /// An invalid configuration is fatal: no run is possible with it.
    pub fn new(config: AttributionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            joiner: WindowJoiner::new(&config.window)?,
            engine: AllocationEngine::new(config.position_split.clone()),
            pathways: PathwayAggregator::with_config(config.pathway),
        })
    }

    /// Attribute every conversion in `batch`.
    ///
    /// Malformed records are dropped and counted in the ingest report.
    /// Fails only on an allocation invariant violation.
    pub fn run(&self, batch: &SourceBatch) -> Result<AttributionReport> {
        let validated = batch.validate();
        log_ingest(&validated.report);

        let stream = unify(&validated.sessions, &validated.impressions);
        let partitions = UserTouchpoints::from_stream(stream);
        info!(
            touchpoints = partitions.touchpoint_count(),
            users = partitions.user_count(),
            "Unified touchpoints"
        );

        let journeys = self.joiner.join_all(&validated.conversions, &partitions);

        let mut rows = Vec::new();
        let mut unattributed = Vec::new();
        let mut totals = RevenueTotals::default();
        for journey in &journeys {
            let conversion = &journey.conversion;
            totals.conversions += 1;
            totals.total += conversion.revenue;

            if journey.is_unattributed() {
                debug!(
                    conversion_id = %conversion.conversion_id,
                    revenue = %conversion.revenue,
                    "No touchpoints inside window"
                );
                totals.unattributed_conversions += 1;
                totals.unattributed += conversion.revenue;
                unattributed.push(UnattributedConversion::from(conversion));
                continue;
            }

            totals.attributed_conversions += 1;
            totals.attributed += conversion.revenue;
            rows.extend(self.engine.allocate(journey)?);
        }

        if totals.unattributed_conversions > 0 {
            warn!(
                conversions = totals.unattributed_conversions,
                revenue = %totals.unattributed,
                "Conversions left unattributed"
            );
        }
        info!(
            rows = rows.len(),
            attributed = totals.attributed_conversions,
            revenue = %totals.attributed,
            "Allocated conversions"
        );

        let pathways = self.pathways.pathways(&rows);
        let pathway_summary = self.pathways.summarize(&pathways);
        let channel_summary = summarize_channels(&rows);
        info!(
            pathways = pathways.len(),
            grouped = pathway_summary.len(),
            channels = channel_summary.len(),
            "Aggregated pathways"
        );

        Ok(AttributionReport {
            rows,
            pathways,
            pathway_summary,
            channel_summary,
            unattributed,
            ingest: validated.report,
            totals,
        })
    }
}

fn log_ingest(report: &IngestReport) {
    info!(
        sessions = report.sessions.accepted,
        impressions = report.impressions.accepted,
        conversions = report.conversions.accepted,
        "Validated source records"
    );
    if report.total_dropped() > 0 {
        warn!(
            sessions = report.sessions.dropped(),
            impressions = report.impressions.dropped(),
            conversions = report.conversions.dropped(),
            unreadable = report.unreadable_events,
            "Dropped malformed or duplicate records"
        );
    }
    if report.impressions.filtered > 0 {
        debug!(
            count = report.impressions.filtered,
            "Skipped non-viewable impressions"
        );
    }
}
