//! touchpath-core: Multi-touch revenue attribution
//!
//! This crate turns raw web-analytics events and ad impressions into
//! per-touchpoint revenue credit under four rule-based models:
//!
//! - **Source validation** - [`SourceBatch`] checks raw records and counts what it drops
//! - **Unification** - [`unify`] merges sessions and viewable impressions into one stream
//! - **Windowing** - [`WindowJoiner`] matches each conversion to its lookback journey
//! - **Allocation** - [`AllocationEngine`] credits first-touch, last-touch, linear and position-based
//! - **Pathways** - [`PathwayAggregator`] rolls journeys up into channel paths
//!
//! # Quick Start
//!
//! ```no_run
//! use touchpath_core::{AttributionConfig, AttributionPipeline, SourceBatch};
//!
//! fn example(batch: SourceBatch) -> touchpath_core::Result<()> {
//!     let pipeline = AttributionPipeline::new(AttributionConfig::default())?;
//!     let report = pipeline.run(&batch)?;
//!     println!(
//!         "{} of {} revenue attributed",
//!         report.totals.attributed, report.totals.total
//!     );
//!     Ok(())
//! }
//! ```
//!
//! # Flow
//!
//! ```text
//! events ──┐
//!          ├─ validate ─ unify ─ window-join ─ allocate ─ verify ─┬─ rows
//! impr. ───┘                                                      ├─ pathways
//!                                                                 └─ channel totals
//! ```
//!
//! Revenue is carried as [`rust_decimal::Decimal`] end to end and is never
//! rounded inside the crate.

pub mod allocation;
pub mod channel;
pub mod config;
pub mod error;
pub mod pathway;
pub mod pipeline;
pub mod source;
pub mod summary;
pub mod types;
pub mod unify;
pub mod window;

// Re-export key types for convenience
pub use allocation::{AllocationEngine, AllocationModel, ModelId, verify_credits};
pub use config::{AttributionConfig, PathwayConfig, PositionSplit, WindowConfig};
pub use error::{AttributionError, ConfigError, Result};
pub use pathway::{ConversionPathway, PathwayAggregator, PathwaySummary};
pub use pipeline::{AttributionPipeline, AttributionReport, RevenueTotals};
pub use source::{IngestReport, RawEvent, RawImpression, SourceBatch, SourceCounts};
pub use summary::{ChannelSummary, summarize_channels};
pub use types::{
    AttributionRow, Conversion, Credits, Touchpoint, TouchpointType, UnattributedConversion,
};
pub use unify::{UserTouchpoints, unify};
pub use window::{Journey, MatchedTouchpoint, WindowJoiner};
