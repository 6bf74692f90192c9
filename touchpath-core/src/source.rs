//! Source record validation
//!
//! Raw records arrive with every field optional and loosely typed, the way
//! the analytics and ad-server exports hand them over. Validation turns them
//! into sessions, impressions and conversions. A record that fails a check
//! is dropped and counted, never raised: one bad row must not abort a run.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::channel::{impression_channel, session_channel};
use crate::types::{Conversion, Touchpoint, TouchpointType};

/// `event_name` of a session start
pub const SESSION_START_EVENT: &str = "session_start";

/// `event_name` of a purchase
pub const PURCHASE_EVENT: &str = "purchase";

/// Largest revenue accepted on one purchase.
///
/// Keeps run totals and per-touch shares well inside `Decimal`'s 28
/// significant digits.
pub const MAX_REVENUE: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0); // 1_000_000_000_000_000

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Row of the web analytics event export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub event_timestamp: Option<String>,
    pub event_name: Option<String>,
    pub user_pseudo_id: Option<String>,
    pub session_id: Option<String>,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub device_category: Option<String>,
    /// Number or numeric string
    pub revenue: Option<serde_json::Value>,
    pub transaction_id: Option<String>,
}

/// Row of the ad-server impression export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawImpression {
    pub impression_id: Option<String>,
    pub impression_timestamp: Option<String>,
    pub user_pseudo_id: Option<String>,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub campaign_type: Option<String>,
    pub creative_format: Option<String>,
    pub publisher: Option<String>,
    /// Bool or "true"/"false" string
    pub is_viewable: Option<serde_json::Value>,
    pub device_category: Option<String>,
}

/// A validated session start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub device: Option<String>,
}

impl Session {
    pub fn to_touchpoint(&self) -> Touchpoint {
        Touchpoint {
            touchpoint_id: self.session_id.clone(),
            user_id: self.user_id.clone(),
            timestamp: self.started_at,
            channel: session_channel(self.source.as_deref(), self.medium.as_deref()),
            touchpoint_type: TouchpointType::Session,
            device: self.device.clone(),
        }
    }
}

/// A validated, viewable impression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Impression {
    pub impression_id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub campaign_type: String,
    pub creative_format: String,
    pub device: Option<String>,
}

impl Impression {
    pub fn to_touchpoint(&self) -> Touchpoint {
        Touchpoint {
            touchpoint_id: self.impression_id.clone(),
            user_id: self.user_id.clone(),
            timestamp: self.timestamp,
            channel: impression_channel(&self.campaign_type, &self.creative_format),
            touchpoint_type: TouchpointType::Impression,
            device: self.device.clone(),
        }
    }
}

/// Outcome counts for one source collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    /// Records that became sessions, impressions or conversions
    pub accepted: usize,
    /// Records dropped for a missing id, bad timestamp or bad revenue
    pub malformed: usize,
    /// Records dropped because their id was already accepted
    pub duplicates: usize,
    /// Valid records excluded by policy (non-viewable impressions)
    pub filtered: usize,
}

impl SourceCounts {
    pub fn dropped(&self) -> usize {
        self.malformed + self.duplicates
    }
}

/// What happened to every input record of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub sessions: SourceCounts,
    pub impressions: SourceCounts,
    pub conversions: SourceCounts,
    /// Event rows that were neither session starts nor purchases
    pub ignored_events: usize,
    /// Event lines that could not be decoded at all
    pub unreadable_events: usize,
}

impl IngestReport {
    /// Total records dropped as malformed, unreadable or duplicate
    pub fn total_dropped(&self) -> usize {
        self.sessions.dropped()
            + self.impressions.dropped()
            + self.conversions.dropped()
            + self.unreadable_events
    }
}

/// Raw input for one run
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub events: Vec<RawEvent>,
    pub impressions: Vec<RawImpression>,
    /// Event lines the reader could not decode
    pub unreadable_events: usize,
    /// Impression lines the reader could not decode
    pub unreadable_impressions: usize,
}

/// Validated input for one run
#[derive(Debug, Clone, Default)]
pub struct ValidatedSources {
    pub sessions: Vec<Session>,
    pub impressions: Vec<Impression>,
    pub conversions: Vec<Conversion>,
    pub report: IngestReport,
}

impl SourceBatch {
    /// Validate every record in the batch.
    pub fn validate(&self) -> ValidatedSources {
        let (sessions, session_counts) = validate_sessions(&self.events);
        let (conversions, conversion_counts) = validate_conversions(&self.events);
        let (impressions, mut impression_counts) = validate_impressions(&self.impressions);
        impression_counts.malformed += self.unreadable_impressions;

        let ignored_events = self
            .events
            .iter()
            .filter(|e| {
                !matches!(
                    e.event_name.as_deref().map(str::trim),
                    Some(SESSION_START_EVENT) | Some(PURCHASE_EVENT)
                )
            })
            .count();

        ValidatedSources {
            sessions,
            impressions,
            conversions,
            report: IngestReport {
                sessions: session_counts,
                impressions: impression_counts,
                conversions: conversion_counts,
                ignored_events,
                unreadable_events: self.unreadable_events,
            },
        }
    }
}

/// Parse an export timestamp.
///
/// Accepts RFC 3339 and naive `YYYY-MM-DD HH:MM:SS[.f]` (space or `T`),
/// the latter read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Parse a revenue value given as a JSON number or numeric string.
pub fn parse_revenue(raw: &serde_json::Value) -> Option<Decimal> {
    let text = match raw {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Parse a viewability flag given as a bool, 0/1, or a yes/no style string.
pub fn parse_flag(raw: &serde_json::Value) -> Option<bool> {
    match raw {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Non-empty, trimmed text of an optional field
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn is_event(event: &RawEvent, name: &str) -> bool {
    event.event_name.as_deref().map(str::trim) == Some(name)
}

/// Validate session-start events.
///
/// Repeated starts for one session id collapse to the earliest.
pub fn validate_sessions(events: &[RawEvent]) -> (Vec<Session>, SourceCounts) {
    let mut counts = SourceCounts::default();
    let mut sessions: Vec<Session> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for event in events.iter().filter(|e| is_event(e, SESSION_START_EVENT)) {
        let (Some(session_id), Some(user_id), Some(started_at)) = (
            present(&event.session_id),
            present(&event.user_pseudo_id),
            present(&event.event_timestamp).and_then(parse_timestamp),
        ) else {
            counts.malformed += 1;
            debug!(?event.session_id, "Dropping malformed session_start event");
            continue;
        };

        if let Some(&idx) = by_id.get(session_id) {
            counts.duplicates += 1;
            if started_at < sessions[idx].started_at {
                sessions[idx].started_at = started_at;
            }
            continue;
        }

        by_id.insert(session_id.to_string(), sessions.len());
        sessions.push(Session {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            started_at,
            source: present(&event.source).map(str::to_string),
            medium: present(&event.medium).map(str::to_string),
            device: present(&event.device_category).map(str::to_string),
        });
    }

    counts.accepted = sessions.len();
    (sessions, counts)
}

/// Validate purchase events into conversions.
///
/// A conversion needs a transaction id and revenue strictly above zero
/// and no larger than [`MAX_REVENUE`].
/// Repeated transaction ids keep the first occurrence.
pub fn validate_conversions(events: &[RawEvent]) -> (Vec<Conversion>, SourceCounts) {
    let mut counts = SourceCounts::default();
    let mut conversions = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for event in events.iter().filter(|e| is_event(e, PURCHASE_EVENT)) {
        let revenue = event
            .revenue
            .as_ref()
            .and_then(parse_revenue)
            .filter(|r| *r > Decimal::ZERO && *r <= MAX_REVENUE);

        let (Some(conversion_id), Some(user_id), Some(timestamp), Some(revenue)) = (
            present(&event.transaction_id),
            present(&event.user_pseudo_id),
            present(&event.event_timestamp).and_then(parse_timestamp),
            revenue,
        ) else {
            counts.malformed += 1;
            debug!(?event.transaction_id, "Dropping malformed purchase event");
            continue;
        };

        if !seen.insert(conversion_id.to_string()) {
            counts.duplicates += 1;
            continue;
        }

        conversions.push(Conversion {
            conversion_id: conversion_id.to_string(),
            user_id: user_id.to_string(),
            timestamp,
            revenue,
        });
    }

    counts.accepted = conversions.len();
    (conversions, counts)
}

/// Validate impressions, keeping only viewable ones.
///
/// A missing viewability flag counts as not viewable; an unreadable one
/// makes the record malformed.
pub fn validate_impressions(records: &[RawImpression]) -> (Vec<Impression>, SourceCounts) {
    let mut counts = SourceCounts::default();
    let mut impressions = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for record in records {
        let viewable = match &record.is_viewable {
            None | Some(serde_json::Value::Null) => Some(false),
            Some(flag) => parse_flag(flag),
        };

        let (
            Some(impression_id),
            Some(user_id),
            Some(timestamp),
            Some(campaign_type),
            Some(creative_format),
            Some(viewable),
        ) = (
            present(&record.impression_id),
            present(&record.user_pseudo_id),
            present(&record.impression_timestamp).and_then(parse_timestamp),
            present(&record.campaign_type),
            present(&record.creative_format),
            viewable,
        )
        else {
            counts.malformed += 1;
            debug!(?record.impression_id, "Dropping malformed impression");
            continue;
        };

        if !viewable {
            counts.filtered += 1;
            continue;
        }

        if !seen.insert(impression_id.to_string()) {
            counts.duplicates += 1;
            continue;
        }

        impressions.push(Impression {
            impression_id: impression_id.to_string(),
            user_id: user_id.to_string(),
            timestamp,
            campaign_type: campaign_type.to_string(),
            creative_format: creative_format.to_string(),
            device: present(&record.device_category).map(str::to_string),
        });
    }

    counts.accepted = impressions.len();
    (impressions, counts)
}
