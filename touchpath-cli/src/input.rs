//! JSON Lines readers for the event and impression exports.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use touchpath_core::{RawEvent, RawImpression, SourceBatch};
use tracing::{debug, info};

/// Records decoded from one file, plus the lines that could not be.
#[derive(Debug)]
pub struct JsonLines<T> {
    pub records: Vec<T>,
    pub unreadable: usize,
}

/// Read one JSON object per line. Blank lines are skipped; lines that do not
/// decode as `T` are counted, not fatal.
pub fn read_json_lines<T: DeserializeOwned>(path: &Path) -> Result<JsonLines<T>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut records = Vec::new();
    let mut unreadable = 0;
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!(file = %path.display(), line = idx + 1, error = %e, "Unreadable record");
                unreadable += 1;
            }
        }
    }

    Ok(JsonLines {
        records,
        unreadable,
    })
}

/// Load the events file and the optional impressions file into a batch.
pub fn load_batch(events: &Path, impressions: Option<&Path>) -> Result<SourceBatch> {
    let events: JsonLines<RawEvent> = read_json_lines(events)?;
    let impressions: JsonLines<RawImpression> = match impressions {
        Some(path) => read_json_lines(path)?,
        None => JsonLines {
            records: Vec::new(),
            unreadable: 0,
        },
    };

    info!(
        events = events.records.len(),
        impressions = impressions.records.len(),
        unreadable = events.unreadable + impressions.unreadable,
        "Loaded source files"
    );

    Ok(SourceBatch {
        events: events.records,
        impressions: impressions.records,
        unreadable_events: events.unreadable,
        unreadable_impressions: impressions.unreadable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_records_and_counts_bad_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"event_name":"session_start","session_id":"s1","user_pseudo_id":"u1"}"#,
                "\n",
                "\n",
                "not json\n",
                "[1, 2, 3]\n",
                r#"{"event_name":"purchase","revenue":19.99,"transaction_id":"t1"}"#,
                "\n",
            ),
        )
        .unwrap();

        let lines: JsonLines<RawEvent> = read_json_lines(&path).unwrap();
        assert_eq!(lines.records.len(), 2);
        assert_eq!(lines.unreadable, 2);
        assert_eq!(lines.records[0].session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result: Result<JsonLines<RawEvent>> = read_json_lines(&dir.path().join("nope.jsonl"));
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_without_impressions() {
        let dir = TempDir::new().unwrap();
        let events = dir.path().join("events.jsonl");
        std::fs::write(&events, "{}\n{oops\n").unwrap();

        let batch = load_batch(&events, None).unwrap();
        assert_eq!(batch.events.len(), 1);
        assert!(batch.impressions.is_empty());
        assert_eq!(batch.unreadable_events, 1);
        assert_eq!(batch.unreadable_impressions, 0);
    }
}
