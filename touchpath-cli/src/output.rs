//! Writes the collections of one attribution run to a directory.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use touchpath_core::{AttributionConfig, AttributionReport, IngestReport, RevenueTotals};

pub const ROWS_FILE: &str = "attribution_rows.jsonl";
pub const PATHWAYS_FILE: &str = "pathways.jsonl";
pub const PATHWAY_SUMMARY_FILE: &str = "pathway_summary.json";
pub const CHANNEL_SUMMARY_FILE: &str = "channel_summary.json";
pub const UNATTRIBUTED_FILE: &str = "unattributed.jsonl";
pub const SUMMARY_FILE: &str = "summary.json";

/// Contents of `summary.json`
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub config: &'a AttributionConfig,
    pub totals: &'a RevenueTotals,
    pub ingest: &'a IngestReport,
    pub attribution_rows: usize,
    pub pathways: usize,
    pub grouped_pathways: usize,
    pub channels: usize,
}

/// Write every collection of `report` into `dir`, replacing earlier output.
///
/// Returns the paths written, in a fixed order.
pub fn write_report(
    dir: &Path,
    report: &AttributionReport,
    config: &AttributionConfig,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let summary = RunSummary {
        config,
        totals: &report.totals,
        ingest: &report.ingest,
        attribution_rows: report.rows.len(),
        pathways: report.pathways.len(),
        grouped_pathways: report.pathway_summary.len(),
        channels: report.channel_summary.len(),
    };

    Ok(vec![
        write_json_lines(&dir.join(ROWS_FILE), &report.rows)?,
        write_json_lines(&dir.join(PATHWAYS_FILE), &report.pathways)?,
        write_json(&dir.join(PATHWAY_SUMMARY_FILE), &report.pathway_summary)?,
        write_json(&dir.join(CHANNEL_SUMMARY_FILE), &report.channel_summary)?,
        write_json_lines(&dir.join(UNATTRIBUTED_FILE), &report.unattributed)?,
        write_json(&dir.join(SUMMARY_FILE), &summary)?,
    ])
}

fn write_json_lines<T: Serialize>(path: &Path, records: &[T]) -> Result<PathBuf> {
    let mut writer = create(path)?;
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(path.to_path_buf())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf> {
    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(path.to_path_buf())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
