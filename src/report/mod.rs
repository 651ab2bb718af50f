// Sentiment report over the whole store: statistics in `stats`, CSV layout
// in `csv`.

pub mod csv;
pub mod stats;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::store::CsvStore;

pub use self::stats::{ReportStats, DEFAULT_TOP_AUTHORS};

#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Append the per-post section.
    pub detailed: bool,
    pub top_authors: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            detailed: false,
            top_authors: DEFAULT_TOP_AUTHORS,
        }
    }
}

/// `<dir>/<stem>_sentiment_report.csv` next to the store.
pub fn default_report_path(store: &Path) -> PathBuf {
    let stem = store
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "posts".to_string());
    store.with_file_name(format!("{stem}_sentiment_report.csv"))
}

/// Read the store, compute the statistics and write the report to `out`.
///
/// Store errors (missing file, missing columns, no rows) are returned as
/// `StoreError` inside the `anyhow::Error`, and no report file is written.
pub fn generate(store: &CsvStore, out: &Path, opts: &ReportOptions) -> Result<ReportStats> {
    let records = store.read_records()?;
    let stats = ReportStats::compute(&records, opts.top_authors);
    let bytes = self::csv::render(&stats, &records, store.path(), opts.detailed)?;

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory {}", parent.display()))?;
    }
    fs::write(out, bytes).with_context(|| format!("Failed to write report {}", out.display()))?;

    info!(path = %out.display(), posts = stats.total_posts, "Report written");
    Ok(stats)
}
