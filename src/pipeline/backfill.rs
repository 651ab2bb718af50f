// Sentiment backfill: fill in missing Sentiment/Sentiment_Score values in an
// existing store.
//
// Rows that already carry both values are left byte-for-byte alone, as are
// columns this tool doesn't know about. Running it twice is a no-op the
// second time.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use csv::{ByteRecord, StringRecord};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use crate::sentiment::SentimentClassifier;
use crate::store::models::{CONTENT_COLUMN, SCORE_COLUMN, SENTIMENT_COLUMN};
use crate::store::{format_score, ColumnIndex, CsvStore, StoreError};

const PROGRESS_LOG_EVERY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillSummary {
    /// Rows in the store.
    pub total: usize,
    /// Rows whose sentiment was filled in.
    pub updated: usize,
    /// Backup copy made before the store was touched.
    pub backup: Option<PathBuf>,
}

/// Classify every row missing a label or score and rewrite the store.
pub fn run(store: &CsvStore, classifier: &SentimentClassifier, backup: bool) -> Result<BackfillSummary> {
    if !store.exists() {
        return Err(StoreError::NotFound(store.path().to_path_buf()).into());
    }

    let backup = if backup {
        Some(make_backup(store)?)
    } else {
        None
    };

    let mut table = store
        .read_raw()
        .with_context(|| format!("Failed to read {}", store.path().display()))?;

    // Append the sentiment columns to the header if absent.
    let mut headers: Vec<String> = table.headers.iter().map(str::to_string).collect();
    for column in [SENTIMENT_COLUMN, SCORE_COLUMN] {
        if !headers.iter().any(|h| h.trim() == column) {
            headers.push(column.to_string());
        }
    }
    table.headers = StringRecord::from(headers);
    let columns = ColumnIndex::new(&table.headers);
    let width = table.headers.len();

    let (Some(label_at), Some(score_at)) = (columns.position(SENTIMENT_COLUMN), columns.position(SCORE_COLUMN))
    else {
        anyhow::bail!("sentiment columns missing after header update");
    };
    let content_at = columns.position(CONTENT_COLUMN);

    let total = table.rows.len();
    info!(rows = total, engine = classifier.engine_name(), "Backfilling sentiment");

    let pb = ProgressBar::new(total as u64);
    pb.set_style(ProgressStyle::default_bar().template("  Backfill [{bar:30}] {pos}/{len} ({eta})")?);

    let mut updated = 0usize;
    for row in table.rows.iter_mut() {
        pb.inc(1);

        let has = |i: usize| row.get(i).is_some_and(|v| !v.trim_ascii().is_empty());
        if has(label_at) && has(score_at) {
            continue;
        }

        // Fields stay as stored bytes; only the two sentiment fields change.
        let mut fields: Vec<Vec<u8>> = row.iter().map(<[u8]>::to_vec).collect();
        if fields.len() < width {
            fields.resize(width, Vec::new());
        }

        let content = content_at
            .and_then(|i| fields.get(i))
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .unwrap_or_default();
        let sentiment = classifier.classify(&content);
        fields[label_at] = sentiment.label.as_str().as_bytes().to_vec();
        fields[score_at] = format_score(sentiment.score).into_bytes();
        *row = ByteRecord::from(fields);

        updated += 1;
        if updated % PROGRESS_LOG_EVERY == 0 {
            info!(updated, "Backfill progress");
        }
    }
    pb.finish_and_clear();

    store
        .replace(&table)
        .with_context(|| format!("Failed to rewrite {}", store.path().display()))?;

    info!(total, updated, "Backfill complete");
    Ok(BackfillSummary { total, updated, backup })
}

/// Copy the store to `<store>.backup_<YYYYmmdd_HHMMSS>`.
fn make_backup(store: &CsvStore) -> Result<PathBuf> {
    let suffix = format!(".backup_{}", Local::now().format("%Y%m%d_%H%M%S"));
    let backup = store.sibling_with_suffix(&suffix);
    fs::copy(store.path(), &backup)
        .with_context(|| format!("Failed to back up store to {}", backup.display()))?;
    info!(backup = %backup.display(), "Store backed up");
    Ok(backup)
}
