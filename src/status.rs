// Store status display: size, row and id counts, last collection time and
// the sentiment mix.

use std::collections::HashSet;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::sentiment::SentimentLabel;
use crate::store::{decode_row, ColumnIndex, CsvStore, PostRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub size_bytes: u64,
    pub rows: usize,
    pub distinct_ids: usize,
    pub last_collected: Option<String>,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

/// Summarize the store. `Ok(None)` when it doesn't exist yet.
pub fn summarize(store: &CsvStore) -> Result<Option<StoreStatus>> {
    if !store.exists() {
        return Ok(None);
    }

    let size_bytes = std::fs::metadata(store.path()).map(|m| m.len()).unwrap_or(0);
    let table = store.read_raw()?;
    let columns = ColumnIndex::new(&table.headers);

    let mut status = StoreStatus {
        size_bytes,
        rows: table.rows.len(),
        ..Default::default()
    };
    let mut ids = HashSet::new();

    for (i, row) in table.rows.into_iter().enumerate() {
        let record = PostRecord::from_row(&columns, &decode_row(i, row));
        match record.sentiment {
            SentimentLabel::Positive => status.positive += 1,
            SentimentLabel::Negative => status.negative += 1,
            SentimentLabel::Neutral => status.neutral += 1,
        }
        // timestamps are fixed-width, so string order is time order
        if !record.collected_at.is_empty()
            && status
                .last_collected
                .as_deref()
                .is_none_or(|last| record.collected_at.as_str() > last)
        {
            status.last_collected = Some(record.collected_at.clone());
        }
        if !record.id.is_empty() {
            ids.insert(record.id);
        }
    }
    status.distinct_ids = ids.len();

    Ok(Some(status))
}

/// Display store status to the terminal.
pub fn show(store: &CsvStore) -> Result<()> {
    let Some(status) = summarize(store)? else {
        println!("Store: not created yet ({})", store.path().display());
        println!("\nRun `feedsift scrape` to start collecting posts.");
        return Ok(());
    };

    println!("Store: {} ({})", store.path().display(), format_bytes(status.size_bytes));
    println!("Posts: {} rows, {} distinct ids", status.rows, status.distinct_ids);
    if status.rows != status.distinct_ids {
        println!(
            "  {} {} rows share an id with another row",
            "Warning:".yellow(),
            status.rows - status.distinct_ids.min(status.rows)
        );
    }

    match &status.last_collected {
        Some(ts) => println!("Last collected: {ts} UTC"),
        None => println!("Last collected: never"),
    }

    println!(
        "Sentiment: {} positive, {} negative, {} neutral",
        status.positive.to_string().green(),
        status.negative.to_string().red(),
        status.neutral
    );

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
