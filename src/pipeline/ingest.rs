// Ingestion loop: capture -> extract -> dedup -> classify -> persist -> scroll.
//
// One logical flow. Each cycle captures one page snapshot, walks its post
// containers in document order and appends every not-yet-seen post to the
// store before moving on. The loop stops on whichever fires first: the post
// limit, the scroll limit, or too many consecutive cycles without a new post.
//
// Appends are durable before a post counts as accepted, so an interrupted
// run leaves the store consistent and the next run resumes via the ledger.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::browser::{Browser, SCROLL_SCRIPT};
use crate::extract::{parse_snapshot, PostExtractor};
use crate::output::terminal;
use crate::sentiment::SentimentClassifier;
use crate::store::{CsvStore, DedupLedger, PostRecord};

/// Termination thresholds. Reaching any one of them ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestLimits {
    pub max_posts: usize,
    pub max_scrolls: usize,
    pub max_stagnant: usize,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_posts: 1000,
            max_scrolls: 800,
            max_stagnant: 50,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub limits: IngestLimits,
    /// Wait after each pagination trigger.
    pub settle: Duration,
    pub scroll_script: String,
    /// Print a line per accepted post.
    pub echo: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            limits: IngestLimits::default(),
            settle: Duration::from_secs(4),
            scroll_script: SCROLL_SCRIPT.to_string(),
            echo: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// `max_posts` new posts were accepted.
    PostLimit,
    /// `max_scrolls` pagination advances were made.
    ScrollLimit,
    /// `max_stagnant` consecutive cycles accepted nothing.
    Stagnated,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            StopReason::PostLimit => "post limit reached",
            StopReason::ScrollLimit => "scroll limit reached",
            StopReason::Stagnated => "no new posts for too long",
        };
        f.write_str(text)
    }
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// New posts appended to the store.
    pub accepted: usize,
    /// Containers whose id was already in the ledger.
    pub duplicates: usize,
    /// Containers with no resolvable id.
    pub unresolved: usize,
    pub cycles: usize,
    pub scrolls: usize,
    pub stop_reason: StopReason,
}

#[derive(Debug, Default)]
struct Counters {
    accepted: usize,
    duplicates: usize,
    unresolved: usize,
    cycles: usize,
    scrolls: usize,
    stagnant: usize,
}

impl Counters {
    fn stop_reason(&self, limits: &IngestLimits) -> Option<StopReason> {
        if self.accepted >= limits.max_posts {
            Some(StopReason::PostLimit)
        } else if self.scrolls >= limits.max_scrolls {
            Some(StopReason::ScrollLimit)
        } else if self.stagnant >= limits.max_stagnant {
            Some(StopReason::Stagnated)
        } else {
            None
        }
    }

    fn finish(self, stop_reason: StopReason) -> IngestSummary {
        IngestSummary {
            accepted: self.accepted,
            duplicates: self.duplicates,
            unresolved: self.unresolved,
            cycles: self.cycles,
            scrolls: self.scrolls,
            stop_reason,
        }
    }
}

/// Prepare the store for a run and load the ledger.
///
/// With `resume` the existing store (if any) is kept and its ids are loaded.
/// Without it the store is recreated with only the header and the ledger
/// starts empty.
pub fn prepare_store(store: &CsvStore, resume: bool) -> Result<DedupLedger> {
    if resume {
        return Ok(DedupLedger::load(store));
    }
    store
        .reset()
        .with_context(|| format!("Failed to create store {}", store.path().display()))?;
    info!(path = %store.path().display(), "Started a fresh store");
    Ok(DedupLedger::new())
}

/// Run the loop against an already navigated browser.
pub async fn run(
    browser: &mut dyn Browser,
    extractor: &PostExtractor,
    classifier: &SentimentClassifier,
    store: &CsvStore,
    ledger: &mut DedupLedger,
    opts: &IngestOptions,
) -> Result<IngestSummary> {
    let limits = opts.limits;
    let mut counters = Counters::default();

    info!(
        browser = browser.name(),
        known_ids = ledger.len(),
        max_posts = limits.max_posts,
        max_scrolls = limits.max_scrolls,
        max_stagnant = limits.max_stagnant,
        "Starting ingestion"
    );

    let stop_reason = loop {
        if let Some(reason) = counters.stop_reason(&limits) {
            break reason;
        }
        counters.cycles += 1;

        let accepted_this_cycle = match browser.page_source().await {
            Ok(html) => process_snapshot(&html, extractor, classifier, store, ledger, &mut counters, opts)?,
            Err(e) => {
                warn!(cycle = counters.cycles, error = %e, "Failed to capture page, counting as an empty cycle");
                0
            }
        };

        if accepted_this_cycle > 0 {
            counters.stagnant = 0;
        } else {
            counters.stagnant += 1;
            debug!(stagnant = counters.stagnant, "No new posts this cycle");
        }

        info!(
            cycle = counters.cycles,
            new = accepted_this_cycle,
            total = counters.accepted,
            "Cycle complete"
        );

        if counters.accepted < limits.max_posts {
            if let Err(e) = browser.execute(&opts.scroll_script).await {
                warn!(error = %e, "Pagination trigger failed");
            }
            tokio::time::sleep(opts.settle).await;
            counters.scrolls += 1;
        }
    };

    let summary = counters.finish(stop_reason);
    info!(
        accepted = summary.accepted,
        duplicates = summary.duplicates,
        scrolls = summary.scrolls,
        reason = %summary.stop_reason,
        "Ingestion finished"
    );
    Ok(summary)
}

/// Handle one snapshot. Returns how many posts were accepted from it. The
/// parsed document never outlives this call, so no DOM is held across an await.
fn process_snapshot(
    html: &str,
    extractor: &PostExtractor,
    classifier: &SentimentClassifier,
    store: &CsvStore,
    ledger: &mut DedupLedger,
    counters: &mut Counters,
    opts: &IngestOptions,
) -> Result<usize> {
    let document = parse_snapshot(html);
    let root = document.root_element();
    let containers = extractor.containers(&root);
    debug!(containers = containers.len(), "Captured snapshot");

    let mut accepted = 0usize;
    for container in &containers {
        if counters.accepted >= opts.limits.max_posts {
            break;
        }

        let Some(id) = extractor.resolve_id(container) else {
            counters.unresolved += 1;
            continue;
        };
        if ledger.contains(&id) {
            counters.duplicates += 1;
            continue;
        }

        let post = extractor.extract_fields(container, id);
        let sentiment = classifier.classify(&post.content);
        let record = PostRecord::assemble(post, sentiment, Utc::now());

        store
            .append(&record)
            .with_context(|| format!("Failed to append post {} to {}", record.id, store.path().display()))?;
        ledger.add(record.id.clone());
        counters.accepted += 1;
        accepted += 1;

        info!(
            post_id = %record.id,
            sentiment = %record.sentiment,
            score = record.sentiment_score,
            reactions = record.reactions,
            "Post collected"
        );
        if opts.echo {
            terminal::display_collected_post(counters.accepted, &record);
        }
    }

    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_checked_in_order() {
        let limits = IngestLimits {
            max_posts: 1,
            max_scrolls: 1,
            max_stagnant: 1,
        };
        let counters = Counters {
            accepted: 1,
            scrolls: 1,
            stagnant: 1,
            ..Default::default()
        };
        assert_eq!(counters.stop_reason(&limits), Some(StopReason::PostLimit));
        assert_eq!(Counters::default().stop_reason(&limits), None);
    }
}
