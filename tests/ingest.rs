// Integration tests for the ingestion loop.
//
// Drives the loop with the snapshot replay browser and a scripted failing
// browser against a real CSV store in a temp directory. Settle time is zero
// so nothing here sleeps.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use feedsift::browser::{Browser, Cookie, ReplayBrowser};
use feedsift::extract::PostExtractor;
use feedsift::pipeline::ingest::{self, IngestLimits, IngestOptions, StopReason};
use feedsift::sentiment::{SentimentBackend, SentimentClassifier, SentimentLabel};
use feedsift::store::{CsvStore, DedupLedger};

// ============================================================
// Helpers
// ============================================================

fn post_html(id: u32) -> String {
    format!(
        r#"<div class="feed-shared-update-v2" data-urn="urn:li:activity:{id}">
             <div class="update-components-actor__container">
               <span class="update-components-actor__title"><span dir="ltr">Author {id} Author {id}</span></span>
             </div>
             <div class="update-components-text"><span>Post {id} is great news</span></div>
           </div>"#
    )
}

fn page(ids: &[u32]) -> String {
    let posts: String = ids.iter().map(|id| post_html(*id)).collect();
    format!("<html><body>{posts}</body></html>")
}

fn options(max_posts: usize, max_scrolls: usize, max_stagnant: usize) -> IngestOptions {
    IngestOptions {
        limits: IngestLimits {
            max_posts,
            max_scrolls,
            max_stagnant,
        },
        settle: Duration::ZERO,
        ..Default::default()
    }
}

fn classifier() -> SentimentClassifier {
    SentimentBackend::Lexicon.classifier()
}

async fn run_replay(
    pages: Vec<String>,
    store: &CsvStore,
    ledger: &mut DedupLedger,
    opts: &IngestOptions,
) -> Result<ingest::IngestSummary> {
    let mut browser = ReplayBrowser::new(pages);
    ingest::run(&mut browser, &PostExtractor::default(), &classifier(), store, ledger, opts).await
}

fn temp_store(dir: &Path) -> CsvStore {
    CsvStore::new(dir.join("posts.csv"))
}

/// Browser whose every capture and scroll fails.
struct BrokenBrowser {
    captures: usize,
    scrolls: usize,
}

#[async_trait]
impl Browser for BrokenBrowser {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn navigate(&mut self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        self.captures += 1;
        anyhow::bail!("tab crashed")
    }

    async fn execute(&mut self, _script: &str) -> Result<()> {
        self.scrolls += 1;
        anyhow::bail!("javascript error")
    }

    async fn add_cookie(&mut self, _cookie: &Cookie) -> Result<()> {
        Ok(())
    }

    async fn wait_for_element(&mut self, _css: &str, _timeout: Duration) -> Result<bool> {
        Ok(false)
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

// ============================================================
// Dedup across snapshots and runs
// ============================================================

#[tokio::test]
async fn overlapping_snapshots_are_deduplicated() {
    let dir = tempfile::tempdir().unwrap();
    let store = temp_store(dir.path());
    let mut ledger = ingest::prepare_store(&store, true).unwrap();
    let pages = vec![page(&[1, 2]), page(&[1, 2, 3]), page(&[3])];

    let summary = run_replay(pages, &store, &mut ledger, &options(100, 100, 2))
        .await
        .unwrap();

    assert_eq!(summary.accepted, 3);
    assert_eq!(summary.duplicates, 4);
    assert_eq!(summary.cycles, 4);
    assert_eq!(summary.scrolls, 4);
    assert_eq!(summary.stop_reason, StopReason::Stagnated);
    assert_eq!(store.read_ids().unwrap(), vec!["1", "2", "3"]);
    assert_eq!(ledger.len(), 3);
}

#[tokio::test]
async fn resumed_run_appends_nothing_already_stored() {
    let dir = tempfile::tempdir().unwrap();
    let store = temp_store(dir.path());
    let pages = vec![page(&[1, 2]), page(&[1, 2, 3])];

    let mut ledger = ingest::prepare_store(&store, true).unwrap();
    run_replay(pages.clone(), &store, &mut ledger, &options(100, 100, 2))
        .await
        .unwrap();

    let mut ledger = ingest::prepare_store(&store, true).unwrap();
    assert_eq!(ledger.len(), 3);
    let second = run_replay(pages, &store, &mut ledger, &options(100, 100, 2))
        .await
        .unwrap();

    assert_eq!(second.accepted, 0);
    assert_eq!(second.duplicates, 5);
    assert_eq!(store.read_ids().unwrap().len(), 3);
}

#[tokio::test]
async fn fresh_run_starts_from_an_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = temp_store(dir.path());

    let mut ledger = ingest::prepare_store(&store, true).unwrap();
    run_replay(vec![page(&[1, 2])], &store, &mut ledger, &options(100, 100, 1))
        .await
        .unwrap();

    let mut ledger = ingest::prepare_store(&store, false).unwrap();
    assert!(ledger.is_empty());
    assert!(store.read_ids().unwrap().is_empty());

    let summary = run_replay(vec![page(&[2, 5])], &store, &mut ledger, &options(100, 100, 1))
        .await
        .unwrap();
    assert_eq!(summary.accepted, 2);
    assert_eq!(store.read_ids().unwrap(), vec!["2", "5"]);
}

// ============================================================
// Termination
// ============================================================

#[tokio::test]
async fn post_limit_stops_mid_snapshot_without_scrolling() {
    let dir = tempfile::tempdir().unwrap();
    let store = temp_store(dir.path());
    let mut ledger = DedupLedger::new();

    let summary = run_replay(vec![page(&[1, 2, 3, 4, 5])], &store, &mut ledger, &options(2, 100, 100))
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::PostLimit);
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.cycles, 1);
    assert_eq!(summary.scrolls, 0);
    assert_eq!(store.read_ids().unwrap(), vec!["1", "2"]);
}

#[tokio::test]
async fn scroll_limit_bounds_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = temp_store(dir.path());
    let mut ledger = DedupLedger::new();
    let pages: Vec<String> = (1..=5).map(|id| page(&[id])).collect();

    let summary = run_replay(pages, &store, &mut ledger, &options(100, 3, 100))
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::ScrollLimit);
    assert_eq!(summary.scrolls, 3);
    assert_eq!(summary.accepted, 3);
}

#[tokio::test]
async fn zero_post_limit_does_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = temp_store(dir.path());
    let mut ledger = DedupLedger::new();

    let summary = run_replay(vec![page(&[1])], &store, &mut ledger, &options(0, 100, 100))
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::PostLimit);
    assert_eq!(summary.cycles, 0);
    assert!(!store.exists());
}

#[tokio::test]
async fn failed_captures_and_scrolls_count_toward_stagnation() {
    let dir = tempfile::tempdir().unwrap();
    let store = temp_store(dir.path());
    let mut ledger = DedupLedger::new();
    let mut browser = BrokenBrowser {
        captures: 0,
        scrolls: 0,
    };

    let summary = ingest::run(
        &mut browser,
        &PostExtractor::default(),
        &classifier(),
        &store,
        &mut ledger,
        &options(100, 100, 3),
    )
    .await
    .unwrap();

    assert_eq!(summary.stop_reason, StopReason::Stagnated);
    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.scrolls, 3);
    assert_eq!(browser.captures, 3);
    assert_eq!(browser.scrolls, 3);
    assert_eq!(summary.accepted, 0);
}

// ============================================================
// Records and failures
// ============================================================

#[tokio::test]
async fn containers_without_ids_are_counted_not_stored() {
    let dir = tempfile::tempdir().unwrap();
    let store = temp_store(dir.path());
    let mut ledger = DedupLedger::new();
    let html = format!(
        "<html><body>{}<div class=\"feed-shared-update-v2\"><p>loading</p></div></body></html>",
        post_html(8)
    );

    let summary = run_replay(vec![html], &store, &mut ledger, &options(100, 100, 1))
        .await
        .unwrap();

    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.unresolved, 2);
}

#[tokio::test]
async fn stored_records_carry_extracted_fields_and_sentiment() {
    let dir = tempfile::tempdir().unwrap();
    let store = temp_store(dir.path());
    let mut ledger = DedupLedger::new();

    run_replay(vec![page(&[7])], &store, &mut ledger, &options(100, 100, 1))
        .await
        .unwrap();

    let records = store.read_records().unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.id, "7");
    assert_eq!(record.author_name.as_deref(), Some("Author 7"));
    assert_eq!(record.content, "Post 7 is great news");
    assert_eq!(record.sentiment, SentimentLabel::Positive);
    assert!(record.sentiment_score > 0.1);
    assert_eq!(record.collected_at.len(), "2024-01-01 00:00:00".len());
}

#[tokio::test]
async fn append_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("no-such-dir").join("posts.csv"));
    let mut ledger = DedupLedger::new();

    let result = run_replay(vec![page(&[1])], &store, &mut ledger, &options(100, 100, 1)).await;

    assert!(result.is_err());
    assert!(!ledger.contains("1"));
}
