// Integration tests for the report, the sentiment backfill and cookie-file
// parsing. Everything runs against real files in a temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use feedsift::browser::parse_netscape;
use feedsift::pipeline::backfill;
use feedsift::report::{self, ReportOptions};
use feedsift::sentiment::{SentimentBackend, SentimentLabel};
use feedsift::store::{CsvStore, StoreError};

// ============================================================
// Helpers
// ============================================================

const HEADER: &str = "Post_ID,Post_Author_Name,Post_Author_Profile,Post_Author_JobTitle,Post_Content,Post_Reactions,Sentiment,Sentiment_Score,Date_Collected";

/// Ten posts over two days: 5 positive, 3 negative, 2 neutral.
fn sample_store(dir: &Path) -> PathBuf {
    let rows = [
        r#"1,Ada,,,Great launch,100,positive,0.8,2024-05-01 09:00:00"#,
        r#"2,Ada,,,Love this,200,positive,0.6,2024-05-01 10:00:00"#,
        r#"3,Ada,,,Amazing,300,positive,0.5,2024-05-01 11:00:00"#,
        r#"4,Grace,,,Nice work,50,positive,0.4,2024-05-01 12:00:00"#,
        r#"5,Grace,,,Good news,50,positive,0.2,2024-05-02 09:00:00"#,
        r#"6,Grace,,,Terrible,10,negative,-0.9,2024-05-02 10:00:00"#,
        r#"7,Linus,,,Awful,20,negative,-0.5,2024-05-02 11:00:00"#,
        r#"8,,,,Bad,30,negative,-0.3,2024-05-02 12:00:00"#,
        r#"9,,,,Meeting at noon,0,neutral,0.0,2024-05-02 13:00:00"#,
        r#"10,Linus,,,"Line one
line two",40,neutral,0.05,2024-05-02 14:00:00"#,
    ];
    let path = dir.join("posts.csv");
    fs::write(&path, format!("{HEADER}\n{}\n", rows.join("\n"))).unwrap();
    path
}

fn report_text(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

fn store_error(err: &anyhow::Error) -> &StoreError {
    err.downcast_ref::<StoreError>().expect("expected a StoreError")
}

// ============================================================
// Report statistics
// ============================================================

#[test]
fn sample_statistics_are_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(sample_store(dir.path()));
    let out = dir.path().join("report.csv");

    let stats = report::generate(&store, &out, &ReportOptions::default()).unwrap();

    assert_eq!(stats.total_posts, 10);
    assert_eq!(stats.total_reactions, 800);
    assert_eq!(stats.max_reactions, 300);
    assert_eq!(stats.min_reactions, 0);
    assert_eq!(stats.unique_authors, 4);

    assert_eq!(stats.positive.count, 5);
    assert_eq!(stats.negative.count, 3);
    assert_eq!(stats.neutral.count, 2);
    let pct_sum = stats.positive.percentage + stats.negative.percentage + stats.neutral.percentage;
    assert!((pct_sum - 100.0).abs() < 1e-9);
    assert!((stats.positive.avg_reactions - 140.0).abs() < 1e-9);
    assert!((stats.negative.avg_reactions - 20.0).abs() < 1e-9);
    // mean score 0.085 sits inside the neutral band
    assert_eq!(stats.overall_sentiment, SentimentLabel::Neutral);

    let top = &stats.top_authors;
    assert_eq!(top[0].author, "Ada");
    assert_eq!(top[0].posts, 3);
    assert_eq!(top[1].author, "Grace");
    assert_eq!(stats.most_active_author.as_ref().unwrap().author, "Ada");
    assert!(top.iter().any(|a| a.author == "Unknown" && a.posts == 2));

    assert_eq!(stats.daily.len(), 2);
    assert_eq!(stats.daily[0].date, "2024-05-01");
    assert_eq!(stats.daily[0].positive, 4);
    assert_eq!(stats.daily[0].sentiment_ratio, 1.0);
    assert_eq!(stats.daily[1].total, 6);

    assert!(stats
        .insights
        .engagement_pattern
        .starts_with("Positive content generates significantly more engagement"));
}

#[test]
fn report_file_has_every_section() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(sample_store(dir.path()));
    let out = dir.path().join("nested").join("report.csv");
    let opts = ReportOptions {
        detailed: true,
        top_authors: 2,
    };

    let stats = report::generate(&store, &out, &opts).unwrap();
    assert_eq!(stats.top_authors.len(), 2);

    let text = report_text(&out);
    for section in [
        "LinkedIn Posts Sentiment Analysis Report",
        "=== OVERALL STATISTICS ===",
        "=== SENTIMENT DISTRIBUTION ===",
        "=== REACTION STATISTICS ===",
        "=== SENTIMENT-REACTION CORRELATION ===",
        "=== AUTHOR STATISTICS ===",
        "=== TOP AUTHORS BY POST COUNT ===",
        "=== DAILY SENTIMENT TRENDS ===",
        "=== INSIGHTS & RECOMMENDATIONS ===",
        "=== DETAILED POST ANALYSIS ===",
    ] {
        assert!(text.contains(section), "missing {section}");
    }
    assert!(text.contains(r#""Positive Posts","5 (50.0%)""#));
    assert!(text.contains(r#""Most Active Author","Ada (3 posts)""#));
    assert!(text.contains("Line one line two"));

    // detailed rows run from highest score to lowest
    let first = text.find(r#""1","Ada""#).unwrap();
    let last = text.find(r#""6","Grace""#).unwrap();
    assert!(first < last);
}

#[test]
fn summary_report_omits_the_detailed_section() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(sample_store(dir.path()));
    let out = report::default_report_path(store.path());

    report::generate(&store, &out, &ReportOptions::default()).unwrap();

    assert_eq!(out, dir.path().join("posts_sentiment_report.csv"));
    assert!(!report_text(&out).contains("DETAILED POST ANALYSIS"));
}

// ============================================================
// Report failures
// ============================================================

#[test]
fn missing_store_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("absent.csv"));
    let out = dir.path().join("report.csv");

    let err = report::generate(&store, &out, &ReportOptions::default()).unwrap_err();

    assert!(matches!(store_error(&err), StoreError::NotFound(_)));
    assert!(!out.exists());
}

#[test]
fn header_only_store_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posts.csv");
    fs::write(&path, format!("{HEADER}\n")).unwrap();
    let out = dir.path().join("report.csv");

    let err = report::generate(&CsvStore::new(path), &out, &ReportOptions::default()).unwrap_err();

    assert!(matches!(store_error(&err), StoreError::Empty(_)));
    assert!(!out.exists());
}

#[test]
fn missing_required_columns_are_named() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posts.csv");
    fs::write(&path, "Post_ID,Sentiment\n1,positive\n").unwrap();
    let out = dir.path().join("report.csv");

    let err = report::generate(&CsvStore::new(path), &out, &ReportOptions::default()).unwrap_err();

    match store_error(&err) {
        StoreError::MissingColumns { columns, .. } => {
            assert_eq!(columns, &vec!["Post_Author_Name".to_string(), "Post_Content".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!out.exists());
}

// ============================================================
// Backfill
// ============================================================

#[test]
fn backfill_fills_only_missing_rows_and_keeps_extra_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posts.csv");
    fs::write(
        &path,
        "Post_ID,Post_Author_Name,Post_Content,Campaign,Sentiment,Sentiment_Score\n\
         1,Ada,Terrible outage,spring,negative,-0.75\n\
         2,Ada,Great results,spring,,\n\
         3,Grace,Awful support,fall,negative,\n",
    )
    .unwrap();
    let store = CsvStore::new(&path);
    let classifier = SentimentBackend::Lexicon.classifier();

    let summary = backfill::run(&store, &classifier, true).unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.updated, 2);
    let backup = summary.backup.unwrap();
    assert!(backup.exists());
    assert!(fs::read_to_string(&backup).unwrap().contains("Great results,spring,,"));

    let table = store.read_raw().unwrap();
    assert_eq!(&table.headers[3], "Campaign");
    assert_eq!(&table.rows[0][4], b"negative");
    assert_eq!(&table.rows[0][5], b"-0.75");
    assert_eq!(&table.rows[1][3], b"spring");
    assert_eq!(&table.rows[1][4], b"positive");
    let score: f64 = std::str::from_utf8(&table.rows[2][5]).unwrap().parse().unwrap();
    assert!(score < 0.0);

    let again = backfill::run(&store, &classifier, false).unwrap();
    assert_eq!(again.updated, 0);
    assert!(again.backup.is_none());
}

#[test]
fn backfill_adds_missing_sentiment_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posts.csv");
    fs::write(&path, "Post_ID,Post_Author_Name,Post_Content\n1,Ada,Meeting at noon\n").unwrap();
    let store = CsvStore::new(&path);

    let summary = backfill::run(&store, &SentimentBackend::Lexicon.classifier(), false).unwrap();

    assert_eq!(summary.updated, 1);
    let records = store.read_records().unwrap();
    assert_eq!(records[0].sentiment, SentimentLabel::Neutral);
    assert_eq!(records[0].sentiment_score, 0.0);
}

#[test]
fn backfill_keeps_rows_that_are_not_valid_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posts.csv");
    fs::write(
        &path,
        b"Post_ID,Post_Author_Name,Post_Content\n1,Ada,Great day\n2,Ada,caf\xe9 terrible\n3,Grace,noon\n",
    )
    .unwrap();
    let store = CsvStore::new(&path);

    let summary = backfill::run(&store, &SentimentBackend::Lexicon.classifier(), false).unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.updated, 3);
    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.iter().filter(|b| **b == b'\n').count(), 4);
    assert!(bytes.windows(4).any(|w| w == b"caf\xe9"));

    let table = store.read_raw().unwrap();
    assert_eq!(&table.rows[1][0], b"2");
    assert_eq!(&table.rows[1][3], b"negative");
}

#[test]
fn backfill_of_a_missing_store_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("absent.csv"));

    let err = backfill::run(&store, &SentimentBackend::Lexicon.classifier(), true).unwrap_err();

    assert!(matches!(store_error(&err), StoreError::NotFound(_)));
}

// ============================================================
// Cookie files
// ============================================================

#[test]
fn cookie_file_skips_comments_and_malformed_lines() {
    let text = "# Netscape HTTP Cookie File\n\
                \n\
                .linkedin.com\tTRUE\t/\tTRUE\t1999999999\tJSESSIONID\tajax:123\n\
                .linkedin.com\tTRUE\t/\tTRUE\tsoon\tlang\tv=2&lang=en-us\n\
                too\tfew\tfields\n\
                #HttpOnly_.www.linkedin.com\tFALSE\t/\tTRUE\t0\tli_at\tsecret\n";

    let cookies = parse_netscape(text);

    assert_eq!(cookies.len(), 3);
    assert_eq!(cookies[0].name, "JSESSIONID");
    assert_eq!(cookies[0].expires, Some(1_999_999_999));
    assert!(cookies[0].include_subdomains);
    assert_eq!(cookies[1].expires, None);
    assert_eq!(cookies[1].value, "v=2&lang=en-us");
    assert!(cookies[2].http_only);
    assert_eq!(cookies[2].domain, ".www.linkedin.com");
    assert!(!cookies[0].http_only);
}
