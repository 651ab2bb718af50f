// Colored terminal output for collection runs, reports and backfills.

use std::path::Path;

use colored::{ColoredString, Colorize};

use super::truncate_chars;
use crate::pipeline::{BackfillSummary, IngestSummary, StopReason};
use crate::report::ReportStats;
use crate::sentiment::SentimentLabel;
use crate::store::PostRecord;

/// One line per newly collected post.
pub fn display_collected_post(index: usize, record: &PostRecord) {
    let author = record.author_name.as_deref().unwrap_or("Unknown");
    println!(
        "  {:>4}. {:<28} {:<9} {:>6}  {}",
        index,
        truncate_chars(author, 25),
        colorize_label(record.sentiment),
        record.reactions,
        truncate_chars(&record.content, 60).dimmed(),
    );
}

pub fn display_ingest_summary(summary: &IngestSummary, store: &Path) {
    println!("\n{}", "Collection complete.".bold());
    println!("  New posts:   {}", summary.accepted.to_string().green());
    println!("  Duplicates:  {}", summary.duplicates);
    if summary.unresolved > 0 {
        println!("  Unresolved:  {} (no post id)", summary.unresolved);
    }
    println!("  Cycles:      {} ({} scrolls)", summary.cycles, summary.scrolls);
    let reason = match summary.stop_reason {
        StopReason::PostLimit => summary.stop_reason.to_string().green(),
        StopReason::ScrollLimit | StopReason::Stagnated => summary.stop_reason.to_string().yellow(),
    };
    println!("  Stopped:     {reason}");
    println!("  Store:       {}", store.display());
}

pub fn display_report_summary(stats: &ReportStats, report: &Path) {
    println!(
        "\n{}",
        format!("=== Sentiment Summary ({} posts) ===", stats.total_posts).bold()
    );
    for label in SentimentLabel::ALL {
        let slice = stats.label(label);
        println!(
            "  {:<9} {:>6}  ({:>5.1}%)  avg reactions {:.1}",
            colorize_label(label),
            slice.count,
            slice.percentage,
            slice.avg_reactions,
        );
    }
    println!(
        "  Average score: {:.3} ({})",
        stats.avg_sentiment_score,
        colorize_label(stats.overall_sentiment)
    );
    if let Some(author) = &stats.most_active_author {
        println!("  Most active:   {} ({} posts)", author.author, author.posts);
    }
    println!("  Unique authors: {}", stats.unique_authors);
    println!(
        "\n{}",
        format!("Report saved to: {}", report.display()).bold()
    );
}

pub fn display_backfill_summary(summary: &BackfillSummary) {
    if let Some(backup) = &summary.backup {
        println!("  Backup: {}", backup.display());
    }
    if summary.updated == 0 {
        println!("  {} All {} rows already have sentiment", "✓".green(), summary.total);
    } else {
        println!(
            "  {} Updated {} of {} rows",
            "✓".green(),
            summary.updated,
            summary.total
        );
    }
}

fn colorize_label(label: SentimentLabel) -> ColoredString {
    match label {
        SentimentLabel::Positive => label.as_str().green(),
        SentimentLabel::Negative => label.as_str().red(),
        SentimentLabel::Neutral => label.as_str().normal(),
    }
}
