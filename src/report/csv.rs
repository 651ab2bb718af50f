// CSV rendering of the sentiment report. Two-column key/value sections,
// separated by blank rows, with wider tables where a section needs them.

use std::path::Path;

use anyhow::Result;
use chrono::Local;
use csv::{QuoteStyle, Writer, WriterBuilder};

use super::stats::{author_of, ReportStats};
use crate::output::truncate_chars;
use crate::sentiment::SentimentLabel;
use crate::store::{format_score, PostRecord};

pub const REPORT_TITLE: &str = "LinkedIn Posts Sentiment Analysis Report";
const PREVIEW_CHARS: usize = 100;

/// Render the full report into memory.
pub fn render(stats: &ReportStats, records: &[PostRecord], source: &Path, detailed: bool) -> Result<Vec<u8>> {
    let mut w = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .flexible(true)
        .from_writer(Vec::new());

    w.write_record([REPORT_TITLE, ""])?;
    pair(&mut w, "Generated on", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    pair(&mut w, "Source File", source.display())?;
    pair(&mut w, "Total Posts Analyzed", stats.total_posts)?;
    blank(&mut w)?;

    section(&mut w, "OVERALL STATISTICS")?;
    pair(&mut w, "Total Posts", stats.total_posts)?;
    pair(&mut w, "Total Reactions", with_commas(stats.total_reactions))?;
    pair(&mut w, "Unique Authors", stats.unique_authors)?;
    pair(&mut w, "Average Reactions per Post", format!("{:.1}", stats.avg_reactions))?;
    blank(&mut w)?;

    section(&mut w, "SENTIMENT DISTRIBUTION")?;
    for (name, label) in [
        ("Positive Posts", SentimentLabel::Positive),
        ("Negative Posts", SentimentLabel::Negative),
        ("Neutral Posts", SentimentLabel::Neutral),
    ] {
        let slice = stats.label(label);
        pair(
            &mut w,
            name,
            format!("{} ({:.1}%)", with_commas(slice.count as u64), slice.percentage),
        )?;
    }
    pair(&mut w, "Average Sentiment Score", format!("{:.3}", stats.avg_sentiment_score))?;
    pair(&mut w, "Overall Sentiment", overall_text(stats.overall_sentiment))?;
    blank(&mut w)?;

    section(&mut w, "REACTION STATISTICS")?;
    pair(&mut w, "Maximum Reactions", with_commas(stats.max_reactions))?;
    pair(&mut w, "Minimum Reactions", with_commas(stats.min_reactions))?;
    pair(&mut w, "Average Reactions", format!("{:.1}", stats.avg_reactions))?;
    blank(&mut w)?;

    section(&mut w, "SENTIMENT-REACTION CORRELATION")?;
    pair(&mut w, "Avg Reactions - Positive Posts", format!("{:.1}", stats.positive.avg_reactions))?;
    pair(&mut w, "Avg Reactions - Negative Posts", format!("{:.1}", stats.negative.avg_reactions))?;
    pair(&mut w, "Avg Reactions - Neutral Posts", format!("{:.1}", stats.neutral.avg_reactions))?;
    blank(&mut w)?;

    section(&mut w, "AUTHOR STATISTICS")?;
    let most_active = stats
        .most_active_author
        .as_ref()
        .map(|a| format!("{} ({} posts)", a.author, a.posts))
        .unwrap_or_else(|| "Unknown (0 posts)".to_string());
    pair(&mut w, "Most Active Author", most_active)?;
    blank(&mut w)?;

    section(&mut w, "TOP AUTHORS BY POST COUNT")?;
    w.write_record(["Author", "Post Count", "Percentage"])?;
    for author in &stats.top_authors {
        w.write_record([
            author.author.clone(),
            author.posts.to_string(),
            format!("{:.1}%", author.percentage),
        ])?;
    }
    blank(&mut w)?;

    if !stats.daily.is_empty() {
        section(&mut w, "DAILY SENTIMENT TRENDS")?;
        w.write_record(["Date", "Positive", "Negative", "Neutral", "Total", "Sentiment Ratio"])?;
        for day in &stats.daily {
            w.write_record([
                day.date.clone(),
                day.positive.to_string(),
                day.negative.to_string(),
                day.neutral.to_string(),
                day.total.to_string(),
                format!("{:.3}", day.sentiment_ratio),
            ])?;
        }
        blank(&mut w)?;
    }

    section(&mut w, "INSIGHTS & RECOMMENDATIONS")?;
    pair(&mut w, "Content Performance", &stats.insights.content_performance)?;
    pair(&mut w, "Engagement Pattern", &stats.insights.engagement_pattern)?;
    pair(&mut w, "Author Diversity", &stats.insights.author_diversity)?;
    blank(&mut w)?;

    if detailed {
        section(&mut w, "DETAILED POST ANALYSIS")?;
        w.write_record(["Post_ID", "Author", "Sentiment", "Score", "Reactions", "Content_Preview"])?;

        let mut by_score: Vec<&PostRecord> = records.iter().collect();
        by_score.sort_by(|a, b| b.sentiment_score.total_cmp(&a.sentiment_score));
        for record in by_score {
            w.write_record([
                record.id.clone(),
                author_of(record).to_string(),
                record.sentiment.as_str().to_string(),
                format_score(record.sentiment_score),
                record.reactions.to_string(),
                preview(&record.content),
            ])?;
        }
    }

    w.flush()?;
    Ok(w.into_inner().map_err(|e| e.into_error())?)
}

fn pair(w: &mut Writer<Vec<u8>>, key: &str, value: impl ToString) -> Result<()> {
    w.write_record([key.to_string(), value.to_string()])?;
    Ok(())
}

fn section(w: &mut Writer<Vec<u8>>, name: &str) -> Result<()> {
    w.write_record([format!("=== {name} ==="), String::new()])?;
    Ok(())
}

fn blank(w: &mut Writer<Vec<u8>>) -> Result<()> {
    w.write_record(["", ""])?;
    Ok(())
}

fn overall_text(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "Overall Positive",
        SentimentLabel::Negative => "Overall Negative",
        SentimentLabel::Neutral => "Overall Neutral",
    }
}

/// First 100 characters of the content on a single line.
fn preview(content: &str) -> String {
    truncate_chars(content, PREVIEW_CHARS).replace(['\n', '\r'], " ")
}

/// 1234567 -> "1,234,567"
pub fn with_commas(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
