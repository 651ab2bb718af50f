// Report statistics: everything the sentiment report shows, computed in one
// pass over the store's records.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::sentiment::SentimentLabel;
use crate::store::PostRecord;

/// Author shown for rows without one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Default number of rows in the top-authors table.
pub const DEFAULT_TOP_AUTHORS: usize = 15;

/// Per-label slice of the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelStats {
    pub count: usize,
    /// Share of all posts, 0-100.
    pub percentage: f64,
    pub avg_reactions: f64,
    pub max_reactions: u64,
    pub min_reactions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorCount {
    pub author: String,
    pub posts: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyTrend {
    pub date: String,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
    /// (positive - negative) / total
    pub sentiment_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub content_performance: String,
    pub engagement_pattern: String,
    pub author_diversity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStats {
    pub total_posts: usize,
    pub total_reactions: u64,
    pub avg_reactions: f64,
    pub max_reactions: u64,
    pub min_reactions: u64,
    pub unique_authors: usize,
    pub positive: LabelStats,
    pub negative: LabelStats,
    pub neutral: LabelStats,
    pub avg_sentiment_score: f64,
    pub overall_sentiment: SentimentLabel,
    pub most_active_author: Option<AuthorCount>,
    pub top_authors: Vec<AuthorCount>,
    /// One entry per collection date, ascending.
    pub daily: Vec<DailyTrend>,
    pub insights: Insights,
}

impl ReportStats {
    pub fn compute(records: &[PostRecord], top_n: usize) -> Self {
        let total = records.len();

        let total_reactions: u64 = records.iter().map(|r| r.reactions).sum();
        let max_reactions = records.iter().map(|r| r.reactions).max().unwrap_or(0);
        let min_reactions = records.iter().map(|r| r.reactions).min().unwrap_or(0);
        let score_sum: f64 = records.iter().map(|r| r.sentiment_score).sum();
        let avg_sentiment_score = ratio(score_sum, total);

        let positive = label_stats(records, SentimentLabel::Positive);
        let negative = label_stats(records, SentimentLabel::Negative);
        let neutral = label_stats(records, SentimentLabel::Neutral);

        let authors = count_authors(records);
        let unique_authors = authors.len();
        let top_authors: Vec<AuthorCount> = authors
            .iter()
            .take(top_n)
            .map(|(author, posts)| AuthorCount {
                author: author.to_string(),
                posts: *posts,
                percentage: ratio(*posts as f64, total) * 100.0,
            })
            .collect();
        let most_active_author = authors.first().map(|(author, posts)| AuthorCount {
            author: author.to_string(),
            posts: *posts,
            percentage: ratio(*posts as f64, total) * 100.0,
        });

        let insights = Insights::derive(&positive, &negative, unique_authors, total);

        Self {
            total_posts: total,
            total_reactions,
            avg_reactions: ratio(total_reactions as f64, total),
            max_reactions,
            min_reactions,
            unique_authors,
            positive,
            negative,
            neutral,
            avg_sentiment_score,
            overall_sentiment: SentimentLabel::from_score(avg_sentiment_score),
            most_active_author,
            top_authors,
            daily: daily_trends(records),
            insights,
        }
    }

    pub fn label(&self, label: SentimentLabel) -> &LabelStats {
        match label {
            SentimentLabel::Positive => &self.positive,
            SentimentLabel::Negative => &self.negative,
            SentimentLabel::Neutral => &self.neutral,
        }
    }
}

impl Insights {
    fn derive(positive: &LabelStats, negative: &LabelStats, unique_authors: usize, total: usize) -> Self {
        let content_performance = if positive.percentage > 60.0 {
            "Strong positive sentiment - continue current strategy"
        } else if negative.percentage > 40.0 {
            "High negative sentiment - review content strategy"
        } else {
            "Mixed sentiment - monitor trends and optimize"
        };

        let engagement_pattern = if positive.avg_reactions > negative.avg_reactions * 1.5 {
            "Positive content generates significantly more engagement"
        } else if negative.avg_reactions > positive.avg_reactions * 1.5 {
            "Negative content generates more engagement - consider balanced approach"
        } else {
            "Similar engagement across sentiment types"
        };

        let author_diversity = if (unique_authors as f64) < total as f64 * 0.1 {
            "Low author diversity - consider broadening content sources"
        } else {
            "Good author diversity in content"
        };

        Self {
            content_performance: content_performance.to_string(),
            engagement_pattern: engagement_pattern.to_string(),
            author_diversity: author_diversity.to_string(),
        }
    }
}

/// Display name of a record's author.
pub fn author_of(record: &PostRecord) -> &str {
    record.author_name.as_deref().unwrap_or(UNKNOWN_AUTHOR)
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

fn label_stats(records: &[PostRecord], label: SentimentLabel) -> LabelStats {
    let reactions: Vec<u64> = records
        .iter()
        .filter(|r| r.sentiment == label)
        .map(|r| r.reactions)
        .collect();
    let count = reactions.len();

    LabelStats {
        count,
        percentage: ratio(count as f64, records.len()) * 100.0,
        avg_reactions: ratio(reactions.iter().sum::<u64>() as f64, count),
        max_reactions: reactions.iter().copied().max().unwrap_or(0),
        min_reactions: reactions.iter().copied().min().unwrap_or(0),
    }
}

/// Post count per author, most posts first; ties keep first-seen order.
fn count_authors(records: &[PostRecord]) -> Vec<(&str, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let author = author_of(record);
        if seen.insert(author) {
            order.push(author);
        }
        *counts.entry(author).or_default() += 1;
    }

    let mut ranked: Vec<(&str, usize)> = order
        .into_iter()
        .map(|author| (author, counts.get(author).copied().unwrap_or(0)))
        .collect();
    // stable sort, so equal counts stay in first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn daily_trends(records: &[PostRecord]) -> Vec<DailyTrend> {
    let mut days: BTreeMap<&str, DailyTrend> = BTreeMap::new();

    for record in records {
        let Some(date) = record.collected_date() else {
            continue;
        };
        let day = days.entry(date).or_insert_with(|| DailyTrend {
            date: date.to_string(),
            ..Default::default()
        });
        match record.sentiment {
            SentimentLabel::Positive => day.positive += 1,
            SentimentLabel::Negative => day.negative += 1,
            SentimentLabel::Neutral => day.neutral += 1,
        }
        day.total += 1;
    }

    days.into_values()
        .map(|mut day| {
            day.sentiment_ratio = ratio(day.positive as f64 - day.negative as f64, day.total);
            day
        })
        .collect()
}
