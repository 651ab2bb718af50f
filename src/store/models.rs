// Persisted row model for the CSV store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use csv::StringRecord;
use serde::Serialize;

use crate::extract::ExtractedPost;
use crate::sentiment::{Sentiment, SentimentLabel};

/// Column order of the store. The header row is exactly this.
pub const COLUMNS: [&str; 9] = [
    "Post_ID",
    "Post_Author_Name",
    "Post_Author_Profile",
    "Post_Author_JobTitle",
    "Post_Content",
    "Post_Reactions",
    "Sentiment",
    "Sentiment_Score",
    "Date_Collected",
];

pub const ID_COLUMN: &str = "Post_ID";
pub const AUTHOR_COLUMN: &str = "Post_Author_Name";
pub const CONTENT_COLUMN: &str = "Post_Content";
pub const REACTIONS_COLUMN: &str = "Post_Reactions";
pub const SENTIMENT_COLUMN: &str = "Sentiment";
pub const SCORE_COLUMN: &str = "Sentiment_Score";
pub const COLLECTED_COLUMN: &str = "Date_Collected";

/// Columns a store must have before it can be reported on.
pub const REQUIRED_COLUMNS: [&str; 3] = [ID_COLUMN, AUTHOR_COLUMN, CONTENT_COLUMN];

/// Format of `Date_Collected`, always UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One post as persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: String,
    pub author_name: Option<String>,
    pub author_profile_url: Option<String>,
    pub author_title: Option<String>,
    pub content: String,
    pub reactions: u64,
    pub sentiment: SentimentLabel,
    pub sentiment_score: f64,
    pub collected_at: String,
}

impl PostRecord {
    /// Assemble a record from extracted fields and their classification.
    pub fn assemble(post: ExtractedPost, sentiment: Sentiment, collected_at: DateTime<Utc>) -> Self {
        Self {
            id: post.id,
            author_name: post.author_name,
            author_profile_url: post.author_profile_url,
            author_title: post.author_title,
            content: post.content,
            reactions: post.reactions,
            sentiment: sentiment.label,
            sentiment_score: sentiment.score,
            collected_at: collected_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Fields in `COLUMNS` order.
    pub fn to_row(&self) -> [String; 9] {
        [
            self.id.clone(),
            self.author_name.clone().unwrap_or_default(),
            self.author_profile_url.clone().unwrap_or_default(),
            self.author_title.clone().unwrap_or_default(),
            self.content.clone(),
            self.reactions.to_string(),
            self.sentiment.as_str().to_string(),
            format_score(self.sentiment_score),
            self.collected_at.clone(),
        ]
    }

    /// Read a row tolerantly. Missing or unparseable optional values fall back
    /// to their defaults: neutral, 0.0, 0 reactions, no author.
    pub fn from_row(columns: &ColumnIndex, row: &StringRecord) -> Self {
        let text = |name: &str| columns.get(row, name).unwrap_or_default().to_string();
        let optional = |name: &str| {
            columns
                .get(row, name)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            id: text(ID_COLUMN).trim().to_string(),
            author_name: optional(AUTHOR_COLUMN),
            author_profile_url: optional("Post_Author_Profile"),
            author_title: optional("Post_Author_JobTitle"),
            content: text(CONTENT_COLUMN),
            reactions: columns
                .get(row, REACTIONS_COLUMN)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0),
            sentiment: columns
                .get(row, SENTIMENT_COLUMN)
                .and_then(|v| v.parse::<SentimentLabel>().ok())
                .unwrap_or_default(),
            sentiment_score: columns
                .get(row, SCORE_COLUMN)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(0.0),
            collected_at: text(COLLECTED_COLUMN).trim().to_string(),
        }
    }

    /// Date portion of `collected_at` (text before the first space), if any.
    pub fn collected_date(&self) -> Option<&str> {
        self.collected_at
            .split(' ')
            .next()
            .filter(|d| !d.is_empty())
    }
}

/// Score as persisted: shortest round-trip form, always with a decimal point.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.1}")
    } else {
        score.to_string()
    }
}

/// Header name -> position lookup for reading rows by column name.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn new(headers: &StringRecord) -> Self {
        let mut positions = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            // first occurrence wins on duplicated headers
            positions.entry(name.trim().to_string()).or_insert(i);
        }
        Self { positions }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Value of the named column in `row`. `None` when the column is unknown or
    /// the row is short.
    pub fn get<'r>(&self, row: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.position(name).and_then(|i| row.get(i))
    }

    /// Names from `required` that are missing from the header.
    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.contains(name))
            .map(|name| name.to_string())
            .collect()
    }
}
