// Sentiment classification: a polarity engine behind a trait, wrapped in a
// classifier that owns the thresholds and the neutral fallback.

pub mod lexicon;
pub mod traits;

use std::str::FromStr;

pub use lexicon::LexiconEngine;
pub use traits::{PolarityEngine, Sentiment, SentimentClassifier, SentimentLabel};

/// Which polarity engine the classifier is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentimentBackend {
    /// Built-in lexicon engine (default).
    #[default]
    Lexicon,
    /// No engine; everything is neutral/0.0.
    Disabled,
}

impl SentimentBackend {
    /// Build the classifier capability object for this backend.
    pub fn classifier(self) -> SentimentClassifier {
        match self {
            SentimentBackend::Lexicon => SentimentClassifier::new(Box::new(LexiconEngine::new())),
            SentimentBackend::Disabled => SentimentClassifier::disabled(),
        }
    }
}

impl FromStr for SentimentBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexicon" | "" => Ok(SentimentBackend::Lexicon),
            "disabled" | "off" | "none" => Ok(SentimentBackend::Disabled),
            other => anyhow::bail!("unknown sentiment backend '{other}' (expected lexicon or disabled)"),
        }
    }
}
