// Sentiment classifier: the swap-ready polarity seam plus the fixed
// thresholds that turn a polarity into a label.
//
// The polarity engine is a black box (text -> score in [-1, 1]). Whether one
// is available at all is decided once, at construction, and carried by the
// classifier. A disabled classifier deterministically returns the neutral
// fallback.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Scores above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.1;
/// Scores below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

/// Sentiment label persisted in the `Sentiment` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Label for an already rounded polarity score.
    pub fn from_score(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score < NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }

    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            other => anyhow::bail!("unknown sentiment label '{other}'"),
        }
    }
}

/// A classified text: label plus the persisted (rounded) score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

impl Sentiment {
    /// The degraded-mode result: neutral, 0.0.
    pub const NEUTRAL: Sentiment = Sentiment {
        label: SentimentLabel::Neutral,
        score: 0.0,
    };

    /// Round a raw polarity to 3 decimals, clamp it, and derive the label from
    /// the rounded value so label and persisted score always agree.
    pub fn from_polarity(polarity: f64) -> Self {
        let clamped = polarity.clamp(-1.0, 1.0);
        // `+ 0.0` folds -0.0 into 0.0
        let score = (clamped * 1000.0).round() / 1000.0 + 0.0;
        Sentiment {
            label: SentimentLabel::from_score(score),
            score,
        }
    }
}

/// Trait for text polarity engines. Implementations must be deterministic
/// for a given text and return a value in [-1.0, 1.0].
pub trait PolarityEngine: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Polarity of a non-empty text.
    fn polarity(&self, text: &str) -> Result<f64>;
}

/// Capability object: an optional engine plus the classification rules.
pub struct SentimentClassifier {
    engine: Option<Box<dyn PolarityEngine>>,
}

impl SentimentClassifier {
    pub fn new(engine: Box<dyn PolarityEngine>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    /// A classifier with no engine; every text classifies as neutral/0.0.
    pub fn disabled() -> Self {
        Self { engine: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.as_ref().map_or("disabled", |e| e.name())
    }

    /// Classify a text. Never fails: empty text, a disabled engine, engine
    /// errors and non-finite scores all degrade to `Sentiment::NEUTRAL`.
    pub fn classify(&self, text: &str) -> Sentiment {
        let Some(engine) = self.engine.as_ref() else {
            return Sentiment::NEUTRAL;
        };
        if text.trim().is_empty() {
            return Sentiment::NEUTRAL;
        }

        match engine.polarity(text) {
            Ok(polarity) if polarity.is_finite() => Sentiment::from_polarity(polarity),
            Ok(polarity) => {
                warn!(engine = engine.name(), polarity, "Non-finite polarity, using neutral");
                Sentiment::NEUTRAL
            }
            Err(e) => {
                warn!(engine = engine.name(), error = %e, "Sentiment analysis failed, using neutral");
                Sentiment::NEUTRAL
            }
        }
    }
}

impl fmt::Debug for SentimentClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentClassifier")
            .field("engine", &self.engine_name())
            .finish()
    }
}
