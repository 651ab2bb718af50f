// Built-in lexicon polarity engine.
//
// Each known word carries a polarity in [-1, 1]. Intensifiers in the two
// preceding tokens scale a word ("very good"), a negation in the three
// preceding tokens flips and dampens it ("not good" -> -0.5 * good). The text
// polarity is the mean over the scored words, so long neutral passages don't
// dilute a single strong opinion.

use std::collections::HashMap;

use anyhow::Result;

use super::traits::PolarityEngine;

const NEGATION_FACTOR: f64 = -0.5;
const NEGATION_WINDOW: usize = 3;
const INTENSIFIER_WINDOW: usize = 2;

const WORDS: &[(&str, f64)] = &[
    // positive
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("wonderful", 1.0),
    ("fantastic", 0.4),
    ("love", 0.5),
    ("loved", 0.7),
    ("loving", 0.6),
    ("lovely", 0.5),
    ("best", 1.0),
    ("better", 0.5),
    ("happy", 0.8),
    ("glad", 0.5),
    ("excited", 0.375),
    ("exciting", 0.3),
    ("proud", 0.8),
    ("grateful", 0.6),
    ("thankful", 0.6),
    ("thanks", 0.2),
    ("congratulations", 0.6),
    ("congrats", 0.6),
    ("success", 0.3),
    ("successful", 0.75),
    ("nice", 0.6),
    ("beautiful", 0.85),
    ("brilliant", 0.9),
    ("perfect", 1.0),
    ("impressive", 1.0),
    ("incredible", 0.9),
    ("outstanding", 0.5),
    ("innovative", 0.5),
    ("inspiring", 0.5),
    ("delighted", 0.7),
    ("pleased", 0.5),
    ("enjoy", 0.4),
    ("enjoyed", 0.4),
    ("fun", 0.3),
    ("win", 0.8),
    ("winning", 0.5),
    ("helpful", 0.5),
    ("useful", 0.3),
    ("easy", 0.43),
    ("reliable", 0.5),
    ("recommend", 0.3),
    ("recommended", 0.3),
    ("positive", 0.23),
    ("strong", 0.43),
    ("growth", 0.3),
    ("opportunity", 0.3),
    ("smart", 0.2),
    ("superb", 1.0),
    ("favorite", 0.5),
    ("favourite", 0.5),
    ("celebrate", 0.5),
    ("thrilled", 0.6),
    ("honored", 0.5),
    ("honoured", 0.5),
    ("welcome", 0.8),
    ("remarkable", 0.75),
    ("valuable", 0.3),
    ("effective", 0.6),
    ("efficient", 0.3),
    ("fast", 0.2),
    ("fresh", 0.3),
    ("clean", 0.37),
    ("affordable", 0.3),
    ("satisfied", 0.5),
    ("quality", 0.2),
    // negative
    ("bad", -0.7),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("worst", -1.0),
    ("worse", -0.4),
    ("poor", -0.4),
    ("hate", -0.8),
    ("hated", -0.9),
    ("disappointing", -0.6),
    ("disappointed", -0.75),
    ("sad", -0.5),
    ("angry", -0.5),
    ("annoyed", -0.4),
    ("annoying", -0.6),
    ("frustrated", -0.7),
    ("frustrating", -0.6),
    ("problem", -0.2),
    ("problems", -0.2),
    ("issue", -0.1),
    ("issues", -0.1),
    ("broken", -0.4),
    ("fail", -0.5),
    ("failed", -0.5),
    ("failure", -0.3),
    ("useless", -0.5),
    ("waste", -0.2),
    ("scam", -0.8),
    ("fraud", -0.5),
    ("fake", -0.5),
    ("slow", -0.3),
    ("difficult", -0.5),
    ("expensive", -0.5),
    ("overpriced", -0.5),
    ("wrong", -0.5),
    ("stupid", -0.8),
    ("ugly", -0.7),
    ("boring", -1.0),
    ("unhappy", -0.6),
    ("pathetic", -1.0),
    ("mediocre", -0.5),
    ("defective", -0.6),
    ("faulty", -0.5),
    ("delayed", -0.2),
    ("crash", -0.3),
    ("error", -0.3),
    ("complaint", -0.3),
    ("rude", -0.6),
    ("unacceptable", -0.6),
    ("dangerous", -0.6),
    ("nightmare", -0.8),
    ("regret", -0.5),
    ("sorry", -0.5),
    ("worried", -0.5),
    ("loss", -0.3),
    ("damaged", -0.5),
    ("worthless", -0.8),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.4),
    ("highly", 1.3),
    ("super", 1.3),
    ("so", 1.2),
    ("quite", 1.1),
    ("somewhat", 0.7),
    ("slightly", 0.5),
    ("barely", 0.4),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "nothing", "neither", "nor", "without", "hardly"];

// Apostrophe-less spellings common in posts.
const CONTRACTED_NEGATIONS: &[&str] = &[
    "dont", "doesnt", "didnt", "isnt", "wasnt", "cant", "wont", "arent", "werent", "couldnt",
    "shouldnt", "wouldnt",
];

/// Lexicon-backed polarity engine. Cheap to construct; holds its tables in maps.
pub struct LexiconEngine {
    words: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconEngine {
    fn default() -> Self {
        Self {
            words: WORDS.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }
}

impl LexiconEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_negation(token: &str) -> bool {
        NEGATIONS.contains(&token) || CONTRACTED_NEGATIONS.contains(&token) || token.ends_with("n't")
    }
}

impl PolarityEngine for LexiconEngine {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn polarity(&self, text: &str) -> Result<f64> {
        let tokens = tokenize(text);
        let mut total = 0.0;
        let mut scored = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.words.get(token.as_str()) else {
                continue;
            };
            let mut value = base;

            let intensity_start = i.saturating_sub(INTENSIFIER_WINDOW);
            for prev in &tokens[intensity_start..i] {
                if let Some(factor) = self.intensifiers.get(prev.as_str()) {
                    value *= factor;
                }
            }

            let negation_start = i.saturating_sub(NEGATION_WINDOW);
            if tokens[negation_start..i].iter().any(|t| Self::is_negation(t)) {
                value *= NEGATION_FACTOR;
            }

            total += value.clamp(-1.0, 1.0);
            scored += 1;
        }

        if scored == 0 {
            return Ok(0.0);
        }
        Ok((total / scored as f64).clamp(-1.0, 1.0))
    }
}

/// Lowercased word tokens; apostrophes stay inside words so "don't" survives.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn praise_is_positive() {
        let engine = LexiconEngine::new();
        let p = engine.polarity("This is a great product and I love it").unwrap();
        assert!(p > 0.1, "got {p}");
    }

    #[test]
    fn complaints_are_negative() {
        let engine = LexiconEngine::new();
        let p = engine.polarity("Terrible service, awful experience").unwrap();
        assert!(p < -0.1, "got {p}");
    }

    #[test]
    fn plain_statements_are_zero() {
        let engine = LexiconEngine::new();
        assert_eq!(engine.polarity("The meeting moved to Tuesday").unwrap(), 0.0);
    }

    #[test]
    fn negation_flips_and_dampens() {
        let engine = LexiconEngine::new();
        let p = engine.polarity("this is not good").unwrap();
        assert!((p - (-0.35)).abs() < 1e-9, "got {p}");
        let q = engine.polarity("it doesn't work well, not great").unwrap();
        assert!(q < 0.0, "got {q}");
    }

    #[test]
    fn intensifiers_scale_but_stay_in_range() {
        let engine = LexiconEngine::new();
        let plain = engine.polarity("good").unwrap();
        let boosted = engine.polarity("very good").unwrap();
        assert!(boosted > plain);
        assert!(engine.polarity("extremely excellent").unwrap() <= 1.0);
    }
}
