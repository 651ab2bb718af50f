// Small parsers for the noisy strings the feed renders: abbreviated counts
// ("1.2K reactions"), doubled accessible names ("Jane Doe Jane Doe") and
// activity URNs buried in links.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Convert an abbreviated count token ("42", "1,204", "2.5K", "3M") to an integer.
///
/// Suffixed values are scaled in decimal, so "2.3K" is exactly 2300; digits
/// below one unit are dropped. Anything that doesn't parse yields 0.
pub fn parse_abbreviated_count(token: &str) -> u64 {
    let cleaned: String = token
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .collect::<String>()
        .to_uppercase();

    let (number, exponent) = if let Some(prefix) = cleaned.strip_suffix('K') {
        (prefix, 3)
    } else if let Some(prefix) = cleaned.strip_suffix('M') {
        (prefix, 6)
    } else {
        (cleaned.as_str(), 0)
    };

    scale_decimal(number.trim(), exponent).unwrap_or(0)
}

/// `number * 10^exponent` for a plain decimal string, truncated.
fn scale_decimal(number: &str, exponent: u32) -> Option<u64> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole_value = if whole.is_empty() { 0 } else { whole.parse::<u64>().ok()? };
    let kept = &fraction[..fraction.len().min(exponent as usize)];
    let fraction_value = if kept.is_empty() {
        0
    } else {
        kept.parse::<u64>().ok()? * 10u64.pow(exponent - kept.len() as u32)
    };

    whole_value.checked_mul(10u64.pow(exponent))?.checked_add(fraction_value)
}

/// Leading whitespace-delimited token of an accessible label, parsed as a count.
/// "1,204 reactions" -> 1204, "Like" -> 0.
pub fn count_from_label(label: &str) -> u64 {
    label
        .split_whitespace()
        .next()
        .map(parse_abbreviated_count)
        .unwrap_or(0)
}

/// How doubled author names and titles are collapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameDedup {
    /// Keep the first floor(n/2) tokens whenever there are at least two.
    #[default]
    Halve,
    /// Halve only when both halves are the same token sequence.
    Strict,
    /// Leave the text as rendered.
    Off,
}

impl NameDedup {
    /// Apply the rule to a raw rendered string.
    pub fn apply(self, raw: &str) -> String {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.len() < 2 {
            return raw.to_string();
        }
        let mid = tokens.len() / 2;
        match self {
            NameDedup::Halve => tokens[..mid].join(" "),
            NameDedup::Strict if tokens.len() % 2 == 0 && tokens[..mid] == tokens[mid..] => {
                tokens[..mid].join(" ")
            }
            NameDedup::Strict | NameDedup::Off => raw.to_string(),
        }
    }
}

impl FromStr for NameDedup {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "halve" => Ok(NameDedup::Halve),
            "strict" => Ok(NameDedup::Strict),
            "off" | "none" => Ok(NameDedup::Off),
            other => anyhow::bail!("unknown name dedup mode '{other}' (expected halve, strict or off)"),
        }
    }
}

/// The id following the last `marker` occurrence, cut at the first path,
/// query or fragment separator. `None` if the marker is absent or nothing follows it.
pub fn id_after_marker(value: &str, marker: &str) -> Option<String> {
    let (_, rest) = value.rsplit_once(marker)?;
    let id = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
