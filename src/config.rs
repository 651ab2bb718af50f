use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::extract::NameDedup;
use crate::pipeline::IngestLimits;
use crate::sentiment::SentimentBackend;

pub const DEFAULT_HOME_URL: &str = "https://www.linkedin.com/";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. CLI flags
/// override individual values after loading.
#[derive(Debug, Clone)]
pub struct Config {
    /// CSV store path (FEEDSIFT_STORE).
    pub store_path: PathBuf,
    /// Search results page to collect from. Required for live runs.
    pub search_url: Option<String>,
    /// Page loaded first so cookies can be installed for the domain.
    pub home_url: String,
    /// Netscape-format cookie export.
    pub cookies_path: PathBuf,
    pub webdriver_url: String,
    pub limits: IngestLimits,
    /// Wait after each scroll.
    pub settle: Duration,
    /// Wait after navigating to the search page.
    pub nav_settle: Duration,
    pub login_timeout: Duration,
    pub sentiment: SentimentBackend,
    pub name_dedup: NameDedup,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the search URL. Values that are set
    /// but don't parse are errors rather than silently defaulted.
    pub fn load() -> Result<Self> {
        let defaults = IngestLimits::default();

        Ok(Self {
            store_path: env::var("FEEDSIFT_STORE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./posts.csv")),
            search_url: env::var("FEEDSIFT_SEARCH_URL")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            home_url: env::var("FEEDSIFT_HOME_URL").unwrap_or_else(|_| DEFAULT_HOME_URL.to_string()),
            cookies_path: env::var("FEEDSIFT_COOKIES")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./cookies.txt")),
            webdriver_url: env::var("FEEDSIFT_WEBDRIVER_URL")
                .unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string()),
            limits: IngestLimits {
                max_posts: env_parse("FEEDSIFT_MAX_POSTS", defaults.max_posts)?,
                max_scrolls: env_parse("FEEDSIFT_MAX_SCROLLS", defaults.max_scrolls)?,
                max_stagnant: env_parse("FEEDSIFT_MAX_STAGNANT", defaults.max_stagnant)?,
            },
            settle: env_secs("FEEDSIFT_SETTLE_SECS", 4.0)?,
            nav_settle: env_secs("FEEDSIFT_NAV_SETTLE_SECS", 5.0)?,
            login_timeout: env_secs("FEEDSIFT_LOGIN_TIMEOUT_SECS", 20.0)?,
            sentiment: env_parse("FEEDSIFT_SENTIMENT", SentimentBackend::default())?,
            name_dedup: env_parse("FEEDSIFT_NAME_DEDUP", NameDedup::default())?,
        })
    }

    /// Check that a search URL is configured.
    /// Call this before any live collection run.
    pub fn require_search_url(&self) -> Result<&str> {
        self.search_url.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "FEEDSIFT_SEARCH_URL not set. Add it to your .env file or pass --url.\n\
                 It should be a search results page, e.g. https://www.linkedin.com/search/results/content/?keywords=rust"
            )
        })
    }

    /// Check that the cookie file exists.
    pub fn require_cookies(&self) -> Result<()> {
        if !self.cookies_path.is_file() {
            anyhow::bail!(
                "Cookie file not found at {}\n\
                 Export your browser cookies in Netscape format and set FEEDSIFT_COOKIES.",
                self.cookies_path.display()
            );
        }
        Ok(())
    }
}

/// Parse an optional env var, falling back to `default` when unset or blank.
fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(name, &raw),
        _ => Ok(default),
    }
}

/// A duration in (possibly fractional) seconds.
fn env_secs(name: &str, default: f64) -> Result<Duration> {
    non_negative_secs(name, env_parse(name, default)?)
}

pub fn non_negative_secs(name: &str, secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        anyhow::bail!("Invalid value for {name}: {secs} (expected a non-negative number of seconds)");
    }
    Ok(Duration::from_secs_f64(secs))
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Invalid value for {name}: '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_reports_the_variable() {
        let err = parse_value::<usize>("FEEDSIFT_MAX_POSTS", "lots").unwrap_err();
        assert!(err.to_string().contains("FEEDSIFT_MAX_POSTS"));
        assert_eq!(parse_value::<usize>("X", " 12 ").unwrap(), 12);
        assert_eq!(parse_value::<NameDedup>("X", "strict").unwrap(), NameDedup::Strict);
    }

    #[test]
    fn durations_must_be_non_negative() {
        assert!(non_negative_secs("X", -1.0).is_err());
        assert!(non_negative_secs("X", f64::NAN).is_err());
        assert_eq!(non_negative_secs("X", 0.5).unwrap(), Duration::from_millis(500));
    }
}
