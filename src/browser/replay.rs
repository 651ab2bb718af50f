// Offline browser backed by captured page snapshots.
//
// Snapshots are `.html` files served in file-name order. Every `execute`
// (a pagination trigger) advances to the next snapshot; once the last one is
// reached it keeps being served, which is what a feed that has stopped
// loading looks like.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, info};

use super::cookies::Cookie;
use super::traits::Browser;

#[derive(Debug, Clone, Default)]
pub struct ReplayBrowser {
    snapshots: Vec<String>,
    position: usize,
    current_url: Option<String>,
    cookies: Vec<Cookie>,
    closed: bool,
}

impl ReplayBrowser {
    pub fn new(snapshots: Vec<String>) -> Self {
        Self {
            snapshots,
            ..Default::default()
        }
    }

    /// Load every `.html` file in `dir`, sorted by file name.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read snapshot directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            anyhow::bail!("No .html snapshots found in {}", dir.display());
        }

        let snapshots = paths
            .iter()
            .map(|p| {
                std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read snapshot {}", p.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(snapshots = snapshots.len(), dir = %dir.display(), "Loaded replay snapshots");
        Ok(Self::new(snapshots))
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Index of the snapshot currently served.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            anyhow::bail!("replay browser is closed");
        }
        Ok(())
    }

    fn current(&self) -> &str {
        self.snapshots
            .get(self.position)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[async_trait]
impl Browser for ReplayBrowser {
    fn name(&self) -> &'static str {
        "replay"
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.ensure_open()?;
        debug!(url, "Replay navigate");
        self.current_url = Some(url.to_string());
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        self.ensure_open()
    }

    async fn page_source(&mut self) -> Result<String> {
        self.ensure_open()?;
        Ok(self.current().to_string())
    }

    async fn execute(&mut self, _script: &str) -> Result<()> {
        self.ensure_open()?;
        if self.position + 1 < self.snapshots.len() {
            self.position += 1;
        }
        Ok(())
    }

    async fn add_cookie(&mut self, cookie: &Cookie) -> Result<()> {
        self.ensure_open()?;
        self.cookies.push(cookie.clone());
        Ok(())
    }

    async fn wait_for_element(&mut self, css: &str, _timeout: Duration) -> Result<bool> {
        self.ensure_open()?;
        contains_selector(self.current(), css)
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

fn contains_selector(html: &str, css: &str) -> Result<bool> {
    let selector =
        Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid selector '{css}': {e:?}"))?;
    Ok(Html::parse_document(html).select(&selector).next().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_snapshot_repeats() {
        let mut browser = ReplayBrowser::new(vec!["<p>a</p>".into(), "<p>b</p>".into()]);
        assert!(browser.page_source().await.unwrap().contains('a'));
        browser.execute("scroll").await.unwrap();
        browser.execute("scroll").await.unwrap();
        assert_eq!(browser.position(), 1);
        assert!(browser.page_source().await.unwrap().contains('b'));
    }

    #[tokio::test]
    async fn wait_checks_the_current_snapshot() {
        let mut browser = ReplayBrowser::new(vec![r#"<nav id="global-nav"></nav>"#.into()]);
        assert!(browser
            .wait_for_element("#global-nav", Duration::ZERO)
            .await
            .unwrap());
        assert!(!browser
            .wait_for_element("#missing", Duration::ZERO)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn closed_browser_refuses_work() {
        let mut browser = ReplayBrowser::new(vec![String::new()]);
        browser.close().await.unwrap();
        assert!(browser.page_source().await.is_err());
    }
}
