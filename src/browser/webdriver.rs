// Live browser: headless Chrome driven over WebDriver (chromedriver).
//
// Compiled only with the `webdriver` feature. The driver session is created
// eagerly in `connect` and torn down by `close`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thirtyfour::prelude::*;
use tracing::{debug, info};

use super::cookies::Cookie;
use super::traits::Browser;

const CHROME_ARGS: &[&str] = &["--headless=new", "--no-sandbox", "--disable-dev-shm-usage"];
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct WebDriverBrowser {
    driver: Option<WebDriver>,
}

impl WebDriverBrowser {
    /// Start a Chrome session through the WebDriver server at `server_url`.
    pub async fn connect(server_url: &str) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        for arg in CHROME_ARGS {
            caps.add_arg(arg)
                .with_context(|| format!("Failed to set Chrome argument {arg}"))?;
        }
        let driver = WebDriver::new(server_url, caps)
            .await
            .with_context(|| format!("Failed to start a WebDriver session at {server_url}"))?;
        info!(server_url, "WebDriver session started");
        Ok(Self {
            driver: Some(driver),
        })
    }

    fn driver(&self) -> Result<&WebDriver> {
        self.driver
            .as_ref()
            .context("WebDriver session already closed")
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    fn name(&self) -> &'static str {
        "webdriver"
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!(url, "Navigating");
        self.driver()?
            .goto(url)
            .await
            .with_context(|| format!("Failed to load {url}"))
    }

    async fn refresh(&mut self) -> Result<()> {
        self.driver()?.refresh().await.context("Failed to refresh page")
    }

    async fn page_source(&mut self) -> Result<String> {
        self.driver()?.source().await.context("Failed to read page source")
    }

    async fn execute(&mut self, script: &str) -> Result<()> {
        self.driver()?
            .execute(script, Vec::new())
            .await
            .context("Script execution failed")?;
        Ok(())
    }

    async fn add_cookie(&mut self, cookie: &Cookie) -> Result<()> {
        let mut wd_cookie = thirtyfour::Cookie::new(cookie.name.clone(), cookie.value.clone());
        wd_cookie.domain = Some(cookie.domain.clone());
        wd_cookie.path = Some(cookie.path.clone());
        wd_cookie.secure = Some(cookie.secure);
        wd_cookie.http_only = Some(cookie.http_only);
        wd_cookie.expiry = cookie.expires;
        self.driver()?
            .add_cookie(wd_cookie)
            .await
            .with_context(|| format!("Failed to add cookie {}", cookie.name))
    }

    async fn wait_for_element(&mut self, css: &str, timeout: Duration) -> Result<bool> {
        let driver = self.driver()?;
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let found = driver
                .find_all(By::Css(css))
                .await
                .with_context(|| format!("Element lookup failed for {css}"))?;
            if !found.is_empty() {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(driver) = self.driver.take() {
            driver.quit().await.context("Failed to quit WebDriver session")?;
            info!("WebDriver session closed");
        }
        Ok(())
    }
}
