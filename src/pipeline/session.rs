// Session bootstrap: replay exported cookies into the browser and confirm the
// platform sees us as logged in before any scraping starts.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::browser::{Browser, Cookie};

/// Element only rendered for signed-in users.
pub const LOGIN_MARKER: &str = "#global-nav";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("not logged in: `{selector}` did not appear within {}s (are the cookies current?)", timeout.as_secs())]
    NotAuthenticated { selector: String, timeout: Duration },
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub home_url: String,
    pub login_selector: String,
    /// Pause after the first home page load, before cookies go in.
    pub home_settle: Duration,
    pub login_timeout: Duration,
}

impl SessionOptions {
    pub fn new(home_url: impl Into<String>, login_timeout: Duration) -> Self {
        Self {
            home_url: home_url.into(),
            login_selector: LOGIN_MARKER.to_string(),
            home_settle: Duration::from_secs(2),
            login_timeout,
        }
    }
}

/// Load the home page, install `cookies`, reload, and wait for the login
/// marker. On any failure the browser is closed before the error is returned.
pub async fn bootstrap(browser: &mut dyn Browser, cookies: &[Cookie], opts: &SessionOptions) -> Result<()> {
    let result = log_in(browser, cookies, opts).await;
    if result.is_err() {
        close_quietly(browser).await;
    }
    result
}

async fn log_in(browser: &mut dyn Browser, cookies: &[Cookie], opts: &SessionOptions) -> Result<()> {
    browser
        .navigate(&opts.home_url)
        .await
        .context("Failed to load the home page")?;
    tokio::time::sleep(opts.home_settle).await;

    let mut installed = 0usize;
    for cookie in cookies {
        match browser.add_cookie(cookie).await {
            Ok(()) => installed += 1,
            Err(e) => warn!(cookie = %cookie.name, error = %e, "Failed to install cookie"),
        }
    }
    info!(installed, total = cookies.len(), "Cookies installed");

    browser.refresh().await.context("Failed to reload after installing cookies")?;

    let confirmed = browser
        .wait_for_element(&opts.login_selector, opts.login_timeout)
        .await
        .context("Login confirmation failed")?;
    if !confirmed {
        return Err(SessionError::NotAuthenticated {
            selector: opts.login_selector.clone(),
            timeout: opts.login_timeout,
        }
        .into());
    }

    info!("Login confirmed");
    Ok(())
}

/// Navigate to the search results page and give it time to render.
pub async fn open_search(browser: &mut dyn Browser, url: &str, settle: Duration) -> Result<()> {
    info!(url, "Opening search results");
    browser.navigate(url).await?;
    tokio::time::sleep(settle).await;
    Ok(())
}

async fn close_quietly(browser: &mut dyn Browser) {
    if let Err(e) = browser.close().await {
        warn!(error = %e, "Failed to close browser");
    }
}
