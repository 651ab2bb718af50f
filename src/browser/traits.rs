// Browser collaborator trait.
//
// The ingestion loop and session bootstrap only ever talk to a page through
// this interface: load a URL, hand back the rendered HTML, run a script to
// paginate. Implementors: ReplayBrowser (captured snapshots on disk) and,
// behind the `webdriver` feature, WebDriverBrowser (headless Chrome).

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use super::cookies::Cookie;

#[async_trait]
pub trait Browser: Send {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Load `url` in the current tab.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Reload the current page.
    async fn refresh(&mut self) -> Result<()>;

    /// Full HTML of the page as currently rendered.
    async fn page_source(&mut self) -> Result<String>;

    /// Run a script in the page. Used to trigger infinite-scroll pagination.
    async fn execute(&mut self, script: &str) -> Result<()>;

    /// Install a cookie for the current domain.
    async fn add_cookie(&mut self, cookie: &Cookie) -> Result<()>;

    /// Wait until an element matching `css` is present. `Ok(false)` on timeout.
    async fn wait_for_element(&mut self, css: &str, timeout: Duration) -> Result<bool>;

    /// Shut the browser down. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}
