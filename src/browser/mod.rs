// Browser collaborator: the trait the pipeline drives, cookie files, and the
// backends (snapshot replay, and live WebDriver behind a feature).

pub mod cookies;
pub mod replay;
pub mod traits;
#[cfg(feature = "webdriver")]
pub mod webdriver;

pub use cookies::{load_cookies, parse_netscape, Cookie};
pub use replay::ReplayBrowser;
pub use traits::Browser;
#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverBrowser;

/// Script that asks an infinite-scroll feed for its next page.
pub const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";
