//! Browser capability used by the crawler.
//!
//! The crawler only ever asks a session to navigate, hand back the rendered
//! HTML, or click a control. [`chromium::ChromiumProvider`] drives a real
//! Chrome over the DevTools Protocol; [`fake::FakeBrowser`] serves canned
//! pages so crawl logic runs in tests without a browser.

pub mod chromium;
pub mod fake;

use crate::error::Result;
use async_trait::async_trait;

pub use chromium::{BrowserOptions, ChromiumProvider};
pub use fake::{FakeBrowser, FakeEvent, FakeSite};

/// One open browser window.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate to `url` and wait for the load event.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Rendered HTML of the current page.
    async fn content(&self) -> Result<String>;

    /// URL of the current page, used to resolve relative links.
    async fn current_url(&self) -> Result<String>;

    /// Click the first element matching the CSS selector.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Shut the window (and its browser process) down.
    async fn close(&self) -> Result<()>;
}

/// Factory for fresh sessions.
#[async_trait]
pub trait PageProvider: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrowserSession>>;
}
