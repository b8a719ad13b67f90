//! Real browser sessions backed by chromiumoxide.
//!
//! Each [`PageProvider::open`] launches its own Chrome process with a
//! throwaway profile directory, injects saved Scholar cookies and returns a
//! single-page session. The profile directory lives as long as the session.

use super::{BrowserSession, PageProvider};
use crate::cookies::Cookie;
use crate::error::{Result, ScholarError};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Launch options for Chrome
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Chrome/Chromium binary; autodetected when `None`
    pub chrome_path: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            window_width: 1280,
            window_height: 1024,
        }
    }
}

/// Launches one Chrome per session.
pub struct ChromiumProvider {
    options: BrowserOptions,
    cookies: Vec<Cookie>,
}

impl ChromiumProvider {
    pub fn new(options: BrowserOptions, cookies: Vec<Cookie>) -> Self {
        Self { options, cookies }
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.options.window_width, self.options.window_height)
            .user_data_dir(profile_dir)
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--disable-dev-shm-usage");

        if !self.options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.options.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| ScholarError::Config(format!("Failed to build browser config: {}", e)))
    }

    fn cookie_params(&self) -> Vec<CookieParam> {
        self.cookies
            .iter()
            .filter(|c| c.domain.contains("google"))
            .filter_map(|c| {
                let mut builder = CookieParam::builder()
                    .name(c.name.clone())
                    .value(c.value.clone())
                    .domain(c.domain.clone())
                    .secure(c.secure)
                    .http_only(c.http_only);
                if !c.path.is_empty() {
                    builder = builder.path(c.path.clone());
                }
                match builder.build() {
                    Ok(param) => Some(param),
                    Err(e) => {
                        warn!(cookie = %c.name, error = %e, "Skipping malformed cookie");
                        None
                    }
                }
            })
            .collect()
    }

    async fn prepare_page(&self, browser: &Browser) -> Result<Page> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScholarError::Browser(format!("Failed to create page: {}", e)))?;

        let cookies = self.cookie_params();
        if !cookies.is_empty() {
            page.set_cookies(cookies)
                .await
                .map_err(|e| ScholarError::Browser(format!("Failed to set cookies: {}", e)))?;
        }
        Ok(page)
    }
}

#[async_trait]
impl PageProvider for ChromiumProvider {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        let profile_dir = profile_dir()?;
        let config = self.browser_config(profile_dir.path())?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScholarError::Browser(format!("Failed to launch Chrome: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler event error");
                }
            }
        });

        let page = match self.prepare_page(&browser).await {
            Ok(page) => page,
            Err(e) => {
                shutdown(&mut browser, &handler).await;
                return Err(e);
            }
        };

        debug!(profile = %profile_dir.path().display(), "Browser session opened");
        Ok(Box::new(ChromiumSession {
            browser: Mutex::new(browser),
            page,
            handler,
            _profile_dir: profile_dir,
        }))
    }
}

struct ChromiumSession {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    // Removed on drop, after the browser using it has exited.
    _profile_dir: TempDir,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScholarError::Browser(format!("Navigation to {} failed: {}", url, e)))?;
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| ScholarError::Browser(format!("Failed to read page: {}", e)))
    }

    async fn current_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| ScholarError::Browser(format!("Failed to read URL: {}", e)))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| ScholarError::not_found(selector))?;
        element
            .click()
            .await
            .map_err(|e| ScholarError::Browser(format!("Click on {} failed: {}", selector, e)))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser
            .close()
            .await
            .map_err(|e| ScholarError::Browser(format!("Failed to close browser: {}", e)));
        if closed.is_ok() {
            if let Err(e) = browser.wait().await {
                debug!(error = %e, "Waiting for Chrome to exit failed");
            }
        }
        self.handler.abort();
        closed.map(|_| ())
    }
}

/// Best-effort teardown for a session that never got handed out.
async fn shutdown(browser: &mut Browser, handler: &JoinHandle<()>) {
    if let Err(e) = browser.close().await {
        debug!(error = %e, "Closing half-opened browser failed");
    } else if let Err(e) = browser.wait().await {
        debug!(error = %e, "Waiting for Chrome to exit failed");
    }
    handler.abort();
}

fn profile_dir() -> Result<TempDir> {
    Ok(tempfile::Builder::new().prefix("scholar-citations-").tempdir()?)
}
