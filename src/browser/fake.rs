//! In-memory browser for tests.
//!
//! A [`FakeSite`] is a small static site: URLs map to HTML, and clicks on a
//! selector from a given URL move the session to another URL. Every session
//! open, navigation, click and close is recorded for assertions.

use super::{BrowserSession, PageProvider};
use crate::error::{Result, ScholarError};
use crate::extract::{control_state, ControlState};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Something a fake session did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeEvent {
    Open,
    Goto(String),
    Click { url: String, selector: String },
    Close,
}

/// Pages and click transitions served by a [`FakeBrowser`]
#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pages: HashMap<String, String>,
    clicks: HashMap<(String, String), String>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`.
    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    /// Clicking `selector` while on `from` moves the session to `to`.
    pub fn on_click(mut self, from: &str, selector: &str, to: &str) -> Self {
        self.clicks
            .insert((from.to_string(), selector.to_string()), to.to_string());
        self
    }

    pub fn into_browser(self) -> FakeBrowser {
        FakeBrowser {
            site: Arc::new(Site {
                pages: self.pages,
                clicks: self.clicks,
                events: Mutex::new(Vec::new()),
            }),
        }
    }
}

struct Site {
    pages: HashMap<String, String>,
    clicks: HashMap<(String, String), String>,
    events: Mutex<Vec<FakeEvent>>,
}

impl Site {
    async fn record(&self, event: FakeEvent) {
        self.events.lock().await.push(event);
    }
}

/// Canned-page provider
#[derive(Clone)]
pub struct FakeBrowser {
    site: Arc<Site>,
}

impl FakeBrowser {
    /// Everything recorded so far, in order.
    pub async fn events(&self) -> Vec<FakeEvent> {
        self.site.events.lock().await.clone()
    }

    /// Number of recorded events matching the predicate.
    pub async fn count(&self, matches: impl Fn(&FakeEvent) -> bool) -> usize {
        self.site.events.lock().await.iter().filter(|e| matches(*e)).count()
    }
}

#[async_trait]
impl PageProvider for FakeBrowser {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        self.site.record(FakeEvent::Open).await;
        Ok(Box::new(FakeSession {
            site: Arc::clone(&self.site),
            current: Mutex::new("about:blank".to_string()),
        }))
    }
}

struct FakeSession {
    site: Arc<Site>,
    current: Mutex<String>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.site.record(FakeEvent::Goto(url.to_string())).await;
        if !self.site.pages.contains_key(url) {
            return Err(ScholarError::Browser(format!("404 for {}", url)));
        }
        *self.current.lock().await = url.to_string();
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        let current = self.current.lock().await;
        Ok(self.site.pages.get(current.as_str()).cloned().unwrap_or_default())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.current.lock().await.clone())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut current = self.current.lock().await;
        self.site
            .record(FakeEvent::Click {
                url: current.clone(),
                selector: selector.to_string(),
            })
            .await;

        let html = self.site.pages.get(current.as_str()).cloned().unwrap_or_default();
        match control_state(&html, selector)? {
            ControlState::Absent => return Err(ScholarError::not_found(selector)),
            ControlState::Disabled => {
                return Err(ScholarError::Browser(format!("{} is disabled", selector)))
            }
            ControlState::Enabled => {}
        }

        let target = self
            .site
            .clicks
            .get(&(current.clone(), selector.to_string()))
            .cloned()
            .ok_or_else(|| ScholarError::Browser(format!("No click target for {} on {}", selector, current.as_str())))?;
        *current = target;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.site.record(FakeEvent::Close).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_navigation_and_clicks() -> Result<()> {
        let browser = FakeSite::new()
            .page("https://s.test/a", r#"<button id="go">go</button>"#)
            .page("https://s.test/b", "<p>b</p>")
            .on_click("https://s.test/a", "#go", "https://s.test/b")
            .into_browser();

        let session = browser.open().await?;
        session.goto("https://s.test/a").await?;
        session.click("#go").await?;
        assert_eq!(session.current_url().await?, "https://s.test/b");
        assert!(session.content().await?.contains("<p>b</p>"));
        assert!(matches!(
            session.click("#go").await,
            Err(ScholarError::ElementNotFound { .. })
        ));
        session.close().await?;

        assert_eq!(browser.count(|e| *e == FakeEvent::Open).await, 1);
        assert_eq!(browser.count(|e| *e == FakeEvent::Close).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_url_fails() -> Result<()> {
        let session = FakeSite::new().into_browser().open().await?;
        assert!(session.goto("https://s.test/missing").await.is_err());
        Ok(())
    }
}
