//! Profile and citation crawling.
//!
//! The crawl is strictly sequential. A fixed delay is slept before every
//! navigation or click that loads new content; readiness is then decided by
//! polling the page HTML until the expected elements show up.

use crate::browser::{BrowserSession, PageProvider};
use crate::error::{Result, ScholarError};
use crate::extract::{
    self, control_state, count_matches, CitingEntry, ControlState, AUTHOR_PROFILE, CITING_RESULTS, NEXT_PAGE,
    PAPER_ROW, PAPER_TABLE, SHOW_MORE,
};
use crate::records::{sort_descending, Author, Citation, Paper};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Default Google Scholar profile to crawl
pub const DEFAULT_PROFILE_URL: &str = "https://scholar.google.com/citations?user=BINSaTEAAAAJ";

/// Timing options for a crawl
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Sleep before each request that loads content. Raise it on slow links.
    pub delay: Duration,
    /// Upper bound on waiting for a page to reach the expected state
    pub wait_timeout: Duration,
    /// How often the page is re-read while waiting
    pub poll_interval: Duration,
    /// Cap on "show more" clicks on the profile
    pub max_expand_clicks: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            wait_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
            max_expand_clicks: 50,
        }
    }
}

/// Drives browser sessions from a [`PageProvider`].
pub struct Crawler<P> {
    provider: P,
    options: CrawlOptions,
}

impl<P: PageProvider> Crawler<P> {
    pub fn new(provider: P, options: CrawlOptions) -> Self {
        Self { provider, options }
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Load a profile, expand it fully and extract every listed paper.
    ///
    /// The returned papers have empty `citation_details`.
    pub async fn crawl_profile(&self, url: &str) -> Result<Vec<Paper>> {
        info!(url = %url, "Crawling profile");
        let session = self.provider.open().await?;
        let result = self.profile_in(session.as_ref(), url).await;
        close_quietly(session).await;
        result
    }

    async fn profile_in(&self, session: &dyn BrowserSession, url: &str) -> Result<Vec<Paper>> {
        self.load(session, url, PAPER_TABLE).await?;
        self.expand_profile(session).await?;

        let html = session.content().await?;
        let page_url = session.current_url().await?;
        let papers = extract::profile_papers(&html, &page_url)?;
        info!(count = papers.len(), "Loaded papers from profile");
        Ok(papers)
    }

    /// Click "show more" until the control disappears or is disabled.
    async fn expand_profile(&self, session: &dyn BrowserSession) -> Result<()> {
        for clicks in 0..self.options.max_expand_clicks {
            let html = session.content().await?;
            match control_state(&html, SHOW_MORE)? {
                ControlState::Absent => {
                    if clicks == 0 {
                        info!("Show more button not found, using rows already on the page");
                    }
                    return Ok(());
                }
                ControlState::Disabled => {
                    debug!(clicks, "Profile fully expanded");
                    return Ok(());
                }
                ControlState::Enabled => {}
            }

            let rows = count_matches(&html, PAPER_ROW)?;
            debug!(rows, "Expanding profile");
            self.pace().await;
            session.click(SHOW_MORE).await?;
            self.wait_until(session, "more profile rows", |html| {
                Ok(count_matches(html, PAPER_ROW)? > rows || control_state(html, SHOW_MORE)? != ControlState::Enabled)
            })
            .await?;
        }

        warn!(max = self.options.max_expand_clicks, "Stopped expanding profile at click limit");
        Ok(())
    }

    /// Fill `paper.citation_details` from its "cited by" listing.
    ///
    /// Papers without a citation link are left untouched.
    pub async fn crawl_citations(&self, paper: &mut Paper) -> Result<()> {
        let Some(url) = paper.citation_url.clone() else {
            debug!(title = %paper.title, "No citation link, skipping");
            return Ok(());
        };

        info!(title = %paper.title, "Crawling citing works");
        let session = self.provider.open().await?;
        let entries = self.citing_list_in(session.as_ref(), &url).await;
        close_quietly(session).await;
        let entries = entries?;

        let mut details = Vec::with_capacity(entries.len());
        for entry in entries {
            details.push(self.resolve_citation(entry).await?);
        }
        sort_descending(&mut details);

        info!(title = %paper.title, count = details.len(), "Collected citing works");
        paper.citation_details = details;
        Ok(())
    }

    /// Walk every page of a citing-works listing.
    async fn citing_list_in(&self, session: &dyn BrowserSession, url: &str) -> Result<Vec<CitingEntry>> {
        let mut html = self.load(session, url, CITING_RESULTS).await?;
        let mut entries = extract::citing_entries(&html, &session.current_url().await?)?;
        let mut page = 1;
        debug!(page, count = entries.len(), "Loaded citing works");

        loop {
            match control_state(&html, NEXT_PAGE)? {
                ControlState::Absent => {
                    debug!(page, "No next button, last page reached");
                    break;
                }
                ControlState::Disabled => {
                    debug!(page, "Next button disabled, last page reached");
                    break;
                }
                ControlState::Enabled => {}
            }

            self.pace().await;
            session.click(NEXT_PAGE).await?;
            let previous = std::mem::take(&mut html);
            html = self
                .wait_until(session, "next citation page", |h| {
                    Ok(h != previous && count_matches(h, CITING_RESULTS)? > 0)
                })
                .await?;

            page += 1;
            let more = extract::citing_entries(&html, &session.current_url().await?)?;
            debug!(page, count = more.len(), "Loaded citing works");
            entries.extend(more);
        }

        Ok(entries)
    }

    /// Look up every linked author of a citing work in one fresh session.
    async fn resolve_citation(&self, entry: CitingEntry) -> Result<Citation> {
        let mut authors = if entry.author_urls.is_empty() {
            Vec::new()
        } else {
            let session = self.provider.open().await?;
            let authors = self.authors_in(session.as_ref(), &entry.author_urls).await;
            close_quietly(session).await;
            authors?
        };
        sort_descending(&mut authors);

        Ok(Citation {
            title: entry.title,
            info: entry.info,
            citation: entry.citation,
            authors,
        })
    }

    async fn authors_in(&self, session: &dyn BrowserSession, urls: &[String]) -> Result<Vec<Author>> {
        let mut authors = Vec::with_capacity(urls.len());
        for url in urls {
            authors.push(self.fetch_author(session, url).await?);
        }
        Ok(authors)
    }

    /// Open an author profile in `session` and read its header.
    pub async fn fetch_author(&self, session: &dyn BrowserSession, url: &str) -> Result<Author> {
        let html = self.load(session, url, AUTHOR_PROFILE).await?;
        let author = extract::author_profile(&html)?;
        debug!(name = %author.name, citation = author.citation, "Loaded author");
        Ok(author)
    }

    /// Navigate and wait until `ready` matches something on the page.
    async fn load(&self, session: &dyn BrowserSession, url: &str, ready: &str) -> Result<String> {
        self.pace().await;
        debug!(url = %url, "Navigating");
        session.goto(url).await?;
        self.wait_until(session, ready, |html| Ok(count_matches(html, ready)? > 0))
            .await
    }

    /// Poll the page until `ready` holds, returning the HTML that satisfied it.
    async fn wait_until<F>(&self, session: &dyn BrowserSession, what: &str, ready: F) -> Result<String>
    where
        F: Fn(&str) -> Result<bool>,
    {
        let deadline = Instant::now() + self.options.wait_timeout;
        loop {
            let html = session.content().await?;
            if extract::is_blocked(&html)? {
                warn!(waiting_for = what, "CAPTCHA detected");
                return Err(ScholarError::Captcha);
            }
            if ready(&html)? {
                return Ok(html);
            }
            if Instant::now() >= deadline {
                return Err(ScholarError::Timeout {
                    what: what.to_string(),
                    secs: self.options.wait_timeout.as_secs(),
                });
            }
            sleep(self.options.poll_interval).await;
        }
    }

    async fn pace(&self) {
        if !self.options.delay.is_zero() {
            debug!(secs = self.options.delay.as_secs_f64(), "Sleeping before request");
            sleep(self.options.delay).await;
        }
    }
}

async fn close_quietly(session: Box<dyn BrowserSession>) {
    if let Err(e) = session.close().await {
        warn!(error = %e, "Failed to close browser session");
    }
}
