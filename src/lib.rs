//! # scholar-citations
//!
//! Google Scholar profile citation crawler.
//!
//! Loads a Scholar profile in a real browser, follows every paper's
//! "cited by" listing, looks up the authors of each citing work and ranks
//! citing works and their authors by citation count.
//!
//! ## Modules
//!
//! - [`browser`] - browser capability traits, Chrome driver and test fake
//! - [`extract`] - HTML extraction for profile, listing and author pages
//! - [`crawler`] - pagination, expansion and readiness waits
//! - [`aggregate`] - deduplicated leaderboards
//! - [`output`] - JSON result files
//! - [`pipeline`] - the full run
//! - [`cookies`] - cookie persistence
//! - [`error`] - custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scholar_citations::browser::{BrowserOptions, ChromiumProvider};
//! use scholar_citations::crawler::{CrawlOptions, Crawler, DEFAULT_PROFILE_URL};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = ChromiumProvider::new(BrowserOptions::default(), Vec::new());
//!     let crawler = Crawler::new(provider, CrawlOptions::default());
//!     let summary = scholar_citations::pipeline::run(&crawler, DEFAULT_PROFILE_URL, ".".as_ref(), None).await?;
//!     println!("Ranked {} citing works", summary.citing_works);
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod browser;
pub mod cookies;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod records;

pub use error::{Result, ScholarError};
