//! scholar-citations - rank the works citing a Google Scholar profile
//!
//! ## Usage
//!
//! ```bash
//! scholar-citations crawl --url "https://scholar.google.com/citations?user=XXXX" --output ./out
//! scholar-citations cookies import < cookies.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scholar_citations::browser::{BrowserOptions, ChromiumProvider};
use scholar_citations::cookies::CookieManager;
use scholar_citations::crawler::{CrawlOptions, Crawler, DEFAULT_PROFILE_URL};
use scholar_citations::pipeline;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Rank the works citing a Google Scholar profile
#[derive(Parser)]
#[command(name = "scholar-citations")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl a profile and write per-paper and leaderboard JSON files
    Crawl {
        /// Scholar profile URL
        #[arg(long, default_value = DEFAULT_PROFILE_URL)]
        url: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Seconds to sleep before each page load or click (raise on slow connections)
        #[arg(long, default_value = "2")]
        sleep_secs: u64,

        /// Seconds to wait for a page to show its content
        #[arg(long, default_value = "30")]
        wait_timeout_secs: u64,

        /// Show the browser window
        #[arg(long)]
        headful: bool,

        /// Chrome/Chromium binary (autodetected by default)
        #[arg(long)]
        chrome: Option<PathBuf>,

        /// Only process the first N papers of the profile
        #[arg(long)]
        limit: Option<usize>,

        /// Cookie file (default: ~/.gscholar_cookies.json)
        #[arg(long)]
        cookies: Option<PathBuf>,
    },

    /// Manage cookies
    Cookies {
        #[command(subcommand)]
        action: CookieAction,
    },
}

#[derive(Subcommand)]
enum CookieAction {
    /// Clear stored cookies
    Clear,
    /// Show cookie file path
    Path,
    /// Read a JSON cookie array from stdin and store it
    Import,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    match cli.command {
        Commands::Crawl {
            url,
            output,
            sleep_secs,
            wait_timeout_secs,
            headful,
            chrome,
            limit,
            cookies,
        } => {
            let options = CrawlOptions {
                delay: Duration::from_secs(sleep_secs),
                wait_timeout: Duration::from_secs(wait_timeout_secs),
                ..Default::default()
            };
            let browser = BrowserOptions {
                headless: !headful,
                chrome_path: chrome,
                ..Default::default()
            };
            run_crawl(url, output, options, browser, limit, cookies).await
        }
        Commands::Cookies { action } => handle_cookies(action),
    }
}

// ============================================================================
// Crawl
// ============================================================================

async fn run_crawl(
    url: String,
    output_dir: PathBuf,
    options: CrawlOptions,
    browser: BrowserOptions,
    limit: Option<usize>,
    cookie_file: Option<PathBuf>,
) -> Result<()> {
    std::fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

    let manager = cookie_file.map(CookieManager::with_path).unwrap_or_default();
    let cookies = manager.load();
    if cookies.is_empty() {
        warn!("No cookies loaded. Run 'scholar-citations cookies import' if Scholar asks for a CAPTCHA.");
    }

    info!(
        url = %url,
        output = %output_dir.display(),
        sleep_secs = options.delay.as_secs(),
        "Starting crawl"
    );

    let crawler = Crawler::new(ChromiumProvider::new(browser, cookies), options);
    let summary = pipeline::run(&crawler, &url, &output_dir, limit)
        .await
        .context("Crawl failed")?;

    println!(
        "\n✓ {} papers, {} citing works. Results in: {}",
        summary.papers,
        summary.citing_works,
        output_dir.display()
    );
    Ok(())
}

// ============================================================================
// Cookie Management
// ============================================================================

fn handle_cookies(action: CookieAction) -> Result<()> {
    let manager = CookieManager::new()?;

    match action {
        CookieAction::Clear => {
            manager.clear()?;
            println!("Cookies cleared.");
        }
        CookieAction::Path => {
            println!("Cookie file: {:?}", manager.path());
        }
        CookieAction::Import => {
            println!("Paste cookies as JSON, then close stdin (Ctrl-D):");
            println!("Format: [{{\"name\":\"NID\",\"value\":\"xxx\",\"domain\":\".google.com\"}},...]");

            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            let count = manager
                .import(input.trim())
                .context("Cookies must be a JSON array")?;
            println!("Successfully saved {} cookies to {:?}", count, manager.path());
        }
    }

    Ok(())
}
