//! Saved Google Scholar cookies.
//!
//! Cookies exported from a browser where a CAPTCHA was already solved are
//! injected into every crawl session, which keeps Scholar from serving the
//! unusual-traffic page on the first request.

use crate::error::{Result, ScholarError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Default cookie file path: `~/.gscholar_cookies.json`
fn default_cookie_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".gscholar_cookies.json"))
        .ok_or_else(|| ScholarError::Config("Cannot determine home directory".to_string()))
}

/// Cookie entry in the browser export format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, alias = "httpOnly")]
    pub http_only: bool,
    #[serde(default)]
    pub expires: Option<f64>,
}

/// Loads and saves the cookie file
pub struct CookieManager {
    path: PathBuf,
}

impl CookieManager {
    /// Cookie manager for the default path
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: default_cookie_path()?,
        })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load cookies from file.
    ///
    /// A missing or unreadable file means no cookies.
    pub fn load(&self) -> Vec<Cookie> {
        if !self.path.exists() {
            debug!("Cookie file not found: {:?}", self.path);
            return Vec::new();
        }

        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<Vec<Cookie>>(&content) {
                Ok(cookies) => {
                    info!("Loaded {} cookies from {:?}", cookies.len(), self.path);
                    cookies
                }
                Err(e) => {
                    warn!("Failed to parse cookies: {}", e);
                    Vec::new()
                }
            },
            Err(e) => {
                warn!("Failed to read cookie file: {}", e);
                Vec::new()
            }
        }
    }

    /// Parse a JSON cookie array and save it, returning how many were stored.
    pub fn import(&self, json: &str) -> Result<usize> {
        let cookies: Vec<Cookie> = serde_json::from_str(json)?;
        self.save(&cookies)?;
        Ok(cookies.len())
    }

    pub fn save(&self, cookies: &[Cookie]) -> Result<()> {
        let content = serde_json::to_string_pretty(cookies)?;
        std::fs::write(&self.path, content)?;
        info!("Saved {} cookies to {:?}", cookies.len(), self.path);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            info!("Cleared cookies at {:?}", self.path);
        }
        Ok(())
    }
}

impl Default for CookieManager {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            path: PathBuf::from(".gscholar_cookies.json"),
        })
    }
}
