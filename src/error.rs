//! Custom error types for scholar-citations.
//!
//! All library functions return `Result<T, ScholarError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for crawl operations.
#[derive(Debug, Error)]
pub enum ScholarError {
    /// Browser automation error (launch, navigation, click, CDP)
    #[error("Browser error: {0}")]
    Browser(String),

    /// A selector required to build a record matched nothing
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// CSS selector that failed to match
        selector: String,
    },

    /// HTML or selector parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// A page never reached the expected state
    #[error("Timed out after {secs}s waiting for {what}")]
    Timeout {
        /// What was being waited for
        what: String,
        /// Configured wait bound
        secs: u64,
    },

    /// CAPTCHA / unusual traffic page served instead of content
    #[error("CAPTCHA detected, please refresh cookies")]
    Captcha,

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl ScholarError {
    /// Shorthand for a missing required element.
    pub fn not_found(selector: &str) -> Self {
        Self::ElementNotFound {
            selector: selector.to_string(),
        }
    }
}

/// Result type alias using `ScholarError`
pub type Result<T> = std::result::Result<T, ScholarError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert `None` into a missing-element error for `selector`
    fn or_missing(self, selector: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_missing(self, selector: &str) -> Result<T> {
        self.ok_or_else(|| ScholarError::not_found(selector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_missing_names_selector() {
        let err = None::<u32>.or_missing("h3.gs_rt").expect_err("should fail");
        assert_eq!(err.to_string(), "Element not found: h3.gs_rt");
        assert_eq!(Some(3).or_missing("x").expect("present"), 3);
    }
}
