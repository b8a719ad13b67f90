//! Record types extracted from Scholar pages.
//!
//! Each record serializes to the JSON projection written to disk. The same
//! projection is hashed for deduplication, so two records that print the same
//! JSON are the same record no matter which page they came from.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;

/// Behaviour shared by everything ranked on a leaderboard.
pub trait CitationRecord: Serialize {
    /// Citation count used for ordering.
    fn citation(&self) -> u64;

    /// Hex SHA-256 of the compact JSON projection.
    fn content_hash(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Descending comparator on citation count. Equal counts compare equal, so a
/// stable sort keeps source order for ties.
pub fn by_citation_desc<T: CitationRecord>(a: &T, b: &T) -> Ordering {
    b.citation().cmp(&a.citation())
}

/// Sort records in place, most cited first.
pub fn sort_descending<T: CitationRecord>(records: &mut [T]) {
    records.sort_by(by_citation_desc);
}

/// A Scholar author profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub affiliation: String,
    /// Total citations shown on the profile
    pub citation: u64,
}

impl CitationRecord for Author {
    fn citation(&self) -> u64 {
        self.citation
    }
}

/// A work citing one of the profile's papers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    /// Byline text: authors, venue, year, publisher
    pub info: String,
    pub citation: u64,
    /// Profiles of the linked authors, most cited first
    pub authors: Vec<Author>,
}

impl CitationRecord for Citation {
    fn citation(&self) -> u64 {
        self.citation
    }
}

/// A publication listed on the root profile page.
///
/// Equality, like the JSON form, ignores `venue` and `citation_url`.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    /// Raw author line as shown on the profile
    pub authors: String,
    #[serde(skip)]
    pub venue: String,
    pub citation: u64,
    /// Absolute link to the "cited by" listing, if the paper has one
    #[serde(skip)]
    pub citation_url: Option<String>,
    pub year: String,
    /// Filled by the citation crawl, most cited first
    pub citation_details: Vec<Citation>,
}

impl Paper {
    /// Create a paper with no citation details yet.
    pub fn new(
        title: String,
        authors: String,
        venue: String,
        citation: u64,
        citation_url: Option<String>,
        year: String,
    ) -> Self {
        Self {
            title,
            authors,
            venue,
            citation,
            citation_url,
            year,
            citation_details: Vec::new(),
        }
    }
}

impl PartialEq for Paper {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.authors == other.authors
            && self.citation == other.citation
            && self.year == other.year
            && self.citation_details == other.citation_details
    }
}

impl CitationRecord for Paper {
    fn citation(&self) -> u64 {
        self.citation
    }
}
