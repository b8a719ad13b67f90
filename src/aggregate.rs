//! Leaderboards across all crawled papers.

use crate::error::Result;
use crate::records::{sort_descending, Author, Citation, CitationRecord, Paper};
use std::collections::HashSet;

/// Flatten `groups`, drop records whose JSON projection was already seen and
/// sort the rest by citation count, most cited first.
///
/// The first occurrence of a duplicate wins, and ties keep that first-seen
/// order, so applying this to its own output changes nothing.
pub fn sort_citation_objects<T, G, I>(groups: I) -> Result<Vec<T>>
where
    T: CitationRecord + Clone,
    G: AsRef<[T]>,
    I: IntoIterator<Item = G>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for group in groups {
        for record in group.as_ref() {
            if seen.insert(record.content_hash()?) {
                unique.push(record.clone());
            }
        }
    }
    sort_descending(&mut unique);
    Ok(unique)
}

/// Distinct authors of every work citing `paper`, most cited first.
pub fn sorted_citation_authors(paper: &Paper) -> Result<Vec<Author>> {
    sort_citation_objects(paper.citation_details.iter().map(|c| c.authors.as_slice()))
}

/// Distinct citing authors across all papers.
pub fn author_leaderboard(papers: &[Paper]) -> Result<Vec<Author>> {
    let per_paper = papers
        .iter()
        .map(sorted_citation_authors)
        .collect::<Result<Vec<_>>>()?;
    sort_citation_objects(per_paper)
}

/// Distinct citing works across all papers.
pub fn citation_leaderboard(papers: &[Paper]) -> Result<Vec<Citation>> {
    sort_citation_objects(papers.iter().map(|p| p.citation_details.as_slice()))
}
