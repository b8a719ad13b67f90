//! JSON result files.

use crate::aggregate::{author_leaderboard, citation_leaderboard};
use crate::error::Result;
use crate::records::Paper;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Global author leaderboard file name
pub const AUTHORS_FILE: &str = "sorted_citation_authors.json";
/// Global citing-work leaderboard file name
pub const CITATIONS_FILE: &str = "sorted_citations.json";

/// `paper_<index>.json`, index being the position on the profile.
pub fn paper_file_name(index: usize) -> String {
    format!("paper_{}.json", index)
}

/// Write `value` as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    info!(path = %path.display(), "Saved");
    Ok(())
}

/// Write one paper with its citation details.
pub fn write_paper(dir: &Path, index: usize, paper: &Paper) -> Result<PathBuf> {
    let path = dir.join(paper_file_name(index));
    write_json(&path, paper)?;
    Ok(path)
}

/// Write both leaderboards, authors first.
pub fn write_leaderboards(dir: &Path, papers: &[Paper]) -> Result<(PathBuf, PathBuf)> {
    let authors_path = dir.join(AUTHORS_FILE);
    write_json(&authors_path, &author_leaderboard(papers)?)?;

    let citations_path = dir.join(CITATIONS_FILE);
    write_json(&citations_path, &citation_leaderboard(papers)?)?;

    Ok((authors_path, citations_path))
}
