//! End-to-end crawl: profile, citations per paper, result files.

use crate::browser::PageProvider;
use crate::crawler::Crawler;
use crate::error::Result;
use crate::output;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a finished run produced
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub papers: usize,
    pub citing_works: usize,
    /// Every file written, in write order
    pub files: Vec<PathBuf>,
}

/// Crawl `profile_url` and write all result files into `output_dir`.
///
/// Papers are processed in profile order and each `paper_<index>.json` is
/// written as soon as its citations are known. The leaderboards are written
/// last, so a failure part way through leaves only the per-paper files.
pub async fn run<P: PageProvider>(
    crawler: &Crawler<P>,
    profile_url: &str,
    output_dir: &Path,
    limit: Option<usize>,
) -> Result<RunSummary> {
    let mut papers = crawler.crawl_profile(profile_url).await?;
    if let Some(limit) = limit {
        if papers.len() > limit {
            info!(total = papers.len(), limit, "Limiting papers");
            papers.truncate(limit);
        }
    }

    let mut summary = RunSummary {
        papers: papers.len(),
        ..Default::default()
    };

    for (index, paper) in papers.iter_mut().enumerate() {
        info!(index, total = summary.papers, title = %paper.title, "Processing paper");
        crawler.crawl_citations(paper).await?;
        summary.citing_works += paper.citation_details.len();
        summary.files.push(output::write_paper(output_dir, index, paper)?);
    }

    let (authors, citations) = output::write_leaderboards(output_dir, &papers)?;
    summary.files.push(authors);
    summary.files.push(citations);

    info!(papers = summary.papers, citing_works = summary.citing_works, "Run complete");
    Ok(summary)
}
