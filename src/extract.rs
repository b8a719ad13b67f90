//! HTML extraction for Scholar profile, citing-list and author pages.
//!
//! Every function takes the HTML of an already loaded page. Fields the page
//! may legitimately omit (citation counts, "Cited by" links) fall back to a
//! default; fields a record cannot exist without fail with
//! [`ScholarError::ElementNotFound`].

use crate::error::{OptionExt, Result, ScholarError};
use crate::records::{Author, Paper};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// One publication row on the profile table
pub const PAPER_ROW: &str = "tr.gsc_a_tr";
/// Table body holding the profile rows
pub const PAPER_TABLE: &str = "#gsc_a_b";
const PAPER_TITLE: &str = ".gsc_a_at";
const PAPER_GRAY: &str = ".gsc_a_t .gs_gray";
const PAPER_CITED: &str = ".gsc_a_c";
const PAPER_CITED_LINK: &str = ".gsc_a_c a";
const PAPER_YEAR: &str = ".gsc_a_y";

/// "Show more" button under the profile table
pub const SHOW_MORE: &str = "#gsc_bpf_more";

/// One result on a "cited by" listing
pub const CITING_ENTRY: &str = "div.gs_ri";
/// Results column of a listing
pub const CITING_RESULTS: &str = "#gs_res_ccl_mid";
const CITING_TITLE: &str = "h3.gs_rt";
const CITING_INFO: &str = "div.gs_a";
const CITING_AUTHOR_LINK: &str = "div.gs_a a";
const CITING_FOOTER_LINK: &str = "div.gs_fl a";

/// Pagination control on a listing
pub const NEXT_PAGE: &str = r#"button[aria-label="Next"]"#;

/// Header block of an author profile
pub const AUTHOR_PROFILE: &str = "#gsc_prf";
const AUTHOR_NAME: &str = "#gsc_prf_in";
const AUTHOR_AFFILIATION: &str = "div.gsc_prf_il";
const AUTHOR_TOTAL_CITED: &str = "td.gsc_rsb_std";

/// Containers and forms that only appear on the CAPTCHA / unusual traffic page
pub const CAPTCHA_MARKERS: &str = r#"#gs_captcha_ccl, #gs_captcha_f, #captcha-form, #recaptcha, form[action*="sorry"]"#;

const CITED_BY_PREFIX: &str = "Cited by";

/// A citing work as listed, before its authors are looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitingEntry {
    pub title: String,
    pub info: String,
    pub citation: u64,
    /// Absolute links to the profiles of the linked authors, in byline order
    pub author_urls: Vec<String>,
}

/// Whether a clickable control is on the page and usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Absent,
    Disabled,
    Enabled,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScholarError::Parse(format!("{}: {}", css, e)))
}

fn base_url(page_url: &str) -> Result<Url> {
    Url::parse(page_url).map_err(|e| ScholarError::Parse(format!("Invalid page URL '{}': {}", page_url, e)))
}

/// Collapse the element's text into single-spaced, trimmed form.
fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope.select(sel).next().map(text_of)
}

/// Resolve an href against the page it was found on.
///
/// Empty and `javascript:` links count as no link.
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    base.join(href).ok().map(String::from)
}

/// Parse a citation count cell or "Cited by N" link text.
///
/// Anything that is not a count yields 0.
pub fn parse_citation_count(text: &str) -> u64 {
    let text = text.trim();
    let digits = text.strip_prefix(CITED_BY_PREFIX).unwrap_or(text);
    digits.trim().trim_end_matches('*').parse().unwrap_or(0)
}

/// Extract every publication row of a profile page.
pub fn profile_papers(html: &str, page_url: &str) -> Result<Vec<Paper>> {
    let base = base_url(page_url)?;
    let document = Html::parse_document(html);

    let row_sel = selector(PAPER_ROW)?;
    let title_sel = selector(PAPER_TITLE)?;
    let gray_sel = selector(PAPER_GRAY)?;
    let cited_sel = selector(PAPER_CITED)?;
    let link_sel = selector(PAPER_CITED_LINK)?;
    let year_sel = selector(PAPER_YEAR)?;

    let mut papers = Vec::new();
    for row in document.select(&row_sel) {
        let title = first_text(row, &title_sel).or_missing(PAPER_TITLE)?;

        let mut grays = row.select(&gray_sel).map(text_of);
        let authors = grays.next().or_missing(PAPER_GRAY)?;
        let venue = grays.next().or_missing(PAPER_GRAY)?;

        let citation = first_text(row, &cited_sel)
            .map(|t| parse_citation_count(&t))
            .unwrap_or(0);
        let citation_url = row
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_link(&base, href));
        let year = first_text(row, &year_sel).or_missing(PAPER_YEAR)?;

        papers.push(Paper::new(title, authors, venue, citation, citation_url, year));
    }

    Ok(papers)
}

/// Extract the citing works listed on one "cited by" page.
pub fn citing_entries(html: &str, page_url: &str) -> Result<Vec<CitingEntry>> {
    let base = base_url(page_url)?;
    let document = Html::parse_document(html);

    let entry_sel = selector(CITING_ENTRY)?;
    let title_sel = selector(CITING_TITLE)?;
    let info_sel = selector(CITING_INFO)?;
    let author_sel = selector(CITING_AUTHOR_LINK)?;
    let footer_sel = selector(CITING_FOOTER_LINK)?;

    let mut entries = Vec::new();
    for item in document.select(&entry_sel) {
        let title = first_text(item, &title_sel).or_missing(CITING_TITLE)?;
        let info = first_text(item, &info_sel).or_missing(CITING_INFO)?;

        let citation = item
            .select(&footer_sel)
            .map(text_of)
            .find(|t| t.starts_with(CITED_BY_PREFIX))
            .map(|t| parse_citation_count(&t))
            .unwrap_or(0);

        let author_urls = item
            .select(&author_sel)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| resolve_link(&base, href))
            .collect();

        entries.push(CitingEntry {
            title,
            info,
            citation,
            author_urls,
        });
    }

    Ok(entries)
}

/// Extract the header of an author profile page.
pub fn author_profile(html: &str) -> Result<Author> {
    let document = Html::parse_document(html);

    let profile_sel = selector(AUTHOR_PROFILE)?;
    let name_sel = selector(AUTHOR_NAME)?;
    let affiliation_sel = selector(AUTHOR_AFFILIATION)?;
    let cited_sel = selector(AUTHOR_TOTAL_CITED)?;

    let profile = document.select(&profile_sel).next().or_missing(AUTHOR_PROFILE)?;
    let name = first_text(profile, &name_sel).or_missing(AUTHOR_NAME)?;
    let affiliation = first_text(profile, &affiliation_sel).or_missing(AUTHOR_AFFILIATION)?;

    // The stats table sits outside the header block.
    let citation = document
        .select(&cited_sel)
        .next()
        .map(|td| parse_citation_count(&text_of(td)))
        .unwrap_or(0);

    Ok(Author {
        name,
        affiliation,
        citation,
    })
}

/// Number of elements matching `css`.
pub fn count_matches(html: &str, css: &str) -> Result<usize> {
    let sel = selector(css)?;
    Ok(Html::parse_document(html).select(&sel).count())
}

/// State of the first control matching `css`.
pub fn control_state(html: &str, css: &str) -> Result<ControlState> {
    let sel = selector(css)?;
    let document = Html::parse_document(html);
    let state = match document.select(&sel).next() {
        None => ControlState::Absent,
        Some(control) => {
            let el = control.value();
            if el.attr("disabled").is_some() || el.attr("aria-disabled") == Some("true") {
                ControlState::Disabled
            } else {
                ControlState::Enabled
            }
        }
    };
    Ok(state)
}

/// Whether Scholar served its CAPTCHA / unusual traffic interstitial.
///
/// Decided on page structure only, so titles or bylines that mention
/// "unusual traffic" do not count.
pub fn is_blocked(html: &str) -> Result<bool> {
    Ok(count_matches(html, CAPTCHA_MARKERS)? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROFILE_URL: &str = "https://scholar.google.com/citations?user=abc";
    const LIST_URL: &str = "https://scholar.google.com/scholar?cites=42";

    fn paper_row(title: &str, count: &str, href: Option<&str>, year: &str) -> String {
        let link = match href {
            Some(h) => format!(r#"<a class="gsc_a_ac" href="{}">{}</a>"#, h, count),
            None => format!(r#"<a class="gsc_a_ac gsc_a_acm">{}</a>"#, count),
        };
        format!(
            r#"<tr class="gsc_a_tr">
                 <td class="gsc_a_t"><a class="gsc_a_at">{title}</a>
                   <div class="gs_gray">A Smith, B Jones</div>
                   <div class="gs_gray">Nature 12 (3)</div></td>
                 <td class="gsc_a_c">{link}</td>
                 <td class="gsc_a_y"><span>{year}</span></td>
               </tr>"#
        )
    }

    #[test]
    fn test_parse_citation_count() {
        assert_eq!(parse_citation_count("17"), 17);
        assert_eq!(parse_citation_count("  Cited by 230 "), 230);
        assert_eq!(parse_citation_count("12*"), 12);
        assert_eq!(parse_citation_count(""), 0);
        assert_eq!(parse_citation_count("Related articles"), 0);
        assert_eq!(parse_citation_count("-4"), 0);
    }

    #[test]
    fn test_profile_papers() -> Result<()> {
        let html = format!(
            "<table><tbody id=\"gsc_a_b\">{}{}</tbody></table>",
            paper_row("First", "31", Some("/scholar?cites=1"), "2018"),
            paper_row("Second", "", None, "2020"),
        );
        let papers = profile_papers(&html, PROFILE_URL)?;
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].title, "First");
        assert_eq!(papers[0].authors, "A Smith, B Jones");
        assert_eq!(papers[0].venue, "Nature 12 (3)");
        assert_eq!(papers[0].citation, 31);
        assert_eq!(
            papers[0].citation_url.as_deref(),
            Some("https://scholar.google.com/scholar?cites=1")
        );
        assert_eq!(papers[0].year, "2018");
        assert_eq!(papers[1].citation, 0);
        assert_eq!(papers[1].citation_url, None);
        assert!(papers[1].citation_details.is_empty());
        Ok(())
    }

    #[test]
    fn test_profile_row_without_title_fails() {
        let html = r#"<table><tr class="gsc_a_tr"><td class="gsc_a_y">2001</td></tr></table>"#;
        let err = profile_papers(html, PROFILE_URL).expect_err("title is required");
        assert!(matches!(err, ScholarError::ElementNotFound { ref selector } if selector == PAPER_TITLE));
    }

    #[test]
    fn test_citing_entries() -> Result<()> {
        let html = r#"
            <div id="gs_res_ccl_mid">
              <div class="gs_ri">
                <h3 class="gs_rt"><a href="https://x.org/p1">Follow-up   work</a></h3>
                <div class="gs_a"><a href="/citations?user=u1">C Lee</a>, D Kim - ICML, 2021</div>
                <div class="gs_fl"><a>Save</a><a>Cite</a><a href="/scholar?cites=9">Cited by 8</a></div>
              </div>
              <div class="gs_ri">
                <h3 class="gs_rt">Uncited note</h3>
                <div class="gs_a">E Moss - arXiv, 2022</div>
                <div class="gs_fl"><a>Save</a><a>Related articles</a></div>
              </div>
            </div>"#;
        let entries = citing_entries(html, LIST_URL)?;
        assert_eq!(
            entries,
            vec![
                CitingEntry {
                    title: "Follow-up work".into(),
                    info: "C Lee, D Kim - ICML, 2021".into(),
                    citation: 8,
                    author_urls: vec!["https://scholar.google.com/citations?user=u1".into()],
                },
                CitingEntry {
                    title: "Uncited note".into(),
                    info: "E Moss - arXiv, 2022".into(),
                    citation: 0,
                    author_urls: vec![],
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_citing_entry_without_byline_fails() {
        let html = r#"<div class="gs_ri"><h3 class="gs_rt">Lonely</h3></div>"#;
        assert!(matches!(
            citing_entries(html, LIST_URL),
            Err(ScholarError::ElementNotFound { .. })
        ));
    }

    #[test]
    fn test_author_profile() -> Result<()> {
        let html = r#"
            <div id="gsc_prf">
              <div id="gsc_prf_in">Grace Hopper</div>
              <div class="gsc_prf_il">Yale University</div>
              <div class="gsc_prf_il">Verified email at yale.edu</div>
            </div>
            <table id="gsc_rsb_st"><tr><td class="gsc_rsb_std">1523</td><td class="gsc_rsb_std">400</td></tr></table>"#;
        let author = author_profile(html)?;
        assert_eq!(
            author,
            Author {
                name: "Grace Hopper".into(),
                affiliation: "Yale University".into(),
                citation: 1523,
            }
        );
        Ok(())
    }

    #[test]
    fn test_author_profile_without_stats_defaults_to_zero() -> Result<()> {
        let html = r#"<div id="gsc_prf"><div id="gsc_prf_in">New Person</div><div class="gsc_prf_il">Unknown affiliation</div></div>"#;
        assert_eq!(author_profile(html)?.citation, 0);
        Ok(())
    }

    #[test]
    fn test_control_state() -> Result<()> {
        assert_eq!(control_state("<div></div>", NEXT_PAGE)?, ControlState::Absent);
        assert_eq!(
            control_state(r#"<button aria-label="Next" disabled>Next</button>"#, NEXT_PAGE)?,
            ControlState::Disabled
        );
        assert_eq!(
            control_state(r#"<button aria-label="Next" aria-disabled="true">Next</button>"#, NEXT_PAGE)?,
            ControlState::Disabled
        );
        assert_eq!(
            control_state(r#"<button aria-label="Next" aria-disabled="false">Next</button>"#, NEXT_PAGE)?,
            ControlState::Enabled
        );
        assert_eq!(
            control_state(r#"<button aria-label="Next">Next</button>"#, NEXT_PAGE)?,
            ControlState::Enabled
        );
        Ok(())
    }

    #[test]
    fn test_is_blocked() -> Result<()> {
        assert!(is_blocked(r#"<div id="gs_captcha_ccl">Please show you're not a robot</div>"#)?);
        assert!(is_blocked(
            r#"<form id="captcha-form" action="https://www.google.com/sorry/index">Our systems have detected unusual traffic</form>"#
        )?);
        assert!(!is_blocked("<div class=\"gs_ri\"></div>")?);
        Ok(())
    }

    #[test]
    fn test_text_mentioning_captcha_is_not_blocked() -> Result<()> {
        let html = r#"
            <div id="gs_res_ccl_mid"><div class="gs_ri">
              <h3 class="gs_rt">Detecting unusual traffic in IoT networks</h3>
              <div class="gs_a">Q Wu - Solving the above CAPTCHA at scale, gs_captcha workshop</div>
            </div></div>"#;
        assert!(!is_blocked(html)?);
        Ok(())
    }
}
