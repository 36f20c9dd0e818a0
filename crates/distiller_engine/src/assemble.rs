use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use scraper::ElementRef;
use site_logging::{site_debug, site_error};

use crate::convert::convert;
use crate::filename::{markdown_doc_path, markdown_filename};
use crate::frontmatter::extract_frontmatter;
use crate::persist::write_text;

/// Converts one rendered documentation page to a Markdown file next to it.
///
/// `doc_path` is the logical site-relative path of the page (for example
/// `subdir/feature.html`); the Markdown artifact is written to
/// `<output_root>/<doc_path>.md`. The head element supplies meta-tag
/// frontmatter; `publish_date` and `project_url` add the computed
/// `date_published` / `date_modified` / `canonical_url` fields.
///
/// Returns an HTML `<link rel="alternate">` element advertising the
/// Markdown version, with an href relative to the page itself. Returns an
/// empty string when `output_root` or `doc_path` is empty, and on I/O
/// failure (logged, never propagated, so a single bad page cannot abort a
/// site build).
pub fn convert_page(
    output_root: &str,
    doc_path: &str,
    head: Option<ElementRef>,
    body: Option<ElementRef>,
    publish_date: Option<NaiveDate>,
    project_url: Option<&str>,
) -> String {
    if output_root.is_empty() || doc_path.is_empty() {
        return String::new();
    }

    let md_doc_path = markdown_doc_path(doc_path);
    let md_filename = markdown_filename(&md_doc_path).to_string();
    let markdown_path: PathBuf = Path::new(output_root).join(&md_doc_path);

    let mut content = String::new();

    let meta_frontmatter = extract_frontmatter(head);
    let mut computed_frontmatter = String::new();
    if let Some(date) = publish_date {
        let formatted = date.format("%Y-%m-%d");
        computed_frontmatter.push_str(&format!("date_published: {formatted}\n"));
        computed_frontmatter.push_str(&format!("date_modified: {formatted}\n"));
    }
    if let Some(url) = project_url.filter(|u| !u.is_empty()) {
        let canonical = canonical_url(url, doc_path);
        computed_frontmatter.push_str(&format!("canonical_url: {canonical}\n"));
    }

    // No frontmatter block at all when there is nothing to put in it.
    if !meta_frontmatter.is_empty() || !computed_frontmatter.is_empty() {
        content.push_str("---\n");
        content.push_str(&meta_frontmatter);
        content.push_str(&computed_frontmatter);
        content.push_str("---\n\n");
    }

    content.push_str(&convert(body));

    match write_text(&markdown_path, &content) {
        Ok(()) => {
            site_debug!("wrote markdown companion for {doc_path}");
            format!("<link rel=\"alternate\" type=\"text/markdown\" href=\"{md_filename}\">")
        }
        Err(err) => {
            // Log but don't interrupt the surrounding site generation.
            site_error!("failed to convert {doc_path} to markdown: {err}");
            String::new()
        }
    }
}

/// Base URL with exactly one trailing slash, joined with the normalized
/// document path.
fn canonical_url(project_url: &str, doc_path: &str) -> String {
    let base = project_url.trim_end_matches('/');
    format!("{base}/{}", doc_path.replace('\\', "/"))
}
