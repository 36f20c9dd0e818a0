use std::fs;

use chrono::NaiveDate;
use distiller_engine::convert_page;
use pretty_assertions::assert_eq;
use scraper::{ElementRef, Html, Selector};
use tempfile::TempDir;

fn head_of(doc: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("head").unwrap();
    doc.select(&selector).next()
}

fn body_of(doc: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("body").unwrap();
    doc.select(&selector).next()
}

#[test]
fn writes_markdown_companion_and_returns_link_tag() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_string_lossy().to_string();

    let doc = Html::parse_document(
        "<html><head>\
         <meta name=\"author\" content=\"Test Author\">\
         <meta name=\"description\" content=\"Test Description\">\
         </head><body>\
         <h1>Introduction</h1><p>This is the <strong>body</strong> content.</p>\
         </body></html>",
    );

    let publish_date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
    let link = convert_page(
        &root,
        "subdir/feature.html",
        head_of(&doc),
        body_of(&doc),
        Some(publish_date),
        Some("https://example.com/docs"),
    );

    // Href is the basename only, resolved relative to the page itself.
    assert_eq!(
        link,
        "<link rel=\"alternate\" type=\"text/markdown\" href=\"feature.html.md\">"
    );

    let written = temp.path().join("subdir/feature.html.md");
    let content = fs::read_to_string(written).unwrap();
    assert!(content.starts_with("---\n"));
    assert!(content.contains("author: Test Author\n"));
    assert!(content.contains("description: Test Description\n"));
    assert!(content.contains("date_published: 2025-01-10\n"));
    assert!(content.contains("date_modified: 2025-01-10\n"));
    assert!(content.contains("canonical_url: https://example.com/docs/subdir/feature.html\n"));
    assert!(content.contains("# Introduction"));
    assert!(content.contains("**body**"));
}

#[test]
fn omits_frontmatter_block_when_there_is_nothing_to_emit() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_string_lossy().to_string();

    let doc = Html::parse_document(
        "<html><head></head><body><h1>Simple Page</h1><p>Simple content</p></body></html>",
    );

    let link = convert_page(&root, "simple.html", head_of(&doc), body_of(&doc), None, None);
    assert_eq!(
        link,
        "<link rel=\"alternate\" type=\"text/markdown\" href=\"simple.html.md\">"
    );

    let content = fs::read_to_string(temp.path().join("simple.html.md")).unwrap();
    assert!(!content.starts_with("---"));
    assert_eq!(content, "# Simple Page\n\nSimple content");
}

#[test]
fn canonical_url_gets_exactly_one_slash() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_string_lossy().to_string();
    let doc = Html::parse_document("<html><head></head><body><p>x</p></body></html>");

    convert_page(
        &root,
        "a.html",
        head_of(&doc),
        body_of(&doc),
        Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
        Some("https://example.com/docs/"),
    );
    let content = fs::read_to_string(temp.path().join("a.html.md")).unwrap();
    assert!(content.contains("canonical_url: https://example.com/docs/a.html\n"));
}

#[test]
fn empty_root_or_doc_path_is_a_noop() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_string_lossy().to_string();
    let doc = Html::parse_document("<html><head></head><body></body></html>");

    assert_eq!(convert_page("", "doc.html", head_of(&doc), body_of(&doc), None, None), "");
    assert_eq!(convert_page(&root, "", head_of(&doc), body_of(&doc), None, None), "");
    assert!(!temp.path().join("doc.html.md").exists());
}

#[test]
fn reconverting_overwrites_the_previous_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_string_lossy().to_string();

    let doc1 = Html::parse_document(
        "<html><head></head><body><h1>Original Title</h1><p>Original content</p></body></html>",
    );
    convert_page(&root, "update.html", head_of(&doc1), body_of(&doc1), None, None);

    let doc2 = Html::parse_document(
        "<html><head></head><body><h1>Updated Title</h1><p>Updated content</p></body></html>",
    );
    convert_page(&root, "update.html", head_of(&doc2), body_of(&doc2), None, None);

    let content = fs::read_to_string(temp.path().join("update.html.md")).unwrap();
    assert!(content.contains("Updated Title"));
    assert!(content.contains("Updated content"));
    assert!(!content.contains("Original"));
}
