use distiller_engine::extract_frontmatter;
use pretty_assertions::assert_eq;
use scraper::{ElementRef, Html, Selector};

fn head_of(doc: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("head").unwrap();
    doc.select(&selector).next()
}

#[test]
fn meta_tags_become_key_value_lines_in_document_order() {
    let doc = Html::parse_document(
        "<html><head>\
         <meta name=\"author\" content=\"John Doe\">\
         <meta name=\"description\" content=\"A sample document\">\
         <meta name=\"keywords\" content=\"test, sample, document\">\
         </head><body></body></html>",
    );
    let frontmatter = extract_frontmatter(head_of(&doc));
    assert_eq!(
        frontmatter,
        "author: John Doe\n\
         description: A sample document\n\
         keywords: test, sample, document\n"
    );
}

#[test]
fn values_with_colons_or_quotes_are_quoted_and_escaped() {
    let doc = Html::parse_document(
        "<html><head>\
         <meta name=\"description\" content=\"A document with: colons\">\
         <meta name=\"quote\" content=\"He said &quot;hello&quot;\">\
         </head><body></body></html>",
    );
    let frontmatter = extract_frontmatter(head_of(&doc));
    assert!(frontmatter.contains("description: \"A document with: colons\""));
    assert!(frontmatter.contains("quote: \"He said \\\"hello\\\"\""));
}

#[test]
fn duplicate_names_keep_first_position_with_last_value() {
    let doc = Html::parse_document(
        "<html><head>\
         <meta name=\"author\" content=\"First\">\
         <meta name=\"topic\" content=\"Docs\">\
         <meta name=\"author\" content=\"Second\">\
         </head><body></body></html>",
    );
    let frontmatter = extract_frontmatter(head_of(&doc));
    assert_eq!(frontmatter, "author: Second\ntopic: Docs\n");
}

#[test]
fn tags_with_empty_name_or_content_are_skipped() {
    let doc = Html::parse_document(
        "<html><head>\
         <meta name=\"\" content=\"orphan\">\
         <meta name=\"empty\" content=\"\">\
         <meta name=\"kept\" content=\"value\">\
         </head><body></body></html>",
    );
    let frontmatter = extract_frontmatter(head_of(&doc));
    assert_eq!(frontmatter, "kept: value\n");
}

#[test]
fn absent_input_and_missing_meta_tags_yield_empty_string() {
    assert_eq!(extract_frontmatter(None), "");

    let doc =
        Html::parse_document("<html><head><title>Test</title></head><body></body></html>");
    assert_eq!(extract_frontmatter(head_of(&doc)), "");
}
