use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Recognized element kinds, resolved once per node from the tag name.
///
/// Unrecognized tags map to `Unknown` and degrade to their text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Heading(usize),
    Paragraph,
    LineBreak,
    Rule,
    Strong,
    Emphasis,
    Code,
    Preformatted,
    Link,
    Image,
    List { ordered: bool },
    ListItem,
    Blockquote,
    Table,
    Container,
    Ignored,
    Unknown,
}

impl TagKind {
    fn from_name(name: &str) -> Self {
        match name {
            "h1" => TagKind::Heading(1),
            "h2" => TagKind::Heading(2),
            "h3" => TagKind::Heading(3),
            "h4" => TagKind::Heading(4),
            "h5" => TagKind::Heading(5),
            "h6" => TagKind::Heading(6),
            "p" => TagKind::Paragraph,
            "br" => TagKind::LineBreak,
            "hr" => TagKind::Rule,
            "strong" | "b" => TagKind::Strong,
            "em" | "i" => TagKind::Emphasis,
            "code" => TagKind::Code,
            "pre" => TagKind::Preformatted,
            "a" => TagKind::Link,
            "img" => TagKind::Image,
            "ul" => TagKind::List { ordered: false },
            "ol" => TagKind::List { ordered: true },
            "li" => TagKind::ListItem,
            "blockquote" => TagKind::Blockquote,
            "table" => TagKind::Table,
            // Block-level and inline containers carry no markup of their own.
            "div" | "section" | "article" | "main" | "header" | "footer" | "nav" | "aside"
            | "span" => TagKind::Container,
            "script" | "style" | "noscript" => TagKind::Ignored,
            _ => TagKind::Unknown,
        }
    }
}

/// Per-call conversion state, copied at each list boundary so sibling
/// subtrees never observe each other's transient changes.
#[derive(Debug, Clone, Copy, Default)]
struct ConversionState {
    in_preformatted: bool,
    list_depth: usize,
}

/// Converts an HTML element subtree to Markdown.
///
/// Returns an empty string for `None`. The output is the recursive
/// conversion of all children, trimmed of surrounding whitespace.
pub fn convert(element: Option<ElementRef>) -> String {
    let Some(element) = element else {
        return String::new();
    };

    let mut result = String::new();
    process_children(element, &mut result, ConversionState::default());
    result.trim().to_string()
}

/// Parses an HTML fragment and converts it to Markdown.
///
/// Convenience wrapper for callers holding raw HTML rather than an
/// already-parsed element.
pub fn convert_fragment(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);
    convert(Some(fragment.root_element()))
}

fn process_children(element: ElementRef, result: &mut String, state: ConversionState) {
    for child in element.children() {
        process_node(child, result, state);
    }
}

fn process_node(node: NodeRef<Node>, result: &mut String, state: ConversionState) {
    match node.value() {
        Node::Text(text) => process_text(text, result, state),
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                process_element(element, result, state);
            }
        }
        _ => {}
    }
}

fn process_text(text: &str, result: &mut String, state: ConversionState) {
    // In preformatted blocks, preserve the text as-is.
    if state.in_preformatted {
        result.push_str(text);
        return;
    }

    // Collapse whitespace runs (including newlines) to a single space.
    let mut collapsed = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                collapsed.push(' ');
            }
            in_whitespace = true;
        } else {
            collapsed.push(ch);
            in_whitespace = false;
        }
    }

    // Don't add a leading space at the start of a line.
    if result.ends_with('\n') {
        result.push_str(collapsed.trim_start_matches(' '));
    } else {
        result.push_str(&collapsed);
    }
}

fn process_element(element: ElementRef, result: &mut String, state: ConversionState) {
    let tag = element.value().name().to_ascii_lowercase();
    match TagKind::from_name(&tag) {
        TagKind::Heading(level) => {
            ensure_blank_line(result);
            result.push_str(&"#".repeat(level));
            result.push(' ');
            process_children(element, result, state);
            result.push_str("\n\n");
        }
        TagKind::Paragraph => {
            ensure_blank_line(result);
            process_children(element, result, state);
            result.push_str("\n\n");
        }
        TagKind::LineBreak => result.push_str("  \n"),
        TagKind::Rule => {
            ensure_blank_line(result);
            result.push_str("---\n\n");
        }
        TagKind::Strong => {
            result.push_str("**");
            process_children(element, result, state);
            result.push_str("**");
        }
        TagKind::Emphasis => {
            result.push('*');
            process_children(element, result, state);
            result.push('*');
        }
        TagKind::Code => {
            if state.in_preformatted {
                process_children(element, result, state);
            } else {
                result.push('`');
                process_children(element, result, state);
                result.push('`');
            }
        }
        TagKind::Preformatted => process_preformatted(element, result),
        TagKind::Link => process_link(element, result, state),
        TagKind::Image => process_image(element, result),
        TagKind::List { ordered } => process_list(element, result, state, ordered),
        // List items outside a list degrade to their content.
        TagKind::ListItem => process_children(element, result, state),
        TagKind::Blockquote => process_blockquote(element, result, state),
        TagKind::Table => process_table(element, result, state),
        TagKind::Container | TagKind::Unknown => process_children(element, result, state),
        TagKind::Ignored => {}
    }
}

fn process_preformatted(element: ElementRef, result: &mut String) {
    ensure_blank_line(result);

    // Detect the language from the class tokens of the nested code element.
    let code_element = first_descendant(element, "code");
    let mut language = "";
    if let Some(code) = code_element {
        // Attribute order matters: a bare lowercase token is a language
        // name and the last one wins, but `language-*` wins outright.
        let class_attr = code.value().attr("class").unwrap_or("");
        for class in class_attr.split_whitespace() {
            if let Some(rest) = class.strip_prefix("language-") {
                language = rest;
                break;
            } else if !class.is_empty() && class.chars().all(|c| c.is_ascii_lowercase()) {
                language = class;
            }
        }
    }

    result.push_str("```");
    result.push_str(language);
    result.push('\n');

    // Raw text only; no nested Markdown syntax inside the fence.
    let raw: String = match code_element {
        Some(code) => code.text().collect(),
        None => element.text().collect(),
    };
    result.push_str(&raw);

    if !result.ends_with('\n') {
        result.push('\n');
    }
    result.push_str("```\n\n");
}

fn process_link(element: ElementRef, result: &mut String, state: ConversionState) {
    let href = element.value().attr("href").unwrap_or("");
    let text = rendered_text(element);

    if href.is_empty() {
        // No target, just output the content.
        process_children(element, result, state);
    } else if text.is_empty() {
        result.push_str(&format!("[{href}]({href})"));
    } else {
        result.push_str(&format!("[{text}]({href})"));
    }
}

fn process_image(element: ElementRef, result: &mut String) {
    let src = element.value().attr("src").unwrap_or("");
    let alt = element.value().attr("alt").unwrap_or("");

    if src.is_empty() {
        return;
    }

    result.push_str(&format!("![{alt}]({src})"));
}

fn process_list(element: ElementRef, result: &mut String, state: ConversionState, ordered: bool) {
    ensure_blank_line(result);

    // Indentation uses the depth before entering this list.
    let indent = "  ".repeat(state.list_depth);
    let item_state = ConversionState {
        list_depth: state.list_depth + 1,
        ..state
    };

    let mut item_number = 1;
    for child in element.children().filter_map(ElementRef::wrap) {
        if !child.value().name().eq_ignore_ascii_case("li") {
            continue;
        }
        result.push_str(&indent);
        if ordered {
            result.push_str(&format!("{item_number}. "));
            item_number += 1;
        } else {
            result.push_str("- ");
        }

        let mut item_content = String::new();
        process_children(child, &mut item_content, item_state);
        let content = item_content.trim();

        // Continuation lines of multi-line items get two extra spaces.
        for (i, line) in content.split('\n').enumerate() {
            if i > 0 {
                result.push('\n');
                result.push_str(&indent);
                result.push_str("  ");
            }
            result.push_str(line);
        }
        result.push('\n');
    }
    result.push('\n');
}

fn process_blockquote(element: ElementRef, result: &mut String, state: ConversionState) {
    ensure_blank_line(result);

    let mut quote_content = String::new();
    process_children(element, &mut quote_content, state);

    // One `> ` prefix per visual line.
    for line in quote_content.trim().split('\n') {
        result.push_str("> ");
        result.push_str(line);
        result.push('\n');
    }
    result.push('\n');
}

fn process_table(element: ElementRef, result: &mut String, state: ConversionState) {
    ensure_blank_line(result);

    let thead = first_descendant(element, "thead");
    let tbody = first_descendant(element, "tbody");

    // Header row comes from thead if present, otherwise the table's first row.
    let header_row = match thead {
        Some(thead) => first_descendant(thead, "tr"),
        None => first_descendant(element, "tr"),
    };

    if let Some(row) = header_row {
        process_table_row(row, result, state, true);
    }
    let header_id = header_row.map(|row| row.id());

    let body_rows = match tbody {
        Some(tbody) => descendant_rows(tbody),
        None => descendant_rows(element),
    };
    for row in body_rows {
        if Some(row.id()) == header_id {
            continue;
        }
        process_table_row(row, result, state, false);
    }
    result.push('\n');
}

fn process_table_row(row: ElementRef, result: &mut String, state: ConversionState, header: bool) {
    result.push('|');
    let mut cell_count = 0;

    for cell in row.descendants().skip(1).filter_map(ElementRef::wrap) {
        let name = cell.value().name();
        if !name.eq_ignore_ascii_case("th") && !name.eq_ignore_ascii_case("td") {
            continue;
        }
        let mut cell_content = String::new();
        process_children(cell, &mut cell_content, state);
        let collapsed = cell_content.split_whitespace().collect::<Vec<_>>().join(" ");
        result.push(' ');
        result.push_str(&collapsed);
        result.push_str(" |");
        cell_count += 1;
    }
    result.push('\n');

    // Separator line after the header row.
    if header && cell_count > 0 {
        result.push('|');
        for _ in 0..cell_count {
            result.push_str(" --- |");
        }
        result.push('\n');
    }
}

/// Normalizes the buffer to end in exactly one blank line before a new
/// block-level construct. No-op on an empty buffer.
fn ensure_blank_line(result: &mut String) {
    if result.is_empty() {
        return;
    }
    if result.ends_with("\n\n") {
        return;
    }
    if result.ends_with('\n') {
        result.push('\n');
        return;
    }
    result.push_str("\n\n");
}

/// Element text the way a browser would render it: whitespace collapsed
/// and trimmed.
fn rendered_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_descendant<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name().eq_ignore_ascii_case(name))
}

fn descendant_rows(element: ElementRef) -> Vec<ElementRef> {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name().eq_ignore_ascii_case("tr"))
        .collect()
}
