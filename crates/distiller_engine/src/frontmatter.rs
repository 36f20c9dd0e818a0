use scraper::{ElementRef, Selector};

/// Extracts YAML frontmatter lines from the meta tags of an HTML head
/// element.
///
/// Meta tags carrying both a `name` and a non-empty `content` attribute
/// become `name: value` lines, in document order. Duplicate names are
/// last-write-wins while keeping the position of the first occurrence.
/// Returns an empty string for `None` or when no tag qualifies; the
/// `---` delimiters are the caller's concern.
pub fn extract_frontmatter(head: Option<ElementRef>) -> String {
    let Some(head) = head else {
        return String::new();
    };
    let Ok(selector) = Selector::parse("meta[name][content]") else {
        return String::new();
    };

    let mut entries: Vec<(String, String)> = Vec::new();
    for meta in head.select(&selector) {
        let name = meta.value().attr("name").unwrap_or("");
        let content = meta.value().attr("content").unwrap_or("");
        if name.is_empty() || content.is_empty() {
            continue;
        }
        match entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, value)) => *value = content.to_string(),
            None => entries.push((name.to_string(), content.to_string())),
        }
    }

    let mut frontmatter = String::new();
    for (name, content) in &entries {
        frontmatter.push_str(name);
        frontmatter.push_str(": ");
        frontmatter.push_str(&escape_yaml_value(content));
        frontmatter.push('\n');
    }
    frontmatter
}

/// Quotes and escapes a value when it would break a plain YAML scalar.
fn escape_yaml_value(value: &str) -> String {
    if value.contains(':') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\\\"").replace('\n', "\\n"))
    } else {
        value.to_string()
    }
}
