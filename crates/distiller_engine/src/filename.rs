/// Path of the Markdown companion for a rendered document.
///
/// The `.md` suffix is appended so the source name stays visible:
/// `subdir/feature.html` becomes `subdir/feature.html.md`.
pub fn markdown_doc_path(doc_path: &str) -> String {
    format!("{doc_path}.md")
}

/// Final path segment of a logical document path, accepting both `/` and
/// `\` separators so the result does not depend on the build host.
pub fn markdown_filename(md_doc_path: &str) -> &str {
    md_doc_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(md_doc_path)
}
