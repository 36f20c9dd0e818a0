use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use site_logging::{site_debug, site_error};

use crate::filename::markdown_doc_path;
use crate::persist::{write_text, PersistError};

/// Section used for entries registered without an explicit section.
pub const DEFAULT_SECTION: &str = "Other";

/// One converted document inside a manifest section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub title: String,
    pub path: String,
}

/// A named group of entries; order follows first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub entries: Vec<Entry>,
}

/// Parsed index-of-documents file, Markdown-flavored: an H1 project name,
/// an optional blockquote description, then one H2 per section with its
/// link-list entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub project_name: String,
    pub project_description: String,
    pub sections: Vec<Section>,
}

/// Per-document update applied to a manifest.
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// Link title; falls back to the raw document path when empty.
    pub title: Option<String>,
    /// Overwrites the manifest's project name when non-empty.
    pub project_name: Option<String>,
    /// Overwrites the manifest's project description when non-empty.
    pub project_description: Option<String>,
    /// Target section; the default section is used when empty.
    pub section: Option<String>,
    /// When set, entry paths are absolute: `<project_url>/<doc_path>.md`.
    pub project_url: Option<String>,
}

impl Manifest {
    /// Parses manifest text, line by line, best-effort.
    ///
    /// The first H1 line becomes the project name; the contiguous
    /// blockquote run before the first section header becomes the
    /// description. Lines that match no known pattern are dropped, so a
    /// damaged file degrades to a smaller manifest rather than an error.
    pub fn parse(text: &str) -> Self {
        let mut manifest = Manifest::default();
        if text.is_empty() {
            return manifest;
        }

        let mut current_section: Option<usize> = None;
        let mut description_lines: Vec<String> = Vec::new();
        let mut description_done = false;

        for line in text.lines() {
            let trimmed = line.trim();

            if let Some(name) = trimmed.strip_prefix("# ") {
                if manifest.project_name.is_empty() {
                    manifest.project_name = name.trim().to_string();
                    continue;
                }
            }

            if current_section.is_none() && !description_done {
                if let Some(desc) = trimmed.strip_prefix("> ") {
                    description_lines.push(desc.trim().to_string());
                    continue;
                }
                // A contiguous run only: the first non-blockquote line
                // after the run starts ends the description for good.
                if !description_lines.is_empty() {
                    description_done = true;
                }
            }

            if let Some(name) = trimmed.strip_prefix("## ") {
                let name = name.trim();
                let index = match manifest.sections.iter().position(|s| s.name == name) {
                    Some(index) => index,
                    None => {
                        manifest.sections.push(Section {
                            name: name.to_string(),
                            entries: Vec::new(),
                        });
                        manifest.sections.len() - 1
                    }
                };
                current_section = Some(index);
                continue;
            }

            if let Some(index) = current_section {
                if let Some(entry) = parse_link_entry(trimmed) {
                    manifest.sections[index].entries.push(entry);
                }
            }
        }

        manifest.project_description = description_lines.join("\n");
        manifest
    }

    /// Inserts or updates the entry for `doc_path`, merging project
    /// metadata.
    ///
    /// Supplied non-empty name/description overwrite the current values;
    /// empty or absent ones never erase anything. Within the target
    /// section, an entry with the same computed path keeps its position
    /// and only has its title replaced.
    pub fn update(&mut self, doc_path: &str, options: &RegisterOptions) {
        if let Some(name) = non_empty(options.project_name.as_deref()) {
            self.project_name = name.to_string();
        }
        if let Some(description) = non_empty(options.project_description.as_deref()) {
            self.project_description = description.to_string();
        }

        let section_name = non_empty(options.section.as_deref()).unwrap_or(DEFAULT_SECTION);
        let title = non_empty(options.title.as_deref()).unwrap_or(doc_path);
        let entry_path = entry_path(doc_path, options.project_url.as_deref());

        let section = match self.sections.iter().position(|s| s.name == section_name) {
            Some(index) => &mut self.sections[index],
            None => {
                self.sections.push(Section {
                    name: section_name.to_string(),
                    entries: Vec::new(),
                });
                let last = self.sections.len() - 1;
                &mut self.sections[last]
            }
        };

        match section.entries.iter_mut().find(|e| e.path == entry_path) {
            Some(entry) => entry.title = title.to_string(),
            None => section.entries.push(Entry {
                title: title.to_string(),
                path: entry_path,
            }),
        }
    }

    /// Serializes the manifest back to its persisted text form.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# ");
        out.push_str(&self.project_name);
        out.push_str("\n\n");

        // One `> ` prefix per description line.
        if !self.project_description.is_empty() {
            for line in self.project_description.lines() {
                out.push_str("> ");
                out.push_str(line);
                out.push('\n');
            }
        }

        for section in &self.sections {
            out.push_str("\n## ");
            out.push_str(&section.name);
            out.push_str("\n\n");
            for entry in &section.entries {
                out.push_str(&format!("- [{}]({})\n", entry.title, entry.path));
            }
        }

        out
    }
}

/// Matches one `- [title](path)` link-list line, title and path both
/// non-empty.
fn parse_link_entry(line: &str) -> Option<Entry> {
    let rest = line.strip_prefix('-')?.trim_start();
    let rest = rest.strip_prefix('[')?;
    let (title, rest) = rest.split_once(']')?;
    let rest = rest.strip_prefix('(')?;
    let (path, rest) = rest.split_once(')')?;
    if title.is_empty() || path.is_empty() || !rest.trim().is_empty() {
        return None;
    }
    Some(Entry {
        title: title.to_string(),
        path: path.to_string(),
    })
}

fn entry_path(doc_path: &str, project_url: Option<&str>) -> String {
    let md_path = markdown_doc_path(doc_path);
    match project_url.filter(|u| !u.is_empty()) {
        Some(url) => {
            let base = url.trim_end_matches('/');
            format!("{base}/{}", md_path.replace('\\', "/"))
        }
        None => md_path,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Serialized read-modify-write access to one manifest file.
///
/// Every call re-reads the file, applies one update, and rewrites it, so
/// independent build invocations accumulate entries across runs. The
/// internal mutex serializes writers within this process; all writers for
/// a given path must share one `ManifestWriter`. Serializing writers in
/// *other* processes remains the caller's responsibility (last write wins
/// otherwise).
#[derive(Debug)]
pub struct ManifestWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ManifestWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The manifest file this writer owns.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registers or updates the entry for one converted document.
    ///
    /// No-op when the manifest path or `doc_path` is empty. I/O failures
    /// are logged and swallowed, leaving the file in its prior state; a
    /// single failed registration must not abort the site build.
    pub fn register(&self, doc_path: &str, options: &RegisterOptions) {
        if self.path.as_os_str().is_empty() || doc_path.is_empty() {
            return;
        }

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match self.read_update_write(doc_path, options) {
            Ok(()) => site_debug!("registered {doc_path} in {}", self.path.display()),
            Err(err) => {
                site_error!("failed to update manifest {}: {err}", self.path.display());
            }
        }
    }

    fn read_update_write(&self, doc_path: &str, options: &RegisterOptions) -> Result<(), PersistError> {
        let existing = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };

        let mut manifest = Manifest::parse(&existing);
        manifest.update(doc_path, options);
        write_text(&self.path, &manifest.render())
    }
}
