//! Distiller engine: converts rendered documentation pages into
//! AI-ready Markdown artifacts and maintains the site's index-of-documents
//! manifest.
mod assemble;
mod convert;
mod filename;
mod frontmatter;
mod manifest;
mod persist;

pub use assemble::convert_page;
pub use convert::{convert, convert_fragment};
pub use filename::{markdown_doc_path, markdown_filename};
pub use frontmatter::extract_frontmatter;
pub use manifest::{
    Entry, Manifest, ManifestWriter, RegisterOptions, Section, DEFAULT_SECTION,
};
pub use persist::{write_text, PersistError};
