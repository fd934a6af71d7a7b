use crate::codec::{DocumentMetadata, ExtractedRecord};
use crate::config::CatalogPaths;
use crate::storage::NewCatalogEntry;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

pub const COVER_EXTENSION: &str = "jpg";

/// Values used when a document does not carry the corresponding field.
pub struct Defaults;

impl Defaults {
    pub const TITLE: &'static str = "Unknown Title";
    pub const AUTHOR: &'static str = "Unknown Author";
    pub const YEAR: i32 = 0;
    pub const PAGES: u32 = 0;
}

/// An extraction failure as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanError {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct Reconciliation {
    pub to_insert: Vec<NewCatalogEntry>,
    /// Identities already in the catalog, or repeated within this batch.
    pub skipped: Vec<String>,
    pub errors: Vec<ScanError>,
}

/// `<doc_prefix>/<file_name>`. This string is the catalog's dedup key.
pub fn document_identity(paths: &CatalogPaths, file_name: &str) -> String {
    format!("{}/{}", paths.doc_prefix, file_name)
}

/// `<image_prefix>/<file stem>.jpg`.
pub fn cover_image_path(paths: &CatalogPaths, file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    format!("{}/{}.{}", paths.image_prefix, stem, COVER_EXTENSION)
}

pub fn catalog_entry(paths: &CatalogPaths, meta: &DocumentMetadata) -> NewCatalogEntry {
    NewCatalogEntry {
        title: meta
            .title
            .clone()
            .unwrap_or_else(|| Defaults::TITLE.to_string()),
        author: meta
            .author
            .clone()
            .unwrap_or_else(|| Defaults::AUTHOR.to_string()),
        year: if meta.year > 0 { meta.year } else { Defaults::YEAR },
        pages: if meta.pages > 0 { meta.pages } else { Defaults::PAGES },
        image_path: cover_image_path(paths, &meta.file_name),
        book_link: document_identity(paths, &meta.file_name),
    }
}

/// Split extracted records into new catalog entries, skipped identities and
/// errors, preserving input order within each list. `exists` is consulted
/// once per distinct identity; its error aborts classification.
pub fn classify<E, F>(
    records: Vec<ExtractedRecord>,
    paths: &CatalogPaths,
    mut exists: F,
) -> Result<Reconciliation, E>
where
    F: FnMut(&str) -> Result<bool, E>,
{
    let mut result = Reconciliation::default();
    let mut queued: HashSet<String> = HashSet::new();

    for record in records {
        match record {
            ExtractedRecord::Failed(failure) => result.errors.push(ScanError {
                file: failure.file_name,
                error: failure.error,
            }),
            ExtractedRecord::Extracted(meta) => {
                let identity = document_identity(paths, &meta.file_name);
                if queued.contains(&identity) || exists(&identity)? {
                    result.skipped.push(identity);
                } else {
                    queued.insert(identity);
                    result.to_insert.push(catalog_entry(paths, &meta));
                }
            }
        }
    }

    Ok(result)
}
