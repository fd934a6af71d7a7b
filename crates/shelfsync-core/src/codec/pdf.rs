use super::{
    decode_text, sanitize_text, year_from_creation_date, CodecError, DocumentMetadata,
    ExtractedRecord, MetadataCodec, MetadataUpdate, RewriteOutcome,
};
use crate::scanner::CandidateFile;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

const INFO_KEY: &[u8] = b"Info";
const CREATION_DATE_KEY: &str = "CreationDate";

/// PDF metadata codec backed by `lopdf`. Reads the trailer `Info` dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCodec;

impl PdfCodec {
    pub fn new() -> Self {
        PdfCodec
    }
}

impl MetadataCodec for PdfCodec {
    fn extract(&self, candidate: &CandidateFile) -> ExtractedRecord {
        match read_metadata(&candidate.path) {
            Ok((info, pages)) => {
                debug!("Read {} ({} pages)", candidate.path.display(), pages);
                ExtractedRecord::Extracted(build_metadata(&candidate.file_name, info, pages))
            }
            Err(e) => {
                debug!("Failed to read {}: {}", candidate.path.display(), e);
                ExtractedRecord::failed(candidate.file_name.as_str(), e.to_string())
            }
        }
    }

    fn rewrite(&self, path: &Path, update: &MetadataUpdate) -> RewriteOutcome {
        if !path.exists() {
            warn!("File not found, metadata not updated: {}", path.display());
            return RewriteOutcome::Missing;
        }
        match write_metadata(path, update) {
            Ok(()) => {
                debug!("Rewrote metadata of {}", path.display());
                RewriteOutcome::Written
            }
            Err(e) => {
                error!("Error updating metadata for {}: {}", path.display(), e);
                RewriteOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

fn read_metadata(path: &Path) -> Result<(BTreeMap<String, String>, u32), CodecError> {
    let doc = Document::load(path)?;
    let pages = doc.get_pages().len() as u32;

    let mut info = BTreeMap::new();
    if let Some(dict) = info_dictionary(&doc) {
        for (key, value) in dict.iter() {
            if let Some(text) = object_text(&doc, value) {
                info.insert(decode_text(key), text);
            }
        }
    }
    Ok((info, pages))
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(INFO_KEY).ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Text value of an Info entry. Follows at most one indirect reference.
fn object_text(doc: &Document, object: &Object) -> Option<String> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok().and_then(direct_text),
        other => direct_text(other),
    }
}

/// Text strings go through lopdf's BOM and PDFDocEncoding handling; bytes it
/// rejects fall back to the lossy decoder.
fn direct_text(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(match lopdf::decode_text_string(object) {
            Ok(text) => sanitize_text(&text),
            Err(e) => {
                debug!("Lossy decode of text string: {}", e);
                decode_text(bytes)
            }
        }),
        Object::Name(bytes) => Some(decode_text(bytes)),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

fn build_metadata(file_name: &str, mut info: BTreeMap<String, String>, pages: u32) -> DocumentMetadata {
    let title = info
        .remove(MetadataUpdate::TITLE)
        .filter(|t| !t.trim().is_empty());
    let author = info
        .remove(MetadataUpdate::AUTHOR)
        .filter(|a| !a.trim().is_empty());
    let year = year_from_creation_date(info.get(CREATION_DATE_KEY).map(String::as_str));

    DocumentMetadata {
        file_name: decode_text(file_name.as_bytes()),
        title,
        author,
        year,
        pages,
        extra: info,
    }
}

fn write_metadata(path: &Path, update: &MetadataUpdate) -> Result<(), CodecError> {
    let mut doc = Document::load(path)?;
    let info_id = ensure_info_object(&mut doc);
    let info = doc.get_object_mut(info_id)?.as_dict_mut()?;
    for (key, value) in update.fields() {
        info.set(key, lopdf::text_string(value));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    doc.save_to(&mut staged)?;
    staged.as_file().sync_all()?;
    fs::set_permissions(staged.path(), fs::metadata(path)?.permissions())?;
    staged.persist(path).map_err(|e| CodecError::Io(e.error))?;
    Ok(())
}

/// Id of the indirect Info dictionary, creating or hoisting one if needed.
fn ensure_info_object(doc: &mut Document) -> ObjectId {
    let existing = doc.trailer.get(INFO_KEY).ok().cloned();
    let dict = match existing {
        Some(Object::Reference(id)) => {
            if matches!(doc.get_object(id), Ok(Object::Dictionary(_))) {
                return id;
            }
            Dictionary::new()
        }
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };
    let id = doc.add_object(dict);
    doc.trailer.set(INFO_KEY, Object::Reference(id));
    id
}
