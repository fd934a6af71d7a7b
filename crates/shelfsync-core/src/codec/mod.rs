//! Reading and writing the metadata embedded in a document file.
//!
//! Everything format-specific lives behind [`MetadataCodec`]; the rest of the
//! crate only sees [`ExtractedRecord`] and [`RewriteOutcome`].

pub mod pdf;

use crate::scanner::CandidateFile;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

pub use pdf::PdfCodec;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("{0}")]
    Malformed(String),
}

/// Metadata read from one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    pub file_name: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: i32,
    pub pages: u32,
    /// Every other Info entry, keyed without the leading `/`.
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionFailure {
    pub file_name: String,
    pub error: String,
}

/// Result of running the codec over one candidate file.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedRecord {
    Extracted(DocumentMetadata),
    Failed(ExtractionFailure),
}

impl ExtractedRecord {
    pub fn failed(file_name: impl Into<String>, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "unreadable document".to_string();
        }
        ExtractedRecord::Failed(ExtractionFailure {
            file_name: sanitize_text(&file_name.into()),
            error: sanitize_text(&error),
        })
    }

    pub fn file_name(&self) -> &str {
        match self {
            ExtractedRecord::Extracted(meta) => &meta.file_name,
            ExtractedRecord::Failed(failure) => &failure.file_name,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExtractedRecord::Failed(_))
    }
}

/// Field updates written back into a document, in a fixed key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
}

impl MetadataUpdate {
    pub const TITLE: &'static str = "Title";
    pub const AUTHOR: &'static str = "Author";
    pub const YEAR: &'static str = "Year";

    /// The set fields as `(Info key, value)` pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        [
            (Self::TITLE, &self.title),
            (Self::AUTHOR, &self.author),
            (Self::YEAR, &self.year),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    Written,
    /// The target path does not exist; nothing was created.
    Missing,
    Failed { error: String },
}

impl RewriteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RewriteOutcome::Written)
    }
}

pub trait MetadataCodec: Send + Sync {
    /// Read one document. Never fails: problems come back as
    /// [`ExtractedRecord::Failed`].
    fn extract(&self, candidate: &CandidateFile) -> ExtractedRecord;

    /// Merge `update` into the document's metadata and replace the file.
    /// The original is left untouched unless the new file was fully written.
    fn rewrite(&self, path: &Path, update: &MetadataUpdate) -> RewriteOutcome;
}

/// Decode a metadata byte string. UTF-16BE when it carries a BOM, UTF-8
/// otherwise; invalid sequences and NULs are dropped.
pub fn decode_text(bytes: &[u8]) -> String {
    let text: String = if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        char::decode_utf16(units).filter_map(|c| c.ok()).collect()
    } else {
        let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
        bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
    };
    sanitize_text(&text)
}

/// Strip NULs and a leading byte order mark left in decoded text.
pub fn sanitize_text(text: &str) -> String {
    text.trim_start_matches('\u{FEFF}').replace('\0', "")
}

/// Year from a `D:YYYYMMDD...` timestamp, or 0 when absent or malformed.
pub fn year_from_creation_date(creation_date: Option<&str>) -> i32 {
    creation_date
        .and_then(|value| value.trim().strip_prefix("D:"))
        .and_then(|rest| rest.get(..4))
        .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_from_creation_date() {
        assert_eq!(year_from_creation_date(Some("D:20180101000000")), 2018);
        assert_eq!(year_from_creation_date(Some("D:19991231")), 1999);
        assert_eq!(year_from_creation_date(Some("20180101")), 0);
        assert_eq!(year_from_creation_date(Some("D:20x8")), 0);
        assert_eq!(year_from_creation_date(Some("D:")), 0);
        assert_eq!(year_from_creation_date(None), 0);
    }

    #[test]
    fn test_decode_text_drops_invalid_utf8_and_nul() {
        assert_eq!(decode_text(b"Fo\xFFo\0 Bar"), "Foo Bar");
    }

    #[test]
    fn test_decode_text_utf16_with_bom() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "Čapek".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_text(&bytes), "Čapek");
    }

    #[test]
    fn test_metadata_update_fields_in_order() {
        let update = MetadataUpdate {
            title: Some("X".to_string()),
            author: None,
            year: Some("2001".to_string()),
        };
        let fields: Vec<_> = update.fields().collect();
        assert_eq!(fields, vec![("Title", "X"), ("Year", "2001")]);
        assert!(MetadataUpdate::default().is_empty());
    }

    #[test]
    fn test_failed_record_never_has_empty_error() {
        match ExtractedRecord::failed("b.pdf", "  ") {
            ExtractedRecord::Failed(failure) => {
                assert_eq!(failure.file_name, "b.pdf");
                assert!(!failure.error.is_empty());
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
