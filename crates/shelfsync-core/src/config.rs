use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BOOKS_DIR: &str = "/books";
pub const DEFAULT_IMAGES_DIR: &str = "/images";
pub const DEFAULT_DOC_PREFIX: &str = "/books_static";
pub const DEFAULT_IMAGE_PREFIX: &str = "/images_static";
pub const DEFAULT_FILE_PATTERN: &str = "*.pdf*";
pub const DEFAULT_DB_PATH: &str = "shelfsync.db";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding the document corpus.
    pub books_dir: String,
    /// Directory where cover images are expected to live.
    pub images_dir: String,
    /// Static prefix every catalog identity starts with.
    pub doc_prefix: String,
    pub image_prefix: String,
    /// Glob matched against file names while walking.
    pub file_pattern: String,
    pub db_path: String,
    pub extraction_workers: usize,
    pub queue_capacity: usize,
    /// Files larger than this are reported as extraction failures without being parsed.
    pub max_document_bytes: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            books_dir: DEFAULT_BOOKS_DIR.to_string(),
            images_dir: DEFAULT_IMAGES_DIR.to_string(),
            doc_prefix: DEFAULT_DOC_PREFIX.to_string(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            db_path: DEFAULT_DB_PATH.to_string(),
            extraction_workers: 4,
            queue_capacity: 64,
            max_document_bytes: None,
        }
    }
}

impl AppConfig {
    pub fn catalog_paths(&self) -> CatalogPaths {
        CatalogPaths {
            doc_prefix: self.doc_prefix.clone(),
            image_prefix: self.image_prefix.clone(),
        }
    }

    /// Map a catalog link (`<doc_prefix>/<file>`) back to the document on disk.
    pub fn resolve_document_path(&self, book_link: &str) -> PathBuf {
        let file_name = book_link
            .strip_prefix(self.doc_prefix.as_str())
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or_else(|| {
                Path::new(book_link)
                    .file_name()
                    .and_then(|f| f.to_str())
                    .unwrap_or(book_link)
            });
        Path::new(&self.books_dir).join(file_name)
    }
}

/// The two static prefixes the catalog's identity and cover links are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    pub doc_prefix: String,
    pub image_prefix: String,
}

impl Default for CatalogPaths {
    fn default() -> Self {
        Self {
            doc_prefix: DEFAULT_DOC_PREFIX.to_string(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let builder = Config::builder()
        .set_default("books_dir", defaults.books_dir)?
        .set_default("images_dir", defaults.images_dir)?
        .set_default("doc_prefix", defaults.doc_prefix)?
        .set_default("image_prefix", defaults.image_prefix)?
        .set_default("file_pattern", defaults.file_pattern)?
        .set_default("db_path", defaults.db_path)?
        .set_default("extraction_workers", defaults.extraction_workers as i64)?
        .set_default("queue_capacity", defaults.queue_capacity as i64)?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("SHELFSYNC").try_parsing(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
