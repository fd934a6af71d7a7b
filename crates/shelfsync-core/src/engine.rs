use crate::codec::{MetadataCodec, MetadataUpdate, PdfCodec, RewriteOutcome};
use crate::config::AppConfig;
use crate::error::Error;
use crate::pool::ExtractionPool;
use crate::progress::{ProgressReporter, ScanPhase};
use crate::reconcile::{self, ScanError};
use crate::scanner;
use crate::storage::{BookUpdate, CatalogEntry, CatalogStore, Database};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub struct ScanEngine {
    config: AppConfig,
    db_path: String,
    codec: Arc<dyn MetadataCodec>,
    pool: ExtractionPool,
}

/// What one scan did. Lists keep discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanOutcome {
    pub added: usize,
    pub skipped: Vec<String>,
    pub errors: Vec<ScanError>,
}

/// Caller-facing metadata fields for a document rewrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFields {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
}

impl BookFields {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.year.is_none()
    }
}

impl From<&BookFields> for MetadataUpdate {
    fn from(fields: &BookFields) -> Self {
        MetadataUpdate {
            title: fields.title.clone(),
            author: fields.author.clone(),
            year: fields.year.map(|y| y.to_string()),
        }
    }
}

impl From<&BookUpdate> for BookFields {
    fn from(update: &BookUpdate) -> Self {
        BookFields {
            title: update.title.clone(),
            author: update.author.clone(),
            year: update.year,
        }
    }
}

/// Tracks and reports phase transitions for one scan.
struct PhaseTracker<'a> {
    phase: ScanPhase,
    reporter: &'a dyn ProgressReporter,
}

impl<'a> PhaseTracker<'a> {
    fn new(reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            phase: ScanPhase::Idle,
            reporter,
        }
    }

    fn enter(&mut self, next: ScanPhase) {
        debug!("Scan phase {} -> {}", self.phase, next);
        self.phase = next;
        self.reporter.on_phase(next);
    }
}

impl ScanEngine {
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let pool = ExtractionPool::new(config.extraction_workers, config.queue_capacity)?
            .with_max_document_bytes(config.max_document_bytes);
        Ok(Self {
            db_path: config.db_path.clone(),
            config,
            codec: Arc::new(PdfCodec::new()),
            pool,
        })
    }

    pub fn with_db_path(mut self, path: &str) -> Self {
        self.db_path = path.to_string();
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn MetadataCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Threads in the extraction pool.
    pub fn extraction_workers(&self) -> usize {
        self.pool.workers()
    }

    pub fn open_store(&self) -> Result<Database, Error> {
        Ok(Database::open(&self.db_path)?)
    }

    /// Scan `root` into the engine's SQLite catalog.
    pub fn scan(&self, root: &Path, reporter: &dyn ProgressReporter) -> Result<ScanOutcome, Error> {
        let db = self.open_store()?;
        self.scan_with(&db, root, reporter)
    }

    /// Run the full synchronization pipeline against `store`:
    /// 1. Walk `root` for files matching the configured pattern
    /// 2. Extract metadata on the worker pool
    /// 3. Classify each record as new, already present, or failed
    /// 4. Insert all new entries in one batch
    ///
    /// Per-file problems end up in `ScanOutcome::errors`. Only an unreadable
    /// root or a store failure returns `Err`.
    pub fn scan_with<S>(
        &self,
        store: &S,
        root: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<ScanOutcome, Error>
    where
        S: CatalogStore + ?Sized,
    {
        let mut tracker = PhaseTracker::new(reporter);
        match self.run_scan(store, root, &mut tracker) {
            Ok(outcome) => {
                tracker.enter(ScanPhase::Done);
                info!(
                    "Scan of {} done: {} added, {} skipped, {} errors",
                    root.display(),
                    outcome.added,
                    outcome.skipped.len(),
                    outcome.errors.len()
                );
                Ok(outcome)
            }
            Err(err) => {
                error!("Scan of {} failed during {}: {}", root.display(), tracker.phase, err);
                tracker.enter(ScanPhase::Error);
                Err(err)
            }
        }
    }

    fn run_scan<S>(
        &self,
        store: &S,
        root: &Path,
        tracker: &mut PhaseTracker<'_>,
    ) -> Result<ScanOutcome, Error>
    where
        S: CatalogStore + ?Sized,
    {
        let reporter = tracker.reporter;

        // Phase 1: Walk
        tracker.enter(ScanPhase::Walking);
        let walk_start = Instant::now();
        let candidates = scanner::list_candidates(root, &self.config.file_pattern)?;
        let total = candidates.len();
        reporter.on_walk_complete(total, walk_start.elapsed().as_secs_f64());
        info!("Found {} candidate documents under {}", total, root.display());

        // Phase 2: Extract
        tracker.enter(ScanPhase::Extracting);
        let extract_start = Instant::now();
        let mut extracted = 0;
        let records = self
            .pool
            .extract_all(Arc::clone(&self.codec), candidates, |record| {
                extracted += 1;
                reporter.on_extract_progress(extracted, total, record.file_name());
            });
        let failures = records.iter().filter(|r| r.is_failure()).count();
        reporter.on_extract_complete(failures, extract_start.elapsed().as_secs_f64());
        debug!(
            "Extraction completed in {:.2}s: {} records, {} failures",
            extract_start.elapsed().as_secs_f64(),
            records.len(),
            failures
        );

        // Phase 3: Reconcile
        tracker.enter(ScanPhase::Reconciling);
        let paths = self.config.catalog_paths();
        let plan = reconcile::classify(records, &paths, |identity| store.exists(identity))?;

        // Phase 4: Ingest
        tracker.enter(ScanPhase::Ingesting);
        let ingest_start = Instant::now();
        let added = if plan.to_insert.is_empty() {
            0
        } else {
            let inserted = store.insert_many(&plan.to_insert)?;
            if inserted != plan.to_insert.len() {
                warn!(
                    "Catalog accepted {} of {} new entries; the rest appeared concurrently",
                    inserted,
                    plan.to_insert.len()
                );
            }
            inserted
        };
        reporter.on_ingest_complete(added, ingest_start.elapsed().as_secs_f64());

        Ok(ScanOutcome {
            added,
            skipped: plan.skipped,
            errors: plan.errors,
        })
    }

    /// Rewrite a document's embedded title/author/year. Runs on the
    /// extraction pool; never returns an error, failures are in the outcome.
    pub fn update_metadata(&self, path: &Path, fields: &BookFields) -> RewriteOutcome {
        if !path.exists() {
            warn!("File not found: {}", path.display());
            return RewriteOutcome::Missing;
        }
        let update = MetadataUpdate::from(fields);
        if update.is_empty() {
            debug!("No metadata fields to write for {}", path.display());
            return RewriteOutcome::Written;
        }

        info!("Updating document metadata for {}", path.display());
        let codec = Arc::clone(&self.codec);
        self.pool.run(move || codec.rewrite(path, &update))
    }

    /// Update a catalog row and mirror title/author/year into the document
    /// on disk. A failed document rewrite is logged; the row update stands.
    pub fn update_book(
        &self,
        db: &Database,
        book_id: i64,
        update: &BookUpdate,
    ) -> Result<Option<CatalogEntry>, Error> {
        let updated = db.update_book(book_id, update)?;
        let Some(book) = &updated else {
            warn!("Book with ID {} not found or no fields to update", book_id);
            return Ok(None);
        };

        let fields = BookFields::from(update);
        if !fields.is_empty() {
            let path = self.locate_document(&book.book_link);
            let outcome = self.update_metadata(&path, &fields);
            if !outcome.is_success() {
                warn!(
                    "Catalog row {} updated but document {} was not: {:?}",
                    book_id,
                    path.display(),
                    outcome
                );
            }
        }
        Ok(updated)
    }

    /// Find the file behind a catalog link. Scans are recursive, so when the
    /// document is not directly in `books_dir` its subdirectories are searched
    /// by file name with the scan pattern.
    pub fn locate_document(&self, book_link: &str) -> PathBuf {
        let direct = self.config.resolve_document_path(book_link);
        if direct.is_file() {
            return direct;
        }
        let Some(file_name) = direct.file_name().map(|f| f.to_string_lossy().into_owned()) else {
            return direct;
        };

        let books_dir = Path::new(&self.config.books_dir);
        match scanner::list_candidates(books_dir, &self.config.file_pattern) {
            Ok(candidates) => match candidates.into_iter().find(|c| c.file_name == file_name) {
                Some(found) => {
                    debug!("Located {} at {}", book_link, found.path.display());
                    found.path
                }
                None => direct,
            },
            Err(e) => {
                warn!("Cannot search {} for {}: {}", books_dir.display(), file_name, e);
                direct
            }
        }
    }
}
