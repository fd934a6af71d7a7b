use crate::codec::{ExtractedRecord, MetadataCodec};
use crate::error::Error;
use crate::scanner::CandidateFile;
use crossbeam_channel::bounded;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, warn};

/// Dedicated worker pool for blocking document extraction.
///
/// Sized once at construction; every scan through the owning engine shares
/// it, so the number of concurrent callers never grows the thread count.
pub struct ExtractionPool {
    pool: ThreadPool,
    queue_capacity: usize,
    max_document_bytes: Option<u64>,
}

impl ExtractionPool {
    pub fn new(workers: usize, queue_capacity: usize) -> Result<Self, Error> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("shelfsync-extract-{i}"))
            .build()
            .map_err(|e| Error::Pool(e.to_string()))?;
        Ok(Self {
            pool,
            queue_capacity: queue_capacity.max(1),
            max_document_bytes: None,
        })
    }

    pub fn with_max_document_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_document_bytes = limit;
        self
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Extract every candidate on the pool. Returns exactly one record per
    /// candidate, in completion order. `on_record` runs on the calling thread
    /// as each record arrives.
    pub fn extract_all<C, F>(
        &self,
        codec: Arc<C>,
        candidates: Vec<CandidateFile>,
        mut on_record: F,
    ) -> Vec<ExtractedRecord>
    where
        C: MetadataCodec + ?Sized + 'static,
        F: FnMut(&ExtractedRecord),
    {
        let expected = candidates.len();
        let max_bytes = self.max_document_bytes;
        let (tx, rx) = bounded::<ExtractedRecord>(self.queue_capacity);

        self.pool.spawn(move || {
            candidates.into_par_iter().for_each_with(tx, |tx, candidate| {
                let record = extract_guarded(codec.as_ref(), &candidate, max_bytes);
                if tx.send(record).is_err() {
                    warn!("Result queue closed before {} was reported", candidate.file_name);
                }
            });
        });

        let mut records = Vec::with_capacity(expected);
        for record in rx.iter() {
            on_record(&record);
            records.push(record);
        }

        if records.len() != expected {
            error!(
                "Extraction returned {} records for {} candidates",
                records.len(),
                expected
            );
        }
        records
    }

    /// Run a blocking job on the pool and wait for its result.
    pub fn run<T, F>(&self, job: F) -> T
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        self.pool.install(job)
    }
}

/// Run the codec on one file, converting size-limit violations and panics
/// into failure records.
fn extract_guarded<C>(codec: &C, candidate: &CandidateFile, max_bytes: Option<u64>) -> ExtractedRecord
where
    C: MetadataCodec + ?Sized,
{
    if let Some(limit) = max_bytes {
        match fs::metadata(&candidate.path) {
            Ok(meta) if meta.len() > limit => {
                return ExtractedRecord::failed(
                    candidate.file_name.as_str(),
                    format!("file is {} bytes, limit is {}", meta.len(), limit),
                );
            }
            Ok(_) => {}
            Err(e) => return ExtractedRecord::failed(candidate.file_name.as_str(), e.to_string()),
        }
    }

    match panic::catch_unwind(AssertUnwindSafe(|| codec.extract(candidate))) {
        Ok(record) => record,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "extraction panicked".to_string());
            error!("Extraction of {} panicked: {}", candidate.path.display(), reason);
            ExtractedRecord::failed(candidate.file_name.as_str(), format!("extraction panicked: {reason}"))
        }
    }
}
