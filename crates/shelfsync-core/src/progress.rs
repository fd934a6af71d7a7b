use std::fmt;

/// Where a scan currently is. `Done` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Walking,
    Extracting,
    Reconciling,
    Ingesting,
    Done,
    Error,
}

impl ScanPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanPhase::Done | ScanPhase::Error)
    }
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanPhase::Idle => "idle",
            ScanPhase::Walking => "walking",
            ScanPhase::Extracting => "extracting",
            ScanPhase::Reconciling => "reconciling",
            ScanPhase::Ingesting => "ingesting",
            ScanPhase::Done => "done",
            ScanPhase::Error => "error",
        };
        f.write_str(name)
    }
}

/// Trait for reporting scan progress.
///
/// CLI implements with indicatif. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_phase(&self, _phase: ScanPhase) {}
    fn on_walk_complete(&self, _candidates: usize, _duration_secs: f64) {}
    fn on_extract_progress(&self, _extracted: usize, _total: usize, _file_name: &str) {}
    fn on_extract_complete(&self, _failures: usize, _duration_secs: f64) {}
    fn on_ingest_complete(&self, _rows: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
