use indicatif::{ProgressBar, ProgressStyle};
use shelfsync_core::{ProgressReporter, ScanPhase};
use std::sync::Mutex;
use std::time::Duration;

const TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Walk phase: spinner (unknown total files upfront)
/// - Extract phase: progress bar (total known from the walk)
/// - Reconcile/ingest phases: spinner
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn spinner(message: &'static str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars(TICKS));
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn extraction_bar() -> ProgressBar {
        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Reading [{bar:30.cyan/dim}] {pos}/{len} documents ({eta} remaining)",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICKS));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_phase(&self, phase: ScanPhase) {
        match phase {
            ScanPhase::Walking => self.set_bar(Self::spinner("Scanning folder...")),
            ScanPhase::Extracting => self.set_bar(Self::extraction_bar()),
            ScanPhase::Reconciling => self.set_bar(Self::spinner("Checking catalog...")),
            ScanPhase::Ingesting => self.set_bar(Self::spinner("Writing to catalog...")),
            ScanPhase::Done | ScanPhase::Error => self.finish_bar(),
            ScanPhase::Idle => {}
        }
    }

    fn on_walk_complete(&self, candidates: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} documents in {:.2}s",
            candidates, duration_secs
        );
    }

    fn on_extract_progress(&self, extracted: usize, total: usize, _file_name: &str) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                if pb.length() != Some(total as u64) {
                    pb.set_length(total as u64);
                }
                pb.set_position(extracted as u64);
            }
        }
    }

    fn on_extract_complete(&self, failures: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Metadata read in {:.2}s ({} unreadable)",
            duration_secs, failures
        );
    }

    fn on_ingest_complete(&self, rows: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Catalog write complete: {} new entries in {:.2}s",
            rows, duration_secs
        );
    }
}
