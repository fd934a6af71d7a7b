pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod pool;
pub mod progress;
pub mod reconcile;
pub mod scanner;
pub mod storage;

pub use codec::{MetadataCodec, PdfCodec, RewriteOutcome};
pub use config::AppConfig;
pub use engine::{BookFields, ScanEngine, ScanOutcome};
pub use error::Error;
pub use progress::{ProgressReporter, ScanPhase, SilentReporter};
pub use reconcile::ScanError;
pub use storage::{CatalogStore, Database};
