use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_LOG_FILE: &str = "./logs/shelfsync.log";

/// Terminal output goes to stderr so stdout stays free for JSON results.
/// The file layer is skipped, with a warning, when its directory cannot be
/// created or opened.
pub fn init_logger() -> Option<WorkerGuard> {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
    let filter_layer = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let log_file_path = PathBuf::from(
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string()),
    );
    let (log_dir, log_name) = split_log_path(&log_file_path);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(log_name)
        .build(&log_dir);
    let (file_layer, guard, file_error) = match file_appender {
        Ok(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .pretty()
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(file_layer)
        .with(filter_layer)
        .init();

    match file_error {
        None => info!("Logging to stderr and {}", log_file_path.display()),
        Some(e) => warn!("File logging disabled, cannot open {}: {}", log_file_path.display(), e),
    }

    guard
}

/// Directory and file name of the log file. A bare name lands in the
/// working directory.
fn split_log_path(path: &Path) -> (PathBuf, String) {
    let name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "shelfsync.log".to_string());
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    (dir, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path_default() {
        let (dir, name) = split_log_path(Path::new(DEFAULT_LOG_FILE));
        assert_eq!(dir, PathBuf::from("./logs"));
        assert_eq!(name, "shelfsync.log");
    }

    #[test]
    fn test_split_log_path_bare_name() {
        let (dir, name) = split_log_path(Path::new("run.log"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "run.log");
    }
}
