use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Log file requested through `LOG_FILE_PATH`, if any.
pub fn log_file_path() -> Option<PathBuf> {
    env::var_os("LOG_FILE_PATH")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

/// Console output goes to stderr so `print-config` and the summary stay
/// clean on stdout. A file layer is added only when `LOG_FILE_PATH` is
/// set; the returned guard flushes it.
pub fn init_logger() -> Option<WorkerGuard> {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let filter_layer =
        EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_ansi(true);

    let log_file = log_file_path();
    let (file_layer, guard) = match &log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .map(|f| f.to_os_string())
                .unwrap_or_else(|| "sla-audit.log".into());
            let file_appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(filter_layer)
        .init();

    debug!("Tracing filter '{}'", filter);
    if let Some(path) = &log_file {
        info!("Logging to {}", path.display());
    }

    guard
}
