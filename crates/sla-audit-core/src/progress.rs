use std::path::Path;

/// Trait for reporting scan progress.
///
/// The CLI implements it with indicatif; tests use [`SilentReporter`].
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self, _root: &Path) {}
    fn on_files_discovered(&self, _total_files: usize) {}
    fn on_file_scanned(&self, _path: &Path, _failures: usize) {}
    fn on_file_skipped(&self, _path: &Path, _reason: &str) {}
    fn on_scan_complete(&self, _total_records: usize, _duration_secs: f64) {}
    fn on_report_write_start(&self, _path: &Path) {}
    fn on_report_write_complete(&self, _rows: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
