use indicatif::{ProgressBar, ProgressStyle};
use sla_audit_core::ProgressReporter;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// CLI progress reporter using indicatif progress bars.
///
/// - Discovery: spinner (file count unknown)
/// - Scan: progress bar over the discovered log files
/// - Report write: spinner
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
    failures: AtomicUsize,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            failures: AtomicUsize::new(0),
        }
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

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self, root: &Path) {
        self.set_bar(spinner(format!("Discovering log files under {}...", root.display())));
    }

    fn on_files_discovered(&self, total_files: usize) {
        let pb = ProgressBar::new(total_files as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Scanning [{bar:30.cyan/dim}] {pos}/{len} logs ({msg})",
        ) {
            pb.set_style(
                style
                    .progress_chars("━╸─")
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
            );
        }
        pb.set_message("0 failures");
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_file_scanned(&self, _path: &Path, failures: usize) {
        let total = self.failures.fetch_add(failures, Ordering::Relaxed) + failures;
        self.with_bar(|pb| {
            pb.inc(1);
            pb.set_message(format!("{} failures", total));
        });
    }

    fn on_file_skipped(&self, path: &Path, reason: &str) {
        self.with_bar(|pb| {
            pb.inc(1);
            pb.println(format!(
                "  \x1b[33m!\x1b[0m Skipped {}: {}",
                path.display(),
                reason
            ));
        });
    }

    fn on_scan_complete(&self, total_records: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} failed records in {:.2}s",
            total_records, duration_secs
        );
    }

    fn on_report_write_start(&self, path: &Path) {
        self.set_bar(spinner(format!("Writing {}...", path.display())));
    }

    fn on_report_write_complete(&self, rows: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Report written: {} rows in {:.2}s",
            rows, duration_secs
        );
    }
}
