use crate::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};
use walkdir::WalkDir;

pub const LOG_FILE_SUFFIX: &str = ".log";

/// Recursive traversal of `root`. Returns every regular file whose name
/// ends in `.log`, entries sorted by name within each directory so the
/// order is stable for a given tree. Symlinks are not followed.
///
/// Files in `exclude` (the tool's own outputs) are never returned. A root
/// that is not a directory yields no files.
pub fn collect_log_files(root: &Path, exclude: &[PathBuf]) -> Result<Vec<PathBuf>, Error> {
    if !root.is_dir() {
        warn!("{} is not a directory, nothing to scan", root.display());
        return Ok(Vec::new());
    }

    let excluded: Vec<PathBuf> = exclude.iter().filter_map(|p| canonical(p)).collect();
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| Error::Walk {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if !is_log_file(entry.path()) {
            trace!("Skipping non-log file {}", entry.path().display());
            continue;
        }

        if canonical(entry.path()).is_some_and(|p| excluded.contains(&p)) {
            warn!("Skipping {}: written by this run", entry.path().display());
            continue;
        }

        files.push(entry.into_path());
    }

    Ok(files)
}

fn canonical(path: &Path) -> Option<PathBuf> {
    fs::canonicalize(path).ok()
}

fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(LOG_FILE_SUFFIX))
        .unwrap_or(false)
}
