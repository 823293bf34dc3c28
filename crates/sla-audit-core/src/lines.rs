use crate::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// The full, in-memory content of one log file split into lines.
///
/// Loaded eagerly: field extraction and testcase indexing each make their
/// own pass over the same lines.
#[derive(Debug, Clone)]
pub struct LineSource {
    path: PathBuf,
    lines: Vec<String>,
}

impl LineSource {
    /// Read `path` as UTF-8 and split it into lines without terminators.
    /// Lines end at `\n` or `\r\n`; a lone `\r` stays inside the line.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|e| Error::file_access(path, e))?;
        Ok(Self::from_content(path, &content))
    }

    pub fn from_content(path: impl Into<PathBuf>, content: &str) -> Self {
        Self {
            path: path.into(),
            lines: content.lines().map(str::to_owned).collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate `(index, line)` pairs, 0-based.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines.iter().map(String::as_str).enumerate()
    }
}
