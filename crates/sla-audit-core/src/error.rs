use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a log file could not be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAccessKind {
    NotFound,
    PermissionDenied,
    IoFailure,
}

impl From<io::ErrorKind> for FileAccessKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => FileAccessKind::NotFound,
            io::ErrorKind::PermissionDenied => FileAccessKind::PermissionDenied,
            _ => FileAccessKind::IoFailure,
        }
    }
}

impl fmt::Display for FileAccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileAccessKind::NotFound => "not found",
            FileAccessKind::PermissionDenied => "permission denied",
            FileAccessKind::IoFailure => "read failure",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: '{key}' {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("The logs parent directory '{}' does not exist", .0.display())]
    PathNotFound(PathBuf),

    #[error("Cannot read log file {} ({kind}): {source}", path.display())]
    FileAccess {
        path: PathBuf,
        kind: FileAccessKind,
        #[source]
        source: io::Error,
    },

    #[error("Error walking {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid pattern for '{name}': {source}")]
    PatternCompile {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Pattern for '{name}' has no capture group")]
    MissingCaptureGroup { name: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn config_invalid(key: &str, reason: impl Into<String>) -> Self {
        Error::ConfigInvalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::FileAccess {
            path: path.into(),
            kind: source.kind().into(),
            source,
        }
    }
}
