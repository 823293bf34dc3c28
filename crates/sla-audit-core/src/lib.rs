pub mod catalogue;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod lines;
pub mod progress;
pub mod report;
pub mod scanner;

pub use crate::catalogue::{FieldCatalogue, TestcaseMarker};
pub use crate::config::{RunConfig, UnreadablePolicy};
pub use crate::engine::{ScanEngine, ScanResult, SkippedFile};
pub use crate::error::{Error, FileAccessKind};
pub use crate::lines::LineSource;
pub use crate::progress::{ProgressReporter, SilentReporter};
pub use crate::report::{FailureRecord, Report, NOT_AVAILABLE};
