pub mod walk;

pub use walk::{collect_log_files, LOG_FILE_SUFFIX};
