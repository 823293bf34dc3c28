use crate::error::Error;
use config::{Config, Environment, File as ConfigFile, FileFormat};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_REPORT_PATH: &str = "sla_report.csv";

/// Configuration exactly as read from the source; required keys are
/// optional here so a missing one can be reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    pub logs_parent_directory: Option<String>,
    pub failed_record_pattern: Option<String>,
    pub csv_report_fields: Option<String>,
    pub field_patterns: Option<BTreeMap<String, String>>,
    pub testcase_marker: Option<String>,
    pub report_path: Option<String>,
    pub include_header: Option<bool>,
    pub on_unreadable_file: Option<String>,
    pub parallel: Option<bool>,
}

/// What to do when a log file cannot be read mid-scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnreadablePolicy {
    /// Abort the run; no report is written.
    #[default]
    Abort,
    /// Leave the file out and list it in the scan result.
    Skip,
}

/// Validated run configuration. Immutable for the run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub logs_root: PathBuf,
    pub failure_pattern: String,
    pub report_fields: Vec<String>,
    /// Replaces the built-in field catalogue when set.
    pub field_patterns: Option<BTreeMap<String, String>>,
    pub testcase_marker: Option<String>,
    pub report_path: PathBuf,
    pub include_header: bool,
    pub on_unreadable: UnreadablePolicy,
    pub parallel: bool,
    /// Files the scan must never read, e.g. the tool's own log file.
    /// The report path is always excluded.
    pub exclude_paths: Vec<PathBuf>,
}

impl RunConfig {
    pub fn new(
        logs_root: impl Into<PathBuf>,
        failure_pattern: &str,
        report_fields: &[&str],
    ) -> Self {
        Self {
            logs_root: logs_root.into(),
            failure_pattern: failure_pattern.to_string(),
            report_fields: report_fields.iter().map(|s| s.to_string()).collect(),
            field_patterns: None,
            testcase_marker: None,
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            include_header: true,
            on_unreadable: UnreadablePolicy::Abort,
            parallel: false,
            exclude_paths: Vec::new(),
        }
    }
}

impl TryFrom<RawConfig> for RunConfig {
    type Error = Error;

    fn try_from(raw: RawConfig) -> Result<Self, Error> {
        let logs_root = required(raw.logs_parent_directory, "logs_parent_directory")?;
        let failure_pattern = required(raw.failed_record_pattern, "failed_record_pattern")?;
        let report_fields =
            parse_report_fields(&required(raw.csv_report_fields, "csv_report_fields")?)?;

        if let Some(patterns) = &raw.field_patterns {
            if patterns.is_empty() {
                return Err(Error::config_invalid("field_patterns", "must not be empty"));
            }
        }

        let on_unreadable = match raw.on_unreadable_file.as_deref() {
            None | Some("abort") => UnreadablePolicy::Abort,
            Some("skip") => UnreadablePolicy::Skip,
            Some(other) => {
                return Err(Error::config_invalid(
                    "on_unreadable_file",
                    format!("must be 'abort' or 'skip', got '{}'", other),
                ))
            }
        };

        Ok(RunConfig {
            logs_root: PathBuf::from(logs_root),
            failure_pattern,
            report_fields,
            field_patterns: raw.field_patterns,
            testcase_marker: raw.testcase_marker,
            report_path: PathBuf::from(
                raw.report_path
                    .unwrap_or_else(|| DEFAULT_REPORT_PATH.to_string()),
            ),
            include_header: raw.include_header.unwrap_or(true),
            on_unreadable,
            parallel: raw.parallel.unwrap_or(false),
            exclude_paths: Vec::new(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct FieldPatternsSection {
    field_patterns: Option<BTreeMap<String, String>>,
}

/// Load the JSON run configuration at `path`, with `SLA_`-prefixed
/// environment variables taking precedence over file values.
pub fn load_configuration(path: &Path) -> Result<RunConfig, Error> {
    let builder = Config::builder()
        .add_source(ConfigFile::from(path).format(FileFormat::Json).required(true))
        .add_source(Environment::with_prefix("SLA"))
        .build()?;
    let mut raw = builder.try_deserialize::<RawConfig>()?;
    // `config` lowercases map keys; field names are column names and keep their case.
    raw.field_patterns = read_field_patterns(path)?;
    RunConfig::try_from(raw)
}

fn read_field_patterns(path: &Path) -> Result<Option<BTreeMap<String, String>>, Error> {
    let content = fs::read_to_string(path)?;
    let section: FieldPatternsSection = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid("field_patterns", e.to_string()))?;
    Ok(section.field_patterns)
}

/// Split a pipe-delimited column list, e.g. `log_file|failed_record`.
pub fn parse_report_fields(value: &str) -> Result<Vec<String>, Error> {
    let fields: Vec<String> = value.split('|').map(str::to_string).collect();
    if fields.iter().any(|f| f.is_empty()) {
        return Err(Error::config_invalid(
            "csv_report_fields",
            "contains an empty column name",
        ));
    }
    Ok(fields)
}

fn required(value: Option<String>, key: &str) -> Result<String, Error> {
    match value {
        None => Err(Error::config_invalid(key, "is missing")),
        Some(v) if v.is_empty() => Err(Error::config_invalid(key, "is empty")),
        Some(v) => Ok(v),
    }
}
