use crate::catalogue::{compile_failure_pattern, FieldCatalogue, TestcaseMarker};
use crate::config::{RunConfig, UnreadablePolicy};
use crate::error::Error;
use crate::extract::{extract_fields, index_testcases};
use crate::lines::LineSource;
use crate::progress::ProgressReporter;
use crate::report::{self, FailureRecord, Report, NOT_AVAILABLE};
use crate::scanner;
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

pub struct ScanEngine {
    config: RunConfig,
    catalogue: FieldCatalogue,
    marker: TestcaseMarker,
    failure_pattern: Regex,
}

/// A log file left out of the report under [`UnreadablePolicy::Skip`].
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct ScanResult {
    pub report: Report,
    pub files_scanned: usize,
    pub lines_scanned: usize,
    pub skipped_files: Vec<SkippedFile>,
    pub scan_duration: Duration,
    pub report_write_duration: Duration,
    /// Set once the report has been written.
    pub report_path: Option<PathBuf>,
}

/// Failures found in a single file.
#[derive(Debug)]
pub struct FileScan {
    pub records: Vec<FailureRecord>,
    pub lines: usize,
}

impl ScanEngine {
    /// Compile every pattern the run needs. Nothing on disk is touched.
    pub fn new(config: RunConfig) -> Result<Self, Error> {
        let catalogue = match &config.field_patterns {
            Some(patterns) => FieldCatalogue::from_pairs(
                patterns.iter().map(|(name, pattern)| (name.as_str(), pattern.as_str())),
            )?,
            None => FieldCatalogue::builtin()?,
        };
        let marker = match &config.testcase_marker {
            Some(pattern) => TestcaseMarker::new(pattern)?,
            None => TestcaseMarker::builtin()?,
        };
        let failure_pattern = compile_failure_pattern(&config.failure_pattern)?;

        Ok(Self {
            config,
            catalogue,
            marker,
            failure_pattern,
        })
    }

    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.report_path = path.into();
        self
    }

    /// Scan the tree and write the CSV report.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<ScanResult, Error> {
        let mut result = self.scan(reporter)?;

        let path = self.config.report_path.clone();
        info!("Writing report to {}", path.display());
        reporter.on_report_write_start(&path);
        let write_start = Instant::now();
        let rows = report::write_csv_report(
            &result.report,
            &self.config.report_fields,
            &path,
            self.config.include_header,
        )?;
        result.report_write_duration = write_start.elapsed();
        reporter.on_report_write_complete(rows, result.report_write_duration.as_secs_f64());
        debug!(
            "Report written in {:.2}s — {} rows, columns {:?}",
            result.report_write_duration.as_secs_f64(),
            rows,
            self.config.report_fields,
        );

        result.report_path = Some(path);
        Ok(result)
    }

    /// Scan every `.log` file under the configured root and collect the
    /// failure records, in traversal order then line order.
    pub fn scan(&self, reporter: &dyn ProgressReporter) -> Result<ScanResult, Error> {
        let root = &self.config.logs_root;
        if !root.exists() {
            return Err(Error::PathNotFound(root.clone()));
        }
        info!("Logs parent directory: {}", root.display());
        reporter.on_scan_start(root);

        let scan_start = Instant::now();
        let mut exclude = self.config.exclude_paths.clone();
        exclude.push(self.config.report_path.clone());
        let files = scanner::collect_log_files(root, &exclude)?;
        info!("Found {} log files", files.len());
        reporter.on_files_discovered(files.len());

        if self.config.parallel {
            let outcomes: Vec<(&PathBuf, Result<FileScan, Error>)> = files
                .par_iter()
                .map(|path| (path, self.scan_reported(path, reporter)))
                .collect();
            self.fold_outcomes(outcomes.into_iter(), files.len(), scan_start, reporter)
        } else {
            // Lazy, so an abort stops reading further files.
            self.fold_outcomes(
                files.iter().map(|path| (path, self.scan_reported(path, reporter))),
                files.len(),
                scan_start,
                reporter,
            )
        }
    }

    fn fold_outcomes<'a, I>(
        &self,
        outcomes: I,
        total_files: usize,
        scan_start: Instant,
        reporter: &dyn ProgressReporter,
    ) -> Result<ScanResult, Error>
    where
        I: Iterator<Item = (&'a PathBuf, Result<FileScan, Error>)>,
    {
        let mut report = Report::new();
        let mut files_scanned = 0;
        let mut lines_scanned = 0;
        let mut skipped_files = Vec::new();

        for (path, outcome) in outcomes {
            match outcome {
                Ok(scan) => {
                    files_scanned += 1;
                    lines_scanned += scan.lines;
                    report.extend(scan.records);
                }
                Err(err) => match self.config.on_unreadable {
                    UnreadablePolicy::Abort => return Err(err),
                    UnreadablePolicy::Skip => {
                        warn!("Skipping {}: {}", path.display(), err);
                        reporter.on_file_skipped(path, &err.to_string());
                        skipped_files.push(SkippedFile {
                            path: path.clone(),
                            reason: err.to_string(),
                        });
                    }
                },
            }
        }

        let scan_duration = scan_start.elapsed();
        reporter.on_scan_complete(report.len(), scan_duration.as_secs_f64());
        info!(
            "Scanned {} of {} files ({} lines) in {:.2}s — {} failed records",
            files_scanned,
            total_files,
            lines_scanned,
            scan_duration.as_secs_f64(),
            report.len(),
        );
        if !skipped_files.is_empty() {
            warn!("{} log files were skipped", skipped_files.len());
        }

        Ok(ScanResult {
            report,
            files_scanned,
            lines_scanned,
            skipped_files,
            scan_duration,
            report_write_duration: Duration::ZERO,
            report_path: None,
        })
    }

    fn scan_reported(
        &self,
        path: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<FileScan, Error> {
        let scan = self.scan_file(path)?;
        reporter.on_file_scanned(path, scan.records.len());
        Ok(scan)
    }

    /// Load one log file and collect its failure records.
    pub fn scan_file(&self, path: &Path) -> Result<FileScan, Error> {
        let source = LineSource::load(path)?;
        let records = self.scan_source(&source);
        debug!(
            "{}: {} lines, {} failed records",
            path.display(),
            source.len(),
            records.len()
        );
        Ok(FileScan {
            records,
            lines: source.len(),
        })
    }

    /// Match the failure pattern against every line of an already-loaded
    /// file. A record's testcase is the marker found on that exact line,
    /// or `N/A`.
    pub fn scan_source(&self, source: &LineSource) -> Vec<FailureRecord> {
        if source.is_empty() {
            return Vec::new();
        }
        let testcases = index_testcases(source, &self.marker);
        let extracted = extract_fields(source, &self.catalogue);

        let fields: BTreeMap<String, String> = self
            .catalogue
            .field_names()
            .map(|name| {
                let value = extracted
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                (name.to_string(), value)
            })
            .collect();
        let log_file = source.path().to_string_lossy().into_owned();

        source
            .iter()
            .filter_map(|(index, line)| {
                let matched = self.failure_pattern.find(line)?;
                trace!("{}:{} failed record: {}", log_file, index, line.trim());
                Some(FailureRecord {
                    log_file: log_file.clone(),
                    fields: fields.clone(),
                    testcase_name: testcases
                        .get(&index)
                        .cloned()
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                    failed_record: line.trim().to_string(),
                    failed_pattern: matched.as_str().to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(pattern: &str) -> ScanEngine {
        ScanEngine::new(RunConfig::new("/unused", pattern, &["log_file"])).unwrap()
    }

    #[test]
    fn test_records_carry_sentinels_and_match_span() {
        let source = LineSource::from_content(
            "logs/a.log",
            "--build_id 7.1 --component auth\n   Error: Record Failed for id=3   \n",
        );
        let records = engine("error: record failed").scan_source(&source);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.log_file, "logs/a.log");
        assert_eq!(r.fields["build_id"], "7.1");
        assert_eq!(r.fields["component"], "auth");
        assert_eq!(r.fields["uuid"], NOT_AVAILABLE);
        assert_eq!(r.fields["job_url"], NOT_AVAILABLE);
        assert_eq!(r.testcase_name, NOT_AVAILABLE);
        assert_eq!(r.failed_record, "Error: Record Failed for id=3");
        assert_eq!(r.failed_pattern, "Error: Record Failed");
    }

    #[test]
    fn test_fields_use_last_match_even_after_failure_line() {
        let source = LineSource::from_content("a.log", "--build_id 1\nFAIL here\n--build_id 2\n");
        let records = engine("FAIL").scan_source(&source);
        assert_eq!(records[0].fields["build_id"], "2");
    }

    #[test]
    fn test_testcase_only_on_exact_line() {
        let source = LineSource::from_content(
            "a.log",
            "Starting testcase t1 FAIL\nFAIL after\n",
        );
        let records = engine("FAIL").scan_source(&source);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].testcase_name, "t1");
        assert_eq!(records[1].testcase_name, NOT_AVAILABLE);
    }

    #[test]
    fn test_invalid_failure_pattern() {
        let config = RunConfig::new("/unused", "([", &["log_file"]);
        let err = ScanEngine::new(config).err().unwrap();
        assert!(matches!(
            err,
            Error::PatternCompile { ref name, .. } if name == "failed_record_pattern"
        ));
    }

    #[test]
    fn test_custom_field_patterns_replace_builtin() {
        let mut config = RunConfig::new("/unused", "FAIL", &["log_file"]);
        let mut patterns = BTreeMap::new();
        patterns.insert("host".to_string(), r"host=(\w+)".to_string());
        config.field_patterns = Some(patterns);
        let engine = ScanEngine::new(config).unwrap();

        let source = LineSource::from_content("a.log", "host=db1 --build_id 3\nFAIL\n");
        let records = engine.scan_source(&source);
        assert_eq!(records[0].fields.len(), 1);
        assert_eq!(records[0].fields["host"], "db1");
    }
}
