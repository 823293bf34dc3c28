use crate::error::Error;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Placeholder for a field or testcase with no extracted value.
pub const NOT_AVAILABLE: &str = "N/A";

pub const COL_LOG_FILE: &str = "log_file";
pub const COL_TESTCASE_NAME: &str = "testcase_name";
pub const COL_FAILED_RECORD: &str = "failed_record";
pub const COL_FAILED_PATTERN: &str = "failed_pattern";

/// A row a [`ReportSink`] can render: a lookup from column name to cell.
pub trait ReportRow {
    fn field(&self, column: &str) -> Option<&str>;
}

/// One failing log line with its run context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub log_file: String,
    /// Every catalogue field, `N/A` where the file never set it.
    pub fields: BTreeMap<String, String>,
    pub testcase_name: String,
    /// The failing line, trimmed.
    pub failed_record: String,
    /// Full span matched by the failure pattern.
    pub failed_pattern: String,
}

impl ReportRow for FailureRecord {
    fn field(&self, column: &str) -> Option<&str> {
        match column {
            COL_LOG_FILE => Some(&self.log_file),
            COL_TESTCASE_NAME => Some(&self.testcase_name),
            COL_FAILED_RECORD => Some(&self.failed_record),
            COL_FAILED_PATTERN => Some(&self.failed_pattern),
            other => self.fields.get(other).map(String::as_str),
        }
    }
}

/// Failure records in file-traversal then line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    records: Vec<FailureRecord>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = FailureRecord>) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[FailureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Renders rows as a table with a caller-chosen column order.
pub trait ReportSink {
    /// Write `rows` restricted to `columns`, in that order. Returns the
    /// number of data rows written.
    fn write_rows<R: ReportRow>(
        &mut self,
        rows: &[R],
        columns: &[String],
    ) -> Result<usize, Error>;
}

/// Comma-delimited table with an optional header row.
pub struct CsvReportSink<W: Write> {
    writer: csv::Writer<W>,
    include_header: bool,
}

impl CsvReportSink<File> {
    pub fn create(path: &Path, include_header: bool) -> Result<Self, Error> {
        let file = File::create(path)?;
        Ok(Self::from_writer(file, include_header))
    }
}

impl<W: Write> CsvReportSink<W> {
    pub fn from_writer(writer: W, include_header: bool) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
            include_header,
        }
    }

    pub fn into_inner(self) -> Result<W, Error> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

impl<W: Write> ReportSink for CsvReportSink<W> {
    fn write_rows<R: ReportRow>(
        &mut self,
        rows: &[R],
        columns: &[String],
    ) -> Result<usize, Error> {
        check_columns(rows, columns)?;

        if self.include_header {
            self.writer.write_record(columns)?;
        }

        for row in rows {
            // Every cell is present once check_columns has passed.
            let cells = columns
                .iter()
                .map(|column| row.field(column).unwrap_or_default());
            self.writer.write_record(cells)?;
        }

        self.writer.flush()?;
        Ok(rows.len())
    }
}

/// Write `report` to a new CSV file at `path`.
pub fn write_csv_report(
    report: &Report,
    columns: &[String],
    path: &Path,
    include_header: bool,
) -> Result<usize, Error> {
    // Validate before creating the file so a bad column list leaves nothing behind.
    check_columns(report.records(), columns)?;
    let mut sink = CsvReportSink::create(path, include_header)?;
    sink.write_rows(report.records(), columns)
}

fn check_columns<R: ReportRow>(rows: &[R], columns: &[String]) -> Result<(), Error> {
    for (index, row) in rows.iter().enumerate() {
        if let Some(missing) = columns.iter().find(|c| row.field(c).is_none()) {
            return Err(Error::Serialization(format!(
                "row {} has no value for report column '{}'",
                index, missing
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: &str) -> FailureRecord {
        let mut fields = BTreeMap::new();
        fields.insert("build_id".to_string(), "1.2.3".to_string());
        fields.insert("component".to_string(), NOT_AVAILABLE.to_string());
        FailureRecord {
            log_file: "logs/run.log".to_string(),
            fields,
            testcase_name: "login_test".to_string(),
            failed_record: line.to_string(),
            failed_pattern: "ERROR".to_string(),
        }
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn render(rows: &[FailureRecord], cols: &[String], header: bool) -> Result<String, Error> {
        let mut sink = CsvReportSink::from_writer(Vec::new(), header);
        sink.write_rows(rows, cols)?;
        Ok(String::from_utf8(sink.into_inner()?).unwrap())
    }

    #[test]
    fn test_field_lookup_covers_fixed_and_extracted() {
        let r = record("ERROR x");
        assert_eq!(r.field("log_file"), Some("logs/run.log"));
        assert_eq!(r.field("build_id"), Some("1.2.3"));
        assert_eq!(r.field("failed_pattern"), Some("ERROR"));
        assert_eq!(r.field("job_url"), None);
    }

    #[test]
    fn test_columns_subset_in_given_order() {
        let rows = vec![record("ERROR one")];
        let out = render(&rows, &columns(&["failed_record", "log_file"]), true).unwrap();
        assert_eq!(out, "failed_record,log_file\nERROR one,logs/run.log\n");
    }

    #[test]
    fn test_header_can_be_omitted() {
        let rows = vec![record("ERROR one")];
        let out = render(&rows, &columns(&["build_id"]), false).unwrap();
        assert_eq!(out, "1.2.3\n");
    }

    #[test]
    fn test_cells_are_quoted_when_needed() {
        let rows = vec![record("ERROR: a, b")];
        let out = render(&rows, &columns(&["failed_record"]), false).unwrap();
        assert_eq!(out, "\"ERROR: a, b\"\n");
    }

    #[test]
    fn test_missing_column_fails_before_any_output() {
        let rows = vec![record("ERROR one")];
        let mut sink = CsvReportSink::from_writer(Vec::new(), true);
        let err = sink
            .write_rows(&rows, &columns(&["log_file", "no_such_field"]))
            .unwrap_err();
        match err {
            Error::Serialization(msg) => assert!(msg.contains("no_such_field")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(sink.into_inner().unwrap().is_empty());
    }

    #[test]
    fn test_empty_report_writes_header_only() {
        let out = render(&[], &columns(&["log_file", "failed_record"]), true).unwrap();
        assert_eq!(out, "log_file,failed_record\n");
    }
}
