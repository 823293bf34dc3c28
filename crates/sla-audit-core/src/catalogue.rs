use crate::error::Error;
use regex::{Regex, RegexBuilder};

/// Built-in run-metadata patterns. Each pattern's first capture group is
/// the field value.
pub const DEFAULT_FIELD_PATTERNS: &[(&str, &str)] = &[
    ("build_id", r"--build_id\s+([\w\.\-]+)"),
    ("suite_name", r"--suite_name\s+([\w\.\-]+)"),
    ("component", r"--component\s+([\w\.\-]+)"),
    ("zalenium", r"--zalenium\s+(\w+)"),
    ("uuid", r"--uuid\s+([\w\-]+)"),
    ("security", r"--security\s+(\w+)"),
    ("snapshots.revert", r"--snapshots\.revert\s+(\w+)"),
    ("testbed.value", r"--testbed\.value\s+([\w\-]+)"),
    ("testbed.cell", r"--testbed\.cell\s+([\w\-]+)"),
    ("job_url", r"--job_url\s+(\S+)"),
];

pub const DEFAULT_TESTCASE_MARKER: &str = r"Starting testcase\s+(\S+)";

#[derive(Debug, Clone)]
pub struct FieldPattern {
    pub name: String,
    pub regex: Regex,
}

impl FieldPattern {
    pub fn new(name: &str, pattern: &str) -> Result<Self, Error> {
        Ok(Self {
            name: name.to_string(),
            regex: compile_capturing(name, pattern)?,
        })
    }
}

/// Named extraction patterns applied to every line of every log file.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct FieldCatalogue {
    patterns: Vec<FieldPattern>,
}

impl FieldCatalogue {
    /// Build a catalogue from `(name, pattern)` pairs, keeping their order.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let patterns = pairs
            .into_iter()
            .map(|(name, pattern)| FieldPattern::new(name, pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn builtin() -> Result<Self, Error> {
        Self::from_pairs(DEFAULT_FIELD_PATTERNS.iter().copied())
    }

    pub fn patterns(&self) -> &[FieldPattern] {
        &self.patterns
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }
}

/// Pattern announcing the start of a test case; capture group 1 is its name.
#[derive(Debug, Clone)]
pub struct TestcaseMarker {
    regex: Regex,
}

impl TestcaseMarker {
    pub fn new(pattern: &str) -> Result<Self, Error> {
        Ok(Self {
            regex: compile_capturing("testcase_marker", pattern)?,
        })
    }

    pub fn builtin() -> Result<Self, Error> {
        Self::new(DEFAULT_TESTCASE_MARKER)
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Compile the user's failure pattern. Matching is case-insensitive.
pub fn compile_failure_pattern(pattern: &str) -> Result<Regex, Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::PatternCompile {
            name: "failed_record_pattern".to_string(),
            source,
        })
}

fn compile_capturing(name: &str, pattern: &str) -> Result<Regex, Error> {
    let regex = Regex::new(pattern).map_err(|source| Error::PatternCompile {
        name: name.to_string(),
        source,
    })?;
    // captures_len counts the implicit whole-match group.
    if regex.captures_len() < 2 {
        return Err(Error::MissingCaptureGroup {
            name: name.to_string(),
        });
    }
    Ok(regex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogue_compiles() {
        let catalogue = FieldCatalogue::builtin().unwrap();
        assert_eq!(catalogue.patterns().len(), DEFAULT_FIELD_PATTERNS.len());
        let names: Vec<_> = catalogue.field_names().collect();
        assert_eq!(names[0], "build_id");
        assert!(names.contains(&"snapshots.revert"));
    }

    #[test]
    fn test_pattern_without_group_is_rejected() {
        let err = FieldCatalogue::from_pairs([("build_id", r"--build_id\s+\S+")]).unwrap_err();
        assert!(matches!(err, Error::MissingCaptureGroup { ref name } if name == "build_id"));
    }

    #[test]
    fn test_bad_pattern_names_field() {
        let err = TestcaseMarker::new(r"Starting (testcase").unwrap_err();
        match err {
            Error::PatternCompile { name, .. } => assert_eq!(name, "testcase_marker"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_failure_pattern_is_case_insensitive() {
        let re = compile_failure_pattern("ERROR: record failed").unwrap();
        assert!(re.is_match("  error: Record FAILED at step 2"));
        assert!(compile_failure_pattern("(unclosed").is_err());
    }
}
