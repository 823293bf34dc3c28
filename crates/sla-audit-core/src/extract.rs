use crate::catalogue::{FieldCatalogue, TestcaseMarker};
use crate::lines::LineSource;
use std::collections::{BTreeMap, HashMap};

/// Field name → value; only fields that matched at least once are present.
pub type ExtractedFields = BTreeMap<String, String>;

/// 0-based line index → testcase name.
pub type TestcaseIndex = HashMap<usize, String>;

/// Apply every catalogue pattern to every line. A later match overwrites an
/// earlier one, so each field holds the value from its last matching line.
pub fn extract_fields(source: &LineSource, catalogue: &FieldCatalogue) -> ExtractedFields {
    let mut fields = ExtractedFields::new();

    for (_, line) in source.iter() {
        for pattern in catalogue.patterns() {
            if let Some(value) = pattern
                .regex
                .captures(line)
                .and_then(|caps| caps.get(1))
            {
                fields.insert(pattern.name.clone(), value.as_str().to_string());
            }
        }
    }

    fields
}

/// Record the index of every line that starts a test case.
pub fn index_testcases(source: &LineSource, marker: &TestcaseMarker) -> TestcaseIndex {
    source
        .iter()
        .filter_map(|(index, line)| {
            marker
                .regex()
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|name| (index, name.as_str().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(content: &str) -> LineSource {
        LineSource::from_content("test.log", content)
    }

    #[test]
    fn test_extract_last_match_wins() {
        let src = source(
            "run --build_id 1.0.0 --suite_name smoke\n\
             noise\n\
             rerun --build_id 1.0.1\n",
        );
        let catalogue = FieldCatalogue::builtin().unwrap();
        let fields = extract_fields(&src, &catalogue);

        assert_eq!(fields.get("build_id").map(String::as_str), Some("1.0.1"));
        assert_eq!(fields.get("suite_name").map(String::as_str), Some("smoke"));
    }

    #[test]
    fn test_unmatched_fields_are_absent() {
        let src = source("--component auth-svc\n");
        let fields = extract_fields(&src, &FieldCatalogue::builtin().unwrap());
        assert_eq!(fields.len(), 1);
        assert!(!fields.contains_key("uuid"));
    }

    #[test]
    fn test_dotted_field_names() {
        let src = source("--snapshots.revert true --testbed.value tb-7 --testbed.cell c-2\n");
        let fields = extract_fields(&src, &FieldCatalogue::builtin().unwrap());
        assert_eq!(fields["snapshots.revert"], "true");
        assert_eq!(fields["testbed.value"], "tb-7");
        assert_eq!(fields["testbed.cell"], "c-2");
    }

    #[test]
    fn test_custom_catalogue() {
        let catalogue = FieldCatalogue::from_pairs([("host", r"host=(\w+)")]).unwrap();
        let fields = extract_fields(&source("host=alpha --build_id 9\n"), &catalogue);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["host"], "alpha");
    }

    #[test]
    fn test_index_testcases_by_line() {
        let src = source(
            "header\n\
             2024-01-01 Starting testcase login_test\n\
             step\n\
             Starting testcase   logout_test extra\n",
        );
        let index = index_testcases(&src, &TestcaseMarker::builtin().unwrap());
        assert_eq!(index.len(), 2);
        assert_eq!(index[&1], "login_test");
        assert_eq!(index[&3], "logout_test");
        assert!(!index.contains_key(&2));
    }

    #[test]
    fn test_no_markers_gives_empty_index() {
        let src = source("nothing here\n");
        assert!(index_testcases(&src, &TestcaseMarker::builtin().unwrap()).is_empty());
    }
}
