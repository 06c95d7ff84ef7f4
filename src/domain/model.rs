use crate::utils::error::Result;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

/// One CSV row keyed by header name.
pub type TabularRow = HashMap<String, String>;

/// A secret ready to be written to (or removed from) the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub path: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    Upsert,
    Delete,
}

impl Operation {
    pub fn from_undo(undo: bool) -> Self {
        if undo {
            Operation::Delete
        } else {
            Operation::Upsert
        }
    }

    /// Past-tense verb used in the run summary.
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Upsert => "created",
            Operation::Delete => "deleted",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Upsert => write!(f, "Upsert"),
            Operation::Delete => write!(f, "Delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordError {
    pub record_path: String,
    pub message: String,
}

/// Result of processing one source. Built once by the source processor and
/// only read afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    source_path: PathBuf,
    record_count: usize,
    errors: Vec<RecordError>,
}

impl SourceOutcome {
    pub fn new(source_path: PathBuf, record_count: usize, errors: Vec<RecordError>) -> Self {
        Self {
            source_path,
            record_count,
            errors,
        }
    }

    /// A source that could not be read at all: no records, one error naming
    /// the source itself.
    pub fn unreadable(source_path: PathBuf, message: String) -> Self {
        let record_path = source_path.display().to_string();
        Self {
            source_path,
            record_count: 0,
            errors: vec![RecordError {
                record_path,
                message,
            }],
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn errors(&self) -> &[RecordError] {
        &self.errors
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub total_records: usize,
    pub total_errors: usize,
    pub operation: Operation,
    pub elapsed_seconds: f64,
    pub outcomes: Vec<SourceOutcome>,
}

impl BatchReport {
    pub fn new(operation: Operation) -> Self {
        Self {
            total_records: 0,
            total_errors: 0,
            operation,
            elapsed_seconds: 0.0,
            outcomes: Vec::new(),
        }
    }

    pub fn absorb(&mut self, outcome: SourceOutcome) {
        self.total_records += outcome.record_count();
        self.total_errors += outcome.errors().len();
        self.outcomes.push(outcome);
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Whole seconds, truncated.
    pub fn summary_line(&self) -> String {
        format!(
            "Successfully {} {} secrets in {} seconds",
            self.operation.verb(),
            self.total_records,
            self.elapsed_seconds as u64
        )
    }

    /// Single-line JSON form of the report, printed instead of the summary
    /// line under `--log-format json`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_error(path: &str) -> RecordError {
        RecordError {
            record_path: path.to_string(),
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_report_sums_outcomes() {
        let mut report = BatchReport::new(Operation::Upsert);
        report.absorb(SourceOutcome::new("a.csv".into(), 3, vec![]));
        report.absorb(SourceOutcome::new(
            "b.csv".into(),
            4,
            vec![record_error("x/y"), record_error("x/z")],
        ));

        assert_eq!(report.total_records, 7);
        assert_eq!(report.total_errors, 2);
        assert!(report.has_errors());
        assert_eq!(report.outcomes.len(), 2);
    }

    #[test]
    fn test_unreadable_outcome_names_source() {
        let outcome = SourceOutcome::unreadable("bad.csv".into(), "invalid UTF-8".to_string());
        assert_eq!(outcome.record_count(), 0);
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.errors()[0].record_path, "bad.csv");
    }

    #[test]
    fn test_summary_line_uses_operation_verb() {
        let mut report = BatchReport::new(Operation::from_undo(true));
        report.absorb(SourceOutcome::new("a.csv".into(), 2, vec![]));
        report.elapsed_seconds = 1.2;
        assert_eq!(report.summary_line(), "Successfully deleted 2 secrets in 1 seconds");
    }

    #[test]
    fn test_summary_line_truncates_elapsed_seconds() {
        let mut report = BatchReport::new(Operation::Upsert);
        report.elapsed_seconds = 1.6;
        assert_eq!(report.summary_line(), "Successfully created 0 secrets in 1 seconds");

        report.elapsed_seconds = 0.99;
        assert!(report.summary_line().ends_with("in 0 seconds"));
    }

    #[test]
    fn test_report_as_json() {
        let mut report = BatchReport::new(Operation::Delete);
        report.absorb(SourceOutcome::new("b.csv".into(), 4, vec![record_error("x/y")]));

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["total_records"], 4);
        assert_eq!(value["total_errors"], 1);
        assert_eq!(value["operation"], "Delete");
        assert_eq!(value["outcomes"][0]["source_path"], "b.csv");
        assert_eq!(value["outcomes"][0]["errors"][0]["record_path"], "x/y");
    }
}
