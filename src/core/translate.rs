use crate::core::normalize::{normalize_segment, SegmentKind};
use crate::domain::model::{SecretRecord, TabularRow};
use crate::utils::error::{Result, SyncError};
use std::collections::BTreeMap;

/// Maps CSV rows onto secret records using the two designated columns.
#[derive(Debug, Clone)]
pub struct RowTranslator {
    name_column: String,
    path_column: String,
}

impl RowTranslator {
    pub fn new(name_column: impl Into<String>, path_column: impl Into<String>) -> Self {
        Self {
            name_column: name_column.into(),
            path_column: path_column.into(),
        }
    }

    pub fn translate(&self, row: &TabularRow) -> Result<SecretRecord> {
        let folder = row.get(&self.path_column).map(String::as_str).unwrap_or("");
        let name = row.get(&self.name_column).map(String::as_str).unwrap_or("");

        let path = format!(
            "{}/{}",
            normalize_segment(folder, SegmentKind::Path),
            normalize_segment(name, SegmentKind::Name)
        );
        self.check_path(&path, folder, name)?;

        let fields: BTreeMap<String, String> = row
            .iter()
            .filter(|(key, value)| {
                !value.is_empty() && **key != self.name_column && **key != self.path_column
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(SecretRecord { path, fields })
    }

    fn check_path(&self, path: &str, folder: &str, name: &str) -> Result<()> {
        let reason = if normalize_segment(folder, SegmentKind::Path).is_empty() {
            format!("column '{}' is empty after normalization", self.path_column)
        } else if normalize_segment(name, SegmentKind::Name).is_empty() {
            format!("column '{}' is empty after normalization", self.name_column)
        } else if path.split('/').any(str::is_empty) {
            format!("column '{}' produces an empty path segment", self.path_column)
        } else if path.split('/').any(|s| s == "." || s == "..") {
            format!("column '{}' contains a '.' or '..' segment", self.path_column)
        } else {
            return Ok(());
        };

        Err(SyncError::InvalidRecordPath {
            path: path.to_string(),
            reason,
        })
    }
}
