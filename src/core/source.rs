use crate::config::SyncConfig;
use crate::core::translate::RowTranslator;
use crate::domain::model::{Operation, RecordError, SecretRecord, SourceOutcome, TabularRow};
use crate::domain::ports::SecretStore;
use crate::utils::error::{Result, SyncError};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

/// Processes a single CSV source from read to outcome.
pub struct SourceProcessor<S: SecretStore> {
    store: Arc<S>,
    translator: RowTranslator,
    operation: Operation,
    verbose: bool,
    dry_run: bool,
}

impl<S: SecretStore> SourceProcessor<S> {
    pub fn new(store: Arc<S>, config: &SyncConfig) -> Self {
        Self {
            store,
            translator: RowTranslator::new(
                config.columns.secret_name.clone(),
                config.columns.folder.clone(),
            ),
            operation: config.operation,
            verbose: config.verbose,
            dry_run: config.dry_run,
        }
    }

    /// Never fails: unreadable sources and failed records are reported in
    /// the outcome so that other sources keep going.
    pub async fn process(&self, source: &Path) -> SourceOutcome {
        let rows = match read_rows(source).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::debug!("unable to read {}: {}", source.display(), e);
                return SourceOutcome::unreadable(source.to_path_buf(), e.to_string());
            }
        };

        let mut errors = Vec::new();
        for row in &rows {
            let record = match self.translator.translate(row) {
                Ok(record) => record,
                Err(e) => {
                    tracing::debug!("skipping row in {}: {}", source.display(), e);
                    errors.push(RecordError {
                        record_path: invalid_path_of(&e),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if let Err(e) = self.apply(&record).await {
                tracing::debug!(
                    "unable to process {} in {}: {}",
                    record.path,
                    source.display(),
                    e
                );
                errors.push(RecordError {
                    record_path: record.path,
                    message: e.to_string(),
                });
            }
        }

        tracing::info!(
            "Finished processing {} ({} secrets)",
            source.display(),
            rows.len()
        );

        SourceOutcome::new(source.to_path_buf(), rows.len(), errors)
    }

    async fn apply(&self, record: &SecretRecord) -> Result<()> {
        self.announce(record);
        if self.dry_run {
            return Ok(());
        }
        match self.operation {
            Operation::Upsert => self.store.write(&record.path, &record.fields).await,
            Operation::Delete => self.store.delete(&record.path).await,
        }
    }

    /// Per-record line for verbose and dry runs. Field values are never logged.
    fn announce(&self, record: &SecretRecord) {
        if !self.verbose && !self.dry_run {
            return;
        }
        let prefix = if self.dry_run { "dry run: " } else { "" };
        match self.operation {
            Operation::Upsert => {
                let names: Vec<&str> = record.fields.keys().map(String::as_str).collect();
                tracing::info!("{}creating: {} with fields {:?}", prefix, record.path, names);
            }
            Operation::Delete => tracing::info!("{}deleting: {}", prefix, record.path),
        }
    }
}

fn invalid_path_of(err: &SyncError) -> String {
    match err {
        SyncError::InvalidRecordPath { path, .. } => path.clone(),
        _ => String::new(),
    }
}

/// Read every row of a CSV source into memory. A source that does not exist
/// has zero rows.
pub async fn read_rows(source: &Path) -> Result<Vec<TabularRow>> {
    let data = match tokio::fs::read(source).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("{} does not exist, treating it as empty", source.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data.as_slice());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: TabularRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    tracing::debug!("Parsed {} rows from {}", rows.len(), source.display());
    Ok(rows)
}
