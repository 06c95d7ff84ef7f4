use crate::config::{InputSource, SyncConfig};
use crate::core::source::SourceProcessor;
use crate::domain::model::{BatchReport, RecordError, SourceOutcome};
use crate::domain::ports::SecretStore;
use crate::utils::error::{Result, SyncError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Discovering,
    Running(usize),
    Aggregating,
    Done,
}

/// Resolves the input sources, runs one task per source and folds the
/// outcomes into a single report.
pub struct BatchCoordinator<S: SecretStore + 'static> {
    processor: Arc<SourceProcessor<S>>,
    config: Arc<SyncConfig>,
    state: BatchState,
}

impl<S: SecretStore + 'static> BatchCoordinator<S> {
    pub fn new(store: Arc<S>, config: Arc<SyncConfig>) -> Self {
        Self {
            processor: Arc::new(SourceProcessor::new(store, &config)),
            config,
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    fn transition(&mut self, next: BatchState) {
        tracing::debug!("Batch state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Only fails when the input cannot be listed. Per-record and per-source
    /// failures end up in the report.
    pub async fn run(&mut self) -> Result<BatchReport> {
        let started = Instant::now();

        self.transition(BatchState::Discovering);
        let sources = discover_sources(&self.config.input, &self.config.source_extension).await?;
        tracing::info!("Processing {} files", sources.len());

        self.transition(BatchState::Running(sources.len()));
        let limiter = self
            .config
            .max_concurrent_sources
            .map(|limit| Arc::new(Semaphore::new(limit)));

        let mut join_set = JoinSet::new();
        for source in sources {
            let processor = Arc::clone(&self.processor);
            let limiter = limiter.clone();
            join_set.spawn(async move {
                // 限制同時處理的來源數量
                let _permit = match &limiter {
                    Some(semaphore) => semaphore.acquire().await.ok(),
                    None => None,
                };
                processor.process(&source).await
            });
        }

        let mut report = BatchReport::new(self.config.operation);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => report.absorb(outcome),
                Err(e) => {
                    let err = SyncError::from(e);
                    tracing::error!("error: source task aborted: {}", err);
                    report.absorb(SourceOutcome::new(
                        PathBuf::new(),
                        0,
                        vec![RecordError {
                            record_path: String::new(),
                            message: err.to_string(),
                        }],
                    ));
                }
            }
        }

        self.transition(BatchState::Aggregating);
        report.elapsed_seconds = started.elapsed().as_secs_f64();

        self.transition(BatchState::Done);
        Ok(report)
    }
}

/// List the sources named by the input selection. Directory entries are
/// filtered to regular files ending in `extension` and sorted by name.
pub async fn discover_sources(input: &InputSource, extension: &str) -> Result<Vec<PathBuf>> {
    match input {
        InputSource::File(path) => Ok(vec![path.clone()]),
        InputSource::Directory(dir) => list_directory(dir, extension).await,
    }
}

async fn list_directory(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| SyncError::SourceError {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;

    let mut sources = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .map(|name| name.ends_with(extension))
            .unwrap_or(false);
        if matches {
            sources.push(entry.path());
        }
    }

    sources.sort();
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Operation;
    use crate::domain::ports::StoreStatus;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MockStore {
        writes: Mutex<Vec<String>>,
        deletes: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        delay: Option<Duration>,
    }

    #[async_trait::async_trait]
    impl SecretStore for MockStore {
        async fn status(&self) -> Result<StoreStatus> {
            Ok(StoreStatus::default())
        }

        async fn write(&self, path: &str, _fields: &BTreeMap<String, String>) -> Result<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.writes.lock().await.push(path.to_string());
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }

        async fn delete(&self, path: &str) -> Result<()> {
            self.deletes.lock().await.push(path.to_string());
            Ok(())
        }
    }

    fn write_file(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn csv_with_rows(prefix: &str, rows: usize) -> String {
        let mut content = String::from("Secret Name,Folder,value\n");
        for i in 0..rows {
            content.push_str(&format!("{}{},team,v\n", prefix, i));
        }
        content
    }

    fn directory_config(dir: &Path) -> SyncConfig {
        SyncConfig::for_input(InputSource::Directory(dir.to_path_buf()))
    }

    #[tokio::test]
    async fn test_directory_processes_only_matching_files() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.csv", &csv_with_rows("a", 2));
        write_file(dir.path(), "b.csv", &csv_with_rows("b", 3));
        write_file(dir.path(), "c.csv", &csv_with_rows("c", 4));
        write_file(dir.path(), "notes.txt", &csv_with_rows("t", 5));
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let store = Arc::new(MockStore::default());
        let mut coordinator =
            BatchCoordinator::new(store.clone(), Arc::new(directory_config(dir.path())));

        let report = coordinator.run().await.unwrap();

        assert_eq!(coordinator.state(), BatchState::Done);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.total_records, 9);
        assert_eq!(report.total_errors, 0);
        assert_eq!(report.operation, Operation::Upsert);
        assert_eq!(store.writes.lock().await.len(), 9);
    }

    #[tokio::test]
    async fn test_single_file_input() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "one.csv", &csv_with_rows("k", 3));
        write_file(dir.path(), "other.csv", &csv_with_rows("o", 3));

        let store = Arc::new(MockStore::default());
        let config = SyncConfig::for_input(InputSource::File(dir.path().join("one.csv")));
        let mut coordinator = BatchCoordinator::new(store.clone(), Arc::new(config));

        let report = coordinator.run().await.unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.total_records, 3);
    }

    #[tokio::test]
    async fn test_delete_operation_label_is_global() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.csv", &csv_with_rows("a", 1));
        write_file(dir.path(), "b.csv", &csv_with_rows("b", 1));

        let store = Arc::new(MockStore::default());
        let mut config = directory_config(dir.path());
        config.operation = Operation::Delete;
        let mut coordinator = BatchCoordinator::new(store.clone(), Arc::new(config));

        let report = coordinator.run().await.unwrap();

        assert_eq!(report.operation, Operation::Delete);
        assert_eq!(store.deletes.lock().await.len(), 2);
        assert!(store.writes.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MockStore::default());
        let config = directory_config(&dir.path().join("missing"));
        let mut coordinator = BatchCoordinator::new(store, Arc::new(config));

        let err = coordinator.run().await.unwrap_err();

        assert!(matches!(err, SyncError::SourceError { .. }));
        assert_eq!(coordinator.state(), BatchState::Discovering);
    }

    #[tokio::test]
    async fn test_empty_directory_reports_zero() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MockStore::default());
        let mut coordinator =
            BatchCoordinator::new(store, Arc::new(directory_config(dir.path())));

        let report = coordinator.run().await.unwrap();

        assert_eq!(report.total_records, 0);
        assert!(report.outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_limit_is_respected() {
        let dir = TempDir::new().unwrap();
        for i in 0..6 {
            write_file(dir.path(), &format!("s{}.csv", i), &csv_with_rows("k", 2));
        }

        let store = Arc::new(MockStore {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let mut config = directory_config(dir.path());
        config.max_concurrent_sources = Some(2);
        let mut coordinator = BatchCoordinator::new(store.clone(), Arc::new(config));

        let report = coordinator.run().await.unwrap();

        assert_eq!(report.total_records, 12);
        assert!(store.peak_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_discover_sources_sorted_by_name() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "b.csv", "");
        write_file(dir.path(), "a.csv", "");
        write_file(dir.path(), "c.CSV", "");

        let sources = discover_sources(
            &InputSource::Directory(dir.path().to_path_buf()),
            ".csv",
        )
        .await
        .unwrap();

        let names: Vec<String> = sources
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }
}
