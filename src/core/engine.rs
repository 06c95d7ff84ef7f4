use crate::config::SyncConfig;
use crate::core::batch::BatchCoordinator;
use crate::domain::model::BatchReport;
use crate::domain::ports::SecretStore;
use crate::utils::error::Result;
use std::sync::Arc;

/// Top-level run: check the store once, then hand over to the coordinator.
pub struct SyncEngine<S: SecretStore + 'static> {
    store: Arc<S>,
    config: Arc<SyncConfig>,
}

impl<S: SecretStore + 'static> SyncEngine<S> {
    pub fn new(store: S, config: SyncConfig) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }

    pub async fn run(&self) -> Result<BatchReport> {
        if self.config.dry_run {
            tracing::info!("🔍 DRY RUN MODE - Vault will not be contacted");
        } else {
            self.check_store().await?;
        }

        let mut coordinator = BatchCoordinator::new(Arc::clone(&self.store), Arc::clone(&self.config));
        let report = coordinator.run().await?;

        for outcome in &report.outcomes {
            for error in outcome.errors() {
                tracing::warn!(
                    "failed: {} [{}]: {}",
                    error.record_path,
                    outcome.source_path().display(),
                    error.message
                );
            }
        }

        Ok(report)
    }

    async fn check_store(&self) -> Result<()> {
        let status = self.store.status().await?;

        tracing::info!("Found Vault: {}", status.cluster_name);
        tracing::info!("Initialized: {}", status.initialized);
        tracing::info!("Sealed: {}", status.sealed);
        tracing::info!("Token Policies: {:?}", status.policies);
        if status.sealed {
            tracing::warn!("Vault is sealed, every request in this run is expected to fail");
        }
        Ok(())
    }
}
