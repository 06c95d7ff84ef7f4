use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatus {
    pub cluster_name: String,
    pub initialized: bool,
    pub sealed: bool,
    pub policies: Vec<String>,
}

/// Versioned key-value secret store. Implementations must be safe to share
/// between concurrently running source tasks.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Health and identity check performed once before any work starts.
    async fn status(&self) -> Result<StoreStatus>;

    /// Create or fully replace the secret at `path`.
    async fn write(&self, path: &str, fields: &BTreeMap<String, String>) -> Result<()>;

    /// Remove the secret at `path` with all of its versions. Removing an
    /// absent path succeeds.
    async fn delete(&self, path: &str) -> Result<()>;
}
