pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::vault::VaultClient;
pub use crate::config::{InputSource, SyncConfig};
pub use crate::core::{batch::BatchCoordinator, engine::SyncEngine, source::SourceProcessor};
pub use crate::domain::model::{BatchReport, Operation, SecretRecord, SourceOutcome};
pub use crate::domain::ports::SecretStore;
pub use crate::utils::error::{Result, SyncError};
