#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::Operation;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{self, Validate};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_VAULT_ADDR: &str = "http://127.0.0.1:8200";
pub const DEFAULT_NAMESPACE: &str = "root";
pub const DEFAULT_KV_MOUNT: &str = "kv";
pub const DEFAULT_SECRET_NAME_COLUMN: &str = "Secret Name";
pub const DEFAULT_FOLDER_COLUMN: &str = "Folder";
pub const DEFAULT_EXTENSION: &str = ".csv";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Directory(PathBuf),
}

#[derive(Clone)]
pub struct VaultSettings {
    pub address: String,
    pub namespace: String,
    pub token: String,
    pub kv_mount: String,
    pub request_timeout_secs: u64,
}

impl fmt::Debug for VaultSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultSettings")
            .field("address", &self.address)
            .field("namespace", &self.namespace)
            .field("token", &"<redacted>")
            .field("kv_mount", &self.kv_mount)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            address: DEFAULT_VAULT_ADDR.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            token: String::new(),
            kv_mount: DEFAULT_KV_MOUNT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSettings {
    pub secret_name: String,
    pub folder: String,
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            secret_name: DEFAULT_SECRET_NAME_COLUMN.to_string(),
            folder: DEFAULT_FOLDER_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Fully resolved, immutable settings for one run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub vault: VaultSettings,
    pub input: InputSource,
    pub columns: ColumnSettings,
    pub operation: Operation,
    pub verbose: bool,
    pub dry_run: bool,
    /// `None` launches every source at once.
    pub max_concurrent_sources: Option<usize>,
    /// Always starts with a dot.
    pub source_extension: String,
    pub log_format: LogFormat,
}

impl SyncConfig {
    /// Defaults for everything except the input selection.
    pub fn for_input(input: InputSource) -> Self {
        Self {
            vault: VaultSettings::default(),
            input,
            columns: ColumnSettings::default(),
            operation: Operation::Upsert,
            verbose: false,
            dry_run: false,
            max_concurrent_sources: None,
            source_extension: DEFAULT_EXTENSION.to_string(),
            log_format: LogFormat::Text,
        }
    }
}

pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

/// Pick exactly one input from a file option and a directory option.
pub fn select_input(file: Option<PathBuf>, dir: Option<PathBuf>) -> Result<InputSource> {
    match (file, dir) {
        (Some(_), Some(_)) => Err(SyncError::ConfigError {
            message: "Only one of --input-csv-file and --input-csv-path may be specified"
                .to_string(),
        }),
        (Some(file), None) => Ok(InputSource::File(file)),
        (None, Some(dir)) => Ok(InputSource::Directory(dir)),
        (None, None) => Err(SyncError::MissingConfigError {
            field: "input-csv-file or input-csv-path".to_string(),
        }),
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("vault-addr", &self.vault.address)?;
        if self.vault.token.trim().is_empty() {
            return Err(SyncError::MissingConfigError {
                field: "vault-token".to_string(),
            });
        }
        validation::validate_mount_path("vault-kv-path", &self.vault.kv_mount)?;
        validation::validate_positive_number(
            "request-timeout",
            self.vault.request_timeout_secs as usize,
            1,
        )?;

        match &self.input {
            InputSource::File(path) => {
                validation::validate_path("input-csv-file", &path.to_string_lossy())?
            }
            InputSource::Directory(path) => {
                validation::validate_path("input-csv-path", &path.to_string_lossy())?
            }
        }

        validation::validate_non_empty_string("secret-source-column", &self.columns.secret_name)?;
        validation::validate_non_empty_string("path-source-column", &self.columns.folder)?;
        if self.columns.secret_name == self.columns.folder {
            return Err(SyncError::InvalidConfigValueError {
                field: "path-source-column".to_string(),
                value: self.columns.folder.clone(),
                reason: "Must differ from the secret source column".to_string(),
            });
        }

        if let Some(limit) = self.max_concurrent_sources {
            validation::validate_positive_number("max-concurrent-sources", limit, 1)?;
        }

        if self.source_extension.len() < 2 {
            return Err(SyncError::InvalidConfigValueError {
                field: "extension".to_string(),
                value: self.source_extension.clone(),
                reason: "Extension cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}
