use crate::config::toml_config::TomlConfig;
use crate::config::{
    normalize_extension, select_input, ColumnSettings, LogFormat, SyncConfig, VaultSettings,
    DEFAULT_EXTENSION, DEFAULT_FOLDER_COLUMN, DEFAULT_KV_MOUNT, DEFAULT_NAMESPACE,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SECRET_NAME_COLUMN, DEFAULT_VAULT_ADDR,
};
use crate::domain::model::Operation;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "vault-csv-sync")]
#[command(about = "Bulk create (or undo) Vault KV v2 secrets described in CSV files")]
pub struct CliConfig {
    /// Vault address [default: http://127.0.0.1:8200]
    #[arg(long, alias = "vaultAddr", env = "VAULT_ADDR")]
    pub vault_addr: Option<String>,

    /// Vault namespace [default: root]
    #[arg(long, alias = "vaultNamespace", env = "VAULT_NAMESPACE")]
    pub vault_namespace: Option<String>,

    /// Vault token
    #[arg(long, alias = "vaultToken", env = "VAULT_TOKEN", hide_env_values = true)]
    pub vault_token: Option<String>,

    /// Path to a specific CSV file to be processed
    #[arg(long, alias = "inputCsvFile", conflicts_with = "input_csv_path")]
    pub input_csv_file: Option<PathBuf>,

    /// Path to a directory containing one or more CSV files to be processed
    #[arg(long, alias = "inputCsvPath")]
    pub input_csv_path: Option<PathBuf>,

    /// Vault KV v2 mount path [default: kv]
    #[arg(long, alias = "vaultKvPath")]
    pub vault_kv_path: Option<String>,

    /// CSV column header used for the secret name [default: "Secret Name"]
    #[arg(long, alias = "secretSourceColumn")]
    pub secret_source_column: Option<String>,

    /// CSV column header used to determine the KV path [default: Folder]
    #[arg(long, alias = "pathSourceColumn")]
    pub path_source_column: Option<String>,

    /// Log every record before it is sent to Vault
    #[arg(short, long)]
    pub verbose: bool,

    /// Delete the secrets referenced in the CSV input instead of creating them
    #[arg(long)]
    pub undo: bool,

    /// Translate and log every record without calling Vault
    #[arg(long)]
    pub dry_run: bool,

    /// Upper bound on CSV files processed at once [default: unbounded]
    #[arg(long)]
    pub max_concurrent_sources: Option<usize>,

    /// Per-request timeout in seconds [default: 30]
    #[arg(long)]
    pub request_timeout: Option<u64>,

    /// Optional TOML file with the same settings; flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// `json` also prints the final report as one JSON object
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load the optional config file and merge it under the command line.
    pub fn resolve(&self) -> Result<SyncConfig> {
        let file = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.merge(file)
    }

    pub fn merge(&self, file: TomlConfig) -> Result<SyncConfig> {
        let input = if self.input_csv_file.is_some() || self.input_csv_path.is_some() {
            select_input(self.input_csv_file.clone(), self.input_csv_path.clone())?
        } else {
            select_input(
                file.input.csv_file.map(PathBuf::from),
                file.input.csv_dir.map(PathBuf::from),
            )?
        };

        let vault = VaultSettings {
            address: pick(&self.vault_addr, file.vault.address, DEFAULT_VAULT_ADDR),
            namespace: pick(&self.vault_namespace, file.vault.namespace, DEFAULT_NAMESPACE),
            token: pick(&self.vault_token, file.vault.token, ""),
            kv_mount: pick(&self.vault_kv_path, file.vault.kv_mount, DEFAULT_KV_MOUNT),
            request_timeout_secs: self
                .request_timeout
                .or(file.vault.request_timeout_seconds)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let columns = ColumnSettings {
            secret_name: pick(
                &self.secret_source_column,
                file.columns.secret_name,
                DEFAULT_SECRET_NAME_COLUMN,
            ),
            folder: pick(
                &self.path_source_column,
                file.columns.folder,
                DEFAULT_FOLDER_COLUMN,
            ),
        };

        let undo = self.undo || file.run.undo.unwrap_or(false);

        Ok(SyncConfig {
            vault,
            input,
            columns,
            operation: Operation::from_undo(undo),
            verbose: self.verbose || file.run.verbose.unwrap_or(false),
            dry_run: self.dry_run || file.run.dry_run.unwrap_or(false),
            max_concurrent_sources: self
                .max_concurrent_sources
                .or(file.run.max_concurrent_sources),
            source_extension: normalize_extension(
                file.input.extension.as_deref().unwrap_or(DEFAULT_EXTENSION),
            ),
            log_format: self.log_format,
        })
    }
}

fn pick(flag: &Option<String>, file: Option<String>, default: &str) -> String {
    flag.clone()
        .or(file)
        .unwrap_or_else(|| default.to_string())
}
