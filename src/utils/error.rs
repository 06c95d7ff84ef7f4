use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Store request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Worker task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Store returned {status} for '{path}': {message}")]
    StoreError {
        status: u16,
        path: String,
        message: String,
    },

    #[error("Invalid secret path '{path}': {reason}")]
    InvalidRecordPath { path: String, reason: String },

    #[error("Unable to read source '{path}': {message}")]
    SourceError { path: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Store,
    Input,
    Internal,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::ConfigError { .. }
            | SyncError::MissingConfigError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::ConfigValidationError { .. }
            | SyncError::UrlError(_) => ErrorCategory::Configuration,
            SyncError::HttpError(_) | SyncError::StoreError { .. } => ErrorCategory::Store,
            SyncError::CsvError(_)
            | SyncError::IoError(_)
            | SyncError::InvalidRecordPath { .. }
            | SyncError::SourceError { .. } => ErrorCategory::Input,
            SyncError::SerializationError(_) | SyncError::TaskError(_) => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// Process exit status used by the CLI when this error aborts a run.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::Store => 2,
            ErrorCategory::Input => 3,
            ErrorCategory::Internal => 4,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SyncError::MissingConfigError { .. } => {
                "Provide the missing option on the command line, via environment, or in the config file"
            }
            SyncError::InvalidConfigValueError { .. }
            | SyncError::ConfigValidationError { .. }
            | SyncError::ConfigError { .. }
            | SyncError::UrlError(_) => "Check the command line flags and config file values",
            SyncError::HttpError(_) => {
                "Check that the Vault address is reachable and the request timeout is sufficient"
            }
            SyncError::StoreError { status: 401 | 403, .. } => {
                "Check that the Vault token is valid and its policies allow this path"
            }
            SyncError::StoreError { .. } => "Check the Vault server logs for details",
            SyncError::CsvError(_) | SyncError::SourceError { .. } => {
                "Check that the input file is valid CSV with a header row"
            }
            SyncError::IoError(_) => "Check that the input path exists and is readable",
            SyncError::InvalidRecordPath { .. } => {
                "Check that the folder and secret name columns are filled in for every row"
            }
            SyncError::SerializationError(_) | SyncError::TaskError(_) => {
                "Re-run with --verbose and report the failure"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Store => format!("Vault request failed: {}", self),
            ErrorCategory::Input => format!("Input problem: {}", self),
            ErrorCategory::Internal => format!("Unexpected failure: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
