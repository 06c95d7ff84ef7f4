use crate::utils::error::{Result, SyncError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SyncError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// A KV mount may be nested (`teams/kv`). Surrounding slashes are ignored,
/// empty inner segments are not.
pub fn validate_mount_path(field_name: &str, mount: &str) -> Result<()> {
    validate_non_empty_string(field_name, mount)?;

    if mount.trim_matches('/').split('/').any(str::is_empty) {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: mount.to_string(),
            reason: "Mount path contains an empty segment".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("vault_addr", "https://vault.example.com:8200").is_ok());
        assert!(validate_url("vault_addr", "http://127.0.0.1:8200").is_ok());
        assert!(validate_url("vault_addr", "").is_err());
        assert!(validate_url("vault_addr", "invalid-url").is_err());
        assert!(validate_url("vault_addr", "ftp://vault.example.com").is_err());
    }

    #[test]
    fn test_validate_mount_path() {
        assert!(validate_mount_path("vault_kv_path", "kv").is_ok());
        assert!(validate_mount_path("vault_kv_path", "teams/kv").is_ok());
        assert!(validate_mount_path("vault_kv_path", "/kv/").is_ok());
        assert!(validate_mount_path("vault_kv_path", "teams//kv").is_err());
        assert!(validate_mount_path("vault_kv_path", "  ").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("max_concurrent_sources", 4, 1).is_ok());
        assert!(validate_positive_number("max_concurrent_sources", 0, 1).is_err());
    }
}
