use crate::config::VaultSettings;
use crate::domain::ports::{SecretStore, StoreStatus};
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Vault KV v2 client over the HTTP API.
#[derive(Debug, Clone)]
pub struct VaultClient {
    client: Client,
    base_url: Url,
    token: String,
    namespace: Option<String>,
    mount: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SealStatusResponse {
    #[serde(default)]
    cluster_name: Option<String>,
    initialized: bool,
    sealed: bool,
}

#[derive(Debug, Deserialize)]
struct LookupSelfResponse {
    data: LookupSelfData,
}

#[derive(Debug, Deserialize)]
struct LookupSelfData {
    #[serde(default)]
    policies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

impl VaultClient {
    pub fn new(settings: &VaultSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        let namespace = match settings.namespace.trim_matches('/') {
            "" | "root" => None,
            ns => Some(ns.to_string()),
        };

        Ok(Self {
            client,
            base_url: Url::parse(&settings.address)?,
            token: settings.token.clone(),
            namespace,
            mount: split_segments(&settings.kv_mount),
        })
    }

    /// Build `/v1/<parts...>` with every segment percent-encoded.
    fn endpoint<'a>(&self, parts: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| SyncError::ConfigError {
                message: format!("Vault address cannot be a base URL: {}", self.base_url),
            })?;
            segments.pop_if_empty().push("v1").extend(parts);
        }
        Ok(url)
    }

    fn kv_endpoint(&self, kind: &str, path: &str) -> Result<Url> {
        let secret = split_segments(path);
        self.endpoint(
            self.mount
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(kind))
                .chain(secret.iter().map(String::as_str)),
        )
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(TOKEN_HEADER, &self.token);
        match &self.namespace {
            Some(ns) => builder.header(NAMESPACE_HEADER, ns),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, parts: &[&str]) -> Result<T> {
        let url = self.endpoint(parts.iter().copied())?;
        tracing::debug!("Vault request: GET {}", url.path());
        let response = self.request(Method::GET, url).send().await?;
        let response = check_status(response, &parts.join("/")).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    async fn status(&self) -> Result<StoreStatus> {
        let seal: SealStatusResponse = self.get_json(&["sys", "seal-status"]).await?;
        let token: LookupSelfResponse = self.get_json(&["auth", "token", "lookup-self"]).await?;

        Ok(StoreStatus {
            cluster_name: seal.cluster_name.unwrap_or_default(),
            initialized: seal.initialized,
            sealed: seal.sealed,
            policies: token.data.policies,
        })
    }

    async fn write(&self, path: &str, fields: &BTreeMap<String, String>) -> Result<()> {
        let url = self.kv_endpoint("data", path)?;
        tracing::debug!("Vault request: POST {}", url.path());

        let response = self
            .request(Method::POST, url)
            .json(&serde_json::json!({ "data": fields }))
            .send()
            .await?;
        check_status(response, path).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.kv_endpoint("metadata", path)?;
        tracing::debug!("Vault request: DELETE {}", url.path());

        let response = self.request(Method::DELETE, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("{} already absent", path);
            return Ok(());
        }
        check_status(response, path).await?;
        Ok(())
    }
}

fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turn a non-2xx response into `StoreError`, keeping Vault's own messages.
async fn check_status(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed.errors.join("; "),
        _ if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        _ => body.trim().to_string(),
    };

    Err(SyncError::StoreError {
        status: status.as_u16(),
        path: path.to_string(),
        message,
    })
}
