//! Registry query service.
//!
//! Existence checks go through the registry's RPC interface
//! (`/rpc/?v=5&type=info&arg=<name>`). The identifier is passed as an encoded
//! query parameter, never spliced into the URL by hand.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::RegistryError;
use crate::name::PackageName;

/// One package record as returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegistryPackage {
    /// Package name.
    pub name: String,
    /// Base the package is built from, when it differs from `name`.
    #[serde(default)]
    pub package_base: Option<String>,
    /// Full version, `pkgver-pkgrel`.
    pub version: String,
    /// One-line description.
    #[serde(default)]
    pub description: Option<String>,
    /// Path of the snapshot tarball on the registry.
    #[serde(default, rename = "URLPath")]
    pub url_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<RegistryPackage>,
}

/// Read access to the registry's package index.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Look a package up by exact name. An empty result means "not found".
    async fn lookup(&self, name: &PackageName) -> Result<Vec<RegistryPackage>, RegistryError>;
}

/// [`RegistryClient`] speaking the registry's v5 RPC over HTTP.
#[derive(Debug, Clone)]
pub struct AurRpcClient {
    client: Client,
    base_url: String,
}

impl AurRpcClient {
    /// Create a client for the registry rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RegistryError> {
        let client = Client::builder().user_agent(crate::USER_AGENT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing connection pool.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    fn rpc_url(&self) -> String {
        format!("{}/rpc/", self.base_url)
    }
}

#[async_trait]
impl RegistryClient for AurRpcClient {
    async fn lookup(&self, name: &PackageName) -> Result<Vec<RegistryPackage>, RegistryError> {
        let response = self
            .client
            .get(self.rpc_url())
            .query(&[("v", "5"), ("type", "info"), ("arg", name.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: RpcResponse = serde_json::from_str(&body)?;
        if parsed.kind == "error" {
            return Err(RegistryError::Api(
                parsed.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        tracing::debug!(package = %name, hits = parsed.results.len(), "registry lookup");
        Ok(parsed.results)
    }
}
