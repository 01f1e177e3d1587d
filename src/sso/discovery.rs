//! OpenID Connect discovery document resolution

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

/// Subset of the provider metadata document needed for token validation
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    /// Issuer URL; inbound tokens must carry this `iss`
    pub issuer: String,
    /// URL of the provider's signing key set
    pub jwks_uri: String,
}

/// Infrastructure failure reaching the discovery or key-set endpoint.
/// Not retried internally; the caller must retry the whole request.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("request to identity provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("identity provider returned HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// Fetch the per-tenant discovery document from the identity provider
pub async fn fetch_metadata(
    http: &Client,
    discovery_url: &str,
) -> Result<ProviderMetadata, DiscoveryError> {
    debug!(url = %discovery_url, "Fetching provider discovery document");

    let resp = http.get(discovery_url).send().await.map_err(|e| {
        error!(error = %e, url = %discovery_url, "HTTP error contacting discovery endpoint");
        DiscoveryError::Request(e)
    })?;

    let status = resp.status();
    if !status.is_success() {
        error!(http_status = %status, url = %discovery_url, "Discovery endpoint returned error status");
        return Err(DiscoveryError::Status(status));
    }

    let metadata: ProviderMetadata = resp.json().await?;
    debug!(issuer = %metadata.issuer, "Resolved provider metadata");
    Ok(metadata)
}
