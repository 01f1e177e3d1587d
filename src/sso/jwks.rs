//! Trusted signing-key-set cache
//!
//! The identity provider's public keys are fetched lazily on first use and
//! kept for the process lifetime. The cache is refreshed when it is older
//! than [`REFRESH_AFTER`] or when a token references a `kid` that is not
//! present (key rotation); rotation refreshes are throttled to
//! [`ROTATION_REFRESH_MIN_INTERVAL`]. This is the only concurrently-mutated
//! shared state in the service.

use jsonwebtoken::{Algorithm, DecodingKey};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::discovery::{self, DiscoveryError};

/// Maximum age of a cached key set before the next lookup re-fetches it
const REFRESH_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

/// Minimum age of the cached key set before a kid miss may trigger a
/// re-fetch. A flood of tokens bearing unknown kids must not turn into a
/// flood of discovery requests against the provider.
const ROTATION_REFRESH_MIN_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A single JSON Web Key as published by the provider
#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    alg: Option<String>,
    #[serde(default, rename = "use")]
    key_use: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

/// A verification key materialized from a JWK entry
#[derive(Clone)]
pub struct VerificationKey {
    pub kid: Option<String>,
    pub alg: Algorithm,
    pub key: DecodingKey,
}

/// The provider's current key set together with its issuer URL
#[derive(Clone)]
pub struct TrustedKeySet {
    pub issuer: String,
    pub keys: Vec<VerificationKey>,
}

struct CachedKeySet {
    set: TrustedKeySet,
    fetched_at: Instant,
}

/// Process-wide signing-key-set cache
pub struct JwksCache {
    http: Client,
    discovery_url: String,
    inner: RwLock<Option<CachedKeySet>>,
}

impl JwksCache {
    pub fn new(http: Client, discovery_url: String) -> Self {
        Self {
            http,
            discovery_url,
            inner: RwLock::new(None),
        }
    }

    /// Return the current key set, fetching it if absent or stale
    pub async fn current(&self) -> Result<TrustedKeySet, DiscoveryError> {
        {
            let guard = self.inner.read().await;
            if let Some(cached) = guard.as_ref() {
                if cached.fetched_at.elapsed() < REFRESH_AFTER {
                    return Ok(cached.set.clone());
                }
            }
        }
        self.refresh().await
    }

    /// Re-fetch after a token referenced an unknown `kid` (key rotation).
    /// Throttled: while the cached set is younger than
    /// [`ROTATION_REFRESH_MIN_INTERVAL`] it is returned unchanged.
    pub async fn refresh_for_rotation(&self) -> Result<TrustedKeySet, DiscoveryError> {
        {
            let guard = self.inner.read().await;
            if let Some(cached) = guard.as_ref() {
                if cached.fetched_at.elapsed() < ROTATION_REFRESH_MIN_INTERVAL {
                    return Ok(cached.set.clone());
                }
            }
        }
        self.refresh().await
    }

    /// Seed the cache with a known key set so tests can run the full
    /// validation pipeline without touching the network
    #[cfg(test)]
    pub async fn preload(&self, set: TrustedKeySet) {
        let mut guard = self.inner.write().await;
        *guard = Some(CachedKeySet {
            set,
            fetched_at: Instant::now(),
        });
    }

    /// Force a re-fetch of the discovery document and key set
    async fn refresh(&self) -> Result<TrustedKeySet, DiscoveryError> {
        let set = self.fetch().await?;
        let mut guard = self.inner.write().await;
        *guard = Some(CachedKeySet {
            set: set.clone(),
            fetched_at: Instant::now(),
        });
        Ok(set)
    }

    async fn fetch(&self) -> Result<TrustedKeySet, DiscoveryError> {
        let metadata = discovery::fetch_metadata(&self.http, &self.discovery_url).await?;

        debug!(url = %metadata.jwks_uri, "Fetching provider signing key set");
        let resp = self.http.get(&metadata.jwks_uri).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!(http_status = %status, url = %metadata.jwks_uri, "Key set endpoint returned error status");
            return Err(DiscoveryError::Status(status));
        }

        let jwks: JwkSet = resp.json().await?;
        let keys: Vec<VerificationKey> = jwks.keys.iter().filter_map(to_verification_key).collect();

        info!(
            issuer = %metadata.issuer,
            key_count = keys.len(),
            "Trusted signing key set refreshed"
        );

        Ok(TrustedKeySet {
            issuer: metadata.issuer,
            keys,
        })
    }
}

/// Materialize a verification key from a JWK entry.
/// Non-RSA keys and keys not marked for signature use are skipped.
fn to_verification_key(jwk: &Jwk) -> Option<VerificationKey> {
    if jwk.kty != "RSA" {
        return None;
    }
    if matches!(jwk.key_use.as_deref(), Some(u) if u != "sig") {
        return None;
    }

    let n = jwk.n.as_deref()?;
    let e = jwk.e.as_deref()?;
    let key = match DecodingKey::from_rsa_components(n, e) {
        Ok(k) => k,
        Err(err) => {
            warn!(kid = ?jwk.kid, error = %err, "Skipping unusable key in provider key set");
            return None;
        }
    };

    let alg = match jwk.alg.as_deref() {
        Some("RS384") => Algorithm::RS384,
        Some("RS512") => Algorithm::RS512,
        _ => Algorithm::RS256,
    };

    Some(VerificationKey {
        kid: jwk.kid.clone(),
        alg,
        key,
    })
}
