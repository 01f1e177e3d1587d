// src/common/config.rs
//! Typed configuration loaded from the environment at startup

use anyhow::{bail, Context};
use std::env;

/// Minimum length of the symmetric session signing secret, in bytes.
/// HS256 with a shorter secret is trivially brute-forceable.
pub const MIN_SESSION_SECRET_BYTES: usize = 32;

/// Identity provider configuration for SSO token validation
#[derive(Debug, Clone)]
pub struct SsoProviderConfig {
    /// Base URL of the identity provider instance
    pub instance: String,
    /// Directory (tenant) identifier used to build the discovery URL
    pub tenant_id: String,
    /// Application client id; inbound tokens must carry this audience
    pub client_id: String,
}

impl SsoProviderConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let instance = env::var("SSO_INSTANCE")
            .unwrap_or_else(|_| "https://login.microsoftonline.com".to_string());
        let tenant_id = env::var("SSO_TENANT_ID").context("SSO_TENANT_ID must be set")?;
        let client_id = env::var("SSO_CLIENT_ID").context("SSO_CLIENT_ID must be set")?;

        if tenant_id.trim().is_empty() {
            bail!("SSO_TENANT_ID must not be empty");
        }
        if client_id.trim().is_empty() {
            bail!("SSO_CLIENT_ID must not be empty");
        }

        Ok(Self {
            instance,
            tenant_id,
            client_id,
        })
    }

    /// Per-tenant OpenID Connect discovery document URL
    pub fn discovery_url(&self) -> String {
        format!(
            "{}/{}/v2.0/.well-known/openid-configuration",
            self.instance.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

/// Local session token configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Symmetric signing secret, at least [`MIN_SESSION_SECRET_BYTES`] bytes
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub lifetime_hours: i64,
}

impl SessionConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        if secret.len() < MIN_SESSION_SECRET_BYTES {
            bail!(
                "SESSION_SECRET must be at least {} bytes, got {} (run `cargo run --bin generate_session_secret`)",
                MIN_SESSION_SECRET_BYTES,
                secret.len()
            );
        }

        let issuer = env::var("SESSION_ISSUER").unwrap_or_else(|_| "sso-session-api".to_string());
        let audience =
            env::var("SESSION_AUDIENCE").unwrap_or_else(|_| "sso-session-api".to_string());
        let lifetime_hours = env::var("SESSION_LIFETIME_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(8);
        if lifetime_hours <= 0 {
            bail!("SESSION_LIFETIME_HOURS must be positive");
        }

        Ok(Self {
            secret,
            issuer,
            audience,
            lifetime_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_url_format() {
        let config = SsoProviderConfig {
            instance: "https://login.microsoftonline.com/".to_string(),
            tenant_id: "common".to_string(),
            client_id: "client-123".to_string(),
        };
        assert_eq!(
            config.discovery_url(),
            "https://login.microsoftonline.com/common/v2.0/.well-known/openid-configuration"
        );
    }
}
