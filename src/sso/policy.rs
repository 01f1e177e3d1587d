//! Allow-list authorization policy
//!
//! Loaded once at startup and read-only thereafter. The decision is pure
//! and total: expected rejection paths are values, never panics or I/O.

use std::collections::HashSet;
use std::env;
use thiserror::Error;

use super::claims::IdentityClaims;

/// Reason an authorized identity was rejected; surfaced to the wire as 403
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyRejection {
    #[error("claims carry neither a subject id nor an email")]
    InsufficientIdentity,
    #[error("email domain is not on the allow-list")]
    DomainNotAllowed,
    #[error("none of the granted roles are required")]
    RoleNotGranted,
}

/// Process-wide allow-list policy: email domains and required roles.
/// An empty set means that check is disabled.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationPolicy {
    allowed_domains: HashSet<String>,
    required_roles: HashSet<String>,
}

impl AuthorizationPolicy {
    pub fn new(
        allowed_domains: impl IntoIterator<Item = String>,
        required_roles: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            required_roles: required_roles
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    /// Parse `ALLOWED_EMAIL_DOMAINS` and `REQUIRED_ROLES` (comma-separated)
    pub fn from_env() -> Self {
        let domains = env::var("ALLOWED_EMAIL_DOMAINS").unwrap_or_default();
        let roles = env::var("REQUIRED_ROLES").unwrap_or_default();
        Self::new(
            domains.split(',').map(str::to_string),
            roles.split(',').map(str::to_string),
        )
    }

    pub fn allowed_domain_count(&self) -> usize {
        self.allowed_domains.len()
    }

    pub fn required_role_count(&self) -> usize {
        self.required_roles.len()
    }

    /// Decide accept/reject for a validated identity
    pub fn authorize(&self, claims: &IdentityClaims) -> Result<(), PolicyRejection> {
        if claims.subject.is_empty() && claims.email.is_empty() {
            return Err(PolicyRejection::InsufficientIdentity);
        }

        if !self.allowed_domains.is_empty() {
            let domain = email_domain(&claims.email)
                .map(str::to_lowercase)
                .unwrap_or_default();
            if !self.allowed_domains.contains(&domain) {
                return Err(PolicyRejection::DomainNotAllowed);
            }
        }

        if !self.required_roles.is_empty()
            && !claims
                .roles
                .iter()
                .any(|r| self.required_roles.contains(r.as_str()))
        {
            return Err(PolicyRejection::RoleNotGranted);
        }

        Ok(())
    }
}

/// Substring after the first and only `@`, or `None` for anything that is
/// not shaped like an email address.
fn email_domain(email: &str) -> Option<&str> {
    let mut parts = email.split('@');
    let _local = parts.next()?;
    let domain = parts.next()?;
    if parts.next().is_some() || domain.is_empty() {
        return None;
    }
    Some(domain)
}
