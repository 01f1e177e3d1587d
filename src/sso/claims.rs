//! Identity claims extraction
//!
//! Mapping from a validated provider token payload to [`IdentityClaims`] is
//! total: missing optional claims default to empty values, and missing
//! mandatory claims (subject, email) are tolerated here and rejected by the
//! authorization policy instead.

use serde::Deserialize;

/// Raw payload of a validated identity token.
/// Unknown claims are ignored; every field is optional so deserialization
/// never fails on a token that passed cryptographic validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderClaims {
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub upn: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub tid: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Identity asserted by a validated token, for the duration of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    pub subject: String,
    pub email: String,
    pub display_name: String,
    pub given_name: String,
    pub family_name: String,
    pub tenant_id: String,
    pub roles: Vec<String>,
}

/// Map a validated token payload to [`IdentityClaims`].
///
/// Subject falls back from `oid` to `sub`; email falls back from `email`
/// to `preferred_username` to `upn` (directory tokens frequently omit the
/// plain `email` claim).
pub fn extract_identity(payload: &ProviderClaims) -> IdentityClaims {
    let subject = payload
        .oid
        .clone()
        .or_else(|| payload.sub.clone())
        .unwrap_or_default();
    let email = payload
        .email
        .clone()
        .or_else(|| payload.preferred_username.clone())
        .or_else(|| payload.upn.clone())
        .unwrap_or_default();

    IdentityClaims {
        subject,
        email,
        display_name: payload.name.clone().unwrap_or_default(),
        given_name: payload.given_name.clone().unwrap_or_default(),
        family_name: payload.family_name.clone().unwrap_or_default(),
        tenant_id: payload.tid.clone().unwrap_or_default(),
        roles: payload.roles.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_payload_maps_every_field() {
        let payload = ProviderClaims {
            oid: Some("user-1".to_string()),
            sub: Some("pairwise-sub".to_string()),
            email: Some("user@testcompany.com".to_string()),
            preferred_username: Some("user.upn@testcompany.com".to_string()),
            upn: None,
            name: Some("Test User".to_string()),
            given_name: Some("Test".to_string()),
            family_name: Some("User".to_string()),
            tid: Some("tenant-1".to_string()),
            roles: vec!["Sales.Read".to_string()],
        };

        let identity = extract_identity(&payload);
        assert_eq!(identity.subject, "user-1");
        assert_eq!(identity.email, "user@testcompany.com");
        assert_eq!(identity.display_name, "Test User");
        assert_eq!(identity.given_name, "Test");
        assert_eq!(identity.family_name, "User");
        assert_eq!(identity.tenant_id, "tenant-1");
        assert_eq!(identity.roles, vec!["Sales.Read".to_string()]);
    }

    #[test]
    fn test_subject_falls_back_to_sub() {
        let payload = ProviderClaims {
            sub: Some("pairwise-sub".to_string()),
            ..Default::default()
        };
        assert_eq!(extract_identity(&payload).subject, "pairwise-sub");
    }

    #[test]
    fn test_email_falls_back_through_username_claims() {
        let payload = ProviderClaims {
            preferred_username: Some("user@testcompany.com".to_string()),
            ..Default::default()
        };
        assert_eq!(extract_identity(&payload).email, "user@testcompany.com");

        let payload = ProviderClaims {
            upn: Some("upn-user@testcompany.com".to_string()),
            ..Default::default()
        };
        assert_eq!(extract_identity(&payload).email, "upn-user@testcompany.com");
    }

    #[test]
    fn test_empty_payload_is_total() {
        let identity = extract_identity(&ProviderClaims::default());
        assert_eq!(identity.subject, "");
        assert_eq!(identity.email, "");
        assert_eq!(identity.display_name, "");
        assert!(identity.roles.is_empty());
    }
}
