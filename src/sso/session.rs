//! Session token issuance and verification
//!
//! Session tokens are stateless: validity is entirely signature + expiry
//! at presentation time. Nothing is persisted, so an issued token cannot
//! be revoked before its natural expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::common::config::SessionConfig;
use crate::common::generate_session_jti;

use super::claims::IdentityClaims;

/// Claim set carried by an application-local session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tid: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed session token with its absolute expiry instant
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies symmetric-key session tokens
pub struct SessionService {
    secret: String,
    issuer: String,
    audience: String,
    lifetime_hours: i64,
}

impl SessionService {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime_hours: config.lifetime_hours,
        }
    }

    /// Sign a new session token for an accepted identity.
    /// Pure computation: no record is persisted anywhere.
    pub fn issue(&self, claims: &IdentityClaims) -> Result<IssuedSession, jsonwebtoken::errors::Error> {
        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::hours(self.lifetime_hours);

        let session = SessionClaims {
            sub: claims.subject.clone(),
            email: claims.email.clone(),
            name: claims.display_name.clone(),
            tid: claims.tenant_id.clone(),
            roles: claims.roles.clone(),
            jti: generate_session_jti(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &session,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(IssuedSession { token, expires_at })
    }

    /// Verify a presented session token and return its claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }
}

/// Re-derive an identity from a verified session token's own claims.
///
/// Used by session refresh: the original identity provider is not
/// re-contacted and the authorization policy is not re-checked, so an
/// upstream revocation does not stop refreshes until the token chain is
/// allowed to expire.
pub fn identity_from_session(session: &SessionClaims) -> IdentityClaims {
    IdentityClaims {
        subject: session.sub.clone(),
        email: session.email.clone(),
        display_name: session.name.clone(),
        given_name: String::new(),
        family_name: String::new(),
        tenant_id: session.tid.clone(),
        roles: session.roles.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> SessionService {
        SessionService::new(&SessionConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            issuer: "sso-session-api".to_string(),
            audience: "sso-session-api".to_string(),
            lifetime_hours: 8,
        })
    }

    fn test_identity() -> IdentityClaims {
        IdentityClaims {
            subject: "user-1".to_string(),
            email: "user@testcompany.com".to_string(),
            display_name: "Test User".to_string(),
            given_name: "Test".to_string(),
            family_name: "User".to_string(),
            tenant_id: "tenant-1".to_string(),
            roles: vec!["Sales.Read".to_string()],
        }
    }

    #[test]
    fn test_issued_session_round_trips() {
        let service = test_service();
        let issued = service.issue(&test_identity()).unwrap();

        let claims = service.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "user@testcompany.com");
        assert_eq!(claims.name, "Test User");
        assert_eq!(claims.tid, "tenant-1");
        assert_eq!(claims.roles, vec!["Sales.Read".to_string()]);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_expiry_is_eight_hours_from_issuance() {
        let service = test_service();
        let before = Utc::now();
        let issued = service.issue(&test_identity()).unwrap();
        let after = Utc::now();

        let expected_low = (before + Duration::hours(8)).timestamp() - 1;
        let expected_high = (after + Duration::hours(8)).timestamp() + 1;
        let exp = issued.expires_at.timestamp();
        assert!(exp >= expected_low && exp <= expected_high);
    }

    #[test]
    fn test_two_issuances_produce_distinct_tokens() {
        let service = test_service();
        let identity = test_identity();

        let first = service.issue(&identity).unwrap();
        let second = service.issue(&identity).unwrap();
        // jti differs even when iat lands in the same second
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let issuing = test_service();
        let verifying = SessionService::new(&SessionConfig {
            secret: "another_secret_another_secret_!!".to_string(),
            issuer: "sso-session-api".to_string(),
            audience: "sso-session-api".to_string(),
            lifetime_hours: 8,
        });

        let issued = issuing.issue(&test_identity()).unwrap();
        assert!(verifying.verify(&issued.token).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_audience() {
        let issuing = test_service();
        let verifying = SessionService::new(&SessionConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            issuer: "sso-session-api".to_string(),
            audience: "some-other-service".to_string(),
            lifetime_hours: 8,
        });

        let issued = issuing.issue(&test_identity()).unwrap();
        assert!(verifying.verify(&issued.token).is_err());
    }

    #[test]
    fn test_identity_round_trips_through_session() {
        let service = test_service();
        let issued = service.issue(&test_identity()).unwrap();
        let claims = service.verify(&issued.token).unwrap();

        let identity = identity_from_session(&claims);
        assert_eq!(identity.subject, "user-1");
        assert_eq!(identity.email, "user@testcompany.com");
        assert_eq!(identity.display_name, "Test User");
        assert_eq!(identity.tenant_id, "tenant-1");
        assert_eq!(identity.roles, vec!["Sales.Read".to_string()]);
        // Given/family names are not carried by session tokens
        assert_eq!(identity.given_name, "");
        assert_eq!(identity.family_name, "");
    }

    #[test]
    fn test_refresh_extends_expiry() {
        let service = test_service();
        let first = service.issue(&test_identity()).unwrap();

        let claims = service.verify(&first.token).unwrap();
        let refreshed = service.issue(&identity_from_session(&claims)).unwrap();

        assert_ne!(first.token, refreshed.token);
        assert!(refreshed.expires_at >= first.expires_at);
    }
}
