//! Identity token validation
//!
//! Pipeline: structural pre-check (no network), signing-key resolution via
//! the cached provider key set, then cryptographic and claims validation
//! (signature, issuer, audience, expiry with clock-skew leeway).
//!
//! The four validation failure kinds are distinguished in logs only; the
//! wire response collapses them all to 401 so rejected callers learn
//! nothing about why a token was refused.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Validation};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::claims::{extract_identity, IdentityClaims, ProviderClaims};
use super::discovery::DiscoveryError;
use super::jwks::{JwksCache, VerificationKey};

/// Tolerance applied to `exp` to absorb clock drift between this process
/// and the identity provider, in seconds.
const CLOCK_SKEW_LEEWAY_SECS: u64 = 300;

/// Why a structurally well-formed token failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("signature did not verify against any trusted key")]
    InvalidSignature,
    #[error("token is expired")]
    Expired,
    #[error("audience does not match the configured client id")]
    InvalidAudience,
    #[error("token validation failed")]
    ValidationFailed,
}

/// Terminal outcome of the validation pipeline. Validation failures are
/// never retried; only `Infrastructure` may be retried by re-issuing the
/// whole request.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("token is not a well-formed signed token")]
    MalformedToken,
    #[error("{0}")]
    Validation(ValidationFailure),
    #[error("identity provider unreachable: {0}")]
    Infrastructure(#[from] DiscoveryError),
}

/// Validates inbound identity tokens against the trusted provider
pub struct SsoValidator {
    jwks: Arc<JwksCache>,
    client_id: String,
}

impl SsoValidator {
    pub fn new(jwks: Arc<JwksCache>, client_id: String) -> Self {
        Self { jwks, client_id }
    }

    /// Run the full pipeline: pre-check, key lookup, verification,
    /// claims extraction.
    pub async fn validate(&self, token: &str) -> Result<IdentityClaims, AuthFailure> {
        // Malformed input must fail before any network call
        if !is_well_formed(token) {
            return Err(AuthFailure::MalformedToken);
        }

        let mut key_set = self.jwks.current().await?;

        let header = jsonwebtoken::decode_header(token)
            .map_err(|_| AuthFailure::Validation(ValidationFailure::ValidationFailed))?;

        let mut candidates = select_keys(&key_set.keys, header.kid.as_deref());
        if candidates.is_empty() {
            if let Some(kid) = header.kid.as_deref() {
                // Unknown kid usually means the provider rotated keys;
                // the cache throttles how often this can hit the provider
                debug!(kid = %kid, "Token kid not in cached key set, refreshing");
                key_set = self.jwks.refresh_for_rotation().await?;
                candidates = select_keys(&key_set.keys, Some(kid));
            }
        }

        let payload = verify_against_keys(token, &candidates, &key_set.issuer, &self.client_id)
            .map_err(AuthFailure::Validation)?;

        Ok(extract_identity(&payload))
    }
}

/// Structural pre-check: three non-empty dot-separated segments, the first
/// two decoding as base64url JSON objects, the third as non-empty signature
/// bytes. Purely syntactic; performs no network I/O.
pub fn is_well_formed(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return false;
    }

    for segment in &segments[..2] {
        let decoded = match URL_SAFE_NO_PAD.decode(segment) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        match serde_json::from_slice::<serde_json::Value>(&decoded) {
            Ok(value) if value.is_object() => {}
            _ => return false,
        }
    }

    matches!(URL_SAFE_NO_PAD.decode(segments[2]), Ok(sig) if !sig.is_empty())
}

/// Keys eligible to verify a token: those matching its `kid`, or every key
/// when the header carries none.
fn select_keys(keys: &[VerificationKey], kid: Option<&str>) -> Vec<VerificationKey> {
    match kid {
        Some(kid) => keys
            .iter()
            .filter(|k| k.kid.as_deref() == Some(kid))
            .cloned()
            .collect(),
        None => keys.to_vec(),
    }
}

/// Verify a token against a set of candidate keys with fixed issuer and
/// audience expectations.
///
/// When several keys are tried, a claims-level failure (expiry, audience)
/// from any key takes precedence over signature mismatches from the
/// others, so the logged reason reflects the key that actually signed the
/// token.
pub(crate) fn verify_against_keys(
    token: &str,
    keys: &[VerificationKey],
    expected_issuer: &str,
    expected_audience: &str,
) -> Result<ProviderClaims, ValidationFailure> {
    let mut failure = ValidationFailure::InvalidSignature;

    for key in keys {
        let mut validation = Validation::new(key.alg);
        validation.leeway = CLOCK_SKEW_LEEWAY_SECS;
        validation.set_issuer(&[expected_issuer]);
        validation.set_audience(&[expected_audience]);

        match decode::<ProviderClaims>(token, &key.key, &validation) {
            Ok(data) => return Ok(data.claims),
            Err(err) => {
                let classified = classify(err.kind());
                if failure == ValidationFailure::InvalidSignature
                    && classified != ValidationFailure::InvalidSignature
                {
                    failure = classified;
                }
            }
        }
    }

    Err(failure)
}

fn classify(kind: &ErrorKind) -> ValidationFailure {
    match kind {
        ErrorKind::InvalidSignature => ValidationFailure::InvalidSignature,
        ErrorKind::ExpiredSignature => ValidationFailure::Expired,
        ErrorKind::InvalidAudience => ValidationFailure::InvalidAudience,
        _ => ValidationFailure::ValidationFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
    use serde_json::json;

    const ISSUER: &str = "https://login.example.com/tenant-1/v2.0";
    const AUDIENCE: &str = "client-123";
    const SECRET: &str = "test_validation_secret";

    fn hs256_key(kid: Option<&str>, secret: &str) -> VerificationKey {
        VerificationKey {
            kid: kid.map(str::to_string),
            alg: Algorithm::HS256,
            key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    fn signed_token(secret: &str, issuer: &str, audience: &str, exp_offset_secs: i64) -> String {
        let exp = (Utc::now() + Duration::seconds(exp_offset_secs)).timestamp();
        let payload = json!({
            "iss": issuer,
            "aud": audience,
            "exp": exp,
            "oid": "user-1",
            "email": "user@testcompany.com",
            "name": "Test User",
            "tid": "tenant-1",
            "roles": ["Sales.Read"],
        });
        encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("failed to encode test token")
    }

    #[test]
    fn test_precheck_rejects_non_jwt_shapes() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("not-a-token"));
        assert!(!is_well_formed("only.two"));
        assert!(!is_well_formed("a.b.c.d"));
        assert!(!is_well_formed("..sig"));
        // segments that are not base64url JSON objects
        assert!(!is_well_formed("!!!.@@@.###"));
        assert!(!is_well_formed("YWJj.YWJj.YWJj")); // "abc" is not a JSON object
    }

    #[test]
    fn test_precheck_accepts_real_token_shape() {
        let token = signed_token(SECRET, ISSUER, AUDIENCE, 3600);
        assert!(is_well_formed(&token));
    }

    #[test]
    fn test_valid_token_yields_payload() {
        let token = signed_token(SECRET, ISSUER, AUDIENCE, 3600);
        let keys = [hs256_key(None, SECRET)];

        let payload = verify_against_keys(&token, &keys, ISSUER, AUDIENCE).unwrap();
        assert_eq!(payload.oid.as_deref(), Some("user-1"));
        assert_eq!(payload.email.as_deref(), Some("user@testcompany.com"));
    }

    #[test]
    fn test_untrusted_key_is_invalid_signature() {
        let token = signed_token("some_other_secret", ISSUER, AUDIENCE, 3600);
        let keys = [hs256_key(None, SECRET)];

        assert_eq!(
            verify_against_keys(&token, &keys, ISSUER, AUDIENCE),
            Err(ValidationFailure::InvalidSignature)
        );
    }

    #[test]
    fn test_expired_token_is_expired() {
        // One hour past expiry, well beyond the 5-minute leeway
        let token = signed_token(SECRET, ISSUER, AUDIENCE, -3600);
        let keys = [hs256_key(None, SECRET)];

        assert_eq!(
            verify_against_keys(&token, &keys, ISSUER, AUDIENCE),
            Err(ValidationFailure::Expired)
        );
    }

    #[test]
    fn test_expiry_within_leeway_is_tolerated() {
        let token = signed_token(SECRET, ISSUER, AUDIENCE, -60);
        let keys = [hs256_key(None, SECRET)];

        assert!(verify_against_keys(&token, &keys, ISSUER, AUDIENCE).is_ok());
    }

    #[test]
    fn test_wrong_audience_is_invalid_audience() {
        let token = signed_token(SECRET, ISSUER, "some-other-client", 3600);
        let keys = [hs256_key(None, SECRET)];

        assert_eq!(
            verify_against_keys(&token, &keys, ISSUER, AUDIENCE),
            Err(ValidationFailure::InvalidAudience)
        );
    }

    #[test]
    fn test_wrong_issuer_is_generic_failure() {
        let token = signed_token(SECRET, "https://evil.example.com", AUDIENCE, 3600);
        let keys = [hs256_key(None, SECRET)];

        assert_eq!(
            verify_against_keys(&token, &keys, ISSUER, AUDIENCE),
            Err(ValidationFailure::ValidationFailed)
        );
    }

    #[test]
    fn test_empty_key_set_is_invalid_signature() {
        let token = signed_token(SECRET, ISSUER, AUDIENCE, 3600);
        assert_eq!(
            verify_against_keys(&token, &[], ISSUER, AUDIENCE),
            Err(ValidationFailure::InvalidSignature)
        );
    }

    #[test]
    fn test_claims_failure_wins_over_signature_mismatch() {
        // Token signed by the second key but expired: the reported reason
        // must be Expired, not the first key's signature mismatch.
        let token = signed_token(SECRET, ISSUER, AUDIENCE, -3600);
        let keys = [hs256_key(None, "unrelated_secret"), hs256_key(None, SECRET)];

        assert_eq!(
            verify_against_keys(&token, &keys, ISSUER, AUDIENCE),
            Err(ValidationFailure::Expired)
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let token = signed_token(SECRET, ISSUER, AUDIENCE, 3600);
        let keys = [hs256_key(None, SECRET)];

        let first = verify_against_keys(&token, &keys, ISSUER, AUDIENCE).is_ok();
        let second = verify_against_keys(&token, &keys, ISSUER, AUDIENCE).is_ok();
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_keys_filters_by_kid() {
        let keys = [
            hs256_key(Some("key-1"), SECRET),
            hs256_key(Some("key-2"), SECRET),
        ];

        let selected = select_keys(&keys, Some("key-2"));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].kid.as_deref(), Some("key-2"));

        assert_eq!(select_keys(&keys, None).len(), 2);
        assert!(select_keys(&keys, Some("key-3")).is_empty());
    }
}
