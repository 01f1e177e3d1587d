//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::common::{safe_email_log, ApiError, AppState};
use crate::sso::SessionClaims;

/// Session-authenticated request extractor
///
/// Verifies the bearer session token with the same symmetric key used at
/// issuance. Sessions are stateless, so this consults no storage: a token
/// is valid iff its signature verifies and it has not expired.
#[derive(Debug)]
pub struct SessionUser {
    pub claims: SessionClaims,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let token = match token {
            Some(t) => t,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        // Handle "Bearer <token>" format or raw token
        let bare_token = if let Some(rest) = token.strip_prefix("Bearer ") {
            rest.to_string()
        } else {
            token
        };

        match app_state.sessions.verify(&bare_token) {
            Ok(claims) => {
                debug!(
                    user_id = %claims.sub,
                    email = %safe_email_log(&claims.email),
                    "Session token verified via extractor"
                );
                Ok(SessionUser { claims })
            }
            Err(e) => {
                warn!(error = %e, "Session token verification failed");
                Err(ApiError::Unauthorized("invalid token".into()))
            }
        }
    }
}
