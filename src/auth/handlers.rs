//! Authentication handlers
//!
//! Validation failures are deliberately coarse on the wire: every
//! cryptographic/claims failure is a bare 401 and every policy rejection a
//! bare 403, while the specific internal reason goes to the logs. Rejected
//! callers learn nothing useful for credential-stuffing enumeration.

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::extractors::SessionUser;
use super::models::{SessionUserInfo, ValidateSsoRequest};
use crate::common::{safe_email_log, safe_token_log, ApiError, AppState};
use crate::sso::session::identity_from_session;
use crate::sso::AuthFailure;

/// POST /api/auth/validate-sso
/// Validates an externally-issued identity token and mints a local
/// session token.
///
/// # Request Body
/// ```json
/// {
///   "accessToken": "<identity provider JWT>",
///   "source": "salesforce"
/// }
/// ```
///
/// # Response
/// ```json
/// {
///   "isValid": true,
///   "user": { ... },
///   "sessionToken": "<jwt>",
///   "expiresAt": "2026-01-01T12:00:00Z"
/// }
/// ```
pub async fn validate_sso(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ValidateSsoRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    info!(
        source = %payload.source.as_deref().unwrap_or("unknown"),
        "Received SSO validation request"
    );

    if payload.access_token.trim().is_empty() {
        warn!("SSO validation rejected: empty access token");
        return Err(ApiError::BadRequest("access token is required".to_string()));
    }

    let identity = match state.validator.validate(&payload.access_token).await {
        Ok(identity) => identity,
        Err(AuthFailure::MalformedToken) => {
            warn!(
                token = %safe_token_log(&payload.access_token),
                "SSO validation rejected: malformed token"
            );
            return Err(ApiError::BadRequest("malformed access token".to_string()));
        }
        Err(AuthFailure::Validation(reason)) => {
            // Specific reason stays in the logs; the response is a bare 401
            warn!(
                reason = %reason,
                token = %safe_token_log(&payload.access_token),
                "SSO validation rejected"
            );
            return Err(ApiError::Unauthorized("token validation failed".to_string()));
        }
        Err(AuthFailure::Infrastructure(e)) => {
            error!(error = %e, "Identity provider unreachable during SSO validation");
            return Err(ApiError::InternalServer(
                "identity provider unavailable".to_string(),
            ));
        }
    };

    if let Err(rejection) = state.policy.authorize(&identity) {
        warn!(
            reason = %rejection,
            user_id = %identity.subject,
            email = %safe_email_log(&identity.email),
            "SSO authorization rejected by policy"
        );
        return Err(ApiError::Forbidden("access denied".to_string()));
    }

    let issued = state.sessions.issue(&identity).map_err(|e| {
        error!(error = %e, user_id = %identity.subject, "Session token encoding error");
        ApiError::InternalServer("session token error".to_string())
    })?;

    info!(
        user_id = %identity.subject,
        email = %safe_email_log(&identity.email),
        expires_at = %issued.expires_at.to_rfc3339(),
        "SSO validation successful, session issued"
    );

    let resp = serde_json::json!({
        "isValid": true,
        "user": SessionUserInfo::from(&identity),
        "sessionToken": issued.token,
        "expiresAt": issued.expires_at.to_rfc3339(),
    });

    Ok(Json(resp))
}

/// POST /api/auth/refresh-session
/// Exchanges a valid, unexpired session token for a fresh one.
///
/// The identity is re-derived from the presented token's own claims; the
/// identity provider is not re-contacted and the allow-list policy is not
/// re-checked here.
///
/// # Response
/// ```json
/// {
///   "sessionToken": "<jwt>",
///   "expiresAt": "2026-01-01T20:00:00Z"
/// }
/// ```
pub async fn refresh_session(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let identity = identity_from_session(&session.claims);

    let issued = state.sessions.issue(&identity).map_err(|e| {
        error!(error = %e, user_id = %identity.subject, "Session token encoding error during refresh");
        ApiError::InternalServer("session token error".to_string())
    })?;

    info!(
        user_id = %identity.subject,
        email = %safe_email_log(&identity.email),
        expires_at = %issued.expires_at.to_rfc3339(),
        "Session refreshed"
    );

    let resp = serde_json::json!({
        "sessionToken": issued.token,
        "expiresAt": issued.expires_at.to_rfc3339(),
    });

    Ok(Json(resp))
}

/// GET /api/auth/me
/// Returns the current session's user information
///
/// # Response
/// ```json
/// {
///   "user": { ... }
/// }
/// ```
pub async fn me_handler(session: SessionUser) -> Result<Json<serde_json::Value>, ApiError> {
    let resp = serde_json::json!({
        "user": SessionUserInfo::from(&session.claims),
    });
    Ok(Json(resp))
}

/// POST /api/auth/logout
/// Logout acknowledgement. Session tokens are stateless, so nothing is
/// invalidated server-side; clients discard the token.
///
/// # Response
/// ```json
/// {
///   "message": "Logout successful"
/// }
/// ```
pub async fn logout_handler(session: SessionUser) -> Result<Json<serde_json::Value>, ApiError> {
    info!(user_id = %session.claims.sub, "User logout acknowledged");
    let resp = serde_json::json!({
        "message": "Logout successful"
    });
    Ok(Json(resp))
}
