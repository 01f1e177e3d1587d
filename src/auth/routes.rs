//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/validate-sso` - Validate an identity token, mint a session
/// - `POST /api/auth/refresh-session` - Exchange a session token for a fresh one
/// - `GET /api/auth/me` - Get current session user information
/// - `POST /api/auth/logout` - Logout acknowledgement (stateless sessions)
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/validate-sso", post(handlers::validate_sso))
        .route("/api/auth/refresh-session", post(handlers::refresh_session))
        .route("/api/auth/me", get(handlers::me_handler))
        .route("/api/auth/logout", post(handlers::logout_handler))
}
