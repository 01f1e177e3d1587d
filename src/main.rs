// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod logging_middleware;
mod sso;

use common::config::{SessionConfig, SsoProviderConfig};
use common::AppState;
use sso::jwks::JwksCache;
use sso::{AuthorizationPolicy, SessionService, SsoValidator};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    // Both loaders refuse to start the process on missing or unsafe values
    // (most importantly a session secret shorter than 32 bytes).
    let provider = SsoProviderConfig::from_env()?;
    let session_config = SessionConfig::from_env()?;
    let policy = AuthorizationPolicy::from_env();

    info!(
        tenant_id = %provider.tenant_id,
        discovery_url = %provider.discovery_url(),
        "Identity provider configured"
    );
    info!(
        allowed_domains = policy.allowed_domain_count(),
        required_roles = policy.required_role_count(),
        session_lifetime_hours = session_config.lifetime_hours,
        "Authorization policy loaded"
    );

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder().build()?;

    let jwks = Arc::new(JwksCache::new(http_client, provider.discovery_url()));
    info!("JwksCache initialized (keys fetched lazily on first validation)");

    let validator = Arc::new(SsoValidator::new(jwks, provider.client_id.clone()));
    info!("SsoValidator initialized");

    let sessions = Arc::new(SessionService::new(&session_config));
    info!("SessionService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        validator,
        sessions,
        policy: Arc::new(policy),
    };

    let shared = Arc::new(app_state);

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        // Add request/response body logging in debug mode
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared.clone()))
        .layer({
            // Get CORS origins from environment variable
            let cors_origins = std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
