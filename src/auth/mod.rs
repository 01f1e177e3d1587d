//! # Auth Module
//!
//! This module exposes the SSO endpoints:
//! - Identity token validation and session issuance
//! - Session refresh
//! - Current-user lookup and logout
//! - SessionUser extractor for session-protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;


pub use extractors::SessionUser;
pub use routes::auth_routes;
