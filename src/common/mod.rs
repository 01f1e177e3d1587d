// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod state;

// Re-export commonly used types for convenience
pub use error::ApiError;
pub use helpers::{safe_email_log, safe_token_log};
pub use id_generator::generate_session_jti;
pub use state::AppState;
