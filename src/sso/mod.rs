//! # SSO Module
//!
//! Validation of externally-issued identity tokens and issuance of
//! application-local session tokens:
//! - OpenID Connect discovery and signing-key-set caching
//! - Cryptographic and claims validation of inbound bearer tokens
//! - Allow-list authorization (email domain / role)
//! - HS256 session token issuance and verification

pub mod claims;
pub mod discovery;
pub mod jwks;
pub mod policy;
pub mod session;
pub mod validator;

pub use claims::IdentityClaims;
pub use policy::{AuthorizationPolicy, PolicyRejection};
pub use session::{IssuedSession, SessionClaims, SessionService};
pub use validator::{AuthFailure, SsoValidator, ValidationFailure};
