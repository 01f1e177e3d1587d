// Application state shared across all modules

use std::sync::Arc;

use crate::sso::{AuthorizationPolicy, SessionService, SsoValidator};

/// Application state containing the SSO validator, session issuer, and the
/// process-wide authorization policy. Everything here is read-only after
/// startup; the only concurrently-mutated state is the signing-key cache
/// inside the validator, which carries its own synchronization.
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<SsoValidator>,
    pub sessions: Arc<SessionService>,
    pub policy: Arc<AuthorizationPolicy>,
}
