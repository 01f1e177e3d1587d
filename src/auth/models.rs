//! Authentication data models

use serde::{Deserialize, Serialize};

use crate::sso::{IdentityClaims, SessionClaims};

/// Request body for SSO token validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateSsoRequest {
    #[serde(default)]
    pub access_token: String,
    /// Integration that forwarded the token (e.g. "salesforce"); log-only
    #[serde(default)]
    pub source: Option<String>,
}

/// User info returned alongside an issued session token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub tenant_id: String,
    pub roles: Vec<String>,
}

impl From<&IdentityClaims> for SessionUserInfo {
    fn from(claims: &IdentityClaims) -> Self {
        Self {
            id: claims.subject.clone(),
            email: claims.email.clone(),
            name: claims.display_name.clone(),
            tenant_id: claims.tenant_id.clone(),
            roles: claims.roles.clone(),
        }
    }
}

impl From<&SessionClaims> for SessionUserInfo {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            tenant_id: claims.tid.clone(),
            roles: claims.roles.clone(),
        }
    }
}
