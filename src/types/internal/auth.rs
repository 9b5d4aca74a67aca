use serde::{Deserialize, Serialize};

use crate::types::db::{permission, role, user};

/// JWT claims carried by the `user_session` cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id (UUID)
    pub sub: String,

    /// Issued-at (Unix timestamp)
    pub iat: i64,

    /// Expiry (Unix timestamp)
    pub exp: i64,
}

/// Fully resolved principal: the user record plus its role and the role's
/// permission tags, re-read from the database on every request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: user::Model,
    pub role: Option<role::Model>,
    pub permissions: Vec<permission::Model>,
}

impl AuthenticatedUser {
    /// Permission tag names for set-membership checks
    pub fn permission_names(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(|p| p.name.as_str())
    }
}
