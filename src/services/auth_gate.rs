use std::sync::Arc;

use crate::errors::ApiError;
use crate::services::TokenService;
use crate::stores::UserStore;
use crate::types::internal::auth::AuthenticatedUser;

/// Authentication gate applied to every session-protected route.
///
/// Resolves the cookie-carried token to a fully populated principal (user +
/// role + permissions). Nothing is cached between requests, so revoking a
/// permission takes effect on the very next request.
pub struct AuthGate {
    user_store: Arc<UserStore>,
    token_service: Arc<TokenService>,
}

impl AuthGate {
    /// Create a new AuthGate over the given UserStore and TokenService
    pub fn new(user_store: Arc<UserStore>, token_service: Arc<TokenService>) -> Self {
        Self {
            user_store,
            token_service,
        }
    }

    /// Resolve a session token to the current user.
    ///
    /// Any failure along the way (bad/expired token, user deleted since the
    /// token was issued) collapses into a single 401 so the response does
    /// not reveal which step rejected the request.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, ApiError> {
        let user_id = self
            .token_service
            .verify(token)
            .map_err(|_| ApiError::unauthenticated())?;

        self.user_store
            .find_for_auth(&user_id)
            .await?
            .ok_or_else(ApiError::unauthenticated)
    }
}
