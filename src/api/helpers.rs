use uuid::Uuid;

use crate::errors::ApiError;
use crate::services::token_service::SESSION_COOKIE;

/// Build the Set-Cookie value that delivers a session token.
///
/// HTTP-only and SameSite=Strict: the token is never readable from page
/// scripts and never rides along on cross-site requests.
pub fn session_cookie(token: &str, max_age: i64) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Strict",
        SESSION_COOKIE, token, max_age
    )
}

/// Build the Set-Cookie value that clears the session on logout
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Strict",
        SESSION_COOKIE
    )
}

/// Reject malformed resource ids before they reach a query
pub fn require_uuid(id: &str) -> Result<(), ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::not_allowed())?;
    Ok(())
}
