use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::types::internal::auth::Claims;

/// Name of the session cookie carrying the signed token
pub const SESSION_COOKIE: &str = "user_session";

const SESSION_TTL_DAYS: i64 = 1;
const REMEMBER_ME_TTL_DAYS: i64 = 365;

/// Session token failures
///
/// Verification collapses every failure mode (bad signature, malformed
/// payload, past expiry) into `InvalidOrExpired`; callers respond 401 and
/// the client re-authenticates. There is no refresh or rotation.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid or expired session token")]
    InvalidOrExpired,

    #[error("failed to sign session token: {0}")]
    Signing(String),
}

/// A freshly issued session token with its cookie lifetime
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    /// Unix timestamp at which `verify` starts rejecting the token
    pub expires_at: i64,
    /// Cookie Max-Age in seconds (86400, or 31536000 with remember-me)
    pub max_age: i64,
}

/// Issues and verifies signed, time-limited session tokens.
///
/// Tokens are not persisted; validity is purely cryptographic plus expiry,
/// so a stolen non-expired token remains valid until natural expiry.
pub struct TokenService {
    jwt_secret: String,
}

impl TokenService {
    /// Create a new TokenService with the given signing secret
    ///
    /// The secret is validated at startup (`Settings::from_env`); a missing
    /// key is a fatal configuration error, never a per-request one.
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    /// Issue a session token for the given user id
    ///
    /// Expiry is 1 day, or 365 days when `remember_me` is set.
    pub fn issue(&self, user_id: &str, remember_me: bool) -> Result<IssuedSession, TokenError> {
        let ttl = if remember_me {
            Duration::days(REMEMBER_ME_TTL_DAYS)
        } else {
            Duration::days(SESSION_TTL_DAYS)
        };

        let now = Utc::now();
        let expires_at = (now + ttl).timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedSession {
            token,
            expires_at,
            max_age: ttl.num_seconds(),
        })
    }

    /// Verify a session token and return the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|_| TokenError::InvalidOrExpired)?;

        Ok(token_data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-minimum-32-characters-long";

    fn service() -> TokenService {
        TokenService::new(TEST_SECRET.to_string())
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let session = service().issue("user-123", false).unwrap();

        assert!(!session.token.is_empty());
        assert_eq!(service().verify(&session.token).unwrap(), "user-123");
    }

    #[test]
    fn test_default_session_lasts_one_day() {
        let session = service().issue("user-123", false).unwrap();

        assert_eq!(session.max_age, 24 * 60 * 60);

        let now = Utc::now().timestamp();
        // Valid now, gone after the day is over
        assert!(session.expires_at > now);
        assert!(session.expires_at <= now + 24 * 60 * 60);
    }

    #[test]
    fn test_remember_me_session_lasts_a_year() {
        let session = service().issue("user-123", true).unwrap();

        assert_eq!(session.max_age, 365 * 24 * 60 * 60);

        let now = Utc::now().timestamp();
        // Still valid at the 1-day mark that expires a normal session
        assert!(session.expires_at > now + 24 * 60 * 60);
        assert!(session.expires_at <= now + 365 * 24 * 60 * 60);
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        // Craft a token whose lifetime has already elapsed
        let now = Utc::now().timestamp();
        let expired_claims = Claims {
            sub: "user-123".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };

        let expired_token = encode(
            &Header::new(Algorithm::HS256),
            &expired_claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service().verify(&expired_token),
            Err(TokenError::InvalidOrExpired)
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let session = service().issue("user-123", false).unwrap();

        let other = TokenService::new("another-secret-key-minimum-32-chars".to_string());
        assert!(matches!(
            other.verify(&session.token),
            Err(TokenError::InvalidOrExpired)
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_token() {
        assert!(matches!(
            service().verify("not.a.jwt"),
            Err(TokenError::InvalidOrExpired)
        ));
    }
}
