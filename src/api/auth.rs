use std::sync::Arc;

use poem_openapi::{
    auth::ApiKey, payload::Json, ApiResponse, OpenApi, SecurityScheme, Tags,
};

use crate::api::helpers;
use crate::errors::{ApiError, FieldError, MessageResponse};
use crate::services::{crypto, sanitize, AuthGate, TokenService};
use crate::stores::{NewUser, UserChanges, UserStore};
use crate::types::dto::auth::{
    LoginRequest, RegisterRequest, UpdateInfoRequest, UpdatePasswordRequest,
};
use crate::types::dto::role::RoleResponse;
use crate::types::dto::user::UserResponse;

/// Session cookie authentication.
///
/// The signed token travels in the HTTP-only `user_session` cookie; a
/// request without the cookie is rejected before the handler runs.
#[derive(SecurityScheme)]
#[oai(ty = "api_key", key_name = "user_session", key_in = "cookie")]
pub struct SessionAuth(pub ApiKey);

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication and account self-service
    Authentication,
}

/// Response that establishes or clears the session cookie
#[derive(ApiResponse, Debug)]
pub enum SessionResponse {
    /// Success; the session cookie rides along in the Set-Cookie header
    #[oai(status = 200)]
    Ok(Json<MessageResponse>, #[oai(header = "Set-Cookie")] String),
}

/// Authentication API endpoints
pub struct AuthApi {
    user_store: Arc<UserStore>,
    token_service: Arc<TokenService>,
    auth_gate: Arc<AuthGate>,
}

impl AuthApi {
    /// Create a new AuthApi with the given store, token service and gate
    pub fn new(
        user_store: Arc<UserStore>,
        token_service: Arc<TokenService>,
        auth_gate: Arc<AuthGate>,
    ) -> Self {
        Self {
            user_store,
            token_service,
            auth_gate,
        }
    }

    /// Re-read the caller's record with its role populated, for responses
    async fn populated_user(&self, id: &str) -> Result<UserResponse, ApiError> {
        let (user, role) = self
            .user_store
            .find_with_role(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        Ok(UserResponse::from_model(user, role.map(RoleResponse::from)))
    }
}

#[OpenApi]
impl AuthApi {
    /// Register a new account
    #[oai(path = "/register", method = "post", tag = "AuthTags::Authentication")]
    async fn register(&self, body: Json<RegisterRequest>) -> Result<Json<UserResponse>, ApiError> {
        let mut errors = Vec::new();
        if !sanitize::valid_email(&body.email) {
            errors.push(FieldError {
                field: "email".to_string(),
                message: "Email must be a valid email address".to_string(),
            });
        }
        if body.password != body.password_confirm {
            errors.push(FieldError {
                field: "password_confirm".to_string(),
                message: "Passwords do not match".to_string(),
            });
        }
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        // Lower-case before both the uniqueness check and the insert
        let username = sanitize::normalize_identity(&body.username);
        let email = sanitize::normalize_identity(&body.email);

        if self.user_store.email_taken(&email, None).await?
            || self.user_store.username_taken(&username, None).await?
        {
            return Err(ApiError::conflict("Email or username already exists"));
        }

        let password_hash = crypto::hash_password(&body.password)?;

        let user = self
            .user_store
            .create(NewUser {
                full_name: body.fullname.clone(),
                username,
                email,
                password_hash,
                role_id: None,
            })
            .await?;

        Ok(Json(UserResponse::from_model(user, None)))
    }

    /// Login with email or username; the session token is delivered as an
    /// HTTP-only cookie
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(&self, body: Json<LoginRequest>) -> Result<SessionResponse, ApiError> {
        let user = match (&body.email, &body.username) {
            (Some(email), _) => {
                self.user_store
                    .find_by_email(&sanitize::normalize_identity(email))
                    .await?
            }
            (None, Some(username)) => {
                self.user_store
                    .find_by_username(&sanitize::normalize_identity(username))
                    .await?
            }
            (None, None) => return Err(ApiError::bad_request("Invalid credentials!")),
        };

        // Unknown account and wrong password are deliberately kept apart
        // (404 vs 400); both carry the same message
        let user = user.ok_or_else(|| ApiError::not_found("Invalid credentials!"))?;

        if !crypto::verify_password(&body.password, &user.password_hash) {
            return Err(ApiError::bad_request("Invalid credentials!"));
        }

        let session = self
            .token_service
            .issue(&user.id, body.remember_me.unwrap_or(false))
            .map_err(|e| ApiError::internal_error(e.to_string()))?;

        Ok(SessionResponse::Ok(
            Json(MessageResponse {
                message: "Successfully Logged In!".to_string(),
            }),
            helpers::session_cookie(&session.token, session.max_age),
        ))
    }

    /// Get the authenticated user, role and permissions included
    #[oai(path = "/user", method = "get", tag = "AuthTags::Authentication")]
    async fn authenticated_user(&self, auth: SessionAuth) -> Result<Json<UserResponse>, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;

        Ok(Json(UserResponse::from_authenticated(current)))
    }

    /// Logout and clear the session cookie.
    ///
    /// There is no server-side revocation list; the cleared cookie is the
    /// whole mechanism, and a stolen token stays valid until expiry.
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(&self, auth: SessionAuth) -> Result<SessionResponse, ApiError> {
        self.auth_gate.authenticate(&auth.0.key).await?;

        Ok(SessionResponse::Ok(
            Json(MessageResponse {
                message: "Successfully Logged Out!".to_string(),
            }),
            helpers::clear_session_cookie(),
        ))
    }

    /// Update the authenticated user's own profile
    #[oai(path = "/user/info", method = "put", tag = "AuthTags::Authentication")]
    async fn update_info(
        &self,
        auth: SessionAuth,
        body: Json<UpdateInfoRequest>,
    ) -> Result<Json<UserResponse>, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;

        let mut changes = UserChanges {
            full_name: body.fullname.clone(),
            ..Default::default()
        };

        if let Some(email) = &body.email {
            if !sanitize::valid_email(email) {
                return Err(ApiError::field(
                    "email",
                    "Email must be a valid email address",
                ));
            }
            let email = sanitize::normalize_identity(email);
            if email != current.user.email {
                if self
                    .user_store
                    .email_taken(&email, Some(&current.user.id))
                    .await?
                {
                    return Err(ApiError::conflict("Email already exists"));
                }
                changes.email = Some(email);
            }
        }

        if let Some(username) = &body.username {
            let username = sanitize::normalize_identity(username);
            if username != current.user.username {
                if self
                    .user_store
                    .username_taken(&username, Some(&current.user.id))
                    .await?
                {
                    return Err(ApiError::conflict("Username already exists"));
                }
                changes.username = Some(username);
            }
        }

        self.user_store.update(&current.user.id, changes).await?;

        Ok(Json(self.populated_user(&current.user.id).await?))
    }

    /// Update the authenticated user's own password
    #[oai(
        path = "/user/password",
        method = "put",
        tag = "AuthTags::Authentication"
    )]
    async fn update_password(
        &self,
        auth: SessionAuth,
        body: Json<UpdatePasswordRequest>,
    ) -> Result<Json<UserResponse>, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;

        if body.password != body.password_confirm {
            return Err(ApiError::field(
                "password_confirm",
                "Passwords do not match",
            ));
        }

        let password_hash = crypto::hash_password(&body.password)?;
        self.user_store
            .update(
                &current.user.id,
                UserChanges {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?;

        Ok(Json(self.populated_user(&current.user.id).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    const TEST_SECRET: &str = "test-secret-key-minimum-32-characters-long";

    async fn setup_api() -> (Arc<UserStore>, Arc<TokenService>, AuthApi) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let user_store = Arc::new(UserStore::new(db));
        let token_service = Arc::new(TokenService::new(TEST_SECRET.to_string()));
        let auth_gate = Arc::new(AuthGate::new(user_store.clone(), token_service.clone()));
        let api = AuthApi::new(user_store.clone(), token_service.clone(), auth_gate);

        (user_store, token_service, api)
    }

    fn register_request() -> Json<RegisterRequest> {
        Json(RegisterRequest {
            fullname: "John Doe".to_string(),
            username: "JohnDoe".to_string(),
            email: "John.Doe@Example.COM".to_string(),
            password: "secret123".to_string(),
            password_confirm: "secret123".to_string(),
        })
    }

    fn login_request(password: &str, remember_me: Option<bool>) -> Json<LoginRequest> {
        Json(LoginRequest {
            email: Some("john.doe@example.com".to_string()),
            username: None,
            password: password.to_string(),
            remember_me,
        })
    }

    fn session(token: &str) -> SessionAuth {
        SessionAuth(ApiKey {
            key: token.to_string(),
        })
    }

    fn cookie_of(response: SessionResponse) -> String {
        let SessionResponse::Ok(_, cookie) = response;
        cookie
    }

    #[tokio::test]
    async fn test_register_lowercases_identity_fields() {
        let (_store, _tokens, api) = setup_api().await;

        let user = api.register(register_request()).await.unwrap();

        assert_eq!(user.username, "johndoe");
        assert_eq!(user.email, "john.doe@example.com");
        assert_eq!(user.fullname, "John Doe");
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict_case_insensitively() {
        let (_store, _tokens, api) = setup_api().await;

        api.register(register_request()).await.unwrap();

        // Different casing, same identity
        let mut dup = register_request();
        dup.0.username = "JOHNDOE".to_string();
        dup.0.email = "JOHN.DOE@EXAMPLE.COM".to_string();

        let result = api.register(dup).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_password_mismatch_is_validation_error() {
        let (_store, _tokens, api) = setup_api().await;

        let mut request = register_request();
        request.0.password_confirm = "different".to_string();

        let result = api.register(request).await;
        match result {
            Err(ApiError::Validation(json)) => {
                assert_eq!(json.0.errors[0].field, "password_confirm");
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_bad_email_is_validation_error() {
        let (_store, _tokens, api) = setup_api().await;

        let mut request = register_request();
        request.0.email = "not-an-email".to_string();

        assert!(matches!(
            api.register(request).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_404() {
        let (_store, _tokens, api) = setup_api().await;

        let result = api.login(login_request("whatever", None)).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_400() {
        let (_store, _tokens, api) = setup_api().await;
        api.register(register_request()).await.unwrap();

        let result = api.login(login_request("wrongpass", None)).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_login_sets_one_day_session_cookie() {
        let (_store, _tokens, api) = setup_api().await;
        api.register(register_request()).await.unwrap();

        let cookie = cookie_of(api.login(login_request("secret123", None)).await.unwrap());

        assert!(cookie.starts_with("user_session="));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
    }

    #[tokio::test]
    async fn test_login_remember_me_sets_one_year_cookie() {
        let (_store, _tokens, api) = setup_api().await;
        api.register(register_request()).await.unwrap();

        let cookie = cookie_of(
            api.login(login_request("secret123", Some(true)))
                .await
                .unwrap(),
        );

        assert!(cookie.contains("Max-Age=31536000"));
    }

    #[tokio::test]
    async fn test_login_by_username_with_mixed_casing() {
        let (_store, _tokens, api) = setup_api().await;
        api.register(register_request()).await.unwrap();

        let request = Json(LoginRequest {
            email: None,
            username: Some("JohnDoe".to_string()),
            password: "secret123".to_string(),
            remember_me: None,
        });

        assert!(api.login(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_authenticated_user_roundtrip_has_no_credential_hash() {
        let (_store, tokens, api) = setup_api().await;
        let registered = api.register(register_request()).await.unwrap();

        let session_token = tokens.issue(&registered.id, false).unwrap().token;
        let user = api
            .authenticated_user(session(&session_token))
            .await
            .unwrap();

        assert_eq!(user.id, registered.id);
        assert_eq!(user.username, "johndoe");
        // Fresh registration carries no role
        assert!(user.role.is_none());
    }

    #[tokio::test]
    async fn test_authenticated_user_with_bad_token_is_401() {
        let (_store, _tokens, api) = setup_api().await;

        let result = api.authenticated_user(session("invalid-token")).await;
        assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let (_store, tokens, api) = setup_api().await;
        let registered = api.register(register_request()).await.unwrap();
        let session_token = tokens.issue(&registered.id, false).unwrap().token;

        let cookie = cookie_of(api.logout(session(&session_token)).await.unwrap());

        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_update_info_renames_and_normalizes() {
        let (_store, tokens, api) = setup_api().await;
        let registered = api.register(register_request()).await.unwrap();
        let session_token = tokens.issue(&registered.id, false).unwrap().token;

        let updated = api
            .update_info(
                session(&session_token),
                Json(UpdateInfoRequest {
                    fullname: Some("Johnny Doe".to_string()),
                    username: Some("Johnny".to_string()),
                    email: None,
                }),
            )
            .await
            .unwrap();

        assert_eq!(updated.fullname, "Johnny Doe");
        assert_eq!(updated.username, "johnny");
    }

    #[tokio::test]
    async fn test_update_info_taken_email_is_conflict() {
        let (_store, tokens, api) = setup_api().await;

        let mut other = register_request();
        other.0.username = "other".to_string();
        other.0.email = "other@example.com".to_string();
        api.register(other).await.unwrap();

        let registered = api.register(register_request()).await.unwrap();
        let session_token = tokens.issue(&registered.id, false).unwrap().token;

        let result = api
            .update_info(
                session(&session_token),
                Json(UpdateInfoRequest {
                    fullname: None,
                    username: None,
                    email: Some("other@example.com".to_string()),
                }),
            )
            .await;

        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_password_mismatch_is_400() {
        let (_store, tokens, api) = setup_api().await;
        let registered = api.register(register_request()).await.unwrap();
        let session_token = tokens.issue(&registered.id, false).unwrap().token;

        let result = api
            .update_password(
                session(&session_token),
                Json(UpdatePasswordRequest {
                    password: "newsecret".to_string(),
                    password_confirm: "other".to_string(),
                }),
            )
            .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_password_changes_login_credential() {
        let (_store, tokens, api) = setup_api().await;
        let registered = api.register(register_request()).await.unwrap();
        let session_token = tokens.issue(&registered.id, false).unwrap().token;

        api.update_password(
            session(&session_token),
            Json(UpdatePasswordRequest {
                password: "newsecret".to_string(),
                password_confirm: "newsecret".to_string(),
            }),
        )
        .await
        .unwrap();

        assert!(matches!(
            api.login(login_request("secret123", None)).await,
            Err(ApiError::BadRequest(_))
        ));
        assert!(api.login(login_request("newsecret", None)).await.is_ok());
    }
}
