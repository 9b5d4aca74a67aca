use std::sync::Arc;

use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    ApiResponse, OpenApi, Tags,
};

use crate::api::auth::SessionAuth;
use crate::api::helpers;
use crate::errors::ApiError;
use crate::services::permission_gate::{require, Access};
use crate::services::{crypto, sanitize, AuthGate};
use crate::stores::{NewUser, RoleStore, UserChanges, UserStore};
use crate::types::dto::common::DeletedResponse;
use crate::types::dto::role::RoleResponse;
use crate::types::dto::user::{
    CreateUserRequest, CreatedUserResponse, UpdateUserRequest, UserListResponse, UserResponse,
};

/// API tags for user management endpoints
#[derive(Tags)]
enum UserTags {
    /// User management
    Users,
}

#[derive(ApiResponse, Debug)]
pub enum UserCreated {
    /// User created
    #[oai(status = 201)]
    Created(Json<CreatedUserResponse>),
}

#[derive(ApiResponse, Debug)]
pub enum UserUpdated {
    /// User updated
    #[oai(status = 202)]
    Accepted(Json<UserResponse>),
}

/// User management API endpoints, gated by the `users` permission tag
pub struct UsersApi {
    auth_gate: Arc<AuthGate>,
    user_store: Arc<UserStore>,
    role_store: Arc<RoleStore>,
}

impl UsersApi {
    pub fn new(
        auth_gate: Arc<AuthGate>,
        user_store: Arc<UserStore>,
        role_store: Arc<RoleStore>,
    ) -> Self {
        Self {
            auth_gate,
            user_store,
            role_store,
        }
    }

    async fn populated(&self, id: &str) -> Result<UserResponse, ApiError> {
        let (user, role) = self
            .user_store
            .find_with_role(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        Ok(UserResponse::from_model(user, role.map(RoleResponse::from)))
    }
}

#[OpenApi]
impl UsersApi {
    /// Get a paginated list of users, searchable by username or email
    #[oai(path = "/users", method = "get", tag = "UserTags::Users")]
    async fn list(
        &self,
        auth: SessionAuth,
        page: Query<Option<u64>>,
        search: Query<Option<String>>,
    ) -> Result<Json<UserListResponse>, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Read, "users")?;

        let page = crate::stores::paginate::clamp_page(page.0);
        let term = search
            .0
            .map(|s| sanitize::strip_html(&s))
            .filter(|s| !s.is_empty());

        let result = self.user_store.paginate(page, term.as_deref()).await?;

        // An explicit search with no hits is an error; an empty unfiltered
        // collection is not
        if let Some(term) = &term {
            if result.data.is_empty() {
                return Err(ApiError::not_found(format!(
                    "Not found search name '{}'",
                    term
                )));
            }
        }

        Ok(Json(UserListResponse {
            data: result
                .data
                .into_iter()
                .map(|user| UserResponse::from_model(user, None))
                .collect(),
            meta: result.meta.into(),
        }))
    }

    /// Create a user with an assigned role.
    ///
    /// When no password is provided, a generated one-time password is
    /// returned in the response body, exactly once.
    #[oai(path = "/users", method = "post", tag = "UserTags::Users")]
    async fn create(
        &self,
        auth: SessionAuth,
        body: Json<CreateUserRequest>,
    ) -> Result<UserCreated, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Write, "users")?;

        if !sanitize::valid_email(&body.email) {
            return Err(ApiError::field(
                "email",
                "Email must be a valid email address",
            ));
        }

        let username = sanitize::normalize_identity(&body.username);
        let email = sanitize::normalize_identity(&body.email);

        if self.user_store.email_taken(&email, None).await?
            || self.user_store.username_taken(&username, None).await?
        {
            return Err(ApiError::conflict("Email or username already exists"));
        }

        if !self.role_store.exists(&body.role_id).await? {
            return Err(ApiError::conflict("Role not found"));
        }

        let (password, generated_password) = match &body.password {
            Some(password) => (password.clone(), None),
            None => {
                let generated = crypto::generate_secure_password();
                (generated.clone(), Some(generated))
            }
        };
        let password_hash = crypto::hash_password(&password)?;

        let user = self
            .user_store
            .create(NewUser {
                full_name: body.fullname.clone(),
                username,
                email,
                password_hash,
                role_id: Some(body.role_id.clone()),
            })
            .await?;

        Ok(UserCreated::Created(Json(CreatedUserResponse {
            user: self.populated(&user.id).await?,
            generated_password,
        })))
    }

    /// Get a user by ID
    #[oai(path = "/users/:id", method = "get", tag = "UserTags::Users")]
    async fn get(
        &self,
        auth: SessionAuth,
        id: Path<String>,
    ) -> Result<Json<UserResponse>, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Read, "users")?;

        helpers::require_uuid(&id.0)?;

        Ok(Json(self.populated(&id.0).await?))
    }

    /// Update a user by ID
    #[oai(path = "/users/:id", method = "put", tag = "UserTags::Users")]
    async fn update(
        &self,
        auth: SessionAuth,
        id: Path<String>,
        body: Json<UpdateUserRequest>,
    ) -> Result<UserUpdated, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Write, "users")?;

        helpers::require_uuid(&id.0)?;

        let existing = self
            .user_store
            .find_by_id(&id.0)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

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
            if email != existing.email {
                if self.user_store.email_taken(&email, Some(&id.0)).await? {
                    return Err(ApiError::conflict("Email already exists"));
                }
                changes.email = Some(email);
            }
        }

        if let Some(username) = &body.username {
            let username = sanitize::normalize_identity(username);
            if username != existing.username {
                if self
                    .user_store
                    .username_taken(&username, Some(&id.0))
                    .await?
                {
                    return Err(ApiError::conflict("Username already exists"));
                }
                changes.username = Some(username);
            }
        }

        if let Some(role_id) = &body.role_id {
            if !self.role_store.exists(role_id).await? {
                return Err(ApiError::conflict("Role not found"));
            }
            changes.role_id = Some(role_id.clone());
        }

        self.user_store.update(&id.0, changes).await?;

        Ok(UserUpdated::Accepted(Json(self.populated(&id.0).await?)))
    }

    /// Delete a user by ID
    #[oai(path = "/users/:id", method = "delete", tag = "UserTags::Users")]
    async fn delete(
        &self,
        auth: SessionAuth,
        id: Path<String>,
    ) -> Result<DeletedResponse, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Write, "users")?;

        helpers::require_uuid(&id.0)?;

        if !self.user_store.delete(&id.0).await? {
            return Err(ApiError::not_found("User not found"));
        }

        Ok(DeletedResponse::NoContent)
    }
}
