use poem_openapi::Object;

use crate::types::db::user;
use crate::types::dto::common::{format_timestamp, PageMeta};
use crate::types::dto::role::{PermissionResponse, RoleResponse};
use crate::types::internal::auth::AuthenticatedUser;

/// Response model representing a user.
///
/// The credential hash never appears here, or in any nested shape.
#[derive(Object, Debug)]
pub struct UserResponse {
    pub id: String,

    /// Full display name
    pub fullname: String,

    pub username: String,

    pub email: String,

    /// Id of the assigned role, if any
    pub role_id: Option<String>,

    /// Assigned role; populated on single-user reads
    pub role: Option<RoleResponse>,

    /// Timestamp when the user was created (ISO 8601 format)
    pub created_at: String,
}

impl UserResponse {
    /// Build a response from a user record and an optional populated role
    pub fn from_model(user: user::Model, role: Option<RoleResponse>) -> Self {
        Self {
            id: user.id,
            fullname: user.full_name,
            username: user.username,
            email: user.email,
            role_id: user.role_id,
            role,
            created_at: format_timestamp(user.created_at),
        }
    }

    /// Build a response from a resolved principal, role and permissions
    /// included
    pub fn from_authenticated(current: AuthenticatedUser) -> Self {
        let role = current.role.map(|role| RoleResponse {
            id: role.id,
            name: role.name,
            permissions: Some(
                current
                    .permissions
                    .into_iter()
                    .map(PermissionResponse::from)
                    .collect(),
            ),
        });

        Self::from_model(current.user, role)
    }
}

/// Paginated user listing
#[derive(Object, Debug)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub meta: PageMeta,
}

/// Request model for an admin creating a user
#[derive(Object, Debug)]
pub struct CreateUserRequest {
    /// Full display name
    #[oai(validator(min_length = 1, max_length = 100))]
    pub fullname: String,

    #[oai(validator(min_length = 3, max_length = 30))]
    pub username: String,

    pub email: String,

    /// Id of the role to assign
    pub role_id: String,

    /// Initial password; when omitted a one-time password is generated and
    /// returned once in the create response
    #[oai(validator(min_length = 6))]
    pub password: Option<String>,
}

/// Response for a created user, carrying the generated one-time password
/// when no initial password was provided
#[derive(Object, Debug)]
pub struct CreatedUserResponse {
    #[oai(flatten)]
    pub user: UserResponse,

    /// Generated one-time password; returned exactly once, never stored in
    /// plaintext
    pub generated_password: Option<String>,
}

/// Request model for an admin updating a user
#[derive(Object, Debug)]
pub struct UpdateUserRequest {
    #[oai(validator(min_length = 1, max_length = 100))]
    pub fullname: Option<String>,

    #[oai(validator(min_length = 3, max_length = 30))]
    pub username: Option<String>,

    pub email: Option<String>,

    pub role_id: Option<String>,
}
