use poem_openapi::Object;

use crate::stores::RoleWithPermissions;
use crate::types::db::{permission, role};
use crate::types::dto::common::PageMeta;

/// A permission tag of the form `<action>_<resource>`
#[derive(Object, Debug)]
pub struct PermissionResponse {
    pub id: String,

    /// Tag name, e.g. `view_orders`
    pub name: String,
}

impl From<permission::Model> for PermissionResponse {
    fn from(model: permission::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// Response model representing a role
#[derive(Object, Debug)]
pub struct RoleResponse {
    pub id: String,

    pub name: String,

    /// Permission set; populated on single-role reads, omitted in lists
    pub permissions: Option<Vec<PermissionResponse>>,
}

impl From<role::Model> for RoleResponse {
    fn from(model: role::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            permissions: None,
        }
    }
}

impl From<RoleWithPermissions> for RoleResponse {
    fn from(value: RoleWithPermissions) -> Self {
        Self {
            id: value.role.id,
            name: value.role.name,
            permissions: Some(
                value
                    .permissions
                    .into_iter()
                    .map(PermissionResponse::from)
                    .collect(),
            ),
        }
    }
}

/// Paginated role listing
#[derive(Object, Debug)]
pub struct RoleListResponse {
    pub data: Vec<RoleResponse>,
    pub meta: PageMeta,
}

/// Request model for creating a role
#[derive(Object, Debug)]
pub struct CreateRoleRequest {
    /// Role name
    #[oai(validator(min_length = 1, max_length = 100))]
    pub name: String,

    /// Ids of the permissions granted to this role (may be empty)
    pub permissions: Vec<String>,
}

/// Request model for updating a role; the permission set is replaced whole
#[derive(Object, Debug)]
pub struct UpdateRoleRequest {
    #[oai(validator(min_length = 1, max_length = 100))]
    pub name: String,

    pub permissions: Vec<String>,
}
