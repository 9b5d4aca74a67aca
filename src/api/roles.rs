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
use crate::services::{sanitize, AuthGate};
use crate::stores::{paginate::clamp_page, RoleStore};
use crate::types::dto::common::DeletedResponse;
use crate::types::dto::role::{
    CreateRoleRequest, PermissionResponse, RoleListResponse, RoleResponse, UpdateRoleRequest,
};

/// API tags for role management endpoints
#[derive(Tags)]
enum RoleTags {
    /// Role and permission management
    Roles,
}

#[derive(ApiResponse, Debug)]
pub enum RoleCreated {
    /// Role created
    #[oai(status = 201)]
    Created(Json<RoleResponse>),
}

#[derive(ApiResponse, Debug)]
pub enum RoleUpdated {
    /// Role updated
    #[oai(status = 202)]
    Accepted(Json<RoleResponse>),
}

/// Role management API endpoints, gated by the `roles` permission tag
pub struct RolesApi {
    auth_gate: Arc<AuthGate>,
    role_store: Arc<RoleStore>,
}

impl RolesApi {
    pub fn new(auth_gate: Arc<AuthGate>, role_store: Arc<RoleStore>) -> Self {
        Self {
            auth_gate,
            role_store,
        }
    }
}

#[OpenApi]
impl RolesApi {
    /// Get all permission tags (for role editors)
    #[oai(path = "/permissions", method = "get", tag = "RoleTags::Roles")]
    async fn permissions(
        &self,
        auth: SessionAuth,
    ) -> Result<Json<Vec<PermissionResponse>>, ApiError> {
        // Session required, but no permission tag: every operator needs the
        // tag list to read its own role
        self.auth_gate.authenticate(&auth.0.key).await?;

        let permissions = self.role_store.permissions().await?;

        Ok(Json(
            permissions.into_iter().map(PermissionResponse::from).collect(),
        ))
    }

    /// Get a paginated list of roles, searchable by name
    #[oai(path = "/roles", method = "get", tag = "RoleTags::Roles")]
    async fn list(
        &self,
        auth: SessionAuth,
        page: Query<Option<u64>>,
        search: Query<Option<String>>,
    ) -> Result<Json<RoleListResponse>, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Read, "roles")?;

        let page = clamp_page(page.0);
        let term = search
            .0
            .map(|s| sanitize::strip_html(&s))
            .filter(|s| !s.is_empty());

        let result = self.role_store.paginate(page, term.as_deref()).await?;

        if let Some(term) = &term {
            if result.data.is_empty() {
                return Err(ApiError::not_found(format!(
                    "No {} matching your search criteria.",
                    term
                )));
            }
        }

        Ok(Json(RoleListResponse {
            data: result.data.into_iter().map(RoleResponse::from).collect(),
            meta: result.meta.into(),
        }))
    }

    /// Create a role with a permission set
    #[oai(path = "/roles", method = "post", tag = "RoleTags::Roles")]
    async fn create(
        &self,
        auth: SessionAuth,
        body: Json<CreateRoleRequest>,
    ) -> Result<RoleCreated, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Write, "roles")?;

        let role = self
            .role_store
            .create(body.name.clone(), body.permissions.clone())
            .await?;

        Ok(RoleCreated::Created(Json(role.into())))
    }

    /// Get a role by ID, permission set included
    #[oai(path = "/roles/:id", method = "get", tag = "RoleTags::Roles")]
    async fn get(
        &self,
        auth: SessionAuth,
        id: Path<String>,
    ) -> Result<Json<RoleResponse>, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Read, "roles")?;

        helpers::require_uuid(&id.0)?;

        let role = self
            .role_store
            .find_with_permissions(&id.0)
            .await?
            .ok_or_else(|| ApiError::not_found("Role not found"))?;

        Ok(Json(role.into()))
    }

    /// Update a role by ID, replacing its permission set
    #[oai(path = "/roles/:id", method = "put", tag = "RoleTags::Roles")]
    async fn update(
        &self,
        auth: SessionAuth,
        id: Path<String>,
        body: Json<UpdateRoleRequest>,
    ) -> Result<RoleUpdated, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Write, "roles")?;

        helpers::require_uuid(&id.0)?;

        let role = self
            .role_store
            .update(&id.0, body.name.clone(), body.permissions.clone())
            .await?;

        Ok(RoleUpdated::Accepted(Json(role.into())))
    }

    /// Delete a role by ID; refused while users still hold it
    #[oai(path = "/roles/:id", method = "delete", tag = "RoleTags::Roles")]
    async fn delete(
        &self,
        auth: SessionAuth,
        id: Path<String>,
    ) -> Result<DeletedResponse, ApiError> {
        let current = self.auth_gate.authenticate(&auth.0.key).await?;
        require(&current, Access::Write, "roles")?;

        helpers::require_uuid(&id.0)?;

        self.role_store.delete(&id.0).await?;

        Ok(DeletedResponse::NoContent)
    }
}
