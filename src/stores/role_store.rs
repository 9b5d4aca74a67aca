use std::collections::HashSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::stores::paginate::{contains_ci, paginate, Page};
use crate::types::db::role::{self, Entity as Role};
use crate::types::db::{permission, role_permission, user};

/// A role together with its resolved permission set
#[derive(Debug, Clone)]
pub struct RoleWithPermissions {
    pub role: role::Model,
    pub permissions: Vec<permission::Model>,
}

/// RoleStore manages roles, permissions and their many-to-many link
pub struct RoleStore {
    db: DatabaseConnection,
}

impl RoleStore {
    /// Create a new RoleStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All permission tags, for role editors
    pub async fn permissions(&self) -> Result<Vec<permission::Model>, ApiError> {
        permission::Entity::find()
            .order_by_asc(permission::Column::Name)
            .all(&self.db)
            .await
            .map_err(ApiError::database)
    }

    /// Insert a single permission tag (seeder and tests)
    pub async fn create_permission(&self, name: &str) -> Result<permission::Model, ApiError> {
        let model = permission::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
        };

        model.insert(&self.db).await.map_err(ApiError::database)
    }

    /// One fixed-size page of roles, optionally filtered by name
    pub async fn paginate(
        &self,
        page: u64,
        search: Option<&str>,
    ) -> Result<Page<role::Model>, ApiError> {
        let mut select = Role::find().order_by_asc(role::Column::Name);

        if let Some(term) = search {
            select = select.filter(contains_ci(role::Column::Name, term));
        }

        paginate(&self.db, select, page)
            .await
            .map_err(ApiError::database)
    }

    /// Fetch a role with its permission set populated
    pub async fn find_with_permissions(
        &self,
        id: &str,
    ) -> Result<Option<RoleWithPermissions>, ApiError> {
        let Some(role) = Role::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(ApiError::database)?
        else {
            return Ok(None);
        };

        let permissions = role
            .find_related(permission::Entity)
            .all(&self.db)
            .await
            .map_err(ApiError::database)?;

        Ok(Some(RoleWithPermissions { role, permissions }))
    }

    pub async fn exists(&self, id: &str) -> Result<bool, ApiError> {
        let count = Role::find_by_id(id)
            .count(&self.db)
            .await
            .map_err(ApiError::database)?;

        Ok(count > 0)
    }

    /// Create a role with the given permission ids.
    ///
    /// An empty permission set is allowed (the gate fails closed for such a
    /// role); an unknown permission id is a conflict.
    pub async fn create(
        &self,
        name: String,
        permission_ids: Vec<String>,
    ) -> Result<RoleWithPermissions, ApiError> {
        let permissions = self.resolve_permissions(permission_ids).await?;

        let txn = self.db.begin().await.map_err(ApiError::database)?;

        let role = role::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name),
        };
        let role = role.insert(&txn).await.map_err(ApiError::database)?;

        let links: Vec<role_permission::ActiveModel> = permissions
            .iter()
            .map(|p| role_permission::ActiveModel {
                role_id: Set(role.id.clone()),
                permission_id: Set(p.id.clone()),
            })
            .collect();

        if !links.is_empty() {
            role_permission::Entity::insert_many(links)
                .exec(&txn)
                .await
                .map_err(ApiError::database)?;
        }

        txn.commit().await.map_err(ApiError::database)?;

        Ok(RoleWithPermissions { role, permissions })
    }

    /// Rename a role and replace its permission set
    pub async fn update(
        &self,
        id: &str,
        name: String,
        permission_ids: Vec<String>,
    ) -> Result<RoleWithPermissions, ApiError> {
        let existing = Role::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(ApiError::database)?
            .ok_or_else(|| ApiError::not_found("Role not found"))?;

        let permissions = self.resolve_permissions(permission_ids).await?;

        let txn = self.db.begin().await.map_err(ApiError::database)?;

        let mut active: role::ActiveModel = existing.into();
        active.name = Set(name);
        let role = active.update(&txn).await.map_err(ApiError::database)?;

        // Replace the whole link set rather than diffing it
        role_permission::Entity::delete_many()
            .filter(role_permission::Column::RoleId.eq(id))
            .exec(&txn)
            .await
            .map_err(ApiError::database)?;

        let links: Vec<role_permission::ActiveModel> = permissions
            .iter()
            .map(|p| role_permission::ActiveModel {
                role_id: Set(role.id.clone()),
                permission_id: Set(p.id.clone()),
            })
            .collect();

        if !links.is_empty() {
            role_permission::Entity::insert_many(links)
                .exec(&txn)
                .await
                .map_err(ApiError::database)?;
        }

        txn.commit().await.map_err(ApiError::database)?;

        Ok(RoleWithPermissions { role, permissions })
    }

    /// Delete a role: restrict-if-referenced.
    ///
    /// A role still assigned to users cannot be deleted (409); otherwise the
    /// role and its permission links go together.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let referenced = user::Entity::find()
            .filter(user::Column::RoleId.eq(id))
            .count(&self.db)
            .await
            .map_err(ApiError::database)?;

        if referenced > 0 {
            return Err(ApiError::conflict("Role is still assigned to users"));
        }

        let txn = self.db.begin().await.map_err(ApiError::database)?;

        role_permission::Entity::delete_many()
            .filter(role_permission::Column::RoleId.eq(id))
            .exec(&txn)
            .await
            .map_err(ApiError::database)?;

        let result = Role::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ApiError::database)?;

        if result.rows_affected == 0 {
            return Err(ApiError::not_found("Role not found"));
        }

        txn.commit().await.map_err(ApiError::database)
    }

    /// Look up the given permission ids, rejecting unknown ones
    async fn resolve_permissions(
        &self,
        permission_ids: Vec<String>,
    ) -> Result<Vec<permission::Model>, ApiError> {
        let unique: HashSet<String> = permission_ids.into_iter().collect();
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let found = permission::Entity::find()
            .filter(permission::Column::Id.is_in(unique.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(ApiError::database)?;

        if found.len() != unique.len() {
            return Err(ApiError::conflict("Permission not found"));
        }

        Ok(found)
    }
}
