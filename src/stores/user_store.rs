use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::stores::paginate::{contains_ci, paginate, Page};
use crate::types::db::user::{self, Entity as User};
use crate::types::db::{permission, role};
use crate::types::internal::auth::AuthenticatedUser;

/// Fields for a new user record.
///
/// `username` and `email` are expected to be normalized (trimmed,
/// lower-cased) by the caller, and `password_hash` already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: Option<String>,
}

/// Partial update for an existing user; only `Some` fields are written
#[derive(Debug, Default)]
pub struct UserChanges {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<String>,
    pub password_hash: Option<String>,
}

/// UserStore manages user records and their role references
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create a new UserStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Handle to the underlying connection, for wiring in tests and the seeder
    pub fn connection(&self) -> DatabaseConnection {
        self.db.clone()
    }

    /// Insert a new user
    ///
    /// The uniqueness pre-checks live in the API layer; a racing duplicate
    /// that slips past them trips the unique indexes and maps to 409 here.
    pub async fn create(&self, new: NewUser) -> Result<user::Model, ApiError> {
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            full_name: Set(new.full_name),
            username: Set(new.username),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            created_at: Set(Utc::now().timestamp()),
            role_id: Set(new.role_id),
        };

        model.insert(&self.db).await.map_err(|e| {
            // Check for a unique-index violation: the pre-checks are not
            // wrapped in a transaction, so a racing duplicate lands here
            if e.to_string().contains("UNIQUE") {
                ApiError::conflict("Email or username already exists")
            } else {
                ApiError::database(e)
            }
        })
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<user::Model>, ApiError> {
        User::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(ApiError::database)
    }

    /// Fetch a user together with its role (if any)
    pub async fn find_with_role(
        &self,
        id: &str,
    ) -> Result<Option<(user::Model, Option<role::Model>)>, ApiError> {
        User::find_by_id(id)
            .find_also_related(role::Entity)
            .one(&self.db)
            .await
            .map_err(ApiError::database)
    }

    /// Resolve a user id to a fully populated principal for the auth gate:
    /// the user record, its role, and the role's permission set.
    pub async fn find_for_auth(
        &self,
        id: &str,
    ) -> Result<Option<AuthenticatedUser>, ApiError> {
        let Some((user, role)) = self.find_with_role(id).await? else {
            return Ok(None);
        };

        let permissions = match &role {
            Some(role) => role
                .find_related(permission::Entity)
                .all(&self.db)
                .await
                .map_err(ApiError::database)?,
            None => Vec::new(),
        };

        Ok(Some(AuthenticatedUser {
            user,
            role,
            permissions,
        }))
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<user::Model>, ApiError> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(ApiError::database)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ApiError> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(ApiError::database)
    }

    /// Whether `username` is already taken by a user other than `exclude`
    pub async fn username_taken(
        &self,
        username: &str,
        exclude: Option<&str>,
    ) -> Result<bool, ApiError> {
        let mut query = User::find().filter(user::Column::Username.eq(username));
        if let Some(id) = exclude {
            query = query.filter(user::Column::Id.ne(id));
        }

        let count = query.count(&self.db).await.map_err(ApiError::database)?;
        Ok(count > 0)
    }

    /// Whether `email` is already taken by a user other than `exclude`
    pub async fn email_taken(
        &self,
        email: &str,
        exclude: Option<&str>,
    ) -> Result<bool, ApiError> {
        let mut query = User::find().filter(user::Column::Email.eq(email));
        if let Some(id) = exclude {
            query = query.filter(user::Column::Id.ne(id));
        }

        let count = query.count(&self.db).await.map_err(ApiError::database)?;
        Ok(count > 0)
    }

    /// Apply a partial update and return the stored record
    pub async fn update(&self, id: &str, changes: UserChanges) -> Result<user::Model, ApiError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let mut active: user::ActiveModel = current.into();

        if let Some(full_name) = changes.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(role_id) = changes.role_id {
            active.role_id = Set(Some(role_id));
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }

        active.update(&self.db).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") {
                ApiError::conflict("Email or username already exists")
            } else {
                ApiError::database(e)
            }
        })
    }

    /// Delete a user by id; returns false when no such user existed
    pub async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let result = User::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(ApiError::database)?;

        Ok(result.rows_affected > 0)
    }

    /// One fixed-size page of users, optionally filtered by a
    /// case-insensitive substring match on username or email
    pub async fn paginate(
        &self,
        page: u64,
        search: Option<&str>,
    ) -> Result<Page<user::Model>, ApiError> {
        let mut select = User::find()
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id);

        if let Some(term) = search {
            select = select.filter(
                Condition::any()
                    .add(contains_ci(user::Column::Username, term))
                    .add(contains_ci(user::Column::Email, term)),
            );
        }

        paginate(&self.db, select, page)
            .await
            .map_err(ApiError::database)
    }
}
