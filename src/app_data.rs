use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Settings;
use crate::services::{AuthGate, TokenService};
use crate::stores::{OrderStore, ProductStore, RoleStore, UserStore};

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once in main.rs and shared across the API
/// structs, so no handler ever reaches for a global connection object.
///
/// # Architecture
///
/// ```text
/// main.rs
///   ↓
/// AppData::init(db, settings)
///   ↓ creates once
///   ├─ token_service (Arc<TokenService>)
///   ├─ user_store / role_store / product_store / order_store
///   └─ auth_gate (Arc<AuthGate>, over user_store + token_service)
///   ↓ passed to API constructors
///   ├─ AuthApi::new(user_store, token_service, auth_gate)
///   ├─ UsersApi::new(auth_gate, user_store, role_store)
///   ├─ RolesApi::new(auth_gate, role_store)
///   ├─ ProductsApi::new(auth_gate, product_store)
///   └─ OrdersApi::new(auth_gate, order_store)
/// ```
pub struct AppData {
    pub db: DatabaseConnection,
    pub token_service: Arc<TokenService>,
    pub auth_gate: Arc<AuthGate>,
    pub user_store: Arc<UserStore>,
    pub role_store: Arc<RoleStore>,
    pub product_store: Arc<ProductStore>,
    pub order_store: Arc<OrderStore>,
}

impl AppData {
    /// Initialize all application data
    ///
    /// The database connection should be established and migrated before
    /// calling this.
    pub fn init(db: DatabaseConnection, settings: &Settings) -> Self {
        tracing::debug!("Creating stores...");
        let user_store = Arc::new(UserStore::new(db.clone()));
        let role_store = Arc::new(RoleStore::new(db.clone()));
        let product_store = Arc::new(ProductStore::new(db.clone()));
        let order_store = Arc::new(OrderStore::new(db.clone()));

        let token_service = Arc::new(TokenService::new(settings.jwt_secret.clone()));
        let auth_gate = Arc::new(AuthGate::new(user_store.clone(), token_service.clone()));

        tracing::info!("AppData initialization complete");

        Self {
            db,
            token_service,
            auth_gate,
            user_store,
            role_store,
            product_store,
            order_store,
        }
    }
}
