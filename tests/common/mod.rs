use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use poem::{test::TestClient, Route};
use poem_openapi::OpenApiService;
use sea_orm::Database;

use admin_backend::api::{AuthApi, HealthApi, OrdersApi, ProductsApi, RolesApi, UsersApi};
use admin_backend::config::Settings;
use admin_backend::stores::NewUser;
use admin_backend::AppData;

pub const TEST_SECRET: &str = "test-secret-key-minimum-32-characters-long";

/// A fully wired application over an in-memory database, driven through
/// the real HTTP router (cookie extraction included).
pub struct TestApp {
    pub app_data: Arc<AppData>,
    pub client: TestClient<Route>,
}

pub async fn spawn_app() -> TestApp {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let settings = Settings {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        cors_origin: None,
    };

    let app_data = Arc::new(AppData::init(db, &settings));

    let api_service = OpenApiService::new(
        (
            HealthApi,
            AuthApi::new(
                app_data.user_store.clone(),
                app_data.token_service.clone(),
                app_data.auth_gate.clone(),
            ),
            UsersApi::new(
                app_data.auth_gate.clone(),
                app_data.user_store.clone(),
                app_data.role_store.clone(),
            ),
            RolesApi::new(app_data.auth_gate.clone(), app_data.role_store.clone()),
            ProductsApi::new(app_data.auth_gate.clone(), app_data.product_store.clone()),
            OrdersApi::new(app_data.auth_gate.clone(), app_data.order_store.clone()),
        ),
        "Admin API",
        "test",
    );

    let app = Route::new().nest("/api", api_service);

    TestApp {
        app_data,
        client: TestClient::new(app),
    }
}

impl TestApp {
    /// Seed a role carrying `tags` and a user holding it; returns the value
    /// for the request Cookie header
    pub async fn session_with_permissions(&self, tags: &[&str]) -> String {
        let mut permission_ids = Vec::new();
        for tag in tags {
            let existing = self
                .app_data
                .role_store
                .permissions()
                .await
                .unwrap()
                .into_iter()
                .find(|p| p.name == *tag);
            let id = match existing {
                Some(p) => p.id,
                None => {
                    self.app_data
                        .role_store
                        .create_permission(tag)
                        .await
                        .unwrap()
                        .id
                }
            };
            permission_ids.push(id);
        }

        let role = self
            .app_data
            .role_store
            .create("Operator".to_string(), permission_ids)
            .await
            .unwrap();

        let suffix = uuid::Uuid::new_v4();
        let user = self
            .app_data
            .user_store
            .create(NewUser {
                full_name: "Operator".to_string(),
                username: format!("op-{}", suffix),
                email: format!("op-{}@example.com", suffix),
                password_hash: "hash".to_string(),
                role_id: Some(role.role.id.clone()),
            })
            .await
            .unwrap();

        let token = self
            .app_data
            .token_service
            .issue(&user.id, false)
            .unwrap()
            .token;

        format!("user_session={}", token)
    }
}
