mod api;
mod app_data;
mod config;
mod errors;
mod services;
mod stores;
mod types;

use poem::{listener::TcpListener, middleware::Cors, EndpointExt, Route, Server};
use poem_openapi::OpenApiService;

use api::{AuthApi, HealthApi, OrdersApi, ProductsApi, RolesApi, UsersApi};
use app_data::AppData;
use config::Settings;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    config::init_logging().expect("Failed to initialize logging");

    // Fail fast on misconfiguration (notably a missing JWT_SECRET)
    let settings = Settings::from_env().expect("Invalid configuration");

    let db = config::init_database(&settings.database_url)
        .await
        .expect("Failed to connect to database");

    config::run_migrations(&db)
        .await
        .expect("Failed to run migrations");

    let app_data = AppData::init(db, &settings);

    let auth_api = AuthApi::new(
        app_data.user_store.clone(),
        app_data.token_service.clone(),
        app_data.auth_gate.clone(),
    );
    let users_api = UsersApi::new(
        app_data.auth_gate.clone(),
        app_data.user_store.clone(),
        app_data.role_store.clone(),
    );
    let roles_api = RolesApi::new(app_data.auth_gate.clone(), app_data.role_store.clone());
    let products_api = ProductsApi::new(app_data.auth_gate.clone(), app_data.product_store.clone());
    let orders_api = OrdersApi::new(app_data.auth_gate.clone(), app_data.order_store.clone());

    let api_service = OpenApiService::new(
        (
            HealthApi,
            auth_api,
            users_api,
            roles_api,
            products_api,
            orders_api,
        ),
        "Admin API",
        "1.0.0",
    )
    .server(format!("http://{}/api", settings.bind_addr));

    // Generate Swagger UI from the OpenAPI service
    let ui = api_service.swagger_ui();

    // The SPA sends the session cookie cross-origin, hence credentials
    let mut cors = Cors::new().allow_credentials(true);
    if let Some(origin) = &settings.cors_origin {
        cors = cors.allow_origin(origin.as_str());
    }

    let app = Route::new()
        .nest("/api", api_service)
        .nest("/swagger", ui)
        .with(cors);

    tracing::info!("Starting server on http://{}", settings.bind_addr);
    tracing::info!("Swagger UI available at http://{}/swagger", settings.bind_addr);

    Server::new(TcpListener::bind(settings.bind_addr.clone()))
        .run(app)
        .await
}
