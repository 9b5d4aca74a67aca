// API layer - HTTP endpoints
pub mod auth;
pub mod health;
pub mod helpers;
pub mod orders;
pub mod products;
pub mod roles;
pub mod users;

pub use auth::{AuthApi, SessionAuth};
pub use health::HealthApi;
pub use orders::OrdersApi;
pub use products::ProductsApi;
pub use roles::RolesApi;
pub use users::UsersApi;
