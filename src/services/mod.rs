// Services layer - Business logic
pub mod auth_gate;
pub mod crypto;
pub mod permission_gate;
pub mod sanitize;
pub mod token_service;

pub use auth_gate::AuthGate;
pub use token_service::TokenService;
