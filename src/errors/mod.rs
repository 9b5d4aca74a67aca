// Errors layer - Error type definitions
pub mod api;

pub use api::{ApiError, FieldError, MessageResponse, ValidationErrorsResponse};
