use poem_openapi::{payload::Json, ApiResponse, Object};
use std::fmt;

/// Standardized `{message}` error body
#[derive(Object, Debug)]
pub struct MessageResponse {
    /// Human-readable error message
    pub message: String,
}

/// A single field-level validation failure
#[derive(Object, Debug)]
pub struct FieldError {
    /// Name of the offending field
    pub field: String,

    /// What was wrong with it
    pub message: String,
}

/// Body of a 400 validation error (array of field errors)
#[derive(Object, Debug)]
pub struct ValidationErrorsResponse {
    pub errors: Vec<FieldError>,
}

/// Request-boundary error taxonomy.
///
/// Every failure maps to exactly one HTTP status and a structured body:
/// a field-error array for validation, a `{message}` object for the rest.
#[derive(ApiResponse, Debug)]
pub enum ApiError {
    /// Field-level validation failure
    #[oai(status = 400)]
    Validation(Json<ValidationErrorsResponse>),

    /// Malformed request (bad id, missing credential, bad password)
    #[oai(status = 400)]
    BadRequest(Json<MessageResponse>),

    /// No session, or an invalid/expired session token
    #[oai(status = 401)]
    Unauthenticated(Json<MessageResponse>),

    /// Authenticated but lacking the required permission
    #[oai(status = 403)]
    Unauthorized(Json<MessageResponse>),

    /// Missing entity or empty search result
    #[oai(status = 404)]
    NotFound(Json<MessageResponse>),

    /// Uniqueness violation, or a referenced entity that must exist
    #[oai(status = 409)]
    Conflict(Json<MessageResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<MessageResponse>),
}

impl ApiError {
    /// Create a Validation error from collected field errors
    pub fn validation(errors: Vec<FieldError>) -> Self {
        ApiError::Validation(Json(ValidationErrorsResponse { errors }))
    }

    /// Create a Validation error for a single field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::validation(vec![FieldError {
            field: field.into(),
            message: message.into(),
        }])
    }

    /// Create a BadRequest error
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(Json(MessageResponse {
            message: message.into(),
        }))
    }

    /// Create a BadRequest for a malformed resource id
    pub fn not_allowed() -> Self {
        Self::bad_request("Not Allowed")
    }

    /// Create an Unauthenticated error
    pub fn unauthenticated() -> Self {
        ApiError::Unauthenticated(Json(MessageResponse {
            message: "Unauthenticated".to_string(),
        }))
    }

    /// Create an Unauthorized error
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized(Json(MessageResponse {
            message: "Unauthorized".to_string(),
        }))
    }

    /// Create a NotFound error
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(Json(MessageResponse {
            message: message.into(),
        }))
    }

    /// Create a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(Json(MessageResponse {
            message: message.into(),
        }))
    }

    /// Create an InternalError
    pub fn internal_error(message: impl Into<String>) -> Self {
        ApiError::InternalError(Json(MessageResponse {
            message: message.into(),
        }))
    }

    /// Map a database error to a 500; stores that can trip unique indexes
    /// turn those into 409 themselves before falling back to this
    pub fn database(err: sea_orm::DbErr) -> Self {
        tracing::error!("Database error: {}", err);
        Self::internal_error(format!("Database error: {}", err))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(json) => json
                .0
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join(", "),
            ApiError::BadRequest(json) => json.0.message.clone(),
            ApiError::Unauthenticated(json) => json.0.message.clone(),
            ApiError::Unauthorized(json) => json.0.message.clone(),
            ApiError::NotFound(json) => json.0.message.clone(),
            ApiError::Conflict(json) => json.0.message.clone(),
            ApiError::InternalError(json) => json.0.message.clone(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
