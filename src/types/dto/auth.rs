use poem_openapi::Object;

/// Request model for self-service registration
#[derive(Object, Debug)]
pub struct RegisterRequest {
    /// Full display name
    #[oai(validator(min_length = 1, max_length = 100))]
    pub fullname: String,

    #[oai(validator(min_length = 3, max_length = 30))]
    pub username: String,

    pub email: String,

    #[oai(validator(min_length = 6))]
    pub password: String,

    /// Must match `password`
    pub password_confirm: String,
}

/// Request model for login; either `email` or `username` identifies the
/// account
#[derive(Object, Debug)]
pub struct LoginRequest {
    pub email: Option<String>,

    pub username: Option<String>,

    pub password: String,

    /// Extends the session from 1 day to 1 year
    #[oai(rename = "rememberMe")]
    pub remember_me: Option<bool>,
}

/// Request model for updating the authenticated user's own profile
#[derive(Object, Debug)]
pub struct UpdateInfoRequest {
    #[oai(validator(min_length = 1, max_length = 100))]
    pub fullname: Option<String>,

    #[oai(validator(min_length = 3, max_length = 30))]
    pub username: Option<String>,

    pub email: Option<String>,
}

/// Request model for updating the authenticated user's own password
#[derive(Object, Debug)]
pub struct UpdatePasswordRequest {
    #[oai(validator(min_length = 6))]
    pub password: String,

    /// Must match `password`
    pub password_confirm: String,
}
