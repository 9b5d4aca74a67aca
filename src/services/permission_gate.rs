use crate::errors::ApiError;
use crate::types::internal::auth::AuthenticatedUser;

/// Verb class of the incoming request: GET maps to `Read`, every mutating
/// method (POST/PUT/DELETE) to `Write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Pure, order-independent membership check over a permission tag set.
///
/// - `Read` is granted by `view_<resource>` or `edit_<resource>`
/// - `Write` is granted by `edit_<resource>` only
///
/// An empty set grants nothing.
pub fn is_authorized<'a>(
    permissions: impl IntoIterator<Item = &'a str>,
    access: Access,
    resource: &str,
) -> bool {
    let view = format!("view_{}", resource);
    let edit = format!("edit_{}", resource);

    permissions.into_iter().any(|name| match access {
        Access::Read => name == view || name == edit,
        Access::Write => name == edit,
    })
}

/// Permission gate applied after authentication on every resource route.
///
/// Fails closed: a user without a role, or whose role carries no
/// permissions, is rejected before any tag comparison happens.
pub fn require(
    user: &AuthenticatedUser,
    access: Access,
    resource: &str,
) -> Result<(), ApiError> {
    if user.role.is_none() || user.permissions.is_empty() {
        return Err(ApiError::unauthorized());
    }

    if is_authorized(user.permission_names(), access, resource) {
        Ok(())
    } else {
        Err(ApiError::unauthorized())
    }
}
