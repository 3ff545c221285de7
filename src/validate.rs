//! Boundary validation, invoked before any persistence call.
//!
//! Each entity gets an explicit validation function returning a structured
//! error rather than relying on store-level constraints to reject bad
//! input.

use crate::error::ApiError;
use crate::models::Role;

/// Login payload: both fields must be present and non-empty.
pub fn login_credentials<'a>(
    email: Option<&'a str>,
    password: Option<&'a str>,
) -> Result<(&'a str, &'a str), ApiError> {
    match (email, password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok((email, password))
        }
        _ => Err(ApiError::MissingCredentials),
    }
}

/// Note title is required and non-empty; content is optional.
pub fn note_title(title: &str) -> Result<(), ApiError> {
    if title.is_empty() {
        return Err(ApiError::MissingTitle);
    }
    Ok(())
}

/// Invite payload: email and a known role are both required.
pub fn invite_fields<'a>(
    email: Option<&'a str>,
    role: Option<&str>,
) -> Result<(&'a str, Role), ApiError> {
    let email = match email {
        Some(email) if !email.is_empty() => email,
        _ => return Err(ApiError::MissingFields),
    };
    let role = role.and_then(Role::parse).ok_or(ApiError::MissingFields)?;
    Ok((email, role))
}
