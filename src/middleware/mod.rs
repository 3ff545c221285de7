pub mod auth;
pub mod roles;
pub mod validate_identity;

pub use auth::{auth_middleware, Identity};
pub use roles::require_admin;
pub use validate_identity::validate_identity_middleware;
