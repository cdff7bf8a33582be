//! Shared primitives for all Rust crates in dialcrm.

#![forbid(unsafe_code)]

/// Opaque identifier newtypes shared across services.
pub mod id;

use thiserror::Error;

pub use id::{PermissionId, RoleId, UserId};

/// Result type used across dialcrm crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Actor is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{AppError, UserId};

    #[test]
    fn forbidden_message_is_preserved() {
        let error = AppError::Forbidden("missing permission 'rbac.manage_roles'".to_owned());
        assert_eq!(
            error.to_string(),
            "forbidden: missing permission 'rbac.manage_roles'"
        );
    }

    #[test]
    fn generated_user_ids_are_distinct() {
        assert_ne!(UserId::generate(), UserId::generate());
    }
}
