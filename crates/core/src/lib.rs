//! Shared primitives for all Rust crates in Steward.

#![forbid(unsafe_code)]

/// Identity primitives shared across services.
pub mod auth;

use thiserror::Error;

pub use auth::IdentityId;

/// Result type used across Steward crates.
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

    /// Identity is known but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A backing store could not answer, or a decision context is not ready yet.
    ///
    /// Callers must not treat this as a denial.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns true when the error reports an outage rather than a decision.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
