//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::FortnumError;

/// Application errors wrap domain errors and add the failures of the
/// collaborators built on top of the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] FortnumError),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
