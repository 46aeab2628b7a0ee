//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the registry and tree invariants.
/// All of them are raised at the point of violation and never recovered internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FortnumError {
    #[error("fortnum already declared: {name}")]
    DuplicatedFortnum { name: String },

    #[error("fortnum {name} already belongs to {parent}, cannot attach it to {other}")]
    MultipleParents {
        name: String,
        parent: String,
        other: String,
    },

    #[error("unable to add related fortnum: {target}.{related_name} holds an incompatible value")]
    UnableToAddRelatedFortnum { target: String, related_name: String },

    #[error("cannot compare {left} with {right}: no common ancestor")]
    Incomparable { left: String, right: String },

    #[error("fortnum not found: {0}")]
    NotFound(String),

    #[error("unknown fortnum handle (registry was cleared?)")]
    UnknownId,

    #[error("cycle detected: {0} would become its own descendant")]
    CycleDetected(String),

    #[error("relation on field {field} has no related_name")]
    MissingRelatedName { field: String },

    #[error("invalid fortnum name {name:?} (must match {pattern})")]
    InvalidName { name: String, pattern: String },
}

/// Result type for domain operations.
pub type FortnumResult<T> = Result<T, FortnumError>;
