//! Application layer: collaborators consuming the registry
//!
//! This layer validates host-side values against fortnum trees; it owns no
//! registry state of its own.

pub mod descriptor;
pub mod error;

pub use descriptor::FortnumField;
pub use error::{ApplicationError, ApplicationResult};
