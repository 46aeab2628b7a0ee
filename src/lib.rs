//! Declarative singleton trees.
//!
//! A *fortnum* is a named, globally unique node declared once into a
//! [`Registry`]. Nodes nest into trees, extend other nodes, carry plain and
//! computed attributes, relate to each other across trees, and order
//! themselves by their position in the tree.
//!
//! ```ignore
//! use fortnum::{Declaration, Registry};
//!
//! let mut registry = Registry::new();
//! let colors = registry.declare(
//!     Declaration::new("Colors")
//!         .nested(Declaration::new("Red"))
//!         .nested(Declaration::new("Blue")),
//! )?;
//! let red = registry.deserialize("Red")?;
//! assert_eq!(red.parent().map(|p| p.id()), Some(colors));
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod tree_traits;
pub mod util;

pub use application::{ApplicationError, ApplicationResult, FortnumField};
pub use config::Settings;
pub use domain::{
    Computed, Declaration, Fortnum, FortnumError, FortnumId, FortnumRef, FortnumResult,
    FortnumSeed, ItemClass, Member, Registry, Relation, Value,
};
pub use tree_traits::TreeNodeConvert;
