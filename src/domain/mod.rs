//! Domain layer: the registry, the declaration engine and the fortnum tree
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod arena;
pub mod builder;
pub mod codec;
pub mod declaration;
pub mod error;
pub mod node;
pub mod ordering;
pub mod registry;
pub mod relation;
pub mod value;

pub use arena::{Descendants, FortnumArena, FortnumId, FortnumNode, NodeState};
pub use builder::FortnumBuilder;
pub use codec::FortnumSeed;
pub use declaration::{Declaration, FortnumRef, ItemClass, Member};
pub use error::{FortnumError, FortnumResult};
pub use node::Fortnum;
pub use registry::Registry;
pub use relation::Relation;
pub use value::{Computed, Slot, Value};
