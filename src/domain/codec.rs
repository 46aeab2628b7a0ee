//! Name-based serde encoding of fortnums.
//!
//! A fortnum serializes as its registry name. Decoding needs the registry, so
//! it goes through [`FortnumSeed`] instead of a plain `Deserialize` impl.

use serde::de::{DeserializeSeed, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::node::Fortnum;
use crate::domain::registry::Registry;

impl Serialize for Fortnum<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Decodes a name back into the fortnum registered under it.
#[derive(Debug, Clone, Copy)]
pub struct FortnumSeed<'r>(pub &'r Registry);

impl<'de, 'r> DeserializeSeed<'de> for FortnumSeed<'r> {
    type Value = Fortnum<'r>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        let name = String::deserialize(deserializer)?;
        self.0.deserialize(&name).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::declaration::Declaration;

    #[test]
    fn given_declared_fortnum_when_encoding_then_roundtrips_by_name() {
        let mut registry = Registry::new();
        let id = registry.declare(Declaration::new("Fortnum1")).unwrap();
        let node = registry.get(id).unwrap();

        let json = serde_json::to_string(&node).unwrap();
        let back = FortnumSeed(&registry)
            .deserialize(&mut serde_json::Deserializer::from_str(&json))
            .unwrap();

        assert_eq!(json, "\"Fortnum1\"");
        assert_eq!(back, node);
    }

    #[test]
    fn given_unknown_name_when_decoding_then_error() {
        let registry = Registry::new();

        let result = FortnumSeed(&registry)
            .deserialize(&mut serde_json::Deserializer::from_str("\"Missing\""));

        assert!(result.is_err());
    }
}
