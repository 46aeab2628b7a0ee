//! Host attribute binder: a field on an arbitrary struct restricted to the
//! fortnums of one tree.
//!
//! ```ignore
//! struct Basket {
//!     fruit: FortnumField,
//! }
//! let mut basket = Basket {
//!     fruit: FortnumField::new("fruit", fruits).with_default(banana).allow_none(false),
//! };
//! basket.fruit.set(&registry, Some(tomato))?;
//! ```

use tracing::{debug, instrument};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::{Fortnum, FortnumId, Registry, Value};

/// Current value and validation rules of one bound attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FortnumField {
    name: String,
    tree: FortnumId,
    default: Option<FortnumId>,
    allow_none: bool,
    /// `None` until the first assignment; reads fall back to the default
    value: Option<Option<FortnumId>>,
}

impl FortnumField {
    pub fn new(name: impl Into<String>, tree: FortnumId) -> Self {
        Self {
            name: name.into(),
            tree,
            default: None,
            allow_none: true,
            value: None,
        }
    }

    pub fn with_default(mut self, default: FortnumId) -> Self {
        self.default = Some(default);
        self
    }

    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value, or the default before any assignment.
    pub fn get(&self) -> Option<FortnumId> {
        self.value.unwrap_or(self.default)
    }

    pub fn get_in<'r>(&self, registry: &'r Registry) -> ApplicationResult<Option<Fortnum<'r>>> {
        self.get()
            .map(|id| registry.get(id).map_err(ApplicationError::from))
            .transpose()
    }

    /// Accepts a fortnum anywhere below the bound tree, or `None` when allowed.
    pub fn validate(&self, registry: &Registry, value: Option<FortnumId>) -> ApplicationResult<()> {
        let Some(id) = value else {
            return if self.allow_none {
                Ok(())
            } else {
                Err(self.invalid("None is not allowed".to_string()))
            };
        };
        let tree = registry.get(self.tree)?;
        let candidate = registry
            .get(id)
            .map_err(|e| self.invalid(e.to_string()))?;
        if tree.contains_deep(id) {
            Ok(())
        } else {
            Err(self.invalid(format!("{} is not part of {}", candidate, tree)))
        }
    }

    #[instrument(level = "debug", skip(self, registry), fields(field = %self.name))]
    pub fn set(&mut self, registry: &Registry, value: Option<FortnumId>) -> ApplicationResult<()> {
        self.validate(registry, value)?;
        self.value = Some(value);
        debug!("field assigned");
        Ok(())
    }

    /// Assignment from loosely typed data; anything but a fortnum or null is rejected.
    pub fn set_value(&mut self, registry: &Registry, value: &Value) -> ApplicationResult<()> {
        match value {
            Value::Fortnum(id) => self.set(registry, Some(*id)),
            Value::Null => self.set(registry, None),
            other => Err(self.invalid(format!("{} is not a fortnum", other))),
        }
    }

    fn invalid(&self, reason: String) -> ApplicationError {
        ApplicationError::InvalidValue {
            field: self.name.clone(),
            reason,
        }
    }
}
