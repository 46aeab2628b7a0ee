//! Attribute data carried by fortnums.
//!
//! Plain data lives in [`Value`]. Every named attribute of a node is stored in a
//! [`Slot`], which tags what the attribute is: ordinary data, a computed field,
//! the source side of a relation, or a back-collection of related fortnums.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;

use crate::domain::arena::FortnumId;
use crate::domain::node::Fortnum;

/// Ordinary attribute data.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Fortnum(FortnumId),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_fortnum(&self) -> Option<FortnumId> {
        match self {
            Value::Fortnum(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// True for fortnum references, including lists holding any.
    pub fn refers_to_fortnum(&self) -> bool {
        match self {
            Value::Fortnum(_) => true,
            Value::List(items) => items.iter().any(Value::refers_to_fortnum),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Fortnum(id) => write!(f, "{}", id),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<FortnumId> for Value {
    fn from(id: FortnumId) -> Self {
        Value::Fortnum(id)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Signature of a computed field: derived from the node itself on every read.
pub type ComputeFn = dyn for<'r> Fn(&Fortnum<'r>) -> Value + Send + Sync;

/// A read-only field whose value is computed from the node's identity.
#[derive(Clone)]
pub struct Computed(Arc<ComputeFn>);

impl Computed {
    pub fn new<F>(f: F) -> Self
    where
        F: for<'r> Fn(&Fortnum<'r>) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn eval(&self, node: &Fortnum<'_>) -> Value {
        (self.0)(node)
    }
}

impl fmt::Debug for Computed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Computed(..)")
    }
}

/// Tagged attribute slot.
#[derive(Debug, Clone)]
pub enum Slot {
    /// Plain data, including references to fortnums that are not members.
    Value(Value),
    /// Computed read-only field.
    Computed(Computed),
    /// Source side of a relation. Without targets it is a template that an
    /// extension fills in by assigning a fortnum to the same field.
    Relation {
        related_name: String,
        targets: Vec<FortnumId>,
        single: bool,
    },
    /// Back-collection of fortnums that declared a relation towards this node.
    Related(Vec<FortnumId>),
}

impl Slot {
    /// Whether a relation back-collection may be created or extended here.
    pub fn accepts_related(&self) -> bool {
        match self {
            Slot::Related(_) => true,
            Slot::Value(Value::Null) => true,
            Slot::Value(Value::List(items)) => items.is_empty(),
            _ => false,
        }
    }

    /// What an extension inherits from this slot, if anything.
    ///
    /// Node-valued data stays with the base, back-collections start empty and
    /// relation sources fall back to their template.
    pub fn inherited(&self) -> Option<Slot> {
        match self {
            Slot::Value(v) if v.refers_to_fortnum() => None,
            Slot::Value(v) => Some(Slot::Value(v.clone())),
            Slot::Computed(c) => Some(Slot::Computed(c.clone())),
            Slot::Relation {
                related_name,
                single,
                ..
            } => Some(Slot::Relation {
                related_name: related_name.clone(),
                targets: Vec::new(),
                single: *single,
            }),
            Slot::Related(_) => Some(Slot::Related(Vec::new())),
        }
    }

    /// Stored value of the slot. Computed slots have none without a node.
    pub fn stored_value(&self) -> Option<Value> {
        match self {
            Slot::Value(v) => Some(v.clone()),
            Slot::Computed(_) => None,
            Slot::Relation {
                targets, single, ..
            } => Some(match (single, targets.as_slice()) {
                (_, []) => Value::Null,
                (true, [one]) => Value::Fortnum(*one),
                _ => Value::List(targets.iter().copied().map(Value::Fortnum).collect()),
            }),
            Slot::Related(ids) => Some(Value::List(
                ids.iter().copied().map(Value::Fortnum).collect(),
            )),
        }
    }
}
