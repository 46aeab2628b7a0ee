//! Declarations: the ordered field lists the builder turns into fortnums.
//!
//! A [`Declaration`] is the explicit counterpart of a class body: a name, an
//! optional kind it extends, a few declaration options and an ordered list of
//! `(field, Member)` pairs.

use crate::domain::arena::FortnumId;
use crate::domain::relation::Relation;
use crate::domain::value::{Computed, Value};
use crate::domain::node::Fortnum;

/// Which node-valued fields of a scope become its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemClass {
    /// Every node-valued field is a member.
    #[default]
    Any,
    /// No node-valued field is a member; they remain plain references.
    Nothing,
    /// Only nodes that are a kind of the given node are members.
    Kind(FortnumId),
}

/// A fortnum named either by handle or by registry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FortnumRef {
    Id(FortnumId),
    Name(String),
}

impl From<FortnumId> for FortnumRef {
    fn from(id: FortnumId) -> Self {
        FortnumRef::Id(id)
    }
}

impl From<&Fortnum<'_>> for FortnumRef {
    fn from(node: &Fortnum<'_>) -> Self {
        FortnumRef::Id(node.id())
    }
}

impl From<&str> for FortnumRef {
    fn from(name: &str) -> Self {
        FortnumRef::Name(name.to_string())
    }
}

impl From<String> for FortnumRef {
    fn from(name: String) -> Self {
        FortnumRef::Name(name)
    }
}

/// Right-hand side of one declared field.
#[derive(Debug, Clone)]
pub enum Member {
    /// Plain data. A `Value::Fortnum` is treated like [`Member::Fortnum`].
    Value(Value),
    /// An existing fortnum, reused as-is.
    Fortnum(FortnumId),
    /// A fortnum fetched by name, created as a forward reference if needed.
    Named(String),
    /// A nested declaration, built first and then attached.
    Nested(Declaration),
    /// An already-parented fortnum listed as a member without re-parenting it.
    Borrowed(FortnumId),
    Relation(Relation),
    Computed(Computed),
    /// Empty back-collection slot for relations declared elsewhere.
    Related,
}

impl Member {
    pub fn named(name: impl Into<String>) -> Self {
        Member::Named(name.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: for<'r> Fn(&Fortnum<'r>) -> Value + Send + Sync + 'static,
    {
        Member::Computed(Computed::new(f))
    }
}

impl From<FortnumId> for Member {
    fn from(id: FortnumId) -> Self {
        Member::Fortnum(id)
    }
}

impl From<FortnumRef> for Member {
    fn from(r: FortnumRef) -> Self {
        match r {
            FortnumRef::Id(id) => Member::Fortnum(id),
            FortnumRef::Name(name) => Member::Named(name),
        }
    }
}

impl From<Declaration> for Member {
    fn from(decl: Declaration) -> Self {
        Member::Nested(decl)
    }
}

impl From<Relation> for Member {
    fn from(rel: Relation) -> Self {
        Member::Relation(rel)
    }
}

impl From<Computed> for Member {
    fn from(c: Computed) -> Self {
        Member::Computed(c)
    }
}

impl From<Value> for Member {
    fn from(v: Value) -> Self {
        match v {
            Value::Fortnum(id) => Member::Fortnum(id),
            other => Member::Value(other),
        }
    }
}

macro_rules! member_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Member {
                fn from(v: $ty) -> Self {
                    Member::Value(Value::from(v))
                }
            }
        )*
    };
}

member_from_value!(&str, String, bool, i64, i32, f64);

impl<T: Into<Value>> From<Vec<T>> for Member {
    fn from(items: Vec<T>) -> Self {
        Member::from(Value::from(items))
    }
}

/// Ordered field list of one fortnum, consumed by the builder.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: String,
    pub base: Option<FortnumId>,
    pub is_abstract: bool,
    pub item_class: Option<ItemClass>,
    pub related_name: Option<String>,
    pub fields: Vec<(String, Member)>,
}

impl Declaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            is_abstract: false,
            item_class: None,
            related_name: None,
            fields: Vec::new(),
        }
    }

    /// Declaration of a new node of kind `base`, inheriting its data attributes.
    pub fn extending(base: FortnumId, name: impl Into<String>) -> Self {
        Self::new(name).extends(base)
    }

    pub fn extends(mut self, base: FortnumId) -> Self {
        self.base = Some(base);
        self
    }

    pub fn abstract_(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn item_class(mut self, item_class: ItemClass) -> Self {
        self.item_class = Some(item_class);
        self
    }

    pub fn related_name(mut self, related_name: impl Into<String>) -> Self {
        self.related_name = Some(related_name.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, member: impl Into<Member>) -> Self {
        self.fields.push((name.into(), member.into()));
        self
    }

    /// Nested declaration stored under its own name.
    pub fn nested(self, decl: Declaration) -> Self {
        let name = decl.name.clone();
        self.field(name, Member::Nested(decl))
    }

    pub fn named(self, field: impl Into<String>, fortnum: impl Into<String>) -> Self {
        self.field(field, Member::Named(fortnum.into()))
    }

    pub fn borrow(self, field: impl Into<String>, id: FortnumId) -> Self {
        self.field(field, Member::Borrowed(id))
    }

    pub fn computed<F>(self, field: impl Into<String>, f: F) -> Self
    where
        F: for<'r> Fn(&Fortnum<'r>) -> Value + Send + Sync + 'static,
    {
        self.field(field, Member::computed(f))
    }

    pub fn related(self, field: impl Into<String>) -> Self {
        self.field(field, Member::Related)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_builder_calls_when_declaring_then_fields_keep_order() {
        let decl = Declaration::new("Parent")
            .field("key", "test")
            .named("child1", "Child1")
            .nested(Declaration::new("Inner"))
            .related("chemicals");

        let names: Vec<_> = decl.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["key", "child1", "Inner", "chemicals"]);
        assert!(matches!(decl.fields[0].1, Member::Value(Value::Str(_))));
        assert!(matches!(decl.fields[1].1, Member::Named(_)));
    }

    #[test]
    fn given_new_declaration_when_built_then_defaults() {
        let decl = Declaration::new("Foo");
        assert!(!decl.is_abstract);
        assert!(decl.base.is_none());
        assert!(decl.item_class.is_none());
    }
}
