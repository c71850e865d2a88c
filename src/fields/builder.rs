//! Field selection for the `fields` query parameter.
//!
//! The upstream API takes a compact description of which properties to
//! return, e.g. `*,customer(id,name),orderLines(*,product(number))`.
//! [`FieldsBuilder`] assembles the tree; rendering sorts every level by
//! name, so equal trees always produce the same string.
//!
//! ```
//! use tripletex::fields::{FieldsBuilder, Member};
//!
//! let fields = FieldsBuilder::new()
//!     .all()
//!     .group("orders", [Member::from("id"), FieldsBuilder::new().group("project", ["id"]).into()]);
//! assert_eq!(fields.to_string(), "*,orders(id,project(id))");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Wildcard selecting every scalar field of a level.
pub const ALL: &str = "*";

/// One level of a field selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(BTreeMap<String, Field>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Leaf,
    Group(Fields),
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.get(name)
    }

    /// Adds or replaces `name` as a leaf.
    pub fn insert_leaf(&mut self, name: impl Into<String>) {
        self.0.insert(name.into(), Field::Leaf);
    }

    /// Adds or replaces `name` with a nested level.
    pub fn insert_group(&mut self, name: impl Into<String>, nested: Fields) {
        self.0.insert(name.into(), Field::Group(nested));
    }

    /// Copies every entry of `other` in, overwriting entries with the same name.
    pub fn merge(&mut self, other: Fields) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.0.iter().map(|(name, field)| (name.as_str(), field))
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // BTreeMap iterates in name order
        for (i, (name, field)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match field {
                Field::Leaf => f.write_str(name)?,
                Field::Group(nested) => write!(f, "{}({})", name, nested)?,
            }
        }
        Ok(())
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<S: Into<String>> FromIterator<S> for Fields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for name in iter {
            fields.insert_leaf(name);
        }
        fields
    }
}

/// Something that can go inside [`FieldsBuilder::group`].
#[derive(Debug, Clone)]
pub enum Member {
    /// A leaf field.
    Field(String),
    /// Every entry of another builder.
    Builder(FieldsBuilder),
    /// Every entry of a raw level.
    Fields(Fields),
}

impl From<&str> for Member {
    fn from(name: &str) -> Self {
        Member::Field(name.to_string())
    }
}

impl From<String> for Member {
    fn from(name: String) -> Self {
        Member::Field(name)
    }
}

impl From<FieldsBuilder> for Member {
    fn from(builder: FieldsBuilder) -> Self {
        Member::Builder(builder)
    }
}

impl From<Fields> for Member {
    fn from(fields: Fields) -> Self {
        Member::Fields(fields)
    }
}

/// Fluent construction of a [`Fields`] tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldsBuilder {
    fields: Fields,
}

impl FieldsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the `*` wildcard.
    pub fn all(mut self) -> Self {
        self.fields.insert_leaf(ALL);
        self
    }

    pub fn add(mut self, name: impl Into<String>) -> Self {
        self.fields.insert_leaf(name);
        self
    }

    /// Sets `name` to a new level built from `members`, replacing any
    /// earlier group or leaf of that name.
    pub fn group<I, M>(mut self, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Member>,
    {
        let mut nested = Fields::new();
        for member in members {
            match member.into() {
                Member::Field(field) => nested.insert_leaf(field),
                Member::Builder(builder) => nested.merge(builder.fields),
                Member::Fields(fields) => nested.merge(fields),
            }
        }
        self.fields.insert_group(name, nested);
        self
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn build(self) -> Fields {
        self.fields
    }
}

impl fmt::Display for FieldsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fields, f)
    }
}

impl Serialize for FieldsBuilder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}
