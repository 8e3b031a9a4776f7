//! The built schema tree.

use super::meta::MetaType;
use super::target::TargetType;
use crate::ir::{CompositeId, Permissions};

/// Nested definition attached to a branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    /// Members of an object, resolved through the identity cache.
    Schema(CompositeId),
    /// The element field of an array or set.
    Element(Box<SchemaField>),
}

/// One named field with its classified branches.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    /// Declared member name; `None` for container elements.
    pub name: Option<String>,
    /// Dotted path relative to the owning composite.
    pub path: String,
    pub branches: Vec<MetaType>,
    /// Aligned with `branches`; set exactly where a branch bears a definition.
    pub definitions: Vec<Option<Definition>>,
    pub permissions: Option<Permissions>,
}

impl SchemaField {
    pub fn is_optional(&self) -> bool {
        self.branches.iter().any(|b| b.tag == TargetType::Optional)
    }

    /// True when an object branch is open, directly or as a container element.
    pub fn is_flexible(&self) -> bool {
        self.branches
            .iter()
            .zip(&self.definitions)
            .any(|(branch, definition)| match definition {
                Some(Definition::Element(element)) => element.is_flexible(),
                _ => branch.tag == TargetType::Object && branch.is_flexible(),
            })
    }

    /// Branches paired with their definitions.
    pub fn iter(&self) -> impl Iterator<Item = (&MetaType, Option<&Definition>)> {
        self.branches
            .iter()
            .zip(&self.definitions)
            .map(|(branch, definition)| (branch, definition.as_ref()))
    }
}

/// The fields of one composite.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub identity: CompositeId,
    pub name: String,
    pub fields: Vec<SchemaField>,
    /// The composite accepts undeclared members.
    pub flexible: bool,
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name.as_deref() == Some(name))
    }
}
