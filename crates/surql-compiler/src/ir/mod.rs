//! Language-agnostic description of a data model.
//!
//! This IR is produced by frontends (the JSON manifest, or code that builds it
//! directly) and consumed by the schema builder. It describes field types as an
//! explicit sum type and keeps composites in an arena addressed by
//! [`CompositeId`], so self-referencing and mutually referencing models can be
//! expressed without shared ownership.

mod permissions;
mod table;

pub use permissions::Permissions;
pub use table::{
    Analyzer, AnalyzerFilter, Bm25, Event, Index, IndexKind, SnowballLanguage, TableConfig,
    Tokenizer, View,
};

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostic::{IdentifierKind, SchemaError};

/// Name of the implicit identity member. It is owned by the database and never
/// emitted as a field definition.
pub const IDENTITY_MEMBER: &str = "id";

/// Primitive leaf types with a recognizable semantic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
    Date,
}

/// Marker types that carry meaning without a value shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// Any value.
    Any,
    /// An explicit null value.
    Null,
    /// The value may be absent.
    Absent,
    /// A link to a record of any table.
    AnyRecord,
}

/// Generic container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    List,
    Set,
    Tuple,
}

/// A single enum member value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Text(s) => write!(f, "{:?}", s),
            EnumValue::Int(i) => write!(f, "{}", i),
            EnumValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            EnumValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// An enumerated-value type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<EnumValue>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, values: Vec<EnumValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Stable identity of a composite inside a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeId(u32);

impl CompositeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    Sentinel(Sentinel),
    Generic {
        container: ContainerKind,
        args: Vec<TypeDescriptor>,
    },
    Union(Vec<TypeDescriptor>),
    Enum(EnumType),
    Composite(CompositeId),
    /// The bare generic mapping type; an object accepting any member.
    OpenMap,
    /// A link to a named table that is not described in the catalog.
    RecordRef(String),
    /// A host type with no schema mapping.
    Opaque(String),
}

impl TypeDescriptor {
    pub fn text() -> Self {
        Self::Primitive(PrimitiveKind::Text)
    }

    pub fn integer() -> Self {
        Self::Primitive(PrimitiveKind::Integer)
    }

    pub fn float() -> Self {
        Self::Primitive(PrimitiveKind::Float)
    }

    pub fn boolean() -> Self {
        Self::Primitive(PrimitiveKind::Boolean)
    }

    pub fn datetime() -> Self {
        Self::Primitive(PrimitiveKind::DateTime)
    }

    pub fn list(element: TypeDescriptor) -> Self {
        Self::Generic {
            container: ContainerKind::List,
            args: vec![element],
        }
    }

    pub fn set(element: TypeDescriptor) -> Self {
        Self::Generic {
            container: ContainerKind::Set,
            args: vec![element],
        }
    }

    /// `inner | None`
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::union([inner, Self::Sentinel(Sentinel::Absent)])
    }

    /// Builds a union, flattening nested unions.
    pub fn union(alternatives: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        let mut flat = Vec::new();
        for alt in alternatives {
            match alt {
                TypeDescriptor::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Self::Union(flat)
    }
}

/// A named member of a composite.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub ty: TypeDescriptor,
    pub permissions: Option<Permissions>,
}

impl Member {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            permissions: None,
        }
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn is_identity(&self) -> bool {
        self.name == IDENTITY_MEMBER
    }
}

/// A structured type with ordered named members.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeDef {
    pub name: String,
    pub members: Vec<Member>,
    /// Whether members beyond the declared ones are accepted.
    pub open: bool,
}

impl CompositeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            open: false,
        }
    }

    pub fn member(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.members.push(Member::new(name, ty));
        self
    }

    pub fn open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    /// Members that become schema fields, in declaration order.
    pub fn schema_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| !m.is_identity())
    }
}

/// Arena of composite definitions.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    composites: Vec<CompositeDef>,
    by_name: HashMap<String, CompositeId>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves an id for a composite whose members are added later.
    pub fn declare(&mut self, name: &str) -> Result<CompositeId, SchemaError> {
        self.insert(CompositeDef::new(name))
    }

    /// Adds a fully described composite.
    pub fn insert(&mut self, def: CompositeDef) -> Result<CompositeId, SchemaError> {
        if self.by_name.contains_key(&def.name) {
            return Err(SchemaError::duplicate(IdentifierKind::Composite, def.name));
        }
        let id = CompositeId(self.composites.len() as u32);
        self.by_name.insert(def.name.clone(), id);
        self.composites.push(def);
        Ok(id)
    }

    pub fn add_member(&mut self, id: CompositeId, member: Member) -> Result<(), SchemaError> {
        self.get_mut(id)?.members.push(member);
        Ok(())
    }

    pub fn set_open(&mut self, id: CompositeId, open: bool) -> Result<(), SchemaError> {
        self.get_mut(id)?.open = open;
        Ok(())
    }

    pub fn get(&self, id: CompositeId) -> Result<&CompositeDef, SchemaError> {
        self.composites
            .get(id.index())
            .ok_or_else(|| SchemaError::UnknownComposite {
                name: id.to_string(),
            })
    }

    fn get_mut(&mut self, id: CompositeId) -> Result<&mut CompositeDef, SchemaError> {
        self.composites
            .get_mut(id.index())
            .ok_or_else(|| SchemaError::UnknownComposite {
                name: id.to_string(),
            })
    }

    pub fn lookup(&self, name: &str) -> Option<CompositeId> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, id: CompositeId) -> String {
        self.composites
            .get(id.index())
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.composites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composites.is_empty()
    }

    /// Renders a descriptor in annotation syntax, for diagnostics.
    pub fn describe(&self, ty: &TypeDescriptor) -> String {
        match ty {
            TypeDescriptor::Primitive(kind) => match kind {
                PrimitiveKind::Text => "str",
                PrimitiveKind::Integer => "int",
                PrimitiveKind::Float => "float",
                PrimitiveKind::Boolean => "bool",
                PrimitiveKind::DateTime => "datetime",
                PrimitiveKind::Date => "date",
            }
            .to_string(),
            TypeDescriptor::Sentinel(sentinel) => match sentinel {
                Sentinel::Any => "Any",
                Sentinel::Null => "Null",
                Sentinel::Absent => "None",
                Sentinel::AnyRecord => "AnyRecord",
            }
            .to_string(),
            TypeDescriptor::Generic { container, args } => {
                let name = match container {
                    ContainerKind::List => "list",
                    ContainerKind::Set => "set",
                    ContainerKind::Tuple => "tuple",
                };
                let args: Vec<String> = args.iter().map(|a| self.describe(a)).collect();
                format!("{}[{}]", name, args.join(", "))
            }
            TypeDescriptor::Union(alts) => alts
                .iter()
                .map(|a| self.describe(a))
                .collect::<Vec<_>>()
                .join(" | "),
            TypeDescriptor::Enum(e) => e.name.clone(),
            TypeDescriptor::Composite(id) => self.name_of(*id),
            TypeDescriptor::OpenMap => "dict".to_string(),
            TypeDescriptor::RecordRef(table) => format!("record[{}]", table),
            TypeDescriptor::Opaque(name) => name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_flattens() {
        let ty = TypeDescriptor::optional(TypeDescriptor::union([
            TypeDescriptor::text(),
            TypeDescriptor::integer(),
        ]));
        assert_eq!(
            ty,
            TypeDescriptor::Union(vec![
                TypeDescriptor::text(),
                TypeDescriptor::integer(),
                TypeDescriptor::Sentinel(Sentinel::Absent),
            ])
        );
    }

    #[test]
    fn test_declare_then_define() {
        let mut catalog = Catalog::new();
        let node = catalog.declare("Node").unwrap();
        catalog
            .add_member(node, Member::new("next", TypeDescriptor::optional(TypeDescriptor::Composite(node))))
            .unwrap();

        assert_eq!(catalog.lookup("Node"), Some(node));
        assert_eq!(catalog.get(node).unwrap().members.len(), 1);
        assert_eq!(
            catalog.describe(&catalog.get(node).unwrap().members[0].ty),
            "Node | None"
        );
    }

    #[test]
    fn test_duplicate_composite() {
        let mut catalog = Catalog::new();
        catalog.declare("User").unwrap();
        let err = catalog.declare("User").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateIdentifier { kind: IdentifierKind::Composite, .. }
        ));
    }

    #[test]
    fn test_identity_member_skipped() {
        let def = CompositeDef::new("User")
            .member("id", TypeDescriptor::text())
            .member("name", TypeDescriptor::text());
        let names: Vec<&str> = def.schema_members().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["name"]);
    }

    #[test]
    fn test_enum_value_display() {
        assert_eq!(EnumValue::Text("a".into()).to_string(), "\"a\"");
        assert_eq!(EnumValue::Int(3).to_string(), "3");
        assert_eq!(EnumValue::Float(2.0).to_string(), "2.0");
        assert_eq!(EnumValue::Float(1.5).to_string(), "1.5");
    }
}
