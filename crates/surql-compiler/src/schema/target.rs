//! Target schema types and the type classifier.

use std::fmt;

use super::builder::TableLookup;
use crate::diagnostic::SchemaError;
use crate::ir::{Catalog, ContainerKind, PrimitiveKind, Sentinel, TypeDescriptor};

/// The closed set of schema types a descriptor can classify as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    String,
    Number,
    Date,
    Boolean,
    Any,
    Null,
    Optional,
    Array,
    Set,
    Object,
    Enum,
    Record,
    AnyRecord,
}

impl TargetType {
    /// SDL keyword for this type when it appears as a type atom.
    ///
    /// Containers and records take a parameter; the emitter adds it.
    pub fn keyword(self) -> &'static str {
        match self {
            TargetType::String => "string",
            TargetType::Number => "number",
            TargetType::Date => "datetime",
            TargetType::Boolean => "bool",
            TargetType::Any => "any",
            TargetType::Null => "null",
            TargetType::Optional => "option",
            TargetType::Array => "array",
            TargetType::Set => "set",
            TargetType::Object => "object",
            TargetType::Enum => "string|number",
            TargetType::Record => "record",
            TargetType::AnyRecord => "record()",
        }
    }

    /// Modifiers wrap the value expression instead of joining it.
    pub fn is_modifier(self) -> bool {
        matches!(self, TargetType::Optional)
    }

    pub fn is_container(self) -> bool {
        matches!(self, TargetType::Array | TargetType::Set)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetType::String => "STRING",
            TargetType::Number => "NUMBER",
            TargetType::Date => "DATE",
            TargetType::Boolean => "BOOLEAN",
            TargetType::Any => "ANY",
            TargetType::Null => "NULL",
            TargetType::Optional => "OPTIONAL",
            TargetType::Array => "ARRAY",
            TargetType::Set => "SET",
            TargetType::Object => "OBJECT",
            TargetType::Enum => "ENUM",
            TargetType::Record => "RECORD",
            TargetType::AnyRecord => "ANY_RECORD",
        };
        f.write_str(s)
    }
}

/// Classifies a single, non-union descriptor.
///
/// Rules are tested in a fixed priority order and the first match wins.
/// `path` is only used to report failures.
pub fn classify(
    ty: &TypeDescriptor,
    catalog: &Catalog,
    lookup: &dyn TableLookup,
    path: &str,
) -> Result<TargetType, SchemaError> {
    let target = match ty {
        TypeDescriptor::Generic { container: ContainerKind::List, args } if args.len() == 1 => {
            Some(TargetType::Array)
        }
        TypeDescriptor::Generic { container: ContainerKind::Set, args } if args.len() == 1 => {
            Some(TargetType::Set)
        }
        TypeDescriptor::Primitive(PrimitiveKind::Text) => Some(TargetType::String),
        TypeDescriptor::Primitive(PrimitiveKind::Integer | PrimitiveKind::Float) => {
            Some(TargetType::Number)
        }
        TypeDescriptor::Primitive(PrimitiveKind::DateTime | PrimitiveKind::Date) => {
            Some(TargetType::Date)
        }
        TypeDescriptor::Primitive(PrimitiveKind::Boolean) => Some(TargetType::Boolean),
        TypeDescriptor::Sentinel(Sentinel::Any) => Some(TargetType::Any),
        TypeDescriptor::Sentinel(Sentinel::Null) => Some(TargetType::Null),
        TypeDescriptor::Sentinel(Sentinel::Absent) => Some(TargetType::Optional),
        TypeDescriptor::Sentinel(Sentinel::AnyRecord) => Some(TargetType::AnyRecord),
        TypeDescriptor::Enum(_) => Some(TargetType::Enum),
        TypeDescriptor::RecordRef(_) => Some(TargetType::Record),
        TypeDescriptor::Composite(id) => {
            // Unknown ids are reported here rather than at elaboration.
            catalog.get(*id)?;
            if lookup.table_name(*id).is_some() {
                Some(TargetType::Record)
            } else {
                Some(TargetType::Object)
            }
        }
        TypeDescriptor::OpenMap => Some(TargetType::Object),
        TypeDescriptor::Generic { .. } | TypeDescriptor::Union(_) | TypeDescriptor::Opaque(_) => None,
    };

    target.ok_or_else(|| SchemaError::UnsupportedType {
        type_desc: catalog.describe(ty),
        path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::ir::{CompositeDef, CompositeId, EnumType, EnumValue};

    fn classify_plain(ty: &TypeDescriptor) -> Result<TargetType, SchemaError> {
        classify(ty, &Catalog::new(), &HashMap::<CompositeId, String>::new(), "f")
    }

    #[test]
    fn test_primitives() {
        assert_eq!(classify_plain(&TypeDescriptor::text()).unwrap(), TargetType::String);
        assert_eq!(classify_plain(&TypeDescriptor::integer()).unwrap(), TargetType::Number);
        assert_eq!(classify_plain(&TypeDescriptor::float()).unwrap(), TargetType::Number);
        assert_eq!(classify_plain(&TypeDescriptor::boolean()).unwrap(), TargetType::Boolean);
        assert_eq!(classify_plain(&TypeDescriptor::datetime()).unwrap(), TargetType::Date);
        assert_eq!(
            classify_plain(&TypeDescriptor::Primitive(PrimitiveKind::Date)).unwrap(),
            TargetType::Date
        );
    }

    #[test]
    fn test_sentinels() {
        let cases = [
            (Sentinel::Any, TargetType::Any),
            (Sentinel::Null, TargetType::Null),
            (Sentinel::Absent, TargetType::Optional),
            (Sentinel::AnyRecord, TargetType::AnyRecord),
        ];
        for (sentinel, expected) in cases {
            assert_eq!(classify_plain(&TypeDescriptor::Sentinel(sentinel)).unwrap(), expected);
        }
    }

    #[test]
    fn test_containers_need_one_argument() {
        assert_eq!(
            classify_plain(&TypeDescriptor::list(TypeDescriptor::text())).unwrap(),
            TargetType::Array
        );
        assert_eq!(
            classify_plain(&TypeDescriptor::set(TypeDescriptor::text())).unwrap(),
            TargetType::Set
        );

        let tuple = TypeDescriptor::Generic {
            container: ContainerKind::Tuple,
            args: vec![TypeDescriptor::text()],
        };
        let err = classify_plain(&tuple).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedType { ref type_desc, .. } if type_desc == "tuple[str]"));

        let pair = TypeDescriptor::Generic {
            container: ContainerKind::List,
            args: vec![TypeDescriptor::text(), TypeDescriptor::integer()],
        };
        assert!(classify_plain(&pair).is_err());
    }

    #[test]
    fn test_composite_record_or_object() {
        let mut catalog = Catalog::new();
        let address = catalog.insert(CompositeDef::new("Address").member("city", TypeDescriptor::text())).unwrap();
        let mut tables: HashMap<CompositeId, String> = HashMap::new();

        let ty = TypeDescriptor::Composite(address);
        assert_eq!(classify(&ty, &catalog, &tables, "a").unwrap(), TargetType::Object);

        tables.insert(address, "address".to_string());
        assert_eq!(classify(&ty, &catalog, &tables, "a").unwrap(), TargetType::Record);
    }

    #[test]
    fn test_other_shapes() {
        assert_eq!(classify_plain(&TypeDescriptor::OpenMap).unwrap(), TargetType::Object);
        assert_eq!(
            classify_plain(&TypeDescriptor::RecordRef("user".into())).unwrap(),
            TargetType::Record
        );
        let group = EnumType::new("Group", vec![EnumValue::Text("a".into())]);
        assert_eq!(classify_plain(&TypeDescriptor::Enum(group)).unwrap(), TargetType::Enum);
        assert!(classify_plain(&TypeDescriptor::Opaque("Decimal".into())).is_err());
    }

    #[test]
    fn test_union_is_not_classified_directly() {
        let ty = TypeDescriptor::optional(TypeDescriptor::text());
        assert!(classify_plain(&ty).is_err());
    }
}
