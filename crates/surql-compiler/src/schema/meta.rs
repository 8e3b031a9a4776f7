//! Classified union branches.

use super::builder::TableLookup;
use super::target::{classify, TargetType};
use crate::diagnostic::SchemaError;
use crate::ir::{Catalog, TypeDescriptor};

/// One classified alternative of a field's declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaType {
    pub tag: TargetType,
    pub source: TypeDescriptor,
    /// Element descriptor of an ARRAY or SET branch.
    pub element: Option<TypeDescriptor>,
    /// Linked table of a RECORD branch.
    pub record_link: Option<String>,
    flexible: bool,
    bears_definition: bool,
}

impl MetaType {
    /// Classifies `source` and derives the branch facts.
    pub fn classify(
        source: &TypeDescriptor,
        catalog: &Catalog,
        lookup: &dyn TableLookup,
        path: &str,
    ) -> Result<Self, SchemaError> {
        let tag = classify(source, catalog, lookup, path)?;
        let mut meta = MetaType {
            tag,
            source: source.clone(),
            element: None,
            record_link: None,
            flexible: false,
            bears_definition: false,
        };

        match (tag, source) {
            (TargetType::Array | TargetType::Set, TypeDescriptor::Generic { args, .. }) => {
                meta.element = args.first().cloned();
                meta.bears_definition = true;
            }
            (TargetType::Record, TypeDescriptor::RecordRef(table)) => {
                meta.record_link = Some(table.clone());
            }
            (TargetType::Record, TypeDescriptor::Composite(id)) => {
                meta.record_link = lookup.table_name(*id).map(str::to_string);
            }
            (TargetType::Object, TypeDescriptor::Composite(id)) => {
                let def = catalog.get(*id)?;
                // A composite with nothing to emit behaves like an open map.
                let has_members = def.schema_members().next().is_some();
                meta.flexible = def.open || !has_members;
                meta.bears_definition = has_members;
            }
            (TargetType::Object, _) => {
                meta.flexible = true;
            }
            _ => {}
        }

        Ok(meta)
    }

    /// True for an OBJECT branch whose composite accepts undeclared members.
    pub fn is_flexible(&self) -> bool {
        self.flexible
    }

    /// True when this branch needs a nested definition.
    pub fn bears_definition(&self) -> bool {
        self.bears_definition
    }

    /// Membership predicate for an ENUM branch.
    pub fn enum_assertion(&self) -> Option<String> {
        match (&self.tag, &self.source) {
            (TargetType::Enum, TypeDescriptor::Enum(e)) => {
                let values: Vec<String> = e.values.iter().map(|v| v.to_string()).collect();
                Some(format!("$value in [{}]", values.join(",")))
            }
            _ => None,
        }
    }
}

/// Classifies every alternative of `ty` in declaration order.
///
/// Nested unions are flattened; a non-union descriptor yields one branch.
pub fn resolve_branches(
    ty: &TypeDescriptor,
    catalog: &Catalog,
    lookup: &dyn TableLookup,
    path: &str,
) -> Result<Vec<MetaType>, SchemaError> {
    let mut branches = Vec::new();
    collect_branches(ty, catalog, lookup, path, &mut branches)?;
    Ok(branches)
}

fn collect_branches(
    ty: &TypeDescriptor,
    catalog: &Catalog,
    lookup: &dyn TableLookup,
    path: &str,
    out: &mut Vec<MetaType>,
) -> Result<(), SchemaError> {
    match ty {
        TypeDescriptor::Union(alternatives) => {
            for alt in alternatives {
                collect_branches(alt, catalog, lookup, path, out)?;
            }
        }
        other => out.push(MetaType::classify(other, catalog, lookup, path)?),
    }
    Ok(())
}
