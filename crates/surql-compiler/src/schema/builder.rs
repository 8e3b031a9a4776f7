//! Schema building: classification, elaboration and memoization.

use std::collections::HashMap;

use tracing::debug;

use super::cache::IdentityCache;
use super::field::{Definition, Schema, SchemaField};
use super::meta::{resolve_branches, MetaType};
use super::target::TargetType;
use crate::diagnostic::SchemaError;
use crate::ir::{Catalog, CompositeId, Permissions, TypeDescriptor};

/// Answers whether a composite is registered as a table.
pub trait TableLookup {
    fn table_name(&self, id: CompositeId) -> Option<&str>;
}

impl TableLookup for HashMap<CompositeId, String> {
    fn table_name(&self, id: CompositeId) -> Option<&str> {
        self.get(&id).map(String::as_str)
    }
}

/// Builds schema trees for composites of a catalog.
pub struct SchemaBuilder<'a> {
    catalog: &'a Catalog,
    lookup: &'a dyn TableLookup,
    cache: &'a mut IdentityCache,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(catalog: &'a Catalog, lookup: &'a dyn TableLookup, cache: &'a mut IdentityCache) -> Self {
        Self {
            catalog,
            lookup,
            cache,
        }
    }

    /// Builds the schema of `id` and everything it embeds.
    ///
    /// On failure every cache slot added by this call is removed again, so
    /// the identity can be retried and earlier schemas stay valid.
    pub fn build(&mut self, id: CompositeId) -> Result<(), SchemaError> {
        let checkpoint = self.cache.checkpoint();
        let result = self.build_schema(id);
        if result.is_err() {
            self.cache.rollback(checkpoint);
        }
        result
    }

    /// Builds a standalone field, with the same rollback guarantee as [`build`](Self::build).
    pub fn field(
        &mut self,
        name: &str,
        ty: &TypeDescriptor,
        permissions: Option<Permissions>,
    ) -> Result<SchemaField, SchemaError> {
        let checkpoint = self.cache.checkpoint();
        let result = self.build_field(Some(name), name.to_string(), ty, permissions);
        if result.is_err() {
            self.cache.rollback(checkpoint);
        }
        result
    }

    /// Builds the schema of a composite unless it is already cached.
    ///
    /// The slot is reserved before the members are built.
    pub fn build_schema(&mut self, id: CompositeId) -> Result<(), SchemaError> {
        let catalog = self.catalog;
        let def = catalog.get(id)?;
        if !self.cache.reserve(id, &def.name) {
            return Ok(());
        }
        debug!(composite = %def.name, "building schema");

        let mut fields = Vec::new();
        for member in def.schema_members() {
            let field = self.build_field(
                Some(member.name.as_str()),
                member.name.clone(),
                &member.ty,
                member.permissions.clone(),
            )?;
            fields.push(field);
        }

        let flexible = def.open || fields.is_empty();
        self.cache.complete(
            id,
            Schema {
                identity: id,
                name: def.name.clone(),
                fields,
                flexible,
            },
        )
    }

    /// Classifies every branch of `ty` and elaborates the ones that need it.
    pub fn build_field(
        &mut self,
        name: Option<&str>,
        path: String,
        ty: &TypeDescriptor,
        permissions: Option<Permissions>,
    ) -> Result<SchemaField, SchemaError> {
        if let Some(permissions) = &permissions {
            permissions.validate()?;
        }
        let branches = resolve_branches(ty, self.catalog, self.lookup, &path)?;

        if branches.iter().all(|b| b.tag.is_modifier()) {
            return Err(SchemaError::NoValueType { path });
        }
        let count = branches.iter().filter(|b| b.bears_definition()).count();
        if count > 1 {
            return Err(SchemaError::MultipleElaborableBranches { path, count });
        }

        let mut definitions = Vec::with_capacity(branches.len());
        for branch in &branches {
            let definition = if branch.bears_definition() {
                self.elaborate(branch, &path)?
            } else {
                None
            };
            definitions.push(definition);
        }

        Ok(SchemaField {
            name: name.map(str::to_string),
            path,
            branches,
            definitions,
            permissions,
        })
    }

    /// Builds the nested definition of an object or container branch.
    pub fn elaborate(&mut self, branch: &MetaType, path: &str) -> Result<Option<Definition>, SchemaError> {
        match (branch.tag, &branch.source) {
            (TargetType::Object, TypeDescriptor::Composite(id)) => {
                self.build_schema(*id)?;
                Ok(Some(Definition::Schema(*id)))
            }
            (TargetType::Array | TargetType::Set, _) => {
                let Some(element) = &branch.element else {
                    return Ok(None);
                };
                let field = self.build_field(None, format!("{}.*", path), element, None)?;
                Ok(Some(Definition::Element(Box::new(field))))
            }
            _ => Ok(None),
        }
    }
}
