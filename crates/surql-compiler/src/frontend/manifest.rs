//! JSON manifest describing enums, models, analyzers and tables.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::type_expr::TypeResolver;
use crate::diagnostic::{IdentifierKind, SchemaError};
use crate::ir::{Analyzer, Catalog, EnumType, Member, Permissions, TableConfig};
use crate::registry::Registry;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub enums: Vec<EnumType>,
    pub models: Vec<ModelDecl>,
    pub analyzers: Vec<Analyzer>,
    pub tables: Vec<TableDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDecl {
    pub name: String,
    /// Accept members beyond the declared fields.
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    /// Type expression, e.g. `list[str] | None`.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDecl {
    pub name: String,
    pub model: String,
    #[serde(default)]
    pub config: TableConfig,
}

impl Manifest {
    /// Reads and parses a manifest file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::io(path, e.to_string()))?;
        Self::parse(&content, path)
    }

    /// Parses manifest JSON. `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, SchemaError> {
        serde_json::from_str(content).map_err(|e| SchemaError::ManifestParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Builds the catalog from the declared models.
    ///
    /// Every model is declared before any field type is resolved, so field
    /// types may name models declared later in the manifest.
    pub fn catalog(&self) -> Result<Catalog, SchemaError> {
        let mut enums = HashMap::new();
        for e in &self.enums {
            if enums.insert(e.name.clone(), e.clone()).is_some() {
                return Err(SchemaError::duplicate(IdentifierKind::Enum, &e.name));
            }
        }

        let mut catalog = Catalog::new();
        let mut ids = Vec::with_capacity(self.models.len());
        for model in &self.models {
            let id = catalog.declare(&model.name)?;
            catalog.set_open(id, model.open)?;
            ids.push(id);
        }
        debug!(models = ids.len(), enums = enums.len(), "declared models");

        let mut members = Vec::with_capacity(self.models.len());
        {
            let resolver = TypeResolver::new(&catalog, &enums);
            for model in &self.models {
                let mut seen = HashSet::new();
                let mut resolved = Vec::with_capacity(model.fields.len());
                for field in &model.fields {
                    if !seen.insert(field.name.as_str()) {
                        return Err(SchemaError::duplicate(
                            IdentifierKind::Field,
                            format!("{}.{}", model.name, field.name),
                        ));
                    }
                    let ty = resolver.parse(&field.ty).map_err(|err| with_field_context(err, model, field))?;
                    let mut member = Member::new(&field.name, ty);
                    if let Some(permissions) = &field.permissions {
                        permissions.validate()?;
                        member = member.with_permissions(permissions.clone());
                    }
                    resolved.push(member);
                }
                members.push(resolved);
            }
        }

        for (id, resolved) in ids.into_iter().zip(members) {
            for member in resolved {
                catalog.add_member(id, member)?;
            }
        }
        Ok(catalog)
    }

    /// Builds a registry with every analyzer and table registered, in order.
    ///
    /// All table names are declared before the first table schema is built.
    pub fn into_registry(self) -> Result<Registry, SchemaError> {
        let catalog = self.catalog()?;
        let mut registry = Registry::new(catalog);

        for analyzer in self.analyzers {
            registry.register_analyzer(analyzer)?;
        }
        // Every table is known before any is built, so references to tables
        // listed later still become record links.
        let mut declared = Vec::with_capacity(self.tables.len());
        for table in self.tables {
            let id = registry
                .catalog()
                .lookup(&table.model)
                .ok_or_else(|| SchemaError::UnknownComposite {
                    name: table.model.clone(),
                })?;
            registry.declare_table(&table.name, id)?;
            declared.push((id, table));
        }
        for (id, table) in declared {
            registry.register_table(&table.name, id, table.config)?;
        }
        debug!(tables = registry.tables().len(), "manifest loaded");
        Ok(registry)
    }
}

fn with_field_context(err: SchemaError, model: &ModelDecl, field: &FieldDecl) -> SchemaError {
    match err {
        SchemaError::TypeSyntax { message, expr, span } => SchemaError::TypeSyntax {
            message: format!("{} (field '{}.{}')", message, model.name, field.name),
            expr,
            span,
        },
        other => other,
    }
}
