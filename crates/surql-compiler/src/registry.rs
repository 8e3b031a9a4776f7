//! Registry of tables and analyzers.
//!
//! The registry owns the composite catalog, the built schemas and the table
//! configuration. Registering a table builds its schema immediately, so errors
//! surface at the registration call and never at render time.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::codegen::{define_analyzer, define_event, define_index, define_table, SdlEmitter};
use crate::diagnostic::{IdentifierKind, SchemaError};
use crate::ir::{Analyzer, Catalog, CompositeId, IndexKind, TableConfig};
use crate::schema::{IdentityCache, Schema, SchemaBuilder, TableLookup};

/// A composite registered under a table name.
#[derive(Debug, Clone)]
pub struct RegisteredTable {
    pub name: String,
    pub composite: CompositeId,
    pub config: TableConfig,
}

#[derive(Debug, Default)]
pub struct Registry {
    catalog: Catalog,
    tables: Vec<RegisteredTable>,
    table_names: HashMap<CompositeId, String>,
    analyzers: Vec<Analyzer>,
    cache: IdentityCache,
}

impl Registry {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Default::default()
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Mutable access for declaring more composites.
    ///
    /// Schemas that are already built are not affected by later changes.
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    pub fn register_analyzer(&mut self, analyzer: Analyzer) -> Result<(), SchemaError> {
        analyzer.validate()?;
        if self.analyzers.iter().any(|a| a.name == analyzer.name) {
            return Err(SchemaError::duplicate(IdentifierKind::Analyzer, analyzer.name));
        }
        info!(analyzer = %analyzer.name, "registered analyzer");
        self.analyzers.push(analyzer);
        Ok(())
    }

    /// Marks `composite` as table `name` without building its schema.
    ///
    /// Members of other tables that refer to a declared composite become
    /// record links even when its own table is registered later.
    pub fn declare_table(&mut self, name: &str, composite: CompositeId) -> Result<(), SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::invalid("table", name, "name must not be empty"));
        }
        if self.table_names.values().any(|n| n == name) {
            return Err(SchemaError::duplicate(IdentifierKind::Table, name));
        }
        let def = self.catalog.get(composite)?;
        if let Some(existing) = self.table_names.get(&composite) {
            return Err(SchemaError::invalid(
                "table",
                name,
                format!("model '{}' is already registered as table '{}'", def.name, existing),
            ));
        }
        if self.cache.contains(composite) {
            return Err(inlined_before_table(name, &def.name));
        }
        debug!(table = name, model = %def.name, "declared table");
        self.table_names.insert(composite, name.to_string());
        Ok(())
    }

    /// Registers `composite` as table `name` and builds its schema.
    ///
    /// The table name is visible while the schema builds, so members that
    /// refer to the composite itself become record links. A composite that an
    /// earlier table already embedded as an object is rejected; declare it
    /// with [`declare_table`](Self::declare_table) first. On failure the
    /// registry is left as it was before the call.
    pub fn register_table(
        &mut self,
        name: &str,
        composite: CompositeId,
        config: TableConfig,
    ) -> Result<(), SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::invalid("table", name, "name must not be empty"));
        }
        if self.table(name).is_some() {
            return Err(SchemaError::duplicate(IdentifierKind::Table, name));
        }
        let def = self.catalog.get(composite)?;
        let declared = match self.table_names.get(&composite) {
            Some(existing) if existing == name => true,
            Some(existing) => {
                return Err(SchemaError::invalid(
                    "table",
                    name,
                    format!("model '{}' is already registered as table '{}'", def.name, existing),
                ))
            }
            None => false,
        };
        if !declared && self.table_names.values().any(|n| n == name) {
            return Err(SchemaError::duplicate(IdentifierKind::Table, name));
        }
        if self.cache.contains(composite) {
            return Err(inlined_before_table(name, &def.name));
        }
        config.validate()?;
        for index in &config.indexes {
            if let IndexKind::Search { analyzer, .. } = &index.kind {
                if !self.analyzers.iter().any(|a| &a.name == analyzer) {
                    return Err(SchemaError::UnknownAnalyzer {
                        analyzer: analyzer.clone(),
                        index: index.name.clone(),
                    });
                }
            }
        }

        debug!(table = name, model = %def.name, "building table schema");
        self.table_names.insert(composite, name.to_string());
        let built = SchemaBuilder::new(&self.catalog, &self.table_names, &mut self.cache).build(composite);
        if let Err(err) = built {
            if !declared {
                self.table_names.remove(&composite);
            }
            return Err(err);
        }

        info!(table = name, "registered table");
        self.tables.push(RegisteredTable {
            name: name.to_string(),
            composite,
            config,
        });
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&RegisteredTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Registered tables in registration order.
    pub fn tables(&self) -> &[RegisteredTable] {
        &self.tables
    }

    pub fn analyzers(&self) -> &[Analyzer] {
        &self.analyzers
    }

    /// The built schema of a table.
    pub fn schema(&self, name: &str) -> Result<&Schema, SchemaError> {
        let table = self.table(name).ok_or_else(|| SchemaError::UnknownTable {
            name: name.to_string(),
        })?;
        self.cache.get(table.composite)
    }

    /// Renders the table statement followed by its fields, indexes and events.
    pub fn render_table(&self, name: &str) -> Result<String, SchemaError> {
        let table = self.table(name).ok_or_else(|| SchemaError::UnknownTable {
            name: name.to_string(),
        })?;
        let schema = self.cache.get(table.composite)?;

        let mut lines = vec![define_table(&table.name, &table.config, schema.flexible)];
        if table.config.view.is_none() {
            let fields = SdlEmitter::new(&self.cache, &table.name).render_schema(table.composite)?;
            if !fields.is_empty() {
                lines.push(fields);
            }
            lines.extend(table.config.indexes.iter().map(|i| define_index(i, &table.name)));
            lines.extend(table.config.events.iter().map(|e| define_event(e, &table.name)));
        }
        Ok(lines.join("\n"))
    }

    /// Renders every analyzer, then every table, separated by blank lines.
    pub fn collect(&self) -> Result<String, SchemaError> {
        let mut blocks: Vec<String> = self.analyzers.iter().map(define_analyzer).collect();
        for table in &self.tables {
            blocks.push(self.render_table(&table.name)?);
        }
        Ok(blocks.join("\n\n"))
    }

    /// Forgets every table, analyzer and built schema. The catalog is kept.
    pub fn clear(&mut self) {
        debug!(tables = self.tables.len(), "clearing registry");
        self.tables.clear();
        self.table_names.clear();
        self.analyzers.clear();
        self.cache.clear();
    }
}

fn inlined_before_table(table: &str, model: &str) -> SchemaError {
    SchemaError::invalid(
        "table",
        table,
        format!(
            "model '{}' was already embedded as an object by an earlier table; declare or register table '{}' first",
            model, table
        ),
    )
}

impl TableLookup for Registry {
    fn table_name(&self, id: CompositeId) -> Option<&str> {
        self.table_names.table_name(id)
    }
}
