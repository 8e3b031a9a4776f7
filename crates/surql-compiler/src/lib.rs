//! # SurrealQL Schema Compiler
//!
//! This crate compiles data-model descriptions into SurrealQL schema
//! definitions: `DEFINE TABLE`, `DEFINE FIELD`, `DEFINE INDEX`,
//! `DEFINE EVENT` and `DEFINE ANALYZER` statements.
//!
//! ## Architecture
//!
//! ```text
//! Manifest (JSON)
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Frontend   │  Type expressions → descriptors
//! │ (JSON → IR)  │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │      IR      │  Composite arena + table configuration
//! │   (Catalog)  │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Schema    │  Classify, elaborate, memoize
//! │ (IR → tree)  │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  Render SurrealQL
//! │ (tree → SDL) │
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use surql_compiler::{Generator, GeneratorConfig};
//!
//! let config = GeneratorConfig {
//!     manifest_path: "surql.json".into(),
//!     out_path: Some("schema.surql".into()),
//! };
//!
//! let result = Generator::new(config).generate()?;
//! println!("{} tables, {} fields", result.tables, result.fields);
//! ```
//!
//! Models can also be described in code and registered directly:
//!
//! ```rust,ignore
//! use surql_compiler::ir::{Catalog, CompositeDef, TableConfig, TypeDescriptor};
//! use surql_compiler::Registry;
//!
//! let mut catalog = Catalog::new();
//! let user = catalog.insert(CompositeDef::new("User").member("name", TypeDescriptor::text()))?;
//!
//! let mut registry = Registry::new(catalog);
//! registry.register_table("user", user, TableConfig::default())?;
//! println!("{}", registry.collect()?);
//! ```

pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod frontend;
pub mod ir;
pub mod registry;
pub mod schema;

use std::path::Path;

use tracing::{debug, info};

pub use config::GeneratorConfig;
pub use diagnostic::SchemaError;
pub use frontend::Manifest;
pub use registry::{RegisteredTable, Registry};

/// Drives manifest loading, schema building and SDL output.
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Creates a new generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Loads the manifest and builds every table.
    pub fn load(&self) -> Result<Registry, SchemaError> {
        debug!(manifest = %self.config.manifest_path.display(), "loading manifest");
        frontend::load_registry(&self.config.manifest_path)
    }

    /// Renders the SDL for the configured manifest.
    pub fn render(&self) -> Result<String, SchemaError> {
        self.load()?.collect()
    }

    /// Renders the SDL and writes it to `out_path` when one is configured.
    pub fn generate(&self) -> Result<GenerateResult, SchemaError> {
        let result = self.check()?;
        if let Some(out_path) = &self.config.out_path {
            write_output(out_path, &result.sdl)?;
            info!(path = %out_path.display(), fields = result.fields, "wrote schema");
        }
        Ok(result)
    }

    /// Builds and renders everything without writing any file.
    pub fn check(&self) -> Result<GenerateResult, SchemaError> {
        let registry = self.load()?;
        let sdl = registry.collect()?;
        Ok(GenerateResult {
            tables: registry.tables().len(),
            analyzers: registry.analyzers().len(),
            fields: codegen::count_fields(&sdl),
            sdl,
        })
    }
}

fn write_output(path: &Path, sdl: &str) -> Result<(), SchemaError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SchemaError::io(parent, e.to_string()))?;
    }
    let mut content = sdl.to_string();
    content.push('\n');
    std::fs::write(path, content).map_err(|e| SchemaError::io(path, e.to_string()))
}

/// Result of a successful generation.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    /// Number of tables rendered.
    pub tables: usize,
    /// Number of analyzers rendered.
    pub analyzers: usize,
    /// Number of `DEFINE FIELD` statements.
    pub fields: usize,
    /// The generated SDL.
    pub sdl: String,
}
