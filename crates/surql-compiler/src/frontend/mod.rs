//! Frontends that turn model descriptions into the catalog and registry.
//!
//! The manifest frontend reads a JSON document whose field types are written
//! as type expressions (`list[str] | None`). Code that builds a [`Catalog`]
//! directly does not need a frontend.
//!
//! [`Catalog`]: crate::ir::Catalog

pub mod manifest;
pub mod type_expr;

use std::path::Path;

use crate::diagnostic::SchemaError;
use crate::registry::Registry;

pub use manifest::{FieldDecl, Manifest, ModelDecl, TableDecl};
pub use type_expr::{parse, Term, TypeExpr, TypeResolver};

/// Loads a manifest file and registers everything it declares.
pub fn load_registry(path: &Path) -> Result<Registry, SchemaError> {
    Manifest::load(path)?.into_registry()
}
