//! Schema compiler error types.
#![allow(unused_assignments)]

use std::fmt;
use std::path::PathBuf;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// The kind of named definition that collided in a DuplicateIdentifier error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Table,
    Index,
    Analyzer,
    AnalyzerFilter,
    Composite,
    Enum,
    Field,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IdentifierKind::Table => "table",
            IdentifierKind::Index => "index",
            IdentifierKind::Analyzer => "analyzer",
            IdentifierKind::AnalyzerFilter => "analyzer filter",
            IdentifierKind::Composite => "model",
            IdentifierKind::Enum => "enum",
            IdentifierKind::Field => "field",
        };
        f.write_str(s)
    }
}

/// Errors that can occur while building or rendering a schema.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum SchemaError {
    // =========================================================================
    // Type Errors
    // =========================================================================
    #[error("Type '{type_desc}' of field '{path}' is not supported")]
    #[diagnostic(
        code(surql::types::unsupported),
        help("Supported types: str, int, float, bool, datetime, date, Any, None, Null, AnyRecord, dict, list[T], set[T], enums and models")
    )]
    UnsupportedType {
        type_desc: String,
        path: String,
    },

    #[error("Field '{path}' has {count} union branches that need nested definitions")]
    #[diagnostic(
        code(surql::types::multiple_elaborable_branches),
        help("At most one object, list or set alternative is allowed per field. Split the field or link the model as a record.")
    )]
    MultipleElaborableBranches {
        path: String,
        count: usize,
    },

    #[error("Field '{path}' has no value type, only modifiers")]
    #[diagnostic(
        code(surql::types::no_value_type),
        help("A field typed only as None needs at least one value alternative, e.g. `str | None`")
    )]
    NoValueType {
        path: String,
    },

    #[error("Definition of model '{composite}' was read before its fields were built")]
    #[diagnostic(code(surql::types::cyclic_definition_incomplete))]
    CyclicDefinitionIncomplete {
        composite: String,
    },

    #[error("Unknown model: {name}")]
    #[diagnostic(code(surql::types::unknown_model))]
    UnknownComposite {
        name: String,
    },

    #[error("Invalid type expression: {message}")]
    #[diagnostic(code(surql::types::syntax_error))]
    TypeSyntax {
        message: String,
        #[source_code]
        expr: String,
        #[label("here")]
        span: SourceSpan,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Duplicate {kind} name: {name}")]
    #[diagnostic(code(surql::config::duplicate_identifier))]
    DuplicateIdentifier {
        kind: IdentifierKind,
        name: String,
    },

    #[error("Search index '{index}' uses unknown analyzer '{analyzer}'")]
    #[diagnostic(
        code(surql::config::unknown_analyzer),
        help("Register the analyzer before the table that uses it")
    )]
    UnknownAnalyzer {
        analyzer: String,
        index: String,
    },

    #[error("Unknown table: {name}")]
    #[diagnostic(code(surql::config::unknown_table))]
    UnknownTable {
        name: String,
    },

    #[error("Invalid {subject} '{name}': {message}")]
    #[diagnostic(code(surql::config::invalid))]
    InvalidConfig {
        subject: &'static str,
        name: String,
        message: String,
    },

    // =========================================================================
    // Manifest / IO Errors
    // =========================================================================
    #[error("Failed to parse manifest '{}': {message}", path.display())]
    #[diagnostic(code(surql::manifest::parse_failed))]
    ManifestParse {
        path: PathBuf,
        message: String,
    },

    #[error("Failed to access file '{}': {message}", path.display())]
    #[diagnostic(code(surql::io::error))]
    IoError {
        path: PathBuf,
        message: String,
    },
}

impl SchemaError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid(subject: &'static str, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            subject,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a duplicate identifier error.
    pub fn duplicate(kind: IdentifierKind, name: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            kind,
            name: name.into(),
        }
    }
}
