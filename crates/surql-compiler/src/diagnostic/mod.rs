//! Diagnostic types for error reporting.

mod error;
mod span;

pub use error::{IdentifierKind, SchemaError};
pub use span::Span;
