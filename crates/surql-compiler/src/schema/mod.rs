//! The type-tree compiler.
//!
//! Turns composite descriptors into a normalized schema tree:
//!
//! 1. [`classify`] maps one descriptor to a [`TargetType`]
//! 2. [`resolve_branches`] classifies every union alternative into a [`MetaType`]
//! 3. [`SchemaBuilder`] elaborates object and container branches into nested
//!    definitions, memoizing composites in the [`IdentityCache`]
//!
//! The tree is rendered to SDL by [`crate::codegen`].

mod builder;
mod cache;
mod field;
mod meta;
mod target;

pub use builder::{SchemaBuilder, TableLookup};
pub use cache::{Checkpoint, IdentityCache};
pub use field::{Definition, Schema, SchemaField};
pub use meta::{resolve_branches, MetaType};
pub use target::{classify, TargetType};
