//! SDL generation from built schemas.
//!
//! Field statements are produced by walking the schema tree ([`SdlEmitter`]);
//! table, index, event and analyzer statements are flat renderings of their
//! configuration values.

mod field;
mod table;

pub use field::{type_expression, SdlEmitter};
pub use table::{define_analyzer, define_event, define_index, define_table};

/// Number of `DEFINE FIELD` statements in an SDL text.
pub fn count_fields(sdl: &str) -> usize {
    sdl.lines().filter(|line| line.starts_with("DEFINE FIELD ")).count()
}
