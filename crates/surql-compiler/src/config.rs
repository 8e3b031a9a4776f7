//! Generator configuration.

use std::path::PathBuf;

/// Configuration for the SDL generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// JSON manifest describing models and tables.
    pub manifest_path: PathBuf,

    /// File to write the generated SDL to. Nothing is written when unset.
    pub out_path: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from("surql.json"),
            out_path: None,
        }
    }
}
