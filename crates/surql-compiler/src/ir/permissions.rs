//! Table and field permission rules.

use serde::{Deserialize, Serialize};

use crate::diagnostic::SchemaError;

/// Permission predicates per statement verb.
///
/// Each verb holds an ordered list of predicate fragments that are rendered
/// one per line, e.g. `["WHERE published = true", "OR user = $auth.id"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Vec<String>>,
}

impl Permissions {
    /// The same predicates for every verb.
    pub fn all(predicates: &[&str]) -> Self {
        let rules: Vec<String> = predicates.iter().map(|p| p.to_string()).collect();
        Self {
            select: Some(rules.clone()),
            create: Some(rules.clone()),
            update: Some(rules.clone()),
            delete: Some(rules),
        }
    }

    fn verbs(&self) -> [(&'static str, Option<&Vec<String>>); 4] {
        [
            ("SELECT", self.select.as_ref()),
            ("CREATE", self.create.as_ref()),
            ("UPDATE", self.update.as_ref()),
            ("DELETE", self.delete.as_ref()),
        ]
    }

    /// At least one verb must be set, and no set verb may be empty.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let verbs = self.verbs();
        if verbs.iter().all(|(_, rules)| rules.is_none()) {
            return Err(SchemaError::invalid(
                "permissions",
                "PERMISSIONS",
                "at least one of select, create, update or delete is required",
            ));
        }
        for (verb, rules) in verbs {
            if rules.is_some_and(|r| r.is_empty()) {
                return Err(SchemaError::invalid(
                    "permissions",
                    verb,
                    "predicate list must not be empty",
                ));
            }
        }
        Ok(())
    }

    /// Renders the `PERMISSIONS` block (without a trailing `;`).
    pub fn to_sdl(&self) -> String {
        let mut parts = vec!["PERMISSIONS".to_string()];
        for (verb, rules) in self.verbs() {
            if let Some(rules) = rules {
                let body: Vec<String> = rules.iter().map(|r| format!("        {}", r)).collect();
                parts.push(format!("FOR {}\n{}", verb, body.join("\n")));
            }
        }
        parts.join("\n    ")
    }
}
