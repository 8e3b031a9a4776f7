//! Table-level configuration value objects.
//!
//! These are flat, non-recursive definitions that sit next to the field tree:
//! table mode, views, indexes, events and analyzers. They are rendered by
//! `codegen::table` and validated eagerly at registration time.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Permissions;
use crate::diagnostic::{IdentifierKind, SchemaError};

/// Configuration of a registered table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableConfig {
    /// Defines the table as a view instead of a stored table.
    pub view: Option<View>,
    /// `SCHEMAFULL` when true, `SCHEMALESS` otherwise.
    pub strict: bool,
    /// Change feed retention, e.g. `1d`.
    pub changefeed: Option<String>,
    /// Put the table in DROP mode.
    pub drop: bool,
    pub indexes: Vec<Index>,
    pub events: Vec<Event>,
    pub permissions: Option<Permissions>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            view: None,
            strict: true,
            changefeed: None,
            drop: false,
            indexes: Vec::new(),
            events: Vec::new(),
            permissions: None,
        }
    }
}

impl TableConfig {
    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for index in &self.indexes {
            if !seen.insert(index.name.as_str()) {
                return Err(SchemaError::duplicate(IdentifierKind::Index, &index.name));
            }
            index.validate()?;
        }
        for event in &self.events {
            event.validate()?;
        }
        if let Some(view) = &self.view {
            view.validate()?;
        }
        if let Some(permissions) = &self.permissions {
            permissions.validate()?;
        }
        Ok(())
    }
}

/// `AS SELECT ... FROM ...` view definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    #[serde(default = "default_select")]
    pub select: Vec<String>,
    pub from: Vec<String>,
    #[serde(default, rename = "where")]
    pub condition: Vec<String>,
    #[serde(default, rename = "groupBy")]
    pub group_by: Vec<String>,
}

fn default_select() -> Vec<String> {
    vec!["*".to_string()]
}

impl View {
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.select.is_empty() {
            return Err(SchemaError::invalid("view", self.from.join(","), "select list must not be empty"));
        }
        if self.from.is_empty() {
            return Err(SchemaError::invalid("view", "FROM", "at least one source table is required"));
        }
        Ok(())
    }
}

/// Index flavour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    #[default]
    Plain,
    Unique,
    Search {
        analyzer: String,
        #[serde(default)]
        bm25: Option<Bm25>,
        #[serde(default)]
        highlights: bool,
    },
}

/// BM25 ranking for search indexes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bm25 {
    Enabled(bool),
    Tuned { k1: f64, b: f64 },
}

/// A table index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub fields: Vec<String>,
    #[serde(default)]
    pub kind: IndexKind,
}

impl Index {
    pub fn new(name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            kind: IndexKind::Plain,
        }
    }

    pub fn unique(mut self) -> Self {
        self.kind = IndexKind::Unique;
        self
    }

    pub fn search(mut self, analyzer: impl Into<String>, bm25: Option<Bm25>, highlights: bool) -> Self {
        self.kind = IndexKind::Search {
            analyzer: analyzer.into(),
            bm25,
            highlights,
        };
        self
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::invalid("index", "", "name must not be empty"));
        }
        if self.fields.is_empty() {
            return Err(SchemaError::invalid("index", &self.name, "at least one field is required"));
        }
        Ok(())
    }
}

/// A table event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    /// Conditions, joined with `OR`.
    pub when: Vec<String>,
    /// Statements run when a condition holds.
    pub then: Vec<String>,
}

impl Event {
    pub fn new(name: impl Into<String>, when: &[&str], then: &[&str]) -> Self {
        Self {
            name: name.into(),
            when: when.iter().map(|w| w.to_string()).collect(),
            then: then.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::invalid("event", "", "name must not be empty"));
        }
        if self.when.is_empty() {
            return Err(SchemaError::invalid("event", &self.name, "at least one WHEN condition is required"));
        }
        if self.then.is_empty() {
            return Err(SchemaError::invalid("event", &self.name, "at least one THEN statement is required"));
        }
        Ok(())
    }
}

/// Analyzer tokenizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tokenizer {
    Blank,
    Camel,
    Class,
    Punct,
}

impl Tokenizer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tokenizer::Blank => "blank",
            Tokenizer::Camel => "camel",
            Tokenizer::Class => "class",
            Tokenizer::Punct => "punct",
        }
    }
}

/// Languages supported by the snowball filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnowballLanguage {
    Arabic,
    Danish,
    Dutch,
    English,
    French,
    German,
    Greek,
    Hungarian,
    Italian,
    Norwegian,
    Portuguese,
    Romanian,
    Russian,
    Spanish,
    Swedish,
    Tamil,
    Turkish,
}

impl SnowballLanguage {
    pub const ALL: [SnowballLanguage; 17] = [
        SnowballLanguage::Arabic,
        SnowballLanguage::Danish,
        SnowballLanguage::Dutch,
        SnowballLanguage::English,
        SnowballLanguage::French,
        SnowballLanguage::German,
        SnowballLanguage::Greek,
        SnowballLanguage::Hungarian,
        SnowballLanguage::Italian,
        SnowballLanguage::Norwegian,
        SnowballLanguage::Portuguese,
        SnowballLanguage::Romanian,
        SnowballLanguage::Russian,
        SnowballLanguage::Spanish,
        SnowballLanguage::Swedish,
        SnowballLanguage::Tamil,
        SnowballLanguage::Turkish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SnowballLanguage::Arabic => "arabic",
            SnowballLanguage::Danish => "danish",
            SnowballLanguage::Dutch => "dutch",
            SnowballLanguage::English => "english",
            SnowballLanguage::French => "french",
            SnowballLanguage::German => "german",
            SnowballLanguage::Greek => "greek",
            SnowballLanguage::Hungarian => "hungarian",
            SnowballLanguage::Italian => "italian",
            SnowballLanguage::Norwegian => "norwegian",
            SnowballLanguage::Portuguese => "portuguese",
            SnowballLanguage::Romanian => "romanian",
            SnowballLanguage::Russian => "russian",
            SnowballLanguage::Spanish => "spanish",
            SnowballLanguage::Swedish => "swedish",
            SnowballLanguage::Tamil => "tamil",
            SnowballLanguage::Turkish => "turkish",
        }
    }
}

/// Analyzer filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AnalyzerFilter {
    Ascii,
    Lowercase,
    Uppercase,
    EdgeNgram { min: u32, max: u32 },
    Snowball(SnowballLanguage),
}

impl fmt::Display for AnalyzerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerFilter::Ascii => f.write_str("ascii"),
            AnalyzerFilter::Lowercase => f.write_str("lowercase"),
            AnalyzerFilter::Uppercase => f.write_str("uppercase"),
            AnalyzerFilter::EdgeNgram { min, max } => write!(f, "edgengram({},{})", min, max),
            AnalyzerFilter::Snowball(lang) => write!(f, "snowball({})", lang.as_str()),
        }
    }
}

const FILTER_HELP: &str =
    "must be one of ascii, lowercase, uppercase, edgengram(<min>,<max>), snowball(<lang>)";

impl FromStr for AnalyzerFilter {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::invalid("analyzer filter", s, FILTER_HELP);
        match s {
            "ascii" => return Ok(AnalyzerFilter::Ascii),
            "lowercase" => return Ok(AnalyzerFilter::Lowercase),
            "uppercase" => return Ok(AnalyzerFilter::Uppercase),
            _ => {}
        }
        let (name, args) = s
            .strip_suffix(')')
            .and_then(|head| head.split_once('('))
            .ok_or_else(invalid)?;
        match name {
            "edgengram" => {
                let (min, max) = args.split_once(',').ok_or_else(invalid)?;
                let min = min.parse::<u32>().map_err(|_| invalid())?;
                let max = max.parse::<u32>().map_err(|_| invalid())?;
                Ok(AnalyzerFilter::EdgeNgram { min, max })
            }
            "snowball" => SnowballLanguage::ALL
                .iter()
                .find(|lang| lang.as_str() == args)
                .map(|lang| AnalyzerFilter::Snowball(*lang))
                .ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for AnalyzerFilter {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AnalyzerFilter> for String {
    fn from(filter: AnalyzerFilter) -> Self {
        filter.to_string()
    }
}

/// A full-text analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyzer {
    pub name: String,
    pub tokenizers: Vec<Tokenizer>,
    #[serde(default)]
    pub filters: Vec<AnalyzerFilter>,
}

impl Analyzer {
    pub fn new(name: impl Into<String>, tokenizers: Vec<Tokenizer>, filters: Vec<AnalyzerFilter>) -> Self {
        Self {
            name: name.into(),
            tokenizers,
            filters,
        }
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::invalid("analyzer", "", "name must not be empty"));
        }
        if self.tokenizers.is_empty() {
            return Err(SchemaError::invalid("analyzer", &self.name, "at least one tokenizer is required"));
        }
        let mut seen = HashSet::new();
        for filter in &self.filters {
            if !seen.insert(filter) {
                return Err(SchemaError::duplicate(IdentifierKind::AnalyzerFilter, filter.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_parse() {
        let filters: Vec<AnalyzerFilter> = ["lowercase", "ascii", "uppercase", "edgengram(1,2)", "snowball(english)", "snowball(french)"]
            .iter()
            .map(|f| f.parse().unwrap())
            .collect();
        assert_eq!(filters[3], AnalyzerFilter::EdgeNgram { min: 1, max: 2 });
        assert_eq!(filters[5], AnalyzerFilter::Snowball(SnowballLanguage::French));
        assert_eq!(filters[4].to_string(), "snowball(english)");
    }

    #[test]
    fn test_bad_filters() {
        assert!("bad_filter".parse::<AnalyzerFilter>().is_err());
        assert!("snowball(bad_country)".parse::<AnalyzerFilter>().is_err());
        assert!("edgengram(1)".parse::<AnalyzerFilter>().is_err());
        assert!("edgengram(a,2)".parse::<AnalyzerFilter>().is_err());
    }

    #[test]
    fn test_duplicate_filters() {
        let analyzer = Analyzer::new(
            "dup",
            vec![Tokenizer::Blank],
            vec![AnalyzerFilter::Lowercase, AnalyzerFilter::Lowercase],
        );
        assert!(matches!(
            analyzer.validate(),
            Err(SchemaError::DuplicateIdentifier { kind: IdentifierKind::AnalyzerFilter, .. })
        ));
    }

    #[test]
    fn test_duplicate_indexes() {
        let config = TableConfig::default()
            .with_index(Index::new("by_name", &["name"]))
            .with_index(Index::new("by_name", &["age"]));
        assert!(matches!(
            config.validate(),
            Err(SchemaError::DuplicateIdentifier { kind: IdentifierKind::Index, .. })
        ));
    }

    #[test]
    fn test_config_from_json() {
        let config: TableConfig = serde_json::from_str(
            r#"{
                "drop": true,
                "indexes": [
                    { "name": "by_name", "fields": ["name"], "kind": "unique" },
                    { "name": "ft", "fields": ["bio"], "kind": { "search": { "analyzer": "simple", "bm25": { "k1": 1.2, "b": 0.75 } } } }
                ]
            }"#,
        )
        .unwrap();
        assert!(config.strict);
        assert!(config.drop);
        assert_eq!(config.indexes[0].kind, IndexKind::Unique);
        assert_eq!(
            config.indexes[1].kind,
            IndexKind::Search {
                analyzer: "simple".into(),
                bm25: Some(Bm25::Tuned { k1: 1.2, b: 0.75 }),
                highlights: false,
            }
        );
    }

    #[test]
    fn test_event_validation() {
        assert!(Event::new("e", &[], &["1==1"]).validate().is_err());
        assert!(Event::new("e", &["1==1"], &[]).validate().is_err());
        assert!(Event::new("e", &["1==1"], &["1==1"]).validate().is_ok());
    }
}
