//! Table-level statements: `DEFINE TABLE`, `INDEX`, `EVENT` and `ANALYZER`.

use crate::ir::{Analyzer, Bm25, Event, Index, IndexKind, TableConfig, View};

/// Renders the `DEFINE TABLE` statement.
///
/// `flexible` is the openness of the table's composite; an open composite is
/// always rendered `SCHEMALESS`.
pub fn define_table(name: &str, config: &TableConfig, flexible: bool) -> String {
    let mut parts = vec!["DEFINE TABLE".to_string(), name.to_string()];

    match &config.view {
        Some(view) => parts.push(view_clause(view)),
        None => {
            if config.drop {
                parts.push("DROP".to_string());
            }
            let mode = if config.strict && !flexible { "SCHEMAFULL" } else { "SCHEMALESS" };
            parts.push(mode.to_string());
            if let Some(changefeed) = &config.changefeed {
                parts.push(format!("CHANGEFEED {}", changefeed));
            }
        }
    }
    if let Some(permissions) = &config.permissions {
        parts.push(permissions.to_sdl());
    }

    format!("{};", parts.join(" "))
}

fn view_clause(view: &View) -> String {
    let mut clause = format!("AS SELECT {} FROM {}", view.select.join(","), view.from.join(","));
    if !view.condition.is_empty() {
        clause.push_str(&format!(" WHERE {}", view.condition.join(",")));
    }
    if !view.group_by.is_empty() {
        clause.push_str(&format!(" GROUP BY {}", view.group_by.join(",")));
    }
    clause
}

pub fn define_index(index: &Index, table: &str) -> String {
    let mut sdl = format!(
        "DEFINE INDEX {} ON TABLE {} FIELDS {}",
        index.name,
        table,
        index.fields.join(",")
    );
    match &index.kind {
        IndexKind::Plain => {}
        IndexKind::Unique => sdl.push_str(" UNIQUE"),
        IndexKind::Search {
            analyzer,
            bm25,
            highlights,
        } => {
            sdl.push_str(&format!(" SEARCH ANALYZER {}", analyzer));
            match bm25 {
                Some(Bm25::Enabled(true)) => sdl.push_str(" BM25"),
                Some(Bm25::Tuned { k1, b }) => sdl.push_str(&format!(" BM25({},{})", k1, b)),
                Some(Bm25::Enabled(false)) | None => {}
            }
            if *highlights {
                sdl.push_str(" HIGHLIGHTS");
            }
        }
    }
    sdl.push(';');
    sdl
}

pub fn define_event(event: &Event, table: &str) -> String {
    let then = match event.then.as_slice() {
        [single] => format!("({})", single),
        many => format!("{{\n{}\n}}", many.join("\n")),
    };
    format!(
        "DEFINE EVENT {} ON TABLE {} WHEN {} THEN {};",
        event.name,
        table,
        event.when.join(" OR "),
        then
    )
}

pub fn define_analyzer(analyzer: &Analyzer) -> String {
    let tokenizers: Vec<&str> = analyzer.tokenizers.iter().map(|t| t.as_str()).collect();
    let mut sdl = format!("DEFINE ANALYZER {} TOKENIZERS {}", analyzer.name, tokenizers.join(","));
    if !analyzer.filters.is_empty() {
        let filters: Vec<String> = analyzer.filters.iter().map(|f| f.to_string()).collect();
        sdl.push_str(&format!(" FILTERS {}", filters.join(",")));
    }
    sdl.push(';');
    sdl
}
