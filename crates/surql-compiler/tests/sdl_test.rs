//! End-to-end SDL output for manifests and code-built registries.

use std::path::Path;

use surql_compiler::diagnostic::SchemaError;
use surql_compiler::ir::{Catalog, CompositeDef, Event, Index, Member, Permissions, TableConfig, TypeDescriptor};
use surql_compiler::{Manifest, Registry};

fn render(json: &str) -> String {
    Manifest::parse(json, Path::new("surql.json"))
        .unwrap()
        .into_registry()
        .unwrap()
        .collect()
        .unwrap()
}

#[test]
fn test_person_table() {
    let sdl = render(
        r#"{
            "enums": [{ "name": "Group", "values": ["A", "B"] }],
            "models": [
                { "name": "Address", "fields": [
                    { "name": "street", "type": "str" },
                    { "name": "city", "type": "str" }
                ] },
                { "name": "Classmate", "fields": [
                    { "name": "name", "type": "str" },
                    { "name": "age", "type": "int | None" }
                ] },
                { "name": "Person", "fields": [
                    { "name": "id", "type": "str" },
                    { "name": "name", "type": "str" },
                    { "name": "tags", "type": "set[str]" },
                    { "name": "grades", "type": "list[int]" },
                    { "name": "links", "type": "list[str | Null] | None" },
                    { "name": "group", "type": "Group" },
                    { "name": "home", "type": "Address | None" },
                    { "name": "known_addresses", "type": "list[Address] | None" },
                    { "name": "classmates", "type": "list[Classmate] | None" }
                ] }
            ],
            "tables": [
                { "name": "address", "model": "Address" },
                { "name": "person", "model": "Person" }
            ]
        }"#,
    );

    let expected = [
        "DEFINE TABLE address SCHEMAFULL;",
        "DEFINE FIELD street ON TABLE address TYPE string;",
        "DEFINE FIELD city ON TABLE address TYPE string;",
        "",
        "DEFINE TABLE person SCHEMAFULL;",
        "DEFINE FIELD name ON TABLE person TYPE string;",
        "DEFINE FIELD tags ON TABLE person TYPE set<string>;",
        "DEFINE FIELD grades ON TABLE person TYPE array<number>;",
        "DEFINE FIELD links ON TABLE person TYPE option<array<string|null>>;",
        r#"DEFINE FIELD group ON TABLE person TYPE string|number ASSERT ($value in ["A","B"]);"#,
        "DEFINE FIELD home ON TABLE person TYPE option<record<address>>;",
        "DEFINE FIELD known_addresses ON TABLE person TYPE option<array<record<address>>>;",
        "DEFINE FIELD classmates ON TABLE person TYPE option<array<object>>;",
        "DEFINE FIELD classmates.*.name ON TABLE person TYPE string;",
        "DEFINE FIELD classmates.*.age ON TABLE person TYPE option<number>;",
    ]
    .join("\n");
    assert_eq!(sdl, expected);
}

#[test]
fn test_self_reference_is_record_link() {
    let sdl = render(
        r#"{
            "models": [{ "name": "Employee", "fields": [
                { "name": "name", "type": "str" },
                { "name": "manager", "type": "Employee | None" },
                { "name": "reports", "type": "list[Employee]" }
            ] }],
            "tables": [{ "name": "employee", "model": "Employee" }]
        }"#,
    );
    assert_eq!(
        sdl,
        [
            "DEFINE TABLE employee SCHEMAFULL;",
            "DEFINE FIELD name ON TABLE employee TYPE string;",
            "DEFINE FIELD manager ON TABLE employee TYPE option<record<employee>>;",
            "DEFINE FIELD reports ON TABLE employee TYPE array<record<employee>>;",
        ]
        .join("\n")
    );
}

#[test]
fn test_flexible_objects_and_tables() {
    let sdl = render(
        r#"{
            "models": [
                { "name": "Meta", "open": true, "fields": [{ "name": "source", "type": "str" }] },
                { "name": "Entry", "fields": [
                    { "name": "kind", "type": "str" },
                    { "name": "payload", "type": "dict" },
                    { "name": "meta", "type": "Meta" }
                ] },
                { "name": "Blob", "open": true, "fields": [{ "name": "size", "type": "int" }] },
                { "name": "Bag" }
            ],
            "tables": [
                { "name": "entry", "model": "Entry" },
                { "name": "blob", "model": "Blob" },
                { "name": "bag", "model": "Bag" }
            ]
        }"#,
    );
    assert_eq!(
        sdl,
        [
            "DEFINE TABLE entry SCHEMAFULL;",
            "DEFINE FIELD kind ON TABLE entry TYPE string;",
            "DEFINE FIELD payload ON TABLE entry FLEXIBLE TYPE object;",
            "DEFINE FIELD meta ON TABLE entry FLEXIBLE TYPE object;",
            "DEFINE FIELD meta.source ON TABLE entry TYPE string;",
            "",
            "DEFINE TABLE blob SCHEMALESS;",
            "DEFINE FIELD size ON TABLE blob TYPE number;",
            "",
            "DEFINE TABLE bag SCHEMALESS;",
        ]
        .join("\n")
    );
}

#[test]
fn test_view_indexes_events_and_analyzers() {
    let sdl = render(
        r#"{
            "analyzers": [{
                "name": "simple",
                "tokenizers": ["blank", "class"],
                "filters": ["lowercase", "snowball(english)"]
            }],
            "models": [
                { "name": "Post", "fields": [
                    { "name": "title", "type": "str" },
                    { "name": "slug", "type": "str" },
                    { "name": "body", "type": "str" }
                ] },
                { "name": "Recent" }
            ],
            "tables": [
                { "name": "post", "model": "Post", "config": {
                    "indexes": [
                        { "name": "post_slug", "fields": ["slug"], "kind": "unique" },
                        { "name": "post_body", "fields": ["body"],
                          "kind": { "search": { "analyzer": "simple", "bm25": true, "highlights": true } } }
                    ],
                    "events": [
                        { "name": "post_created", "when": ["$event = \"CREATE\""],
                          "then": ["CREATE log SET post = $value.id"] }
                    ]
                } },
                { "name": "recent_posts", "model": "Recent", "config": {
                    "view": { "select": ["title"], "from": ["post"], "where": ["published = true"] }
                } }
            ]
        }"#,
    );
    assert_eq!(
        sdl,
        [
            "DEFINE ANALYZER simple TOKENIZERS blank,class FILTERS lowercase,snowball(english);",
            "",
            "DEFINE TABLE post SCHEMAFULL;",
            "DEFINE FIELD title ON TABLE post TYPE string;",
            "DEFINE FIELD slug ON TABLE post TYPE string;",
            "DEFINE FIELD body ON TABLE post TYPE string;",
            "DEFINE INDEX post_slug ON TABLE post FIELDS slug UNIQUE;",
            "DEFINE INDEX post_body ON TABLE post FIELDS body SEARCH ANALYZER simple BM25 HIGHLIGHTS;",
            r#"DEFINE EVENT post_created ON TABLE post WHEN $event = "CREATE" THEN (CREATE log SET post = $value.id);"#,
            "",
            "DEFINE TABLE recent_posts AS SELECT title FROM post WHERE published = true;",
        ]
        .join("\n")
    );
}

#[test]
fn test_registry_built_in_code() {
    let mut catalog = Catalog::new();
    let account = catalog.declare("Account").unwrap();
    catalog.add_member(account, Member::new("email", TypeDescriptor::text())).unwrap();
    catalog
        .add_member(
            account,
            Member::new("balance", TypeDescriptor::float()).with_permissions(Permissions {
                select: Some(vec!["WHERE id = $auth.id".into()]),
                update: Some(vec!["NONE".into()]),
                ..Default::default()
            }),
        )
        .unwrap();

    let mut registry = Registry::new(catalog);
    let config = TableConfig::default()
        .with_index(Index::new("account_email", &["email"]).unique())
        .with_event(Event::new(
            "audit",
            &["$before != $after"],
            &["CREATE audit SET account = $value.id", "UPDATE stats SET changes += 1"],
        ));
    registry.register_table("account", account, config).unwrap();

    assert_eq!(
        registry.render_table("account").unwrap(),
        [
            "DEFINE TABLE account SCHEMAFULL;",
            "DEFINE FIELD email ON TABLE account TYPE string;",
            "DEFINE FIELD balance ON TABLE account TYPE number",
            "PERMISSIONS",
            "    FOR SELECT",
            "        WHERE id = $auth.id",
            "    FOR UPDATE",
            "        NONE;",
            "DEFINE INDEX account_email ON TABLE account FIELDS email UNIQUE;",
            "DEFINE EVENT audit ON TABLE account WHEN $before != $after THEN {",
            "CREATE audit SET account = $value.id",
            "UPDATE stats SET changes += 1",
            "};",
        ]
        .join("\n")
    );
    assert_eq!(registry.schema("account").unwrap().fields.len(), 2);
}

#[test]
fn test_referenced_table_listed_later() {
    let sdl = render(
        r#"{
            "models": [
                { "name": "Post", "fields": [{ "name": "author", "type": "User" }] },
                { "name": "User", "fields": [
                    { "name": "name", "type": "str" },
                    { "name": "friend", "type": "User | None" }
                ] }
            ],
            "tables": [
                { "name": "post", "model": "Post" },
                { "name": "user", "model": "User" }
            ]
        }"#,
    );
    assert_eq!(
        sdl,
        [
            "DEFINE TABLE post SCHEMAFULL;",
            "DEFINE FIELD author ON TABLE post TYPE record<user>;",
            "",
            "DEFINE TABLE user SCHEMAFULL;",
            "DEFINE FIELD name ON TABLE user TYPE string;",
            "DEFINE FIELD friend ON TABLE user TYPE option<record<user>>;",
        ]
        .join("\n")
    );
}

#[test]
fn test_inline_object_cannot_become_table() {
    let mut catalog = Catalog::new();
    let tag = catalog.insert(CompositeDef::new("Tag").member("label", TypeDescriptor::text())).unwrap();
    let note = catalog
        .insert(CompositeDef::new("Note").member("tags", TypeDescriptor::list(TypeDescriptor::Composite(tag))))
        .unwrap();

    let mut registry = Registry::new(catalog);
    registry.register_table("note", note, TableConfig::default()).unwrap();
    let err = registry.register_table("tag", tag, TableConfig::default()).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidConfig { ref name, .. } if name == "tag"));

    assert_eq!(
        registry.collect().unwrap(),
        [
            "DEFINE TABLE note SCHEMAFULL;",
            "DEFINE FIELD tags ON TABLE note TYPE array<object>;",
            "DEFINE FIELD tags.*.label ON TABLE note TYPE string;",
        ]
        .join("\n")
    );
}

#[test]
fn test_declared_tables_link_in_any_order() {
    let mut catalog = Catalog::new();
    let tag = catalog.insert(CompositeDef::new("Tag").member("label", TypeDescriptor::text())).unwrap();
    let note = catalog
        .insert(CompositeDef::new("Note").member("tags", TypeDescriptor::list(TypeDescriptor::Composite(tag))))
        .unwrap();

    let mut registry = Registry::new(catalog);
    registry.declare_table("tag", tag).unwrap();
    registry.register_table("note", note, TableConfig::default()).unwrap();
    registry.register_table("tag", tag, TableConfig::default()).unwrap();

    assert_eq!(
        registry.collect().unwrap(),
        [
            "DEFINE TABLE note SCHEMAFULL;",
            "DEFINE FIELD tags ON TABLE note TYPE array<record<tag>>;",
            "",
            "DEFINE TABLE tag SCHEMAFULL;",
            "DEFINE FIELD label ON TABLE tag TYPE string;",
        ]
        .join("\n")
    );
}

#[test]
fn test_empty_member_permissions_rejected() {
    let mut catalog = Catalog::new();
    let a = catalog.declare("A").unwrap();
    catalog
        .add_member(a, Member::new("x", TypeDescriptor::text()).with_permissions(Permissions::default()))
        .unwrap();

    let mut registry = Registry::new(catalog);
    assert!(registry.register_table("a", a, TableConfig::default()).is_err());
    assert_eq!(registry.collect().unwrap(), "");
}

#[test]
fn test_errors() {
    let unsupported = Manifest::parse(
        r#"{
            "models": [{ "name": "Price", "fields": [{ "name": "amount", "type": "Decimal" }] }],
            "tables": [{ "name": "price", "model": "Price" }]
        }"#,
        Path::new("surql.json"),
    )
    .unwrap()
    .into_registry()
    .unwrap_err();
    assert!(matches!(unsupported, SchemaError::UnsupportedType { ref path, .. } if path == "amount"));

    let ambiguous = Manifest::parse(
        r#"{
            "models": [
                { "name": "A", "fields": [{ "name": "x", "type": "str" }] },
                { "name": "B", "fields": [{ "name": "y", "type": "str" }] },
                { "name": "Holder", "fields": [{ "name": "value", "type": "A | B" }] }
            ],
            "tables": [{ "name": "holder", "model": "Holder" }]
        }"#,
        Path::new("surql.json"),
    )
    .unwrap()
    .into_registry()
    .unwrap_err();
    assert!(matches!(ambiguous, SchemaError::MultipleElaborableBranches { count: 2, .. }));
}
