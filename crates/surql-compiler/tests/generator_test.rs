use std::fs;

use surql_compiler::{Generator, GeneratorConfig, SchemaError};
use tempfile::TempDir;

const MANIFEST: &str = r#"{
    "models": [
        { "name": "User", "fields": [
            { "name": "name", "type": "str" },
            { "name": "email", "type": "str | None" }
        ] },
        { "name": "Post", "fields": [
            { "name": "title", "type": "str" },
            { "name": "author", "type": "User" }
        ] }
    ],
    "tables": [
        { "name": "user", "model": "User" },
        { "name": "post", "model": "Post" }
    ]
}"#;

const EXPECTED: &str = "DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE option<string>;

DEFINE TABLE post SCHEMAFULL;
DEFINE FIELD title ON TABLE post TYPE string;
DEFINE FIELD author ON TABLE post TYPE record<user>;";

fn generator(dir: &TempDir, manifest: &str, out: Option<&str>) -> Generator {
    let manifest_path = dir.path().join("surql.json");
    fs::write(&manifest_path, manifest).unwrap();
    Generator::new(GeneratorConfig {
        manifest_path,
        out_path: out.map(|o| dir.path().join(o)),
    })
}

#[test]
fn test_generate_writes_file() {
    let dir = TempDir::new().unwrap();
    let generator = generator(&dir, MANIFEST, Some("db/schema.surql"));

    let result = generator.generate().unwrap();
    assert_eq!(result.tables, 2);
    assert_eq!(result.analyzers, 0);
    assert_eq!(result.fields, 4);
    assert_eq!(result.sdl, EXPECTED);

    let written = fs::read_to_string(dir.path().join("db/schema.surql")).unwrap();
    assert_eq!(written, format!("{}\n", EXPECTED));
}

#[test]
fn test_check_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let generator = generator(&dir, MANIFEST, Some("schema.surql"));

    let result = generator.check().unwrap();
    assert_eq!(result.sdl, EXPECTED);
    assert!(!dir.path().join("schema.surql").exists());
    assert_eq!(generator.render().unwrap(), EXPECTED);
}

#[test]
fn test_generate_without_output() {
    let dir = TempDir::new().unwrap();
    let result = generator(&dir, MANIFEST, None).generate().unwrap();
    assert_eq!(result.sdl, EXPECTED);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_missing_manifest() {
    let dir = TempDir::new().unwrap();
    let generator = Generator::new(GeneratorConfig {
        manifest_path: dir.path().join("missing.json"),
        out_path: None,
    });
    assert!(matches!(generator.check(), Err(SchemaError::IoError { .. })));
}

#[test]
fn test_failed_generation_keeps_previous_output() {
    let dir = TempDir::new().unwrap();
    generator(&dir, MANIFEST, Some("schema.surql")).generate().unwrap();

    let broken = MANIFEST.replace("\"str | None\"", "\"list[str\"");
    let err = generator(&dir, &broken, Some("schema.surql")).generate().unwrap_err();
    assert!(matches!(err, SchemaError::TypeSyntax { .. }));

    let written = fs::read_to_string(dir.path().join("schema.surql")).unwrap();
    assert_eq!(written, format!("{}\n", EXPECTED));
}
