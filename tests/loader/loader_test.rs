//! Integration tests for loading LookML projects from disk.
//!
//! Covers glob entry points, include resolution, cycle protection and
//! constant substitution across files.

use std::fs;
use std::path::{Path, PathBuf};

use lkml2cube::loader::{load_namespace, LoadError};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/lkml")
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// Entry Patterns
// ============================================================================

#[test]
fn test_glob_loads_every_matching_file() {
    let pattern = fixtures().join("views/*.view.lkml");
    let namespace = load_namespace(pattern.to_str().unwrap(), None).unwrap();

    let mut names: Vec<&str> = namespace.views.iter().map(|v| v.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["line_items", "orders", "products", "users"]);
    assert!(namespace.explores.is_empty());
}

#[test]
fn test_pattern_without_matches_is_resolution_error() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("*.view.lkml");
    let err = load_namespace(pattern.to_str().unwrap(), None).unwrap_err();
    assert!(matches!(err, LoadError::Resolution { .. }));
}

#[test]
fn test_invalid_glob_is_reported() {
    let err = load_namespace("views/[.lkml", None).unwrap_err();
    assert!(matches!(err, LoadError::InvalidPattern { .. }));
}

#[test]
fn test_parse_error_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "broken.view.lkml", "view: broken {\n  dimension: id {\n");
    let err = load_namespace(path.to_str().unwrap(), None).unwrap_err();
    match err {
        LoadError::Parse { file, .. } => assert!(file.ends_with("broken.view.lkml")),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_filtered_measure_loads() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "orders.view.lkml",
        r#"view: orders {
          sql_table_name: public.orders ;;
          measure: completed {
            type: count
            filters: [status: "complete"]
          }
          measure: total {
            type: sum
            sql: ${TABLE}.amount ;;
          }
        }"#,
    );
    let namespace = load_namespace(path.to_str().unwrap(), None).unwrap();
    let orders = namespace.view("orders").unwrap();
    let names: Vec<&str> = orders.measures.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["completed", "total"]);
    assert_eq!(orders.measures[0].field_type.as_deref(), Some("count"));
}

// ============================================================================
// Includes
// ============================================================================

#[test]
fn test_explore_includes_views_from_root_dir() {
    let root = fixtures();
    let pattern = root.join("explores/orders.explore.lkml");
    let namespace = load_namespace(pattern.to_str().unwrap(), Some(&root)).unwrap();

    assert_eq!(namespace.explores.len(), 1);
    assert_eq!(namespace.views.len(), 4);
    assert!(namespace.view("orders").is_some());
    assert!(namespace.view("products").is_some());
}

#[test]
fn test_includes_resolve_relative_to_file_without_root_dir() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "views/a.view.lkml", "view: a { sql_table_name: a ;; }");
    let model = write(
        dir.path(),
        "model.model.lkml",
        r#"include: "views/a.view"
        explore: a {}"#,
    );

    let namespace = load_namespace(model.to_str().unwrap(), None).unwrap();
    assert_eq!(namespace.views.len(), 1);
    assert_eq!(namespace.views[0].name, "a");
}

#[test]
fn test_included_entities_come_first() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.lkml", "view: base { sql_table_name: base ;; }");
    let main = write(
        dir.path(),
        "main.lkml",
        r#"include: "base.lkml"
        view: main { sql_table_name: main ;; }"#,
    );

    let namespace = load_namespace(main.to_str().unwrap(), None).unwrap();
    let names: Vec<&str> = namespace.views.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["base", "main"]);
}

#[test]
fn test_mutual_includes_load_each_file_once() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "a.lkml",
        r#"include: "b.lkml"
        view: a { sql_table_name: a ;; }"#,
    );
    write(
        dir.path(),
        "b.lkml",
        r#"include: "a.lkml"
        view: b { sql_table_name: b ;; }"#,
    );

    let pattern = dir.path().join("*.lkml");
    let namespace = load_namespace(pattern.to_str().unwrap(), None).unwrap();
    let mut names: Vec<&str> = namespace.views.iter().map(|v| v.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_self_include_terminates() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "self.lkml",
        r#"include: "self.lkml"
        view: me { sql_table_name: me ;; }"#,
    );
    let namespace = load_namespace(path.to_str().unwrap(), None).unwrap();
    assert_eq!(namespace.views.len(), 1);
}

#[test]
fn test_missing_include_is_skipped() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "model.lkml",
        r#"include: "/views/not_copied.view.lkml"
        view: kept { sql_table_name: kept ;; }"#,
    );
    let namespace = load_namespace(path.to_str().unwrap(), Some(dir.path())).unwrap();
    assert_eq!(namespace.views.len(), 1);
    assert_eq!(namespace.views[0].name, "kept");
}

#[test]
fn test_separate_loads_share_no_state() {
    let pattern = fixtures().join("views/users.view.lkml");
    let pattern = pattern.to_str().unwrap();
    let first = load_namespace(pattern, None).unwrap();
    let second = load_namespace(pattern, None).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.views.len(), 1);
}

// ============================================================================
// Constants
// ============================================================================

#[test]
fn test_constants_substituted_in_loaded_model() {
    let path = fixtures().join("constants_test.lkml");
    let namespace = load_namespace(path.to_str().unwrap(), None).unwrap();

    let view = namespace.view("customers").unwrap();
    assert_eq!(view.label.as_deref(), Some("Okayama Users Data"));
    let name = view.dimensions.iter().find(|d| d.name == "name").unwrap();
    assert_eq!(name.label.as_deref(), Some("User Name in Okayama"));
    assert_eq!(view.measures[0].label.as_deref(), Some("Count of Okayama Users"));

    let explore = namespace.explore("customers").unwrap();
    assert_eq!(explore.label.as_deref(), Some("Okayama Users"));
    // region itself refers to other constants
    assert_eq!(explore.description.as_deref(), Some("Users from Okayama, Japan"));
}

#[test]
fn test_constant_declared_in_another_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "constants.lkml", r#"constant: schema { value: "analytics" }"#);
    let view = write(
        dir.path(),
        "orders.view.lkml",
        r#"include: "constants.lkml"
        view: orders {
          sql_table_name: @{schema}.orders ;;
          label: "Orders from @{unknown}"
        }"#,
    );

    let namespace = load_namespace(view.to_str().unwrap(), None).unwrap();
    let orders = namespace.view("orders").unwrap();
    assert_eq!(orders.sql_table_name.as_deref(), Some("analytics.orders"));
    assert_eq!(orders.label.as_deref(), Some("Orders from @{unknown}"));
}

#[test]
fn test_later_constant_declaration_wins() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "model.lkml",
        r#"constant: env { value: "dev" }
        constant: env { value: "prod" }
        view: v { sql_table_name: @{env}.v ;; }"#,
    );
    let namespace = load_namespace(path.to_str().unwrap(), None).unwrap();
    assert_eq!(namespace.views[0].sql_table_name.as_deref(), Some("prod.v"));
}

#[test]
fn test_circular_constants_keep_their_tokens() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "model.lkml",
        r#"constant: a { value: "x @{a}" }
        constant: b { value: "@{c}" }
        constant: c { value: "@{b}" }
        view: v { label: "@{a} @{b}" sql_table_name: t ;; }"#,
    );
    let namespace = load_namespace(path.to_str().unwrap(), None).unwrap();
    assert_eq!(namespace.views[0].label.as_deref(), Some("@{a} @{b}"));
}
