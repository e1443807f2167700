//! End-to-end tests for the conversion pipeline: LookML files to Cube YAML,
//! and Cube meta documents to LookML.

use std::fs;
use std::path::{Path, PathBuf};

use lkml2cube::convert::{self, ConvertError, ConvertOptions};
use lkml2cube::loader::LoadError;
use lkml2cube::mapping::MappingError;
use serde_yaml::Value as Yaml;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn pattern(relative: &str) -> String {
    fixtures().join("lkml").join(relative).to_string_lossy().into_owned()
}

fn options() -> ConvertOptions {
    ConvertOptions::default().with_root_dir(fixtures().join("lkml"))
}

// ============================================================================
// cubes
// ============================================================================

#[test]
fn test_cubes_yaml_for_single_view() {
    let model = convert::cubes(&pattern("views/users.view.lkml"), &options()).unwrap();

    insta::assert_snapshot!(model.to_yaml().unwrap(), @r"
    cubes:
    - name: users
      sql_table: public.users
      dimensions:
      - name: id
        sql: '{CUBE}.id'
        type: number
        primary_key: true
      - name: name
        sql: '{CUBE}.name'
        type: string
      measures:
      - name: count
        type: count
    ");
}

#[test]
fn test_cubes_with_explore_joins() {
    let model = convert::cubes(&pattern("explores/orders.explore.lkml"), &options()).unwrap();
    assert_eq!(model.cubes.len(), 4);
    assert!(model.views.is_empty());

    let yaml: Yaml = serde_yaml::from_str(&model.to_yaml().unwrap()).unwrap();
    assert!(yaml.get("views").is_none());

    let orders = yaml["cubes"]
        .as_sequence()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "orders")
        .unwrap();
    assert_eq!(orders["joins"][0]["name"], "line_items");
    assert_eq!(orders["joins"][0]["relationship"], "one_to_many");
    assert_eq!(orders["joins"][0]["sql"], "{orders.id} = {line_items.order_id}");
    // join paths are not part of the Cube schema
    assert!(orders["joins"][0].get("join_path").is_none());
}

#[test]
fn test_cubes_require_views() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("model.lkml");
    fs::write(&path, "explore: orders {}").unwrap();

    let err = convert::cubes(path.to_str().unwrap(), &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::Mapping(MappingError::NoViews)));
}

#[test]
fn test_cubes_missing_input() {
    let err = convert::cubes(&pattern("nothing/*.lkml"), &options()).unwrap_err();
    assert!(matches!(err, ConvertError::Load(LoadError::Resolution { .. })));
}

// ============================================================================
// views
// ============================================================================

#[test]
fn test_views_yaml() {
    let model = convert::views(&pattern("explores/orders.explore.lkml"), &options()).unwrap();
    let yaml: Yaml = serde_yaml::from_str(&model.to_yaml().unwrap()).unwrap();

    let view = &yaml["views"][0];
    assert_eq!(view["name"], "order_analysis");
    assert_eq!(view["description"], "Order Analysis");
    assert_eq!(view["cubes"][2]["join_path"], "orders.line_items.products");
    assert_eq!(view["cubes"][2]["includes"], "*");
    assert_eq!(view["cubes"][2]["alias"], "products");
}

#[test]
fn test_views_with_explore_names() {
    let options = options().with_explore_names(true);
    let model = convert::views(&pattern("explores/orders.explore.lkml"), &options).unwrap();
    assert!(model.view("orders").is_some());
}

#[test]
fn test_views_with_constants() {
    let model = convert::views(&pattern("constants_test.lkml"), &options()).unwrap();
    assert_eq!(
        model.cube("customers").unwrap().title.as_deref(),
        Some("Okayama Users Data")
    );
    let view = model.view("okayama_users").unwrap();
    assert_eq!(view.cubes.len(), 1);
}

// ============================================================================
// explores
// ============================================================================

#[test]
fn test_explores_from_meta_document() {
    let text = fs::read_to_string(fixtures().join("meta/meta.json")).unwrap();
    let meta: serde_json::Value = serde_json::from_str(&text).unwrap();
    let namespace = convert::explores(&meta).unwrap();

    assert_eq!(namespace.views.len(), 2);
    assert_eq!(namespace.explores.len(), 1);
}

#[test]
fn test_lookml_to_cube_and_back() {
    // Forward, then feed an equivalent meta document back
    let model = convert::cubes(&pattern("views/users.view.lkml"), &options()).unwrap();
    let cube = model.cube("users").unwrap();
    let meta = serde_json::json!({
        "cubes": [{
            "name": cube.name,
            "sql_table": cube.sql_table,
            "dimensions": cube.dimensions.iter().map(|d| serde_json::json!({
                "name": format!("users.{}", d.name),
                "type": d.dimension_type.as_str(),
                "sql": d.sql,
                "public": true,
                "primaryKey": d.primary_key.unwrap_or(false),
            })).collect::<Vec<_>>(),
        }]
    });

    let namespace = convert::explores(&meta).unwrap();
    let users = namespace.view("users").unwrap();
    assert_eq!(users.sql_table_name.as_deref(), Some("public.users"));
    let id = users.dimensions.iter().find(|d| d.name == "id").unwrap();
    assert_eq!(id.sql.as_deref(), Some("${TABLE}.id"));
    assert!(id.primary_key);
    assert_eq!(users.drill_fields, vec!["id", "name"]);
}
