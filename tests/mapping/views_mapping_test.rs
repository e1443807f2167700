//! Integration tests for mapping LookML views to cubes.

use std::path::{Path, PathBuf};

use lkml2cube::loader::{load_namespace, load_namespace_from_str};
use lkml2cube::mapping::{map_views, MapOptions, MappingError};
use lkml2cube::model::{Cube, CubeDimensionType, CubeMeasureType, Namespace};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/lkml")
}

fn load_fixture(name: &str) -> Namespace {
    let path = fixtures().join("views").join(name);
    load_namespace(path.to_str().unwrap(), None).unwrap()
}

fn map_one(source: &str) -> Result<Cube, MappingError> {
    let namespace = load_namespace_from_str(source, "inline.view.lkml").unwrap();
    map_views(&namespace, &MapOptions::default()).map(|mut cubes| cubes.remove(0))
}

// ============================================================================
// Fixture Views
// ============================================================================

#[test]
fn test_orders_view_maps_to_cube() {
    let namespace = load_fixture("orders.view.lkml");
    let cubes = map_views(&namespace, &MapOptions::default()).unwrap();
    assert_eq!(cubes.len(), 1);

    let orders = &cubes[0];
    assert_eq!(orders.name, "orders");
    assert_eq!(orders.title.as_deref(), Some("Orders"));
    assert_eq!(orders.description.as_deref(), Some("One row per order"));
    assert_eq!(orders.sql_table.as_deref(), Some("public.orders"));
    assert!(orders.sql.is_none());

    let names: Vec<&str> = orders.dimensions.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["id", "status", "user_id", "is_gift", "amount_tier", "created_at"]
    );
    assert_eq!(orders.primary_key().map(|d| d.name.as_str()), Some("id"));
}

#[test]
fn test_dimension_translation() {
    let cube = &map_views(&load_fixture("orders.view.lkml"), &MapOptions::default()).unwrap()[0];
    let dim = |name: &str| cube.dimensions.iter().find(|d| d.name == name).unwrap();

    assert_eq!(dim("id").sql, "{CUBE}.id");
    assert_eq!(dim("id").dimension_type, CubeDimensionType::Number);
    assert_eq!(dim("id").primary_key, Some(true));
    assert_eq!(dim("status").dimension_type, CubeDimensionType::String);
    assert_eq!(dim("status").public, None);
    assert_eq!(dim("user_id").public, Some(false));
    assert_eq!(dim("is_gift").dimension_type, CubeDimensionType::Boolean);
    assert_eq!(dim("created_at").dimension_type, CubeDimensionType::Time);
    assert_eq!(dim("created_at").sql, "{CUBE}.created_at");

    let tier = dim("amount_tier");
    assert_eq!(tier.dimension_type, CubeDimensionType::Number);
    assert!(tier.sql.starts_with("CASE WHEN {CUBE}.amount >= 0 AND {CUBE}.amount < 100 THEN 0"));
    assert_eq!(tier.meta.as_ref().unwrap().tiers, vec![0.0, 100.0, 500.0]);
}

#[test]
fn test_measure_translation() {
    let cube = &map_views(&load_fixture("orders.view.lkml"), &MapOptions::default()).unwrap()[0];
    let measure = |name: &str| cube.measures.iter().find(|m| m.name == name).unwrap();

    let count = measure("count");
    assert_eq!(count.measure_type, CubeMeasureType::Count);
    assert!(count.sql.is_none());
    assert_eq!(count.drill_members, vec!["id", "status", "created_at"]);

    let total = measure("total_amount");
    assert_eq!(total.measure_type, CubeMeasureType::Sum);
    assert_eq!(total.sql.as_deref(), Some("{CUBE}.amount"));
    assert_eq!(total.title.as_deref(), Some("Total Amount"));

    let unique = measure("unique_users");
    assert_eq!(unique.measure_type, CubeMeasureType::CountDistinctApprox);
    assert_eq!(unique.sql.as_deref(), Some("{user_id}"));
}

#[test]
fn test_derived_table_becomes_sql() {
    let cube = &map_views(&load_fixture("products.view.lkml"), &MapOptions::default()).unwrap()[0];
    assert!(cube.sql_table.is_none());
    let sql = cube.sql.as_deref().unwrap();
    assert!(sql.starts_with("SELECT id, name, category"));
    assert!(sql.ends_with("WHERE NOT discontinued"));
}

#[test]
fn test_cubes_keep_declaration_order() {
    let pattern = fixtures().join("explores/orders.explore.lkml");
    let namespace = load_namespace(pattern.to_str().unwrap(), Some(&fixtures())).unwrap();
    let cubes = map_views(&namespace, &MapOptions::default()).unwrap();
    let names: Vec<&str> = cubes.iter().map(|c| c.name.as_str()).collect();
    let expected: Vec<&str> = namespace.views.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, expected);
}

// ============================================================================
// Errors and Edge Cases
// ============================================================================

#[test]
fn test_no_views() {
    let namespace = load_namespace_from_str("explore: orders {}", "model.lkml").unwrap();
    assert_eq!(
        map_views(&namespace, &MapOptions::default()),
        Err(MappingError::NoViews)
    );
    assert_eq!(
        map_views(&namespace, &MapOptions::default().with_require_views(false)),
        Ok(vec![])
    );
}

#[test]
fn test_missing_table_reference() {
    let err = map_one("view: orders { dimension: id { type: number sql: ${TABLE}.id ;; } }")
        .unwrap_err();
    assert_eq!(
        err,
        MappingError::MissingAttribute {
            context: "view 'orders'".into(),
            attribute: "sql_table_name".into(),
        }
    );
}

#[test]
fn test_unsupported_dimension_type() {
    let err = map_one(
        "view: t { sql_table_name: t ;; dimension: loc { type: location sql: ${TABLE}.loc ;; } }",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        MappingError::UnsupportedType { ref kind, ref type_name, .. }
            if kind == "dimension" && type_name == "location"
    ));
}

#[test]
fn test_unsupported_dimension_group_type() {
    let err = map_one(
        "view: t { sql_table_name: t ;; dimension_group: span { type: duration sql: x ;; } }",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        MappingError::UnsupportedType { ref kind, .. } if kind == "dimension_group"
    ));
}

#[test]
fn test_non_count_measure_requires_sql() {
    let err = map_one("view: t { sql_table_name: t ;; measure: total { type: sum } }").unwrap_err();
    assert!(matches!(
        err,
        MappingError::MissingAttribute { ref attribute, ref context }
            if attribute == "sql" && context == "view 't' measure 'total'"
    ));
}

#[test]
fn test_dimension_requires_type() {
    let err = map_one("view: t { sql_table_name: t ;; dimension: a { sql: a ;; } }").unwrap_err();
    assert_eq!(
        err,
        MappingError::MissingAttribute {
            context: "view 't' dimension 'a'".into(),
            attribute: "type".into(),
        }
    );
    assert!(err.to_string().contains("view 't' dimension 'a'"));
}

#[test]
fn test_duplicate_primary_key() {
    let err = map_one(
        r#"view: t {
          sql_table_name: t ;;
          dimension: a { primary_key: yes type: number sql: a ;; }
          dimension: b { primary_key: yes type: number sql: b ;; }
        }"#,
    )
    .unwrap_err();
    assert_eq!(
        err,
        MappingError::DuplicatePrimaryKey {
            view: "t".into(),
            first: "a".into(),
            second: "b".into(),
        }
    );
}

#[test]
fn test_duplicate_view_keeps_first() {
    let namespace = load_namespace_from_str(
        "view: t { sql_table_name: first ;; } view: t { sql_table_name: second ;; }",
        "dupes.lkml",
    )
    .unwrap();
    let cubes = map_views(&namespace, &MapOptions::default()).unwrap();
    assert_eq!(cubes.len(), 1);
    assert_eq!(cubes[0].sql_table.as_deref(), Some("first"));
}

#[test]
fn test_extends_carries_parent() {
    let namespace = load_namespace_from_str(
        r#"view: base { sql_table_name: base ;; }
        view: child { extends: [base] label: "Child" }"#,
        "extends.lkml",
    )
    .unwrap();
    let cubes = map_views(&namespace, &MapOptions::default()).unwrap();
    assert_eq!(cubes[1].extends.as_deref(), Some("base"));
    assert!(cubes[1].sql_table.is_none());
}

#[test]
fn test_empty_view_maps_to_empty_cube() {
    let cube = map_one("view: t { sql_table_name: t ;; }").unwrap();
    assert!(cube.dimensions.is_empty());
    assert!(cube.measures.is_empty());
}
