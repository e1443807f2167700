//! Integration tests for mapping explores to cube joins and Cube views.

use std::path::{Path, PathBuf};

use lkml2cube::loader::{load_namespace, load_namespace_from_str};
use lkml2cube::mapping::{attach_cube_joins, map_explores, map_views, MapOptions, MappingError};
use lkml2cube::model::{Cube, CubeView, Namespace, Relationship};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/lkml")
}

fn orders_namespace() -> Namespace {
    let root = fixtures();
    let pattern = root.join("explores/orders.explore.lkml");
    load_namespace(pattern.to_str().unwrap(), Some(&root)).unwrap()
}

fn map(namespace: &Namespace, options: &MapOptions) -> Result<(Vec<Cube>, Vec<CubeView>), MappingError> {
    let cubes = map_views(namespace, options)?;
    map_explores(namespace, cubes, options)
}

fn map_str(source: &str) -> Result<(Vec<Cube>, Vec<CubeView>), MappingError> {
    let namespace = load_namespace_from_str(source, "model.lkml").unwrap();
    map(&namespace, &MapOptions::default())
}

// ============================================================================
// Fixture Explore
// ============================================================================

#[test]
fn test_view_entries_carry_join_paths() {
    let (_, views) = map(&orders_namespace(), &MapOptions::default()).unwrap();
    assert_eq!(views.len(), 1);

    let view = &views[0];
    assert_eq!(view.name, "order_analysis");
    assert_eq!(view.description.as_deref(), Some("Order Analysis"));

    let entries: Vec<(&str, &str)> = view
        .cubes
        .iter()
        .map(|e| (e.cube_name.as_str(), e.join_path.as_str()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("orders", "orders"),
            ("line_items", "orders.line_items"),
            ("products", "orders.line_items.products"),
            ("users", "orders.users"),
        ]
    );
    assert!(view.cubes.iter().all(|e| e.includes == "*"));
}

#[test]
fn test_joins_attached_to_owning_cube() {
    let (cubes, _) = map(&orders_namespace(), &MapOptions::default()).unwrap();
    let cube = |name: &str| cubes.iter().find(|c| c.name == name).unwrap();

    let orders = cube("orders");
    let targets: Vec<&str> = orders.joins.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(targets, vec!["line_items", "users"]);

    let line_items = &orders.joins[0];
    assert_eq!(line_items.relationship, Relationship::OneToMany);
    assert_eq!(line_items.sql, "{orders.id} = {line_items.order_id}");
    assert_eq!(line_items.join_path, "orders.line_items");

    // No relationship declared
    assert_eq!(orders.joins[1].relationship, Relationship::ManyToOne);

    let products = &cube("line_items").joins[0];
    assert_eq!(products.name, "products");
    assert_eq!(products.sql, "{line_items.product_id} = {products.id}");
    assert_eq!(products.join_path, "orders.line_items.products");

    assert!(cube("products").joins.is_empty());
}

#[test]
fn test_explore_names_option() {
    let options = MapOptions::default().with_explore_names(true);
    let (_, views) = map(&orders_namespace(), &options).unwrap();
    assert_eq!(views[0].name, "orders");
}

#[test]
fn test_attach_cube_joins_without_views() {
    let namespace = orders_namespace();
    let cubes = map_views(&namespace, &MapOptions::default()).unwrap();
    let cubes = attach_cube_joins(&namespace, cubes).unwrap();
    assert_eq!(cubes.iter().map(|c| c.joins.len()).sum::<usize>(), 3);
}

// ============================================================================
// Explore Shapes
// ============================================================================

const VIEWS: &str = r#"
view: a { sql_table_name: a ;; }
view: b { sql_table_name: b ;; }
view: c { sql_table_name: c ;; }
view: d { sql_table_name: d ;; }
"#;

#[test]
fn test_explore_without_joins() {
    let (cubes, views) = map_str(&format!("{} explore: a {{}}", VIEWS)).unwrap();
    assert!(cubes.iter().all(|c| c.joins.is_empty()));
    assert_eq!(views[0].cubes.len(), 1);
    assert_eq!(views[0].cubes[0].join_path, "a");
}

#[test]
fn test_explore_view_name_selects_base() {
    let source = format!(
        r#"{}
        explore: analysis {{
          view_name: b
          join: c {{ sql_on: ${{b.id}} = ${{c.b_id}} ;; }}
        }}"#,
        VIEWS
    );
    let (_, views) = map_str(&source).unwrap();
    let paths: Vec<&str> = views[0].cubes.iter().map(|e| e.join_path.as_str()).collect();
    assert_eq!(paths, vec!["b", "b.c"]);
}

#[test]
fn test_paths_use_joins_from_other_explores() {
    // c-d is only declared by the second explore, but the graph is global
    let source = format!(
        r#"{}
        explore: a {{
          join: b {{ sql_on: ${{a.id}} = ${{b.a_id}} ;; }}
          join: d {{ sql_on: ${{c.id}} = ${{d.c_id}} ;; }}
        }}
        explore: b {{
          join: c {{ sql_on: ${{b.id}} = ${{c.b_id}} ;; }}
        }}"#,
        VIEWS
    );
    let (_, views) = map_str(&source).unwrap();
    let a = views.iter().find(|v| v.name == "a").unwrap();
    assert_eq!(a.entry("c").unwrap().join_path, "a.b.c");
    assert_eq!(a.entry("d").unwrap().join_path, "a.b.c.d");
}

#[test]
fn test_shared_join_attached_once() {
    let source = format!(
        r#"{}
        explore: first {{ view_name: a join: b {{ sql_on: ${{a.id}} = ${{b.a_id}} ;; }} }}
        explore: second {{ view_name: a join: b {{ sql_on: ${{a.id}} = ${{b.a_id}} ;; }} }}"#,
        VIEWS
    );
    let (cubes, views) = map_str(&source).unwrap();
    assert_eq!(cubes[0].joins.len(), 1);
    assert_eq!(views.len(), 2);
}

#[test]
fn test_join_from_registers_alias_cube() {
    let source = format!(
        r#"{}
        explore: a {{
          join: buyer {{ from: b sql_on: ${{a.buyer_id}} = ${{buyer.id}} ;; }}
        }}"#,
        VIEWS
    );
    let (cubes, views) = map_str(&source).unwrap();
    let alias = cubes.iter().find(|c| c.name == "buyer").unwrap();
    assert_eq!(alias.extends.as_deref(), Some("b"));
    assert_eq!(alias.shown, Some(false));
    assert_eq!(views[0].entry("buyer").unwrap().join_path, "a.buyer");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_no_explores() {
    assert_eq!(map_str(VIEWS), Err(MappingError::NoExplores));
}

#[test]
fn test_join_without_condition() {
    let err = map_str(&format!("{} explore: a {{ join: b {{}} }}", VIEWS)).unwrap_err();
    assert!(matches!(
        err,
        MappingError::MissingAttribute { ref attribute, .. } if attribute == "sql_on"
    ));
}

#[test]
fn test_join_to_unknown_view() {
    let err = map_str(&format!(
        "{} explore: a {{ join: z {{ sql_on: ${{a.id}} = ${{z.a_id}} ;; }} }}",
        VIEWS
    ))
    .unwrap_err();
    assert_eq!(
        err,
        MappingError::UnknownJoinTarget {
            explore: "a".into(),
            target: "z".into(),
        }
    );
}

#[test]
fn test_explore_on_unknown_base() {
    let err = map_str(&format!("{} explore: nowhere {{}}", VIEWS)).unwrap_err();
    assert!(matches!(err, MappingError::UnknownJoinTarget { ref target, .. } if target == "nowhere"));
}

#[test]
fn test_unreachable_join_target() {
    // c-d is joined but never connected to a
    let err = map_str(&format!(
        "{} explore: a {{ join: d {{ sql_on: ${{c.id}} = ${{d.c_id}} ;; }} }}",
        VIEWS
    ))
    .unwrap_err();
    assert!(matches!(err, MappingError::UnreachableJoinTarget { ref from, .. } if from == "a"));
}

#[test]
fn test_attach_cube_joins_reports_unreachable_target() {
    let source = format!(
        "{} explore: a {{ join: d {{ sql_on: ${{c.id}} = ${{d.c_id}} ;; }} }}",
        VIEWS
    );
    let namespace = load_namespace_from_str(&source, "model.lkml").unwrap();
    let cubes = map_views(&namespace, &MapOptions::default()).unwrap();
    let err = attach_cube_joins(&namespace, cubes).unwrap_err();
    assert!(matches!(
        err,
        MappingError::UnreachableJoinTarget { ref from, ref to } if from == "a" && to == "d"
    ));
}

#[test]
fn test_unknown_base_with_joins() {
    let err = map_str(&format!(
        "{} explore: nowhere {{ join: b {{ sql_on: ${{a.id}} = ${{b.a_id}} ;; }} }}",
        VIEWS
    ))
    .unwrap_err();
    assert!(matches!(err, MappingError::UnknownJoinTarget { ref target, .. } if target == "nowhere"));
}

#[test]
fn test_condition_with_one_entity() {
    let err = map_str(&format!(
        "{} explore: a {{ join: b {{ sql_on: ${{b.active}} ;; }} }}",
        VIEWS
    ))
    .unwrap_err();
    assert!(matches!(err, MappingError::InvalidJoinCondition { .. }));
}

#[test]
fn test_unknown_relationship() {
    let err = map_str(&format!(
        "{} explore: a {{ join: b {{ relationship: sideways sql_on: ${{a.id}} = ${{b.a_id}} ;; }} }}",
        VIEWS
    ))
    .unwrap_err();
    assert!(matches!(
        err,
        MappingError::UnsupportedType { ref kind, ref type_name, .. }
            if kind == "relationship" && type_name == "sideways"
    ));
}
