//! Cube meta API documents back to LookML.
//!
//! Each cube of the document is classified by its members: a member with an
//! `aliasMember` pointing at another cube marks a composite model (a Cube
//! view), which becomes an explore; anything else is a base model and
//! becomes a view.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use super::naming::{is_display_name, snake_case};
use super::{to_lookml_sql, MappingError, MappingResult};
use crate::model::{
    CubeDimensionType, CubeMeasureType, DerivedTable, Dimension, Explore, Join, Measure,
    MeasureType, Namespace, Relationship, View,
};

/// `{cube}.column` references in a Cube join condition.
static CUBE_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}\.(\w+)").unwrap());

#[derive(Debug, Deserialize)]
struct MetaDocument {
    #[serde(default)]
    cubes: Vec<MetaCube>,
}

#[derive(Debug, Deserialize)]
struct MetaCube {
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "sqlTable")]
    sql_table: Option<String>,
    #[serde(default)]
    sql: Option<String>,
    #[serde(default)]
    extends: Option<String>,
    #[serde(default)]
    dimensions: Vec<MetaMember>,
    #[serde(default)]
    measures: Vec<MetaMember>,
    #[serde(default)]
    joins: Vec<MetaJoin>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaMember {
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type")]
    member_type: String,
    #[serde(default)]
    agg_type: Option<String>,
    #[serde(default)]
    sql: Option<String>,
    #[serde(default)]
    public: Option<bool>,
    #[serde(default)]
    alias_member: Option<String>,
    #[serde(default)]
    primary_key: Option<bool>,
}

impl MetaMember {
    /// Member name without its `cube.` prefix.
    fn short_name(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(_, name)| name)
            .unwrap_or(&self.name)
    }

    /// `(cube, member)` this member aliases, when it points outside `cube`.
    fn foreign_alias(&self, cube: &str) -> Option<(&str, &str)> {
        let (target, member) = self.alias_member.as_deref()?.split_once('.')?;
        (target != cube).then_some((target, member))
    }
}

#[derive(Debug, Deserialize)]
struct MetaJoin {
    name: String,
    #[serde(default)]
    relationship: Option<String>,
    #[serde(default)]
    sql: Option<String>,
}

/// Translate a Cube meta API document into a LookML namespace.
///
/// # Errors
///
/// [`MappingError::NoResponse`] for a null or empty document,
/// [`MappingError::InvalidMeta`] when it does not decode, and
/// [`MappingError::UnsupportedType`] for member types with no LookML
/// counterpart.
pub fn map_cube_model(document: &serde_json::Value) -> MappingResult<Namespace> {
    match document {
        serde_json::Value::Null => return Err(MappingError::NoResponse),
        serde_json::Value::Object(map) if map.is_empty() => return Err(MappingError::NoResponse),
        _ => {}
    }
    let meta = MetaDocument::deserialize(document)
        .map_err(|e| MappingError::InvalidMeta(e.to_string()))?;

    let mut namespace = Namespace::default();
    for cube in &meta.cubes {
        let references = composite_references(cube);
        if references.is_empty() {
            if cube.dimensions.is_empty() && cube.measures.is_empty() {
                warn!(cube = %cube.name, "cube has no members; treating it as a base model");
            }
            namespace.views.push(map_base_cube(cube)?);
        } else {
            namespace.explores.push(map_composite_cube(cube, &references, &meta));
        }
    }

    debug!(
        views = namespace.views.len(),
        explores = namespace.explores.len(),
        "cube model mapped"
    );
    Ok(namespace)
}

/// Cubes referenced through `aliasMember`, in first-reference order, each
/// with the first member referenced.
fn composite_references(cube: &MetaCube) -> Vec<(&str, &str)> {
    let mut references: Vec<(&str, &str)> = Vec::new();
    for member in cube.dimensions.iter().chain(&cube.measures) {
        if let Some((target, field)) = member.foreign_alias(&cube.name) {
            if !references.iter().any(|(c, _)| *c == target) {
                references.push((target, field));
            }
        }
    }
    references
}

fn member_context(cube: &MetaCube, member: &MetaMember) -> String {
    format!("cube '{}' member '{}'", cube.name, member.name)
}

fn map_base_cube(cube: &MetaCube) -> MappingResult<View> {
    let name = snake_case(&cube.name);
    debug!(cube = %cube.name, view = %name, "mapping base cube");

    let mut view = View {
        label: cube.title.clone(),
        description: cube.description.clone(),
        sql_table_name: cube.sql_table.clone(),
        derived_table: cube.sql.as_ref().map(|sql| DerivedTable {
            sql: Some(to_lookml_sql(sql)),
        }),
        extends: cube.extends.iter().map(|e| snake_case(e)).collect(),
        ..View::new(name)
    };

    for member in &cube.dimensions {
        view.dimensions.push(map_dimension(cube, member)?);
    }
    for member in &cube.measures {
        view.measures.push(map_measure(cube, member)?);
    }
    view.drill_fields = drill_fields(&view);
    Ok(view)
}

fn map_dimension(cube: &MetaCube, member: &MetaMember) -> MappingResult<Dimension> {
    let dimension_type = CubeDimensionType::from_str(&member.member_type).ok_or_else(|| {
        MappingError::UnsupportedType {
            kind: "dimension".to_string(),
            type_name: member.member_type.clone(),
            context: member_context(cube, member),
        }
    })?;

    Ok(Dimension {
        name: snake_case(member.short_name()),
        field_type: Some(dimension_type.to_lookml().as_str().to_string()),
        sql: member.sql.as_deref().map(to_lookml_sql),
        label: member.title.clone(),
        description: member.description.clone(),
        hidden: !member.public.unwrap_or(false),
        primary_key: member.primary_key.unwrap_or(false),
        tiers: Vec::new(),
    })
}

fn map_measure(cube: &MetaCube, member: &MetaMember) -> MappingResult<Measure> {
    let type_name = member.agg_type.as_deref().unwrap_or(&member.member_type);
    let measure_type =
        CubeMeasureType::from_str(type_name).ok_or_else(|| MappingError::UnsupportedType {
            kind: "measure".to_string(),
            type_name: type_name.to_string(),
            context: member_context(cube, member),
        })?;
    let lookml_type = measure_type.to_lookml();

    // LookML counts take no sql
    let sql = match lookml_type {
        MeasureType::Count => None,
        _ => member.sql.as_deref().map(to_lookml_sql),
    };

    Ok(Measure {
        name: snake_case(member.short_name()),
        field_type: Some(lookml_type.as_str().to_string()),
        sql,
        label: member.title.clone(),
        description: member.description.clone(),
        hidden: !member.public.unwrap_or(false),
        drill_fields: Vec::new(),
    })
}

/// The primary key, then every dimension that reads as a display name.
fn drill_fields(view: &View) -> Vec<String> {
    let primary_key = view
        .dimensions
        .iter()
        .find(|d| d.primary_key)
        .or_else(|| view.dimensions.iter().find(|d| d.name == "id"));

    let mut fields: Vec<String> = primary_key.map(|d| d.name.clone()).into_iter().collect();
    for dimension in &view.dimensions {
        if is_display_name(&dimension.name, &view.name) && !fields.contains(&dimension.name) {
            fields.push(dimension.name.clone());
        }
    }
    fields
}

/// Rewrite a Cube join condition declared on `cube` as an explore `sql_on`.
///
/// `{CUBE}` names the declaring cube, which has no `${TABLE}` meaning inside
/// an explore, so it is replaced by the cube's view name first.
fn join_condition(sql: &str, cube: &str) -> String {
    let view = snake_case(cube);
    let sql = sql
        .replace("{CUBE}", &format!("{{{}}}", view))
        .replace("{CUBE.", &format!("{{{}.", view));
    let sql = CUBE_COLUMN.replace_all(&sql, "{${1}.${2}}");
    to_lookml_sql(&sql)
}

/// Relationship and condition hinted by the meta `joins` of either cube.
fn join_hint(
    meta: &MetaDocument,
    base: &str,
    target: &str,
) -> Option<(Option<Relationship>, Option<String>)> {
    let find = |from: &str, to: &str| {
        meta.cubes
            .iter()
            .find(|c| c.name == from)
            .and_then(|c| c.joins.iter().find(|j| j.name == to))
    };
    let parse = |join: &MetaJoin| {
        join.relationship.as_deref().and_then(|r| {
            let parsed = Relationship::from_str(r);
            if parsed.is_none() {
                warn!(join = %join.name, relationship = r, "unknown relationship hint; using many_to_one");
            }
            parsed
        })
    };

    if let Some(join) = find(base, target) {
        return Some((parse(join), join.sql.as_deref().map(|sql| join_condition(sql, base))));
    }
    find(target, base).map(|join| {
        (
            parse(join).map(Relationship::inverse),
            join.sql.as_deref().map(|sql| join_condition(sql, target)),
        )
    })
}

fn map_composite_cube(
    cube: &MetaCube,
    references: &[(&str, &str)],
    meta: &MetaDocument,
) -> Explore {
    let name = snake_case(&cube.name);
    let (base, base_member) = references[0];
    let base_view = snake_case(base);
    debug!(cube = %cube.name, explore = %name, base = %base_view, "mapping composite cube");

    let joins = references[1..]
        .iter()
        .map(|(target, target_member)| {
            let target_view = snake_case(target);
            let (relationship, sql) = join_hint(meta, base, target).unwrap_or((None, None));
            let sql_on = sql.unwrap_or_else(|| {
                format!(
                    "${{{}.{}}} = ${{{}.{}}}",
                    base_view,
                    snake_case(base_member),
                    target_view,
                    snake_case(target_member)
                )
            });
            Join {
                name: target_view,
                relationship: Some(relationship.unwrap_or_default().as_str().to_string()),
                sql_on: Some(sql_on),
                join_type: Some("left_outer".to_string()),
                from: None,
                view_label: None,
            }
        })
        .collect();

    Explore {
        name,
        label: cube.title.clone(),
        description: cube.description.clone(),
        view_name: Some(base_view),
        from: None,
        hidden: false,
        joins,
    }
}
