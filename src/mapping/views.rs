//! LookML views to Cube cubes.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::{to_cube_sql, MapOptions, MappingError, MappingResult};
use crate::model::{
    Cube, CubeDimension, CubeDimensionType, CubeMeasure, Dimension, DimensionGroup, DimensionMeta,
    DimensionType, Measure, MeasureType, Namespace, View,
};

/// Map every view of the namespace to a cube, in declaration order.
///
/// A view name declared twice keeps its first declaration.
///
/// # Errors
///
/// [`MappingError::NoViews`] when the namespace has no views and
/// `options.require_views` is set, or the first error of any view.
pub fn map_views(namespace: &Namespace, options: &MapOptions) -> MappingResult<Vec<Cube>> {
    if namespace.views.is_empty() {
        return if options.require_views {
            Err(MappingError::NoViews)
        } else {
            Ok(Vec::new())
        };
    }

    let mut seen = HashSet::new();
    let mut cubes = Vec::with_capacity(namespace.views.len());
    for view in &namespace.views {
        if !seen.insert(view.name.as_str()) {
            warn!(view = %view.name, "duplicate view name; keeping the first declaration");
            continue;
        }
        cubes.push(map_view(view)?);
    }
    Ok(cubes)
}

/// Map a single view to a cube.
pub fn map_view(view: &View) -> MappingResult<Cube> {
    debug!(view = %view.name, "mapping view");
    let context = format!("view '{}'", view.name);

    let mut cube = Cube {
        title: view.label.clone(),
        description: view.description.clone(),
        ..Cube::new(&view.name)
    };

    if let Some(parent) = view.extends.first() {
        if view.extends.len() > 1 {
            warn!(view = %view.name, "cube supports a single parent; using '{}'", parent);
        }
        cube.extends = Some(parent.clone());
    }

    let derived_sql = view.derived_table.as_ref().and_then(|d| d.sql.as_deref());
    match (view.sql_table_name.as_deref(), derived_sql) {
        (Some(table), _) => cube.sql_table = Some(to_cube_sql(table)),
        (None, Some(sql)) => cube.sql = Some(to_cube_sql(sql)),
        // Extending views inherit their table
        (None, None) if cube.extends.is_some() => {}
        (None, None) => {
            return Err(MappingError::MissingAttribute {
                context,
                attribute: "sql_table_name".to_string(),
            })
        }
    }

    let mut primary_key: Option<&str> = None;
    let mut names = HashSet::new();
    for dimension in &view.dimensions {
        if !names.insert(dimension.name.as_str()) {
            warn!(view = %view.name, dimension = %dimension.name, "duplicate dimension; keeping the first");
            continue;
        }
        if dimension.primary_key {
            if let Some(first) = primary_key {
                return Err(MappingError::DuplicatePrimaryKey {
                    view: view.name.clone(),
                    first: first.to_string(),
                    second: dimension.name.clone(),
                });
            }
            primary_key = Some(dimension.name.as_str());
        }
        cube.dimensions.push(map_dimension(view, dimension)?);
    }

    for group in &view.dimension_groups {
        if !names.insert(group.name.as_str()) {
            warn!(view = %view.name, dimension_group = %group.name, "duplicate dimension; keeping the first");
            continue;
        }
        cube.dimensions.push(map_dimension_group(view, group)?);
    }

    let mut names = HashSet::new();
    for measure in &view.measures {
        if !names.insert(measure.name.as_str()) {
            warn!(view = %view.name, measure = %measure.name, "duplicate measure; keeping the first");
            continue;
        }
        cube.measures.push(map_measure(view, measure)?);
    }

    Ok(cube)
}

fn field_context(view: &View, kind: &str, name: &str) -> String {
    format!("view '{}' {} '{}'", view.name, kind, name)
}

fn missing(context: &str, attribute: &str) -> MappingError {
    MappingError::MissingAttribute {
        context: context.to_string(),
        attribute: attribute.to_string(),
    }
}

fn unsupported(kind: &str, type_name: &str, context: &str) -> MappingError {
    MappingError::UnsupportedType {
        kind: kind.to_string(),
        type_name: type_name.to_string(),
        context: context.to_string(),
    }
}

fn map_dimension(view: &View, dimension: &Dimension) -> MappingResult<CubeDimension> {
    let context = field_context(view, "dimension", &dimension.name);

    let type_name = dimension
        .field_type
        .as_deref()
        .ok_or_else(|| missing(&context, "type"))?;
    let dimension_type = DimensionType::from_str(type_name)
        .ok_or_else(|| unsupported("dimension", type_name, &context))?;
    let sql = dimension
        .sql
        .as_deref()
        .ok_or_else(|| missing(&context, "sql"))?;

    let mut sql = to_cube_sql(sql);
    let mut meta = None;
    if dimension_type == DimensionType::Tier {
        let tiers = parse_tiers(&context, &dimension.tiers)?;
        sql = tier_sql(&sql, &dimension.tiers);
        meta = Some(DimensionMeta { tiers });
    }

    Ok(CubeDimension {
        name: dimension.name.clone(),
        sql,
        dimension_type: dimension_type.to_cube(),
        primary_key: dimension.primary_key.then_some(true),
        title: dimension.label.clone(),
        description: dimension.description.clone(),
        public: dimension.hidden.then_some(false),
        meta,
    })
}

fn parse_tiers(context: &str, tiers: &[String]) -> MappingResult<Vec<f64>> {
    if tiers.is_empty() {
        return Err(missing(context, "tiers"));
    }
    tiers
        .iter()
        .map(|t| {
            t.trim()
                .parse::<f64>()
                .map_err(|_| MappingError::InvalidAttribute {
                    context: context.to_string(),
                    attribute: "tiers".to_string(),
                    message: format!("'{}' is not a number", t),
                })
        })
        .collect()
}

/// Bucket expression for a tier dimension: each row maps to the lower
/// boundary of its tier, rows below the first boundary to NULL.
fn tier_sql(sql: &str, tiers: &[String]) -> String {
    let mut case = String::from("CASE");
    for pair in tiers.windows(2) {
        case.push_str(&format!(
            " WHEN {sql} >= {lo} AND {sql} < {hi} THEN {lo}",
            sql = sql,
            lo = pair[0].trim(),
            hi = pair[1].trim()
        ));
    }
    if let Some(last) = tiers.last() {
        case.push_str(&format!(" WHEN {} >= {} THEN {}", sql, last.trim(), last.trim()));
    }
    case.push_str(" ELSE NULL END");
    case
}

/// A dimension group collapses to one time dimension named after the group.
fn map_dimension_group(view: &View, group: &DimensionGroup) -> MappingResult<CubeDimension> {
    let context = field_context(view, "dimension_group", &group.name);

    let type_name = group
        .field_type
        .as_deref()
        .ok_or_else(|| missing(&context, "type"))?;
    match DimensionType::from_str(type_name) {
        Some(DimensionType::Time | DimensionType::Date) => {}
        _ => return Err(unsupported("dimension_group", type_name, &context)),
    }
    let sql = group.sql.as_deref().ok_or_else(|| missing(&context, "sql"))?;

    Ok(CubeDimension {
        name: group.name.clone(),
        sql: to_cube_sql(sql),
        dimension_type: CubeDimensionType::Time,
        primary_key: None,
        title: group.label.clone(),
        description: group.description.clone(),
        public: group.hidden.then_some(false),
        meta: None,
    })
}

fn map_measure(view: &View, measure: &Measure) -> MappingResult<CubeMeasure> {
    let context = field_context(view, "measure", &measure.name);

    let type_name = measure
        .field_type
        .as_deref()
        .ok_or_else(|| missing(&context, "type"))?;
    let measure_type = MeasureType::from_str(type_name)
        .ok_or_else(|| unsupported("measure", type_name, &context))?;

    let (sql, drill_members) = if measure_type == MeasureType::Count {
        (None, drill_members(view, measure))
    } else {
        let sql = measure
            .sql
            .as_deref()
            .ok_or_else(|| missing(&context, "sql"))?;
        (Some(to_cube_sql(sql)), Vec::new())
    };

    Ok(CubeMeasure {
        name: measure.name.clone(),
        measure_type: measure_type.to_cube(),
        sql,
        title: measure.label.clone(),
        description: measure.description.clone(),
        public: measure.hidden.then_some(false),
        drill_members,
    })
}

/// Expand `drill_fields`, resolving `set_name*` against the view's sets.
/// Measures without their own list use the view's.
fn drill_members(view: &View, measure: &Measure) -> Vec<String> {
    let fields = if measure.drill_fields.is_empty() {
        &view.drill_fields
    } else {
        &measure.drill_fields
    };

    let mut members = Vec::new();
    for field in fields {
        match field.strip_suffix('*') {
            Some(set_name) => match view.set(set_name) {
                Some(set) => members.extend(set.fields.iter().cloned()),
                None => warn!(
                    view = %view.name,
                    measure = %measure.name,
                    set = set_name,
                    "drill field references an undefined set"
                ),
            },
            None => members.push(field.clone()),
        }
    }
    members
}
