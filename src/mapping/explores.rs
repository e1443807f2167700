//! LookML explores to cube joins and composite Cube views.
//!
//! Mapping runs in three passes over the namespace:
//!
//! 1. Joins declared with `from:` register an alias cube extending the
//!    source cube, so later lookups resolve.
//! 2. Every join condition of every explore adds an edge to one global
//!    [`JoinGraph`]. All names must resolve to cubes.
//! 3. Joins are attached to the cube on the non-target side of each
//!    condition, and each explore becomes a [`CubeView`] whose entries carry
//!    BFS paths from the explore's base cube.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::join_graph::JoinGraph;
use super::naming::snake_case;
use super::{to_cube_sql, MapOptions, MappingError, MappingResult};
use crate::model::{Cube, CubeJoin, CubeView, CubeViewEntry, Explore, Join, Namespace, Relationship};

/// `${view.field}` references inside a join condition.
static FIELD_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\s*(\w+)\.(\w+)\s*\}").unwrap());

/// Distinct view names referenced by a condition, in order of appearance.
pub fn condition_entities(condition: &str) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();
    for caps in FIELD_REFERENCE.captures_iter(condition) {
        let name = &caps[1];
        if !entities.iter().any(|e| e == name) {
            entities.push(name.to_string());
        }
    }
    entities
}

/// A join resolved to its two ends.
struct JoinEdge<'a> {
    join: &'a Join,
    /// The side the join is attached to.
    owner: String,
    /// The joined view.
    target: String,
}

fn join_context(explore: &Explore, join: &Join) -> String {
    format!("explore '{}' join '{}'", explore.name, join.name)
}

/// Resolve a join condition to `(owner, target)`.
fn resolve_join<'a>(explore: &Explore, join: &'a Join) -> MappingResult<JoinEdge<'a>> {
    let condition = join
        .sql_on
        .as_deref()
        .ok_or_else(|| MappingError::MissingAttribute {
            context: join_context(explore, join),
            attribute: "sql_on".to_string(),
        })?;

    let invalid = || MappingError::InvalidJoinCondition {
        explore: explore.name.clone(),
        join: join.name.clone(),
        condition: condition.to_string(),
    };

    let entities = condition_entities(condition);
    if entities.len() != 2 {
        return Err(invalid());
    }
    let owner = entities
        .iter()
        .find(|e| **e != join.name)
        .cloned()
        .ok_or_else(invalid)?;
    if !entities.contains(&join.name) {
        return Err(invalid());
    }

    Ok(JoinEdge {
        join,
        owner,
        target: join.name.clone(),
    })
}

/// Explores in declaration order, keeping the first of each name.
fn unique_explores(namespace: &Namespace) -> Vec<&Explore> {
    let mut seen = HashSet::new();
    namespace
        .explores
        .iter()
        .filter(|explore| {
            let first = seen.insert(explore.name.as_str());
            if !first {
                warn!(explore = %explore.name, "duplicate explore name; keeping the first declaration");
            }
            first
        })
        .collect()
}

/// Register alias cubes for joins declared with `from:`.
fn add_alias_cubes(explores: &[&Explore], cubes: &mut Vec<Cube>) -> MappingResult<()> {
    for explore in explores {
        for join in &explore.joins {
            let Some(source) = join.from.as_deref() else {
                continue;
            };
            if cubes.iter().any(|c| c.name == join.name) {
                continue;
            }
            if !cubes.iter().any(|c| c.name == source) {
                return Err(MappingError::UnknownJoinTarget {
                    explore: explore.name.clone(),
                    target: source.to_string(),
                });
            }
            debug!(alias = %join.name, source, "registering alias cube");
            cubes.push(Cube {
                extends: Some(source.to_string()),
                shown: Some(false),
                ..Cube::new(&join.name)
            });
        }
    }
    Ok(())
}

/// Build the global join graph. Every cube is a node, every join an edge.
fn build_join_graph<'a>(
    explores: &[&'a Explore],
    cubes: &[Cube],
) -> MappingResult<(JoinGraph, Vec<(&'a Explore, Vec<JoinEdge<'a>>)>)> {
    let known: HashSet<&str> = cubes.iter().map(|c| c.name.as_str()).collect();

    let mut graph = JoinGraph::new();
    for cube in cubes {
        graph.add_node(&cube.name);
    }

    let mut resolved = Vec::with_capacity(explores.len());
    for &explore in explores {
        let base = explore.base_view();
        if !known.contains(base) {
            return Err(MappingError::UnknownJoinTarget {
                explore: explore.name.clone(),
                target: base.to_string(),
            });
        }
        let mut edges = Vec::with_capacity(explore.joins.len());
        for join in &explore.joins {
            let edge = resolve_join(explore, join)?;
            for name in [&edge.owner, &edge.target] {
                if !known.contains(name.as_str()) {
                    return Err(MappingError::UnknownJoinTarget {
                        explore: explore.name.clone(),
                        target: name.clone(),
                    });
                }
            }
            graph.add_edge(&edge.owner, &edge.target);
            edges.push(edge);
        }
        resolved.push((explore, edges));
    }

    debug!(
        cubes = graph.node_count(),
        edges = graph.edge_count(),
        "join graph built"
    );
    Ok((graph, resolved))
}

fn parse_relationship(explore: &Explore, join: &Join) -> MappingResult<Relationship> {
    match join.relationship.as_deref() {
        None => Ok(Relationship::default()),
        Some(name) => Relationship::from_str(name).ok_or_else(|| MappingError::UnsupportedType {
            kind: "relationship".to_string(),
            type_name: name.to_string(),
            context: join_context(explore, join),
        }),
    }
}

/// Attach each direct join to its owning cube, once per (owner, target).
/// A target with no path from the explore's base is an error.
fn attach_joins(
    graph: &JoinGraph,
    resolved: &[(&Explore, Vec<JoinEdge<'_>>)],
    cubes: &mut [Cube],
) -> MappingResult<()> {
    for (explore, edges) in resolved {
        let base = explore.base_view();
        for edge in edges {
            let relationship = parse_relationship(explore, edge.join)?;
            let Some(owner) = cubes.iter_mut().find(|c| c.name == edge.owner) else {
                continue;
            };
            if owner.has_join(&edge.target) {
                continue;
            }
            let join_path = graph.find_path(base, &edge.target)?.to_string();
            owner.joins.push(CubeJoin {
                name: edge.target.clone(),
                relationship,
                sql: to_cube_sql(edge.join.sql_on.as_deref().unwrap_or_default()),
                join_path,
            });
        }
    }
    Ok(())
}

/// Add the joins declared by explores to the cubes, without building views.
///
/// A namespace without explores returns the cubes unchanged.
pub fn attach_cube_joins(namespace: &Namespace, cubes: Vec<Cube>) -> MappingResult<Vec<Cube>> {
    let explores = unique_explores(namespace);
    let mut cubes = cubes;
    add_alias_cubes(&explores, &mut cubes)?;
    let (graph, resolved) = build_join_graph(&explores, &cubes)?;
    attach_joins(&graph, &resolved, &mut cubes)?;
    Ok(cubes)
}

/// Map explores to cube joins and composite views.
///
/// # Errors
///
/// [`MappingError::NoExplores`] when the namespace declares none; join
/// resolution errors as described on [`MappingError`].
pub fn map_explores(
    namespace: &Namespace,
    cubes: Vec<Cube>,
    options: &MapOptions,
) -> MappingResult<(Vec<Cube>, Vec<CubeView>)> {
    if namespace.explores.is_empty() {
        return Err(MappingError::NoExplores);
    }

    let explores = unique_explores(namespace);
    let mut cubes = cubes;
    add_alias_cubes(&explores, &mut cubes)?;
    let (graph, resolved) = build_join_graph(&explores, &cubes)?;
    attach_joins(&graph, &resolved, &mut cubes)?;

    let views = resolved
        .iter()
        .map(|(explore, edges)| build_cube_view(explore, edges, &graph, options))
        .collect::<MappingResult<Vec<_>>>()?;

    Ok((cubes, views))
}

fn view_name(explore: &Explore, options: &MapOptions) -> String {
    if options.use_explore_names {
        return explore.name.clone();
    }
    explore
        .label
        .as_deref()
        .map(snake_case)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| explore.name.clone())
}

fn build_cube_view(
    explore: &Explore,
    edges: &[JoinEdge<'_>],
    graph: &JoinGraph,
    options: &MapOptions,
) -> MappingResult<CubeView> {
    let base = explore.base_view();
    let name = view_name(explore, options);
    debug!(explore = %explore.name, view = %name, "building cube view");

    let mut cubes = vec![CubeViewEntry::all_members(base, base)];
    let mut seen: HashSet<&str> = HashSet::from([base]);
    for edge in edges {
        for target in [edge.owner.as_str(), edge.target.as_str()] {
            if !seen.insert(target) {
                continue;
            }
            let path = graph.find_path(base, target)?;
            cubes.push(CubeViewEntry::all_members(target, path.to_string()));
        }
    }

    Ok(CubeView {
        name,
        description: explore.label.clone().or_else(|| explore.description.clone()),
        cubes,
    })
}
