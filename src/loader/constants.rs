//! `@{name}` constant resolution over a merged document.

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use tracing::{debug, warn};

use crate::lookml::node::{constant_references, substitute_str};
use crate::lookml::Node;

/// Build the constant lookup from every `constants` entry of a merged tree.
///
/// Later declarations of a name override earlier ones. Values referencing
/// other constants are resolved against each other. Constants that take part
/// in a reference cycle are left out of the lookup, so their `@{name}` tokens
/// stay in place and substitution remains idempotent.
pub fn collect_constants(tree: &Node) -> HashMap<String, String> {
    let mut raw: BTreeMap<String, String> = BTreeMap::new();
    for constant in tree.get("constants").and_then(Node::as_sequence).unwrap_or_default() {
        let name = constant.get("name").and_then(Node::as_str);
        let value = constant.get("value").and_then(Node::as_str);
        if let (Some(name), Some(value)) = (name, value) {
            if raw.insert(name.to_string(), value.to_string()).is_some() {
                debug!(constant = name, "constant redeclared; later value wins");
            }
        }
    }

    let cyclic = cyclic_constants(&raw);
    let mut resolved = HashMap::with_capacity(raw.len());
    for name in raw.keys() {
        if !cyclic.contains(name.as_str()) {
            resolve(name, &raw, &cyclic, &mut resolved);
        }
    }
    resolved
}

/// Names of constants on a reference cycle, self-references included.
fn cyclic_constants(raw: &BTreeMap<String, String>) -> HashSet<String> {
    let mut graph = DiGraph::<&str, ()>::new();
    let nodes: HashMap<&str, _> = raw
        .keys()
        .map(|name| (name.as_str(), graph.add_node(name.as_str())))
        .collect();
    for (name, value) in raw {
        for reference in constant_references(value) {
            if let Some(&target) = nodes.get(reference.as_str()) {
                graph.update_edge(nodes[name.as_str()], target, ());
            }
        }
    }

    let mut cyclic = HashSet::new();
    for component in tarjan_scc(&graph) {
        let on_cycle = component.len() > 1 || graph.contains_edge(component[0], component[0]);
        if on_cycle {
            for index in component {
                let name = graph[index];
                warn!(constant = name, "circular constant reference left unresolved");
                cyclic.insert(name.to_string());
            }
        }
    }
    cyclic
}

/// Resolve one acyclic constant. References to cyclic constants keep their token.
fn resolve(
    name: &str,
    raw: &BTreeMap<String, String>,
    cyclic: &HashSet<String>,
    resolved: &mut HashMap<String, String>,
) -> Option<String> {
    if let Some(value) = resolved.get(name) {
        return Some(value.clone());
    }
    let value = raw.get(name)?;

    let mut lookup = HashMap::new();
    for reference in constant_references(value) {
        if cyclic.contains(&reference) {
            continue;
        }
        if let Some(inner) = resolve(&reference, raw, cyclic, resolved) {
            lookup.insert(reference, inner);
        }
    }

    let value = substitute_str(value, &lookup);
    resolved.insert(name.to_string(), value.clone());
    Some(value)
}

/// Substitute every declared constant into every scalar of the tree.
pub fn substitute_constants(tree: &Node) -> Node {
    let constants = collect_constants(tree);
    if constants.is_empty() {
        return tree.clone();
    }
    debug!(count = constants.len(), "substituting constants");
    tree.substitute(&constants)
}
