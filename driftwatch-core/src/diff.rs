// Cross-environment graph diff.
//
// Compares a local snapshot against a runtime snapshot and emits a
// severity-classified violation list. Pure and deterministic: output
// ordering is stable by (kind, primary id), problems are data rather than
// errors, and the engine never mutates its inputs.

use std::collections::BTreeSet;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use semver::{Version, VersionReq};
use tracing::{debug, info, warn};

use driftwatch_graph::{ComponentGraph, ComponentId, GraphNode, GraphSource};

use crate::delta::{GraphDelta, Violation};

/// Diff a local graph against a runtime graph.
///
/// The local graph is the source of truth for what should exist: edge-level
/// checks (missing dependencies, semver ranges, cycles) run over the local
/// edge relation, while node-level checks iterate the union of ids.
pub fn diff(local: &ComponentGraph, runtime: &ComponentGraph) -> GraphDelta {
    if local.meta().source != GraphSource::Local {
        warn!(source = %local.meta().source, "local graph carries unexpected source tag");
    }
    if runtime.meta().source != GraphSource::Runtime {
        warn!(source = %runtime.meta().source, "runtime graph carries unexpected source tag");
    }

    let mut violations = Vec::new();

    compare_nodes(local, runtime, &mut violations);
    compare_edges(local, runtime, &mut violations);
    detect_cycles(local, &mut violations);

    let delta = GraphDelta::from_violations(
        violations,
        local.meta().environment.clone(),
        runtime.meta().environment.clone(),
    );
    info!(
        violations = delta.stats.total_violations,
        errors = delta.stats.error_count,
        warnings = delta.stats.warning_count,
        "Graph diff complete"
    );
    delta
}

// ── Node phase ─────────────────────────────────────────────────────

fn compare_nodes(local: &ComponentGraph, runtime: &ComponentGraph, out: &mut Vec<Violation>) {
    // BTreeSet so the union is iterated in a stable order even before the
    // final sort.
    let ids: BTreeSet<&ComponentId> = local.ids().chain(runtime.ids()).collect();

    for id in ids {
        match (local.node(id), runtime.node(id)) {
            (Some(_), None) => out.push(Violation::NodeAdded { id: id.clone() }),
            (None, Some(_)) => out.push(Violation::NodeRemoved { id: id.clone() }),
            (Some(l), Some(r)) => compare_node_pair(l, r, out),
            (None, None) => unreachable!("id came from one of the graphs"),
        }
    }
}

fn compare_node_pair(local: &GraphNode, runtime: &GraphNode, out: &mut Vec<Violation>) {
    // API drift is the breaking-change signal and is checked even when the
    // versions match. Absent hashes mean "not computed", not "changed".
    let mut api_drifted = false;
    if let (Some(lh), Some(rh)) = (&local.api_hash, &runtime.api_hash) {
        if lh != rh {
            api_drifted = true;
            out.push(Violation::ApiDrift {
                id: local.id.clone(),
                local_hash: lh.clone(),
                runtime_hash: rh.clone(),
            });
        }
    }

    if !api_drifted {
        if let (Some(lh), Some(rh)) = (&local.config_hash, &runtime.config_hash) {
            if lh != rh {
                out.push(Violation::ConfigDrift {
                    id: local.id.clone(),
                    local_hash: lh.clone(),
                    runtime_hash: rh.clone(),
                });
            }
        }
    }

    // Version drift comes from the refs themselves — relevant for builders
    // that key nodes without embedding the version in the id.
    if local.component.version != runtime.component.version {
        out.push(Violation::VersionDrift {
            id: local.id.clone(),
            local_version: local.component.version.clone(),
            runtime_version: runtime.component.version.clone(),
        });
    }

    let mut changed_fields = Vec::new();
    if local.kind != runtime.kind {
        changed_fields.push("kind".to_string());
    }
    if local.label != runtime.label {
        changed_fields.push("label".to_string());
    }
    if local.tags != runtime.tags {
        changed_fields.push("tags".to_string());
    }
    if local.api_hash.is_some() != runtime.api_hash.is_some() {
        changed_fields.push("api_hash".to_string());
    }
    if local.config_hash.is_some() != runtime.config_hash.is_some() {
        changed_fields.push("config_hash".to_string());
    }
    if !changed_fields.is_empty() {
        out.push(Violation::NodeChanged {
            id: local.id.clone(),
            changed_fields,
        });
    }
}

// ── Edge phase ─────────────────────────────────────────────────────

fn compare_edges(local: &ComponentGraph, runtime: &ComponentGraph, out: &mut Vec<Violation>) {
    for edge in local.edges() {
        // Resolution is checked against the combined view: a target deployed
        // but not yet authored locally still resolves.
        let target = local.node(&edge.to).or_else(|| runtime.node(&edge.to));

        let Some(target) = target else {
            out.push(Violation::MissingDependency {
                dependent: edge.from.clone(),
                unresolved: edge.to.clone(),
            });
            continue;
        };

        if let Some(range) = &edge.version_range {
            check_version_range(edge.from.clone(), target, range, out);
        }
    }
}

fn check_version_range(
    dependent: ComponentId,
    target: &GraphNode,
    range: &str,
    out: &mut Vec<Violation>,
) {
    let Ok(req) = VersionReq::parse(range) else {
        debug!(range, edge_from = %dependent, "skipping unparseable version range");
        return;
    };
    let Ok(version) = Version::parse(&target.component.version) else {
        debug!(
            version = %target.component.version,
            id = %target.id,
            "skipping semver check against unparseable version"
        );
        return;
    };

    if !req.matches(&version) {
        out.push(Violation::SemverViolation {
            dependent,
            dependency: target.id.clone(),
            required_range: range.to_string(),
            actual_version: target.component.version.clone(),
        });
    }
}

// ── Cycle detection ────────────────────────────────────────────────

fn detect_cycles(local: &ComponentGraph, out: &mut Vec<Violation>) {
    // Ids participating in the edge relation, whether or not they resolve.
    // Sorted so node indices (and therefore SCC output) are deterministic.
    let ids: BTreeSet<&ComponentId> = local
        .ids()
        .chain(local.edges().flat_map(|e| [&e.from, &e.to]))
        .collect();

    let mut graph: DiGraph<&ComponentId, ()> = DiGraph::new();
    let mut indices: std::collections::HashMap<&ComponentId, NodeIndex> =
        std::collections::HashMap::new();
    for &id in &ids {
        indices.insert(id, graph.add_node(id));
    }
    for edge in local.edges() {
        graph.add_edge(indices[&edge.from], indices[&edge.to], ());
    }

    // Every simple cycle lives inside exactly one strongly connected
    // component, so enumeration is scoped per SCC. One violation per
    // distinct member set: two traversal orders over the same ids collapse.
    let mut seen: BTreeSet<BTreeSet<&ComponentId>> = BTreeSet::new();
    for component in tarjan_scc(&graph) {
        let members: BTreeSet<&ComponentId> = component.iter().map(|&ix| graph[ix]).collect();

        let trivial = members.len() == 1
            && !component
                .first()
                .is_some_and(|&ix| graph.contains_edge(ix, ix));
        if trivial {
            continue;
        }

        for &root in &members {
            let mut stack = vec![root];
            cycle_dfs(local, &members, root, root, &mut stack, &mut seen, out);
        }
    }
}

/// Depth-first enumeration of simple cycles through `root`. Only descends
/// into ids greater than the root, so every cycle is discovered exactly once,
/// rooted at its smallest member — which also makes the rendering
/// deterministic. `cycle_path` follows actual edges end to end.
fn cycle_dfs<'a>(
    local: &'a ComponentGraph,
    members: &BTreeSet<&'a ComponentId>,
    root: &'a ComponentId,
    current: &'a ComponentId,
    stack: &mut Vec<&'a ComponentId>,
    seen: &mut BTreeSet<BTreeSet<&'a ComponentId>>,
    out: &mut Vec<Violation>,
) {
    // Distinct successors in id order; parallel edges add nothing here.
    let successors: BTreeSet<&ComponentId> = local
        .outgoing(current)
        .iter()
        .map(|e| &e.to)
        .filter(|to| members.contains(*to))
        .collect();

    for next in successors {
        if next == root {
            if seen.insert(stack.iter().copied().collect()) {
                let cycle: Vec<ComponentId> = stack.iter().map(|&id| id.clone()).collect();
                let cycle_path = render_cycle_path(&cycle);
                out.push(Violation::CircularDependency { cycle, cycle_path });
            }
        } else if next > root && !stack.contains(&next) {
            stack.push(next);
            cycle_dfs(local, members, root, next, stack, seen, out);
            stack.pop();
        }
    }
}

fn render_cycle_path(cycle: &[ComponentId]) -> String {
    let mut parts: Vec<&str> = cycle.iter().map(ComponentId::as_str).collect();
    if let Some(first) = parts.first().copied() {
        parts.push(first);
    }
    parts.join(" → ")
}

// ── Tests ──────────────────────────────────────────────────────────
