// Impact analysis — reverse-reachability over the dependency graph.
//
// Given seed components, walk the incoming-edge relation breadth-first to
// find every component that (transitively) depends on a seed. Cycle-safe by
// construction: a visited node is never re-enqueued.

use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use driftwatch_graph::{ComponentGraph, ComponentId};

use crate::error::ImpactError;

/// Default traversal bound. Unbounded traversal over a pathological graph is
/// never what a caller wants; a caller with a time budget should lower this
/// rather than racing the computation.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// Options for one impact analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactOptions {
    /// Depth at which branches stop expanding.
    pub max_depth: u32,
    /// Reconstruct a shortest dependency path for each affected component.
    pub include_paths: bool,
}

impl Default for ImpactOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            include_paths: false,
        }
    }
}

/// One reconstructed dependency path, seed first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactPath {
    pub nodes: Vec<ComponentId>,
    /// Precomputed `seed → … → node` rendering using display labels.
    pub display: String,
}

/// Traversal statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactStats {
    pub total_affected: usize,
    /// Greatest depth actually reached.
    pub max_depth: u32,
    /// Affected count per component kind (unresolved ids are not counted).
    pub by_kind: HashMap<String, usize>,
}

/// The impact engine's output, created fresh per analysis invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactCone {
    pub affected: BTreeSet<ComponentId>,
    pub stats: ImpactStats,
    pub paths: Option<Vec<ImpactPath>>,
}

/// Compute the set of components affected by a change to `seeds`.
///
/// Traverses the reverse dependency relation breadth-first: the dependents
/// of `id` are the `from` endpoints of `graph.incoming(id)`. Seeds start the
/// frontier at depth 0 and are excluded from the affected set unless a cycle
/// re-reaches them from a non-seed node.
///
/// An empty seed list is a caller-contract violation and fails fast with
/// [`ImpactError::EmptySeeds`].
pub fn impact_cone(
    graph: &ComponentGraph,
    seeds: &[ComponentId],
    options: &ImpactOptions,
) -> Result<ImpactCone, ImpactError> {
    if seeds.is_empty() {
        return Err(ImpactError::EmptySeeds);
    }

    let seed_set: BTreeSet<&ComponentId> = seeds.iter().collect();
    for &seed in &seed_set {
        if !graph.contains(seed) && graph.incoming(seed).is_empty() {
            warn!(seed = %seed, "impact seed is unknown to the graph");
        }
    }

    let mut visited: BTreeSet<ComponentId> = seeds.iter().cloned().collect();
    let mut affected: BTreeSet<ComponentId> = BTreeSet::new();
    // Back-pointer toward the seed that discovered each node. Seeds never
    // get an entry here; a seed re-reached through a cycle records the node
    // that closed the loop separately.
    let mut discovered_from: HashMap<ComponentId, ComponentId> = HashMap::new();
    let mut cycled_seed_via: HashMap<ComponentId, ComponentId> = HashMap::new();
    let mut max_depth_reached = 0;

    let mut frontier: VecDeque<(ComponentId, u32)> =
        seeds.iter().cloned().map(|id| (id, 0)).collect();

    while let Some((current, depth)) = frontier.pop_front() {
        if depth >= options.max_depth {
            continue;
        }

        for edge in graph.incoming(&current) {
            let dependent = &edge.from;

            if visited.contains(dependent) {
                // A cycle back into a seed still marks the seed as affected,
                // but nothing is ever re-enqueued.
                if seed_set.contains(dependent) && !seed_set.contains(&current) {
                    affected.insert(dependent.clone());
                    cycled_seed_via
                        .entry(dependent.clone())
                        .or_insert_with(|| current.clone());
                }
                continue;
            }

            visited.insert(dependent.clone());
            affected.insert(dependent.clone());
            discovered_from.insert(dependent.clone(), current.clone());
            max_depth_reached = max_depth_reached.max(depth + 1);
            frontier.push_back((dependent.clone(), depth + 1));
        }
    }

    let mut by_kind: HashMap<String, usize> = HashMap::new();
    for id in &affected {
        if let Some(node) = graph.node(id) {
            *by_kind.entry(node.kind.as_str().to_string()).or_insert(0) += 1;
        }
    }

    let paths = options
        .include_paths
        .then(|| reconstruct_paths(graph, &affected, &discovered_from, &cycled_seed_via));

    info!(
        seeds = seeds.len(),
        affected = affected.len(),
        max_depth = max_depth_reached,
        "Impact cone computed"
    );

    Ok(ImpactCone {
        stats: ImpactStats {
            total_affected: affected.len(),
            max_depth: max_depth_reached,
            by_kind,
        },
        affected,
        paths,
    })
}

/// Walk back-pointers from each affected node to its discovering seed and
/// render `seed → … → node`. Shortest path by hop count (BFS discovery
/// order), one path per affected node — not an enumeration of all paths.
/// A seed affected through a cycle walks back from the node that closed the
/// loop, so its path starts and ends at the seed.
fn reconstruct_paths(
    graph: &ComponentGraph,
    affected: &BTreeSet<ComponentId>,
    discovered_from: &HashMap<ComponentId, ComponentId>,
    cycled_seed_via: &HashMap<ComponentId, ComponentId>,
) -> Vec<ImpactPath> {
    let display = |id: &ComponentId| -> String {
        graph
            .node(id)
            .map_or_else(|| id.as_str().to_string(), |n| n.display().to_string())
    };

    let mut paths = Vec::with_capacity(affected.len());
    for id in affected {
        let mut nodes = vec![id.clone()];
        let mut cursor = id;
        if !discovered_from.contains_key(id) {
            if let Some(via) = cycled_seed_via.get(id) {
                nodes.push(via.clone());
                cursor = via;
            }
        }
        while let Some(parent) = discovered_from.get(cursor) {
            nodes.push(parent.clone());
            cursor = parent;
        }
        // Recorded child→parent; render seed-first.
        nodes.reverse();

        let rendered: Vec<String> = nodes.iter().map(|n| display(n)).collect();
        paths.push(ImpactPath {
            nodes,
            display: rendered.join(" → "),
        });
    }
    paths
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use driftwatch_graph::{
        ComponentKind, ComponentRef, DependencyKind, GraphEdge, GraphNode, GraphSource,
    };

    fn cref(key: &str) -> ComponentRef {
        ComponentRef::new("core", "sys-flows", key, "1.0.0")
    }

    fn cid(key: &str) -> ComponentId {
        ComponentId::from_ref(&cref(key))
    }

    fn add(graph: &mut ComponentGraph, key: &str, kind: ComponentKind) {
        graph.add_node(GraphNode::new(cref(key), kind, GraphSource::Local));
    }

    fn depends(graph: &mut ComponentGraph, from: &str, to: &str) {
        graph.add_edge(GraphEdge::new(cid(from), cid(to), DependencyKind::Invokes));
    }

    /// A ← B ← C ← D chain: B depends on A, C on B, D on C.
    fn chain() -> ComponentGraph {
        let mut g = ComponentGraph::for_source(GraphSource::Local);
        add(&mut g, "a", ComponentKind::Schema);
        add(&mut g, "b", ComponentKind::Transform);
        add(&mut g, "c", ComponentKind::Flow);
        add(&mut g, "d", ComponentKind::Flow);
        depends(&mut g, "b", "a");
        depends(&mut g, "c", "b");
        depends(&mut g, "d", "c");
        g
    }

    #[test]
    fn empty_seed_list_fails_fast() {
        let g = chain();
        let err = impact_cone(&g, &[], &ImpactOptions::default()).unwrap_err();
        assert_eq!(err, ImpactError::EmptySeeds);
    }

    #[test]
    fn depth_bound_scenario() {
        let g = chain();
        let cone = impact_cone(
            &g,
            &[cid("a")],
            &ImpactOptions {
                max_depth: 2,
                include_paths: false,
            },
        )
        .unwrap();

        let expected: BTreeSet<ComponentId> = [cid("b"), cid("c")].into_iter().collect();
        assert_eq!(cone.affected, expected);
        assert_eq!(cone.stats.max_depth, 2);
        assert_eq!(cone.stats.total_affected, 2);
    }

    #[test]
    fn full_cone_and_kind_counts() {
        let g = chain();
        let cone = impact_cone(&g, &[cid("a")], &ImpactOptions::default()).unwrap();

        assert_eq!(cone.stats.total_affected, 3);
        assert_eq!(cone.stats.max_depth, 3);
        assert_eq!(cone.stats.by_kind.get("Flow"), Some(&2));
        assert_eq!(cone.stats.by_kind.get("Transform"), Some(&1));
    }

    #[test]
    fn seeds_excluded_without_cycle() {
        let g = chain();
        let cone = impact_cone(&g, &[cid("a")], &ImpactOptions::default()).unwrap();
        assert!(!cone.affected.contains(&cid("a")));
    }

    #[test]
    fn cycle_through_seed_terminates_and_marks_seed() {
        // a ← b ← c ← a : c depends on a closes the loop.
        let mut g = ComponentGraph::for_source(GraphSource::Local);
        for key in ["a", "b", "c"] {
            add(&mut g, key, ComponentKind::Flow);
        }
        depends(&mut g, "b", "a");
        depends(&mut g, "c", "b");
        depends(&mut g, "a", "c");

        let cone = impact_cone(&g, &[cid("a")], &ImpactOptions::default()).unwrap();
        let expected: BTreeSet<ComponentId> =
            [cid("a"), cid("b"), cid("c")].into_iter().collect();
        assert_eq!(cone.affected, expected, "seed re-reached through the cycle");
    }

    #[test]
    fn cycled_seed_path_closes_the_loop() {
        // a ← b ← c ← a: the seed is re-reached through the cycle, and its
        // path walks the real edges back around rather than degenerating to
        // a single node.
        let mut g = ComponentGraph::for_source(GraphSource::Local);
        for key in ["a", "b", "c"] {
            add(&mut g, key, ComponentKind::Flow);
        }
        depends(&mut g, "b", "a");
        depends(&mut g, "c", "b");
        depends(&mut g, "a", "c");

        let cone = impact_cone(
            &g,
            &[cid("a")],
            &ImpactOptions {
                max_depth: DEFAULT_MAX_DEPTH,
                include_paths: true,
            },
        )
        .unwrap();

        let paths = cone.paths.unwrap();
        assert_eq!(paths.len(), 3);
        let seed_path = paths
            .iter()
            .find(|p| p.nodes.last() == Some(&cid("a")))
            .unwrap();
        assert_eq!(
            seed_path.nodes,
            vec![cid("a"), cid("b"), cid("c"), cid("a")]
        );
        assert!(seed_path.display.contains(" → "));
        assert!(paths.iter().all(|p| p.nodes.first() == Some(&cid("a"))));
        assert!(paths.iter().all(|p| p.nodes.len() >= 2));
    }

    #[test]
    fn paths_render_seed_first() {
        let g = chain();
        let cone = impact_cone(
            &g,
            &[cid("a")],
            &ImpactOptions {
                max_depth: DEFAULT_MAX_DEPTH,
                include_paths: true,
            },
        )
        .unwrap();

        let paths = cone.paths.unwrap();
        assert_eq!(paths.len(), 3);
        let d_path = paths
            .iter()
            .find(|p| p.nodes.last() == Some(&cid("d")))
            .unwrap();
        assert_eq!(
            d_path.nodes,
            vec![cid("a"), cid("b"), cid("c"), cid("d")]
        );
        assert_eq!(
            d_path.display,
            "core/sys-flows/a@1.0.0 → core/sys-flows/b@1.0.0 → core/sys-flows/c@1.0.0 → core/sys-flows/d@1.0.0"
        );
    }

    #[test]
    fn paths_use_labels_when_present() {
        let mut g = ComponentGraph::for_source(GraphSource::Local);
        let mut a = GraphNode::new(cref("a"), ComponentKind::Schema, GraphSource::Local);
        a.label = Some("Order schema".to_string());
        g.add_node(a);
        add(&mut g, "b", ComponentKind::Flow);
        depends(&mut g, "b", "a");

        let cone = impact_cone(
            &g,
            &[cid("a")],
            &ImpactOptions {
                max_depth: DEFAULT_MAX_DEPTH,
                include_paths: true,
            },
        )
        .unwrap();

        let paths = cone.paths.unwrap();
        assert!(paths[0].display.starts_with("Order schema → "));
    }

    #[test]
    fn multiple_seeds_merge_their_cones() {
        // Two disjoint chains, one seed in each.
        let mut g = ComponentGraph::for_source(GraphSource::Local);
        for key in ["a1", "b1", "a2", "b2"] {
            add(&mut g, key, ComponentKind::Flow);
        }
        depends(&mut g, "b1", "a1");
        depends(&mut g, "b2", "a2");

        let cone = impact_cone(&g, &[cid("a1"), cid("a2")], &ImpactOptions::default()).unwrap();
        let expected: BTreeSet<ComponentId> = [cid("b1"), cid("b2")].into_iter().collect();
        assert_eq!(cone.affected, expected);
        assert_eq!(cone.stats.max_depth, 1);
    }

    // ── Property-based monotonicity / cycle safety ─────────────────

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        const KEYS: [&str; 6] = ["n0", "n1", "n2", "n3", "n4", "n5"];

        fn arb_graph() -> impl Strategy<Value = ComponentGraph> {
            // Arbitrary edge set over a fixed node universe — cycles and
            // self-loops included on purpose.
            proptest::collection::vec((0usize..KEYS.len(), 0usize..KEYS.len()), 0..20).prop_map(
                |edges| {
                    let mut g = ComponentGraph::for_source(GraphSource::Local);
                    for key in KEYS {
                        add(&mut g, key, ComponentKind::Flow);
                    }
                    for (from, to) in edges {
                        depends(&mut g, KEYS[from], KEYS[to]);
                    }
                    g
                },
            )
        }

        proptest! {
            #[test]
            fn affected_grows_monotonically_with_depth(
                g in arb_graph(),
                seed in 0usize..KEYS.len(),
                depth in 0u32..6,
            ) {
                let seeds = [cid(KEYS[seed])];
                let shallow = impact_cone(&g, &seeds, &ImpactOptions {
                    max_depth: depth,
                    include_paths: false,
                }).unwrap();
                let deep = impact_cone(&g, &seeds, &ImpactOptions {
                    max_depth: depth + 1,
                    include_paths: false,
                }).unwrap();

                prop_assert!(shallow.affected.is_subset(&deep.affected));
            }

            #[test]
            fn traversal_terminates_on_any_graph(g in arb_graph(), seed in 0usize..KEYS.len()) {
                let cone = impact_cone(&g, &[cid(KEYS[seed])], &ImpactOptions::default()).unwrap();
                prop_assert!(cone.stats.total_affected <= KEYS.len());
                prop_assert!(cone.stats.max_depth <= DEFAULT_MAX_DEPTH);
            }
        }
    }
}
