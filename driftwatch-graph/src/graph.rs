// In-memory directed multigraph of components.
//
// Two append-only adjacency indices (outgoing keyed by `from`, incoming
// keyed by `to`) are populated once at construction time and never pruned.
// This models the build-then-freeze lifecycle: a collaborator populates the
// graph, then hands it to diff/impact which only read it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ident::ComponentId;
use crate::types::{GraphEdge, GraphMeta, GraphNode, GraphSource};

/// A directed multigraph of components and typed dependency edges.
///
/// Edge targets are allowed to dangle: an edge whose `to` id resolves to no
/// node is how a missing dependency is represented, so neighbor lookups are
/// total — unknown ids yield empty sequences, never errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentGraph {
    nodes: HashMap<ComponentId, GraphNode>,
    outgoing: HashMap<ComponentId, Vec<GraphEdge>>,
    incoming: HashMap<ComponentId, Vec<GraphEdge>>,
    meta: GraphMeta,
}

impl ComponentGraph {
    pub fn new(meta: GraphMeta) -> Self {
        Self {
            nodes: HashMap::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            meta,
        }
    }

    /// Shorthand for a graph with fresh metadata for the given source.
    pub fn for_source(source: GraphSource) -> Self {
        Self::new(GraphMeta::new(source))
    }

    pub fn meta(&self) -> &GraphMeta {
        &self.meta
    }

    /// Insert or overwrite a node by id.
    ///
    /// Overwriting is allowed so a builder can re-populate idempotently.
    pub fn add_node(&mut self, node: GraphNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Append an edge to both adjacency indices, whether or not `to`
    /// currently resolves to a node.
    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.incoming
            .entry(edge.to.clone())
            .or_default()
            .push(edge.clone());
        self.outgoing.entry(edge.from.clone()).or_default().push(edge);
    }

    pub fn node(&self, id: &ComponentId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Edges whose `from` is `id`, in insertion order. Empty for unknown ids.
    pub fn outgoing(&self, id: &ComponentId) -> &[GraphEdge] {
        self.outgoing.get(id).map_or(&[], Vec::as_slice)
    }

    /// Edges whose `to` is `id`, in insertion order. Empty for unknown ids.
    pub fn incoming(&self, id: &ComponentId) -> &[GraphEdge] {
        self.incoming.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.nodes.keys()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// All edges, iterated through the outgoing index (each edge appears in
    /// exactly one outgoing list).
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.outgoing.values().flatten()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(Vec::len).sum()
    }
}

// ── Tests ──────────────────────────────────────────────────────────
