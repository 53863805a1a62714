// Critical-component ranking.
//
// The exact heuristic is an open design parameter: deployments differ on
// whether raw fan-in, component kind, or "nothing downstream absorbs the
// change" matters most, so the weights are configuration rather than code.

#![allow(clippy::cast_precision_loss)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use driftwatch_graph::{ComponentGraph, ComponentId};

/// Tunable weights for the criticality score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalityWeights {
    /// Weight of normalized incoming-edge fan-in.
    pub fan_in: f64,
    /// Bonus for components nothing depends on — a change there surfaces
    /// directly to users with no downstream mitigation.
    pub entry_point: f64,
    /// Per-kind multipliers keyed by `ComponentKind::as_str()`.
    #[serde(default)]
    pub kind: HashMap<String, f64>,
}

impl Default for CriticalityWeights {
    fn default() -> Self {
        Self {
            fan_in: 1.0,
            entry_point: 0.5,
            kind: HashMap::new(),
        }
    }
}

/// One ranked component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalComponent {
    pub id: ComponentId,
    /// Direct incoming-edge count.
    pub fan_in: usize,
    /// True when no component depends on this one.
    pub entry_point: bool,
    pub score: f64,
}

/// Rank every node in the graph by estimated deployment risk, highest first.
/// Ties break on id so the ordering is deterministic.
pub fn rank_components(
    graph: &ComponentGraph,
    weights: &CriticalityWeights,
) -> Vec<CriticalComponent> {
    let max_fan_in = graph
        .ids()
        .map(|id| graph.incoming(id).len())
        .max()
        .unwrap_or(0);

    let mut ranked: Vec<CriticalComponent> = graph
        .nodes()
        .map(|node| {
            let fan_in = graph.incoming(&node.id).len();
            let entry_point = fan_in == 0;

            let fan_in_norm = if max_fan_in == 0 {
                0.0
            } else {
                fan_in as f64 / max_fan_in as f64
            };
            let kind_multiplier = weights
                .kind
                .get(node.kind.as_str())
                .copied()
                .unwrap_or(1.0);

            let score = kind_multiplier
                * (weights.fan_in * fan_in_norm
                    + if entry_point { weights.entry_point } else { 0.0 });

            CriticalComponent {
                id: node.id.clone(),
                fan_in,
                entry_point,
                score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    debug!(components = ranked.len(), max_fan_in, "Criticality ranking computed");
    ranked
}

// ── Tests ──────────────────────────────────────────────────────────
