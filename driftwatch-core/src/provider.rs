// Collaborator seam for graph construction.
//
// The core never performs I/O: the filesystem scanner (local definitions)
// and the remote HTTP adapter (deployed records) both hand over fully
// materialized, frozen ComponentGraph snapshots through this trait.

use async_trait::async_trait;

use driftwatch_graph::{ComponentGraph, GraphSource};

use crate::config::EnvironmentConfig;
use crate::error::ProviderError;

/// Supplies one side of the drift comparison.
///
/// Implementations must uphold the graph invariants the analyses assume:
/// unique node ids, both edge indices populated, and the `source` tag
/// matching [`source`](Self::source). Population completes before the graph
/// is returned — the snapshot is frozen from the caller's point of view.
#[async_trait]
pub trait GraphProvider: Send + Sync {
    /// Which side this provider builds.
    fn source(&self) -> GraphSource;

    /// Build a graph snapshot for the given environment.
    ///
    /// Local providers ignore the environment (there is only one working
    /// copy); runtime providers fetch the environment's deployed records.
    async fn load_graph(
        &self,
        environment: &EnvironmentConfig,
    ) -> Result<ComponentGraph, ProviderError>;
}

// ── Tests ──────────────────────────────────────────────────────────
