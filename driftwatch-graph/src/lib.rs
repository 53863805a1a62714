//! Component dependency graph model for driftwatch.
//!
//! The graph crate owns the identifier codec ([`ident`]), the node/edge data
//! model ([`types`]), and the in-memory multigraph store ([`graph`]). Graphs
//! are populated once by a collaborator (the local scanner or the remote
//! fetch adapter), then handed read-only to the analysis layer in
//! `driftwatch-core`.

pub mod graph;
pub mod ident;
pub mod types;

pub use graph::ComponentGraph;
pub use ident::{ComponentId, ComponentRef};
pub use types::{ComponentKind, DependencyKind, GraphEdge, GraphMeta, GraphNode, GraphSource};

/// Error type for the graph model.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An identifier string does not match `domain/flow/key@version`.
    #[error("Malformed component identifier {id:?}: {reason}")]
    MalformedIdentifier { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, GraphError>;
