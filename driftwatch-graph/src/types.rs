use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ident::{ComponentId, ComponentRef};

// ── Component kinds ────────────────────────────────────────────────

/// The fixed set of component kinds the platform knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// An orchestrated process definition.
    Flow,
    /// An endpoint binding to an external system.
    Connector,
    /// A data mapping between two schemas.
    Transform,
    /// A message or document schema.
    Schema,
    /// An inline script or user function.
    Script,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flow => "Flow",
            Self::Connector => "Connector",
            Self::Transform => "Transform",
            Self::Schema => "Schema",
            Self::Script => "Script",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Dependency kinds ───────────────────────────────────────────────

/// Typed dependency relationships. Two components may be linked by more
/// than one edge when the edges carry distinct kinds (multigraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    /// Flow → Flow: one process invokes another.
    Invokes,
    /// Any → Any: a definition references another component by id.
    References,
    /// Flow → Script: an embedded script or function.
    Includes,
    /// Transform/Flow → Schema: payloads validated against a schema.
    Validates,
}

impl DependencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invokes => "Invokes",
            Self::References => "References",
            Self::Includes => "Includes",
            Self::Validates => "Validates",
        }
    }
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Provenance ─────────────────────────────────────────────────────

/// Which side of the drift comparison a graph (or node) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphSource {
    /// Authored component definitions discovered on disk.
    Local,
    /// Deployed component records fetched from a remote environment.
    Runtime,
}

impl GraphSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Runtime => "runtime",
        }
    }
}

impl std::fmt::Display for GraphSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Nodes and edges ────────────────────────────────────────────────

/// One component instance. Immutable once inserted into a graph: a changed
/// component becomes a different node (new id when the version is bumped,
/// same id with different hashes when it is not).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: ComponentId,
    /// Structured identity the id was derived from.
    pub component: ComponentRef,
    pub kind: ComponentKind,
    /// Human-readable display name, preferred over the id in rendered paths.
    pub label: Option<String>,
    /// Full definition payload, when the collaborator chose to carry it.
    pub definition: Option<serde_json::Value>,
    /// Content digest of the component's public interface.
    pub api_hash: Option<String>,
    /// Content digest of the component's configuration.
    pub config_hash: Option<String>,
    pub source: GraphSource,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Arbitrary key-value metadata.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl GraphNode {
    /// A node with the derived canonical id and empty optional fields.
    pub fn new(component: ComponentRef, kind: ComponentKind, source: GraphSource) -> Self {
        Self {
            id: ComponentId::from_ref(&component),
            component,
            kind,
            label: None,
            definition: None,
            api_hash: None,
            config_hash: None,
            source,
            tags: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Display label when set, canonical id otherwise.
    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}

/// One dependency. The `to` id is not required to resolve to a node in the
/// same graph — an unresolved target is itself a meaningful signal (it is
/// what the missing-dependency check reports).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub from: ComponentId,
    pub to: ComponentId,
    pub kind: DependencyKind,
    /// Semver range the target component's version must satisfy.
    pub version_range: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl GraphEdge {
    pub fn new(from: ComponentId, to: ComponentId, kind: DependencyKind) -> Self {
        let id = format!("{from}--{kind}->{to}");
        Self {
            id,
            from,
            to,
            kind,
            version_range: None,
            required: false,
            metadata: HashMap::new(),
        }
    }

    pub fn with_version_range(mut self, range: impl Into<String>) -> Self {
        self.version_range = Some(range.into());
        self
    }
}

/// Provenance metadata attached to one graph snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMeta {
    pub source: GraphSource,
    /// Remote environment id, for runtime snapshots.
    pub environment: Option<String>,
    pub built_at: DateTime<Utc>,
}

impl GraphMeta {
    pub fn new(source: GraphSource) -> Self {
        Self {
            source,
            environment: None,
            built_at: Utc::now(),
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }
}

// ── Tests ──────────────────────────────────────────────────────────
