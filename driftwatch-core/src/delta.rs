// Violation model and diff output.
//
// Every drift finding is data, not control flow: the diff engine returns
// violations inside a GraphDelta and never raises for a data condition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use driftwatch_graph::ComponentId;

// ── Severity ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Violations ─────────────────────────────────────────────────────

/// One structured drift finding, with a strongly-typed payload per kind so
/// handling is exhaustive at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Violation {
    /// Component exists locally but is not deployed.
    NodeAdded { id: ComponentId },
    /// Component is deployed but no longer exists locally.
    NodeRemoved { id: ComponentId },
    /// Same component on both sides with a structural difference not covered
    /// by a more specific kind (kind, label, tag set).
    NodeChanged {
        id: ComponentId,
        changed_fields: Vec<String>,
    },
    /// Same component, different declared versions.
    VersionDrift {
        id: ComponentId,
        local_version: String,
        runtime_version: String,
    },
    /// A dependency's resolved version does not satisfy the edge's range.
    SemverViolation {
        dependent: ComponentId,
        dependency: ComponentId,
        required_range: String,
        actual_version: String,
    },
    /// An edge target that resolves in neither graph.
    MissingDependency {
        dependent: ComponentId,
        unresolved: ComponentId,
    },
    /// A dependency cycle in the local graph.
    CircularDependency {
        cycle: Vec<ComponentId>,
        cycle_path: String,
    },
    /// Interface digests differ — breaking-change signal.
    ApiDrift {
        id: ComponentId,
        local_hash: String,
        runtime_hash: String,
    },
    /// Configuration digests differ.
    ConfigDrift {
        id: ComponentId,
        local_hash: String,
        runtime_hash: String,
    },
    /// A collaborator-supplied record carried an undecodable identifier and
    /// was skipped rather than aborting the analysis.
    MalformedId { id: String, reason: String },
}

/// Fieldless discriminant of [`Violation`], used for stable ordering and
/// stats tallying.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    NodeAdded,
    NodeRemoved,
    NodeChanged,
    VersionDrift,
    SemverViolation,
    MissingDependency,
    CircularDependency,
    ApiDrift,
    ConfigDrift,
    MalformedId,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NodeAdded => "node-added",
            Self::NodeRemoved => "node-removed",
            Self::NodeChanged => "node-changed",
            Self::VersionDrift => "version-drift",
            Self::SemverViolation => "semver-violation",
            Self::MissingDependency => "missing-dependency",
            Self::CircularDependency => "circular-dependency",
            Self::ApiDrift => "api-drift",
            Self::ConfigDrift => "config-drift",
            Self::MalformedId => "malformed-id",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Self::NodeAdded { .. } => ViolationKind::NodeAdded,
            Self::NodeRemoved { .. } => ViolationKind::NodeRemoved,
            Self::NodeChanged { .. } => ViolationKind::NodeChanged,
            Self::VersionDrift { .. } => ViolationKind::VersionDrift,
            Self::SemverViolation { .. } => ViolationKind::SemverViolation,
            Self::MissingDependency { .. } => ViolationKind::MissingDependency,
            Self::CircularDependency { .. } => ViolationKind::CircularDependency,
            Self::ApiDrift { .. } => ViolationKind::ApiDrift,
            Self::ConfigDrift { .. } => ViolationKind::ConfigDrift,
            Self::MalformedId { .. } => ViolationKind::MalformedId,
        }
    }

    /// Severity is a fixed function of the kind.
    pub fn severity(&self) -> Severity {
        match self.kind() {
            ViolationKind::ApiDrift
            | ViolationKind::SemverViolation
            | ViolationKind::MissingDependency
            | ViolationKind::CircularDependency => Severity::Error,
            ViolationKind::NodeRemoved
            | ViolationKind::VersionDrift
            | ViolationKind::ConfigDrift => Severity::Warning,
            ViolationKind::NodeAdded | ViolationKind::NodeChanged | ViolationKind::MalformedId => {
                Severity::Info
            }
        }
    }

    /// The component id the finding is primarily about, used as the
    /// secondary sort key.
    pub fn primary_id(&self) -> &str {
        match self {
            Self::NodeAdded { id }
            | Self::NodeRemoved { id }
            | Self::NodeChanged { id, .. }
            | Self::VersionDrift { id, .. }
            | Self::ApiDrift { id, .. }
            | Self::ConfigDrift { id, .. } => id.as_str(),
            Self::SemverViolation { dependent, .. } | Self::MissingDependency { dependent, .. } => {
                dependent.as_str()
            }
            Self::CircularDependency { cycle, .. } => {
                cycle.first().map_or("", ComponentId::as_str)
            }
            Self::MalformedId { id, .. } => id.as_str(),
        }
    }

    /// Human-readable one-line description, embedding canonical ids.
    pub fn message(&self) -> String {
        match self {
            Self::NodeAdded { id } => format!("{id} exists locally but is not deployed"),
            Self::NodeRemoved { id } => format!("{id} is deployed but no longer exists locally"),
            Self::NodeChanged { id, changed_fields } => {
                format!("{id} changed: {}", changed_fields.join(", "))
            }
            Self::VersionDrift {
                id,
                local_version,
                runtime_version,
            } => format!("{id} version drift: local {local_version}, runtime {runtime_version}"),
            Self::SemverViolation {
                dependent,
                dependency,
                required_range,
                actual_version,
            } => format!(
                "{dependent} requires {dependency} matching {required_range}, found {actual_version}"
            ),
            Self::MissingDependency {
                dependent,
                unresolved,
            } => format!("{dependent} depends on {unresolved}, which resolves in neither graph"),
            Self::CircularDependency { cycle_path, .. } => {
                format!("dependency cycle: {cycle_path}")
            }
            Self::ApiDrift {
                id,
                local_hash,
                runtime_hash,
            } => format!("{id} API drift: local {local_hash}, runtime {runtime_hash}"),
            Self::ConfigDrift {
                id,
                local_hash,
                runtime_hash,
            } => format!("{id} config drift: local {local_hash}, runtime {runtime_hash}"),
            Self::MalformedId { id, reason } => {
                format!("skipped record with malformed id {id:?}: {reason}")
            }
        }
    }
}

// ── Delta ──────────────────────────────────────────────────────────

/// Aggregate counts over one delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaStats {
    pub total_violations: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub nodes_added: usize,
    pub nodes_removed: usize,
    pub nodes_changed: usize,
}

/// The diff engine's output: the full finding list, the same list
/// partitioned by severity, aggregate stats, and provenance. Created fresh
/// per diff invocation and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDelta {
    pub violations: Vec<Violation>,
    pub errors: Vec<Violation>,
    pub warnings: Vec<Violation>,
    pub infos: Vec<Violation>,
    pub stats: DeltaStats,
    pub generated_at: DateTime<Utc>,
    /// Environment id of the local snapshot, when tagged.
    pub local_env: Option<String>,
    /// Environment id of the runtime snapshot, when tagged.
    pub runtime_env: Option<String>,
}

impl GraphDelta {
    /// Sort, partition, and tally an accumulated violation list.
    ///
    /// Ordering is stable across runs: `(kind, primary id)`.
    pub fn from_violations(
        mut violations: Vec<Violation>,
        local_env: Option<String>,
        runtime_env: Option<String>,
    ) -> Self {
        violations.sort_by(|a, b| {
            a.kind()
                .cmp(&b.kind())
                .then_with(|| a.primary_id().cmp(b.primary_id()))
        });

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut infos = Vec::new();
        let mut stats = DeltaStats {
            total_violations: violations.len(),
            ..DeltaStats::default()
        };

        for v in &violations {
            match v.severity() {
                Severity::Error => {
                    stats.error_count += 1;
                    errors.push(v.clone());
                }
                Severity::Warning => {
                    stats.warning_count += 1;
                    warnings.push(v.clone());
                }
                Severity::Info => {
                    stats.info_count += 1;
                    infos.push(v.clone());
                }
            }
            match v.kind() {
                ViolationKind::NodeAdded => stats.nodes_added += 1,
                ViolationKind::NodeRemoved => stats.nodes_removed += 1,
                ViolationKind::NodeChanged => stats.nodes_changed += 1,
                _ => {}
            }
        }

        Self {
            violations,
            errors,
            warnings,
            infos,
            stats,
            generated_at: Utc::now(),
            local_env,
            runtime_env,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.stats.error_count > 0
    }
}

// ── Tests ──────────────────────────────────────────────────────────
