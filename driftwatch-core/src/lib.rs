//! driftwatch core library — drift detection between local and deployed
//! component graphs.
//!
//! The two entry points are [`diff::diff`], which compares a local graph
//! snapshot against a runtime snapshot and returns a [`delta::GraphDelta`],
//! and [`impact::impact_cone`], which computes the reverse-reachability set
//! of a proposed change. Graph snapshots are supplied by collaborators
//! implementing [`provider::GraphProvider`].

pub mod config;
pub mod delta;
pub mod diff;
pub mod error;
pub mod impact;
pub mod provider;
pub mod rank;

pub use delta::{GraphDelta, Severity, Violation, ViolationKind};
pub use diff::diff;
pub use error::{DriftError, Result};
pub use impact::{ImpactCone, ImpactOptions, impact_cone};
