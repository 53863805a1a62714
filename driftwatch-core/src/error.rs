/// Top-level driftwatch error type.
///
/// All fallible operations in `driftwatch-core` return
/// [`Result<T, DriftError>`](Result). Each variant wraps a domain-specific
/// error enum, allowing callers to match on the error source without losing
/// type information. Note that drift findings themselves are never errors —
/// they are returned as [`crate::delta::Violation`] data.
#[derive(thiserror::Error, Debug)]
pub enum DriftError {
    /// Error from the graph model (malformed identifiers).
    #[error("Graph error: {0}")]
    Graph(#[from] driftwatch_graph::GraphError),

    /// Caller-contract violation in impact analysis.
    #[error("Impact analysis error: {0}")]
    Impact(#[from] ImpactError),

    /// Error in configuration parsing or environment selection.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from a graph provider collaborator.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Caller-contract violations in impact analysis. These indicate a bug in
/// the calling layer, not a condition about the data.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImpactError {
    /// Impact analysis was invoked with no seed components.
    #[error("Impact analysis requires at least one seed component")]
    EmptySeeds,
}

/// Errors in driftwatch configuration parsing and environment selection.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist at the expected path.
    #[error("Config file not found: {0}")]
    NotFound(String),

    /// Configuration file syntax could not be parsed (TOML error).
    #[error("Parse error: {0}")]
    Parse(String),

    /// The requested remote environment is not defined in the config.
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    /// No environment was requested and no default is configured.
    #[error("No remote environment selected and no default configured")]
    NoEnvironment,
}

/// Errors from graph provider collaborators (the local scanner and the
/// remote fetch adapter). Retry policy, if any, lives in the adapter.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    /// Remote fetch failed (network, HTTP status, decode).
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Local component scan failed.
    #[error("Scan error: {0}")]
    Scan(String),

    /// The provider produced an invalid graph record.
    #[error("Graph error: {0}")]
    Graph(#[from] driftwatch_graph::GraphError),
}

/// Convenience alias for `Result<T, DriftError>`.
pub type Result<T> = std::result::Result<T, DriftError>;
