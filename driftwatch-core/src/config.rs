use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::impact::DEFAULT_MAX_DEPTH;
use crate::rank::CriticalityWeights;

/// Top-level driftwatch configuration, matching `.driftwatch/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriftConfig {
    #[serde(default)]
    pub remote: RemoteSection,
    /// Remote environments keyed by id.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentConfig>,
    #[serde(default)]
    pub impact: ImpactSection,
    #[serde(default)]
    pub ranking: RankingSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSection {
    /// Environment queried when the caller does not name one.
    pub default_environment: Option<String>,
}

/// One remote runtime environment the fetch adapter can query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Human-readable name shown in rendered output.
    pub label: String,
    /// Base URL of the environment's component API.
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactSection {
    pub max_depth: u32,
    pub include_paths: bool,
}

impl Default for ImpactSection {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            include_paths: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSection {
    pub fan_in_weight: f64,
    pub entry_point_weight: f64,
    #[serde(default)]
    pub kind_weights: HashMap<String, f64>,
}

impl Default for RankingSection {
    fn default() -> Self {
        let defaults = CriticalityWeights::default();
        Self {
            fan_in_weight: defaults.fan_in,
            entry_point_weight: defaults.entry_point,
            kind_weights: defaults.kind,
        }
    }
}

impl RankingSection {
    pub fn weights(&self) -> CriticalityWeights {
        CriticalityWeights {
            fan_in: self.fan_in_weight,
            entry_point: self.entry_point_weight,
            kind: self.kind_weights.clone(),
        }
    }
}

impl DriftConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_toml_str(&raw)
    }

    /// Resolve which remote environment to diff against: an explicit
    /// override wins, then the configured default. The multi-source
    /// resolution itself (CLI flags, env vars, project files) lives with the
    /// caller; this is its interface.
    pub fn select_environment(
        &self,
        requested: Option<&str>,
    ) -> Result<&EnvironmentConfig, ConfigError> {
        let id = requested
            .or(self.remote.default_environment.as_deref())
            .ok_or(ConfigError::NoEnvironment)?;
        self.environments
            .get(id)
            .ok_or_else(|| ConfigError::UnknownEnvironment(id.to_string()))
    }

    pub fn impact_options(&self) -> crate::impact::ImpactOptions {
        crate::impact::ImpactOptions {
            max_depth: self.impact.max_depth,
            include_paths: self.impact.include_paths,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
