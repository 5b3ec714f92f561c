//! Config Layer (C22): loads a [`RelayConfig`] from TOML, falling back to
//! documented defaults when no file is present.

use crate::commands::BatchOptions;
use crate::window::ModelBudgetOverride;
use crate::window::TrimPolicy;
use relay_protocol::ThresholdProfile;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use wildmatch::WildMatch;

/// Batch-runner knobs, mirroring [`BatchOptions`] but serializable from
/// TOML (`BatchOptions` itself carries no `serde` derive since it isn't
/// part of the wire protocol).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchPolicy {
    pub skip_comments: bool,
    pub continue_on_error: bool,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            skip_comments: true,
            continue_on_error: false,
        }
    }
}

impl BatchPolicy {
    pub fn to_options(&self) -> BatchOptions {
        BatchOptions {
            skip_comments: self.skip_comments,
            continue_on_error: self.continue_on_error,
        }
    }
}

/// Tool-output-trimmer knobs as read from TOML; `protected_tools` defaults
/// to `{"skill", "memory_search"}` to match [`TrimPolicy::default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    pub max_output_chars: usize,
    pub protected_tools: Vec<String>,
}

impl Default for TrimConfig {
    fn default() -> Self {
        let default_policy = TrimPolicy::default();
        Self {
            max_output_chars: default_policy.max_output_chars,
            protected_tools: default_policy.protected_tools.into_iter().collect(),
        }
    }
}

impl TrimConfig {
    pub fn to_policy(&self) -> TrimPolicy {
        TrimPolicy {
            max_output_chars: self.max_output_chars,
            protected_tools: self.protected_tools.iter().cloned().collect(),
        }
    }
}

/// A glob-matched `{model_glob, context_window, output_reserve}` override,
/// as read from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelBudgetOverrideConfig {
    pub model_glob: String,
    pub context_window: usize,
    pub output_reserve: Option<usize>,
}

impl From<&ModelBudgetOverrideConfig> for ModelBudgetOverride {
    fn from(config: &ModelBudgetOverrideConfig) -> Self {
        ModelBudgetOverride {
            model_glob: config.model_glob.clone(),
            context_window: config.context_window,
            output_reserve: config.output_reserve,
        }
    }
}

/// Top-level configuration for a `relay` process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub threshold_profile: ThresholdProfile,
    pub model_overrides: Vec<ModelBudgetOverrideConfig>,
    /// Glob → profile table; unmatched models fall back to
    /// `threshold_profile`.
    pub model_profiles: Vec<(String, ThresholdProfile)>,
    pub batch: BatchPolicy,
    pub trim: TrimConfig,
    pub checkpoint_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            threshold_profile: ThresholdProfile::Balanced,
            model_overrides: Vec::new(),
            model_profiles: Vec::new(),
            batch: BatchPolicy::default(),
            trim: TrimConfig::default(),
            checkpoint_capacity: 5,
        }
    }
}

impl RelayConfig {
    /// Loads config from `path`. Absence or an unreadable path returns
    /// `RelayConfig::default()` with a debug-level log — never an error,
    /// since a missing config file is the common case for a one-shot CLI
    /// invocation. A malformed (present, readable, but unparsable) file is
    /// an error: surfaced to the CLI boundary, which converts it into an
    /// `anyhow::Error`.
    pub fn load(path: Option<&Path>) -> Result<Self, toml::de::Error> {
        let Some(path) = path else {
            debug!("no config path supplied, using defaults");
            return Ok(Self::default());
        };
        let Ok(raw) = std::fs::read_to_string(path) else {
            debug!(path = %path.display(), "config file not found or unreadable, using defaults");
            return Ok(Self::default());
        };
        toml::from_str(&raw)
    }

    /// Resolves the threshold profile for `model`: the first matching
    /// glob in `model_profiles` wins, falling back to `threshold_profile`.
    pub fn profile_for(&self, model: &str) -> ThresholdProfile {
        for (glob, profile) in &self.model_profiles {
            if WildMatch::new(glob).matches(model) {
                return *profile;
            }
        }
        self.threshold_profile
    }

    pub fn budget_overrides(&self) -> Vec<ModelBudgetOverride> {
        self.model_overrides.iter().map(ModelBudgetOverride::from).collect()
    }
}
