//! Token budgets, context state thresholds, and threshold profiles.

use serde::Deserialize;
use serde::Serialize;

/// A model's context window split into usable input, output reserve, and a
/// system-prompt reserve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenBudget {
    pub context_window: usize,
    pub output_reserve: usize,
    pub system_reserve: usize,
}

impl TokenBudget {
    /// `usable = context_window - output_reserve - system_reserve`, floored
    /// at zero so a misconfigured model never yields an underflow.
    pub fn usable(&self) -> usize {
        self.context_window
            .saturating_sub(self.output_reserve)
            .saturating_sub(self.system_reserve)
    }
}

/// The health of a conversation's token usage relative to its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextStateKind {
    Healthy,
    Warning,
    Critical,
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextState {
    pub usage_ratio: f64,
    pub state: ContextStateKind,
}

/// Warning/critical/overflow ratio thresholds for one profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub auto_condense: f64,
    pub warning: f64,
    pub critical: f64,
    pub overflow: f64,
}

/// The three named threshold profiles from the spec's §4.20 table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdProfile {
    Conservative,
    Balanced,
    Aggressive,
}

impl ThresholdProfile {
    pub const fn thresholds(self) -> ThresholdConfig {
        match self {
            ThresholdProfile::Conservative => ThresholdConfig {
                auto_condense: 0.75,
                warning: 0.70,
                critical: 0.80,
                overflow: 0.90,
            },
            ThresholdProfile::Balanced => ThresholdConfig {
                auto_condense: 0.80,
                warning: 0.75,
                critical: 0.85,
                overflow: 0.95,
            },
            ThresholdProfile::Aggressive => ThresholdConfig {
                auto_condense: 0.85,
                warning: 0.85,
                critical: 0.92,
                overflow: 0.97,
            },
        }
    }
}

impl Default for ThresholdProfile {
    fn default() -> Self {
        ThresholdProfile::Balanced
    }
}

/// Classifies a usage ratio against a threshold config, assigning the
/// highest-threshold state whose bound is reached.
pub fn classify(usage_ratio: f64, thresholds: &ThresholdConfig) -> ContextStateKind {
    if usage_ratio >= thresholds.overflow {
        ContextStateKind::Overflow
    } else if usage_ratio >= thresholds.critical {
        ContextStateKind::Critical
    } else if usage_ratio >= thresholds.warning {
        ContextStateKind::Warning
    } else {
        ContextStateKind::Healthy
    }
}
