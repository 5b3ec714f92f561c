//! Token-Budget Calculator (C13): resolves a model's [`TokenBudget`] from
//! glob-matched overrides and classifies usage against a threshold profile.

use relay_protocol::ContextState;
use relay_protocol::ThresholdConfig;
use relay_protocol::TokenBudget;
use wildmatch::WildMatch;

/// A glob-matched per-model budget override (C22's config layer feeds these
/// in; this module only consumes them).
#[derive(Debug, Clone)]
pub struct ModelBudgetOverride {
    pub model_glob: String,
    pub context_window: usize,
    pub output_reserve: Option<usize>,
}

/// `max(1024, ceil(context_window * 0.10))` — the more conservative of the
/// spec's allowed 10-20% range.
fn default_output_reserve(context_window: usize) -> usize {
    let tenth = (context_window as f64 * 0.10).ceil() as usize;
    tenth.max(1024)
}

/// Resolves a [`TokenBudget`] for `model`: the first matching override wins
/// (in table order), falling back to `default_context_window` with no
/// override applied.
pub fn resolve_budget(
    model: &str,
    overrides: &[ModelBudgetOverride],
    default_context_window: usize,
    system_reserve: usize,
) -> TokenBudget {
    for over in overrides {
        if WildMatch::new(&over.model_glob).matches(model) {
            let context_window = over.context_window;
            let output_reserve = over
                .output_reserve
                .unwrap_or_else(|| default_output_reserve(context_window));
            return TokenBudget {
                context_window,
                output_reserve,
                system_reserve,
            };
        }
    }
    TokenBudget {
        context_window: default_context_window,
        output_reserve: default_output_reserve(default_context_window),
        system_reserve,
    }
}

/// Computes the usage ratio for `tokens` against `budget` and classifies it
/// per `thresholds`.
pub fn derive_state(tokens: usize, budget: &TokenBudget, thresholds: &ThresholdConfig) -> ContextState {
    let usable = budget.usable();
    let usage_ratio = if usable == 0 { 1.0 } else { tokens as f64 / usable as f64 };
    ContextState {
        usage_ratio,
        state: relay_protocol::classify(usage_ratio, thresholds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_protocol::ContextStateKind;
    use relay_protocol::ThresholdProfile;

    #[test]
    fn default_reserve_uses_ten_percent_floored_at_1024() {
        assert_eq!(default_output_reserve(200_000), 20_000);
        assert_eq!(default_output_reserve(5_000), 1024);
    }

    #[test]
    fn first_matching_override_wins() {
        let overrides = vec![
            ModelBudgetOverride {
                model_glob: "claude-*".to_string(),
                context_window: 200_000,
                output_reserve: Some(8_000),
            },
            ModelBudgetOverride {
                model_glob: "*".to_string(),
                context_window: 32_000,
                output_reserve: None,
            },
        ];
        let budget = resolve_budget("claude-opus-4", &overrides, 100_000, 0);
        assert_eq!(budget.context_window, 200_000);
        assert_eq!(budget.output_reserve, 8_000);
    }

    #[test]
    fn unmatched_model_falls_back_to_default() {
        let budget = resolve_budget("mystery-model", &[], 50_000, 0);
        assert_eq!(budget.context_window, 50_000);
        assert_eq!(budget.output_reserve, 5_000);
    }

    #[test]
    fn derive_state_classifies_against_profile() {
        let budget = TokenBudget {
            context_window: 100_000,
            output_reserve: 0,
            system_reserve: 0,
        };
        let thresholds = ThresholdProfile::Balanced.thresholds();
        let state = derive_state(86_000, &budget, &thresholds);
        assert_eq!(state.state, ContextStateKind::Critical);
    }
}
