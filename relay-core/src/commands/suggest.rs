//! Suggestion Engine (C8): Levenshtein-based nearest-name lookup for
//! unknown commands.

use super::registry::CommandRegistry;

/// Returns at most 3 canonical command names (no leading `/`; callers add
/// it when rendering) with Levenshtein distance `<= 3` from `query`,
/// considering both canonical names and aliases. Ties break by distance,
/// then by category, then lexicographically.
pub fn suggest(query: &str, registry: &CommandRegistry) -> Vec<String> {
    let query_lower = query.to_lowercase();

    let mut candidates: Vec<(String, usize, String)> = Vec::new();
    for signature in registry.list() {
        let mut best = distance_with_prefix_bonus(&query_lower, &signature.name.to_lowercase());
        for alias in &signature.aliases {
            best = best.min(distance_with_prefix_bonus(&query_lower, &alias.to_lowercase()));
        }
        if best <= 3 {
            candidates.push((signature.name.clone(), best, signature.category.clone()));
        }
    }

    candidates.sort_by(|a, b| a.1.cmp(&b.1).then(a.2.cmp(&b.2)).then(a.0.cmp(&b.0)));
    candidates.into_iter().take(3).map(|(name, _, _)| name).collect()
}

fn distance_with_prefix_bonus(a: &str, b: &str) -> usize {
    let distance = levenshtein(a, b);
    if a.starts_with(b) || b.starts_with(a) {
        distance.min(1)
    } else {
        distance
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());

    let mut dp = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in dp.iter_mut().enumerate().take(n + 1) {
        row[0] = i;
    }
    for j in 0..=m {
        dp[0][j] = j;
    }
    for i in 1..=n {
        for j in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            dp[i][j] = (dp[i - 1][j] + 1).min(dp[i][j - 1] + 1).min(dp[i - 1][j - 1] + cost);
        }
    }
    dp[n][m]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::CommandHandler;
    use crate::commands::result::CommandResult;
    use relay_protocol::CommandKind;
    use relay_protocol::CommandSignature;
    use std::sync::Arc;

    fn noop_handler() -> Arc<dyn CommandHandler> {
        Arc::new(|_ctx| Box::pin(async { CommandResult::success("ok") }) as _)
    }

    fn registry_with(names: &[&str]) -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        for name in names {
            registry
                .register(CommandSignature::new(*name, CommandKind::Builtin, "system"), noop_handler())
                .unwrap();
        }
        registry
    }

    #[test]
    fn suggests_closest_command_with_prefix_bonus() {
        let registry = registry_with(&["help", "history", "login", "logout", "list"]);
        let suggestions = suggest("hel", &registry);
        assert_eq!(suggestions, vec!["help".to_string()]);
    }

    #[test]
    fn returns_at_most_three() {
        let registry = registry_with(&["log", "loga", "logb", "logc", "logd"]);
        let suggestions = suggest("log", &registry);
        assert!(suggestions.len() <= 3);
    }

    #[test]
    fn no_suggestions_beyond_distance_three() {
        let registry = registry_with(&["help"]);
        assert!(suggest("zzzzzzzz", &registry).is_empty());
    }

    #[test]
    fn alias_distance_is_considered() {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandSignature::new("history", CommandKind::Builtin, "system").with_alias("hst"),
                noop_handler(),
            )
            .unwrap();
        let suggestions = suggest("hst", &registry);
        assert_eq!(suggestions, vec!["history".to_string()]);
    }
}
