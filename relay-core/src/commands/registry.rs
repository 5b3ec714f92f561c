//! Command Registry (C6): stores command descriptors keyed by name, indexes
//! aliases and categories, and resolves same-name conflicts by
//! kind-priority (`builtin=0 < plugin=1 < mcp=2 < user=3`, lower wins).

use super::context::CommandHandler;
use crate::error::RegistryError;
use relay_protocol::CommandSignature;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

struct SignatureEntry {
    signature: CommandSignature,
    handler: Arc<dyn CommandHandler>,
}

/// Read-mostly after startup (see the concurrency model): registration and
/// unregistration are expected to happen before a session starts serving.
#[derive(Default)]
pub struct CommandRegistry {
    entries: HashMap<String, SignatureEntry>,
    aliases: HashMap<String, String>,
    categories: HashMap<String, BTreeSet<String>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `signature` with its `handler`. On an equal-priority
    /// name collision, returns `Err` and leaves the existing registration
    /// untouched.
    pub fn register(
        &mut self,
        signature: CommandSignature,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), RegistryError> {
        let name = signature.name.clone();

        if let Some(existing) = self.entries.get(&name) {
            let existing_priority = existing.signature.kind.priority();
            let incoming_priority = signature.kind.priority();

            if incoming_priority == existing_priority {
                return Err(RegistryError::Conflict {
                    name,
                    priority: signature.kind,
                });
            }
            if incoming_priority > existing_priority {
                debug!(%name, ?existing_priority, ?incoming_priority, "registry: lower-priority registration ignored");
                return Ok(());
            }
            debug!(%name, ?existing_priority, ?incoming_priority, "registry: higher-priority registration replaces existing");
            self.strip_indexes(&name);
        }

        self.index_aliases(&name, &signature.aliases);
        self.categories
            .entry(signature.category.clone())
            .or_default()
            .insert(name.clone());
        self.entries.insert(name, SignatureEntry { signature, handler });
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        let canonical = self.resolve_canonical(name);
        match canonical {
            Some(canonical) if self.entries.contains_key(&canonical) => {
                self.strip_indexes(&canonical);
                self.entries.remove(&canonical);
                true
            }
            _ => false,
        }
    }

    /// Direct name lookup first, falling back to the alias index.
    pub fn get(&self, name: &str) -> Option<&CommandSignature> {
        if let Some(entry) = self.entries.get(name) {
            return Some(&entry.signature);
        }
        let canonical = self.aliases.get(name)?;
        self.entries.get(canonical).map(|e| &e.signature)
    }

    /// Direct name lookup first, falling back to the alias index, for the
    /// handler rather than the signature.
    pub fn get_handler(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        if let Some(entry) = self.entries.get(name) {
            return Some(entry.handler.clone());
        }
        let canonical = self.aliases.get(name)?;
        self.entries.get(canonical).map(|e| e.handler.clone())
    }

    pub fn list(&self) -> Vec<&CommandSignature> {
        self.entries.values().map(|e| &e.signature).collect()
    }

    /// Case-insensitive substring match over canonical names.
    pub fn search(&self, query: &str) -> Vec<&CommandSignature> {
        let query = query.to_lowercase();
        self.entries
            .values()
            .filter(|e| e.signature.name.to_lowercase().contains(&query))
            .map(|e| &e.signature)
            .collect()
    }

    pub fn get_by_category(&self, category: &str) -> Vec<&CommandSignature> {
        let Some(names) = self.categories.get(category) else {
            return Vec::new();
        };
        names.iter().filter_map(|name| self.entries.get(name)).map(|e| &e.signature).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn resolve_canonical(&self, name: &str) -> Option<String> {
        if self.entries.contains_key(name) {
            return Some(name.to_string());
        }
        self.aliases.get(name).cloned()
    }

    fn index_aliases(&mut self, canonical: &str, aliases: &[String]) {
        for alias in aliases {
            self.aliases.insert(alias.clone(), canonical.to_string());
        }
    }

    fn strip_indexes(&mut self, name: &str) {
        if let Some(entry) = self.entries.get(name) {
            let category = entry.signature.category.clone();
            let alias_list = entry.signature.aliases.clone();
            if let Some(set) = self.categories.get_mut(&category) {
                set.remove(name);
            }
            for alias in alias_list {
                self.aliases.remove(&alias);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::result::CommandResult;
    use relay_protocol::CommandKind;

    fn sig(name: &str, kind: CommandKind) -> CommandSignature {
        CommandSignature::new(name, kind, "system")
    }

    fn noop_handler() -> Arc<dyn CommandHandler> {
        Arc::new(|_ctx| Box::pin(async { CommandResult::success("ok") }) as _)
    }

    #[test]
    fn lowest_kind_priority_wins_regardless_of_insertion_order() {
        let mut registry = CommandRegistry::new();
        registry.register(sig("help", CommandKind::User), noop_handler()).unwrap();
        registry.register(sig("help", CommandKind::Builtin), noop_handler()).unwrap();
        assert_eq!(registry.get("help").unwrap().kind, CommandKind::Builtin);
    }

    #[test]
    fn higher_priority_registration_is_ignored() {
        let mut registry = CommandRegistry::new();
        registry.register(sig("help", CommandKind::Builtin), noop_handler()).unwrap();
        registry.register(sig("help", CommandKind::User), noop_handler()).unwrap();
        assert_eq!(registry.get("help").unwrap().kind, CommandKind::Builtin);
    }

    #[test]
    fn equal_priority_conflict_is_signalled() {
        let mut registry = CommandRegistry::new();
        registry.register(sig("help", CommandKind::Plugin), noop_handler()).unwrap();
        let err = registry.register(sig("help", CommandKind::Plugin), noop_handler()).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));
    }

    #[test]
    fn lookup_resolves_through_alias() {
        let mut registry = CommandRegistry::new();
        let signature = sig("history", CommandKind::Builtin).with_alias("hist");
        registry.register(signature, noop_handler()).unwrap();
        assert_eq!(registry.get("hist").unwrap().name, "history");
        assert!(registry.get_handler("hist").is_some());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut registry = CommandRegistry::new();
        registry.register(sig("login", CommandKind::Builtin), noop_handler()).unwrap();
        registry.register(sig("logout", CommandKind::Builtin), noop_handler()).unwrap();
        let found = registry.search("LOG");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn unregister_removes_entry_and_indexes() {
        let mut registry = CommandRegistry::new();
        registry
            .register(sig("help", CommandKind::Builtin).with_alias("h"), noop_handler())
            .unwrap();
        assert!(registry.unregister("help"));
        assert!(registry.get("help").is_none());
        assert!(registry.get("h").is_none());
    }
}
