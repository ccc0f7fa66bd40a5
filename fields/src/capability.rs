//! Registry of capabilities and the implementations that provide them.
//!
//! A capability is an abstract role ("image cleaner", "reconstructor"); an
//! implementation is a concrete named provider of it. Registration is explicit
//! and may happen at any time, so readers always see the current set.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// One registered provider of a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Implementation {
    pub name: String,
    pub description: Option<String>,
}

impl Implementation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

type Table = BTreeMap<String, BTreeMap<String, Implementation>>;

#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    capabilities: RwLock<Table>,
}

static GLOBAL: OnceLock<Arc<CapabilityRegistry>> = OnceLock::new();

impl CapabilityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by fields that are not given one.
    pub fn global() -> Arc<CapabilityRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(CapabilityRegistry::new())))
    }

    /// Make a capability known without registering any implementation.
    pub fn declare(&self, capability: &str) {
        self.write().entry(capability.to_string()).or_default();
    }

    /// Register (or replace) an implementation. Returns the replaced entry.
    pub fn register(&self, capability: &str, implementation: Implementation) -> Option<Implementation> {
        tracing::debug!(capability, name = %implementation.name, "registering implementation");
        self.write()
            .entry(capability.to_string())
            .or_default()
            .insert(implementation.name.clone(), implementation)
    }

    pub fn unregister(&self, capability: &str, name: &str) -> Option<Implementation> {
        self.write()
            .get_mut(capability)
            .and_then(|names| names.remove(name))
    }

    /// Current implementation names, sorted. Unknown capabilities have none.
    #[must_use]
    pub fn implementations_of(&self, capability: &str) -> Vec<String> {
        self.read()
            .get(capability)
            .map(|names| names.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, capability: &str, name: &str) -> bool {
        self.read()
            .get(capability)
            .is_some_and(|names| names.contains_key(name))
    }

    #[must_use]
    pub fn describe(&self, capability: &str, name: &str) -> Option<Implementation> {
        self.read()
            .get(capability)
            .and_then(|names| names.get(name))
            .cloned()
    }

    #[must_use]
    pub fn capabilities(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    // A panic while holding the lock cannot leave the maps half-updated, so
    // poisoning is ignored.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Table> {
        self.capabilities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Table> {
        self.capabilities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_replaces_and_sorts() {
        let registry = CapabilityRegistry::new();
        registry.register("cleaner", Implementation::new("Tailcuts"));
        registry.register("cleaner", Implementation::new("Fact"));
        let previous = registry.register(
            "cleaner",
            Implementation::new("Tailcuts").with_description("two-threshold"),
        );

        assert_eq!(previous, Some(Implementation::new("Tailcuts")));
        assert_eq!(registry.implementations_of("cleaner"), vec!["Fact", "Tailcuts"]);
        assert_eq!(
            registry
                .describe("cleaner", "Tailcuts")
                .and_then(|i| i.description),
            Some("two-threshold".to_string())
        );
    }

    #[test]
    fn declared_capability_starts_empty() {
        let registry = CapabilityRegistry::new();
        registry.declare("reconstructor");
        assert_eq!(registry.capabilities(), vec!["reconstructor"]);
        assert!(registry.implementations_of("reconstructor").is_empty());
        assert!(registry.implementations_of("never-declared").is_empty());
    }

    #[test]
    fn unregister_removes_only_that_name() {
        let registry = CapabilityRegistry::new();
        registry.register("cleaner", Implementation::new("Tailcuts"));
        registry.register("cleaner", Implementation::new("Fact"));

        assert!(registry.unregister("cleaner", "Fact").is_some());
        assert!(registry.unregister("cleaner", "Fact").is_none());
        assert!(!registry.contains("cleaner", "Fact"));
        assert!(registry.contains("cleaner", "Tailcuts"));
    }

    #[test]
    fn global_is_shared() {
        let a = CapabilityRegistry::global();
        let b = CapabilityRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
