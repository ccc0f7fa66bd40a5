use std::sync::Arc;

use fieldwork_types::{EntityId, EntityKey, LookupError};

use super::catalog::EntityCatalog;
use super::resolver::{BindingWarning, Resolver};
use super::rule::{Rule, Selector, TypePattern};

/// The stored value of a per-entity parameter: ordered rules plus the
/// resolver built from them.
///
/// Equality compares rules only; binding state is not part of the value.
#[derive(Debug, Clone)]
pub struct RuleSet<T> {
    rules: Vec<Rule<T>>,
    resolver: Resolver<T>,
}

impl<T: Clone> RuleSet<T> {
    #[must_use]
    pub fn new(rules: Vec<Rule<T>>) -> Self {
        Self {
            rules,
            resolver: Resolver::new(),
        }
    }

    /// A single `*` rule applying `value` everywhere.
    #[must_use]
    pub fn scalar(value: T) -> Self {
        Self::new(vec![Rule {
            selector: Selector::Type(TypePattern::wildcard()),
            value,
        }])
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    /// Append a rule. A bound set is re-resolved against its catalog.
    pub fn push(&mut self, rule: Rule<T>) {
        self.rules.push(rule);
        if let Some(catalog) = self.catalog().cloned() {
            self.resolver.attach(&self.rules, catalog);
        }
    }

    pub fn attach(&mut self, catalog: Arc<dyn EntityCatalog>) -> Vec<BindingWarning> {
        self.resolver.attach(&self.rules, catalog)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<T> RuleSet<T> {
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.resolver.is_bound()
    }

    #[must_use]
    pub fn catalog(&self) -> Option<&Arc<dyn EntityCatalog>> {
        self.resolver.catalog()
    }

    #[must_use]
    pub fn warnings(&self) -> &[BindingWarning] {
        self.resolver.warnings()
    }

    pub fn lookup(&self, key: Option<&EntityKey>) -> Result<&T, LookupError> {
        self.resolver.lookup(key)
    }

    pub fn global(&self) -> Result<&T, LookupError> {
        self.lookup(None)
    }

    pub fn by_id(&self, id: impl Into<EntityId>) -> Result<&T, LookupError> {
        self.lookup(Some(&EntityKey::Id(id.into())))
    }

    pub fn by_type(&self, type_name: &str) -> Result<&T, LookupError> {
        self.lookup(Some(&EntityKey::Type(type_name.to_string())))
    }
}

impl<T: PartialEq> PartialEq for RuleSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}
