use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use fieldwork_types::{EntityId, EntityKey, LookupError};

use super::catalog::EntityCatalog;
use super::rule::{Rule, Selector};

/// A type rule whose pattern matched no catalog type. Binding continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingWarning {
    /// Position of the rule in its rule set.
    pub rule_index: usize,
    pub pattern: String,
    pub known_types: Vec<String>,
}

impl fmt::Display for BindingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule {}: pattern '{}' matches no entity type (known: {:?})",
            self.rule_index, self.pattern, self.known_types
        )
    }
}

#[derive(Clone)]
struct Bound<T> {
    catalog: Arc<dyn EntityCatalog>,
    known_types: Vec<String>,
    global_default: Option<T>,
    id_map: HashMap<EntityId, T>,
    type_map: HashMap<String, T>,
    warnings: Vec<BindingWarning>,
}

/// Lookup tables built by replaying rules against a catalog.
#[derive(Clone)]
pub struct Resolver<T> {
    bound: Option<Bound<T>>,
}

impl<T> Default for Resolver<T> {
    fn default() -> Self {
        Self { bound: None }
    }
}

impl<T: Clone> Resolver<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every table from `rules`, replacing any previous binding.
    ///
    /// Rules apply in order and a later rule overwrites whatever an earlier
    /// one set, so `[(id 5, a), (type *, b)]` resolves entity 5 to `b`.
    pub fn attach(&mut self, rules: &[Rule<T>], catalog: Arc<dyn EntityCatalog>) -> Vec<BindingWarning> {
        let known_types = catalog.known_types();
        let mut global_default = None;
        let mut id_map = HashMap::new();
        let mut type_map = HashMap::new();
        let mut warnings = Vec::new();

        for (index, rule) in rules.iter().enumerate() {
            match &rule.selector {
                Selector::Type(pattern) => {
                    let matched: Vec<&String> =
                        known_types.iter().filter(|t| pattern.is_match(t)).collect();
                    tracing::debug!(rule = index, %pattern, matched = matched.len(), "binding type rule");

                    // `*` is the global default even against an empty catalog.
                    if pattern.matches_all() {
                        global_default = Some(rule.value.clone());
                    }
                    if matched.is_empty() {
                        warnings.push(BindingWarning {
                            rule_index: index,
                            pattern: pattern.to_string(),
                            known_types: known_types.clone(),
                        });
                        continue;
                    }
                    for type_name in matched {
                        type_map.insert(type_name.clone(), rule.value.clone());
                        for id in catalog.members_of(type_name) {
                            id_map.insert(id, rule.value.clone());
                        }
                    }
                }
                Selector::Id(id) => {
                    id_map.insert(*id, rule.value.clone());
                }
            }
        }

        self.bound = Some(Bound {
            catalog,
            known_types,
            global_default,
            id_map,
            type_map,
            warnings: warnings.clone(),
        });
        warnings
    }
}

impl<T> Resolver<T> {
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    #[must_use]
    pub fn catalog(&self) -> Option<&Arc<dyn EntityCatalog>> {
        self.bound.as_ref().map(|b| &b.catalog)
    }

    /// Warnings from the most recent `attach`.
    #[must_use]
    pub fn warnings(&self) -> &[BindingWarning] {
        self.bound.as_ref().map_or(&[], |b| &b.warnings)
    }

    /// `None` asks for the global default.
    pub fn lookup(&self, key: Option<&EntityKey>) -> Result<&T, LookupError> {
        let bound = self.bound.as_ref().ok_or(LookupError::NotBound)?;
        match key {
            None => bound.global_default.as_ref().ok_or(LookupError::NoDefault),
            Some(EntityKey::Id(id)) => bound
                .id_map
                .get(id)
                .ok_or_else(|| LookupError::UnresolvedEntity(EntityKey::Id(*id))),
            Some(EntityKey::Type(name)) => {
                if !bound.known_types.iter().any(|t| t == name) {
                    return Err(LookupError::UnknownType {
                        name: name.clone(),
                        known: bound.known_types.clone(),
                    });
                }
                bound
                    .type_map
                    .get(name)
                    .ok_or_else(|| LookupError::UnresolvedEntity(EntityKey::Type(name.clone())))
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bound {
            None => f.write_str("Resolver(unbound)"),
            Some(bound) => f
                .debug_struct("Resolver")
                .field("known_types", &bound.known_types)
                .field("global_default", &bound.global_default)
                .field("id_map", &bound.id_map)
                .field("type_map", &bound.type_map)
                .finish_non_exhaustive(),
        }
    }
}
