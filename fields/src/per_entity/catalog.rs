use std::collections::BTreeMap;

use fieldwork_types::EntityId;
use serde::{Deserialize, Serialize};

/// The collection of entities a per-entity parameter is resolved against.
///
/// Resolvers take a snapshot: they call these methods during `attach` only.
pub trait EntityCatalog: Send + Sync {
    fn known_types(&self) -> Vec<String>;

    /// Members of `type_name` in catalog order; empty for unknown types.
    fn members_of(&self, type_name: &str) -> Vec<EntityId>;
}

/// Catalog held in memory as `type -> [ids]`.
///
/// Deserializes from a plain table, e.g. `{"LST_LST_LSTCam": [1, 2, 3, 4]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryCatalog {
    types: BTreeMap<String, Vec<EntityId>>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type<I>(mut self, type_name: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<EntityId>,
    {
        self.insert(type_name, ids);
        self
    }

    /// Add or replace a type and its members.
    pub fn insert<I>(&mut self, type_name: impl Into<String>, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<EntityId>,
    {
        self.types
            .insert(type_name.into(), ids.into_iter().map(Into::into).collect());
    }
}

impl EntityCatalog for InMemoryCatalog {
    fn known_types(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    fn members_of(&self, type_name: &str) -> Vec<EntityId> {
        self.types.get(type_name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_plain_table() {
        let catalog: InMemoryCatalog =
            serde_json::from_str(r#"{"MST_Y": [9], "LST_X": [7, 8]}"#).unwrap();
        assert_eq!(catalog.known_types(), vec!["LST_X", "MST_Y"]);
        assert_eq!(
            catalog.members_of("LST_X"),
            vec![EntityId::new(7), EntityId::new(8)]
        );
        assert!(catalog.members_of("SST").is_empty());
    }
}
