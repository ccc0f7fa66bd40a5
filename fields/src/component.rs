//! Fields naming an implementation of a capability.

use std::sync::Arc;

use fieldwork_types::{FieldError, Value};

use crate::capability::CapabilityRegistry;
use crate::scalar::EnumField;
use crate::{Field, Setting};

/// The name of one registered implementation of `capability`.
///
/// The valid set is queried from the registry on every call, never cached:
/// validating the same name before and after a registration may differ.
#[derive(Debug, Clone)]
pub struct CapabilityName {
    capability: String,
    registry: Arc<CapabilityRegistry>,
    allow_none: bool,
}

impl CapabilityName {
    /// Bound to the process-wide registry.
    pub fn new(capability: impl Into<String>) -> Self {
        Self::with_registry(capability, CapabilityRegistry::global())
    }

    pub fn with_registry(capability: impl Into<String>, registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            capability: capability.into(),
            registry,
            allow_none: false,
        }
    }

    #[must_use]
    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }

    #[must_use]
    pub fn capability(&self) -> &str {
        &self.capability
    }

    fn check(&self, raw: &Value) -> Result<String, FieldError> {
        let Some(name) = raw.to_text() else {
            return Err(FieldError::invalid(self.info(), raw));
        };
        if self.registry.contains(&self.capability, &name) {
            Ok(name.into_owned())
        } else {
            Err(FieldError::validation(format!(
                "'{name}' is not a known {}; expected any of {:?}",
                self.capability,
                self.registry.implementations_of(&self.capability)
            )))
        }
    }
}

impl Field for CapabilityName {
    type Output = String;

    fn validate(&self, raw: &Value) -> Result<String, FieldError> {
        self.check(raw)
    }

    fn info(&self) -> String {
        let mut info = format!(
            "any of {:?}",
            self.registry.implementations_of(&self.capability)
        );
        if self.allow_none {
            info += " or None";
        }
        info
    }

    fn allow_none(&self) -> bool {
        self.allow_none
    }

    fn from_literal(&self, text: &str) -> Value {
        if text == "None" {
            Value::None
        } else {
            Value::Str(text.trim().to_string())
        }
    }
}

/// An ordered list of implementation names, each checked like
/// [`CapabilityName`].
#[derive(Debug, Clone)]
pub struct CapabilityNameList {
    element: CapabilityName,
    allow_none: bool,
}

impl CapabilityNameList {
    pub fn new(capability: impl Into<String>) -> Self {
        Self::with_registry(capability, CapabilityRegistry::global())
    }

    pub fn with_registry(capability: impl Into<String>, registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            element: CapabilityName::with_registry(capability, registry),
            allow_none: false,
        }
    }

    #[must_use]
    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }
}

impl Field for CapabilityNameList {
    type Output = Vec<String>;

    fn validate(&self, raw: &Value) -> Result<Vec<String>, FieldError> {
        let Some(items) = raw.as_list() else {
            return Err(FieldError::invalid(self.info(), raw));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.element
                    .check(item)
                    .map_err(|e| e.with_context(format!("element {i}")))
            })
            .collect()
    }

    fn info(&self) -> String {
        let mut info = format!("a list of {}", self.element.info());
        if self.allow_none {
            info += " or None";
        }
        info
    }

    fn allow_none(&self) -> bool {
        self.allow_none
    }

    /// A JSON list, or comma-separated bare names.
    fn from_literal(&self, text: &str) -> Value {
        match Value::parse_literal(text) {
            list @ (Value::List(_) | Value::None) => list,
            _ => Value::List(
                text.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(Value::from)
                    .collect(),
            ),
        }
    }
}

impl EnumField {
    /// Case-insensitive choice among the implementations registered for
    /// `capability` at the time of the call. Later registrations are not
    /// seen; [`CapabilityName`] follows the registry live.
    #[must_use]
    pub fn from_capability(registry: &CapabilityRegistry, capability: &str) -> Self {
        EnumField::new(registry.implementations_of(capability)).case_insensitive(true)
    }
}

/// A setting choosing one implementation of `capability`, starting at
/// `default` and documented as "`<capability>` to use.".
///
/// Fails when `default` is not registered under exactly that name.
pub fn capability_choice(
    name: impl Into<String>,
    registry: &CapabilityRegistry,
    capability: &str,
    default: &str,
) -> Result<Setting<EnumField>, FieldError> {
    let name = name.into();
    let field = EnumField::from_capability(registry, capability);
    if !field.choices().iter().any(|choice| choice == default) {
        return Err(FieldError::validation(format!(
            "default '{default}' is not a known {capability}; expected any of {:?}",
            field.choices()
        ))
        .with_context(&name));
    }
    Ok(Setting::with_default(name, field, default)?.with_help(format!("{capability} to use.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Implementation;

    fn registry() -> Arc<CapabilityRegistry> {
        let registry = Arc::new(CapabilityRegistry::new());
        registry.register("cleaner", Implementation::new("Tailcuts"));
        registry.register("cleaner", Implementation::new("Mars"));
        registry
    }

    #[test]
    fn validation_follows_live_registry() {
        let registry = registry();
        let field = CapabilityName::with_registry("cleaner", Arc::clone(&registry));
        let raw = Value::Str("Fact".into());

        let err = field.validate(&raw).unwrap_err();
        assert!(err.to_string().contains("[\"Mars\", \"Tailcuts\"]"));

        registry.register("cleaner", Implementation::new("Fact"));
        assert_eq!(field.validate(&raw).unwrap(), "Fact");

        registry.unregister("cleaner", "Fact");
        assert!(field.validate(&raw).is_err());
    }

    #[test]
    fn info_is_computed_on_demand() {
        let registry = registry();
        let field = CapabilityName::with_registry("cleaner", Arc::clone(&registry)).allow_none(true);
        assert_eq!(field.info(), "any of [\"Mars\", \"Tailcuts\"] or None");

        registry.register("cleaner", Implementation::new("Fact"));
        assert_eq!(
            field.info(),
            "any of [\"Fact\", \"Mars\", \"Tailcuts\"] or None"
        );
    }

    #[test]
    fn list_preserves_order_and_names_bad_element() {
        let field = CapabilityNameList::with_registry("cleaner", registry());
        let raw = Value::from(vec!["Tailcuts", "Mars"]);
        assert_eq!(field.validate(&raw).unwrap(), vec!["Tailcuts", "Mars"]);

        let err = field
            .validate(&Value::from(vec!["Mars", "Nope"]))
            .unwrap_err();
        assert!(err.to_string().starts_with("element 1: 'Nope'"));
    }

    #[test]
    fn capability_choice_starts_at_a_registered_default() {
        let registry = registry();
        let mut setting = capability_choice("cleaner_type", &registry, "cleaner", "Tailcuts").unwrap();
        assert_eq!(setting.value().map(String::as_str), Some("Tailcuts"));
        assert_eq!(
            setting.help(),
            "cleaner to use. Accepts any of [\"Mars\", \"Tailcuts\"] (case-insensitive)"
        );

        setting.set("mars").unwrap();
        assert_eq!(setting.value().map(String::as_str), Some("Mars"));
        assert!(setting.set("Fact").is_err());
    }

    #[test]
    fn capability_choice_rejects_an_unregistered_default() {
        let registry = registry();
        let err = capability_choice("cleaner_type", &registry, "cleaner", "Fact").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cleaner_type: default 'Fact' is not a known cleaner; expected any of [\"Mars\", \"Tailcuts\"]"
        );
        assert!(capability_choice("cleaner_type", &registry, "cleaner", "tailcuts").is_err());
    }

    #[test]
    fn from_capability_is_a_snapshot() {
        let registry = registry();
        let field = EnumField::from_capability(&registry, "cleaner");
        registry.register("cleaner", Implementation::new("Fact"));
        assert_eq!(field.choices(), ["Mars", "Tailcuts"]);
        assert!(field.validate(&Value::Str("Fact".into())).is_err());
    }

    #[test]
    fn list_literal_accepts_comma_separated_names() {
        let field = CapabilityNameList::with_registry("cleaner", registry());
        assert_eq!(
            field.from_literal("Tailcuts, Mars"),
            Value::from(vec!["Tailcuts", "Mars"])
        );
        assert_eq!(
            field.from_literal(r#"["Mars"]"#),
            Value::from(vec!["Mars"])
        );
    }
}
