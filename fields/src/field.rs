//! The contract every configuration field implements.

use fieldwork_types::{FieldError, Value};

/// A typed, validated configuration slot.
///
/// `validate` turns raw input into the field's output type or rejects it.
/// Apart from capability-name fields (whose valid set lives in a registry),
/// validation depends only on the input and the field's own configuration.
pub trait Field {
    type Output;

    fn validate(&self, raw: &Value) -> Result<Self::Output, FieldError>;

    /// Human-readable description of accepted input, for help and errors.
    fn info(&self) -> String;

    fn allow_none(&self) -> bool {
        false
    }

    /// `validate`, plus the shared "absent" short-circuit.
    fn validate_optional(&self, raw: &Value) -> Result<Option<Self::Output>, FieldError> {
        if raw.is_none() {
            return if self.allow_none() {
                Ok(None)
            } else {
                Err(FieldError::invalid(self.info(), raw))
            };
        }
        self.validate(raw).map(Some)
    }

    /// Parse a command-line string into raw input for this field.
    fn from_literal(&self, text: &str) -> Value {
        Value::parse_literal(text)
    }

    /// Called on assignment with the value being replaced, so live state
    /// attached to it can move over to the new value.
    fn carry_over(&self, _previous: &Self::Output, _next: &mut Self::Output) {}

    /// Value a fresh setting starts with.
    fn default_value(&self) -> Option<Self::Output> {
        None
    }
}

/// Makes any field accept `None`, producing `Option<F::Output>`.
///
/// Used where the absent value must be a value in its own right, such as one
/// rule of a per-entity parameter switching a feature off for some entities.
#[derive(Debug, Clone)]
pub struct Nullable<F>(pub F);

impl<F: Field> Field for Nullable<F> {
    type Output = Option<F::Output>;

    fn validate(&self, raw: &Value) -> Result<Self::Output, FieldError> {
        if raw.is_none() {
            return Ok(None);
        }
        self.0.validate(raw).map(Some)
    }

    fn info(&self) -> String {
        format!("{} or None", self.0.info())
    }

    fn allow_none(&self) -> bool {
        true
    }

    fn from_literal(&self, text: &str) -> Value {
        self.0.from_literal(text)
    }

    fn carry_over(&self, previous: &Self::Output, next: &mut Self::Output) {
        if let (Some(previous), Some(next)) = (previous, next) {
            self.0.carry_over(previous, next);
        }
    }

    fn default_value(&self) -> Option<Self::Output> {
        self.0.default_value().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::FloatField;

    #[test]
    fn validate_optional_rejects_none_by_default() {
        let field = FloatField::new();
        let err = field.validate_optional(&Value::None).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn validate_optional_short_circuits_when_allowed() {
        let field = FloatField::new().allow_none(true);
        assert_eq!(field.validate_optional(&Value::None).unwrap(), None);
        assert_eq!(
            field.validate_optional(&Value::Float(1.5)).unwrap(),
            Some(1.5)
        );
    }

    #[test]
    fn nullable_turns_none_into_a_value() {
        let field = Nullable(FloatField::new());
        assert_eq!(field.validate(&Value::None).unwrap(), None);
        assert_eq!(field.validate(&Value::Int(3)).unwrap(), Some(3.0));
        assert_eq!(field.info(), "a float or None");
    }

    #[test]
    fn nullable_keeps_the_inner_default_and_binding() {
        use crate::Setting;
        use crate::per_entity::{InMemoryCatalog, PerEntityParameter};
        use std::sync::Arc;

        let field = Nullable(PerEntityParameter::float(1.0).unwrap());
        assert!(matches!(field.default_value(), Some(Some(_))));

        let mut setting = Setting::new("pedestal_offset", field);
        let catalog = Arc::new(InMemoryCatalog::new().with_type("LST_X", [7u32]));
        setting
            .value_mut()
            .and_then(Option::as_mut)
            .unwrap()
            .attach(catalog);

        setting.set(2.5).unwrap();
        let set = setting.value().and_then(Option::as_ref).unwrap();
        assert!(set.is_bound());
        assert_eq!(set.by_id(7u32), Ok(&2.5));
    }
}
