use fieldwork_types::{FieldError, Value};

use crate::Field;

/// A named field together with its current value.
///
/// Assignments validate eagerly. A rejected assignment leaves the previous
/// value untouched.
#[derive(Debug, Clone)]
pub struct Setting<F: Field> {
    name: String,
    help: String,
    field: F,
    value: Option<F::Output>,
}

impl<F: Field> Setting<F> {
    /// Starts from the field's own default, if it has one.
    pub fn new(name: impl Into<String>, field: F) -> Self {
        let value = field.default_value();
        Self {
            name: name.into(),
            help: String::new(),
            field,
            value,
        }
    }

    /// Starts from `default`, validated now.
    pub fn with_default(name: impl Into<String>, field: F, default: impl Into<Value>) -> Result<Self, FieldError> {
        let mut setting = Self::new(name, field);
        setting.value = None;
        setting.set(default)?;
        Ok(setting)
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field(&self) -> &F {
        &self.field
    }

    /// `None` while unset.
    #[must_use]
    pub fn value(&self) -> Option<&F::Output> {
        self.value.as_ref()
    }

    pub fn value_mut(&mut self) -> Option<&mut F::Output> {
        self.value.as_mut()
    }

    pub fn set(&mut self, raw: impl Into<Value>) -> Result<(), FieldError> {
        let mut next = self
            .field
            .validate_optional(&raw.into())
            .map_err(|e| e.with_context(&self.name))?;
        if let (Some(previous), Some(next)) = (&self.value, &mut next) {
            self.field.carry_over(previous, next);
        }
        self.value = next;
        Ok(())
    }

    /// Assign from a command-line string.
    pub fn set_from_str(&mut self, text: &str) -> Result<(), FieldError> {
        let raw = self.field.from_literal(text);
        self.set(raw)
    }

    /// Help text followed by a live description of accepted values.
    #[must_use]
    pub fn help(&self) -> String {
        if self.help.is_empty() {
            self.field.info()
        } else {
            format!("{}. Accepts {}", self.help.trim_end_matches('.'), self.field.info())
        }
    }
}
