use fieldwork_fields::{Field, Setting};
use fieldwork_types::Value;

use crate::{ConfigError, FieldworkConfig};

/// The `[components.<name>]` section of a configuration, possibly absent.
#[derive(Debug, Clone, Copy)]
pub struct ComponentConfig<'a> {
    name: &'a str,
    table: Option<&'a toml::Table>,
}

impl FieldworkConfig {
    #[must_use]
    pub fn component<'a>(&'a self, name: &'a str) -> ComponentConfig<'a> {
        ComponentConfig {
            name,
            table: self.components.get(name),
        }
    }
}

impl<'a> ComponentConfig<'a> {
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.table.is_some()
    }

    /// Keys set in this section.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.table
            .into_iter()
            .flat_map(|table| table.keys().map(String::as_str))
    }

    /// The raw value under `key`, converted for field validation.
    pub fn raw(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        let Some(value) = self.table.and_then(|table| table.get(key)) else {
            return Ok(None);
        };
        Value::try_from(value.clone())
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                key: format!("components.{}.{key}", self.name),
                message: e.to_string(),
            })
    }

    /// Assign the value stored under the setting's name, if there is one.
    /// Returns whether the setting was changed.
    pub fn apply<F: Field>(&self, setting: &mut Setting<F>) -> Result<bool, ConfigError> {
        let Some(raw) = self.raw(setting.name())? else {
            return Ok(false);
        };
        tracing::debug!(component = self.name, setting = setting.name(), "applying configured value");
        setting.set(raw).map_err(|source| ConfigError::Field {
            component: self.name.to_string(),
            setting: setting.name().to_string(),
            source,
        })?;
        Ok(true)
    }
}
