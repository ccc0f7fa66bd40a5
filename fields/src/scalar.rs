//! Scalar element fields: float, integer, bool, text, enumeration.

use std::fmt::Display;

use fieldwork_types::{FieldError, Value};

use crate::Field;

fn range_info<T: Display>(min: Option<&T>, max: Option<&T>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!(" in [{lo}, {hi}]"),
        (Some(lo), None) => format!(" >= {lo}"),
        (None, Some(hi)) => format!(" <= {hi}"),
        (None, None) => String::new(),
    }
}

fn check_range<T: PartialOrd + Display>(
    value: T,
    min: Option<&T>,
    max: Option<&T>,
) -> Result<T, FieldError> {
    if let Some(lo) = min
        && value < *lo
    {
        return Err(FieldError::validation(format!(
            "value {value} is less than the minimum {lo}"
        )));
    }
    if let Some(hi) = max
        && value > *hi
    {
        return Err(FieldError::validation(format!(
            "value {value} is greater than the maximum {hi}"
        )));
    }
    Ok(value)
}

fn none_suffix(allow_none: bool) -> &'static str {
    if allow_none { " or None" } else { "" }
}

#[derive(Debug, Clone, Default)]
pub struct FloatField {
    min: Option<f64>,
    max: Option<f64>,
    allow_none: bool,
}

impl FloatField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }
}

impl Field for FloatField {
    type Output = f64;

    fn validate(&self, raw: &Value) -> Result<f64, FieldError> {
        let value = match raw {
            Value::Float(x) => *x,
            Value::Int(i) => *i as f64,
            _ => return Err(FieldError::invalid(self.info(), raw)),
        };
        check_range(value, self.min.as_ref(), self.max.as_ref())
    }

    fn info(&self) -> String {
        format!(
            "a float{}{}",
            range_info(self.min.as_ref(), self.max.as_ref()),
            none_suffix(self.allow_none)
        )
    }

    fn allow_none(&self) -> bool {
        self.allow_none
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntField {
    min: Option<i64>,
    max: Option<i64>,
    allow_none: bool,
}

impl IntField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }
}

impl Field for IntField {
    type Output = i64;

    fn validate(&self, raw: &Value) -> Result<i64, FieldError> {
        let value = match raw {
            Value::Int(i) => *i,
            // TOML/JSON writers sometimes emit integral values as floats.
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64 => {
                *x as i64
            }
            _ => return Err(FieldError::invalid(self.info(), raw)),
        };
        check_range(value, self.min.as_ref(), self.max.as_ref())
    }

    fn info(&self) -> String {
        format!(
            "an int{}{}",
            range_info(self.min.as_ref(), self.max.as_ref()),
            none_suffix(self.allow_none)
        )
    }

    fn allow_none(&self) -> bool {
        self.allow_none
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoolField {
    allow_none: bool,
}

impl BoolField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }
}

impl Field for BoolField {
    type Output = bool;

    fn validate(&self, raw: &Value) -> Result<bool, FieldError> {
        match raw {
            Value::Bool(b) => Ok(*b),
            _ => Err(FieldError::invalid(self.info(), raw)),
        }
    }

    fn info(&self) -> String {
        format!("a boolean{}", none_suffix(self.allow_none))
    }

    fn allow_none(&self) -> bool {
        self.allow_none
    }

    fn from_literal(&self, text: &str) -> Value {
        match text.trim() {
            "True" => Value::Bool(true),
            "False" => Value::Bool(false),
            other => Value::parse_literal(other),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextField {
    allow_none: bool,
}

impl TextField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }
}

impl Field for TextField {
    type Output = String;

    fn validate(&self, raw: &Value) -> Result<String, FieldError> {
        match raw {
            Value::Str(_) | Value::Bytes(_) => raw
                .to_text()
                .map(|text| text.into_owned())
                .ok_or_else(|| FieldError::invalid(self.info(), raw)),
            _ => Err(FieldError::invalid(self.info(), raw)),
        }
    }

    fn info(&self) -> String {
        format!("a unicode string{}", none_suffix(self.allow_none))
    }

    fn allow_none(&self) -> bool {
        self.allow_none
    }

    // Text is taken verbatim; "3" stays the string "3".
    fn from_literal(&self, text: &str) -> Value {
        Value::Str(text.to_string())
    }
}

/// Text restricted to a fixed set of choices.
///
/// Returns the canonical spelling of the matched choice, which matters when
/// matching case-insensitively.
#[derive(Debug, Clone)]
pub struct EnumField {
    choices: Vec<String>,
    case_insensitive: bool,
    allow_none: bool,
}

impl EnumField {
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
            case_insensitive: false,
            allow_none: false,
        }
    }

    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl Field for EnumField {
    type Output = String;

    fn validate(&self, raw: &Value) -> Result<String, FieldError> {
        let text = raw
            .to_text()
            .ok_or_else(|| FieldError::invalid(self.info(), raw))?;
        self.choices
            .iter()
            .find(|choice| {
                if self.case_insensitive {
                    choice.eq_ignore_ascii_case(&text)
                } else {
                    **choice == *text
                }
            })
            .cloned()
            .ok_or_else(|| FieldError::invalid(self.info(), raw))
    }

    fn info(&self) -> String {
        let case = if self.case_insensitive {
            " (case-insensitive)"
        } else {
            ""
        };
        format!(
            "any of {:?}{case}{}",
            self.choices,
            none_suffix(self.allow_none)
        )
    }

    fn allow_none(&self) -> bool {
        self.allow_none
    }

    fn from_literal(&self, text: &str) -> Value {
        Value::Str(text.trim().to_string())
    }
}
