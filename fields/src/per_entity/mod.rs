//! Per-entity parameters: one configured value that may differ per entity.
//!
//! A parameter is written either as a single scalar, applying to every
//! entity, or as an ordered list of `(selector, argument, value)` rules:
//!
//! ```text
//! [["type", "*", 5.0], ["type", "LST_*", 4.0], ["id", 12, 3.0]]
//! ```
//!
//! `type` rules match entity type names with a case-sensitive glob; `id`
//! rules name one entity. The list is validated eagerly into a [`RuleSet`],
//! which is later attached to an [`EntityCatalog`] and queried by id, by type,
//! or for the global default. Rules apply strictly in list order: a later rule
//! overwrites anything an earlier one set, whatever the selectors involved.

mod catalog;
mod resolver;
mod rule;
mod rule_set;

use fieldwork_types::{EntityId, FieldError, Value};

use crate::Field;
use crate::scalar::{BoolField, FloatField, IntField};

pub use catalog::{EntityCatalog, InMemoryCatalog};
pub use resolver::{BindingWarning, Resolver};
pub use rule::{Rule, Selector, TypePattern};
pub use rule_set::RuleSet;

/// Raw per-entity input before validation: one scalar, or a rule list.
#[derive(Debug, Clone, PartialEq)]
pub enum RawParameter {
    Scalar(Value),
    Rules(Vec<RawRule>),
}

/// One unvalidated `(selector, argument, value)` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRule {
    pub selector: String,
    pub argument: Value,
    pub value: Value,
}

impl RawRule {
    pub fn new(selector: impl Into<String>, argument: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self {
            selector: selector.into(),
            argument: argument.into(),
            value: value.into(),
        }
    }
}

impl TryFrom<&Value> for RawParameter {
    type Error = FieldError;

    /// Any list is read as a rule list; everything else is a scalar.
    fn try_from(raw: &Value) -> Result<Self, FieldError> {
        let Value::List(items) = raw else {
            return Ok(RawParameter::Scalar(raw.clone()));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item.as_list() {
                Some([Value::Str(selector), argument, value]) => Ok(RawRule {
                    selector: selector.clone(),
                    argument: argument.clone(),
                    value: value.clone(),
                }),
                Some([selector, _, _]) => Err(FieldError::validation(format!(
                    "rule {i}: selector must be 'type' or 'id', got {} {selector}",
                    selector.kind()
                ))),
                _ => Err(FieldError::invalid(
                    format!("rule {i} to be a (selector, argument, value) triple"),
                    item,
                )),
            })
            .collect::<Result<_, _>>()
            .map(RawParameter::Rules)
    }
}

impl From<RawParameter> for Value {
    fn from(raw: RawParameter) -> Self {
        match raw {
            RawParameter::Scalar(value) => value,
            RawParameter::Rules(rules) => Value::List(
                rules
                    .into_iter()
                    .map(|rule| Value::List(vec![Value::Str(rule.selector), rule.argument, rule.value]))
                    .collect(),
            ),
        }
    }
}

fn entity_id(argument: &Value) -> Result<EntityId, FieldError> {
    let id = match argument {
        Value::Int(i) => u32::try_from(*i).ok(),
        Value::Float(x) if x.is_finite() && x.fract() == 0.0 && *x >= 0.0 && *x <= f64::from(u32::MAX) => {
            Some(*x as u32)
        }
        Value::Str(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    id.map(EntityId::new)
        .ok_or_else(|| FieldError::invalid("a non-negative integer entity id", argument))
}

/// A field whose value is a [`RuleSet`] of `F` values.
#[derive(Debug, Clone)]
pub struct PerEntityParameter<F: Field> {
    inner: F,
    default: Option<RuleSet<F::Output>>,
}

impl<F> PerEntityParameter<F>
where
    F: Field,
    F::Output: Clone,
{
    /// Validates `default` (scalar or rule list) immediately.
    pub fn new(inner: F, default: impl Into<Value>) -> Result<Self, FieldError> {
        let mut param = Self::without_default(inner);
        param.default = Some(param.validate(&default.into())?);
        Ok(param)
    }

    pub fn without_default(inner: F) -> Self {
        Self {
            inner,
            default: None,
        }
    }

    #[must_use]
    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Validate every rule value through the inner field and build a fresh,
    /// unbound rule set.
    pub fn normalize(&self, raw: RawParameter) -> Result<RuleSet<F::Output>, FieldError> {
        let raw_rules = match raw {
            RawParameter::Scalar(value) => vec![RawRule::new("type", "*", value)],
            RawParameter::Rules(rules) => rules,
        };

        let rules = raw_rules
            .iter()
            .enumerate()
            .map(|(i, raw)| self.normalize_rule(raw).map_err(|e| e.with_context(format!("rule {i}"))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleSet::new(rules))
    }

    fn normalize_rule(&self, raw: &RawRule) -> Result<Rule<F::Output>, FieldError> {
        let value = self.inner.validate(&raw.value)?;
        match raw.selector.as_str() {
            "type" => {
                let pattern = raw
                    .argument
                    .as_str()
                    .ok_or_else(|| FieldError::invalid("a type name pattern", &raw.argument))?;
                Rule::for_type(pattern, value)
            }
            "id" => Ok(Rule::for_id(entity_id(&raw.argument)?, value)),
            other => Err(FieldError::validation(format!(
                "selector must be 'type' or 'id', got '{other}'"
            ))),
        }
    }
}

impl PerEntityParameter<FloatField> {
    pub fn float(default: impl Into<Value>) -> Result<Self, FieldError> {
        Self::new(FloatField::new(), default)
    }
}

impl PerEntityParameter<IntField> {
    pub fn int(default: impl Into<Value>) -> Result<Self, FieldError> {
        Self::new(IntField::new(), default)
    }
}

impl PerEntityParameter<BoolField> {
    pub fn bool(default: impl Into<Value>) -> Result<Self, FieldError> {
        Self::new(BoolField::new(), default)
    }
}

impl<F> Field for PerEntityParameter<F>
where
    F: Field,
    F::Output: Clone,
{
    type Output = RuleSet<F::Output>;

    fn validate(&self, raw: &Value) -> Result<Self::Output, FieldError> {
        self.normalize(RawParameter::try_from(raw)?)
    }

    fn info(&self) -> String {
        format!(
            "a value or list of (type|id, argument, value) rules, where each value is {}",
            self.inner.info()
        )
    }

    /// A per-entity value is never unset: `None` is a scalar like any other
    /// and becomes a `*` rule when the inner field accepts it.
    fn validate_optional(&self, raw: &Value) -> Result<Option<Self::Output>, FieldError> {
        self.validate(raw).map(Some)
    }

    fn from_literal(&self, text: &str) -> Value {
        match Value::parse_literal(text) {
            list @ Value::List(_) => list,
            _ => self.inner.from_literal(text),
        }
    }

    /// Keep the catalog binding of the value being replaced.
    fn carry_over(&self, previous: &Self::Output, next: &mut Self::Output) {
        if let Some(catalog) = previous.catalog() {
            tracing::debug!(rules = next.len(), "rebinding reassigned per-entity value");
            next.attach(std::sync::Arc::clone(catalog));
        }
    }

    fn default_value(&self) -> Option<Self::Output> {
        self.default.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Nullable;
    use fieldwork_types::LookupError;
    use std::sync::Arc;

    fn lst_mst() -> Arc<dyn EntityCatalog> {
        Arc::new(
            InMemoryCatalog::new()
                .with_type("LST_X", [7u32])
                .with_type("MST_Y", [9u32]),
        )
    }

    fn rules(value: &str) -> Value {
        Value::parse_literal(value)
    }

    #[test]
    fn scalar_becomes_wildcard_rule() {
        let param = PerEntityParameter::float(2.5).unwrap();
        let set = param.default_value().unwrap();
        assert_eq!(set, RuleSet::new(vec![Rule::for_type("*", 2.5).unwrap()]));
    }

    #[test]
    fn rule_values_go_through_inner_field() {
        let param = PerEntityParameter::new(FloatField::new().min(0.0), 1.0).unwrap();
        let err = param
            .validate(&rules(r#"[["type", "*", 1.0], ["id", 3, -2.0]]"#))
            .unwrap_err();
        assert!(err.to_string().starts_with("rule 1: value -2 is less than"));
    }

    #[test]
    fn bad_selectors_and_arguments_are_rejected() {
        let param = PerEntityParameter::float(1.0).unwrap();
        for bad in [
            r#"[["tel", "*", 1.0]]"#,
            r#"[["type", 3, 1.0]]"#,
            r#"[["id", -1, 1.0]]"#,
            r#"[["id", 1.5, 1.0]]"#,
            r#"[["id", 1]]"#,
            r#"[[1, 2, 3.0]]"#,
            r#"[["type", "LST[", 1.0]]"#,
        ] {
            let err = param.validate(&rules(bad)).unwrap_err();
            assert!(err.is_validation(), "{bad}: {err}");
        }
    }

    #[test]
    fn id_arguments_coerce() {
        let param = PerEntityParameter::int(0).unwrap();
        let set = param
            .validate(&rules(r#"[["id", 4.0, 1], ["id", "5", 2]]"#))
            .unwrap();
        assert_eq!(
            set.rules(),
            &[Rule::for_id(4u32, 1), Rule::for_id(5u32, 2)]
        );
    }

    #[test]
    fn nullable_inner_allows_switching_off() {
        let param = PerEntityParameter::new(Nullable(FloatField::new()), Value::None).unwrap();
        let mut set = param
            .validate(&rules(r#"[["type", "*", null], ["type", "LST*", 3.0]]"#))
            .unwrap();
        set.attach(lst_mst());
        assert_eq!(set.by_id(9u32), Ok(&None));
        assert_eq!(set.by_id(7u32), Ok(&Some(3.0)));
    }

    #[test]
    fn carry_over_rebinds_to_previous_catalog() {
        let param = PerEntityParameter::float(1.0).unwrap();
        let mut previous = param.default_value().unwrap();
        previous.attach(lst_mst());

        let mut next = param.validate(&rules(r#"[["type", "MST*", 6.0]]"#)).unwrap();
        assert_eq!(next.by_id(9u32), Err(LookupError::NotBound));
        param.carry_over(&previous, &mut next);

        assert_eq!(next.by_id(9u32), Ok(&6.0));
        assert_eq!(next.global(), Err(LookupError::NoDefault));
    }

    #[test]
    fn from_literal_distinguishes_rules_from_scalars() {
        let param = PerEntityParameter::bool(false).unwrap();
        assert_eq!(param.from_literal("True"), Value::Bool(true));
        assert!(matches!(
            param.from_literal(r#"[["type", "*", true]]"#),
            Value::List(_)
        ));
    }

    #[test]
    fn raw_parameter_round_trips_through_value() {
        let raw = RawParameter::Rules(vec![RawRule::new("id", 3, 2.0)]);
        let value = Value::from(raw.clone());
        assert_eq!(RawParameter::try_from(&value).unwrap(), raw);
    }
}
