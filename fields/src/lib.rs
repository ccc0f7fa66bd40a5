//! Validated configuration fields for Fieldwork components.
//!
//! Every field implements [`Field`]: raw input in, a typed value or a
//! [`FieldError`] out. Fields are owned by [`Setting`] slots, which hold the
//! current value and validate every assignment eagerly.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`scalar`] | Float, integer, bool, text, and enumeration fields |
//! | [`time`] | ISO 8601 timestamps normalized to UTC |
//! | [`path`] | Local paths and `http(s)://`, `dataset://`, `file://` URIs |
//! | [`capability`] | Registry of capabilities and their implementations |
//! | [`component`] | Fields naming registered implementations |
//! | [`per_entity`] | Scalar-or-rule-list parameters resolved per entity |
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use fieldwork_fields::{InMemoryCatalog, PerEntityParameter, Setting};
//!
//! let mut threshold = Setting::new("threshold", PerEntityParameter::float(5.0)?);
//! threshold.set_from_str(r#"[["type", "*", 5.0], ["type", "LST*", 4.0]]"#)?;
//!
//! let catalog = Arc::new(InMemoryCatalog::new().with_type("LST_LST_LSTCam", [1u32, 2]));
//! if let Some(rules) = threshold.value_mut() {
//!     rules.attach(catalog);
//!     assert_eq!(rules.by_id(1u32)?, &4.0);
//! }
//! ```
//!
//! # Error Handling
//!
//! Validation failures are reported at assignment as [`FieldError`]. Lookups
//! on per-entity values fail lazily with [`LookupError`]. A type rule that
//! matches nothing is not an error; it is returned as a [`BindingWarning`].

mod field;
mod setting;

pub mod capability;
pub mod component;
pub mod path;
pub mod per_entity;
pub mod scalar;
pub mod time;

pub use capability::{CapabilityRegistry, Implementation};
pub use component::{CapabilityName, CapabilityNameList, capability_choice};
pub use field::{Field, Nullable};
pub use path::{Existence, PathField};
pub use per_entity::{
    BindingWarning, EntityCatalog, InMemoryCatalog, PerEntityParameter, RawParameter, RawRule,
    Rule, RuleSet, Selector, TypePattern,
};
pub use scalar::{BoolField, EnumField, FloatField, IntField, TextField};
pub use setting::Setting;
pub use time::TimeField;

pub use fieldwork_types::{EntityId, EntityKey, FieldError, LookupError, PathConstraint, Value};
