//! Core domain types for Fieldwork.
//!
//! This crate contains pure domain types with no IO and minimal dependencies:
//! the raw [`Value`] every field validates from, entity identifiers, and the
//! error taxonomy shared by all fields.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod error;
mod ids;
mod value;

pub use error::{EntityKey, FieldError, LookupError, PathConstraint};
pub use ids::EntityId;
pub use value::{UnsupportedValue, Value};
