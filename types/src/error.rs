//! Error taxonomy shared by every field.
//!
//! Two families, raised at different times:
//! - [`FieldError`]: eager, at assignment. Bad input shape, rejected values,
//!   path constraints, failed URI resolution.
//! - [`LookupError`]: lazy, when a bound per-entity value is queried.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::ids::EntityId;
use crate::value::Value;

/// Which existence/kind constraint a path violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathConstraint {
    MustExist,
    MustNotExist,
    NotDirectory,
    NotFile,
}

impl fmt::Display for PathConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PathConstraint::MustExist => "does not exist",
            PathConstraint::MustNotExist => "must not exist",
            PathConstraint::NotDirectory => "must not be a directory",
            PathConstraint::NotFile => "must not be a file",
        })
    }
}

#[derive(Debug, Error)]
pub enum FieldError {
    /// Malformed raw input or a value the field rejects.
    #[error("{message}")]
    Validation { message: String },

    #[error("path \"{}\" {constraint}", path.display())]
    PathConstraint {
        path: PathBuf,
        constraint: PathConstraint,
    },

    /// A path collaborator (downloader, dataset registry) failed.
    #[error("failed to resolve {uri}: {message}")]
    Resolve { uri: String, message: String },
}

impl FieldError {
    pub fn validation(message: impl Into<String>) -> Self {
        FieldError::Validation {
            message: message.into(),
        }
    }

    /// The standard "expected X, got Y" rejection.
    pub fn invalid(expected: impl fmt::Display, got: &Value) -> Self {
        FieldError::Validation {
            message: format!("expected {expected}, got {} {got}", got.kind()),
        }
    }

    pub fn path_constraint(path: impl Into<PathBuf>, constraint: PathConstraint) -> Self {
        FieldError::PathConstraint {
            path: path.into(),
            constraint,
        }
    }

    /// Prefix a validation message with where it happened (`rule 2`, a
    /// setting name). Other variants already carry their subject.
    #[must_use]
    pub fn with_context(self, context: impl fmt::Display) -> Self {
        match self {
            FieldError::Validation { message } => FieldError::Validation {
                message: format!("{context}: {message}"),
            },
            other => other,
        }
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, FieldError::Validation { .. })
    }

    #[must_use]
    pub fn constraint(&self) -> Option<PathConstraint> {
        match self {
            FieldError::PathConstraint { constraint, .. } => Some(*constraint),
            _ => None,
        }
    }
}

/// Target of a per-entity lookup that found nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Id(EntityId),
    Type(String),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Id(id) => write!(f, "entity id {id}"),
            EntityKey::Type(name) => write!(f, "entity type '{name}'"),
        }
    }
}

impl From<EntityId> for EntityKey {
    fn from(id: EntityId) -> Self {
        EntityKey::Id(id)
    }
}

impl From<u32> for EntityKey {
    fn from(id: u32) -> Self {
        EntityKey::Id(EntityId::new(id))
    }
}

impl From<&str> for EntityKey {
    fn from(name: &str) -> Self {
        EntityKey::Type(name.to_string())
    }
}

impl From<String> for EntityKey {
    fn from(name: String) -> Self {
        EntityKey::Type(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no entity catalog attached; call attach() before looking up values")]
    NotBound,

    #[error("no global default was set; add a (\"type\", \"*\", value) rule")]
    NoDefault,

    #[error("no value was set for {0}; set it explicitly, by type, or with '*'")]
    UnresolvedEntity(EntityKey),

    #[error("unknown entity type '{name}', known: {known:?}")]
    UnknownType { name: String, known: Vec<String> },
}
