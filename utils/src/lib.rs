//! Shared infrastructure utilities for Fieldwork.
//!
//! Cross-cutting helpers that several Fieldwork crates need but that don't
//! belong in the IO-free `fieldwork-types` crate:
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename)
//! - **`env`**: `$VAR` / `${VAR}` expansion inside configuration strings
//! - **`path`**: Absolute, canonical path normalization for paths that may not exist yet

pub mod atomic_write;
pub mod env;
pub mod path;

pub use atomic_write::{FileSyncPolicy, persist_from_reader};
pub use env::expand_env_vars;
pub use path::absolute_canonical;
