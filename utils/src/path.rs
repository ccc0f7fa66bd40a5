//! Absolute, canonical path normalization.

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Strip Windows extended-length path prefix (`\\?\`) if present.
fn strip_extended_prefix(path: PathBuf) -> PathBuf {
    #[cfg(windows)]
    {
        if let Some(s) = path.as_os_str().to_str()
            && let Some(stripped) = s.strip_prefix(r"\\?\")
            && !stripped.starts_with("UNC\\")
        {
            return PathBuf::from(stripped);
        }
    }
    path
}

/// Make `path` absolute and canonical.
///
/// Existing paths are fully canonicalized (symlinks resolved). For paths that
/// do not exist yet, the nearest existing ancestor is canonicalized and the
/// missing tail is appended with `.`/`..` folded lexically.
pub fn absolute_canonical(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    if absolute.exists() {
        return std::fs::canonicalize(&absolute).map(strip_extended_prefix);
    }

    let mut missing: Vec<OsString> = Vec::new();
    let mut ancestor = absolute.as_path();
    while !ancestor.exists() {
        if let Some(name) = ancestor.file_name() {
            missing.push(name.to_os_string());
        } else if ancestor.ends_with("..") {
            missing.push(OsString::from(".."));
        }
        match ancestor.parent() {
            Some(parent) => ancestor = parent,
            None => break,
        }
    }

    let mut resolved = if ancestor.exists() {
        strip_extended_prefix(std::fs::canonicalize(ancestor)?)
    } else {
        ancestor.to_path_buf()
    };
    for part in missing.iter().rev() {
        let part = Path::new(part);
        match part.components().next() {
            Some(Component::ParentDir) => {
                resolved.pop();
            }
            Some(Component::CurDir) | None => {}
            Some(_) => resolved.push(part),
        }
    }
    Ok(resolved)
}
