//! Atomic file write helpers.
//!
//! Uses a temp file + rename pattern so readers never observe a partially
//! written file. On Windows, rename-over-existing fails, so we use a
//! backup-and-restore fallback to avoid data loss when overwriting.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileSyncPolicy {
    #[default]
    SyncAll,
    SkipSync,
}

/// Stream `reader` into `path` atomically, creating parent directories.
///
/// Returns the number of bytes written. The temp file lives next to the
/// destination so the final rename never crosses filesystems.
pub fn persist_from_reader(
    path: impl AsRef<Path>,
    reader: &mut impl Read,
    sync: FileSyncPolicy,
) -> io::Result<u64> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    let written = io::copy(reader, &mut tmp)?;
    tmp.flush()?;
    if matches!(sync, FileSyncPolicy::SyncAll) {
        tmp.as_file().sync_all()?;
    }

    // Persist (rename) - handle Windows where rename fails if target exists.
    if let Err(err) = tmp.persist(path) {
        if path.exists() {
            let backup_path = path.with_extension("bak");
            let _ = fs::remove_file(&backup_path);
            fs::rename(path, &backup_path)?;

            if let Err(rename_err) = err.file.persist(path) {
                let _ = fs::rename(&backup_path, path);
                return Err(rename_err.error);
            }
            if let Err(e) = fs::remove_file(&backup_path) {
                tracing::warn!(
                    path = %backup_path.display(),
                    "Failed to remove .bak after atomic write: {e}"
                );
            }
        } else {
            return Err(err.error);
        }
    }

    debug!(path = %path.display(), bytes = written, "Persisted file");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{FileSyncPolicy, persist_from_reader};

    #[test]
    fn persist_overwrites_existing_and_cleans_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("test.txt");

        for body in [b"one", b"two"] {
            let mut reader: &[u8] = body;
            persist_from_reader(&path, &mut reader, FileSyncPolicy::SyncAll).expect("persist");
        }

        let content = fs::read_to_string(&path).expect("read");
        assert_eq!(content, "two");
        assert!(!path.with_extension("bak").exists());
    }

    #[test]
    fn persist_creates_missing_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("host").join("nested").join("file.dat");
        let mut reader: &[u8] = b"payload";

        let written =
            persist_from_reader(&path, &mut reader, FileSyncPolicy::SkipSync).expect("persist");

        assert_eq!(written, 7);
        assert_eq!(fs::read(&path).expect("read"), b"payload");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .flatten()
            .collect();
        assert_eq!(leftovers.len(), 1, "temp file must not linger");
    }
}
