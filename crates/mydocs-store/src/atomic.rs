//! Atomic file replacement.
//!
//! Bytes go to a uniquely named temp file in the destination directory, are
//! flushed with `sync_all`, then renamed over the destination. Readers see
//! either the previous file or the new one. A temp file left behind by a
//! crash carries the [`TEMP_FILE_PREFIX`] and is swept by
//! `LocalStore::collect_orphans`.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use mydocs_shared::constants::TEMP_FILE_PREFIX;

use crate::error::{Result, StoreError};

pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // dropped (and deleted) on any early return
    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_FILE_PREFIX)
        .tempfile_in(dir)?;

    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| StoreError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes)
}

pub(crate) fn is_temp_file(name: &str) -> bool {
    name.starts_with(TEMP_FILE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| is_temp_file(&e.file_name().to_string_lossy()))
            .count()
    }

    #[test]
    fn test_write_and_replace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[test]
    fn test_failed_replace_keeps_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        // a non-empty directory cannot be replaced by a file
        let path = dir.path().join("occupied");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("inner"), b"x").unwrap();

        let err = write_atomic(&path, b"data").unwrap_err();
        assert!(matches!(err, StoreError::Persist { .. }));
        assert!(path.is_dir());
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[test]
    fn test_missing_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("data.json");

        assert!(matches!(write_atomic(&path, b"data"), Err(StoreError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_json_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");

        write_json_atomic(&path, &[1u32, 2, 3][..]).unwrap();
        let back: Vec<u32> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
