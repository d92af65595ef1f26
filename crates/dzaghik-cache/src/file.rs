//! Directory-backed store: one file per key.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::{CacheError, KeyValueStore};

const ENTRY_EXTENSION: &str = "json";

/// Persists each key as `<dir>/<key>.json`.
///
/// Writes go to a sibling temporary file that is synced and renamed over the
/// target, so a reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| CacheError::OpenError(format!("{}: {}", dir.display(), e)))?;
        tracing::debug!(dir = %dir.display(), "opened file store");
        Ok(Self { dir })
    }

    /// The directory holding the entries.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys map to file names unchanged, so only `[A-Za-z0-9_.-]` is allowed
    /// and a key may not start with a dot.
    fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", key, ENTRY_EXTENSION)))
    }
}

fn write_synced(path: &Path, value: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(value)?;
    file.sync_all()
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("tmp");
        let written = write_synced(&tmp, value).and_then(|()| fs::rename(&tmp, &path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %tmp.display(), error = %cleanup, "failed to remove temporary file");
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.path_for(key)?.is_file())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == ENTRY_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cache;

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        store.set("flower_shop_cart", br#"[{"id":"1"}]"#).unwrap();
        drop(store);

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("flower_shop_cart").unwrap(),
            Some(br#"[{"id":"1"}]"#.to_vec())
        );
    }

    #[test]
    fn test_missing_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("admin_user").unwrap(), None);
        assert!(store.delete("admin_user").is_ok());

        store.set("admin_user", b"{}").unwrap();
        assert!(store.exists("admin_user").unwrap());
        store.delete("admin_user").unwrap();
        assert!(!store.exists("admin_user").unwrap());
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert!(matches!(
            store.set("../escape", b"x"),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_keys_map_to_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(FileStore::open(dir.path()).unwrap());

        cache.set("a__b", &1).unwrap();
        cache.set("dzaghik_currency", "USD").unwrap();

        assert_eq!(
            cache.keys().unwrap(),
            vec!["a__b".to_string(), "dzaghik_currency".to_string()]
        );
        assert!(matches!(cache.set("a:b", &2), Err(CacheError::InvalidKey(_))));
        assert!(matches!(cache.get::<i32>("a:b"), Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        // A non-empty directory where the entry should go makes the rename fail.
        let blocker = dir.path().join("admin_user.json");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), b"x").unwrap();

        assert!(store.set("admin_user", b"{}").is_err());
        assert!(!dir.path().join("admin_user.tmp").exists());
    }
}
