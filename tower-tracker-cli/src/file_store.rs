use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tower_tracker_core::{KeyValueStore, StorageError};

/// Directory-backed key-value store: one file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        self.root.join(name)
    }
}

fn backend_error(path: &Path, err: &std::io::Error) -> StorageError {
    StorageError::Backend(format!("{}: {err}", path.display()))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(backend_error(&path, &err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(|err| backend_error(&self.root, &err))?;
        let path = self.path_for(key);
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, value).map_err(|err| backend_error(&tmp, &err))?;
        fs::rename(&tmp, &path).map_err(|err| backend_error(&path, &err))?;
        log::debug!("wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(backend_error(&path, &err)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "tower-tracker-store-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn stores_values_as_files() {
        let store = FileStore::new(temp_root("kv"));
        assert_eq!(store.get("tower-tracker.runs").unwrap(), None);

        store.set("tower-tracker.runs", "a\tb\n").unwrap();
        assert_eq!(store.get("tower-tracker.runs").unwrap().as_deref(), Some("a\tb\n"));
        assert!(store.root().join("tower-tracker.runs").exists());

        store.remove("tower-tracker.runs").unwrap();
        store.remove("tower-tracker.runs").unwrap();
        assert_eq!(store.get("tower-tracker.runs").unwrap(), None);
        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn sanitizes_key_names() {
        let store = FileStore::new("/data");
        assert_eq!(store.path_for("a/b c"), PathBuf::from("/data/a_b_c"));
    }
}
