//! Persistence seam: a string key-value backend and the typed run store on
//! top of it.
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StorageError;
use crate::run::RunRecord;
use crate::settings::{DisplaySettings, ImportFormatSettings};
use crate::store::{deserialize_runs, serialize_runs};

pub const RUNS_KEY: &str = "tower-tracker.runs";
pub const IMPORT_FORMAT_KEY: &str = "tower-tracker.import-format";
pub const DISPLAY_KEY: &str = "tower-tracker.display";

/// String key-value backend
pub trait KeyValueStore {
    /// Read a value
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value; missing keys are not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process backend; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Typed access to runs and settings held in a [`KeyValueStore`]
#[derive(Debug, Clone)]
pub struct RunStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> RunStore<S> {
    pub const fn new(backend: S) -> Self {
        Self { backend }
    }

    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Load the stored collection; an absent collection is empty.
    ///
    /// Individual unreadable rows are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or no stored row can be read.
    pub fn load_runs(&self) -> Result<Vec<RunRecord>, StorageError> {
        let Some(blob) = self.backend.get(RUNS_KEY)? else {
            return Ok(Vec::new());
        };
        let result = deserialize_runs(&blob);
        if result.is_failure() {
            return Err(StorageError::CorruptRuns(result.errors.join("; ")));
        }
        for error in &result.errors {
            log::warn!("skipping stored run: {error}");
        }
        Ok(result.success)
    }

    /// Replace the stored collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn save_runs(&self, runs: &[RunRecord]) -> Result<(), StorageError> {
        log::debug!("saving {} runs", runs.len());
        self.backend.set(RUNS_KEY, &serialize_runs(runs))
    }

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn clear_runs(&self) -> Result<(), StorageError> {
        self.backend.remove(RUNS_KEY)
    }

    fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StorageError> {
        match self.backend.get(key)? {
            None => Ok(T::default()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::CorruptSettings {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|err| StorageError::Backend(err.to_string()))?;
        self.backend.set(key, &raw)
    }

    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored JSON is invalid.
    pub fn import_settings(&self) -> Result<ImportFormatSettings, StorageError> {
        self.load_json(IMPORT_FORMAT_KEY)
    }

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn save_import_settings(&self, settings: &ImportFormatSettings) -> Result<(), StorageError> {
        self.save_json(IMPORT_FORMAT_KEY, settings)
    }

    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored JSON is invalid.
    pub fn display_settings(&self) -> Result<DisplaySettings, StorageError> {
        self.load_json(DISPLAY_KEY)
    }

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn save_display_settings(&self, settings: &DisplaySettings) -> Result<(), StorageError> {
        self.save_json(DISPLAY_KEY, settings)
    }
}
