#![forbid(unsafe_code)]

//! In-memory `localStorage` with failure injection.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use orbit_runtime::host::{Storage, StorageError};

#[derive(Debug, Default)]
struct StorageInner {
    items: BTreeMap<String, String>,
    read_error: Option<StorageError>,
    write_error: Option<StorageError>,
    writes: usize,
}

/// Shared key-value store; clones see the same items.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<StorageInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().items.get(key).cloned()
    }

    /// Seed a raw value, bypassing failure injection.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.borrow_mut().items.insert(key.into(), value.into());
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().items.keys().cloned().collect()
    }

    /// Make every read fail with `error` (`None` to heal).
    pub fn fail_reads(&self, error: Option<StorageError>) {
        self.inner.borrow_mut().read_error = error;
    }

    /// Make every write fail with `error` (`None` to heal).
    pub fn fail_writes(&self, error: Option<StorageError>) {
        self.inner.borrow_mut().write_error = error;
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let inner = self.inner.borrow();
        match &inner.read_error {
            Some(err) => Err(err.clone()),
            None => Ok(inner.items.get(key).cloned()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(err) = &inner.write_error {
            return Err(err.clone());
        }
        inner.items.insert(key.to_owned(), value.to_owned());
        inner.writes += 1;
        Ok(())
    }
}
