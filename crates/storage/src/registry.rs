//! Generic named keyed store
//!
//! A `Registry` is one partition: a single `RwLock` owned by the instance
//! guards the whole map for the full duration of each operation, including
//! compound check-then-act operations such as [`Registry::add`] and
//! [`Registry::upsert_with`].

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use parking_lot::RwLock;

use common::{Error, Result};

/// A named, concurrency-safe map from key to value.
#[derive(Debug)]
pub struct Registry<K, V> {
    name: String,
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Clone + Display,
    V: Clone,
{
    /// Create an empty partition called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Partition name, used in error values and logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert `value` under `key`; fails with `DuplicateKey` without overwriting.
    pub fn add(&self, key: K, value: V) -> Result<()> {
        let mut entries = self.entries.write();
        if entries.contains_key(&key) {
            return Err(Error::duplicate_key(&self.name, &key));
        }
        entries.insert(key, value);
        Ok(())
    }

    /// Clone of the value under `key`; fails with `NotFound` when absent.
    pub fn get(&self, key: &K) -> Result<V> {
        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(&self.name, key))
    }

    /// Point-in-time copy of the whole partition.
    pub fn get_all(&self) -> HashMap<K, V> {
        self.entries.read().clone()
    }

    /// Remove and return the value under `key`; fails with `NotFound` when absent.
    pub fn remove(&self, key: &K) -> Result<V> {
        self.entries
            .write()
            .remove(key)
            .ok_or_else(|| Error::not_found(&self.name, key))
    }

    /// Empty the partition. Idempotent.
    pub fn clear_all(&self) {
        self.entries.write().clear();
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Mutate the value under `key` in place while holding the write lock.
    ///
    /// Fails with `NotFound` when absent. The closure's error, if any, is
    /// returned unchanged and the value keeps whatever state the closure
    /// left it in.
    pub fn update<R>(&self, key: &K, f: impl FnOnce(&mut V) -> Result<R>) -> Result<R> {
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(value) => f(value),
            None => Err(Error::not_found(&self.name, key)),
        }
    }

    /// Atomic update-or-create.
    ///
    /// Under a single write lock: if `key` is present, `modify` runs on the
    /// existing value; otherwise `create` builds the value that gets inserted.
    /// Returns a clone of the resulting value.
    pub fn upsert_with(
        &self,
        key: K,
        create: impl FnOnce() -> Result<V>,
        modify: impl FnOnce(&mut V) -> Result<()>,
    ) -> Result<V> {
        let mut entries = self.entries.write();
        if let Some(value) = entries.get_mut(&key) {
            modify(value)?;
            return Ok(value.clone());
        }
        let value = create()?;
        entries.insert(key, value.clone());
        Ok(value)
    }

    /// Insert `value`, replacing any existing entry. Returns the previous value.
    pub fn insert_or_replace(&self, key: K, value: V) -> Option<V> {
        self.entries.write().insert(key, value)
    }
}
