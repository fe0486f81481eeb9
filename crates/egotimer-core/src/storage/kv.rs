//! The key-value persistence port.
//!
//! The engine never talks to SQLite directly. It reads and writes strings
//! through [`KvStore`]; the typed helpers parse on the way out and treat an
//! unparseable value as missing, so a corrupted entry falls back to the
//! default instead of poisoning the whole load.

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::StoreError;

pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    fn get_u64(&self, key: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.get(key)?.and_then(|raw| parse_or_warn(key, &raw)))
    }

    fn put_u64(&mut self, key: &str, value: u64) -> Result<(), StoreError> {
        self.put(key, &value.to_string())
    }

    fn get_i64(&self, key: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.get(key)?.and_then(|raw| parse_or_warn(key, &raw)))
    }

    fn put_i64(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.put(key, &value.to_string())
    }

    fn get_f64(&self, key: &str) -> Result<Option<f64>, StoreError> {
        Ok(self
            .get(key)?
            .and_then(|raw| parse_or_warn::<f64>(key, &raw))
            .filter(|v| v.is_finite()))
    }

    fn put_f64(&mut self, key: &str, value: f64) -> Result<(), StoreError> {
        self.put(key, &value.to_string())
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, StoreError> {
        Ok(self.get(key)?.and_then(|raw| parse_or_warn(key, &raw)))
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StoreError> {
        self.put(key, if value { "true" } else { "false" })
    }

    /// JSON-valued entry. Malformed JSON reads as `None`.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>
    where
        Self: Sized,
    {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!(key, error = %e, "malformed JSON in store, using default");
                Ok(None)
            }
        }
    }

    fn put_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)
            .map_err(|e| StoreError::QueryFailed(format!("encode {key}: {e}")))?;
        self.put(key, &json)
    }
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, raw, "unparseable value in store, using default");
            None
        }
    }
}

impl<S: KvStore + ?Sized> KvStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-memory store, used by tests and by embedders that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
