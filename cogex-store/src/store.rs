//! The session store: the engines' only durable state between polls.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
pub use string_cache::DefaultAtom as Atom;

/// Loosely typed key-value bag that survives re-invocations within one run.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn delete(&mut self, key: &str);

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl<S: SessionStore + ?Sized> SessionStore for &mut S {
    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &str) {
        (**self).delete(key)
    }
}

/// In-process store with interned keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    entries: HashMap<Atom, Value>,
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

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().map(|k| k.to_string()).collect();
        keys.sort();
        keys
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(&Atom::from(key)).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(Atom::from(key), value);
    }

    fn delete(&mut self, key: &str) {
        self.entries.remove(&Atom::from(key));
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("key `{key}` holds malformed data: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads and decodes `key`; `Ok(None)` when absent.
pub fn load<T, S>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: SessionStore + ?Sized,
{
    store
        .get(key)
        .map(|value| {
            serde_json::from_value(value).map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

pub fn save<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: SessionStore + ?Sized,
{
    let value = serde_json::to_value(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, value);
    Ok(())
}
