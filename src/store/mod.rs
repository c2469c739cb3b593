pub mod connection;
pub mod memory;
pub mod sqlite;

use crate::error::Result;
use std::collections::BTreeSet;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Flat scalar/string-set store addressed by string keys.
///
/// Reads never fail because a key is missing: the supplied default (or an
/// empty set) comes back instead. Each write is durable on its own; callers
/// get no multi-key transactions.
pub trait KeyValueStore {
    fn get_int(&self, key: &str, default: i32) -> Result<i32>;

    fn get_long(&self, key: &str, default: i64) -> Result<i64>;

    fn get_string_set(&self, key: &str) -> Result<BTreeSet<String>>;

    fn put_int(&mut self, key: &str, value: i32) -> Result<()>;

    fn put_long(&mut self, key: &str, value: i64) -> Result<()>;

    /// Replaces the whole set stored under `key`
    fn put_string_set(&mut self, key: &str, values: &BTreeSet<String>) -> Result<()>;

    /// Removes every key, not just the ones this crate knows about
    fn clear(&mut self) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_int(&self, key: &str, default: i32) -> Result<i32> {
        (**self).get_int(key, default)
    }

    fn get_long(&self, key: &str, default: i64) -> Result<i64> {
        (**self).get_long(key, default)
    }

    fn get_string_set(&self, key: &str) -> Result<BTreeSet<String>> {
        (**self).get_string_set(key)
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<()> {
        (**self).put_int(key, value)
    }

    fn put_long(&mut self, key: &str, value: i64) -> Result<()> {
        (**self).put_long(key, value)
    }

    fn put_string_set(&mut self, key: &str, values: &BTreeSet<String>) -> Result<()> {
        (**self).put_string_set(key, values)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }
}
