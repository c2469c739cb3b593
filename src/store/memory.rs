use super::KeyValueStore;
use crate::error::Result;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i32),
    Long(i64),
    StringSet(BTreeSet<String>),
}

/// In-memory store, used as the test double and for throwaway sessions
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

}

impl KeyValueStore for MemoryStore {
    fn get_int(&self, key: &str, default: i32) -> Result<i32> {
        Ok(match self.values.get(key) {
            Some(Value::Int(value)) => *value,
            Some(Value::Long(value)) => i32::try_from(*value).unwrap_or(default),
            _ => default,
        })
    }

    fn get_long(&self, key: &str, default: i64) -> Result<i64> {
        Ok(match self.values.get(key) {
            Some(Value::Long(value)) => *value,
            Some(Value::Int(value)) => i64::from(*value),
            _ => default,
        })
    }

    fn get_string_set(&self, key: &str) -> Result<BTreeSet<String>> {
        Ok(match self.values.get(key) {
            Some(Value::StringSet(values)) => values.clone(),
            _ => BTreeSet::new(),
        })
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<()> {
        self.values.insert(key.to_string(), Value::Int(value));
        Ok(())
    }

    fn put_long(&mut self, key: &str, value: i64) -> Result<()> {
        self.values.insert(key.to_string(), Value::Long(value));
        Ok(())
    }

    fn put_string_set(&mut self, key: &str, values: &BTreeSet<String>) -> Result<()> {
        self.values
            .insert(key.to_string(), Value::StringSet(values.clone()));
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.values.clear();
        Ok(())
    }
}
