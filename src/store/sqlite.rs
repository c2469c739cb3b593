use super::KeyValueStore;
use super::connection::init_connection;
use crate::error::Result;
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;

/// Durable store backed by a SQLite file
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = init_connection(db_path)?;
        Ok(SqliteStore { conn })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    fn get_scalar(&self, key: &str) -> Result<Option<i64>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM scalars WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_scalar(&self, key: &str, value: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO scalars (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )?;
        Ok(())
    }

    /// Number of scalar keys present
    pub fn count_scalars(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM scalars", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl KeyValueStore for SqliteStore {
    fn get_int(&self, key: &str, default: i32) -> Result<i32> {
        Ok(self
            .get_scalar(key)?
            .and_then(|value| i32::try_from(value).ok())
            .unwrap_or(default))
    }

    fn get_long(&self, key: &str, default: i64) -> Result<i64> {
        Ok(self.get_scalar(key)?.unwrap_or(default))
    }

    fn get_string_set(&self, key: &str) -> Result<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT member FROM string_set_members WHERE key = ?1")?;
        let members = stmt
            .query_map([key], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<BTreeSet<String>>>()?;
        Ok(members)
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<()> {
        self.put_scalar(key, i64::from(value))
    }

    fn put_long(&mut self, key: &str, value: i64) -> Result<()> {
        self.put_scalar(key, value)
    }

    fn put_string_set(&mut self, key: &str, values: &BTreeSet<String>) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM string_set_members WHERE key = ?1", [key])?;
        for member in values {
            tx.execute(
                "INSERT INTO string_set_members (key, member) VALUES (?1, ?2)",
                params![key, member],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        let scalars = tx.execute("DELETE FROM scalars", [])?;
        let members = tx.execute("DELETE FROM string_set_members", [])?;
        tx.commit()?;
        debug!(
            "Cleared store: {} scalar(s), {} set member(s)",
            scalars, members
        );
        Ok(())
    }
}
