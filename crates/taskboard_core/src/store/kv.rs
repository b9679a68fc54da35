//! Access primitives for the `kv` table.
//!
//! # Responsibility
//! - Keep every kv SQL statement in one place.
//! - Guarantee last-write-wins, whole-value semantics per key.
//!
//! # Invariants
//! - A put is a single upsert statement; readers never observe a partially
//!   written value.

use crate::store::StoreResult;
use rusqlite::{params, Connection, OptionalExtension};

/// Reads the value stored under `key`, if any.
pub fn kv_get(conn: &Connection, key: &str) -> StoreResult<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1;", [key], |row| {
            row.get::<_, String>(0)
        })
        .optional()?;
    Ok(value)
}

/// Writes `value` under `key`, replacing any previous value atomically.
pub fn kv_put(conn: &Connection, key: &str, value: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO kv (key, value, updated_at)
         VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at;",
        params![key, value],
    )?;
    Ok(())
}

/// Removes `key` if present. Removing an absent key is not an error.
pub fn kv_delete(conn: &Connection, key: &str) -> StoreResult<()> {
    conn.execute("DELETE FROM kv WHERE key = ?1;", [key])?;
    Ok(())
}
