//! Connection bootstrap utilities for the kv store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::StoreResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the store database file and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `store_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>) -> StoreResult<Connection> {
    open_with(Connection::open(path), "file")
}

/// Opens an in-memory store and applies all pending migrations.
///
/// Primarily for tests and throwaway sessions; same bootstrap contract as
/// [`open_store`].
pub fn open_store_in_memory() -> StoreResult<Connection> {
    open_with(Connection::open_in_memory(), "memory")
}

fn open_with(
    opened: Result<Connection, rusqlite::Error>,
    mode: &'static str,
) -> StoreResult<Connection> {
    let started_at = Instant::now();
    info!("event=store_open module=store status=start mode={mode}");

    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode={mode} duration_ms={} error_code=store_open_failed error={err}",
                started_at.elapsed().as_millis()
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=store_open module=store status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode={mode} duration_ms={} error_code=store_bootstrap_failed error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> StoreResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}
