//! Persistence adapter: whole-board save/load over the kv store.
//!
//! # Responsibility
//! - Serialize the full board as one JSON document under a fixed key.
//! - Hydrate a board from storage, recovering from malformed documents.
//!
//! # Invariants
//! - `save` writes the whole document in one upsert; last write wins.
//! - `load` never fails on document content: a missing or malformed value
//!   yields an empty board with all known columns present.
//! - Column membership survives the round-trip exactly; order within a
//!   column is carried but not contractual.

use crate::model::board::{Board, ColumnId};
use crate::model::task::Task;
use crate::store::kv::{kv_get, kv_put};
use crate::store::StoreResult;
use log::{debug, warn};
use rusqlite::Connection;
use std::collections::{BTreeMap, HashSet};

/// Fixed kv key holding the board document.
pub const BOARD_KV_KEY: &str = "board";

/// Wire shape of the persisted board: `{ [columnId]: Task[] }`.
type PersistedBoard = BTreeMap<String, Vec<Task>>;

/// Persistence adapter contract for one board document.
pub trait BoardStore {
    /// Serializes and writes the full board. Idempotent; no partial writes.
    fn save(&self, board: &Board) -> StoreResult<()>;

    /// Reads the previously saved board, or an empty board when nothing
    /// usable is stored. Only transport failures propagate.
    fn load(&self) -> StoreResult<Board>;
}

/// kv-table-backed board store.
pub struct SqliteBoardStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BoardStore for SqliteBoardStore<'_> {
    fn save(&self, board: &Board) -> StoreResult<()> {
        let mut document = PersistedBoard::new();
        for column in board.columns() {
            document.insert(column.id().as_str().to_string(), column.tasks().to_vec());
        }

        let raw = serde_json::to_string(&document)?;
        kv_put(self.conn, BOARD_KV_KEY, &raw)?;
        debug!(
            "event=board_save module=store status=ok task_count={}",
            board.task_count()
        );
        Ok(())
    }

    fn load(&self) -> StoreResult<Board> {
        let Some(raw) = kv_get(self.conn, BOARD_KV_KEY)? else {
            debug!("event=board_load module=store status=ok source=empty");
            return Ok(Board::with_default_columns());
        };

        let document: PersistedBoard = match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(err) => {
                warn!(
                    "event=board_load module=store status=recovered error_code=malformed_persisted_state error={err}"
                );
                return Ok(Board::with_default_columns());
            }
        };

        Ok(hydrate_board(document))
    }
}

/// Rebuilds a board from the persisted document, dropping what cannot be
/// placed while keeping everything that can.
fn hydrate_board(document: PersistedBoard) -> Board {
    let mut board = Board::with_default_columns();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (column_key, tasks) in document {
        for mut task in tasks {
            if task.column_id.as_str() != column_key {
                warn!(
                    "event=board_load module=store status=healed task_id={} stored_column={} bucket={}",
                    task.id, task.column_id, column_key
                );
                task.column_id = ColumnId::from_raw(column_key.clone());
            }

            if !seen_ids.insert(task.id.as_str().to_string()) {
                warn!(
                    "event=board_load module=store status=dropped reason=duplicate_id task_id={}",
                    task.id
                );
                continue;
            }

            if !board.push_task(task) {
                warn!(
                    "event=board_load module=store status=dropped reason=unknown_column column={column_key}"
                );
            }
        }
    }

    debug!(
        "event=board_load module=store status=ok task_count={}",
        board.task_count()
    );
    board
}
