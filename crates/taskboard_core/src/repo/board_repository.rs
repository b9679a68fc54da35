//! The owning task repository: all board mutations go through here.
//!
//! # Responsibility
//! - Own the single in-memory board aggregate for one session.
//! - Apply create/update/delete/move with all-or-nothing semantics.
//! - Trigger a persistence write and change notifications after every
//!   successful mutation.
//!
//! # Invariants
//! - A task belongs to exactly one column before and after every operation.
//! - A failed persistence write is surfaced as a warning, never as an
//!   operation failure; in-memory state stays the source of truth.

use crate::model::board::{Board, ColumnId};
use crate::model::task::{Task, TaskDraft, TaskId};
use crate::repo::board_store::BoardStore;
use crate::store::StoreError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Semantic errors for repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// No task with the given id exists on the board.
    NotFound(TaskId),
    /// The referenced column does not exist.
    NoSuchColumn(ColumnId),
    /// Storage transport failure (hydration or forced flush).
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::NoSuchColumn(id) => write!(f, "no such column: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::NoSuchColumn(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Change listener invoked after every successful mutation, once the
/// persistence write has been attempted.
pub type BoardListener = Box<dyn FnMut(&Board)>;

/// Owns the board and synchronizes it with its persisted form.
pub struct BoardRepository<S: BoardStore> {
    board: Board,
    store: S,
    listeners: Vec<BoardListener>,
    unsaved_changes: bool,
}

impl<S: BoardStore> BoardRepository<S> {
    /// Hydrates the repository from storage.
    ///
    /// # Errors
    /// - Propagates storage transport failures. Malformed stored documents
    ///   are recovered to an empty board inside the store and never fail.
    pub fn new(store: S) -> RepoResult<Self> {
        let board = store.load()?;
        Ok(Self {
            board,
            store,
            listeners: Vec::new(),
            unsaved_changes: false,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Registers a change listener. Listeners observe the board after each
    /// successful mutation; they must not mutate the repository.
    pub fn on_change(&mut self, listener: BoardListener) {
        self.listeners.push(listener);
    }

    /// True when the last persistence write failed and in-memory state is
    /// ahead of storage.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    /// Forces a persistence write of the current board.
    ///
    /// # Errors
    /// - Returns the storage failure; in-memory state is untouched.
    pub fn flush(&mut self) -> RepoResult<()> {
        self.store.save(&self.board)?;
        self.unsaved_changes = false;
        Ok(())
    }

    /// Creates a task from the draft in `target_column` (default: the first
    /// column) and returns it.
    ///
    /// # Errors
    /// - `NoSuchColumn` when the explicit target does not exist.
    pub fn create_task(
        &mut self,
        draft: TaskDraft,
        target_column: Option<&ColumnId>,
    ) -> RepoResult<Task> {
        let column_id = match target_column {
            Some(id) => {
                if !self.board.contains_column(id) {
                    return Err(RepoError::NoSuchColumn(id.clone()));
                }
                id.clone()
            }
            None => match self.board.first_column_id() {
                Some(id) => id.clone(),
                None => return Err(RepoError::NoSuchColumn(ColumnId::from_raw("todo"))),
            },
        };

        let task = Task::new(draft, column_id);
        if !self.board.push_task(task.clone()) {
            return Err(RepoError::NoSuchColumn(task.column_id));
        }

        info!(
            "event=task_create module=repo status=ok task_id={} column={}",
            task.id, task.column_id
        );
        self.commit();
        Ok(task)
    }

    /// Replaces all mutable fields of the task in place, preserving id and
    /// column membership, and returns the updated task.
    ///
    /// # Errors
    /// - `NotFound` when no task with `id` exists; the board is unchanged.
    pub fn update_task(&mut self, id: &TaskId, draft: TaskDraft) -> RepoResult<Task> {
        let Some(task) = self.board.find_task_mut(id) else {
            return Err(RepoError::NotFound(id.clone()));
        };
        task.apply(draft);
        let updated = task.clone();

        info!(
            "event=task_update module=repo status=ok task_id={} column={}",
            updated.id, updated.column_id
        );
        self.commit();
        Ok(updated)
    }

    /// Removes the task from its column and returns it.
    ///
    /// # Errors
    /// - `NotFound` when no task with `id` exists; the board is unchanged.
    pub fn delete_task(&mut self, id: &TaskId) -> RepoResult<Task> {
        let Some(removed) = self.board.remove_task(id) else {
            return Err(RepoError::NotFound(id.clone()));
        };

        info!(
            "event=task_delete module=repo status=ok task_id={} column={}",
            removed.id, removed.column_id
        );
        self.commit();
        Ok(removed)
    }

    /// Moves the task to the end of `target_column` and updates its
    /// `column_id`. Moving to the current column re-appends it.
    ///
    /// # Errors
    /// - `NotFound` / `NoSuchColumn`; both leave the board unchanged.
    pub fn move_task(&mut self, id: &TaskId, target_column: &ColumnId) -> RepoResult<()> {
        if !self.board.contains_column(target_column) {
            return Err(RepoError::NoSuchColumn(target_column.clone()));
        }
        let Some(mut task) = self.board.remove_task(id) else {
            return Err(RepoError::NotFound(id.clone()));
        };

        let source_column = task.column_id.clone();
        task.column_id = target_column.clone();
        let inserted = self.board.push_task(task);
        debug_assert!(inserted, "target column existence checked before removal");

        info!(
            "event=task_move module=repo status=ok task_id={id} from={source_column} to={target_column}"
        );
        self.commit();
        Ok(())
    }

    /// Persists the board and notifies listeners.
    ///
    /// A storage failure downgrades to a warning: the operation that led
    /// here already succeeded against the in-memory board.
    fn commit(&mut self) {
        match self.store.save(&self.board) {
            Ok(()) => {
                self.unsaved_changes = false;
            }
            Err(err) => {
                self.unsaved_changes = true;
                warn!(
                    "event=board_save module=repo status=error error_code=save_failed error={err}"
                );
            }
        }

        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in &mut listeners {
            listener(&self.board);
        }
        self.listeners = listeners;
    }
}
