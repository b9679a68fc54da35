//! Board aggregate: columns and their task sequences.
//!
//! # Responsibility
//! - Own the in-memory column/task structure mutated by the repository.
//! - Provide membership primitives that cannot leave a task in zero or two
//!   columns.
//!
//! # Invariants
//! - Column ids are unique within a board; column order is fixed at
//!   construction.
//! - A task lives in exactly one column; `Task::column_id` always names the
//!   column that physically holds it.

use crate::model::task::{Task, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Column ids every fresh board starts with, in display order. The first
/// entry is the default insertion target for new tasks.
pub const DEFAULT_COLUMN_IDS: [&str; 3] = ["todo", "doing", "done"];

/// Stable identifier for one status column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ColumnId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named status bucket holding an ordered task sequence.
///
/// Order within the sequence is insertion/drag determined and is not part of
/// the persisted contract beyond membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    id: ColumnId,
    tasks: Vec<Task>,
}

impl Column {
    pub fn new(id: ColumnId) -> Self {
        Self {
            id,
            tasks: Vec::new(),
        }
    }

    pub fn id(&self) -> &ColumnId {
        &self.id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// The root aggregate: every column and every task of one board session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    /// Creates an empty board with the default column set.
    pub fn with_default_columns() -> Self {
        Self {
            columns: DEFAULT_COLUMN_IDS
                .iter()
                .map(|id| Column::new(ColumnId::from_raw(*id)))
                .collect(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| column.id() == id)
    }

    pub fn contains_column(&self, id: &ColumnId) -> bool {
        self.column(id).is_some()
    }

    /// The default insertion target for new tasks.
    pub fn first_column_id(&self) -> Option<&ColumnId> {
        self.columns.first().map(Column::id)
    }

    /// Iterates every task on the board, in column order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns.iter().flat_map(|column| column.tasks.iter())
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    pub fn find_task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks().find(|task| &task.id == id)
    }

    pub fn contains_task(&self, id: &TaskId) -> bool {
        self.find_task(id).is_some()
    }

    /// Returns the id of the column holding the given task.
    pub fn column_of(&self, id: &TaskId) -> Option<&ColumnId> {
        self.columns
            .iter()
            .find(|column| column.tasks.iter().any(|task| &task.id == id))
            .map(Column::id)
    }

    pub(crate) fn find_task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.columns
            .iter_mut()
            .flat_map(|column| column.tasks.iter_mut())
            .find(|task| &task.id == id)
    }

    /// Appends a task to the column named by `task.column_id`.
    ///
    /// Returns `false` without mutating when that column does not exist;
    /// the caller decides how to surface it.
    pub(crate) fn push_task(&mut self, task: Task) -> bool {
        let Some(column) = self
            .columns
            .iter_mut()
            .find(|column| column.id == task.column_id)
        else {
            return false;
        };
        column.tasks.push(task);
        true
    }

    /// Removes a task from whichever column holds it.
    pub(crate) fn remove_task(&mut self, id: &TaskId) -> Option<Task> {
        for column in &mut self.columns {
            if let Some(index) = column.tasks.iter().position(|task| &task.id == id) {
                return Some(column.tasks.remove(index));
            }
        }
        None
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::with_default_columns()
    }
}

#[cfg(test)]
mod tests {
    use super::{Board, ColumnId, DEFAULT_COLUMN_IDS};
    use crate::model::task::{Task, TaskDraft};

    fn task_in(column: &str, title: &str) -> Task {
        Task::new(
            TaskDraft {
                title: title.to_string(),
                ..TaskDraft::default()
            },
            ColumnId::from_raw(column),
        )
    }

    #[test]
    fn default_board_has_all_known_columns_empty() {
        let board = Board::with_default_columns();
        let ids: Vec<&str> = board
            .columns()
            .iter()
            .map(|column| column.id().as_str())
            .collect();
        assert_eq!(ids, DEFAULT_COLUMN_IDS);
        assert_eq!(board.task_count(), 0);
        assert_eq!(board.first_column_id().map(ColumnId::as_str), Some("todo"));
    }

    #[test]
    fn push_task_rejects_unknown_column_without_mutation() {
        let mut board = Board::with_default_columns();
        assert!(!board.push_task(task_in("archive", "orphan")));
        assert_eq!(board.task_count(), 0);
    }

    #[test]
    fn remove_task_detaches_from_its_column() {
        let mut board = Board::with_default_columns();
        let task = task_in("doing", "in flight");
        let id = task.id.clone();
        assert!(board.push_task(task));

        let removed = board.remove_task(&id).expect("task was on the board");
        assert_eq!(removed.id, id);
        assert!(board.column_of(&id).is_none());
        assert_eq!(board.task_count(), 0);
    }

    #[test]
    fn column_of_names_the_holding_column() {
        let mut board = Board::with_default_columns();
        let task = task_in("done", "shipped");
        let id = task.id.clone();
        board.push_task(task);

        assert_eq!(board.column_of(&id).map(ColumnId::as_str), Some("done"));
    }
}
