//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its mutable-field draft shape.
//! - Generate stable, monotonic-time-derived task identifiers.
//!
//! # Invariants
//! - `id` is stable for the task lifetime and never reused within a process.
//! - Edits replace mutable fields in place; `id` and column membership are
//!   owned by the repository, not by the draft.

use crate::model::board::ColumnId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Process-wide sequence appended to generated ids so that two tasks created
/// within the same millisecond still get distinct ids. Cross-process
/// collisions remain theoretically possible and are accepted.
static TASK_ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// Stable opaque identifier for one task.
///
/// Kept as a newtype so signatures state intent instead of passing raw
/// strings around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh id of the form `task-<epoch_ms>-<seq>`.
    pub fn generate() -> Self {
        let epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or(0);
        let seq = TASK_ID_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!("task-{epoch_ms}-{seq}"))
    }

    /// Wraps an id that already exists externally (persisted documents,
    /// FFI callers). No shape validation; ids are opaque.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task urgency bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// The mutable fields of a task, as produced by the task form.
///
/// A draft never carries identity or column membership; those are assigned
/// by the repository on create and preserved on update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// Due date as an opaque date string (`YYYY-MM-DD` by convention).
    pub due_date: String,
    pub responsible: String,
}

/// One unit of work on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable board-unique id used for affordances, drag gestures and
    /// persistence.
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// Opaque date string; the core never interprets it.
    pub due_date: String,
    pub responsible: String,
    /// Id of the column this task currently belongs to.
    pub column_id: ColumnId,
}

impl Task {
    /// Creates a task with a freshly generated id in the given column.
    pub fn new(draft: TaskDraft, column_id: ColumnId) -> Self {
        Self::with_id(TaskId::generate(), draft, column_id)
    }

    /// Creates a task with a caller-provided id.
    ///
    /// Used by persistence hydration where identity already exists.
    pub fn with_id(id: TaskId, draft: TaskDraft, column_id: ColumnId) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            due_date: draft.due_date,
            responsible: draft.responsible,
            column_id,
        }
    }

    /// Replaces all mutable fields in place, preserving `id` and
    /// `column_id`.
    pub fn apply(&mut self, draft: TaskDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.priority = draft.priority;
        self.due_date = draft.due_date;
        self.responsible = draft.responsible;
    }

    /// Returns the current mutable fields as a draft, used to prefill the
    /// task form from repository state.
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            due_date: self.due_date.clone(),
            responsible: self.responsible.clone(),
        }
    }
}
