//! Board renderer: pure projection plus retained view state.
//!
//! # Responsibility
//! - Materialize one card view per task and one container per column.
//! - Keep the task form and user-facing notices for the current session.
//!
//! # Invariants
//! - Projection is deterministic: an unchanged board projects to an equal
//!   view, with no duplicate cards.
//! - A stale affordance (task gone when it fires) is a recoverable notice,
//!   never a propagated error.

use crate::model::board::{Board, ColumnId};
use crate::model::task::{Priority, Task, TaskDraft, TaskId};
use crate::repo::board_repository::{BoardRepository, RepoError};
use crate::repo::board_store::BoardStore;
use log::warn;

/// Renderable card for one task, carrying the stable id and every field the
/// visual layer exposes as text or data attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
    pub responsible: String,
    pub column_id: ColumnId,
    /// True while this card is the source of an active drag gesture.
    pub lifted: bool,
}

/// Renderable container for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub id: ColumnId,
    pub cards: Vec<CardView>,
}

/// Full renderable board, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
}

impl BoardView {
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|column| column.cards.len()).sum()
    }

    pub fn card(&self, id: &TaskId) -> Option<&CardView> {
        self.columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .find(|card| &card.id == id)
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Warning,
}

/// A visible, recoverable message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub message: String,
}

impl Notice {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Warning,
            message: message.into(),
        }
    }
}

/// The task form retained while the user creates or edits a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    /// `Some` while editing an existing task, `None` while creating.
    pub editing: Option<TaskId>,
    /// Prefilled field values, sourced from repository state.
    pub draft: TaskDraft,
}

/// Projects the board into its view model.
///
/// Pure and deterministic; calling it repeatedly on an unchanged board
/// yields an equal view.
pub fn project_board(board: &Board) -> BoardView {
    project_board_with_lifted(board, None)
}

fn project_board_with_lifted(board: &Board, lifted: Option<&TaskId>) -> BoardView {
    BoardView {
        columns: board
            .columns()
            .iter()
            .map(|column| ColumnView {
                id: column.id().clone(),
                cards: column.tasks().iter().map(|task| card_view(task, lifted)).collect(),
            })
            .collect(),
    }
}

fn card_view(task: &Task, lifted: Option<&TaskId>) -> CardView {
    CardView {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        priority: task.priority,
        due_date: task.due_date.clone(),
        responsible: task.responsible.clone(),
        column_id: task.column_id.clone(),
        lifted: lifted == Some(&task.id),
    }
}

/// Retained renderer state: the current view, the task form, and pending
/// notices.
#[derive(Default)]
pub struct Renderer {
    view: BoardView,
    form: Option<TaskForm>,
    notices: Vec<Notice>,
    lifted: Option<TaskId>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the retained view from the board. Called after every
    /// repository change notification.
    pub fn refresh(&mut self, board: &Board) {
        self.view = project_board_with_lifted(board, self.lifted.as_ref());
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn form(&self) -> Option<&TaskForm> {
        self.form.as_ref()
    }

    /// Opens an empty form for creating a task.
    pub fn begin_create(&mut self) {
        self.form = Some(TaskForm {
            editing: None,
            draft: TaskDraft::default(),
        });
    }

    /// Opens the form prefilled from the task's current repository state.
    ///
    /// Returns `false` and surfaces a notice when the task is gone.
    pub fn begin_edit(&mut self, board: &Board, id: &TaskId) -> bool {
        let Some(task) = board.find_task(id) else {
            self.stale_reference(id, "edit");
            return false;
        };
        self.form = Some(TaskForm {
            editing: Some(id.clone()),
            draft: task.to_draft(),
        });
        true
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    /// Routes the submitted field values to `create_task` or `update_task`
    /// depending on the open form's mode, then re-renders.
    ///
    /// Returns the affected task, or `None` when the operation could not be
    /// applied (surfaced as a notice).
    pub fn submit_form<S: BoardStore>(
        &mut self,
        repo: &mut BoardRepository<S>,
        draft: TaskDraft,
    ) -> Option<Task> {
        let editing = self.form.as_ref().and_then(|form| form.editing.clone());

        let result = match editing {
            Some(id) => repo.update_task(&id, draft),
            None => repo.create_task(draft, None),
        };

        match result {
            Ok(task) => {
                self.form = None;
                self.refresh(repo.board());
                Some(task)
            }
            Err(err) => {
                self.surface(err);
                self.refresh(repo.board());
                None
            }
        }
    }

    /// Delete affordance for one card. Returns `false` and surfaces a
    /// notice when the task is already gone.
    pub fn request_delete<S: BoardStore>(
        &mut self,
        repo: &mut BoardRepository<S>,
        id: &TaskId,
    ) -> bool {
        match repo.delete_task(id) {
            Ok(_) => {
                self.refresh(repo.board());
                true
            }
            Err(err) => {
                self.surface(err);
                self.refresh(repo.board());
                false
            }
        }
    }

    /// Marks the card that is currently lifted by a drag gesture.
    pub fn set_lifted(&mut self, id: Option<TaskId>) {
        self.lifted = id;
        let lifted = self.lifted.clone();
        for column in &mut self.view.columns {
            for card in &mut column.cards {
                card.lifted = lifted.as_ref() == Some(&card.id);
            }
        }
    }

    pub fn lifted(&self) -> Option<&TaskId> {
        self.lifted.as_ref()
    }

    /// Drains pending notices for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Surfaces a repository error as a visible, recoverable notice.
    pub(crate) fn surface(&mut self, err: RepoError) {
        self.surface_warning(err.to_string());
    }

    pub(crate) fn surface_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("event=board_action module=view status=recovered error={message}");
        self.notices.push(Notice::warning(message));
    }

    fn stale_reference(&mut self, id: &TaskId, action: &str) {
        warn!(
            "event=board_action module=view status=recovered reason=stale_reference action={action} task_id={id}"
        );
        self.notices
            .push(Notice::warning(format!("task not found: {id}")));
    }
}
