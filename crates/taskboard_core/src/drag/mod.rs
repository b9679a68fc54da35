//! Drag-reorder controller: the single-gesture state machine.
//!
//! # Responsibility
//! - Track the one task that may be mid-drag at any time.
//! - Turn a drop into a repository move; keep hover as pure visual
//!   feedback.
//!
//! # Invariants
//! - At most one task is mid-drag globally.
//! - Hovering never mutates the board or storage; only a drop on a column
//!   does.
//! - Dropping outside any column leaves the task in its source column.

use crate::model::board::{Board, ColumnId};
use crate::model::task::TaskId;
use crate::repo::board_repository::{BoardRepository, RepoError};
use crate::repo::board_store::BoardStore;
use crate::view::renderer::Renderer;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Gesture misuse errors.
#[derive(Debug)]
pub enum DragError {
    /// A drag is already active for the given task.
    AlreadyDragging(TaskId),
    /// Drop or cancel arrived with no active drag.
    NoActiveDrag,
    /// The gesture source task vanished before the drag could start.
    UnknownTask(TaskId),
}

impl Display for DragError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyDragging(id) => write!(f, "a drag is already active for task {id}"),
            Self::NoActiveDrag => write!(f, "no drag gesture is active"),
            Self::UnknownTask(id) => write!(f, "cannot drag unknown task {id}"),
        }
    }
}

impl Error for DragError {}

/// What happened when the gesture ended.
#[derive(Debug)]
pub enum DropOutcome {
    /// The task was moved and the move persisted.
    Moved { task_id: TaskId, target: ColumnId },
    /// The drop landed outside any column; nothing changed.
    OutsideBoard,
    /// The repository rejected the move; surfaced as a notice.
    Rejected(RepoError),
}

#[derive(Debug)]
enum DragPhase {
    Idle,
    Dragging {
        task_id: TaskId,
        hover: Option<ColumnId>,
    },
}

/// State machine over a single task-drag gesture.
pub struct DragController {
    phase: DragPhase,
}

impl DragController {
    pub fn new() -> Self {
        Self {
            phase: DragPhase::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    pub fn dragging_task(&self) -> Option<&TaskId> {
        match &self.phase {
            DragPhase::Dragging { task_id, .. } => Some(task_id),
            DragPhase::Idle => None,
        }
    }

    pub fn hover_target(&self) -> Option<&ColumnId> {
        match &self.phase {
            DragPhase::Dragging { hover, .. } => hover.as_ref(),
            DragPhase::Idle => None,
        }
    }

    /// Starts a drag: marks the source task lifted.
    ///
    /// # Errors
    /// - `AlreadyDragging` while another gesture is active.
    /// - `UnknownTask` when the task is not on the board.
    pub fn begin_drag(
        &mut self,
        renderer: &mut Renderer,
        board: &Board,
        id: &TaskId,
    ) -> Result<(), DragError> {
        if let DragPhase::Dragging { task_id, .. } = &self.phase {
            return Err(DragError::AlreadyDragging(task_id.clone()));
        }
        if !board.contains_task(id) {
            return Err(DragError::UnknownTask(id.clone()));
        }

        debug!("event=drag_begin module=drag status=ok task_id={id}");
        self.phase = DragPhase::Dragging {
            task_id: id.clone(),
            hover: None,
        };
        renderer.set_lifted(Some(id.clone()));
        Ok(())
    }

    /// Updates the hovered column. Pure visual feedback: no repository
    /// mutation, no persistence. Ignored while idle.
    pub fn hover(&mut self, column: Option<&ColumnId>) {
        if let DragPhase::Dragging { hover, .. } = &mut self.phase {
            *hover = column.cloned();
        }
    }

    /// Ends the gesture on a drop.
    ///
    /// A drop on a column calls `move_task`; a drop outside any column is a
    /// no-op. Either way the gesture returns to idle and the lifted style is
    /// cleared.
    ///
    /// # Errors
    /// - `NoActiveDrag` when no gesture is active.
    pub fn drop_on<S: BoardStore>(
        &mut self,
        repo: &mut BoardRepository<S>,
        renderer: &mut Renderer,
        target: Option<&ColumnId>,
    ) -> Result<DropOutcome, DragError> {
        let DragPhase::Dragging { task_id, .. } = &self.phase else {
            return Err(DragError::NoActiveDrag);
        };
        let task_id = task_id.clone();

        let outcome = match target {
            None => {
                debug!("event=drag_drop module=drag status=ok task_id={task_id} target=none");
                DropOutcome::OutsideBoard
            }
            Some(column) => match repo.move_task(&task_id, column) {
                Ok(()) => {
                    debug!(
                        "event=drag_drop module=drag status=ok task_id={task_id} target={column}"
                    );
                    DropOutcome::Moved {
                        task_id: task_id.clone(),
                        target: column.clone(),
                    }
                }
                Err(err) => {
                    renderer.surface_warning(err.to_string());
                    DropOutcome::Rejected(err)
                }
            },
        };

        self.phase = DragPhase::Idle;
        renderer.set_lifted(None);
        renderer.refresh(repo.board());
        Ok(outcome)
    }

    /// Abandons the gesture without mutating anything.
    pub fn cancel(&mut self, renderer: &mut Renderer) {
        if self.is_dragging() {
            debug!("event=drag_cancel module=drag status=ok");
        }
        self.phase = DragPhase::Idle;
        renderer.set_lifted(None);
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}
