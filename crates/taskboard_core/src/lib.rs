//! Core domain logic for the taskboard.
//! This crate is the single source of truth for board invariants.

pub mod drag;
pub mod logging;
pub mod model;
pub mod repo;
pub mod session;
pub mod store;
pub mod view;

pub use drag::{DragController, DragError, DropOutcome};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{Board, Column, ColumnId, DEFAULT_COLUMN_IDS};
pub use model::task::{Priority, Task, TaskDraft, TaskId};
pub use repo::board_repository::{BoardRepository, RepoError, RepoResult};
pub use repo::board_store::{BoardStore, SqliteBoardStore, BOARD_KV_KEY};
pub use session::{
    AuthError, AuthResult, SessionGate, SessionToken, SESSION_KV_KEY, USERS_KV_KEY,
};
pub use view::renderer::{
    project_board, BoardView, CardView, ColumnView, Notice, NoticeSeverity, Renderer, TaskForm,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
