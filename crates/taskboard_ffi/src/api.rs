//! FFI use-case API for UI-shell-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level board and session functions to the UI
//!   shell via FRB.
//! - Keep error semantics simple for UI integration: envelopes, not thrown
//!   errors.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every card carries the stable task id plus title, description,
//!   priority, due date, responsible and column id.

use log::warn;
use taskboard_core::store::open_store;
use taskboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    BoardRepository, ColumnId, Priority, SessionGate, SqliteBoardStore, TaskDraft, TaskId,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const BOARD_DB_FILE_NAME: &str = "taskboard.sqlite3";
static BOARD_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One renderable task card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCardDto {
    /// Stable task id, equal to the persisted id.
    pub id: String,
    pub title: String,
    pub description: String,
    /// `low|medium|high`.
    pub priority: String,
    pub due_date: String,
    pub responsible: String,
    pub column_id: String,
}

/// One column container with its cards in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumnDto {
    pub id: String,
    pub cards: Vec<BoardCardDto>,
}

/// Full-board snapshot envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshotResponse {
    /// Whether the snapshot could be produced.
    pub ok: bool,
    /// Columns in display order (empty on failure).
    pub columns: Vec<BoardColumnDto>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action response envelope for board mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Affected task id, when the operation has one.
    pub task_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl BoardActionResponse {
    fn success(message: impl Into<String>, task_id: String) -> Self {
        Self {
            ok: true,
            task_id: Some(task_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Session state / auth action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    /// Whether the call itself succeeded.
    pub ok: bool,
    /// Whether a user is logged in after the call.
    pub logged_in: bool,
    /// Logged-in username, when any.
    pub username: Option<String>,
    /// Session token in string form, when any.
    pub token: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl SessionResponse {
    fn logged_out(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            logged_in: false,
            username: None,
            token: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            logged_in: false,
            username: None,
            token: None,
            message: message.into(),
        }
    }
}

/// Returns the full board as renderable columns and cards.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; failures come back in the envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn board_snapshot() -> BoardSnapshotResponse {
    match with_repository(|repo| {
        let view = taskboard_core::project_board(repo.board());
        Ok(view
            .columns
            .into_iter()
            .map(|column| BoardColumnDto {
                id: column.id.to_string(),
                cards: column
                    .cards
                    .into_iter()
                    .map(|card| BoardCardDto {
                        id: card.id.to_string(),
                        title: card.title,
                        description: card.description,
                        priority: priority_label(card.priority).to_string(),
                        due_date: card.due_date,
                        responsible: card.responsible,
                        column_id: card.column_id.to_string(),
                    })
                    .collect(),
            })
            .collect::<Vec<_>>())
    }) {
        Ok(columns) => BoardSnapshotResponse {
            ok: true,
            columns,
            message: String::new(),
        },
        Err(err) => BoardSnapshotResponse {
            ok: false,
            columns: Vec::new(),
            message: format!("board_snapshot failed: {err}"),
        },
    }
}

/// Creates a task from form field values.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - `column_id = None` targets the first column.
/// - Never panics; returns the created task id on success.
#[flutter_rust_bridge::frb(sync)]
pub fn board_create_task(
    title: String,
    description: String,
    priority: String,
    due_date: String,
    responsible: String,
    column_id: Option<String>,
) -> BoardActionResponse {
    let Some(priority) = parse_priority(&priority) else {
        return BoardActionResponse::failure(unsupported_priority(&priority));
    };
    let draft = form_draft(title, description, priority, due_date, responsible);
    let target = column_id.map(ColumnId::from_raw);

    match with_repository(|repo| {
        repo.create_task(draft, target.as_ref())
            .map_err(|err| err.to_string())
    }) {
        Ok(task) => BoardActionResponse::success("Task created.", task.id.to_string()),
        Err(err) => BoardActionResponse::failure(format!("board_create_task failed: {err}")),
    }
}

/// Replaces all mutable fields of an existing task.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; unknown ids come back as a failure envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn board_update_task(
    task_id: String,
    title: String,
    description: String,
    priority: String,
    due_date: String,
    responsible: String,
) -> BoardActionResponse {
    let Some(priority) = parse_priority(&priority) else {
        return BoardActionResponse::failure(unsupported_priority(&priority));
    };
    let draft = form_draft(title, description, priority, due_date, responsible);
    let id = TaskId::from_raw(task_id);

    match with_repository(|repo| {
        repo.update_task(&id, draft).map_err(|err| err.to_string())
    }) {
        Ok(task) => BoardActionResponse::success("Task updated.", task.id.to_string()),
        Err(err) => BoardActionResponse::failure(format!("board_update_task failed: {err}")),
    }
}

/// Deletes a task by id.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; unknown ids come back as a failure envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_task(task_id: String) -> BoardActionResponse {
    let id = TaskId::from_raw(task_id);

    match with_repository(|repo| repo.delete_task(&id).map_err(|err| err.to_string())) {
        Ok(task) => BoardActionResponse::success("Task deleted.", task.id.to_string()),
        Err(err) => BoardActionResponse::failure(format!("board_delete_task failed: {err}")),
    }
}

/// Moves a task to the end of another column (drop target of a drag
/// gesture).
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; unknown task/column come back as a failure envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn board_move_task(task_id: String, target_column_id: String) -> BoardActionResponse {
    let id = TaskId::from_raw(task_id);
    let target = ColumnId::from_raw(target_column_id);

    match with_repository(|repo| repo.move_task(&id, &target).map_err(|err| err.to_string())) {
        Ok(()) => BoardActionResponse::success("Task moved.", id.to_string()),
        Err(err) => BoardActionResponse::failure(format!("board_move_task failed: {err}")),
    }
}

/// Registers a new user.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; duplicate usernames come back as a failure envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_register(username: String, password: String) -> SessionResponse {
    match with_session_gate(|gate| gate.register(&username, &password).map_err(|err| err.to_string()))
    {
        Ok(()) => SessionResponse::logged_out("User registered."),
        Err(err) => SessionResponse::failure(format!("auth_register failed: {err}")),
    }
}

/// Logs a user in and stores the session marker.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; bad credentials come back as a failure envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_login(username: String, password: String) -> SessionResponse {
    match with_session_gate(|gate| gate.login(&username, &password).map_err(|err| err.to_string()))
    {
        Ok(session) => SessionResponse {
            ok: true,
            logged_in: true,
            username: Some(session.username),
            token: Some(session.token.to_string()),
            message: "Logged in.".to_string(),
        },
        Err(err) => SessionResponse::failure(format!("auth_login failed: {err}")),
    }
}

/// Logs the current user out.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; logging out while logged out succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_logout() -> SessionResponse {
    match with_session_gate(|gate| gate.logout().map_err(|err| err.to_string())) {
        Ok(()) => SessionResponse::logged_out("Logged out."),
        Err(err) => SessionResponse::failure(format!("auth_logout failed: {err}")),
    }
}

/// Returns the current session state gating board access.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; a malformed stored marker reads as logged out.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_current() -> SessionResponse {
    match with_session_gate(|gate| gate.current_session().map_err(|err| err.to_string())) {
        Ok(Some(session)) => SessionResponse {
            ok: true,
            logged_in: true,
            username: Some(session.username),
            token: Some(session.token.to_string()),
            message: String::new(),
        },
        Ok(None) => SessionResponse::logged_out(String::new()),
        Err(err) => SessionResponse::failure(format!("auth_current failed: {err}")),
    }
}

fn form_draft(
    title: String,
    description: String,
    priority: Priority,
    due_date: String,
    responsible: String,
) -> TaskDraft {
    TaskDraft {
        title: title.trim().to_string(),
        description: description.trim().to_string(),
        priority,
        due_date: due_date.trim().to_string(),
        responsible: responsible.trim().to_string(),
    }
}

fn parse_priority(value: &str) -> Option<Priority> {
    match value.trim().to_ascii_lowercase().as_str() {
        "low" => Some(Priority::Low),
        "medium" => Some(Priority::Medium),
        "high" => Some(Priority::High),
        _ => None,
    }
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}

fn unsupported_priority(value: &str) -> String {
    format!("unsupported priority `{value}`; expected low|medium|high")
}

fn resolve_db_path() -> PathBuf {
    BOARD_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("TASKBOARD_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(BOARD_DB_FILE_NAME)
        })
        .clone()
}

fn with_repository<T>(
    f: impl FnOnce(&mut BoardRepository<SqliteBoardStore<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_store(&db_path).map_err(|err| {
        warn!("event=ffi_call module=ffi status=error error_code=store_open_failed error={err}");
        format!("store open failed: {err}")
    })?;
    let mut repo = BoardRepository::new(SqliteBoardStore::new(&conn)).map_err(|err| {
        warn!("event=ffi_call module=ffi status=error error_code=board_hydration_failed error={err}");
        format!("board hydration failed: {err}")
    })?;
    f(&mut repo)
}

fn with_session_gate<T>(f: impl FnOnce(&SessionGate<'_>) -> Result<T, String>) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_store(&db_path).map_err(|err| {
        warn!("event=ffi_call module=ffi status=error error_code=store_open_failed error={err}");
        format!("store open failed: {err}")
    })?;
    let gate = SessionGate::new(&conn);
    f(&gate)
}

#[cfg(test)]
mod tests {
    use super::{
        auth_current, auth_login, auth_logout, auth_register, board_create_task,
        board_delete_task, board_move_task, board_snapshot, board_update_task, core_version,
        init_logging, ping,
    };
    use std::time::{SystemTime, UNIX_EPOCH};
    use taskboard_core::store::open_store;
    use uuid::Uuid;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn created_task_shows_up_in_snapshot_with_all_fields() {
        let token = unique_token("ffi-create");
        let created = board_create_task(
            token.clone(),
            "from ffi".to_string(),
            "high".to_string(),
            "2025-01-01".to_string(),
            "Ana".to_string(),
            None,
        );
        assert!(created.ok, "{}", created.message);
        let task_id = created.task_id.expect("create returns task id");

        let snapshot = board_snapshot();
        assert!(snapshot.ok, "{}", snapshot.message);
        let card = snapshot
            .columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .find(|card| card.id == task_id)
            .expect("created card is in the snapshot");
        assert_eq!(card.title, token);
        assert_eq!(card.priority, "high");
        assert_eq!(card.due_date, "2025-01-01");
        assert_eq!(card.responsible, "Ana");
        assert_eq!(card.column_id, "todo");
    }

    #[test]
    fn unsupported_priority_is_rejected() {
        let response = board_create_task(
            "task".to_string(),
            String::new(),
            "urgent".to_string(),
            String::new(),
            String::new(),
            None,
        );
        assert!(!response.ok);
        assert!(response.message.contains("unsupported priority"));
    }

    #[test]
    fn update_then_move_then_delete_roundtrip() {
        let token = unique_token("ffi-lifecycle");
        let created = board_create_task(
            token.clone(),
            String::new(),
            "medium".to_string(),
            String::new(),
            String::new(),
            None,
        );
        assert!(created.ok, "{}", created.message);
        let task_id = created.task_id.expect("create returns task id");

        let updated = board_update_task(
            task_id.clone(),
            format!("{token}-v2"),
            "now with details".to_string(),
            "low".to_string(),
            "2025-09-09".to_string(),
            "Rui".to_string(),
        );
        assert!(updated.ok, "{}", updated.message);

        let moved = board_move_task(task_id.clone(), "done".to_string());
        assert!(moved.ok, "{}", moved.message);

        let snapshot = board_snapshot();
        let card = snapshot
            .columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .find(|card| card.id == task_id)
            .expect("moved card is in the snapshot");
        assert_eq!(card.column_id, "done");
        assert_eq!(card.title, format!("{token}-v2"));

        let deleted = board_delete_task(task_id.clone());
        assert!(deleted.ok, "{}", deleted.message);
        let deleted_again = board_delete_task(task_id);
        assert!(!deleted_again.ok);
    }

    #[test]
    fn move_to_unknown_column_fails_without_losing_the_task() {
        let token = unique_token("ffi-badmove");
        let created = board_create_task(
            token,
            String::new(),
            "medium".to_string(),
            String::new(),
            String::new(),
            None,
        );
        let task_id = created.task_id.expect("create returns task id");

        let moved = board_move_task(task_id.clone(), "archive".to_string());
        assert!(!moved.ok);
        assert!(moved.message.contains("no such column"));

        let snapshot = board_snapshot();
        let card = snapshot
            .columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .find(|card| card.id == task_id)
            .expect("task is still on the board");
        assert_eq!(card.column_id, "todo");
    }

    #[test]
    fn auth_register_login_logout_flow() {
        let username = unique_token("user");
        assert!(auth_register(username.clone(), "secret".to_string()).ok);

        let duplicate = auth_register(username.clone(), "other".to_string());
        assert!(!duplicate.ok);
        assert!(duplicate.message.contains("already exists"));

        let bad = auth_login(username.clone(), "wrong".to_string());
        assert!(!bad.ok);

        let session = auth_login(username.clone(), "secret".to_string());
        assert!(session.ok, "{}", session.message);
        assert!(session.logged_in);
        assert_eq!(session.username.as_deref(), Some(username.as_str()));
        let token = session.token.expect("login returns token");
        Uuid::parse_str(&token).expect("token is a uuid");

        let current = auth_current();
        assert!(current.logged_in);

        assert!(auth_logout().ok);
        assert!(!auth_current().logged_in);
    }

    #[test]
    fn credential_rows_land_in_the_kv_store() {
        let username = unique_token("rawuser");
        assert!(auth_register(username.clone(), "secret".to_string()).ok);

        let conn = open_store(super::resolve_db_path()).expect("open store");
        let raw: String = conn
            .query_row("SELECT value FROM kv WHERE key = 'users';", [], |row| {
                row.get(0)
            })
            .expect("users key exists");
        assert!(raw.contains(&username));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
