use rusqlite::Connection;
use taskboard_core::store::open_store_in_memory;
use taskboard_core::{
    project_board, BoardRepository, ColumnId, NoticeSeverity, Priority, Renderer,
    SqliteBoardStore, TaskDraft, TaskId,
};

fn draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        ..TaskDraft::default()
    }
}

fn repo(conn: &Connection) -> BoardRepository<SqliteBoardStore<'_>> {
    BoardRepository::new(SqliteBoardStore::new(conn)).unwrap()
}

#[test]
fn projection_is_idempotent_on_unchanged_board() {
    let conn = open_store_in_memory().unwrap();
    let mut repo = repo(&conn);
    repo.create_task(draft("one"), None).unwrap();
    repo.create_task(draft("two"), Some(&ColumnId::from_raw("doing")))
        .unwrap();

    let first = project_board(repo.board());
    let second = project_board(repo.board());

    assert_eq!(first, second);
    assert_eq!(first.card_count(), 2);
}

#[test]
fn cards_carry_every_field_and_the_stable_id() {
    let conn = open_store_in_memory().unwrap();
    let mut repo = repo(&conn);
    let task = repo
        .create_task(
            TaskDraft {
                title: "Write spec".to_string(),
                description: "section 3".to_string(),
                priority: Priority::High,
                due_date: "2025-01-01".to_string(),
                responsible: "Ana".to_string(),
            },
            None,
        )
        .unwrap();

    let view = project_board(repo.board());
    let card = view.card(&task.id).unwrap();

    assert_eq!(card.title, "Write spec");
    assert_eq!(card.description, "section 3");
    assert_eq!(card.priority, Priority::High);
    assert_eq!(card.due_date, "2025-01-01");
    assert_eq!(card.responsible, "Ana");
    assert_eq!(card.column_id.as_str(), "todo");
    assert!(!card.lifted);
}

#[test]
fn refresh_mirrors_repository_after_each_mutation() {
    let conn = open_store_in_memory().unwrap();
    let mut repo = repo(&conn);
    let mut renderer = Renderer::new();
    renderer.refresh(repo.board());
    assert_eq!(renderer.view().card_count(), 0);

    let task = repo.create_task(draft("painted"), None).unwrap();
    renderer.refresh(repo.board());
    assert_eq!(renderer.view().card_count(), 1);

    repo.delete_task(&task.id).unwrap();
    renderer.refresh(repo.board());
    assert_eq!(renderer.view().card_count(), 0);
}

#[test]
fn submit_form_in_create_mode_routes_to_create_task() {
    let conn = open_store_in_memory().unwrap();
    let mut repo = repo(&conn);
    let mut renderer = Renderer::new();

    renderer.begin_create();
    assert!(renderer.form().is_some());

    let created = renderer.submit_form(&mut repo, draft("from the form")).unwrap();

    assert!(renderer.form().is_none(), "form closes after submit");
    assert_eq!(repo.board().task_count(), 1);
    assert_eq!(
        repo.board().column_of(&created.id).map(ColumnId::as_str),
        Some("todo")
    );
    assert!(renderer.view().card(&created.id).is_some());
}

#[test]
fn submit_form_in_edit_mode_routes_to_update_task() {
    let conn = open_store_in_memory().unwrap();
    let mut repo = repo(&conn);
    let mut renderer = Renderer::new();

    let doing = ColumnId::from_raw("doing");
    let task = repo.create_task(draft("v1"), Some(&doing)).unwrap();
    renderer.refresh(repo.board());

    assert!(renderer.begin_edit(repo.board(), &task.id));
    let form = renderer.form().unwrap();
    assert_eq!(form.editing.as_ref(), Some(&task.id));
    assert_eq!(form.draft.title, "v1");

    let updated = renderer.submit_form(&mut repo, draft("v2")).unwrap();

    assert_eq!(updated.id, task.id);
    assert_eq!(updated.column_id, doing);
    assert_eq!(repo.board().task_count(), 1);
    assert_eq!(renderer.view().card(&task.id).unwrap().title, "v2");
}

#[test]
fn edit_affordance_on_missing_task_is_a_recoverable_notice() {
    let conn = open_store_in_memory().unwrap();
    let repo = repo(&conn);
    let mut renderer = Renderer::new();

    let ghost = TaskId::from_raw("task-0-ghost");
    assert!(!renderer.begin_edit(repo.board(), &ghost));
    assert!(renderer.form().is_none());

    let notices = renderer.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, NoticeSeverity::Warning);
    assert!(notices[0].message.contains("task-0-ghost"));
    assert!(renderer.take_notices().is_empty(), "notices drain once");
}

#[test]
fn delete_affordance_on_missing_task_is_a_recoverable_notice() {
    let conn = open_store_in_memory().unwrap();
    let mut repo = repo(&conn);
    let mut renderer = Renderer::new();
    let survivor = repo.create_task(draft("survivor"), None).unwrap();
    renderer.refresh(repo.board());

    let ghost = TaskId::from_raw("task-0-ghost");
    assert!(!renderer.request_delete(&mut repo, &ghost));

    assert!(repo.board().contains_task(&survivor.id));
    let notices = renderer.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, NoticeSeverity::Warning);
}

#[test]
fn stale_edit_submit_surfaces_notice_and_leaves_board_unchanged() {
    let conn = open_store_in_memory().unwrap();
    let mut repo = repo(&conn);
    let mut renderer = Renderer::new();

    let task = repo.create_task(draft("about to vanish"), None).unwrap();
    assert!(renderer.begin_edit(repo.board(), &task.id));

    // The task disappears while the form is open.
    repo.delete_task(&task.id).unwrap();

    assert!(renderer.submit_form(&mut repo, draft("too late")).is_none());
    assert_eq!(repo.board().task_count(), 0);
    assert_eq!(renderer.take_notices().len(), 1);
}

#[test]
fn lifted_flag_follows_set_lifted_across_refreshes() {
    let conn = open_store_in_memory().unwrap();
    let mut repo = repo(&conn);
    let mut renderer = Renderer::new();

    let task = repo.create_task(draft("lifted"), None).unwrap();
    renderer.refresh(repo.board());

    renderer.set_lifted(Some(task.id.clone()));
    assert!(renderer.view().card(&task.id).unwrap().lifted);

    renderer.refresh(repo.board());
    assert!(
        renderer.view().card(&task.id).unwrap().lifted,
        "refresh keeps the lifted mark"
    );

    renderer.set_lifted(None);
    assert!(!renderer.view().card(&task.id).unwrap().lifted);
}
