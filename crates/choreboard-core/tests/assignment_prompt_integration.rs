//! Integration tests for assignment prompts backed by the SQLite seen store.
//!
//! Covers the eligibility filter, answering and dismissing prompts, and seen
//! markers that outlive the process.

use choreboard_core::{
    AssignmentDecision, AssignmentPromptSequencer, ChoreTask, Database, Event, SeenStore,
    SharedTaskList, SqliteSeenStore,
};

fn open_store(path: &std::path::Path) -> SqliteSeenStore {
    SqliteSeenStore::new(Database::open_at(path).unwrap())
}

#[test]
fn eligible_tasks_exclude_self_assigned_and_seen() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir.path().join("choreboard.db"));
    store.mark_seen("C").unwrap();

    let tasks = vec![
        ChoreTask::new("A", "Unload dishwasher").assigned("U", "V"),
        ChoreTask::new("B", "Make bed").assigned("U", "U"),
        ChoreTask::new("C", "Take out trash").assigned("U", "V"),
    ];
    let mut seq = AssignmentPromptSequencer::new(tasks, store, "U");
    seq.refresh();

    let ids: Vec<&str> = seq.eligible_tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["A"]);
}

#[test]
fn answered_task_never_returns_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("choreboard.db");
    let list = SharedTaskList::new(vec![
        ChoreTask::new("A", "Unload dishwasher").assigned("U", "V"),
        ChoreTask::new("D", "Walk the dog").assigned("U", "V"),
    ]);

    {
        let mut seq = AssignmentPromptSequencer::new(list.clone(), open_store(&path), "U");
        seq.refresh();
        assert_eq!(seq.current().unwrap().task.id, "A");

        let events = seq.respond("A", true);
        assert!(matches!(
            &events[..],
            [
                Event::AssignmentAnswered { decision: AssignmentDecision::Accepted, .. },
                Event::AssignmentPrompted { task_id, .. },
            ] if task_id == "D"
        ));
        assert_eq!(seq.current().unwrap().task.id, "D");
    }

    let mut seq = AssignmentPromptSequencer::new(list, open_store(&path), "U");
    seq.refresh();
    let ids: Vec<&str> = seq.eligible_tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["D"]);
    assert_eq!(seq.current().unwrap().task.id, "D");
}

#[test]
fn dismissed_task_is_marked_seen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("choreboard.db");
    let tasks = vec![ChoreTask::new("A", "Fold laundry").assigned("U", "V")];

    let mut seq = AssignmentPromptSequencer::new(tasks, open_store(&path), "U");
    seq.refresh();
    seq.dismiss_without_response("A");
    assert!(seq.current().is_none());
    assert_eq!(seq.seen_store().seen_ids().unwrap(), ["A"]);
}

#[test]
fn marking_twice_is_the_same_as_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("choreboard.db");
    let tasks = vec![
        ChoreTask::new("A", "Water plants").assigned("U", "V"),
        ChoreTask::new("B", "Sweep porch").assigned("U", "V"),
    ];

    let mut seq = AssignmentPromptSequencer::new(tasks, open_store(&path), "U");
    seq.mark_seen("A");
    seq.mark_seen("A");
    seq.refresh();

    let ids: Vec<&str> = seq.eligible_tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["B"]);
    assert_eq!(seq.seen_store().seen_ids().unwrap(), ["A"]);
}

#[test]
fn late_task_list_change_promotes_new_assignment() {
    let list = SharedTaskList::default();
    let mut seq = AssignmentPromptSequencer::new(
        list.clone(),
        SqliteSeenStore::new(Database::open_memory().unwrap()),
        "U",
    );
    assert!(seq.refresh().is_empty());

    list.replace(vec![ChoreTask::new("E", "Clean fish tank").assigned("U", "Grandma")]);
    let events = seq.refresh();
    assert!(matches!(
        &events[..],
        [Event::AssignmentPrompted { assigned_by: Some(by), .. }] if by == "Grandma"
    ));
}
