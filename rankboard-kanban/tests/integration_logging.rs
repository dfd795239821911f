//! Integration tests for activity logging

use rankboard_kanban::{
    board::{AddBoard, GetBoard, ListBoards},
    section::AddSection,
    task::{AddTask, MoveTask, UpdateTask},
    KanbanContext, KanbanOperationProcessor, OperationProcessor,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_activity_logging_end_to_end() {
    let temp = TempDir::new().unwrap();
    let ctx = KanbanContext::open(temp.path().join("rankboard.db")).unwrap();
    let user = ctx.ledger().create_user("alice", "hash").unwrap().id;

    let processor = KanbanOperationProcessor::with_actor("alice[session123]");

    // Add a board, a section and a task (all logged)
    let board = processor
        .process(&AddBoard::new(user.clone()).with_title("Test Board"), &ctx)
        .await
        .unwrap();
    let board_id = board["id"].as_str().unwrap().to_string();
    let section = processor
        .process(&AddSection::new(user.clone(), board_id.as_str()), &ctx)
        .await
        .unwrap();
    let section_id = section["id"].as_str().unwrap().to_string();
    let task = processor
        .process(
            &AddTask::new(user.clone(), section_id.as_str()).with_title("First task"),
            &ctx,
        )
        .await
        .unwrap();
    let task_id = task["id"].as_str().unwrap().to_string();

    // Update the task (logged)
    processor
        .process(
            &UpdateTask::new(user.clone(), task_id.as_str()).with_title("Updated task"),
            &ctx,
        )
        .await
        .unwrap();

    // Read (unlogged)
    processor
        .process(&GetBoard::new(user.clone(), board_id.as_str()), &ctx)
        .await
        .unwrap();

    let entries = ctx.read_activity(None).await.unwrap();
    let ops: Vec<_> = entries.iter().map(|e| e.op.as_str()).collect();
    assert_eq!(ops, vec!["update task", "add task", "add section", "add board"]);

    for entry in &entries {
        assert_eq!(entry.actor.as_deref(), Some("alice[session123]"));
    }
    assert_eq!(entries[0].input["title"], "Updated task");
    assert_eq!(entries[0].output["title"], "Updated task");

    // Reopening the database sees the same log
    drop(ctx);
    let reopened = KanbanContext::open(temp.path().join("rankboard.db")).unwrap();
    assert_eq!(reopened.read_activity(Some(2)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unlogged_and_failed_operations_dont_create_entries() {
    let ctx = KanbanContext::in_memory().unwrap();
    let user = ctx.ledger().create_user("alice", "hash").unwrap().id;
    let processor = KanbanOperationProcessor::new();

    processor
        .process(&AddBoard::new(user.clone()), &ctx)
        .await
        .unwrap();
    assert_eq!(ctx.read_activity(None).await.unwrap().len(), 1);

    processor
        .process(&ListBoards::new(user.clone()), &ctx)
        .await
        .unwrap();

    let failed = processor
        .process(&MoveTask::within(user, "no-such-task", "no-such-section", 0), &ctx)
        .await;
    assert!(failed.is_err());

    let entries = ctx.read_activity(None).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].op, "add board");
    assert_eq!(entries[0].actor, None);
}
