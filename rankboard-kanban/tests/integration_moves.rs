//! End-to-end ordering properties: density under random operations and concurrent moves

use proptest::prelude::*;
use rankboard_kanban::{
    reconcile_move, ErrorKind, KanbanContext, KanbanSettings, MoveRequest, ParentKey, SectionId,
    UserId,
};
use std::collections::BTreeSet;

struct Board {
    ctx: KanbanContext,
    user: UserId,
    sections: Vec<SectionId>,
}

fn board_with_tasks(per_section: &[usize]) -> Board {
    let ctx = KanbanContext::in_memory().unwrap();
    let user = ctx.ledger().create_user("alice", "h").unwrap().id;
    let board = ctx.ledger().create_board(&user, "B", None).unwrap();
    let sections = per_section
        .iter()
        .enumerate()
        .map(|(i, count)| {
            let section = ctx
                .ledger()
                .create_section(&board.id, &format!("s{i}"))
                .unwrap();
            for t in 0..*count {
                ctx.ledger()
                    .create_task(&section.id, &format!("t{i}-{t}"), None)
                    .unwrap();
            }
            section.id
        })
        .collect();
    Board {
        ctx,
        user,
        sections,
    }
}

fn all_tasks(board: &Board) -> BTreeSet<String> {
    board
        .sections
        .iter()
        .flat_map(|s| {
            board
                .ctx
                .ledger()
                .snapshot(&ParentKey::Section(s.clone()))
                .unwrap()
                .children
        })
        .collect()
}

fn assert_dense(board: &Board) {
    for section in &board.sections {
        board
            .ctx
            .ledger()
            .check_dense(&ParentKey::Section(section.clone()))
            .unwrap();
    }
}

#[tokio::test]
async fn test_deletion_renumber_example() {
    let board = board_with_tasks(&[3]);
    let key = ParentKey::Section(board.sections[0].clone());
    let before = board.ctx.ledger().snapshot(&key).unwrap().children;

    board
        .ctx
        .ledger()
        .delete_task(&before[1].as_str().into())
        .unwrap();

    let after = board.ctx.ledger().list_tasks(&board.sections[0]).unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].id.as_str(), before[0]);
    assert_eq!(after[1].id.as_str(), before[2]);
    assert_eq!((after[0].position, after[1].position), (0, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_moves_keep_positions_dense() {
    let board = board_with_tasks(&[6, 6]);
    let ctx = board.ctx.clone().with_settings(KanbanSettings {
        move_retry_attempts: 10,
        ..KanbanSettings::default()
    });
    let before = all_tasks(&board);
    let k1 = ParentKey::Section(board.sections[0].clone());
    let k2 = ParentKey::Section(board.sections[1].clone());

    let mut handles = Vec::new();
    for round in 0..24i64 {
        let ctx = ctx.clone();
        let user = board.user.clone();
        let (from, to) = if round % 2 == 0 {
            (k1.clone(), k2.clone())
        } else {
            (k2.clone(), k1.clone())
        };
        handles.push(tokio::spawn(async move {
            let source = ctx.ledger().snapshot(&from).unwrap();
            let Some(moved) = source.children.first().cloned() else {
                return Ok(());
            };
            let request = MoveRequest::between(from, to, moved, round % 4);
            reconcile_move(&ctx, &user, &request).await.map(|_| ())
        }));
    }

    for handle in handles {
        if let Err(e) = handle.await.unwrap() {
            // A move may lose its item to a concurrent move, or run out of retries
            assert!(
                matches!(e.kind(), ErrorKind::Conflict | ErrorKind::StorageFailure),
                "unexpected error: {e}"
            );
        }
    }

    assert_dense(&board);
    assert_eq!(all_tasks(&board), before);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_random_moves_preserve_density_and_membership(
        sizes in proptest::collection::vec(0usize..5, 2..4),
        moves in proptest::collection::vec((0usize..4, 0usize..4, 0usize..6, 0i64..7), 1..15),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let board = board_with_tasks(&sizes);
        let before = all_tasks(&board);

        for (from, to, pick, index) in moves {
            let from = ParentKey::Section(board.sections[from % board.sections.len()].clone());
            let to = ParentKey::Section(board.sections[to % board.sections.len()].clone());
            let children = board.ctx.ledger().snapshot(&from).unwrap().children;
            if children.is_empty() {
                continue;
            }
            let moved = children[pick % children.len()].clone();
            let request = MoveRequest::between(from, to.clone(), moved.clone(), index);

            let outcome = rt.block_on(reconcile_move(&board.ctx, &board.user, &request)).unwrap();

            let landed = board.ctx.ledger().snapshot(&to).unwrap().children;
            prop_assert_eq!(&landed, &outcome.destination_ordered);
            let expected_index = (index as usize).min(landed.len() - 1);
            prop_assert_eq!(&landed[expected_index], &moved);
            assert_dense(&board);
        }

        prop_assert_eq!(all_tasks(&board), before);
    }
}
