//! A second connection never observes a half-applied reorder.

use rusqlite::Connection;

use taskboard::model::BoardDetail;
use taskboard::service::{self, ColumnSpec, NewBoard, NewColumn, NewTask};
use taskboard::{auth, db};

fn open(path: &str) -> Connection {
    let conn = db::open(path).unwrap();
    db::init(&conn).unwrap();
    conn
}

fn column_order(detail: &BoardDetail) -> Vec<(String, i64)> {
    detail
        .columns
        .iter()
        .map(|c| (c.column.name.clone(), c.column.position))
        .collect()
}

fn specs(detail: &BoardDetail, order: &[&str]) -> Vec<ColumnSpec> {
    detail
        .columns
        .iter()
        .map(|c| ColumnSpec {
            id: Some(c.column.id),
            name: c.column.name.clone(),
            position: order
                .iter()
                .position(|name| *name == c.column.name)
                .map(|i| i as i64 + 1)
                .unwrap(),
            color: None,
            is_new: false,
        })
        .collect()
}

#[test]
fn reader_sees_old_or_new_order_never_the_middle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");
    let path = path.to_str().unwrap();

    let writer = open(path);
    let (user, _) = auth::create_user(&writer, "alice").unwrap();
    let columns = ["Todo", "Doing", "Done"]
        .iter()
        .map(|name| NewColumn {
            name: name.to_string(),
            color: None,
        })
        .collect();
    let board = service::create_board(
        &writer,
        user.id,
        &NewBoard {
            name: "Work".into(),
            columns: Some(columns),
            ..Default::default()
        },
    )
    .unwrap();

    let reader = open(path);
    let before = vec![
        ("Todo".to_string(), 1),
        ("Doing".to_string(), 2),
        ("Done".to_string(), 3),
    ];
    let after = vec![
        ("Done".to_string(), 1),
        ("Doing".to_string(), 2),
        ("Todo".to_string(), 3),
    ];

    writer.execute_batch("BEGIN").unwrap();
    service::update_board_columns(
        &writer,
        user.id,
        board.board.id,
        &specs(&board, &["Done", "Doing", "Todo"]),
    )
    .unwrap();

    // The writer sees its own dense result; the reader still sees the
    // committed state.
    let own = service::get_board_detail(&writer, user.id, board.board.id).unwrap();
    assert_eq!(column_order(&own), after);
    let seen = service::get_board_detail(&reader, user.id, board.board.id).unwrap();
    assert_eq!(column_order(&seen), before);

    writer.execute_batch("COMMIT").unwrap();

    let seen = service::get_board_detail(&reader, user.id, board.board.id).unwrap();
    assert_eq!(column_order(&seen), after);
}

#[test]
fn rolled_back_move_leaves_reader_state_intact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");
    let path = path.to_str().unwrap();

    let writer = open(path);
    let (user, _) = auth::create_user(&writer, "alice").unwrap();
    let board = service::create_board(
        &writer,
        user.id,
        &NewBoard {
            name: "Work".into(),
            columns: Some(vec![
                NewColumn {
                    name: "Todo".into(),
                    color: None,
                },
                NewColumn {
                    name: "Done".into(),
                    color: None,
                },
            ]),
            ..Default::default()
        },
    )
    .unwrap();
    let todo = board.columns[0].column.id;
    let done = board.columns[1].column.id;
    let mut tasks = Vec::new();
    for title in ["a", "b", "c"] {
        let task = service::create_task(
            &writer,
            user.id,
            &NewTask {
                column_id: todo,
                title: title.into(),
                ..Default::default()
            },
        )
        .unwrap();
        tasks.push(task.task.id);
    }

    writer.execute_batch("BEGIN").unwrap();
    service::move_task(
        &writer,
        user.id,
        tasks[1],
        &service::MoveTask {
            column_id: done,
            position: 1,
        },
    )
    .unwrap();
    writer.execute_batch("ROLLBACK").unwrap();

    let reader = open(path);
    let detail = service::get_board_detail(&reader, user.id, board.board.id).unwrap();
    let todo_tasks: Vec<(i64, i64)> = detail.columns[0]
        .tasks
        .iter()
        .map(|t| (t.task.id, t.task.position))
        .collect();
    assert_eq!(todo_tasks, vec![(tasks[0], 1), (tasks[1], 2), (tasks[2], 3)]);
    assert!(detail.columns[1].tasks.is_empty());
}
