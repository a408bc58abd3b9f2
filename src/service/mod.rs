//! Board, column, task and subtask operations.
//!
//! Every public function takes the requesting user's id and checks ownership
//! before reading or writing. Multi-row writes run inside a savepoint so a
//! failure part way through leaves nothing behind.

mod boards;
mod columns;
mod subtasks;
mod tasks;

use std::collections::HashSet;

use rusqlite::Connection;

use crate::db;
use crate::error::{invalid, Error, Result};
use crate::guard::{self, ResourceKind};
use crate::model::{Board, Column, OrderItem, Subtask, Task};
use crate::position::{self, Scope};

pub use boards::{
    create_board, delete_board, get_board, get_board_detail, list_boards, reorder_boards,
    set_default_board, update_board, BoardUpdate, NewBoard,
};
pub use columns::{
    create_column, delete_column, get_column, reorder_columns, update_board_columns,
    update_column, ColumnSpec, ColumnUpdate, NewColumn,
};
pub use subtasks::{
    create_subtask, delete_subtask, get_subtask, list_subtasks, reorder_subtasks,
    toggle_subtask, update_subtask, NewSubtask, SubtaskUpdate,
};
pub use tasks::{
    create_task, delete_task, get_task, move_task, relocate_task, reorder_tasks, update_task,
    MoveTask, NewTask, RelocateTask, SubtaskSpec, TaskUpdate,
};

pub(crate) const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%SZ', 'now')";

pub(crate) const BOARD_COLUMNS: &str =
    "id, user_id, name, is_default, position, created_at, updated_at";

pub(crate) const COLUMN_COLUMNS: &str =
    "id, board_id, name, color, position, created_at, updated_at";

pub(crate) const TASK_COLUMNS: &str = "id, board_id, column_id, title, description, status, \
     priority, due_date, position, created_at, updated_at";

pub(crate) const SUBTASK_COLUMNS: &str =
    "id, task_id, title, completed, position, created_at, updated_at";

pub(crate) fn read_board_row(row: &rusqlite::Row) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        is_default: row.get(3)?,
        position: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub(crate) fn read_column_row(row: &rusqlite::Row) -> rusqlite::Result<Column> {
    Ok(Column {
        id: row.get(0)?,
        board_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        position: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub(crate) fn read_task_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        board_id: row.get(1)?,
        column_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        status: row.get(5)?,
        priority: row.get(6)?,
        due_date: row.get(7)?,
        position: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

pub(crate) fn read_subtask_row(row: &rusqlite::Row) -> rusqlite::Result<Subtask> {
    Ok(Subtask {
        id: row.get(0)?,
        task_id: row.get(1)?,
        title: row.get(2)?,
        completed: row.get(3)?,
        position: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Trim `value` and reject it when nothing is left.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        invalid!("{field} must not be empty");
    }
    Ok(trimmed.to_string())
}

/// Turn a caller's `{id, position}` list into the scope's final id order.
///
/// The list must name every current sibling exactly once. Items are ordered
/// by submitted position; ties keep their submitted order.
pub(crate) fn order_from_items(
    scope: Scope,
    current: &[i64],
    items: &[OrderItem],
) -> Result<Vec<i64>> {
    let known: HashSet<i64> = current.iter().copied().collect();
    let mut seen = HashSet::new();
    for item in items {
        if !known.contains(&item.id) {
            return Err(Error::not_found(scope.child_kind(), item.id));
        }
        if !seen.insert(item.id) {
            invalid!("{} {} is listed more than once", scope.child_kind(), item.id);
        }
    }
    if seen.len() != known.len() {
        invalid!(
            "items must list all {} {}s in scope, got {}",
            known.len(),
            scope.child_kind(),
            seen.len()
        );
    }
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| item.position);
    Ok(sorted.into_iter().map(|item| item.id).collect())
}

/// The owner check for a scope's parent.
fn require_scope_owned(conn: &Connection, user_id: i64, scope: Scope) -> Result<()> {
    match scope {
        Scope::Boards(owner) if owner == user_id => Ok(()),
        Scope::Boards(owner) => Err(Error::Authentication(format!(
            "cannot reorder boards of user {owner}"
        ))),
        Scope::Columns(board) => guard::require_owned(conn, board, user_id, ResourceKind::Board),
        Scope::Tasks(column) => guard::require_owned(conn, column, user_id, ResourceKind::Column),
        Scope::Subtasks(task) => guard::require_owned(conn, task, user_id, ResourceKind::Task),
    }
}

/// Persist a full reordering of one sibling set.
///
/// Calling this twice with the same items leaves the same positions as
/// calling it once.
pub fn reorder_siblings(
    conn: &Connection,
    user_id: i64,
    scope: Scope,
    items: &[OrderItem],
) -> Result<()> {
    db::in_savepoint(conn, "reorder_siblings", |conn| {
        require_scope_owned(conn, user_id, scope)?;
        let current = position::ordered_ids(conn, scope)?;
        let order = order_from_items(scope, &current, items)?;
        position::apply_order(conn, scope, &order)
    })
}

#[cfg(test)]
pub(crate) mod testutil {
    use rusqlite::Connection;

    use crate::auth;
    use crate::db;
    use crate::model::BoardDetail;
    use crate::position::{self, Scope};

    use super::*;

    pub fn conn_with_user(name: &str) -> (Connection, i64) {
        let conn = db::open_memory().unwrap();
        let (user, _) = auth::create_user(&conn, name).unwrap();
        (conn, user.id)
    }

    pub fn add_user(conn: &Connection, name: &str) -> i64 {
        auth::create_user(conn, name).unwrap().0.id
    }

    /// A board with the given column names, in order.
    pub fn board(conn: &Connection, user: i64, name: &str, columns: &[&str]) -> BoardDetail {
        create_board(
            conn,
            user,
            &NewBoard {
                name: name.into(),
                is_default: None,
                columns: Some(
                    columns
                        .iter()
                        .map(|c| NewColumn {
                            name: (*c).into(),
                            color: None,
                        })
                        .collect(),
                ),
            },
        )
        .unwrap()
    }

    pub fn task(conn: &Connection, user: i64, column: i64, title: &str) -> i64 {
        create_task(
            conn,
            user,
            &NewTask {
                column_id: column,
                title: title.into(),
                ..Default::default()
            },
        )
        .unwrap()
        .task
        .id
    }

    pub fn titles_in(conn: &Connection, user: i64, board: i64, column: i64) -> Vec<String> {
        let detail = get_board_detail(conn, user, board).unwrap();
        detail
            .column(column)
            .unwrap()
            .tasks
            .iter()
            .map(|t| t.task.title.clone())
            .collect()
    }

    pub fn assert_dense(conn: &Connection, scope: Scope) {
        let positions = position::positions(conn, scope).unwrap();
        assert!(position::is_dense(&positions), "{scope:?} not dense: {positions:?}");
    }
}
