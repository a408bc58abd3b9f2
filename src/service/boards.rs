use std::collections::HashMap;

use log::debug;
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;

use super::columns::{self, ColumnSpec, NewColumn};
use super::{
    read_board_row, read_column_row, read_subtask_row, read_task_row, required_text,
    BOARD_COLUMNS, COLUMN_COLUMNS, NOW, SUBTASK_COLUMNS, TASK_COLUMNS,
};
use crate::db;
use crate::error::{invalid, Result};
use crate::guard::{self, ResourceKind};
use crate::model::{Board, BoardDetail, ColumnDetail, OrderItem, Subtask, TaskDetail};
use crate::position::{self, Scope};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoard {
    pub name: String,
    #[serde(default)]
    pub is_default: Option<bool>,
    /// Initial columns, positioned 1..N in the order given.
    #[serde(default)]
    pub columns: Option<Vec<NewColumn>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub position: Option<i64>,
    /// The complete desired column list; see [`columns::update_board_columns`].
    #[serde(default)]
    pub columns: Option<Vec<ColumnSpec>>,
}

const CLEAR_DEFAULT: &str = "
UPDATE boards
SET is_default = 0,
    updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
WHERE user_id = ?1 AND is_default = 1
";

const MARK_DEFAULT: &str = "
UPDATE boards
SET is_default = 1,
    updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
WHERE id = ?1 AND user_id = ?2
";

pub fn list_boards(conn: &Connection, user_id: i64) -> Result<Vec<Board>> {
    let query = format!("SELECT {BOARD_COLUMNS} FROM boards WHERE user_id = ?1 ORDER BY position");
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([user_id], read_board_row)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Into::into)
}

pub fn get_board(conn: &Connection, user_id: i64, board_id: i64) -> Result<Board> {
    guard::require_owned(conn, board_id, user_id, ResourceKind::Board)?;
    let query = format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = ?1");
    let board = conn.query_row(&query, [board_id], read_board_row)?;
    Ok(board)
}

/// The board with every column, task and subtask, each level by position.
pub fn get_board_detail(conn: &Connection, user_id: i64, board_id: i64) -> Result<BoardDetail> {
    let board = get_board(conn, user_id, board_id)?;

    let query =
        format!("SELECT {COLUMN_COLUMNS} FROM columns WHERE board_id = ?1 ORDER BY position");
    let mut stmt = conn.prepare(&query)?;
    let columns = stmt
        .query_map([board_id], read_column_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let query = format!(
        "SELECT {SUBTASK_COLUMNS} FROM subtasks
         WHERE task_id IN (SELECT id FROM tasks WHERE board_id = ?1)
         ORDER BY task_id, position"
    );
    let mut stmt = conn.prepare(&query)?;
    let mut subtasks: HashMap<i64, Vec<Subtask>> = HashMap::new();
    for row in stmt.query_map([board_id], read_subtask_row)? {
        let subtask = row?;
        subtasks.entry(subtask.task_id).or_default().push(subtask);
    }

    let query = format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE board_id = ?1 ORDER BY column_id, position"
    );
    let mut stmt = conn.prepare(&query)?;
    let mut tasks: HashMap<i64, Vec<TaskDetail>> = HashMap::new();
    for row in stmt.query_map([board_id], read_task_row)? {
        let task = row?;
        let subtasks = subtasks.remove(&task.id).unwrap_or_default();
        tasks
            .entry(task.column_id)
            .or_default()
            .push(TaskDetail { task, subtasks });
    }

    let columns = columns
        .into_iter()
        .map(|column| ColumnDetail {
            tasks: tasks.remove(&column.id).unwrap_or_default(),
            column,
        })
        .collect();

    Ok(BoardDetail { board, columns })
}

fn default_board_id(conn: &Connection, user_id: i64) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM boards WHERE user_id = ?1 AND is_default = 1",
            [user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Clear-then-set, inside one savepoint.
fn make_default(conn: &Connection, user_id: i64, board_id: i64) -> Result<()> {
    db::in_savepoint(conn, "make_default", |conn| {
        conn.execute(CLEAR_DEFAULT, [user_id])?;
        conn.execute(MARK_DEFAULT, rusqlite::params![board_id, user_id])?;
        Ok(())
    })
}

/// Create a board at the end of the user's list.
///
/// The user's first board is always the default.
pub fn create_board(conn: &Connection, user_id: i64, new: &NewBoard) -> Result<BoardDetail> {
    let name = required_text("board name", &new.name)?;
    let board_id = db::in_savepoint(conn, "create_board", |conn| {
        let is_first = default_board_id(conn, user_id)?.is_none();
        let position = position::next_position(conn, Scope::Boards(user_id))?;
        conn.execute(
            "INSERT INTO boards (user_id, name, position) VALUES (?1, ?2, ?3)",
            rusqlite::params![user_id, name, position],
        )?;
        let board_id = conn.last_insert_rowid();
        if is_first || new.is_default == Some(true) {
            make_default(conn, user_id, board_id)?;
        }
        for column in new.columns.iter().flatten() {
            columns::insert_column(conn, board_id, column)?;
        }
        Ok(board_id)
    })?;
    debug!("created board {board_id} for user {user_id}");
    get_board_detail(conn, user_id, board_id)
}

pub fn update_board(
    conn: &Connection,
    user_id: i64,
    board_id: i64,
    update: &BoardUpdate,
) -> Result<BoardDetail> {
    db::in_savepoint(conn, "update_board", |conn| {
        let board = get_board(conn, user_id, board_id)?;
        if let Some(name) = &update.name {
            let name = required_text("board name", name)?;
            conn.execute(
                &format!("UPDATE boards SET name = ?1, updated_at = {NOW} WHERE id = ?2"),
                rusqlite::params![name, board_id],
            )?;
        }
        match update.is_default {
            Some(true) if !board.is_default => make_default(conn, user_id, board_id)?,
            Some(false) if board.is_default => {
                invalid!("cannot clear the default flag; mark another board as default instead")
            }
            _ => {}
        }
        if let Some(target) = update.position {
            move_board_to(conn, user_id, board_id, target)?;
        }
        if let Some(specs) = &update.columns {
            columns::update_board_columns(conn, user_id, board_id, specs)?;
        }
        Ok(())
    })?;
    get_board_detail(conn, user_id, board_id)
}

/// Put a board at `target` (1-based, clamped) among the user's boards.
fn move_board_to(conn: &Connection, user_id: i64, board_id: i64, target: i64) -> Result<()> {
    let scope = Scope::Boards(user_id);
    let mut ids = position::ordered_ids(conn, scope)?;
    ids.retain(|&id| id != board_id);
    let index = (target - position::ORIGIN).clamp(0, ids.len() as i64) as usize;
    ids.insert(index, board_id);
    position::apply_order(conn, scope, &ids)
}

/// Delete a board and everything on it.
///
/// The remaining boards are renumbered; if the default board was deleted the
/// first remaining board becomes the default.
pub fn delete_board(conn: &Connection, user_id: i64, board_id: i64) -> Result<()> {
    db::in_savepoint(conn, "delete_board", |conn| {
        let board = get_board(conn, user_id, board_id)?;
        conn.execute("DELETE FROM boards WHERE id = ?1", [board_id])?;
        let scope = Scope::Boards(user_id);
        position::renumber(conn, scope)?;
        if board.is_default {
            if let Some(&first) = position::ordered_ids(conn, scope)?.first() {
                make_default(conn, user_id, first)?;
            }
        }
        Ok(())
    })?;
    debug!("deleted board {board_id} of user {user_id}");
    Ok(())
}

pub fn reorder_boards(conn: &Connection, user_id: i64, items: &[OrderItem]) -> Result<()> {
    super::reorder_siblings(conn, user_id, Scope::Boards(user_id), items)
}

/// Make `board_id` the user's only default board.
pub fn set_default_board(conn: &Connection, user_id: i64, board_id: i64) -> Result<()> {
    db::in_savepoint(conn, "set_default_board", |conn| {
        guard::require_owned(conn, board_id, user_id, ResourceKind::Board)?;
        make_default(conn, user_id, board_id)
    })
}
