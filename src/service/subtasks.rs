use log::debug;
use rusqlite::Connection;
use serde::Deserialize;

use super::{read_subtask_row, required_text, NOW, SUBTASK_COLUMNS};
use crate::db;
use crate::error::Result;
use crate::guard::{self, ResourceKind};
use crate::model::{OrderItem, Subtask};
use crate::position::{self, Scope};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubtask {
    pub task_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

fn read_subtask(conn: &Connection, subtask_id: i64) -> Result<Subtask> {
    let query = format!("SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE id = ?1");
    let subtask = conn.query_row(&query, [subtask_id], read_subtask_row)?;
    Ok(subtask)
}

pub fn list_subtasks(conn: &Connection, user_id: i64, task_id: i64) -> Result<Vec<Subtask>> {
    guard::require_owned(conn, task_id, user_id, ResourceKind::Task)?;
    let query =
        format!("SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE task_id = ?1 ORDER BY position");
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([task_id], read_subtask_row)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Into::into)
}

pub fn get_subtask(conn: &Connection, user_id: i64, subtask_id: i64) -> Result<Subtask> {
    guard::require_owned(conn, subtask_id, user_id, ResourceKind::Subtask)?;
    read_subtask(conn, subtask_id)
}

pub fn create_subtask(conn: &Connection, user_id: i64, new: &NewSubtask) -> Result<Subtask> {
    let title = required_text("subtask title", &new.title)?;
    guard::require_owned(conn, new.task_id, user_id, ResourceKind::Task)?;
    let position = position::next_position(conn, Scope::Subtasks(new.task_id))?;
    conn.execute(
        "INSERT INTO subtasks (task_id, title, position) VALUES (?1, ?2, ?3)",
        rusqlite::params![new.task_id, title, position],
    )?;
    let subtask_id = conn.last_insert_rowid();
    debug!("created subtask {subtask_id} on task {}", new.task_id);
    read_subtask(conn, subtask_id)
}

pub fn update_subtask(
    conn: &Connection,
    user_id: i64,
    subtask_id: i64,
    update: &SubtaskUpdate,
) -> Result<Subtask> {
    db::in_savepoint(conn, "update_subtask", |conn| {
        guard::require_owned(conn, subtask_id, user_id, ResourceKind::Subtask)?;
        if let Some(title) = &update.title {
            let title = required_text("subtask title", title)?;
            conn.execute(
                &format!("UPDATE subtasks SET title = ?1, updated_at = {NOW} WHERE id = ?2"),
                rusqlite::params![title, subtask_id],
            )?;
        }
        if let Some(completed) = update.completed {
            conn.execute(
                &format!("UPDATE subtasks SET completed = ?1, updated_at = {NOW} WHERE id = ?2"),
                rusqlite::params![completed, subtask_id],
            )?;
        }
        read_subtask(conn, subtask_id)
    })
}

/// Flip `completed`.
pub fn toggle_subtask(conn: &Connection, user_id: i64, subtask_id: i64) -> Result<Subtask> {
    guard::require_owned(conn, subtask_id, user_id, ResourceKind::Subtask)?;
    conn.execute(
        &format!(
            "UPDATE subtasks SET completed = 1 - completed, updated_at = {NOW} WHERE id = ?1"
        ),
        [subtask_id],
    )?;
    read_subtask(conn, subtask_id)
}

pub fn delete_subtask(conn: &Connection, user_id: i64, subtask_id: i64) -> Result<()> {
    db::in_savepoint(conn, "delete_subtask", |conn| {
        guard::require_owned(conn, subtask_id, user_id, ResourceKind::Subtask)?;
        let subtask = read_subtask(conn, subtask_id)?;
        conn.execute("DELETE FROM subtasks WHERE id = ?1", [subtask_id])?;
        position::renumber(conn, Scope::Subtasks(subtask.task_id))
    })?;
    debug!("deleted subtask {subtask_id}");
    Ok(())
}

pub fn reorder_subtasks(
    conn: &Connection,
    user_id: i64,
    task_id: i64,
    items: &[OrderItem],
) -> Result<()> {
    super::reorder_siblings(conn, user_id, Scope::Subtasks(task_id), items)
}
