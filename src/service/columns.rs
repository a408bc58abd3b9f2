use std::collections::HashSet;

use log::debug;
use rusqlite::Connection;
use serde::Deserialize;

use super::{read_column_row, required_text, COLUMN_COLUMNS, NOW};
use crate::db;
use crate::error::{invalid, Error, Result};
use crate::guard::{self, ResourceKind};
use crate::model::{Column, OrderItem};
use crate::position::{self, Scope};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewColumn {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// One entry of a board's desired column list: an existing column (`id`
/// set) or a new one (`id` absent or `is_new`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub position: i64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_new: bool,
}

impl ColumnSpec {
    fn existing_id(&self) -> Option<i64> {
        if self.is_new {
            None
        } else {
            self.id
        }
    }
}

const INSERT_COLUMN: &str = "
INSERT INTO columns (board_id, name, color, position) VALUES (?1, ?2, ?3, ?4)
";

const SYNC_TASK_STATUS: &str = "
UPDATE tasks
SET status = (SELECT name FROM columns WHERE id = ?1),
    updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
WHERE column_id = ?1
";

pub fn get_column(conn: &Connection, user_id: i64, column_id: i64) -> Result<Column> {
    guard::require_owned(conn, column_id, user_id, ResourceKind::Column)?;
    let query = format!("SELECT {COLUMN_COLUMNS} FROM columns WHERE id = ?1");
    let column = conn.query_row(&query, [column_id], read_column_row)?;
    Ok(column)
}

fn list_columns(conn: &Connection, board_id: i64) -> Result<Vec<Column>> {
    let query =
        format!("SELECT {COLUMN_COLUMNS} FROM columns WHERE board_id = ?1 ORDER BY position");
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([board_id], read_column_row)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Into::into)
}

/// Insert at the end of the board. Ownership is the caller's concern.
pub(crate) fn insert_column(conn: &Connection, board_id: i64, new: &NewColumn) -> Result<i64> {
    let name = required_text("column name", &new.name)?;
    let position = position::next_position(conn, Scope::Columns(board_id))?;
    conn.execute(
        INSERT_COLUMN,
        rusqlite::params![board_id, name, new.color.as_deref().unwrap_or(""), position],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn create_column(
    conn: &Connection,
    user_id: i64,
    board_id: i64,
    new: &NewColumn,
) -> Result<Column> {
    guard::require_owned(conn, board_id, user_id, ResourceKind::Board)?;
    let column_id = insert_column(conn, board_id, new)?;
    debug!("created column {column_id} on board {board_id}");
    get_column(conn, user_id, column_id)
}

/// Rename and/or recolor a column. Renaming refreshes the status of every
/// task in it.
pub fn update_column(
    conn: &Connection,
    user_id: i64,
    column_id: i64,
    update: &ColumnUpdate,
) -> Result<Column> {
    db::in_savepoint(conn, "update_column", |conn| {
        guard::require_owned(conn, column_id, user_id, ResourceKind::Column)?;
        if let Some(name) = &update.name {
            let name = required_text("column name", name)?;
            conn.execute(
                &format!("UPDATE columns SET name = ?1, updated_at = {NOW} WHERE id = ?2"),
                rusqlite::params![name, column_id],
            )?;
            conn.execute(SYNC_TASK_STATUS, [column_id])?;
        }
        if let Some(color) = &update.color {
            conn.execute(
                &format!("UPDATE columns SET color = ?1, updated_at = {NOW} WHERE id = ?2"),
                rusqlite::params![color, column_id],
            )?;
        }
        Ok(())
    })?;
    get_column(conn, user_id, column_id)
}

/// Delete a column with its tasks and subtasks, then close the gap.
pub fn delete_column(conn: &Connection, user_id: i64, column_id: i64) -> Result<()> {
    db::in_savepoint(conn, "delete_column", |conn| {
        let board_id = guard::owned_board_of(conn, column_id, user_id, ResourceKind::Column)?;
        conn.execute("DELETE FROM columns WHERE id = ?1", [column_id])?;
        position::renumber(conn, Scope::Columns(board_id))
    })?;
    debug!("deleted column {column_id}");
    Ok(())
}

pub fn reorder_columns(
    conn: &Connection,
    user_id: i64,
    board_id: i64,
    items: &[OrderItem],
) -> Result<()> {
    super::reorder_siblings(conn, user_id, Scope::Columns(board_id), items)
}

/// Replace a board's column list in one step.
///
/// Columns missing from `specs` are deleted along with their tasks. The rest
/// are written in three phases so no two columns ever share a position:
/// surviving columns are parked at their quarantined final position, new
/// columns are inserted directly into quarantine, then every column moves to
/// its final position. Final positions follow the submitted `position`
/// values, renumbered densely.
pub fn update_board_columns(
    conn: &Connection,
    user_id: i64,
    board_id: i64,
    specs: &[ColumnSpec],
) -> Result<Vec<Column>> {
    db::in_savepoint(conn, "update_board_columns", |conn| {
        guard::require_owned(conn, board_id, user_id, ResourceKind::Board)?;

        let current: HashSet<i64> = position::ordered_ids(conn, Scope::Columns(board_id))?
            .into_iter()
            .collect();
        let mut keep = HashSet::new();
        for spec in specs {
            required_text("column name", &spec.name)?;
            if let Some(id) = spec.existing_id() {
                if !current.contains(&id) {
                    return Err(Error::not_found(ResourceKind::Column, id));
                }
                if !keep.insert(id) {
                    invalid!("column {id} is listed more than once");
                }
            }
        }

        for &id in current.difference(&keep) {
            conn.execute("DELETE FROM columns WHERE id = ?1", [id])?;
            debug!("update_board_columns: dropped column {id} from board {board_id}");
        }

        let mut ordered: Vec<&ColumnSpec> = specs.iter().collect();
        ordered.sort_by_key(|spec| spec.position);

        let mut placed = Vec::with_capacity(ordered.len());
        for (spec, final_position) in position::normalize(&ordered) {
            let name = spec.name.trim();
            let parked = position::quarantined(final_position);
            let id = match spec.existing_id() {
                Some(id) => {
                    conn.execute(
                        &format!(
                            "UPDATE columns
                             SET name = ?1, color = COALESCE(?2, color), position = ?3,
                                 updated_at = {NOW}
                             WHERE id = ?4"
                        ),
                        rusqlite::params![name, spec.color, parked, id],
                    )?;
                    conn.execute(SYNC_TASK_STATUS, [id])?;
                    id
                }
                None => {
                    conn.execute(
                        INSERT_COLUMN,
                        rusqlite::params![
                            board_id,
                            name,
                            spec.color.as_deref().unwrap_or(""),
                            parked
                        ],
                    )?;
                    conn.last_insert_rowid()
                }
            };
            placed.push((id, final_position));
        }

        for (id, final_position) in placed {
            conn.execute(
                "UPDATE columns SET position = ?1 WHERE id = ?2",
                rusqlite::params![final_position, id],
            )?;
        }

        list_columns(conn, board_id)
    })
}
