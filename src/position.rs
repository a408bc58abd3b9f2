//! Position assignment for sibling sets.
//!
//! Every board, column, task and subtask carries an integer `position` that is
//! unique within its parent scope. After every committed mutation the
//! positions of a scope are exactly `ORIGIN, ORIGIN + 1, ..`.
//!
//! The store enforces uniqueness at write time, so a reordering cannot simply
//! assign final values one row at a time: swapping two siblings would collide
//! halfway through. [`apply_order`] therefore writes in two phases. Rows whose
//! position changes are first parked in the negative quarantine band, which no
//! real position ever occupies, and then moved to their final value.

use std::collections::HashMap;

use log::debug;
use rusqlite::Connection;

use crate::db;
use crate::error::{Error, Result};
use crate::guard::ResourceKind;

/// The position of the first sibling in every scope.
pub const ORIGIN: i64 = 1;

/// A sibling set: the children of one parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A user's boards.
    Boards(i64),
    /// A board's columns.
    Columns(i64),
    /// A column's tasks.
    Tasks(i64),
    /// A task's subtasks.
    Subtasks(i64),
}

impl Scope {
    fn table(self) -> &'static str {
        match self {
            Self::Boards(_) => "boards",
            Self::Columns(_) => "columns",
            Self::Tasks(_) => "tasks",
            Self::Subtasks(_) => "subtasks",
        }
    }

    fn parent_column(self) -> &'static str {
        match self {
            Self::Boards(_) => "user_id",
            Self::Columns(_) => "board_id",
            Self::Tasks(_) => "column_id",
            Self::Subtasks(_) => "task_id",
        }
    }

    pub fn parent_id(self) -> i64 {
        match self {
            Self::Boards(id) | Self::Columns(id) | Self::Tasks(id) | Self::Subtasks(id) => id,
        }
    }

    /// The kind of resource this scope contains.
    pub fn child_kind(self) -> ResourceKind {
        match self {
            Self::Boards(_) => ResourceKind::Board,
            Self::Columns(_) => ResourceKind::Column,
            Self::Tasks(_) => ResourceKind::Task,
            Self::Subtasks(_) => ResourceKind::Subtask,
        }
    }
}

/// Temporary position for a row on its way to `final_position`.
pub fn quarantined(final_position: i64) -> i64 {
    -final_position
}

/// `max(position) + 1`, or [`ORIGIN`] for an empty scope.
pub fn next_position(conn: &Connection, scope: Scope) -> Result<i64> {
    let query = format!(
        "SELECT COALESCE(MAX(position) + 1, ?1) FROM {} WHERE {} = ?2 AND position >= ?1",
        scope.table(),
        scope.parent_column()
    );
    let next = conn.query_row(&query, rusqlite::params![ORIGIN, scope.parent_id()], |row| {
        row.get(0)
    })?;
    Ok(next)
}

/// Pair each element of an already-ordered sequence with its dense position.
pub fn normalize<T: Copy>(ordered: &[T]) -> Vec<(T, i64)> {
    ordered.iter().copied().zip(ORIGIN..).collect()
}

/// Ids of the scope's children in their current order.
pub fn ordered_ids(conn: &Connection, scope: Scope) -> Result<Vec<i64>> {
    let query = format!(
        "SELECT id FROM {} WHERE {} = ?1 ORDER BY position, id",
        scope.table(),
        scope.parent_column()
    );
    let mut stmt = conn.prepare_cached(&query)?;
    let rows = stmt.query_map([scope.parent_id()], |row| row.get(0))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Into::into)
}

/// Positions of the scope's children, ascending.
pub fn positions(conn: &Connection, scope: Scope) -> Result<Vec<i64>> {
    let query = format!(
        "SELECT position FROM {} WHERE {} = ?1 ORDER BY position",
        scope.table(),
        scope.parent_column()
    );
    let mut stmt = conn.prepare_cached(&query)?;
    let rows = stmt.query_map([scope.parent_id()], |row| row.get(0))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Into::into)
}

/// True when `positions` is a permutation of `ORIGIN..ORIGIN + len`.
pub fn is_dense(positions: &[i64]) -> bool {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted.into_iter().zip(ORIGIN..).all(|(actual, expected)| actual == expected)
}

/// Persist `ids` as the scope's order, numbered densely from [`ORIGIN`].
///
/// Every id must belong to the scope (else `NotFound`). Siblings left out of
/// `ids` keep their position; if that collides with a final value the store
/// rejects the write and the whole call is rolled back.
pub fn apply_order(conn: &Connection, scope: Scope, ids: &[i64]) -> Result<()> {
    db::in_savepoint(conn, "apply_order", |conn| {
        let current = current_positions(conn, scope)?;
        let mut changed = Vec::new();
        for (id, position) in normalize(ids) {
            match current.get(&id) {
                None => return Err(Error::not_found(scope.child_kind(), id)),
                Some(&p) if p == position => {}
                Some(_) => changed.push((id, position)),
            }
        }
        if changed.is_empty() {
            return Ok(());
        }
        debug!("reordering {scope:?}: {} of {} rows move", changed.len(), ids.len());

        let park = format!(
            "UPDATE {} SET position = ?1 WHERE id = ?2 AND {} = ?3",
            scope.table(),
            scope.parent_column()
        );
        let commit = format!(
            "UPDATE {} SET position = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
             WHERE id = ?2 AND {} = ?3",
            scope.table(),
            scope.parent_column()
        );
        for &(id, position) in &changed {
            conn.execute(
                &park,
                rusqlite::params![quarantined(position), id, scope.parent_id()],
            )?;
        }
        for &(id, position) in &changed {
            conn.execute(&commit, rusqlite::params![position, id, scope.parent_id()])?;
        }
        Ok(())
    })
}

/// Close any gaps in the scope, keeping the current relative order.
pub fn renumber(conn: &Connection, scope: Scope) -> Result<()> {
    let ids = ordered_ids(conn, scope)?;
    apply_order(conn, scope, &ids)
}

fn current_positions(conn: &Connection, scope: Scope) -> Result<HashMap<i64, i64>> {
    let query = format!(
        "SELECT id, position FROM {} WHERE {} = ?1",
        scope.table(),
        scope.parent_column()
    );
    let mut stmt = conn.prepare_cached(&query)?;
    let rows = stmt.query_map([scope.parent_id()], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect::<rusqlite::Result<HashMap<_, _>>>()
        .map_err(Into::into)
}
