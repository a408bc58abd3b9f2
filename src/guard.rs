//! Ownership checks.
//!
//! A resource belongs to a user when the join path Subtask → Task → Board →
//! User (or Column → Board → User) ends at that user. Missing resources and
//! other users' resources look the same from the outside.

use std::fmt;

use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Board,
    Column,
    Task,
    Subtask,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Column => "column",
            Self::Task => "task",
            Self::Subtask => "subtask",
        }
    }

    fn owner_query(self) -> &'static str {
        match self {
            Self::Board => "SELECT b.user_id FROM boards b WHERE b.id = ?1",
            Self::Column => {
                "SELECT b.user_id FROM columns c
                 JOIN boards b ON b.id = c.board_id
                 WHERE c.id = ?1"
            }
            Self::Task => {
                "SELECT b.user_id FROM tasks t
                 JOIN columns c ON c.id = t.column_id AND c.board_id = t.board_id
                 JOIN boards b ON b.id = c.board_id
                 WHERE t.id = ?1"
            }
            Self::Subtask => {
                "SELECT b.user_id FROM subtasks s
                 JOIN tasks t ON t.id = s.task_id
                 JOIN columns c ON c.id = t.column_id AND c.board_id = t.board_id
                 JOIN boards b ON b.id = c.board_id
                 WHERE s.id = ?1"
            }
        }
    }

    fn board_query(self) -> &'static str {
        match self {
            Self::Board => "SELECT id FROM boards WHERE id = ?1",
            Self::Column => "SELECT board_id FROM columns WHERE id = ?1",
            Self::Task => "SELECT board_id FROM tasks WHERE id = ?1",
            Self::Subtask => {
                "SELECT t.board_id FROM subtasks s JOIN tasks t ON t.id = s.task_id WHERE s.id = ?1"
            }
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `id` exists and transitively belongs to `user_id`.
///
/// Only store failures are errors; a missing or foreign resource is `false`.
pub fn verify_ownership(
    conn: &Connection,
    id: i64,
    user_id: i64,
    kind: ResourceKind,
) -> Result<bool> {
    let owner: Option<i64> = conn
        .prepare_cached(kind.owner_query())?
        .query_row([id], |row| row.get(0))
        .optional()?;
    Ok(owner == Some(user_id))
}

/// [`verify_ownership`], with `false` turned into `NotFound`.
pub fn require_owned(conn: &Connection, id: i64, user_id: i64, kind: ResourceKind) -> Result<()> {
    if !verify_ownership(conn, id, user_id, kind)? {
        return Err(Error::not_found(kind, id));
    }
    Ok(())
}

/// The board an owned resource lives on.
pub fn owned_board_of(
    conn: &Connection,
    id: i64,
    user_id: i64,
    kind: ResourceKind,
) -> Result<i64> {
    require_owned(conn, id, user_id, kind)?;
    let board = conn
        .prepare_cached(kind.board_query())?
        .query_row([id], |row| row.get(0))?;
    Ok(board)
}
