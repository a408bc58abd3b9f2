use std::fmt;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::{invalid, Result};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub is_default: bool,
    pub position: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub color: String,
    pub position: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => invalid!("invalid priority '{s}': must be low, medium, or high"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Low => ".",
            Self::Medium => "*",
            Self::High => "!",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Priority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Priority::parse(s).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub board_id: i64,
    pub column_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Name of the owning column at the time of the last write.
    pub status: String,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub position: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    pub completed: bool,
    pub position: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Subtask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDetail {
    #[serde(flatten)]
    pub column: Column,
    pub tasks: Vec<TaskDetail>,
}

/// A board with its full Columns → Tasks → Subtasks hierarchy, every level
/// ordered by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDetail {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<ColumnDetail>,
}

impl BoardDetail {
    pub fn column(&self, column_id: i64) -> Option<&ColumnDetail> {
        self.columns.iter().find(|c| c.column.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: i64) -> Option<&mut ColumnDetail> {
        self.columns.iter_mut().find(|c| c.column.id == column_id)
    }

    /// The column currently holding `task_id`.
    pub fn column_of_task(&self, task_id: i64) -> Option<i64> {
        self.columns
            .iter()
            .find(|c| c.tasks.iter().any(|t| t.task.id == task_id))
            .map(|c| c.column.id)
    }

    pub fn task(&self, task_id: i64) -> Option<&TaskDetail> {
        self.columns
            .iter()
            .flat_map(|c| c.tasks.iter())
            .find(|t| t.task.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: i64) -> Option<&mut TaskDetail> {
        self.columns
            .iter_mut()
            .flat_map(|c| c.tasks.iter_mut())
            .find(|t| t.task.id == task_id)
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

/// One entry of a reorder request: the sibling `id` should end up at
/// `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub position: i64,
}

impl OrderItem {
    /// Number an id list 1, 2, 3, ... in the given order.
    pub fn sequence(ids: &[i64]) -> Vec<OrderItem> {
        ids.iter()
            .zip(crate::position::ORIGIN..)
            .map(|(&id, position)| OrderItem { id, position })
            .collect()
    }
}
