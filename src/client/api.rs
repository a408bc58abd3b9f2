use rusqlite::Connection;

use crate::error::Result;
use crate::model::{Board, BoardDetail, OrderItem, Subtask, Task, TaskDetail};
use crate::service::{self, MoveTask, SubtaskUpdate};

/// The requests a board client issues against the authoritative store.
pub trait BoardApi {
    fn list_boards(&self) -> Result<Vec<Board>>;
    fn get_board(&self, board_id: i64) -> Result<BoardDetail>;
    fn get_task(&self, task_id: i64) -> Result<TaskDetail>;
    fn list_subtasks(&self, task_id: i64) -> Result<Vec<Subtask>>;

    fn delete_board(&self, board_id: i64) -> Result<()>;
    fn reorder_boards(&self, items: &[OrderItem]) -> Result<()>;
    fn set_default_board(&self, board_id: i64) -> Result<()>;
    fn reorder_columns(&self, board_id: i64, items: &[OrderItem]) -> Result<()>;
    fn move_task(&self, task_id: i64, to: &MoveTask) -> Result<Task>;
    fn reorder_tasks(&self, column_id: i64, items: &[OrderItem]) -> Result<()>;
    fn update_subtask(&self, subtask_id: i64, update: &SubtaskUpdate) -> Result<Subtask>;
}

/// In-process [`BoardApi`] acting as one user on a local database.
pub struct LocalApi {
    conn: Connection,
    user_id: i64,
}

impl LocalApi {
    pub fn new(conn: Connection, user_id: i64) -> Self {
        Self { conn, user_id }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}

impl BoardApi for LocalApi {
    fn list_boards(&self) -> Result<Vec<Board>> {
        service::list_boards(&self.conn, self.user_id)
    }

    fn get_board(&self, board_id: i64) -> Result<BoardDetail> {
        service::get_board_detail(&self.conn, self.user_id, board_id)
    }

    fn get_task(&self, task_id: i64) -> Result<TaskDetail> {
        service::get_task(&self.conn, self.user_id, task_id)
    }

    fn list_subtasks(&self, task_id: i64) -> Result<Vec<Subtask>> {
        service::list_subtasks(&self.conn, self.user_id, task_id)
    }

    fn delete_board(&self, board_id: i64) -> Result<()> {
        service::delete_board(&self.conn, self.user_id, board_id)
    }

    fn reorder_boards(&self, items: &[OrderItem]) -> Result<()> {
        service::reorder_boards(&self.conn, self.user_id, items)
    }

    fn set_default_board(&self, board_id: i64) -> Result<()> {
        service::set_default_board(&self.conn, self.user_id, board_id)
    }

    fn reorder_columns(&self, board_id: i64, items: &[OrderItem]) -> Result<()> {
        service::reorder_columns(&self.conn, self.user_id, board_id, items)
    }

    fn move_task(&self, task_id: i64, to: &MoveTask) -> Result<Task> {
        service::move_task(&self.conn, self.user_id, task_id, to)
    }

    fn reorder_tasks(&self, column_id: i64, items: &[OrderItem]) -> Result<()> {
        service::reorder_tasks(&self.conn, self.user_id, column_id, items)
    }

    fn update_subtask(&self, subtask_id: i64, update: &SubtaskUpdate) -> Result<Subtask> {
        service::update_subtask(&self.conn, self.user_id, subtask_id, update)
    }
}
