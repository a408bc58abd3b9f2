use std::collections::HashSet;

use log::debug;
use rusqlite::Connection;
use serde::Deserialize;

use super::{
    order_from_items, read_subtask_row, read_task_row, required_text, SUBTASK_COLUMNS,
    TASK_COLUMNS, NOW,
};
use crate::db;
use crate::error::{invalid, Error, Result};
use crate::guard::{self, ResourceKind};
use crate::model::{OrderItem, Priority, Task, TaskDetail};
use crate::position::{self, Scope};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub column_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<String>,
    /// Titles of initial subtasks, positioned 1..N in the order given.
    #[serde(default)]
    pub subtasks: Vec<String>,
}

/// One entry of a task's desired subtask list. Entries without an `id` are
/// created.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskSpec {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    /// An empty string clears the description.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// An empty string clears the due date.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Moves the task to the end of another column on the same board.
    #[serde(default)]
    pub column_id: Option<i64>,
    /// The complete desired subtask list, in order.
    #[serde(default)]
    pub subtasks: Option<Vec<SubtaskSpec>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTask {
    pub column_id: i64,
    /// 1-based slot in the destination column.
    pub position: i64,
}

/// A cross-column move together with the final order of both columns.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocateTask {
    pub column_id: i64,
    /// The source column's task ids after the move.
    #[serde(default)]
    pub source_order: Vec<i64>,
    /// The destination column's task ids after the move, including the task.
    pub destination_order: Vec<i64>,
}

const INSERT_TASK: &str = "
INSERT INTO tasks (board_id, column_id, title, description, status, priority, due_date, position)
VALUES (?1, ?2, ?3, ?4, (SELECT name FROM columns WHERE id = ?2), ?5, ?6, ?7)
";

/// Put a task into `column_id` at `position`, taking the column's name as
/// its status.
const PLACE_TASK: &str = "
UPDATE tasks
SET column_id = ?1,
    position = ?2,
    status = (SELECT name FROM columns WHERE id = ?1),
    updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
WHERE id = ?3
";

const INSERT_SUBTASK: &str = "
INSERT INTO subtasks (task_id, title, completed, position) VALUES (?1, ?2, ?3, ?4)
";

fn read_task(conn: &Connection, task_id: i64) -> Result<Task> {
    let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
    let task = conn.query_row(&query, [task_id], read_task_row)?;
    Ok(task)
}

pub fn get_task(conn: &Connection, user_id: i64, task_id: i64) -> Result<TaskDetail> {
    guard::require_owned(conn, task_id, user_id, ResourceKind::Task)?;
    let task = read_task(conn, task_id)?;
    let query =
        format!("SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE task_id = ?1 ORDER BY position");
    let mut stmt = conn.prepare(&query)?;
    let subtasks = stmt
        .query_map([task_id], read_subtask_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(TaskDetail { task, subtasks })
}

/// Resolve a destination column for `task`, which must be on the same board.
fn destination_column(conn: &Connection, user_id: i64, task: &Task, column_id: i64) -> Result<()> {
    let board_id = guard::owned_board_of(conn, column_id, user_id, ResourceKind::Column)?;
    if board_id != task.board_id {
        invalid!(
            "column {column_id} is on board {board_id}, task {} is on board {}",
            task.id,
            task.board_id
        );
    }
    Ok(())
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn create_task(conn: &Connection, user_id: i64, new: &NewTask) -> Result<TaskDetail> {
    let title = required_text("title", &new.title)?;
    let task_id = db::in_savepoint(conn, "create_task", |conn| {
        let board_id = guard::owned_board_of(conn, new.column_id, user_id, ResourceKind::Column)?;
        let position = position::next_position(conn, Scope::Tasks(new.column_id))?;
        conn.execute(
            INSERT_TASK,
            rusqlite::params![
                board_id,
                new.column_id,
                title,
                blank_to_none(new.description.as_deref()),
                new.priority.unwrap_or_default(),
                blank_to_none(new.due_date.as_deref()),
                position
            ],
        )?;
        let task_id = conn.last_insert_rowid();
        for (title, position) in position::normalize(&new.subtasks.iter().collect::<Vec<_>>()) {
            let title = required_text("subtask title", title)?;
            conn.execute(INSERT_SUBTASK, rusqlite::params![task_id, title, false, position])?;
        }
        Ok(task_id)
    })?;
    debug!("created task {task_id} in column {}", new.column_id);
    get_task(conn, user_id, task_id)
}

pub fn update_task(
    conn: &Connection,
    user_id: i64,
    task_id: i64,
    update: &TaskUpdate,
) -> Result<TaskDetail> {
    db::in_savepoint(conn, "update_task", |conn| {
        guard::require_owned(conn, task_id, user_id, ResourceKind::Task)?;
        if let Some(title) = &update.title {
            let title = required_text("title", title)?;
            conn.execute(
                &format!("UPDATE tasks SET title = ?1, updated_at = {NOW} WHERE id = ?2"),
                rusqlite::params![title, task_id],
            )?;
        }
        if let Some(description) = &update.description {
            conn.execute(
                &format!("UPDATE tasks SET description = ?1, updated_at = {NOW} WHERE id = ?2"),
                rusqlite::params![blank_to_none(Some(description)), task_id],
            )?;
        }
        if let Some(priority) = update.priority {
            conn.execute(
                &format!("UPDATE tasks SET priority = ?1, updated_at = {NOW} WHERE id = ?2"),
                rusqlite::params![priority, task_id],
            )?;
        }
        if let Some(due_date) = &update.due_date {
            conn.execute(
                &format!("UPDATE tasks SET due_date = ?1, updated_at = {NOW} WHERE id = ?2"),
                rusqlite::params![blank_to_none(Some(due_date)), task_id],
            )?;
        }
        if let Some(column_id) = update.column_id {
            let task = read_task(conn, task_id)?;
            if column_id != task.column_id {
                let end = position::next_position(conn, Scope::Tasks(column_id))?;
                move_task(conn, user_id, task_id, &MoveTask { column_id, position: end })?;
            }
        }
        if let Some(specs) = &update.subtasks {
            replace_subtasks(conn, task_id, specs)?;
        }
        Ok(())
    })?;
    get_task(conn, user_id, task_id)
}

/// Make `specs` the task's subtask list: unlisted subtasks are deleted, listed
/// ones are updated and renumbered in list order, new ones are created.
fn replace_subtasks(conn: &Connection, task_id: i64, specs: &[SubtaskSpec]) -> Result<()> {
    let scope = Scope::Subtasks(task_id);
    let current: HashSet<i64> = position::ordered_ids(conn, scope)?.into_iter().collect();
    let mut keep = HashSet::new();
    for spec in specs {
        required_text("subtask title", &spec.title)?;
        if let Some(id) = spec.id {
            if !current.contains(&id) {
                return Err(Error::not_found(ResourceKind::Subtask, id));
            }
            if !keep.insert(id) {
                invalid!("subtask {id} is listed more than once");
            }
        }
    }
    for &id in current.difference(&keep) {
        conn.execute("DELETE FROM subtasks WHERE id = ?1", [id])?;
    }

    let mut placed = Vec::with_capacity(specs.len());
    for (spec, final_position) in position::normalize(&specs.iter().collect::<Vec<_>>()) {
        let parked = position::quarantined(final_position);
        let title = spec.title.trim();
        let id = match spec.id {
            Some(id) => {
                conn.execute(
                    &format!(
                        "UPDATE subtasks
                         SET title = ?1, completed = COALESCE(?2, completed), position = ?3,
                             updated_at = {NOW}
                         WHERE id = ?4"
                    ),
                    rusqlite::params![title, spec.completed, parked, id],
                )?;
                id
            }
            None => {
                conn.execute(
                    INSERT_SUBTASK,
                    rusqlite::params![task_id, title, spec.completed.unwrap_or(false), parked],
                )?;
                conn.last_insert_rowid()
            }
        };
        placed.push((id, final_position));
    }
    for (id, final_position) in placed {
        conn.execute(
            "UPDATE subtasks SET position = ?1 WHERE id = ?2",
            rusqlite::params![final_position, id],
        )?;
    }
    Ok(())
}

/// Delete a task with its subtasks and close the gap in its column.
pub fn delete_task(conn: &Connection, user_id: i64, task_id: i64) -> Result<()> {
    db::in_savepoint(conn, "delete_task", |conn| {
        guard::require_owned(conn, task_id, user_id, ResourceKind::Task)?;
        let task = read_task(conn, task_id)?;
        conn.execute("DELETE FROM tasks WHERE id = ?1", [task_id])?;
        position::renumber(conn, Scope::Tasks(task.column_id))
    })?;
    debug!("deleted task {task_id}");
    Ok(())
}

/// Move a task to `to.position` in `to.column_id`.
///
/// Tasks at or after the target slot shift down by one. The position is
/// clamped to the end of the destination column. The source column is
/// compacted in the same savepoint, so a follow-up reorder of either column
/// is optional.
pub fn move_task(conn: &Connection, user_id: i64, task_id: i64, to: &MoveTask) -> Result<Task> {
    if to.position < position::ORIGIN {
        invalid!("position must be at least {}", position::ORIGIN);
    }
    db::in_savepoint(conn, "move_task", |conn| {
        guard::require_owned(conn, task_id, user_id, ResourceKind::Task)?;
        let task = read_task(conn, task_id)?;
        destination_column(conn, user_id, &task, to.column_id)?;

        let destination = Scope::Tasks(to.column_id);
        let mut order = position::ordered_ids(conn, destination)?;
        order.retain(|&id| id != task_id);
        let index = (to.position - position::ORIGIN).min(order.len() as i64) as usize;
        order.insert(index, task_id);

        if to.column_id == task.column_id {
            position::apply_order(conn, destination, &order)?;
        } else {
            let slot = index as i64 + position::ORIGIN;
            conn.execute(
                PLACE_TASK,
                rusqlite::params![to.column_id, position::quarantined(slot), task_id],
            )?;
            position::apply_order(conn, destination, &order)?;
            position::renumber(conn, Scope::Tasks(task.column_id))?;
        }
        debug!(
            "moved task {task_id} from column {} to column {} slot {}",
            task.column_id,
            to.column_id,
            index as i64 + position::ORIGIN
        );
        read_task(conn, task_id)
    })
}

/// Move a task and persist the final order of both affected columns in one
/// step.
///
/// `destination_order` must list every task of the destination column plus
/// the moving task; `source_order` must list every task left in the source
/// column. For a move within one column only `destination_order` is used.
pub fn relocate_task(
    conn: &Connection,
    user_id: i64,
    task_id: i64,
    req: &RelocateTask,
) -> Result<TaskDetail> {
    db::in_savepoint(conn, "relocate_task", |conn| {
        guard::require_owned(conn, task_id, user_id, ResourceKind::Task)?;
        let task = read_task(conn, task_id)?;
        destination_column(conn, user_id, &task, req.column_id)?;

        let destination = Scope::Tasks(req.column_id);
        let mut expected = position::ordered_ids(conn, destination)?;
        if req.column_id == task.column_id {
            let order = order_from_items(
                destination,
                &expected,
                &OrderItem::sequence(&req.destination_order),
            )?;
            return position::apply_order(conn, destination, &order);
        }

        let source = Scope::Tasks(task.column_id);
        let mut remaining = position::ordered_ids(conn, source)?;
        remaining.retain(|&id| id != task_id);
        let source_order =
            order_from_items(source, &remaining, &OrderItem::sequence(&req.source_order))?;

        expected.push(task_id);
        let destination_order = order_from_items(
            destination,
            &expected,
            &OrderItem::sequence(&req.destination_order),
        )?;
        let slot = destination_order
            .iter()
            .position(|&id| id == task_id)
            .map(|index| index as i64 + position::ORIGIN)
            .ok_or_else(|| Error::Internal(format!("task {task_id} missing from order")))?;

        conn.execute(
            PLACE_TASK,
            rusqlite::params![req.column_id, position::quarantined(slot), task_id],
        )?;
        position::apply_order(conn, destination, &destination_order)?;
        position::apply_order(conn, source, &source_order)?;
        debug!(
            "relocated task {task_id} from column {} to column {} slot {slot}",
            task.column_id, req.column_id
        );
        Ok(())
    })?;
    get_task(conn, user_id, task_id)
}

pub fn reorder_tasks(
    conn: &Connection,
    user_id: i64,
    column_id: i64,
    items: &[OrderItem],
) -> Result<()> {
    super::reorder_siblings(conn, user_id, Scope::Tasks(column_id), items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::service::get_board_detail;
    use crate::service::testutil::*;

    struct Fixture {
        conn: Connection,
        user: i64,
        board: i64,
        todo: i64,
        done: i64,
    }

    /// Todo: [A, B], Done: [C].
    fn todo_done() -> (Fixture, i64, i64, i64) {
        let (conn, user) = conn_with_user("alice");
        let detail = board(&conn, user, "work", &["Todo", "Done"]);
        let todo = detail.columns[0].column.id;
        let done = detail.columns[1].column.id;
        let a = task(&conn, user, todo, "A");
        let b = task(&conn, user, todo, "B");
        let c = task(&conn, user, done, "C");
        let fixture = Fixture {
            conn,
            user,
            board: detail.board.id,
            todo,
            done,
        };
        (fixture, a, b, c)
    }

    fn positions_in(f: &Fixture, column: i64) -> Vec<(String, i64)> {
        get_board_detail(&f.conn, f.user, f.board)
            .unwrap()
            .column(column)
            .unwrap()
            .tasks
            .iter()
            .map(|t| (t.task.title.clone(), t.task.position))
            .collect()
    }

    #[test]
    fn create_sets_status_and_defaults() {
        let (f, a, _, _) = todo_done();
        let detail = get_task(&f.conn, f.user, a).unwrap();
        assert_eq!(detail.task.status, "Todo");
        assert_eq!(detail.task.priority, Priority::Medium);
        assert_eq!(detail.task.position, 1);
        assert_eq!(detail.task.description, None);
    }

    #[test]
    fn create_with_subtasks_numbers_them() {
        let (f, ..) = todo_done();
        let detail = create_task(
            &f.conn,
            f.user,
            &NewTask {
                column_id: f.todo,
                title: "with subtasks".into(),
                priority: Some(Priority::High),
                subtasks: vec!["one".into(), "two".into()],
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(detail.task.position, 3);
        let subtasks: Vec<_> = detail
            .subtasks
            .iter()
            .map(|s| (s.title.as_str(), s.position, s.completed))
            .collect();
        assert_eq!(subtasks, vec![("one", 1, false), ("two", 2, false)]);
    }

    #[test]
    fn create_requires_title_and_owned_column() {
        let (f, ..) = todo_done();
        let err = create_task(
            &f.conn,
            f.user,
            &NewTask {
                column_id: f.todo,
                title: " ".into(),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let bob = add_user(&f.conn, "bob");
        let err = create_task(
            &f.conn,
            bob,
            &NewTask {
                column_id: f.todo,
                title: "sneaky".into(),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn move_b_to_top_of_done() {
        let (f, a, b, c) = todo_done();
        let moved = move_task(
            &f.conn,
            f.user,
            b,
            &MoveTask {
                column_id: f.done,
                position: 1,
            },
        )
        .unwrap();
        assert_eq!(moved.column_id, f.done);
        assert_eq!(moved.status, "Done");
        assert_eq!(
            positions_in(&f, f.done),
            vec![("B".to_string(), 1), ("C".to_string(), 2)]
        );
        assert_eq!(positions_in(&f, f.todo), vec![("A".to_string(), 1)]);

        // The client's compacting reorders are accepted and change nothing.
        reorder_tasks(&f.conn, f.user, f.done, &OrderItem::sequence(&[b, c])).unwrap();
        reorder_tasks(&f.conn, f.user, f.todo, &OrderItem::sequence(&[a])).unwrap();
        assert_eq!(
            positions_in(&f, f.done),
            vec![("B".to_string(), 1), ("C".to_string(), 2)]
        );
    }

    #[test]
    fn move_preserves_task_count() {
        let (f, a, ..) = todo_done();
        let before = get_board_detail(&f.conn, f.user, f.board).unwrap().task_count();
        move_task(
            &f.conn,
            f.user,
            a,
            &MoveTask {
                column_id: f.done,
                position: 2,
            },
        )
        .unwrap();
        let detail = get_board_detail(&f.conn, f.user, f.board).unwrap();
        assert_eq!(detail.task_count(), before);
        assert_eq!(detail.column_of_task(a), Some(f.done));
        assert_dense(&f.conn, Scope::Tasks(f.todo));
        assert_dense(&f.conn, Scope::Tasks(f.done));
    }

    #[test]
    fn move_clamps_past_the_end() {
        let (f, a, ..) = todo_done();
        let moved = move_task(
            &f.conn,
            f.user,
            a,
            &MoveTask {
                column_id: f.done,
                position: 99,
            },
        )
        .unwrap();
        assert_eq!(moved.position, 2);
    }

    #[test]
    fn move_within_column_reorders() {
        let (f, _, b, _) = todo_done();
        move_task(
            &f.conn,
            f.user,
            b,
            &MoveTask {
                column_id: f.todo,
                position: 1,
            },
        )
        .unwrap();
        assert_eq!(titles_in(&f.conn, f.user, f.board, f.todo), vec!["B", "A"]);
        assert_dense(&f.conn, Scope::Tasks(f.todo));
    }

    #[test]
    fn move_rejects_zero_position() {
        let (f, a, ..) = todo_done();
        let err = move_task(
            &f.conn,
            f.user,
            a,
            &MoveTask {
                column_id: f.done,
                position: 0,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn move_across_boards_is_rejected() {
        let (f, a, ..) = todo_done();
        let other = board(&f.conn, f.user, "other", &["Elsewhere"]);
        let err = move_task(
            &f.conn,
            f.user,
            a,
            &MoveTask {
                column_id: other.columns[0].column.id,
                position: 1,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(get_task(&f.conn, f.user, a).unwrap().task.column_id, f.todo);
    }

    #[test]
    fn move_by_other_user_leaves_task_unchanged() {
        let (f, a, ..) = todo_done();
        let bob = add_user(&f.conn, "bob");
        let before = get_task(&f.conn, f.user, a).unwrap();
        let err = move_task(
            &f.conn,
            bob,
            a,
            &MoveTask {
                column_id: f.done,
                position: 1,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(get_task(&f.conn, f.user, a).unwrap(), before);
    }

    #[test]
    fn relocate_writes_both_orders() {
        let (f, a, b, c) = todo_done();
        let detail = relocate_task(
            &f.conn,
            f.user,
            a,
            &RelocateTask {
                column_id: f.done,
                source_order: vec![b],
                destination_order: vec![c, a],
            },
        )
        .unwrap();
        assert_eq!(detail.task.column_id, f.done);
        assert_eq!(detail.task.position, 2);
        assert_eq!(
            positions_in(&f, f.done),
            vec![("C".to_string(), 1), ("A".to_string(), 2)]
        );
        assert_eq!(positions_in(&f, f.todo), vec![("B".to_string(), 1)]);
    }

    #[test]
    fn relocate_with_stale_orders_rolls_back() {
        let (f, a, b, _) = todo_done();
        let err = relocate_task(
            &f.conn,
            f.user,
            a,
            &RelocateTask {
                column_id: f.done,
                source_order: vec![b],
                destination_order: vec![a],
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(titles_in(&f.conn, f.user, f.board, f.todo), vec!["A", "B"]);
        assert_eq!(titles_in(&f.conn, f.user, f.board, f.done), vec!["C"]);
    }

    #[test]
    fn relocate_within_column() {
        let (f, a, b, _) = todo_done();
        relocate_task(
            &f.conn,
            f.user,
            a,
            &RelocateTask {
                column_id: f.todo,
                source_order: vec![],
                destination_order: vec![b, a],
            },
        )
        .unwrap();
        assert_eq!(titles_in(&f.conn, f.user, f.board, f.todo), vec!["B", "A"]);
    }

    #[test]
    fn delete_renumbers_column() {
        let (f, a, ..) = todo_done();
        task(&f.conn, f.user, f.todo, "D");
        delete_task(&f.conn, f.user, a).unwrap();
        assert_eq!(
            positions_in(&f, f.todo),
            vec![("B".to_string(), 1), ("D".to_string(), 2)]
        );
    }

    #[test]
    fn update_fields_and_column() {
        let (f, a, ..) = todo_done();
        let detail = update_task(
            &f.conn,
            f.user,
            a,
            &TaskUpdate {
                title: Some("renamed".into()),
                description: Some("details".into()),
                priority: Some(Priority::Low),
                due_date: Some("2026-01-31".into()),
                column_id: Some(f.done),
                subtasks: None,
            },
        )
        .unwrap();
        assert_eq!(detail.task.title, "renamed");
        assert_eq!(detail.task.description.as_deref(), Some("details"));
        assert_eq!(detail.task.priority, Priority::Low);
        assert_eq!(detail.task.due_date.as_deref(), Some("2026-01-31"));
        assert_eq!(detail.task.status, "Done");
        assert_eq!(detail.task.position, 2);
        assert_dense(&f.conn, Scope::Tasks(f.todo));
    }

    #[test]
    fn update_replaces_subtask_list() {
        let (f, ..) = todo_done();
        let created = create_task(
            &f.conn,
            f.user,
            &NewTask {
                column_id: f.todo,
                title: "t".into(),
                subtasks: vec!["one".into(), "two".into(), "three".into()],
                ..Default::default()
            },
        )
        .unwrap();
        let ids: Vec<i64> = created.subtasks.iter().map(|s| s.id).collect();
        let detail = update_task(
            &f.conn,
            f.user,
            created.task.id,
            &TaskUpdate {
                subtasks: Some(vec![
                    SubtaskSpec {
                        id: Some(ids[2]),
                        title: "three".into(),
                        completed: Some(true),
                    },
                    SubtaskSpec {
                        id: None,
                        title: "new".into(),
                        completed: None,
                    },
                    SubtaskSpec {
                        id: Some(ids[0]),
                        title: "first".into(),
                        completed: None,
                    },
                ]),
                ..Default::default()
            },
        )
        .unwrap();
        let subtasks: Vec<_> = detail
            .subtasks
            .iter()
            .map(|s| (s.title.as_str(), s.position, s.completed))
            .collect();
        assert_eq!(
            subtasks,
            vec![("three", 1, true), ("new", 2, false), ("first", 3, false)]
        );
    }

    #[test]
    fn reorder_requires_every_task() {
        let (f, a, ..) = todo_done();
        let err = reorder_tasks(&f.conn, f.user, f.todo, &OrderItem::sequence(&[a])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
