//! Optimistic mutations over a [`QueryCache`].
//!
//! Every mutation snapshots the cache entries it touches, applies the
//! predicted result, then issues the request. On success server-returned
//! fields replace predicted ones and the affected keys go stale. On failure
//! the snapshot is restored exactly and the error is returned.

use std::collections::HashMap;

use log::{debug, warn};

use super::api::BoardApi;
use super::cache::{CachedValue, QueryCache, QueryKey};
use super::drag::{DropIntent, DropRequest};
use crate::error::{ErrorKind, Result};
use crate::model::{Board, BoardDetail, OrderItem, Subtask, Task, TaskDetail};
use crate::service::SubtaskUpdate;

pub struct BoardClient<A> {
    api: A,
    cache: QueryCache,
}

impl<A: BoardApi> BoardClient<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cache: QueryCache::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn boards(&mut self) -> Result<&[Board]> {
        if self.cache.is_stale(QueryKey::Boards) {
            let boards = self.api.list_boards()?;
            self.cache.set(QueryKey::Boards, CachedValue::Boards(boards));
        }
        Ok(self.cache.boards().unwrap_or_default())
    }

    pub fn board(&mut self, board_id: i64) -> Result<&BoardDetail> {
        let key = QueryKey::Board(board_id);
        if self.cache.is_stale(key) {
            let board = self.api.get_board(board_id)?;
            self.cache.set(key, CachedValue::Board(board));
        }
        match self.cache.board(board_id) {
            Some(board) => Ok(board),
            None => Err(crate::Error::Internal(format!("board {board_id} missing from cache"))),
        }
    }

    pub fn task(&mut self, task_id: i64) -> Result<&TaskDetail> {
        let key = QueryKey::Task(task_id);
        if self.cache.is_stale(key) {
            let task = self.api.get_task(task_id)?;
            self.cache.set(key, CachedValue::Task(task));
        }
        match self.cache.task(task_id) {
            Some(task) => Ok(task),
            None => Err(crate::Error::Internal(format!("task {task_id} missing from cache"))),
        }
    }

    pub fn subtasks(&mut self, task_id: i64) -> Result<&[Subtask]> {
        let key = QueryKey::Subtasks(task_id);
        if self.cache.is_stale(key) {
            let subtasks = self.api.list_subtasks(task_id)?;
            self.cache.set(key, CachedValue::Subtasks(subtasks));
        }
        Ok(self.cache.subtasks(task_id).unwrap_or_default())
    }

    /// Mark everything stale, e.g. after another process wrote the store.
    pub fn invalidate_all(&mut self) {
        self.cache.invalidate_all();
    }

    /// Refetch every stale entry. Entries whose resource is gone are dropped.
    pub fn refresh(&mut self) -> Result<()> {
        for key in self.cache.stale_keys() {
            let fetched = match key {
                QueryKey::Boards => self.api.list_boards().map(CachedValue::Boards),
                QueryKey::Board(id) => self.api.get_board(id).map(CachedValue::Board),
                QueryKey::Task(id) => self.api.get_task(id).map(CachedValue::Task),
                QueryKey::Subtasks(id) => self.api.list_subtasks(id).map(CachedValue::Subtasks),
            };
            match fetched {
                Ok(value) => self.cache.set(key, value),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("dropping cache entry {key:?}: {e}");
                    self.cache.remove(key);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// The snapshot → predict → request → reconcile/rollback cycle.
    fn mutate<T>(
        &mut self,
        label: &str,
        touched: &[QueryKey],
        predict: impl FnOnce(&mut QueryCache),
        request: impl FnOnce(&A) -> Result<T>,
        reconcile: impl FnOnce(&mut QueryCache, &T),
    ) -> Result<T> {
        let snapshot = self.cache.snapshot(touched);
        predict(&mut self.cache);
        match request(&self.api) {
            Ok(value) => {
                reconcile(&mut self.cache, &value);
                Ok(value)
            }
            Err(e) => {
                warn!("{label} failed, rolling back: {e}");
                self.cache.restore(snapshot);
                if e.kind() == ErrorKind::Conflict {
                    for &key in touched {
                        self.cache.invalidate(key);
                    }
                }
                Err(e)
            }
        }
    }

    pub fn delete_board(&mut self, board_id: i64) -> Result<()> {
        self.mutate(
            "delete board",
            &[QueryKey::Boards, QueryKey::Board(board_id)],
            |cache| {
                if let Some(boards) = cache.boards_mut() {
                    boards.retain(|b| b.id != board_id);
                }
                cache.remove(QueryKey::Board(board_id));
            },
            |api| api.delete_board(board_id),
            |cache, _| {
                cache.invalidate(QueryKey::Boards);
                cache.remove(QueryKey::Board(board_id));
            },
        )
    }

    /// Persist `ids` as the order of the user's boards.
    pub fn reorder_boards(&mut self, ids: &[i64]) -> Result<()> {
        let items = OrderItem::sequence(ids);
        self.mutate(
            "reorder boards",
            &[QueryKey::Boards],
            |cache| {
                if let Some(boards) = cache.boards_mut() {
                    reorder_by(boards, &items, |b| b.id, |b, p| b.position = p);
                }
            },
            |api| api.reorder_boards(&items),
            |cache, _| cache.invalidate(QueryKey::Boards),
        )
    }

    pub fn set_default_board(&mut self, board_id: i64) -> Result<()> {
        self.mutate(
            "set default board",
            &[QueryKey::Boards],
            |cache| {
                if let Some(boards) = cache.boards_mut() {
                    for board in boards.iter_mut() {
                        board.is_default = board.id == board_id;
                    }
                }
            },
            |api| api.set_default_board(board_id),
            |cache, _| cache.invalidate(QueryKey::Boards),
        )
    }

    pub fn reorder_columns(&mut self, board_id: i64, ids: &[i64]) -> Result<()> {
        let items = OrderItem::sequence(ids);
        self.mutate(
            "reorder columns",
            &[QueryKey::Board(board_id)],
            |cache| {
                if let Some(board) = cache.board_mut(board_id) {
                    reorder_by(
                        &mut board.columns,
                        &items,
                        |c| c.column.id,
                        |c, p| c.column.position = p,
                    );
                }
            },
            |api| api.reorder_columns(board_id, &items),
            |cache, _| cache.invalidate(QueryKey::Board(board_id)),
        )
    }

    /// Persist a drop produced by the drag controller.
    ///
    /// The predicted column lists come straight from the intent; the plan's
    /// requests are issued in order and the first failure rolls the board
    /// back to its pre-drop state. If an earlier request already committed,
    /// the restored board no longer matches the server and is left stale.
    pub fn apply_drop(&mut self, board_id: i64, intent: &DropIntent) -> Result<()> {
        if *intent == DropIntent::NoOp {
            return Ok(());
        }
        let plan = intent.plan();
        let mut committed = false;
        let result = self.mutate(
            "drop",
            &[QueryKey::Board(board_id)],
            |cache| {
                if let Some(board) = cache.board_mut(board_id) {
                    for (column_id, order) in intent.columns() {
                        place_tasks(board, column_id, order);
                    }
                }
            },
            |api| {
                let mut moved = Vec::new();
                for request in plan {
                    match request {
                        DropRequest::MoveTask { task_id, to } => {
                            moved.push(api.move_task(task_id, &to.into())?);
                        }
                        DropRequest::ReorderTasks { column_id, items } => {
                            api.reorder_tasks(column_id, &items)?;
                        }
                    }
                    committed = true;
                }
                Ok(moved)
            },
            |cache, moved: &Vec<Task>| {
                if let Some(board) = cache.board_mut(board_id) {
                    for task in moved {
                        if let Some(detail) = board.task_mut(task.id) {
                            detail.task = task.clone();
                        }
                    }
                }
                cache.invalidate(QueryKey::Board(board_id));
            },
        );
        if result.is_err() && committed {
            debug!("drop partially applied, board {board_id} left stale");
            self.cache.invalidate(QueryKey::Board(board_id));
        }
        result.map(|_| ())
    }

    pub fn update_subtask(
        &mut self,
        board_id: i64,
        subtask: &Subtask,
        update: &SubtaskUpdate,
    ) -> Result<Subtask> {
        let task_id = subtask.task_id;
        let subtask_id = subtask.id;
        let touched = [
            QueryKey::Board(board_id),
            QueryKey::Task(task_id),
            QueryKey::Subtasks(task_id),
        ];
        self.mutate(
            "update subtask",
            &touched,
            |cache| patch_subtask(cache, board_id, subtask_id, task_id, |s| apply_update(s, update)),
            |api| api.update_subtask(subtask_id, update),
            |cache, confirmed| {
                patch_subtask(cache, board_id, subtask_id, task_id, |s| *s = confirmed.clone());
                for key in touched {
                    cache.invalidate(key);
                }
            },
        )
    }

    /// Flip a subtask's completion flag.
    pub fn toggle_subtask(&mut self, board_id: i64, subtask: &Subtask) -> Result<Subtask> {
        let update = SubtaskUpdate {
            title: None,
            completed: Some(!subtask.completed),
        };
        self.update_subtask(board_id, subtask, &update)
    }
}

fn apply_update(subtask: &mut Subtask, update: &SubtaskUpdate) {
    if let Some(title) = &update.title {
        subtask.title = title.trim().to_string();
    }
    if let Some(completed) = update.completed {
        subtask.completed = completed;
    }
}

/// Apply `f` to every cached copy of a subtask.
fn patch_subtask(
    cache: &mut QueryCache,
    board_id: i64,
    subtask_id: i64,
    task_id: i64,
    mut f: impl FnMut(&mut Subtask),
) {
    if let Some(task) = cache
        .board_mut(board_id)
        .and_then(|board| board.task_mut(task_id))
    {
        task.subtasks.iter_mut().filter(|s| s.id == subtask_id).for_each(&mut f);
    }
    if let Some(task) = cache.task_mut(task_id) {
        task.subtasks.iter_mut().filter(|s| s.id == subtask_id).for_each(&mut f);
    }
    if let Some(subtasks) = cache.subtasks_mut(task_id) {
        subtasks.iter_mut().filter(|s| s.id == subtask_id).for_each(&mut f);
    }
}

/// Sort `list` into the order of `items` and write the submitted positions.
fn reorder_by<T>(
    list: &mut [T],
    items: &[OrderItem],
    id: impl Fn(&T) -> i64,
    mut set_position: impl FnMut(&mut T, i64),
) {
    let positions: HashMap<i64, i64> = items.iter().map(|i| (i.id, i.position)).collect();
    list.sort_by_key(|entry| positions.get(&id(entry)).copied().unwrap_or(i64::MAX));
    for entry in list.iter_mut() {
        if let Some(&p) = positions.get(&id(entry)) {
            set_position(entry, p);
        }
    }
}

/// Rebuild one column's task list from `order`, pulling tasks from wherever
/// they currently sit on the board.
fn place_tasks(board: &mut BoardDetail, column_id: i64, order: &[OrderItem]) {
    let Some(status) = board.column(column_id).map(|c| c.column.name.clone()) else {
        return;
    };
    let mut pulled = Vec::with_capacity(order.len());
    for item in order {
        let taken = board.columns.iter_mut().find_map(|c| {
            let index = c.tasks.iter().position(|t| t.task.id == item.id)?;
            Some(c.tasks.remove(index))
        });
        if let Some(mut detail) = taken {
            detail.task.column_id = column_id;
            detail.task.position = item.position;
            detail.task.status = status.clone();
            pulled.push(detail);
        }
    }
    if let Some(column) = board.column_mut(column_id) {
        pulled.append(&mut column.tasks);
        column.tasks = pulled;
    }
}
