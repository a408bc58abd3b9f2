//! Client-side query cache.
//!
//! Entries mirror server responses and carry a staleness flag. A stale entry
//! is still readable; it is refetched on the next refresh.

use std::collections::HashMap;

use crate::model::{Board, BoardDetail, Subtask, TaskDetail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Boards,
    Board(i64),
    Task(i64),
    Subtasks(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Boards(Vec<Board>),
    Board(BoardDetail),
    Task(TaskDetail),
    Subtasks(Vec<Subtask>),
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    value: CachedValue,
    stale: bool,
}

/// Entries captured by [`QueryCache::snapshot`]. `None` records that the key
/// was absent.
#[derive(Debug, Clone)]
pub struct Snapshot(Vec<(QueryKey, Option<Entry>)>);

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, Entry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: QueryKey) -> Option<&CachedValue> {
        self.entries.get(&key).map(|e| &e.value)
    }

    /// Store a fresh server value.
    pub fn set(&mut self, key: QueryKey, value: CachedValue) {
        self.entries.insert(key, Entry { value, stale: false });
    }

    /// Missing entries count as stale.
    pub fn is_stale(&self, key: QueryKey) -> bool {
        self.entries.get(&key).map_or(true, |e| e.stale)
    }

    pub fn invalidate(&mut self, key: QueryKey) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.stale = true;
        }
    }

    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.stale = true;
        }
    }

    pub fn remove(&mut self, key: QueryKey) {
        self.entries.remove(&key);
    }

    pub fn stale_keys(&self) -> Vec<QueryKey> {
        self.entries
            .iter()
            .filter(|(_, e)| e.stale)
            .map(|(&k, _)| k)
            .collect()
    }

    pub fn snapshot(&self, keys: &[QueryKey]) -> Snapshot {
        Snapshot(
            keys.iter()
                .map(|&k| (k, self.entries.get(&k).cloned()))
                .collect(),
        )
    }

    /// Put every captured key back exactly as it was, including absence.
    pub fn restore(&mut self, snapshot: Snapshot) {
        for (key, entry) in snapshot.0 {
            match entry {
                Some(entry) => {
                    self.entries.insert(key, entry);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }

    pub fn boards(&self) -> Option<&[Board]> {
        match self.get(QueryKey::Boards) {
            Some(CachedValue::Boards(boards)) => Some(boards),
            _ => None,
        }
    }

    pub fn boards_mut(&mut self) -> Option<&mut Vec<Board>> {
        match self.entries.get_mut(&QueryKey::Boards).map(|e| &mut e.value) {
            Some(CachedValue::Boards(boards)) => Some(boards),
            _ => None,
        }
    }

    pub fn board(&self, board_id: i64) -> Option<&BoardDetail> {
        match self.get(QueryKey::Board(board_id)) {
            Some(CachedValue::Board(board)) => Some(board),
            _ => None,
        }
    }

    pub fn board_mut(&mut self, board_id: i64) -> Option<&mut BoardDetail> {
        match self
            .entries
            .get_mut(&QueryKey::Board(board_id))
            .map(|e| &mut e.value)
        {
            Some(CachedValue::Board(board)) => Some(board),
            _ => None,
        }
    }

    pub fn task(&self, task_id: i64) -> Option<&TaskDetail> {
        match self.get(QueryKey::Task(task_id)) {
            Some(CachedValue::Task(task)) => Some(task),
            _ => None,
        }
    }

    pub fn task_mut(&mut self, task_id: i64) -> Option<&mut TaskDetail> {
        match self
            .entries
            .get_mut(&QueryKey::Task(task_id))
            .map(|e| &mut e.value)
        {
            Some(CachedValue::Task(task)) => Some(task),
            _ => None,
        }
    }

    pub fn subtasks(&self, task_id: i64) -> Option<&[Subtask]> {
        match self.get(QueryKey::Subtasks(task_id)) {
            Some(CachedValue::Subtasks(subtasks)) => Some(subtasks),
            _ => None,
        }
    }

    pub fn subtasks_mut(&mut self, task_id: i64) -> Option<&mut Vec<Subtask>> {
        match self
            .entries
            .get_mut(&QueryKey::Subtasks(task_id))
            .map(|e| &mut e.value)
        {
            Some(CachedValue::Subtasks(subtasks)) => Some(subtasks),
            _ => None,
        }
    }
}
