//! Drag gesture state machine.
//!
//! A gesture picks up one task card, hovers over columns or other cards, and
//! ends in a drop or a cancel. A drop is classified against the client's
//! current view of the board into an intent carrying the locally renumbered
//! lists and the requests that persist them.

use crate::model::{BoardDetail, OrderItem};
use crate::service::MoveTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Column(i64),
    Task(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging {
        active_task: i64,
        source_column: i64,
        over: Option<DropTarget>,
    },
}

/// The outcome of a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropIntent {
    NoOp,
    /// Same-column reorder. `order` is the column's renumbered task list.
    Reorder {
        column_id: i64,
        order: Vec<OrderItem>,
    },
    /// Cross-column move. Both lists are renumbered from 1.
    Move {
        task_id: i64,
        from_column: i64,
        to_column: i64,
        /// 1-based slot in the destination column.
        position: i64,
        source: Vec<OrderItem>,
        destination: Vec<OrderItem>,
    },
}

/// One request of a drop's persistence plan, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropRequest {
    MoveTask { task_id: i64, to: MoveTarget },
    ReorderTasks { column_id: i64, items: Vec<OrderItem> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTarget {
    pub column_id: i64,
    pub position: i64,
}

impl From<MoveTarget> for MoveTask {
    fn from(t: MoveTarget) -> Self {
        MoveTask {
            column_id: t.column_id,
            position: t.position,
        }
    }
}

impl DropIntent {
    /// The requests that persist this intent: a reorder for a same-column
    /// drop; the move, then the destination reorder, then the source reorder
    /// for a cross-column drop.
    pub fn plan(&self) -> Vec<DropRequest> {
        match self {
            Self::NoOp => Vec::new(),
            Self::Reorder { column_id, order } => vec![DropRequest::ReorderTasks {
                column_id: *column_id,
                items: order.clone(),
            }],
            Self::Move {
                task_id,
                from_column,
                to_column,
                position,
                source,
                destination,
            } => vec![
                DropRequest::MoveTask {
                    task_id: *task_id,
                    to: MoveTarget {
                        column_id: *to_column,
                        position: *position,
                    },
                },
                DropRequest::ReorderTasks {
                    column_id: *to_column,
                    items: destination.clone(),
                },
                DropRequest::ReorderTasks {
                    column_id: *from_column,
                    items: source.clone(),
                },
            ],
        }
    }

    /// Columns whose cached order the intent changes.
    pub fn columns(&self) -> Vec<(i64, &[OrderItem])> {
        match self {
            Self::NoOp => Vec::new(),
            Self::Reorder { column_id, order } => vec![(*column_id, order.as_slice())],
            Self::Move {
                from_column,
                to_column,
                source,
                destination,
                ..
            } => vec![
                (*to_column, destination.as_slice()),
                (*from_column, source.as_slice()),
            ],
        }
    }
}

#[derive(Debug)]
pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn active_task(&self) -> Option<i64> {
        match self.state {
            DragState::Dragging { active_task, .. } => Some(active_task),
            DragState::Idle => None,
        }
    }

    /// Start dragging `task_id`. Returns false when the task is not on the
    /// board or a drag is already in progress.
    pub fn pick_up(&mut self, board: &BoardDetail, task_id: i64) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(source_column) = board.column_of_task(task_id) else {
            return false;
        };
        self.state = DragState::Dragging {
            active_task: task_id,
            source_column,
            over: None,
        };
        true
    }

    pub fn hover(&mut self, target: Option<DropTarget>) {
        if let DragState::Dragging { over, .. } = &mut self.state {
            *over = target;
        }
    }

    /// The column under the pointer, for highlighting. Hovering a card
    /// resolves to that card's column.
    pub fn over_column(&self, board: &BoardDetail) -> Option<i64> {
        match self.state {
            DragState::Dragging {
                over: Some(target),
                ..
            } => resolve_column(board, target),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// End the gesture and classify it. Dropping outside any target, or on
    /// a target that is no longer on the board, is a cancel.
    pub fn drop(&mut self, board: &BoardDetail) -> DropIntent {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let DragState::Dragging {
            active_task,
            over: Some(target),
            ..
        } = state
        else {
            return DropIntent::NoOp;
        };
        classify(board, active_task, target)
    }
}

fn resolve_column(board: &BoardDetail, target: DropTarget) -> Option<i64> {
    match target {
        DropTarget::Column(id) => board.column(id).map(|c| c.column.id),
        DropTarget::Task(id) => board.column_of_task(id),
    }
}

fn task_ids(board: &BoardDetail, column_id: i64) -> Vec<i64> {
    board
        .column(column_id)
        .map(|c| c.tasks.iter().map(|t| t.task.id).collect())
        .unwrap_or_default()
}

fn classify(board: &BoardDetail, active: i64, target: DropTarget) -> DropIntent {
    let (Some(from), Some(to)) = (board.column_of_task(active), resolve_column(board, target))
    else {
        return DropIntent::NoOp;
    };

    let mut source = task_ids(board, from);
    let Some(old_index) = source.iter().position(|&id| id == active) else {
        return DropIntent::NoOp;
    };

    if from == to {
        let new_index = match target {
            DropTarget::Task(id) => source.iter().position(|&t| t == id).unwrap_or(old_index),
            DropTarget::Column(_) => source.len() - 1,
        };
        if new_index == old_index {
            return DropIntent::NoOp;
        }
        source.remove(old_index);
        source.insert(new_index, active);
        return DropIntent::Reorder {
            column_id: from,
            order: OrderItem::sequence(&source),
        };
    }

    source.remove(old_index);
    let mut destination = task_ids(board, to);
    let index = match target {
        DropTarget::Task(id) => destination
            .iter()
            .position(|&t| t == id)
            .unwrap_or(destination.len()),
        DropTarget::Column(_) => destination.len(),
    };
    destination.insert(index, active);
    DropIntent::Move {
        task_id: active,
        from_column: from,
        to_column: to,
        position: index as i64 + crate::position::ORIGIN,
        source: OrderItem::sequence(&source),
        destination: OrderItem::sequence(&destination),
    }
}
