use crate::client::{BoardApi, BoardClient, DragController, DropTarget};
use crate::error::Result;
use crate::model::{BoardDetail, TaskDetail};

pub struct App<A> {
    pub client: BoardClient<A>,
    pub board_id: Option<i64>,
    /// Cursor column index.
    pub column: usize,
    /// Cursor row. While dragging it may sit one past the last card, which
    /// targets the column itself.
    pub row: usize,
    pub drag: DragController,
    pub status: Option<String>,
}

impl<A: BoardApi> App<A> {
    pub fn new(client: BoardClient<A>, board_id: Option<i64>) -> Result<Self> {
        let mut app = App {
            client,
            board_id,
            column: 0,
            row: 0,
            drag: DragController::new(),
            status: None,
        };
        app.refresh()?;
        Ok(app)
    }

    /// Refetch stale entries and make sure a board is shown.
    pub fn refresh(&mut self) -> Result<()> {
        self.client.refresh()?;
        let boards = self.client.boards()?;
        let exists = |id: i64| boards.iter().any(|b| b.id == id);
        if !self.board_id.is_some_and(exists) {
            self.board_id = boards
                .iter()
                .find(|b| b.is_default)
                .or_else(|| boards.first())
                .map(|b| b.id);
        }
        if let Some(id) = self.board_id {
            self.client.board(id)?;
        }
        self.clamp_cursor();
        Ok(())
    }

    pub fn board(&self) -> Option<&BoardDetail> {
        self.client.cache().board(self.board_id?)
    }

    pub fn board_name(&self) -> Option<&str> {
        self.board().map(|b| b.board.name.as_str())
    }

    pub fn selected_task(&self) -> Option<&TaskDetail> {
        self.board()?.columns.get(self.column)?.tasks.get(self.row)
    }

    fn column_len(&self, index: usize) -> usize {
        self.board()
            .and_then(|b| b.columns.get(index))
            .map_or(0, |c| c.tasks.len())
    }

    fn clamp_cursor(&mut self) {
        let columns = self.board().map_or(0, |b| b.columns.len());
        self.column = self.column.min(columns.saturating_sub(1));
        let len = self.column_len(self.column);
        let max_row = if self.drag.is_dragging() {
            len
        } else {
            len.saturating_sub(1)
        };
        self.row = self.row.min(max_row);
    }

    /// Point the drag at whatever is under the cursor.
    fn update_hover(&mut self) {
        if !self.drag.is_dragging() {
            return;
        }
        let target = self.board().and_then(|b| {
            let column = b.columns.get(self.column)?;
            Some(match column.tasks.get(self.row) {
                Some(t) => DropTarget::Task(t.task.id),
                None => DropTarget::Column(column.column.id),
            })
        });
        self.drag.hover(target);
    }

    pub fn move_left(&mut self) {
        self.column = self.column.saturating_sub(1);
        self.clamp_cursor();
        self.update_hover();
    }

    pub fn move_right(&mut self) {
        self.column += 1;
        self.clamp_cursor();
        self.update_hover();
    }

    pub fn move_up(&mut self) {
        self.row = self.row.saturating_sub(1);
        self.update_hover();
    }

    pub fn move_down(&mut self) {
        self.row += 1;
        self.clamp_cursor();
        self.update_hover();
    }

    /// Space: pick the selected card up, or drop the one being dragged.
    pub fn pick_or_drop(&mut self) {
        if self.drag.is_dragging() {
            self.drop_card();
            return;
        }
        let Some(task_id) = self.selected_task().map(|t| t.task.id) else {
            return;
        };
        if let Some(board) = self.board_id.and_then(|id| self.client.cache().board(id)) {
            if self.drag.pick_up(board, task_id) {
                self.status = None;
                self.update_hover();
            }
        }
    }

    pub fn drop_card(&mut self) {
        let Some(board_id) = self.board_id else {
            self.drag.cancel();
            return;
        };
        let Some(board) = self.client.cache().board(board_id) else {
            self.drag.cancel();
            return;
        };
        let active = self.drag.active_task();
        let intent = self.drag.drop(board);
        if let Err(e) = self.client.apply_drop(board_id, &intent) {
            self.status = Some(format!("move failed: {e}"));
        }
        self.follow(active);
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
        self.clamp_cursor();
    }

    /// Put the cursor on `task_id` wherever it now lives.
    fn follow(&mut self, task_id: Option<i64>) {
        let found = task_id.and_then(|id| {
            self.board()?.columns.iter().enumerate().find_map(|(c, column)| {
                let r = column.tasks.iter().position(|t| t.task.id == id)?;
                Some((c, r))
            })
        });
        if let Some((column, row)) = found {
            self.column = column;
            self.row = row;
        }
        self.clamp_cursor();
    }

    /// Switch to the next board in the user's order.
    pub fn cycle_board(&mut self) -> Result<()> {
        self.drag.cancel();
        let boards = self.client.boards()?;
        if boards.is_empty() {
            return Ok(());
        }
        let current = self
            .board_id
            .and_then(|id| boards.iter().position(|b| b.id == id));
        let next = current.map_or(0, |i| (i + 1) % boards.len());
        let board_id = boards[next].id;
        self.board_id = Some(board_id);
        self.client.board(board_id)?;
        self.column = 0;
        self.row = 0;
        self.clamp_cursor();
        Ok(())
    }

    /// Toggle the first open subtask of the selected card, or reopen the
    /// last one when all are done.
    pub fn toggle_subtask(&mut self) {
        let (Some(board_id), Some(task)) = (self.board_id, self.selected_task()) else {
            return;
        };
        let subtask = task
            .subtasks
            .iter()
            .find(|s| !s.completed)
            .or_else(|| task.subtasks.last())
            .cloned();
        let Some(subtask) = subtask else {
            self.status = Some("no subtasks".into());
            return;
        };
        if let Err(e) = self.client.toggle_subtask(board_id, &subtask) {
            self.status = Some(format!("toggle failed: {e}"));
        }
    }
}
