use taskboard::model::{Board, BoardDetail};

pub fn format_board_list(boards: &[Board]) -> String {
    let mut out = String::new();
    for board in boards {
        let marker = if board.is_default { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {:>3}. {} (id {})\n",
            board.position, board.name, board.id
        ));
    }
    out
}

pub fn format_board_detail(detail: &BoardDetail) -> String {
    let mut out = String::new();
    let default = if detail.board.is_default { " (default)" } else { "" };
    out.push_str(&format!("{}{default}\n", detail.board.name));
    for column in &detail.columns {
        out.push_str(&format!(
            "\n[{}] {} ({})\n",
            column.column.position,
            column.column.name,
            column.tasks.len()
        ));
        for task in &column.tasks {
            let t = &task.task;
            out.push_str(&format!("  {}. {} {}", t.position, t.priority.icon(), t.title));
            if let Some(due) = &t.due_date {
                out.push_str(&format!("  due {due}"));
            }
            out.push('\n');
            for subtask in &task.subtasks {
                let check = if subtask.completed { "x" } else { " " };
                out.push_str(&format!("       [{check}] {}\n", subtask.title));
            }
        }
    }
    out
}
