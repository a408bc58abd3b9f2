use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use super::app::App;
use crate::client::BoardApi;
use crate::model::{ColumnDetail, Priority, TaskDetail};

const HELP: &str =
    "h/l/j/k move  space pick/drop  enter drop  esc cancel  x subtask  b board  r refresh  q quit";

pub fn render<A: BoardApi>(frame: &mut Frame, app: &App<A>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let title = match (app.board(), app.board_name()) {
        (Some(board), Some(name)) => {
            let marker = if board.board.is_default { " (default)" } else { "" };
            format!(" {name}{marker}  {} tasks", board.task_count())
        }
        _ => " no boards; create one with the HTTP API".to_string(),
    };
    frame.render_widget(Paragraph::new(title).style(Style::default().bold()), chunks[0]);

    if let Some(board) = app.board() {
        render_columns(frame, app, &board.columns, chunks[1]);
    }

    let footer = match &app.status {
        Some(status) => Paragraph::new(status.as_str()).style(Style::default().fg(Color::Red)),
        None if app.drag.is_dragging() => Paragraph::new("dragging: move to a slot, space/enter to drop, esc to cancel")
            .style(Style::default().fg(Color::Yellow)),
        None => Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(footer, chunks[2]);
}

fn render_columns<A: BoardApi>(
    frame: &mut Frame,
    app: &App<A>,
    columns: &[ColumnDetail],
    area: Rect,
) {
    if columns.is_empty() {
        frame.render_widget(Paragraph::new("This board has no columns."), area);
        return;
    }
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, columns.len() as u32); columns.len()])
        .split(area);

    let over = app.board().and_then(|b| app.drag.over_column(b));
    let active = app.drag.active_task();

    for (index, (column, area)) in columns.iter().zip(areas.iter()).enumerate() {
        let focused = index == app.column;
        let mut items: Vec<ListItem> = column
            .tasks
            .iter()
            .enumerate()
            .map(|(row, task)| {
                let item = ListItem::new(card_line(task));
                if Some(task.task.id) == active {
                    item.style(Style::default().fg(Color::Yellow).italic())
                } else if focused && row == app.row {
                    item.style(Style::default().bg(Color::DarkGray))
                } else {
                    item
                }
            })
            .collect();
        if focused && active.is_some() && app.row == column.tasks.len() {
            items.push(ListItem::new("  ▸ drop at end").style(Style::default().fg(Color::Yellow)));
        }

        let border = if over == Some(column.column.id) {
            Style::default().fg(Color::Yellow)
        } else if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ({}) ", column.column.name, column.tasks.len()));
        frame.render_widget(List::new(items).block(block), *area);
    }
}

fn card_line(detail: &TaskDetail) -> Line<'static> {
    let task = &detail.task;
    let priority_style = match task.priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::DarkGray),
    };
    let mut spans = vec![
        Span::styled(format!("{} ", task.priority.icon()), priority_style),
        Span::raw(task.title.clone()),
    ];
    if !detail.subtasks.is_empty() {
        let done = detail.subtasks.iter().filter(|s| s.completed).count();
        spans.push(Span::styled(
            format!(" [{done}/{}]", detail.subtasks.len()),
            Style::default().fg(Color::Green),
        ));
    }
    if let Some(due) = &task.due_date {
        spans.push(Span::styled(format!(" due {due}"), Style::default().fg(Color::Magenta)));
    }
    Line::from(spans)
}
