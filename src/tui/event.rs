use crossterm::event::{KeyCode, KeyEvent};

use super::app::App;
use crate::client::BoardApi;

pub enum KeyAction {
    Quit,
    Refresh,
    Continue,
}

pub fn handle_key<A: BoardApi>(app: &mut App<A>, key: KeyEvent) -> KeyAction {
    app.status = None;
    match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Esc if app.drag.is_dragging() => app.cancel_drag(),
        KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Char('h') | KeyCode::Left => app.move_left(),
        KeyCode::Char('l') | KeyCode::Right => app.move_right(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char(' ') => app.pick_or_drop(),
        KeyCode::Enter if app.drag.is_dragging() => app.drop_card(),
        KeyCode::Char('x') => app.toggle_subtask(),
        KeyCode::Char('b') => {
            if let Err(e) = app.cycle_board() {
                app.status = Some(e.to_string());
            }
        }
        KeyCode::Char('r') => return KeyAction::Refresh,
        _ => {}
    }
    KeyAction::Continue
}
