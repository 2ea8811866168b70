use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::geometry::Direction;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    Up,
    Down,
    Left,
    Right,
}

impl InputEvent {
    pub fn direction(self) -> Option<Direction> {
        match self {
            InputEvent::Quit => None,
            InputEvent::Up => Some(Direction::Up),
            InputEvent::Down => Some(Direction::Down),
            InputEvent::Left => Some(Direction::Left),
            InputEvent::Right => Some(Direction::Right),
        }
    }

    pub fn from_key(ev: &KeyEvent) -> Option<InputEvent> {
        if is_ctrl_c(ev) {
            return Some(InputEvent::Quit);
        }

        match ev.code {
            KeyCode::Char('w') | KeyCode::Up => Some(InputEvent::Up),
            KeyCode::Char('a') | KeyCode::Left => Some(InputEvent::Left),
            KeyCode::Char('s') | KeyCode::Down => Some(InputEvent::Down),
            KeyCode::Char('d') | KeyCode::Right => Some(InputEvent::Right),
            KeyCode::Char('q') | KeyCode::Esc => Some(InputEvent::Quit),
            _ => None,
        }
    }
}

/// A source of game input, drained once per tick without blocking.
pub trait EventSource {
    fn poll_events(&mut self) -> Result<Vec<InputEvent>>;
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}
