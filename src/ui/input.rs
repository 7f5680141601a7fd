/// Input collection and key mapping.
///
/// The game is turn-based: every key press (or auto-repeat) is one action,
/// applied in the order the terminal delivered it. Mouse clicks carry the
/// terminal cell they landed on, which the level maps back to a grid cell
/// for summoning.
///
/// Key map:
///   Arrows / WASD   move (or move the summon cursor)
///   Space           wait one tick
///   F               fast forward to the next return
///   Tab / 1-9       next character / n-th character
///   C               summon cursor on/off
///   Enter           summon at cursor / next level once solved
///   Click           summon at the clicked cell
///   + / -           summon countdown
///   Z / X           undo / redo
///   R               restart
///   N / P           next / previous level
///   Esc             leave cursor mode, else quit
///   Q / Ctrl+C      quit

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use crate::domain::grid::{Direction, Point};

/// A front-end intent, before it is interpreted against the current mode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(Direction),
    Wait,
    FastForward,
    NextCharacter,
    /// n-th character still in the level, counting from 0.
    SelectCharacter(usize),
    ToggleCursor,
    /// Enter cursor mode, or summon at the cursor when already in it.
    Summon,
    Confirm,
    SummonAt(Point),
    SummonTimeUp,
    SummonTimeDown,
    Undo,
    Redo,
    Restart,
    NextLevel,
    PrevLevel,
    Cancel,
    Quit,
}

pub struct InputState {
    /// Actions decoded during the most recent drain, oldest first.
    actions: Vec<Action>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { actions: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    pub fn drain_events(&mut self) {
        self.actions.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(a) = key_action(&key) {
                        self.actions.push(a);
                    }
                }
                Ok(Event::Mouse(m)) => {
                    if m.kind == MouseEventKind::Down(MouseButton::Left) {
                        let xy = Point::new(i32::from(m.column), i32::from(m.row));
                        self.actions.push(Action::SummonAt(xy));
                    }
                }
                _ => {}
            }
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

/// Decode one key event. Releases are ignored; repeats count as presses.
pub fn key_action(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Quit),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Action::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Action::Move(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Action::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Action::Move(Direction::Right),
        KeyCode::Char(' ') => Action::Wait,
        KeyCode::Char('f') | KeyCode::Char('F') => Action::FastForward,
        KeyCode::Tab => Action::NextCharacter,
        KeyCode::Char(c @ '1'..='9') => Action::SelectCharacter(c as usize - '1' as usize),
        KeyCode::Char('c') | KeyCode::Char('C') => Action::ToggleCursor,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::SummonTimeUp,
        KeyCode::Char('-') | KeyCode::Char('_') => Action::SummonTimeDown,
        KeyCode::Char('z') | KeyCode::Char('Z') => Action::Undo,
        KeyCode::Char('x') | KeyCode::Char('X') => Action::Redo,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Char('n') | KeyCode::Char('N') => Action::NextLevel,
        KeyCode::Char('p') | KeyCode::Char('P') => Action::PrevLevel,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        _ => return None,
    };
    Some(action)
}
