/// Controller: turns front-end actions into session calls.
///
/// Holds the bits of play state that belong to the player rather than the
/// puzzle: the summon countdown they have dialled in, the summon cursor,
/// and the status message. Modes:
///
///   Playing   moves go to the selected character
///   Cursor    moves go to the summon cursor; Enter / Summon summons there
///   Broken    only undo, restart and level changes do anything
///   Solved    Enter / Summon goes to the next level
///   Finished  the last level is solved; only quitting is left

use tracing::info;

use crate::config::{SUMMON_TIME_MAX, SUMMON_TIME_MIN};
use crate::domain::grid::{Point, RowCol};
use crate::sim::command::Command;
use crate::sim::level::{Level, Outcome};
use crate::sim::loader::LevelError;
use crate::sim::session::Session;
use super::input::Action;
use super::sound::Sfx;

/// What the main loop should do after an action.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Reaction {
    pub quit: bool,
    pub sfx: Option<Sfx>,
}

impl Reaction {
    fn quit() -> Self {
        Reaction { quit: true, sfx: None }
    }

    fn sound(sfx: Option<Sfx>) -> Self {
        Reaction { quit: false, sfx }
    }
}

pub struct Controller {
    summon_time: u32,
    cursor: Option<RowCol>,
    message: String,
    finished: bool,
}

impl Controller {
    pub fn new(summon_time: u32) -> Self {
        Controller {
            summon_time: summon_time.clamp(SUMMON_TIME_MIN, SUMMON_TIME_MAX),
            cursor: None,
            message: String::new(),
            finished: false,
        }
    }

    pub fn summon_time(&self) -> u32 { self.summon_time }
    pub fn cursor(&self) -> Option<RowCol> { self.cursor }
    pub fn message(&self) -> &str { &self.message }
    pub fn is_finished(&self) -> bool { self.finished }

    pub fn handle(&mut self, action: Action, session: &mut Session) -> Result<Reaction, LevelError> {
        self.message.clear();

        match action {
            Action::Quit => return Ok(Reaction::quit()),
            Action::Cancel => {
                if self.cursor.take().is_none() {
                    return Ok(Reaction::quit());
                }
                return Ok(Reaction::default());
            }
            _ => {}
        }
        if self.finished {
            return Ok(Reaction::default());
        }

        match action {
            Action::Undo => {
                self.cursor = None;
                if !session.undo() {
                    self.message = "Nothing to undo".into();
                }
            }
            Action::Redo => {
                self.cursor = None;
                if !session.can_redo() {
                    self.message = "Nothing to redo".into();
                } else {
                    session.redo();
                }
            }
            Action::Restart => {
                self.cursor = None;
                session.restart()?;
            }
            Action::NextLevel => {
                self.cursor = None;
                session.next_level()?;
            }
            Action::PrevLevel => {
                self.cursor = None;
                session.prev_level()?;
            }
            Action::SummonTimeUp => {
                self.summon_time = (self.summon_time + 1).min(SUMMON_TIME_MAX);
            }
            Action::SummonTimeDown => {
                self.summon_time = self.summon_time.saturating_sub(1).max(SUMMON_TIME_MIN);
            }
            _ => return self.play(action, session),
        }
        Ok(Reaction::default())
    }

    /// Actions that act on the puzzle itself.
    fn play(&mut self, action: Action, session: &mut Session) -> Result<Reaction, LevelError> {
        match session.outcome() {
            Outcome::Solved => {
                if matches!(action, Action::Confirm | Action::Summon) {
                    self.advance(session)?;
                }
                return Ok(Reaction::default());
            }
            Outcome::Broken => {
                self.cursor = None;
                self.message = broken_message(session).into();
                return Ok(Reaction::default());
            }
            Outcome::Playing => {}
        }

        let command = match action {
            Action::Move(dir) => match self.cursor {
                Some(rc) => {
                    let level = session.level();
                    if let Some(next) = rc.step(dir, level.height(), level.width()) {
                        self.cursor = Some(next);
                    }
                    None
                }
                None => Some(Command::MoveCurrentCharacter(dir)),
            },
            Action::Wait => Some(Command::Wait),
            Action::FastForward => Some(Command::FastForward),
            Action::NextCharacter => next_character(session.level()).map(Command::SwitchCharacter),
            Action::SelectCharacter(n) => {
                nth_character(session.level(), n).map(Command::SwitchCharacter)
            }
            Action::ToggleCursor => {
                self.cursor = match self.cursor {
                    Some(_) => None,
                    None => session.level().current_character().map(|a| a.row_col),
                };
                None
            }
            Action::Summon | Action::Confirm => match self.cursor.take() {
                Some(rc) => Some(self.summon_command(session.level().layout().row_col_to_xy(rc))),
                None => {
                    if action == Action::Summon {
                        self.cursor = session.level().current_character().map(|a| a.row_col);
                    }
                    None
                }
            },
            Action::SummonAt(xy) => Some(self.summon_command(xy)),
            _ => None,
        };

        let command = match command {
            Some(c) => c,
            None => return Ok(Reaction::default()),
        };

        let events = session.apply(command);
        if matches!(command, Command::SummonCurrentCharacter { .. }) && events.is_empty() {
            self.message = "Can't summon there".into();
        }
        let sfx = match session.outcome() {
            Outcome::Solved => {
                self.message = if session.is_last_level() {
                    "Solved! Enter to finish".into()
                } else {
                    "Solved! Enter for the next level".into()
                };
                Some(Sfx::Solved)
            }
            Outcome::Broken => {
                self.message = broken_message(session).into();
                Sfx::for_events(&events)
            }
            Outcome::Playing => Sfx::for_events(&events),
        };
        Ok(Reaction::sound(sfx))
    }

    fn summon_command(&self, xy: Point) -> Command {
        Command::SummonCurrentCharacter { xy, time: self.summon_time }
    }

    fn advance(&mut self, session: &mut Session) -> Result<(), LevelError> {
        if session.is_last_level() {
            info!(levels = session.level_count(), "level set finished");
            self.finished = true;
            self.message = "Every loop is closed. Esc to quit".into();
        } else {
            session.next_level()?;
        }
        Ok(())
    }
}

fn broken_message(session: &Session) -> &'static str {
    if session.can_undo() {
        "The timeline is broken: Z to undo, R to restart"
    } else {
        "The timeline is broken: R to restart"
    }
}

/// Characters still in the level, in roster order.
fn present_characters(level: &Level) -> impl Iterator<Item = usize> + '_ {
    level
        .actors()
        .iter()
        .enumerate()
        .filter(|(_, a)| a.in_level && a.is_character())
        .map(|(i, _)| i)
}

fn nth_character(level: &Level, n: usize) -> Option<usize> {
    present_characters(level).nth(n)
}

/// The present character after the selected one, wrapping around.
fn next_character(level: &Level) -> Option<usize> {
    let current = level.character_idx();
    present_characters(level)
        .find(|&i| current.map_or(true, |c| i > c))
        .or_else(|| present_characters(level).next())
}
