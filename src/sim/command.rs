/// Commands: the player intents that mutate a level.
///
/// Each command is one atomic transition, applied to completion before the
/// next input is read. Applying returns the events the transition produced.
///
///   SwitchCharacter(i)        → control actor i (no time passes)
///   MoveCurrentCharacter(d)   → face d, push; a successful move ticks once
///   SummonCurrentCharacter    → future self appears at a screen position
///   Wait                      → tick once
///   FastForward               → tick until the next return point comes due

use crate::domain::grid::{Direction, Point};
use super::event::LevelEvent;
use super::level::Level;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    SwitchCharacter(usize),
    MoveCurrentCharacter(Direction),
    SummonCurrentCharacter { xy: Point, time: u32 },
    Wait,
    FastForward,
}

impl Command {
    pub fn apply(&self, level: &mut Level) -> Vec<LevelEvent> {
        match *self {
            Command::SwitchCharacter(idx) => level.select_character(idx),
            Command::MoveCurrentCharacter(dir) => move_current(level, dir),
            Command::SummonCurrentCharacter { xy, time } => summon_current(level, xy, time),
            Command::Wait => level.advance_time(),
            Command::FastForward => fast_forward(level),
        }
        level.take_events()
    }
}

fn move_current(level: &mut Level, dir: Direction) {
    let idx = match level.character_idx() {
        Some(i) => i,
        None => return,
    };
    // Turn first so a blocked move still shows where the player tried to go
    level.face(idx, dir);
    level.set_momentum(idx, level.move_momentum());
    if level.push(idx, dir) {
        level.advance_time();
        // advance_time turned everyone to face down; the mover keeps its heading
        level.face(idx, dir);
    }
}

fn summon_current(level: &mut Level, xy: Point, time: u32) {
    let idx = match level.character_idx() {
        Some(i) => i,
        None => return,
    };
    if let Some(rc) = level.layout().xy_to_row_col(xy) {
        level.summon_from_future(idx, rc, time);
    }
}

fn fast_forward(level: &mut Level) {
    let ticks = match level.next_return_point() {
        Some(i) => {
            let next = &level.return_points()[i];
            if !next.ready(level.actors()) {
                return;
            }
            next.time
        }
        None => return,
    };
    for _ in 0..ticks {
        level.advance_time();
        if !level.is_consistent() {
            break;
        }
    }
}
