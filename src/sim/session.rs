/// Session: a run through a level set.
///
/// Owns the level being played plus everything around it that isn't part
/// of the puzzle state: which level of the set this is, undo/redo history,
/// and the screen layout to give every rebuilt level.
///
/// History holds whole `Level` snapshots. Levels are small, and a snapshot
/// restores time, door counters, return points and consistency together.
/// Commands that change nothing (a move into a wall with the same facing,
/// a refused summon) leave no history entry.

use tracing::info;

use crate::domain::actor::MOVE_MOMENTUM;
use crate::domain::grid::Point;
use super::command::Command;
use super::event::LevelEvent;
use super::level::{Level, Outcome};
use super::loader::{build_level, LevelDef, LevelError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScreenLayout {
    pub tile_w: i32,
    pub tile_h: i32,
    pub origin: Point,
}

impl Default for ScreenLayout {
    fn default() -> Self {
        ScreenLayout { tile_w: 1, tile_h: 1, origin: Point::new(0, 0) }
    }
}

pub struct Session {
    defs: Vec<LevelDef>,
    index: usize,
    level: Level,
    undo: Vec<Level>,
    redo: Vec<Level>,
    layout: ScreenLayout,
    momentum: u32,
}

impl Session {
    /// Start at level `index` of `defs`.
    pub fn new(defs: Vec<LevelDef>, index: usize) -> Result<Self, LevelError> {
        let def = defs.get(index).ok_or(LevelError::Empty)?;
        let level = build_level(def)?;
        info!(level = %level.name(), index, total = defs.len(), "level started");
        Ok(Session {
            defs,
            index,
            level,
            undo: vec![],
            redo: vec![],
            layout: ScreenLayout::default(),
            momentum: MOVE_MOMENTUM,
        })
    }

    pub fn level(&self) -> &Level { &self.level }
    pub fn index(&self) -> usize { self.index }
    pub fn level_count(&self) -> usize { self.defs.len() }
    pub fn can_undo(&self) -> bool { !self.undo.is_empty() }
    pub fn can_redo(&self) -> bool { !self.redo.is_empty() }
    pub fn outcome(&self) -> Outcome { self.level.outcome() }
    pub fn is_last_level(&self) -> bool { self.index + 1 >= self.defs.len() }

    pub fn set_layout(&mut self, layout: ScreenLayout) {
        self.layout = layout;
        self.apply_settings();
    }

    /// Momentum for player moves, from now on and in every rebuilt level.
    pub fn set_momentum(&mut self, momentum: u32) {
        self.momentum = momentum;
        self.apply_settings();
    }

    /// Snapshots predate later settings changes; bring the live level up to date.
    fn apply_settings(&mut self) {
        let l = self.layout;
        self.level.set_layout(l.tile_w, l.tile_h, l.origin);
        self.level.set_move_momentum(self.momentum);
    }

    // ── Play ──

    /// Apply one command, recording history if anything changed.
    pub fn apply(&mut self, command: Command) -> Vec<LevelEvent> {
        let before = self.level.clone();
        let events = command.apply(&mut self.level);
        if self.level != before {
            self.undo.push(before);
            self.redo.clear();
        }
        if !events.is_empty() && self.level.outcome() == Outcome::Solved {
            info!(level = %self.level.name(), time = self.level.time(), "level solved");
        }
        events
    }

    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(prev) => {
                let current = std::mem::replace(&mut self.level, prev);
                self.redo.push(current);
                self.apply_settings();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.level, next);
                self.undo.push(current);
                self.apply_settings();
                true
            }
            None => false,
        }
    }

    /// Rebuild the current level from its definition. Undoable.
    pub fn restart(&mut self) -> Result<(), LevelError> {
        let fresh = self.build(self.index)?;
        if fresh != self.level {
            let old = std::mem::replace(&mut self.level, fresh);
            self.undo.push(old);
            self.redo.clear();
        }
        Ok(())
    }

    // ── Progression ──

    /// Jump to level `index`, clearing history. Out-of-range indices are ignored.
    pub fn goto(&mut self, index: usize) -> Result<bool, LevelError> {
        if index >= self.defs.len() {
            return Ok(false);
        }
        self.level = self.build(index)?;
        self.index = index;
        self.undo.clear();
        self.redo.clear();
        info!(level = %self.level.name(), index, "level started");
        Ok(true)
    }

    pub fn next_level(&mut self) -> Result<bool, LevelError> {
        self.goto(self.index + 1)
    }

    pub fn prev_level(&mut self) -> Result<bool, LevelError> {
        match self.index.checked_sub(1) {
            Some(i) => self.goto(i),
            None => Ok(false),
        }
    }

    fn build(&self, index: usize) -> Result<Level, LevelError> {
        let mut level = build_level(&self.defs[index])?;
        let l = self.layout;
        level.set_layout(l.tile_w, l.tile_h, l.origin);
        level.set_move_momentum(self.momentum);
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::{Direction, RowCol};

    fn def(name: &str, rows: &[&str]) -> LevelDef {
        LevelDef {
            name: name.to_string(),
            rows: rows.iter().map(|r| r.to_string()).collect(),
            placements: vec![],
        }
    }

    fn two_levels() -> Vec<LevelDef> {
        vec![
            def("one", &["#####", "#@.>#", "#####"]),
            def("two", &["####", "#@>#", "####"]),
        ]
    }

    fn session() -> Session {
        Session::new(two_levels(), 0).unwrap()
    }

    const RIGHT: Command = Command::MoveCurrentCharacter(Direction::Right);

    #[test]
    fn starts_on_requested_level() {
        let s = Session::new(two_levels(), 1).unwrap();
        assert_eq!(s.level().name(), "two");
        assert!(s.is_last_level());
        assert!(Session::new(two_levels(), 2).is_err());
    }

    #[test]
    fn undo_and_redo_walk_history() {
        let mut s = session();
        s.apply(RIGHT);
        assert_eq!(s.level().time(), 1);
        assert!(s.undo());
        assert_eq!(s.level().time(), 0);
        assert_eq!(s.level().actors()[0].row_col, RowCol::new(1, 1));
        assert!(s.redo());
        assert_eq!(s.level().time(), 1);
        assert!(!s.redo());
    }

    #[test]
    fn new_command_clears_redo() {
        let mut s = session();
        s.apply(RIGHT);
        s.undo();
        s.apply(Command::Wait);
        assert!(!s.can_redo());
        assert_eq!(s.level().time(), 1);
    }

    #[test]
    fn noop_commands_leave_no_history() {
        let mut s = session();
        s.apply(Command::FastForward);
        assert!(!s.can_undo());
        // A blocked move still turns the character, which is a change
        s.apply(Command::MoveCurrentCharacter(Direction::Up));
        assert!(s.can_undo());
        assert_eq!(s.level().time(), 0);
    }

    #[test]
    fn undo_recovers_a_broken_timeline() {
        let mut s = session();
        s.apply(Command::SummonCurrentCharacter { xy: Point::new(2, 1), time: 1 });
        s.apply(Command::MoveCurrentCharacter(Direction::Down));
        s.apply(Command::Wait);
        assert_eq!(s.outcome(), Outcome::Broken);
        assert!(s.undo());
        assert_eq!(s.outcome(), Outcome::Playing);
    }

    #[test]
    fn restart_is_undoable() {
        let mut s = session();
        s.apply(RIGHT);
        s.restart().unwrap();
        assert_eq!(s.level().time(), 0);
        assert!(s.undo());
        assert_eq!(s.level().time(), 1);
    }

    #[test]
    fn solving_and_moving_on() {
        let mut s = session();
        s.apply(RIGHT);
        s.apply(RIGHT);
        assert_eq!(s.outcome(), Outcome::Solved);
        assert!(s.next_level().unwrap());
        assert_eq!(s.index(), 1);
        assert!(!s.can_undo());
        assert!(!s.next_level().unwrap());
        assert!(s.prev_level().unwrap());
        assert_eq!(s.index(), 0);
        assert!(!s.prev_level().unwrap());
    }

    #[test]
    fn layout_survives_rebuilds_and_undo() {
        let mut s = session();
        let layout = ScreenLayout { tile_w: 2, tile_h: 1, origin: Point::new(3, 2) };
        s.set_layout(layout);
        s.apply(RIGHT);
        s.undo();
        assert_eq!(s.level().layout().origin, Point::new(3, 2));
        s.next_level().unwrap();
        assert_eq!(s.level().layout().tile_w, 2);
    }

    #[test]
    fn momentum_setting_reaches_rebuilt_levels() {
        let mut s = session();
        s.set_momentum(4);
        assert_eq!(s.level().move_momentum(), 4);
        s.restart().unwrap();
        assert_eq!(s.level().move_momentum(), 4);
    }
}
