/// Actors: characters and crates.
/// Both occupy exactly one cell and can be pushed; only characters can be
/// controlled, summoned, or owe a return to the past.

use super::grid::{Direction, RowCol};

/// Push budget given to a character at the start of every player move.
/// Each actor in a push chain hands on one less, so 2 means a character
/// can shove a single crate but not two in a row.
pub const MOVE_MOMENTUM: u32 = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorKind {
    Character,
    Crate,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Actor {
    pub kind: ActorKind,
    pub row_col: RowCol,
    pub direction: Direction,
    pub momentum: u32,
    pub in_level: bool,
}

impl Actor {
    pub fn new(kind: ActorKind, row_col: RowCol) -> Self {
        Actor {
            kind,
            row_col,
            direction: Direction::Down,
            momentum: 0,
            in_level: true,
        }
    }

    pub fn character(row_col: RowCol) -> Self {
        Actor::new(ActorKind::Character, row_col)
    }

    pub fn is_character(&self) -> bool {
        self.kind == ActorKind::Character
    }

    /// Present and standing at exactly `rc`.
    pub fn is_at(&self, rc: RowCol) -> bool {
        self.in_level && self.row_col == rc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_actor_faces_down_and_is_present() {
        let a = Actor::character(RowCol::new(1, 2));
        assert!(a.in_level);
        assert!(a.is_character());
        assert_eq!(a.direction, Direction::Down);
        assert_eq!(a.momentum, 0);
        assert!(a.is_at(RowCol::new(1, 2)));
    }

    #[test]
    fn removed_actor_is_nowhere() {
        let mut a = Actor::new(ActorKind::Crate, RowCol::new(3, 3));
        a.in_level = false;
        assert!(!a.is_at(RowCol::new(3, 3)));
        assert!(!a.is_character());
    }
}
