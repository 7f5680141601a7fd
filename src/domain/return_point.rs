/// ReturnPoint: a character's appointment with the past.
///
/// Created when a character summons its future self. The future self
/// appears immediately; the present self must then be standing on the
/// summon cell when the countdown runs out, at which point it leaves
/// the level (it is the one that travelled back).
///
/// Lifecycle:
///   1. **Pending**: `time > 0`, counting down once per level tick.
///   2. **Due**: the tick on which `time` reaches 0. The level checks
///      `ready()` exactly once: ready → satisfied, otherwise the
///      timeline breaks.
///   3. **Resolved**: `time == 0`. Further ticks do nothing.

use super::actor::Actor;
use super::grid::RowCol;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReturnPoint {
    pub row_col: RowCol,
    pub time: u32,
    /// Index of the actor that owes this return.
    pub character: usize,
    pub satisfied: bool,
}

impl ReturnPoint {
    pub fn new(row_col: RowCol, time: u32, character: usize) -> Self {
        ReturnPoint { row_col, time, character, satisfied: false }
    }

    /// Still counting down.
    pub fn is_pending(&self) -> bool {
        !self.satisfied && self.time > 0
    }

    /// Is the bound actor present and standing on the return cell?
    pub fn ready(&self, actors: &[Actor]) -> bool {
        actors
            .get(self.character)
            .map_or(false, |a| a.is_at(self.row_col))
    }

    /// Advance one tick. Returns true if the deadline arrived on this tick.
    pub fn tick(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.time -= 1;
        self.time == 0
    }
}
