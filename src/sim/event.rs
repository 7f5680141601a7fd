/// Events emitted during a level transition.
/// The presentation layer consumes these for sound; tests use them to
/// check what a command actually did.

use crate::domain::grid::RowCol;
use crate::domain::tile::DoorColor;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelEvent {
    Moved { actor: usize, to: RowCol },
    Pushed { actor: usize, to: RowCol },
    SwitchPressed { color: DoorColor },
    SwitchReleased { color: DoorColor },
    FellInHole { actor: usize, at: RowCol },
    Electrocuted { actor: usize, at: RowCol },
    StairsReached { actor: usize },
    Summoned { actor: usize, by: usize, at: RowCol, time: u32 },
    ReturnResolved { actor: usize },
    TimelineBroken { actor: usize },
}
