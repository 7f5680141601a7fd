/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here. How a tile reacts to an
/// actor trying to enter it lives in `rules::resolve_entry`.

/// Door and pressure-switch color. A switch of one color only
/// drives doors of the same color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DoorColor {
    Red,
    Green,
    Blue,
}

impl DoorColor {
    pub const ALL: [DoorColor; 3] = [DoorColor::Red, DoorColor::Green, DoorColor::Blue];

    /// Index into `Level::doors`.
    pub fn index(self) -> usize {
        match self {
            DoorColor::Red => 0,
            DoorColor::Green => 1,
            DoorColor::Blue => 2,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Floor,
    Wall,
    Blank,            // Wall that draws nothing (outside the map)
    Ice,              // Slide until something stops you
    Hole,             // Swallows whatever enters
    Stairs,           // Exit
    Door(DoorColor),
    PressureSwitch(DoorColor),
    SunkenCrate,      // Hole filled by a crate; plain floor from now on
    TrappedCharacter, // Hole filled by a character; plain floor from now on
    ElectricFloor,    // Walkable, fatal to characters at the end of a tick
}

impl Tile {
    /// Door color, if this is a door.
    pub fn door_color(self) -> Option<DoorColor> {
        match self {
            Tile::Door(c) => Some(c),
            _ => None,
        }
    }

    /// Switch color, if this is a pressure switch.
    pub fn switch_color(self) -> Option<DoorColor> {
        match self {
            Tile::PressureSwitch(c) => Some(c),
            _ => None,
        }
    }

    /// Could a character legitimately stand here after being summoned?
    /// `door_open` is only consulted for doors.
    pub fn is_valid_summon_target(self, door_open: bool) -> bool {
        match self {
            Tile::Floor | Tile::SunkenCrate | Tile::TrappedCharacter => true,
            Tile::Ice | Tile::PressureSwitch(_) => true,
            Tile::Door(_) => door_open,
            Tile::Wall | Tile::Blank | Tile::Hole | Tile::Stairs | Tile::ElectricFloor => false,
        }
    }

    /// Can an actor be placed here when a level is built?
    /// Stairs are allowed so a level can start with a crate on them.
    pub fn can_start_occupied(self) -> bool {
        !matches!(self, Tile::Wall | Tile::Blank | Tile::Hole)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Blank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summon_targets() {
        assert!(Tile::Floor.is_valid_summon_target(false));
        assert!(Tile::SunkenCrate.is_valid_summon_target(false));
        assert!(Tile::TrappedCharacter.is_valid_summon_target(false));
        assert!(Tile::Ice.is_valid_summon_target(false));
        assert!(Tile::PressureSwitch(DoorColor::Red).is_valid_summon_target(false));
        assert!(!Tile::Wall.is_valid_summon_target(true));
        assert!(!Tile::Blank.is_valid_summon_target(true));
        assert!(!Tile::Hole.is_valid_summon_target(true));
        assert!(!Tile::Stairs.is_valid_summon_target(true));
        assert!(!Tile::ElectricFloor.is_valid_summon_target(true));
    }

    #[test]
    fn door_summon_target_follows_open_state() {
        let door = Tile::Door(DoorColor::Green);
        assert!(door.is_valid_summon_target(true));
        assert!(!door.is_valid_summon_target(false));
    }

    #[test]
    fn color_indices_are_distinct() {
        let idx: Vec<usize> = DoorColor::ALL.iter().map(|c| c.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }
}
