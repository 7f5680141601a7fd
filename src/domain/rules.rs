/// Entry rules, as a truth table.
///
/// Pure functions: "what happens if this actor steps onto this tile".
/// The level performs the resulting mutation; nothing here touches state.
///
/// Movement is a two-sided handshake. The destination tile decides whether
/// it can be entered at all and which reaction family applies; the actor
/// kind decides how it reacts to that family. Both sides are folded into
/// one exhaustive match so every (tile, actor) pair is visible at a glance.
///
/// ## Entry Truth Table
///
/// ┌──────────────────────────────┬───────────┬──────────────────────────────┐
/// │ Destination tile              │ Entry     │ Arrival reaction              │
/// ├──────────────────────────────┼───────────┼──────────────────────────────┤
/// │ Floor / SunkenCrate / Trapped │ Stand     │ none                          │
/// │ Wall / Blank                  │ Blocked   │ –                             │
/// │ Ice                           │ Slide     │ keep going, same direction    │
/// │ Hole                          │ Fall      │ actor leaves, hole filled     │
/// │ Stairs                        │ Climb     │ character: level exit         │
/// │ Door, open                    │ Stand     │ none                          │
/// │ Door, closed                  │ Blocked   │ –                             │
/// │ PressureSwitch(c)             │ Press(c)  │ doors[c] -= 1                 │
/// │ ElectricFloor                 │ Shock     │ character dies at tick end    │
/// └──────────────────────────────┴───────────┴──────────────────────────────┘
///
/// A door counts as open when its counter is zero OR something already
/// stands on it. The check is made before the occupant is pushed away, so
/// a crate on a door holds it open for whoever pushes that crate.
///
/// ## Eviction Table
///
/// ┌──────────────────────────────┬──────────────────────────────┐
/// │ Tile being vacated            │ Effect                        │
/// ├──────────────────────────────┼──────────────────────────────┤
/// │ PressureSwitch(c)             │ doors[c] += 1                 │
/// │ anything else                 │ none (occupancy cleared)      │
/// └──────────────────────────────┴──────────────────────────────┘

use super::actor::ActorKind;
use super::tile::{DoorColor, Tile};

/// Outcome of offering a tile to a moving actor.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Entry {
    Blocked,
    Stand,
    Press(DoorColor),
    Slide,
    Fall,
    Climb,
    Shock,
}

impl Entry {
    pub fn accepts(self) -> bool {
        self != Entry::Blocked
    }
}

/// Is a door of `color` open, given the counters and whether its cell
/// is currently occupied?
#[inline]
pub fn door_open(doors: &[u32; 3], color: DoorColor, occupied: bool) -> bool {
    doors[color.index()] == 0 || occupied
}

/// Resolve an actor of `kind` entering `tile`. See truth table above.
///
/// `door_open` is only consulted for doors.
pub fn resolve_entry(tile: Tile, door_open: bool, kind: ActorKind) -> Entry {
    match (tile, kind) {
        (Tile::Floor | Tile::SunkenCrate | Tile::TrappedCharacter, _) => Entry::Stand,
        (Tile::Wall | Tile::Blank, _) => Entry::Blocked,
        (Tile::Ice, _) => Entry::Slide,
        (Tile::Hole, _) => Entry::Fall,
        (Tile::Stairs, _) => Entry::Climb,
        (Tile::Door(_), _) if door_open => Entry::Stand,
        (Tile::Door(_), _) => Entry::Blocked,
        (Tile::PressureSwitch(c), _) => Entry::Press(c),
        (Tile::ElectricFloor, ActorKind::Character) => Entry::Shock,
        (Tile::ElectricFloor, ActorKind::Crate) => Entry::Stand,
    }
}

/// The door counter to release when an actor leaves `tile`.
#[inline]
pub fn evict_from(tile: Tile) -> Option<DoorColor> {
    tile.switch_color()
}

/// What a hole turns into once `kind` has fallen into it.
pub fn filled_hole(kind: ActorKind) -> Tile {
    match kind {
        ActorKind::Crate => Tile::SunkenCrate,
        ActorKind::Character => Tile::TrappedCharacter,
    }
}

/// Is a character standing on `tile` killed when the tick ends?
#[inline]
pub fn is_hazard(tile: Tile, kind: ActorKind) -> bool {
    resolve_entry(tile, false, kind) == Entry::Shock
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [ActorKind; 2] = [ActorKind::Character, ActorKind::Crate];

    #[test]
    fn floor_variants_always_accept() {
        for tile in [Tile::Floor, Tile::SunkenCrate, Tile::TrappedCharacter] {
            for kind in KINDS {
                assert_eq!(resolve_entry(tile, false, kind), Entry::Stand);
            }
        }
    }

    #[test]
    fn walls_always_reject() {
        for tile in [Tile::Wall, Tile::Blank] {
            for kind in KINDS {
                assert_eq!(resolve_entry(tile, true, kind), Entry::Blocked);
                assert!(!resolve_entry(tile, true, kind).accepts());
            }
        }
    }

    #[test]
    fn special_floors() {
        for kind in KINDS {
            assert_eq!(resolve_entry(Tile::Ice, false, kind), Entry::Slide);
            assert_eq!(resolve_entry(Tile::Hole, false, kind), Entry::Fall);
            assert_eq!(resolve_entry(Tile::Stairs, false, kind), Entry::Climb);
        }
    }

    #[test]
    fn door_follows_open_flag() {
        let door = Tile::Door(DoorColor::Blue);
        assert_eq!(resolve_entry(door, true, ActorKind::Crate), Entry::Stand);
        assert_eq!(resolve_entry(door, false, ActorKind::Character), Entry::Blocked);
    }

    #[test]
    fn door_open_counter_or_occupied() {
        let doors = [0, 2, 1];
        assert!(door_open(&doors, DoorColor::Red, false));
        assert!(!door_open(&doors, DoorColor::Green, false));
        assert!(door_open(&doors, DoorColor::Green, true));
    }

    #[test]
    fn switch_presses_its_color() {
        let sw = Tile::PressureSwitch(DoorColor::Green);
        for kind in KINDS {
            assert_eq!(resolve_entry(sw, false, kind), Entry::Press(DoorColor::Green));
        }
        assert_eq!(evict_from(sw), Some(DoorColor::Green));
        assert_eq!(evict_from(Tile::Floor), None);
        assert_eq!(evict_from(Tile::Door(DoorColor::Green)), None);
    }

    #[test]
    fn electric_floor_only_hurts_characters() {
        assert_eq!(resolve_entry(Tile::ElectricFloor, false, ActorKind::Character), Entry::Shock);
        assert_eq!(resolve_entry(Tile::ElectricFloor, false, ActorKind::Crate), Entry::Stand);
        assert!(is_hazard(Tile::ElectricFloor, ActorKind::Character));
        assert!(!is_hazard(Tile::ElectricFloor, ActorKind::Crate));
        assert!(!is_hazard(Tile::Floor, ActorKind::Character));
    }

    #[test]
    fn holes_fill_by_kind() {
        assert_eq!(filled_hole(ActorKind::Crate), Tile::SunkenCrate);
        assert_eq!(filled_hole(ActorKind::Character), Tile::TrappedCharacter);
    }
}
