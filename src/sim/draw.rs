/// Drawing a level through an abstract renderer.
///
/// The level knows *what* goes where; a `Renderer` knows how to put a
/// sprite or a number on its surface. Draw order:
///   1. tiles (Blank draws nothing)
///   2. actors still in the level, facing their direction
///   3. pending return points, as a countdown over their cell

use crate::domain::actor::ActorKind;
use crate::domain::grid::{Direction, Point, RowCol};
use crate::domain::tile::{DoorColor, Tile};
use super::level::Level;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sprite {
    Floor,
    Wall,
    Ice,
    Hole,
    Stairs,
    SunkenCrate,
    TrappedCharacter,
    ElectricFloor,
    Door { color: DoorColor, open: bool },
    Switch { color: DoorColor, pressed: bool },
    Character { facing: Direction, selected: bool },
    Crate,
}

/// A surface the level can be drawn on.
pub trait Renderer {
    /// Draw `sprite` at grid cell `row_col`, displaced by `offset`
    /// screen units (zero for everything the level draws today).
    fn draw_tile(&mut self, sprite: Sprite, row_col: RowCol, offset: Point);

    /// Draw a number at a screen position.
    fn draw_number(&mut self, value: u32, xy: Point, color: NumberColor);
}

/// Countdown colors: the one fast forward would jump to stands out.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NumberColor {
    Countdown,
    Next,
}

impl Tile {
    /// How this tile looks. `open` and `occupied` describe its cell right
    /// now; Blank has no sprite.
    pub fn sprite(self, open: bool, occupied: bool) -> Option<Sprite> {
        let sprite = match self {
            Tile::Blank => return None,
            Tile::Floor => Sprite::Floor,
            Tile::Wall => Sprite::Wall,
            Tile::Ice => Sprite::Ice,
            Tile::Hole => Sprite::Hole,
            Tile::Stairs => Sprite::Stairs,
            Tile::SunkenCrate => Sprite::SunkenCrate,
            Tile::TrappedCharacter => Sprite::TrappedCharacter,
            Tile::ElectricFloor => Sprite::ElectricFloor,
            Tile::Door(color) => Sprite::Door { color, open },
            Tile::PressureSwitch(color) => Sprite::Switch { color, pressed: occupied },
        };
        Some(sprite)
    }
}

impl Level {
    pub fn draw(&self, renderer: &mut impl Renderer) {
        let still = Point::new(0, 0);

        for row in 0..self.height() {
            for col in 0..self.width() {
                let rc = RowCol::new(row, col);
                let sprite = self
                    .tile(rc)
                    .sprite(self.is_door_open(rc), self.occupant(rc).is_some());
                if let Some(sprite) = sprite {
                    renderer.draw_tile(sprite, rc, still);
                }
            }
        }

        for (i, actor) in self.actors().iter().enumerate() {
            if !actor.in_level {
                continue;
            }
            let sprite = match actor.kind {
                ActorKind::Character => Sprite::Character {
                    facing: actor.direction,
                    selected: self.character_idx() == Some(i),
                },
                ActorKind::Crate => Sprite::Crate,
            };
            renderer.draw_tile(sprite, actor.row_col, still);
        }

        let next = self.next_return_point();
        for (i, rp) in self.return_points().iter().enumerate() {
            if !rp.is_pending() {
                continue;
            }
            let color = if next == Some(i) { NumberColor::Next } else { NumberColor::Countdown };
            renderer.draw_number(rp.time, self.layout().row_col_to_xy(rp.row_col), color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::return_point::ReturnPoint;
    use crate::sim::level::tests::level_from;

    #[derive(Default)]
    struct Recorder {
        tiles: Vec<(Sprite, RowCol)>,
        numbers: Vec<(u32, Point, NumberColor)>,
    }

    impl Renderer for Recorder {
        fn draw_tile(&mut self, sprite: Sprite, row_col: RowCol, offset: Point) {
            assert_eq!(offset, Point::new(0, 0));
            self.tiles.push((sprite, row_col));
        }
        fn draw_number(&mut self, value: u32, xy: Point, color: NumberColor) {
            self.numbers.push((value, xy, color));
        }
    }

    #[test]
    fn blank_cells_draw_nothing() {
        let level = level_from(&[" # ", "#@#", " # "]);
        let mut r = Recorder::default();
        level.draw(&mut r);
        // 5 tiles (4 walls, 1 floor) plus the character
        assert_eq!(r.tiles.len(), 6);
        assert!(!r.tiles.iter().any(|(_, rc)| *rc == RowCol::new(0, 0)));
    }

    #[test]
    fn actors_draw_over_tiles_with_selection() {
        let level = level_from(&["#####", "#@$@#", "#####"]);
        let mut r = Recorder::default();
        level.draw(&mut r);
        let actors: Vec<_> = r.tiles[15..].to_vec();
        assert_eq!(
            actors,
            vec![
                (Sprite::Character { facing: Direction::Down, selected: true }, RowCol::new(1, 1)),
                (Sprite::Crate, RowCol::new(1, 2)),
                (Sprite::Character { facing: Direction::Down, selected: false }, RowCol::new(1, 3)),
            ]
        );
    }

    #[test]
    fn removed_actors_are_not_drawn() {
        let mut level = level_from(&["######", "#@$O.#", "######"]);
        level.set_momentum(0, 2);
        assert!(level.push(0, Direction::Right));
        let mut r = Recorder::default();
        level.draw(&mut r);
        assert!(!r.tiles.iter().any(|(s, _)| *s == Sprite::Crate));
        assert!(r.tiles.contains(&(Sprite::SunkenCrate, RowCol::new(1, 3))));
    }

    #[test]
    fn doors_and_switches_show_state() {
        let level = level_from(&["######", "#@aA.#", "######"]);
        let mut r = Recorder::default();
        level.draw(&mut r);
        assert!(r.tiles.contains(&(
            Sprite::Switch { color: DoorColor::Red, pressed: false },
            RowCol::new(1, 2)
        )));
        assert!(r.tiles.contains(&(
            Sprite::Door { color: DoorColor::Red, open: false },
            RowCol::new(1, 3)
        )));
    }

    #[test]
    fn pending_returns_draw_countdowns_at_screen_position() {
        let mut level = level_from(&["######", "#@...#", "######"]);
        level.set_layout(2, 1, Point::new(4, 2));
        level.add_return_point(ReturnPoint::new(RowCol::new(1, 3), 5, 0));
        level.add_return_point(ReturnPoint::new(RowCol::new(1, 2), 2, 0));
        let mut r = Recorder::default();
        level.draw(&mut r);
        assert_eq!(
            r.numbers,
            vec![
                (5, Point::new(10, 3), NumberColor::Countdown),
                (2, Point::new(8, 3), NumberColor::Next),
            ]
        );
    }
}
