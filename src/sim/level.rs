/// Level: the complete state of one attempt at a puzzle.
///
/// ## Ownership
///
/// The level owns everything: the tile grid, the actor roster, the return
/// points, the door counters and the clock. Actors are addressed by their
/// index in the roster, which never changes (removed actors stay in the
/// roster with `in_level == false`), so return points and the selection can
/// hold plain indices.
///
/// ## Occupancy
///
/// `occupants[cell]` names the actor standing in each cell. It is updated
/// in lock-step with actor positions, so "at most one actor per cell" holds
/// after every public call. A push either completes or changes nothing.
///
/// ## Door counters
///
/// `doors[c]` counts the switches of color `c` nobody is standing on.
/// Doors of that color open when it reaches zero. Every switch press
/// decrements exactly once, every eviction from a switch increments exactly
/// once.
///
/// ## Time
///
/// `advance_time()` is the only place the clock moves. Order within a tick:
///   1. time += 1
///   2. return points, in index order (may break the timeline)
///   3. per-actor hazards, in index order
///   4. every actor turns to face down
///
/// Once `consistent` is false it stays false for this instance.

use tracing::{debug, info, warn};

use crate::domain::actor::{Actor, ActorKind, MOVE_MOMENTUM};
use crate::domain::grid::{Direction, Layout, Point, RowCol};
use crate::domain::return_point::ReturnPoint;
use crate::domain::rules::{self, Entry};
use crate::domain::tile::{DoorColor, Tile};
use super::event::LevelEvent;
use super::loader::LevelError;

/// Where the attempt stands, as far as the player is concerned.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Playing,
    /// A return point came due without its character in place.
    Broken,
    /// The controlled character reached the stairs and every loop is closed.
    Solved,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Level {
    name: String,
    height: usize,
    width: usize,
    grid: Vec<Tile>,
    occupants: Vec<Option<usize>>,

    actors: Vec<Actor>,
    character_idx: Option<usize>,
    character_count: usize,
    return_points: Vec<ReturnPoint>,

    doors: [u32; 3],
    time: u64,
    consistent: bool,
    /// The character that climbed the stairs, while it still stands there.
    exit: Option<usize>,

    layout: Layout,
    /// Momentum handed to a character when the player moves it.
    move_momentum: u32,
    events: Vec<LevelEvent>,
}

// ── Construction ──

impl Level {
    /// Build a level from a row-major tile grid and starting actors.
    /// The first character placed starts under player control.
    pub fn new(
        name: &str,
        height: usize,
        width: usize,
        grid: Vec<Tile>,
        placements: &[(ActorKind, RowCol)],
    ) -> Result<Self, LevelError> {
        if height == 0 || width == 0 {
            return Err(LevelError::Empty);
        }
        if grid.len() != height * width {
            return Err(LevelError::GridSize { rows: height, cols: width, len: grid.len() });
        }

        let mut doors = [0u32; 3];
        for tile in &grid {
            if let Some(c) = tile.switch_color() {
                doors[c.index()] += 1;
            }
        }

        let mut level = Level {
            name: name.to_string(),
            height,
            width,
            grid,
            occupants: vec![None; height * width],
            actors: Vec::with_capacity(placements.len()),
            character_idx: None,
            character_count: 0,
            return_points: vec![],
            doors,
            time: 0,
            consistent: true,
            exit: None,
            layout: Layout::new(1, 1, Point::new(0, 0), height, width),
            move_momentum: MOVE_MOMENTUM,
            events: vec![],
        };

        for &(kind, rc) in placements {
            if rc.row >= height || rc.col >= width {
                return Err(LevelError::OffGrid { row: rc.row, col: rc.col });
            }
            let tile = level.tile(rc);
            if !tile.can_start_occupied() {
                return Err(LevelError::BadStartTile { tile, row: rc.row, col: rc.col });
            }
            if level.occupant(rc).is_some() {
                return Err(LevelError::Overlap { row: rc.row, col: rc.col });
            }
            let idx = level.spawn(Actor::new(kind, rc));
            if kind == ActorKind::Character && level.character_idx.is_none() {
                level.character_idx = Some(idx);
            }
        }
        // Presses made while placing actors are part of the initial state.
        level.events.clear();
        Ok(level)
    }

    /// Replace the screen transform (tile size and origin). The grid
    /// dimensions always come from the level itself.
    pub fn set_layout(&mut self, tile_w: i32, tile_h: i32, origin: Point) {
        self.layout = Layout::new(tile_w, tile_h, origin, self.height, self.width);
    }

    pub fn set_move_momentum(&mut self, momentum: u32) {
        self.move_momentum = momentum;
    }
}

// ── Queries ──

impl Level {
    pub fn name(&self) -> &str { &self.name }
    pub fn height(&self) -> usize { self.height }
    pub fn width(&self) -> usize { self.width }
    pub fn time(&self) -> u64 { self.time }
    pub fn is_consistent(&self) -> bool { self.consistent }
    pub fn is_completed(&self) -> bool { self.exit.is_some() }
    pub fn doors(&self) -> &[u32; 3] { &self.doors }
    pub fn layout(&self) -> &Layout { &self.layout }
    pub fn actors(&self) -> &[Actor] { &self.actors }
    pub fn return_points(&self) -> &[ReturnPoint] { &self.return_points }
    pub fn character_idx(&self) -> Option<usize> { self.character_idx }
    pub fn character_count(&self) -> usize { self.character_count }
    pub fn move_momentum(&self) -> u32 { self.move_momentum }

    #[inline]
    fn cell(&self, rc: RowCol) -> usize {
        rc.row * self.width + rc.col
    }

    /// Tile at `rc`. Out of bounds reads as Wall.
    #[inline]
    pub fn tile(&self, rc: RowCol) -> Tile {
        if rc.row < self.height && rc.col < self.width {
            self.grid[self.cell(rc)]
        } else {
            Tile::Wall
        }
    }

    /// Index of the actor standing at `rc`, if any.
    #[inline]
    pub fn occupant(&self, rc: RowCol) -> Option<usize> {
        if rc.row < self.height && rc.col < self.width {
            self.occupants[self.cell(rc)]
        } else {
            None
        }
    }

    /// The actor under player control.
    pub fn current_character(&self) -> Option<&Actor> {
        self.character_idx.and_then(|i| self.actors.get(i))
    }

    /// Is the tile at `rc` an open door? False for anything that isn't a door.
    pub fn is_door_open(&self, rc: RowCol) -> bool {
        match self.tile(rc).door_color() {
            Some(c) => rules::door_open(&self.doors, c, self.occupant(rc).is_some()),
            None => false,
        }
    }

    /// Could a future self be summoned onto `rc` right now?
    pub fn can_summon_at(&self, rc: RowCol) -> bool {
        if rc.row >= self.height || rc.col >= self.width || self.occupant(rc).is_some() {
            return false;
        }
        let tile = self.tile(rc);
        tile.is_valid_summon_target(self.is_door_open(rc))
    }

    /// The pending return point due soonest. Ties go to the lowest index.
    pub fn next_return_point(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, rp) in self.return_points.iter().enumerate() {
            if !rp.is_pending() {
                continue;
            }
            match best {
                Some(b) if self.return_points[b].time <= rp.time => {}
                _ => best = Some(i),
            }
        }
        best
    }

    pub fn outcome(&self) -> Outcome {
        if !self.consistent {
            Outcome::Broken
        } else if self.is_completed() && self.return_points.iter().all(|rp| !rp.is_pending()) {
            Outcome::Solved
        } else {
            Outcome::Playing
        }
    }

    /// Drain the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }
}

// ── Selection and facing ──

impl Level {
    /// Hand control to actor `idx`. Panics on an index outside the roster.
    pub fn select_character(&mut self, idx: usize) {
        assert!(
            idx < self.actors.len(),
            "character index {idx} out of range ({} actors)",
            self.actors.len()
        );
        self.character_idx = Some(idx);
    }

    pub fn face(&mut self, idx: usize, dir: Direction) {
        self.actors[idx].direction = dir;
    }

    pub fn set_momentum(&mut self, idx: usize, momentum: u32) {
        self.actors[idx].momentum = momentum;
    }

    /// Lowest-index character still in the level.
    fn first_present_character(&self) -> Option<usize> {
        self.actors.iter().position(|a| a.in_level && a.is_character())
    }
}

// ── Movement ──

impl Level {
    /// Try to move actor `idx` one cell towards `dir`, pushing whatever
    /// stands there. Returns whether the actor moved.
    ///
    /// Consumes no momentum itself; an occupant in the way is handed
    /// `momentum - 1` and pushed first. Ice keeps the actor going with the
    /// same momentum until something stops it.
    pub fn push(&mut self, idx: usize, dir: Direction) -> bool {
        let (kind, from, momentum) = match self.actors.get(idx) {
            Some(a) if a.in_level => (a.kind, a.row_col, a.momentum),
            _ => return false,
        };
        if momentum == 0 {
            return false;
        }
        let to = match from.step(dir, self.height, self.width) {
            Some(rc) => rc,
            None => return false,
        };

        // Door state is judged before anyone leaves the destination.
        let tile = self.tile(to);
        let occupant = self.occupant(to);
        let open = self.is_door_open(to);
        let entry = rules::resolve_entry(tile, open, kind);
        if !entry.accepts() {
            return false;
        }

        if let Some(other) = occupant {
            let before = self.actors[other].momentum;
            self.actors[other].momentum = momentum - 1;
            if !self.push(other, dir) {
                self.actors[other].momentum = before;
                return false;
            }
            self.events.push(LevelEvent::Pushed { actor: other, to: self.actors[other].row_col });
        }

        self.vacate(idx);
        self.actors[idx].row_col = to;
        let cell = self.cell(to);
        self.occupants[cell] = Some(idx);
        self.events.push(LevelEvent::Moved { actor: idx, to });

        match entry {
            Entry::Stand | Entry::Shock | Entry::Blocked => {}
            Entry::Press(c) => self.press(c),
            Entry::Slide => {
                self.push(idx, dir);
            }
            Entry::Fall => self.fall(idx, to),
            Entry::Climb => self.climb(idx),
        }
        true
    }

    /// Clear `idx` from its cell, releasing a switch if it stood on one.
    fn vacate(&mut self, idx: usize) {
        if self.exit == Some(idx) {
            self.exit = None;
        }
        let rc = self.actors[idx].row_col;
        let cell = self.cell(rc);
        if self.occupants[cell] == Some(idx) {
            self.occupants[cell] = None;
        }
        if let Some(c) = rules::evict_from(self.tile(rc)) {
            self.release(c);
        }
    }

    fn press(&mut self, color: DoorColor) {
        let counter = &mut self.doors[color.index()];
        assert!(*counter > 0, "{color:?} door counter would go negative");
        *counter -= 1;
        self.events.push(LevelEvent::SwitchPressed { color });
    }

    fn release(&mut self, color: DoorColor) {
        self.doors[color.index()] += 1;
        self.events.push(LevelEvent::SwitchReleased { color });
    }

    fn fall(&mut self, idx: usize, at: RowCol) {
        let cell = self.cell(at);
        self.grid[cell] = rules::filled_hole(self.actors[idx].kind);
        self.events.push(LevelEvent::FellInHole { actor: idx, at });
        debug!(actor = idx, row = at.row, col = at.col, "actor fell into a hole");
        self.remove_from_level(idx);
    }

    fn climb(&mut self, idx: usize) {
        if !self.actors[idx].is_character() {
            return;
        }
        self.events.push(LevelEvent::StairsReached { actor: idx });
        if self.character_idx == Some(idx) {
            info!(level = %self.name, time = self.time, "stairs reached");
            self.exit = Some(idx);
        }
    }

    fn spawn(&mut self, actor: Actor) -> usize {
        let idx = self.actors.len();
        let rc = actor.row_col;
        let kind = actor.kind;
        self.actors.push(actor);
        let cell = self.cell(rc);
        self.occupants[cell] = Some(idx);
        if let Some(c) = self.tile(rc).switch_color() {
            self.press(c);
        }
        if kind == ActorKind::Character {
            self.character_count += 1;
        }
        idx
    }

    /// Take actor `idx` out of the level. Removing the controlled
    /// character passes control to the first character still present.
    pub fn remove_from_level(&mut self, idx: usize) {
        if !self.actors[idx].in_level {
            return;
        }
        self.vacate(idx);
        self.actors[idx].in_level = false;
        if self.actors[idx].is_character() {
            self.character_count -= 1;
            if self.character_idx == Some(idx) {
                self.character_idx = self.first_present_character();
            }
        }
    }
}

// ── Time travel ──

impl Level {
    /// Bring character `idx`'s future self into the level at `rc`, and
    /// schedule `idx` to travel back from `rc` in `time` ticks.
    ///
    /// Returns false (and changes nothing) when `idx` is not a present
    /// character, `time` is zero, or `rc` cannot hold a summoned character.
    pub fn summon_from_future(&mut self, idx: usize, rc: RowCol, time: u32) -> bool {
        match self.actors.get(idx) {
            Some(a) if a.in_level && a.is_character() => {}
            _ => return false,
        }
        if time == 0 || !self.can_summon_at(rc) {
            return false;
        }

        let future = self.spawn(Actor::character(rc));
        self.add_return_point(ReturnPoint::new(rc, time, idx));
        self.events.push(LevelEvent::Summoned { actor: future, by: idx, at: rc, time });
        info!(
            by = idx, future, row = rc.row, col = rc.col, time,
            "summoned future self"
        );
        true
    }

    pub fn add_return_point(&mut self, rp: ReturnPoint) {
        self.return_points.push(rp);
    }

    /// Advance the clock by one tick. See the module docs for ordering.
    pub fn advance_time(&mut self) {
        self.time += 1;

        for i in 0..self.return_points.len() {
            self.update_return_point(i);
        }
        for i in 0..self.actors.len() {
            self.tick_actor(i);
        }
        for actor in &mut self.actors {
            actor.direction = Direction::Down;
        }

        debug!(
            time = self.time,
            consistent = self.consistent,
            characters = self.character_count,
            "tick"
        );
    }

    fn update_return_point(&mut self, i: usize) {
        if !self.return_points[i].tick() {
            return;
        }
        let character = self.return_points[i].character;
        if self.return_points[i].ready(&self.actors) {
            self.remove_from_level(character);
            self.return_points[i].satisfied = true;
            self.events.push(LevelEvent::ReturnResolved { actor: character });
            info!(actor = character, time = self.time, "character returned to the past");
        } else {
            if self.consistent {
                warn!(actor = character, time = self.time, "timeline broken: character missed its return");
            }
            self.consistent = false;
            self.events.push(LevelEvent::TimelineBroken { actor: character });
        }
    }

    fn tick_actor(&mut self, idx: usize) {
        let actor = &self.actors[idx];
        if !actor.in_level {
            return;
        }
        let at = actor.row_col;
        if rules::is_hazard(self.tile(at), actor.kind) {
            self.events.push(LevelEvent::Electrocuted { actor: idx, at });
            debug!(actor = idx, row = at.row, col = at.col, "character electrocuted");
            self.remove_from_level(idx);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
