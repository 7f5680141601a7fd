/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed, batched with `queue!`
///   4. Swap front/back
///
/// The level draws itself through `sim::draw::Renderer`; this type only
/// knows how each `Sprite` looks. One grid cell covers `tile_w` x `tile_h`
/// terminal cells, as set by the level's layout.
///
/// Screen:
///   row 0        HUD (level, clock, characters, doors, summon countdown)
///   row 1        status / message
///   row 3..      map, centred
///   last row     key help

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::DisplayConfig;
use crate::domain::grid::{Direction, Layout, Point, RowCol};
use crate::domain::tile::DoorColor;
use crate::sim::draw::{NumberColor, Renderer, Sprite};
use crate::sim::level::{Level, Outcome};
use crate::sim::session::ScreenLayout;

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
const FLOOR_BG: Color = Color::Rgb { r: 38, g: 38, b: 52 };

const HUD_ROW: usize = 0;
const STATUS_ROW: usize = 1;
const MAP_ROW: usize = 3;
/// Rows below the map: a gap and the help line.
const FOOTER_ROWS: usize = 2;

const HELP: &str =
    "arrows move  Space wait  F ffwd  Tab/1-9 switch  C/click summon  +/- time  Z/X undo/redo  R restart  N/P level  Esc quit";

// ── Cell: the unit of the frame buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Differs from every real cell, so the next flush repaints everything.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn invalidate(&mut self) {
        self.cells.fill(Cell::INVALID);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    fn get(&self, x: i32, y: i32) -> Cell {
        self.index(x, y).map_or(Cell::BLANK, |i| self.cells[i])
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set((x + i) as i32, y as i32, Cell::new(ch, fg, bg));
        }
    }
}

// ── Sprite look ──

fn door_color(c: DoorColor) -> (Color, Color) {
    match c {
        DoorColor::Red => (Color::Rgb { r: 235, g: 85, b: 85 }, Color::Rgb { r: 90, g: 25, b: 25 }),
        DoorColor::Green => (Color::Rgb { r: 90, g: 215, b: 110 }, Color::Rgb { r: 25, g: 80, b: 35 }),
        DoorColor::Blue => (Color::Rgb { r: 100, g: 150, b: 255 }, Color::Rgb { r: 25, g: 45, b: 100 }),
    }
}

fn facing_arrow(d: Direction) -> char {
    match d {
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

/// (left glyph, fill glyph, fg, bg). `None` bg keeps whatever is underneath.
fn sprite_look(sprite: Sprite) -> (char, char, Color, Option<Color>) {
    match sprite {
        Sprite::Floor => ('·', ' ', Color::Rgb { r: 70, g: 70, b: 90 }, Some(FLOOR_BG)),
        Sprite::Wall => ('█', '█', Color::Rgb { r: 110, g: 110, b: 125 }, Some(Color::Rgb { r: 70, g: 70, b: 80 })),
        Sprite::Ice => ('░', '░', Color::Rgb { r: 190, g: 235, b: 255 }, Some(Color::Rgb { r: 55, g: 105, b: 140 })),
        Sprite::Hole => (' ', ' ', Color::Reset, Some(Color::Rgb { r: 4, g: 4, b: 8 })),
        Sprite::Stairs => ('≡', '≡', Color::Rgb { r: 255, g: 220, b: 80 }, Some(FLOOR_BG)),
        Sprite::SunkenCrate => ('▒', '▒', Color::Rgb { r: 140, g: 100, b: 50 }, Some(Color::Rgb { r: 60, g: 45, b: 25 })),
        Sprite::TrappedCharacter => ('▒', '▒', Color::Rgb { r: 130, g: 130, b: 210 }, Some(Color::Rgb { r: 40, g: 40, b: 70 })),
        Sprite::ElectricFloor => ('≈', '≈', Color::Rgb { r: 255, g: 250, b: 90 }, Some(Color::Rgb { r: 70, g: 60, b: 10 })),
        Sprite::Door { color, open: false } => {
            let (fg, dark) = door_color(color);
            ('█', '█', fg, Some(dark))
        }
        Sprite::Door { color, open: true } => ('░', '░', door_color(color).0, Some(FLOOR_BG)),
        Sprite::Switch { color, pressed } => {
            let ch = if pressed { '▪' } else { '▫' };
            (ch, ' ', door_color(color).0, Some(FLOOR_BG))
        }
        Sprite::Character { facing, selected: true } => (
            '@', facing_arrow(facing), Color::Rgb { r: 255, g: 240, b: 120 },
            Some(Color::Rgb { r: 70, g: 65, b: 20 }),
        ),
        Sprite::Character { facing, selected: false } => ('@', facing_arrow(facing), Color::White, None),
        Sprite::Crate => ('[', ']', Color::Rgb { r: 225, g: 165, b: 85 }, Some(Color::Rgb { r: 90, g: 60, b: 30 })),
    }
}

// ── HUD input ──

/// Everything on screen that isn't the level itself.
pub struct Hud<'a> {
    pub level_index: usize,
    pub level_count: usize,
    pub summon_time: u32,
    pub cursor: Option<RowCol>,
    pub message: &'a str,
    pub finished: bool,
    pub gamepad: bool,
}

// ── TerminalRenderer ──

pub struct TerminalRenderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// Layout of the level being drawn; set at the start of each frame.
    layout: Layout,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        TerminalRenderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            layout: Layout::new(1, 1, Point::new(0, 0), 0, 0),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        self.check_resize()?;
        self.back.invalidate();
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Where a level of this size goes on the current terminal.
    pub fn fit(&self, level: &Level, display: &DisplayConfig) -> ScreenLayout {
        fit_layout(self.term_w, self.term_h, level.height(), level.width(), display)
    }

    fn check_resize(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    pub fn render(&mut self, level: &Level, hud: &Hud) -> io::Result<()> {
        self.check_resize()?;
        self.front.clear();

        self.layout = *level.layout();
        level.draw(self);
        if let Some(rc) = hud.cursor {
            self.compose_cursor(level, rc);
        }
        self.compose_hud(level, hud);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Compose ──

    fn compose_cursor(&mut self, level: &Level, rc: RowCol) {
        let ok = level.can_summon_at(rc);
        let bg = if ok {
            Color::Rgb { r: 200, g: 200, b: 70 }
        } else {
            Color::Rgb { r: 170, g: 50, b: 50 }
        };
        let xy = self.layout.row_col_to_xy(rc);
        for dy in 0..self.layout.tile_h {
            for dx in 0..self.layout.tile_w {
                let under = self.front.get(xy.x + dx, xy.y + dy);
                self.front.set(xy.x + dx, xy.y + dy, Cell::new(under.ch, Color::Black, bg));
            }
        }
    }

    fn compose_hud(&mut self, level: &Level, hud: &Hud) {
        let label = Color::Rgb { r: 150, g: 150, b: 170 };
        let value = Color::White;

        let doors = level.doors();
        let line = format!(
            " {}  [{}/{}]   t={}   characters {}   doors R{} G{} B{}   summon {}",
            level.name(),
            hud.level_index + 1,
            hud.level_count,
            level.time(),
            level.character_count(),
            doors[0],
            doors[1],
            doors[2],
            hud.summon_time,
        );
        self.front.put_str(0, HUD_ROW, &line, value, BASE_BG);
        if hud.gamepad {
            let x = self.term_w.saturating_sub(6).max(line.chars().count() + 2);
            self.front.put_str(x, HUD_ROW, "[Pad]", label, BASE_BG);
        }

        let (status, fg) = if !hud.message.is_empty() {
            (hud.message.to_string(), Color::Rgb { r: 255, g: 220, b: 80 })
        } else if hud.finished {
            ("Every loop is closed".to_string(), Color::Rgb { r: 90, g: 255, b: 120 })
        } else {
            match level.outcome() {
                Outcome::Broken => ("TIMELINE BROKEN".to_string(), Color::Rgb { r: 255, g: 70, b: 70 }),
                Outcome::Solved => ("SOLVED".to_string(), Color::Rgb { r: 90, g: 255, b: 120 }),
                Outcome::Playing if hud.cursor.is_some() => (
                    format!("Summon: aim with arrows, Enter to bring a future self ({} ticks)", hud.summon_time),
                    label,
                ),
                Outcome::Playing => (String::new(), label),
            }
        };
        self.front.put_str(1, STATUS_ROW, &status, fg, BASE_BG);

        let help_row = self.term_h.saturating_sub(1);
        if help_row > MAP_ROW {
            self.front.put_str(1, help_row, HELP, Color::DarkGrey, BASE_BG);
        }
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        // Position of the terminal cursor after the last Print, if known
        let mut at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let i = y * self.front.width + x;
                let cell = self.front.cells[i];
                if cell == self.back.cells[i] {
                    continue;
                }
                if at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

impl Renderer for TerminalRenderer {
    fn draw_tile(&mut self, sprite: Sprite, row_col: RowCol, offset: Point) {
        let (first, fill, fg, bg) = sprite_look(sprite);
        let xy = self.layout.row_col_to_xy(row_col);
        for dy in 0..self.layout.tile_h {
            for dx in 0..self.layout.tile_w {
                let (x, y) = (xy.x + offset.x + dx, xy.y + offset.y + dy);
                let ch = if dx == 0 { first } else { fill };
                let bg = bg.unwrap_or_else(|| self.front.get(x, y).bg);
                self.front.set(x, y, Cell::new(ch, fg, bg));
            }
        }
    }

    fn draw_number(&mut self, value: u32, xy: Point, color: NumberColor) {
        let fg = match color {
            NumberColor::Next => Color::Rgb { r: 255, g: 200, b: 40 },
            NumberColor::Countdown => Color::Rgb { r: 200, g: 200, b: 220 },
        };
        for (i, ch) in value.to_string().chars().enumerate() {
            let x = xy.x + i as i32;
            let bg = self.front.get(x, xy.y).bg;
            self.front.set(x, xy.y, Cell::new(ch, fg, bg));
        }
    }
}

/// Centre a `rows` x `cols` map in the area between the status line and
/// the help line. Maps larger than the terminal hang off the right and
/// bottom edges.
fn fit_layout(term_w: usize, term_h: usize, rows: usize, cols: usize, display: &DisplayConfig) -> ScreenLayout {
    let tile_w = display.tile_width.max(1);
    let tile_h = display.tile_height.max(1);
    let map_w = cols as i32 * tile_w;
    let map_h = rows as i32 * tile_h;
    let avail_h = term_h.saturating_sub(MAP_ROW + FOOTER_ROWS) as i32;
    let x = ((term_w as i32 - map_w) / 2).max(0);
    let y = MAP_ROW as i32 + ((avail_h - map_h) / 2).max(0);
    ScreenLayout { tile_w, tile_h, origin: Point::new(x, y) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(w: i32, h: i32) -> DisplayConfig {
        DisplayConfig { tile_width: w, tile_height: h }
    }

    #[test]
    fn small_map_is_centred_below_the_hud() {
        let l = fit_layout(80, 24, 5, 10, &display(2, 1));
        // 20 columns wide in an 80 column terminal, 5 rows in 19 free rows
        assert_eq!(l.origin, Point::new(30, MAP_ROW as i32 + 7));
        assert_eq!((l.tile_w, l.tile_h), (2, 1));
    }

    #[test]
    fn oversized_map_sticks_to_the_top_left() {
        let l = fit_layout(20, 10, 30, 40, &display(2, 1));
        assert_eq!(l.origin, Point::new(0, MAP_ROW as i32));
    }

    #[test]
    fn frame_buffer_ignores_out_of_range_writes() {
        let mut fb = FrameBuffer::new(3, 2);
        fb.set(-1, 0, Cell::new('x', Color::White, BASE_BG));
        fb.set(3, 1, Cell::new('x', Color::White, BASE_BG));
        assert!(fb.cells.iter().all(|c| *c == Cell::BLANK));
        fb.put_str(1, 1, "abc", Color::White, BASE_BG);
        assert_eq!(fb.get(1, 1).ch, 'a');
        assert_eq!(fb.get(2, 1).ch, 'b');
    }

    #[test]
    fn every_sprite_has_a_look() {
        let sprites = [
            Sprite::Floor,
            Sprite::Hole,
            Sprite::Door { color: DoorColor::Green, open: true },
            Sprite::Switch { color: DoorColor::Blue, pressed: true },
            Sprite::Character { facing: Direction::Left, selected: false },
        ];
        for s in sprites {
            let (first, _, _, _) = sprite_look(s);
            assert!(first == ' ' || !first.is_control());
        }
        assert_eq!(sprite_look(Sprite::Character { facing: Direction::Up, selected: true }).1, '^');
        assert_eq!(sprite_look(Sprite::Character { facing: Direction::Up, selected: false }).3, None);
    }
}
