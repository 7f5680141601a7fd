/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files, sorted by file name)
///   2. Built-in embedded levels
///
/// ## Level file format (`.txt`):
///   Optional: `; Level Name` (first `;` line is the name, later ones are comments)
///   Lines: map rows
///   Optional: `@ crate 3,4` / `@ character 2,2` placement lines, for actors
///             that start on something other than plain floor
///
/// Rows shorter than the widest row are padded with blank.
///
/// ## Tile legend:
///   '#' = Wall                  ' ' = Blank (outside the map)
///   '.' = Floor                 '_' = Ice
///   'O' = Hole                  '>' = Stairs
///   'A' 'B' 'C' = Red / Green / Blue door
///   'a' 'b' 'c' = Red / Green / Blue pressure switch
///   '%' = Electric floor        'x' = Sunken crate   't' = Trapped character
///   '@' = Character on floor    '$' = Crate on floor

use std::path::Path;

use tracing::warn;

use crate::config::GameConfig;
use crate::domain::actor::ActorKind;
use crate::domain::grid::RowCol;
use crate::domain::tile::{DoorColor, Tile};
use crate::sim::level::Level;

/// Everything that can be wrong with level data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("level has no map rows")]
    Empty,

    #[error("grid is {rows}x{cols} but holds {len} tiles")]
    GridSize { rows: usize, cols: usize, len: usize },

    #[error("unknown tile glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },

    #[error("malformed placement line {line:?}")]
    BadPlacement { line: String },

    #[error("actor placed outside the map at row {row}, column {col}")]
    OffGrid { row: usize, col: usize },

    #[error("actor cannot start on {tile:?} at row {row}, column {col}")]
    BadStartTile { tile: Tile, row: usize, col: usize },

    #[error("two actors start at row {row}, column {col}")]
    Overlap { row: usize, col: usize },
}

/// Runtime level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
    pub placements: Vec<(ActorKind, RowCol)>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// All playable level definitions, in play order.
pub fn load_level_set(config: &GameConfig) -> Vec<LevelDef> {
    let dir = &config.levels_dir;
    if dir.is_dir() {
        let mut levels = load_from_directory(dir);
        if !levels.is_empty() {
            levels.sort_by(|a, b| a.0.cmp(&b.0));
            return levels.into_iter().map(|(_, def)| def).collect();
        }
    }
    embedded_levels()
}

/// Turn a definition into a ready-to-play level.
pub fn build_level(def: &LevelDef) -> Result<Level, LevelError> {
    let height = def.rows.len();
    let width = def.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    if height == 0 || width == 0 {
        return Err(LevelError::Empty);
    }

    let mut grid = vec![Tile::Blank; height * width];
    let mut placements = vec![];

    for (row, line) in def.rows.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            let rc = RowCol::new(row, col);
            grid[row * width + col] = match ch {
                '#' => Tile::Wall,
                ' ' => Tile::Blank,
                '.' => Tile::Floor,
                '_' => Tile::Ice,
                'O' => Tile::Hole,
                '>' => Tile::Stairs,
                'A' => Tile::Door(DoorColor::Red),
                'B' => Tile::Door(DoorColor::Green),
                'C' => Tile::Door(DoorColor::Blue),
                'a' => Tile::PressureSwitch(DoorColor::Red),
                'b' => Tile::PressureSwitch(DoorColor::Green),
                'c' => Tile::PressureSwitch(DoorColor::Blue),
                '%' => Tile::ElectricFloor,
                'x' => Tile::SunkenCrate,
                't' => Tile::TrappedCharacter,
                '@' => {
                    placements.push((ActorKind::Character, rc));
                    Tile::Floor
                }
                '$' => {
                    placements.push((ActorKind::Crate, rc));
                    Tile::Floor
                }
                glyph => return Err(LevelError::UnknownGlyph { glyph, row, col }),
            };
        }
    }

    // Explicit placements come after the map glyphs, so map characters
    // keep the lowest indices and the first one starts selected.
    placements.extend(def.placements.iter().copied());

    Level::new(&def.name, height, width, grid, &placements)
}

// ══════════════════════════════════════════════════════════════
// Single-level file parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content.
pub fn parse_level_file(content: &str) -> Result<LevelDef, LevelError> {
    let mut name = String::new();
    let mut rows = vec![];
    let mut placements = vec![];

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix(';') {
            if name.is_empty() {
                name = rest.trim().to_string();
            }
        } else if let Some(placement) = parse_placement(line)? {
            placements.push(placement);
        } else {
            rows.push(line.trim_end_matches('\r').to_string());
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }
    while rows.first().map_or(false, |r| r.trim().is_empty()) {
        rows.remove(0);
    }

    if rows.is_empty() {
        return Err(LevelError::Empty);
    }

    if name.is_empty() {
        name = "Untitled Loop".to_string();
    }

    Ok(LevelDef { name, rows, placements })
}

/// `@ crate 3,4` → Some((Crate, 3,4)). Lines that don't name an actor kind
/// after `@ ` are map rows (a character glyph followed by blank).
fn parse_placement(line: &str) -> Result<Option<(ActorKind, RowCol)>, LevelError> {
    let rest = match line.strip_prefix("@ ") {
        Some(r) => r,
        None => return Ok(None),
    };
    let mut parts = rest.split_whitespace();
    let kind = match parts.next() {
        Some("character") => ActorKind::Character,
        Some("crate") => ActorKind::Crate,
        _ => return Ok(None),
    };
    let bad = || LevelError::BadPlacement { line: line.to_string() };
    let coords = parts.next().ok_or_else(bad)?;
    if parts.next().is_some() {
        return Err(bad());
    }
    let (r, c) = coords.split_once(',').ok_or_else(bad)?;
    let row = r.trim().parse::<usize>().map_err(|_| bad())?;
    let col = c.trim().parse::<usize>().map_err(|_| bad())?;
    Ok(Some((kind, RowCol::new(row, col))))
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<(String, LevelDef)> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read levels directory");
            return results;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping unreadable level");
                    continue;
                }
            };
            // Validate now so a broken file never reaches the session
            let def = parse_level_file(&content).and_then(|def| build_level(&def).map(|_| def));
            match def {
                Ok(def) => {
                    let filename = path.file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .to_string();
                    results.push((filename, def));
                }
                Err(e) => warn!(file = %path.display(), error = %e, "skipping invalid level"),
            }
        }
    }

    results
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Loop 1 - First Steps", &[
            "#########",
            "#@.$.O.>#",
            "#########",
        ]),
        make_embedded("Loop 2 - Hold the Door", &[
            "#########",
            "#@.a.#..#",
            "#....A.>#",
            "#########",
        ]),
        make_embedded("Loop 3 - Borrowed Time", &[
            "  #######",
            "###..a..#",
            "#@......#",
            "#####A###",
            "    #.# ",
            "    #>#  ",
            "    ###  ",
        ]),
        make_embedded("Loop 4 - Thin Ice", &[
            "##########",
            "#@.$___.O#",
            "#.....#..#",
            "#.b...B.>#",
            "##########",
        ]),
        make_embedded("Loop 5 - Live Wire", &[
            "###########",
            "#@..%%%..>#",
            "#...###...#",
            "#.$.....c.#",
            "####C######",
            "   #.#     ",
            "   ###     ",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
        placements: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_name_rows_and_placements() {
        let text = "; Crate Door\n; a comment\n#####\n#@.A#\n#####\n@ crate 1,3\n\n";
        let def = parse_level_file(text).unwrap();
        assert_eq!(def.name, "Crate Door");
        assert_eq!(def.rows, vec!["#####", "#@.A#", "#####"]);
        assert_eq!(def.placements, vec![(ActorKind::Crate, RowCol::new(1, 3))]);
    }

    #[test]
    fn unnamed_level_gets_default_name() {
        let def = parse_level_file("###\n#@#\n###\n").unwrap();
        assert_eq!(def.name, "Untitled Loop");
    }

    #[test]
    fn character_glyph_row_is_not_a_placement() {
        let def = parse_level_file("@ .\n").unwrap();
        assert_eq!(def.rows, vec!["@ ."]);
        assert!(def.placements.is_empty());
    }

    #[test]
    fn malformed_placement_is_an_error() {
        let err = parse_level_file("###\n@ crate 1;2\n").unwrap_err();
        assert_eq!(err, LevelError::BadPlacement { line: "@ crate 1;2".into() });
        assert!(parse_level_file("@ crate 1,2 extra\n").is_err());
    }

    #[test]
    fn empty_file_is_an_error() {
        assert_eq!(parse_level_file("; only a name\n\n").unwrap_err(), LevelError::Empty);
    }

    #[test]
    fn ragged_rows_are_padded_with_blank() {
        let def = make_embedded("t", &["####", "#@#"]);
        let level = build_level(&def).unwrap();
        assert_eq!(level.width(), 4);
        assert_eq!(level.tile(RowCol::new(1, 3)), Tile::Blank);
    }

    #[test]
    fn unknown_glyph_reports_position() {
        let def = make_embedded("t", &["###", "#?#"]);
        assert_eq!(
            build_level(&def).unwrap_err(),
            LevelError::UnknownGlyph { glyph: '?', row: 1, col: 1 }
        );
    }

    #[test]
    fn glyphs_map_to_tiles_and_actors() {
        let def = make_embedded("t", &["#._O>AaBbCc%xt@$"]);
        let level = build_level(&def).unwrap();
        let tiles: Vec<Tile> = (0..16).map(|c| level.tile(RowCol::new(0, c))).collect();
        assert_eq!(tiles, vec![
            Tile::Wall, Tile::Floor, Tile::Ice, Tile::Hole, Tile::Stairs,
            Tile::Door(DoorColor::Red), Tile::PressureSwitch(DoorColor::Red),
            Tile::Door(DoorColor::Green), Tile::PressureSwitch(DoorColor::Green),
            Tile::Door(DoorColor::Blue), Tile::PressureSwitch(DoorColor::Blue),
            Tile::ElectricFloor, Tile::SunkenCrate, Tile::TrappedCharacter,
            Tile::Floor, Tile::Floor,
        ]);
        assert_eq!(level.actors().len(), 2);
        assert_eq!(level.actors()[0].kind, ActorKind::Character);
        assert_eq!(level.actors()[1].kind, ActorKind::Crate);
    }

    #[test]
    fn embedded_levels_are_valid() {
        for def in embedded_levels() {
            let level = build_level(&def)
                .unwrap_or_else(|e| panic!("{}: {e}", def.name));
            assert!(level.character_idx().is_some(), "{} has no character", def.name);
        }
    }
}
