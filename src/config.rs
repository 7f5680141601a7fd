/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or
/// `~/.local/share/chronocrate`. Every key has a default, so a missing
/// file or a partial one still yields a complete config.
///
/// ```toml
/// [general]
/// levels_dir = "levels"
///
/// [play]
/// summon_time = 3      # initial countdown for a summon, 1..=9
/// momentum = 2         # how many actors a move can shove in a row
///
/// [display]
/// tile_width = 2
/// tile_height = 1
///
/// [gamepad]
/// summon = ["A"]
///
/// [log]
/// file = "chronocrate.log"
/// filter = "info"
/// ```

use serde::Deserialize;
use std::path::PathBuf;

pub const SUMMON_TIME_MIN: u32 = 1;
pub const SUMMON_TIME_MAX: u32 = 9;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub play: PlayConfig,
    pub display: DisplayConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
    pub levels_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayConfig {
    pub summon_time: u32,
    pub momentum: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    pub tile_width: i32,
    pub tile_height: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamepadConfig {
    pub wait: Vec<String>,
    pub fast_forward: Vec<String>,
    pub summon: Vec<String>,
    pub next_character: Vec<String>,
    pub undo: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub file: PathBuf,
    pub filter: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    play: TomlPlay,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlPlay {
    #[serde(default = "default_summon_time")]
    summon_time: u32,
    #[serde(default = "default_momentum")]
    momentum: u32,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_tile_width")]
    tile_width: i32,
    #[serde(default = "default_tile_height")]
    tile_height: i32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_wait")]
    wait: Vec<String>,
    #[serde(default = "default_pad_fast_forward")]
    fast_forward: Vec<String>,
    #[serde(default = "default_pad_summon")]
    summon: Vec<String>,
    #[serde(default = "default_pad_next_character")]
    next_character: Vec<String>,
    #[serde(default = "default_pad_undo")]
    undo: Vec<String>,
    #[serde(default = "default_pad_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_filter")]
    filter: String,
}

// ── Defaults ──

fn default_levels_dir() -> String { "levels".into() }
fn default_summon_time() -> u32 { 3 }
fn default_momentum() -> u32 { crate::domain::actor::MOVE_MOMENTUM }
fn default_tile_width() -> i32 { 2 }
fn default_tile_height() -> i32 { 1 }

fn default_pad_wait() -> Vec<String> { vec!["B".into()] }
fn default_pad_fast_forward() -> Vec<String> { vec!["Y".into()] }
fn default_pad_summon() -> Vec<String> { vec!["A".into()] }
fn default_pad_next_character() -> Vec<String> { vec!["X".into(), "R1".into()] }
fn default_pad_undo() -> Vec<String> { vec!["L1".into()] }
fn default_pad_restart() -> Vec<String> { vec!["Select".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Start".into()] }

fn default_log_file() -> String { "chronocrate.log".into() }
fn default_log_filter() -> String { "info".into() }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { levels_dir: default_levels_dir() }
    }
}

impl Default for TomlPlay {
    fn default() -> Self {
        TomlPlay { summon_time: default_summon_time(), momentum: default_momentum() }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay { tile_width: default_tile_width(), tile_height: default_tile_height() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            wait: default_pad_wait(),
            fast_forward: default_pad_fast_forward(),
            summon: default_pad_summon(),
            next_character: default_pad_next_character(),
            undo: default_pad_undo(),
            restart: default_pad_restart(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: default_log_file(), filter: default_log_filter() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from the first `config.toml` found.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            play: PlayConfig {
                summon_time: toml_cfg.play.summon_time.clamp(SUMMON_TIME_MIN, SUMMON_TIME_MAX),
                // Zero would freeze every character in place
                momentum: toml_cfg.play.momentum.max(1),
            },
            display: DisplayConfig {
                tile_width: toml_cfg.display.tile_width.max(1),
                tile_height: toml_cfg.display.tile_height.max(1),
            },
            gamepad: GamepadConfig {
                wait: toml_cfg.gamepad.wait,
                fast_forward: toml_cfg.gamepad.fast_forward,
                summon: toml_cfg.gamepad.summon,
                next_character: toml_cfg.gamepad.next_character,
                undo: toml_cfg.gamepad.undo,
                restart: toml_cfg.gamepad.restart,
                quit: toml_cfg.gamepad.quit,
            },
            log: LogConfig {
                file: PathBuf::from(toml_cfg.log.file),
                filter: toml_cfg.log.filter,
            },
            levels_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/chronocrate");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
/// Runs before logging is set up, so problems go to stderr.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => return parse_toml(&text),
            Err(e) => eprintln!("Warning: could not read {}: {e}", path.display()),
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    toml::from_str::<TomlConfig>(text).unwrap_or_else(|e| {
        eprintln!("Warning: config.toml parse error: {e}");
        eprintln!("Using default settings.");
        TomlConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_text(text: &str) -> GameConfig {
        GameConfig::resolve(parse_toml(text), &[])
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = from_text("");
        assert_eq!(cfg.play, PlayConfig { summon_time: 3, momentum: 2 });
        assert_eq!(cfg.display, DisplayConfig { tile_width: 2, tile_height: 1 });
        assert_eq!(cfg.log.file, PathBuf::from("chronocrate.log"));
        assert_eq!(cfg.log.filter, "info");
        assert_eq!(cfg.levels_dir, PathBuf::from("levels"));
        assert_eq!(cfg.gamepad.summon, vec!["A".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = from_text("[play]\nmomentum = 3\n\n[gamepad]\nundo = [\"L2\"]\n");
        assert_eq!(cfg.play.momentum, 3);
        assert_eq!(cfg.play.summon_time, 3);
        assert_eq!(cfg.gamepad.undo, vec!["L2".to_string()]);
        assert_eq!(cfg.gamepad.wait, vec!["B".to_string()]);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = from_text("[play]\nsummon_time = 40\nmomentum = 0\n[display]\ntile_width = 0\n");
        assert_eq!(cfg.play.summon_time, SUMMON_TIME_MAX);
        assert_eq!(cfg.play.momentum, 1);
        assert_eq!(cfg.display.tile_width, 1);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let cfg = from_text("[play\nsummon_time = ");
        assert_eq!(cfg.play.summon_time, 3);
    }

    #[test]
    fn absolute_levels_dir_is_kept() {
        let cfg = from_text("[general]\nlevels_dir = \"/srv/loops\"\n");
        assert_eq!(cfg.levels_dir, PathBuf::from("/srv/loops"));
    }
}
