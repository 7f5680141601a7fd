/// Gamepad input via gilrs.
///
/// Every fresh press becomes one `Action`, the same type the keyboard
/// produces. Button mapping comes from the `[gamepad]` section of
/// config.toml; defaults:
///   D-pad / Left Stick  →  Move (or move the summon cursor)
///   A                   →  Summon (cursor on, then summon)
///   B                   →  Wait
///   Y                   →  Fast forward
///   X / R1              →  Next character
///   L1                  →  Undo
///   Select              →  Restart
///   Start               →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::grid::Direction;
use super::input::Action;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "L2" | "LT" => Some(Btn::L2),
            "R2" | "RT" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Button-to-action bindings, checked in order; a button bound twice
/// fires its first binding.
struct ActionMap {
    bindings: Vec<(Btn, Action)>,
}

impl ActionMap {
    fn from_config(cfg: &GamepadConfig) -> Self {
        let lists: [(&[String], Action); 7] = [
            (&cfg.summon, Action::Summon),
            (&cfg.wait, Action::Wait),
            (&cfg.fast_forward, Action::FastForward),
            (&cfg.next_character, Action::NextCharacter),
            (&cfg.undo, Action::Undo),
            (&cfg.restart, Action::Restart),
            (&cfg.quit, Action::Quit),
        ];
        let mut bindings = vec![];
        for (names, action) in lists {
            for name in names {
                match Btn::from_name(name) {
                    Some(btn) => bindings.push((btn, action)),
                    None => tracing::warn!(button = %name, "unknown gamepad button in config"),
                }
            }
        }
        ActionMap { bindings }
    }

    fn action_for(&self, btn: Btn) -> Option<Action> {
        self.bindings.iter().find(|(b, _)| *b == btn).map(|&(_, a)| a)
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    action_map: ActionMap,
    /// Stick direction currently past the deadzone, so a held stick
    /// fires once.
    stick: Option<Direction>,
    stick_x: f32,
    stick_y: f32,
    actions: Vec<Action>,

    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                tracing::warn!(error = %e, "gamepad support unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            action_map: ActionMap::from_config(cfg),
            stick: None,
            stick_x: 0.0,
            stick_y: 0.0,
            actions: Vec::with_capacity(4),
            connected,
        }
    }

    /// Collect the actions pressed since the last call.
    pub fn update(&mut self) {
        self.actions.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                    self.update_stick();
                }
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick = None;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, gilrs_btn: Button) {
        let dir = match gilrs_btn {
            Button::DPadUp => Some(Direction::Up),
            Button::DPadDown => Some(Direction::Down),
            Button::DPadLeft => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        if let Some(d) = dir {
            self.actions.push(Action::Move(d));
            return;
        }
        if let Some(action) = Btn::from_gilrs(gilrs_btn).and_then(|b| self.action_map.action_for(b)) {
            self.actions.push(action);
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn update_stick(&mut self) {
        let now = stick_direction(self.stick_x, self.stick_y);
        if let Some(dir) = now {
            if self.stick != now {
                self.actions.push(Action::Move(dir));
            }
        }
        self.stick = now;
    }
}

/// Dominant stick axis past the deadzone. Stick Y grows upwards.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_direction(x: f32, y: f32) -> Option<Direction> {
    if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
        return None;
    }
    let dir = if x.abs() >= y.abs() {
        if x < 0.0 { Direction::Left } else { Direction::Right }
    } else if y > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    };
    Some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn config() -> GamepadConfig {
        GamepadConfig {
            wait: names(&["B"]),
            fast_forward: names(&["north"]),
            summon: names(&["A"]),
            next_character: names(&["X", "RB"]),
            undo: names(&["L1", "bogus"]),
            restart: names(&["Select"]),
            quit: names(&["Start"]),
        }
    }

    #[test]
    fn config_names_map_to_actions() {
        let map = ActionMap::from_config(&config());
        assert_eq!(map.action_for(Btn::A), Some(Action::Summon));
        assert_eq!(map.action_for(Btn::Y), Some(Action::FastForward));
        assert_eq!(map.action_for(Btn::R1), Some(Action::NextCharacter));
        assert_eq!(map.action_for(Btn::L1), Some(Action::Undo));
        assert_eq!(map.action_for(Btn::R2), None);
    }

    #[test]
    fn first_binding_wins() {
        let mut cfg = config();
        cfg.wait = names(&["A"]);
        let map = ActionMap::from_config(&cfg);
        assert_eq!(map.action_for(Btn::A), Some(Action::Summon));
    }

    #[test]
    fn stick_picks_dominant_axis() {
        assert_eq!(stick_direction(0.1, 0.2), None);
        assert_eq!(stick_direction(-0.9, 0.3), Some(Direction::Left));
        assert_eq!(stick_direction(0.2, 0.8), Some(Direction::Up));
        assert_eq!(stick_direction(0.2, -0.8), Some(Direction::Down));
    }

    #[test]
    fn held_stick_fires_once() {
        let mut pad = GamepadState::new(&config());
        pad.actions.clear();
        pad.stick_x = 0.9;
        pad.update_stick();
        pad.update_stick();
        assert_eq!(pad.actions(), &[Action::Move(Direction::Right)]);
        pad.stick_x = 0.0;
        pad.update_stick();
        pad.stick_x = 0.9;
        pad.update_stick();
        assert_eq!(pad.actions().len(), 2);
    }
}
