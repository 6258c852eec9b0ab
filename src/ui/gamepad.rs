/// Gamepad input tracker using gilrs.
///
/// Button mapping comes from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick    →  Walk, menu cursor (down = hold to fall through)
///   A                     →  Jump
///   B                     →  Drop through
///   X / R1                →  Open door
///   Y                     →  Music on/off
///   Start / A             →  Menu confirm
///   Select                →  Back to menu

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
use tracing::warn;

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical face/shoulder button).
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

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
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

/// Game actions a button can be bound to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PadAction {
    Jump,
    Drop,
    Interact,
    Music,
    Confirm,
    Cancel,
}

const ACTION_COUNT: usize = 6;

/// Directions shared by the D-pad and the digitised left stick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Bindings indexed by `PadAction`.
struct ActionMap([Vec<Btn>; ACTION_COUNT]);

impl ActionMap {
    fn from_config(cfg: &GamepadConfig) -> Self {
        let defaults = GamepadConfig::default();
        let bind = |names: &[String], fallback: &[String], action: &str| {
            let parsed: Vec<Btn> = names.iter()
                .filter_map(|s| {
                    let b = Btn::from_name(s);
                    if b.is_none() {
                        warn!(button = %s, action, "unknown gamepad button name");
                    }
                    b
                })
                .collect();
            if parsed.is_empty() {
                fallback.iter().filter_map(|s| Btn::from_name(s)).collect()
            } else {
                parsed
            }
        };
        ActionMap([
            bind(&cfg.jump, &defaults.jump, "jump"),
            bind(&cfg.drop, &defaults.drop, "drop"),
            bind(&cfg.interact, &defaults.interact, "interact"),
            bind(&cfg.music, &defaults.music, "music"),
            bind(&cfg.confirm, &defaults.confirm, "confirm"),
            bind(&cfg.cancel, &defaults.cancel, "cancel"),
        ])
    }

    fn get(&self, action: PadAction) -> &[Btn] {
        &self.0[action as usize]
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    /// Indexed by `Dir`.
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

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
                warn!(error = %e, "gamepad support unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::from_config(cfg),
            connected,
        }
    }

    /// Poll pending events. Call once per frame.
    pub fn update(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
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
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(Axis::LeftStickX, value, _) => self.stick_x = value,
                EventType::AxisChanged(Axis::LeftStickY, value, _) => self.stick_y = value,
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.stick[Dir::Left as usize].set(self.stick_x < -STICK_DEADZONE);
        self.stick[Dir::Right as usize].set(self.stick_x > STICK_DEADZONE);
        self.stick[Dir::Up as usize].set(self.stick_y > STICK_DEADZONE);
        self.stick[Dir::Down as usize].set(self.stick_y < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let dir = match gilrs_btn {
            Button::DPadUp => Some(Dir::Up),
            Button::DPadDown => Some(Dir::Down),
            Button::DPadLeft => Some(Dir::Left),
            Button::DPadRight => Some(Dir::Right),
            _ => None,
        };
        if let Some(d) = dir {
            self.dpad[d as usize].set(held);
        } else if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn as usize].set(held);
        }
    }

    // ── Queries ──

    /// Was any button bound to `action` pressed this frame?
    pub fn pressed(&self, action: PadAction) -> bool {
        self.action_map.get(action).iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    pub fn held(&self, dir: Dir) -> bool {
        self.dpad[dir as usize].held || self.stick[dir as usize].held
    }

    /// Direction newly engaged this frame (menu cursor).
    pub fn tapped(&self, dir: Dir) -> bool {
        self.dpad[dir as usize].just_pressed || self.stick[dir as usize].just_pressed
    }

    // ── Internal ──

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            *b = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_are_case_insensitive_with_aliases() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name("north"), Some(Btn::Y));
        assert_eq!(Btn::from_name("RB"), Some(Btn::R1));
        assert_eq!(Btn::from_name("back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn action_map_uses_config_then_defaults() {
        let mut cfg = GamepadConfig::default();
        cfg.jump = vec!["B".into()];
        cfg.drop = vec!["nonsense".into()];
        let map = ActionMap::from_config(&cfg);
        assert_eq!(map.get(PadAction::Jump), &[Btn::B]);
        assert_eq!(map.get(PadAction::Drop), &[Btn::B], "falls back to default");
        assert_eq!(map.get(PadAction::Interact), &[Btn::X, Btn::R1]);
        assert_eq!(map.get(PadAction::Confirm), &[Btn::Start, Btn::A]);
    }

    #[test]
    fn just_pressed_only_on_rising_edge() {
        let mut s = BtnState::default();
        s.set(true);
        assert!(s.just_pressed && s.held);
        s.just_pressed = false;
        s.set(true);
        assert!(!s.just_pressed);
        s.set(false);
        assert!(!s.held);
    }

    #[test]
    fn pressed_reads_bound_buttons() {
        let mut pad = GamepadState::new(&GamepadConfig::default());
        pad.buttons[Btn::X as usize].set(true);
        assert!(pad.pressed(PadAction::Interact));
        assert!(!pad.pressed(PadAction::Jump));
        pad.update();
        assert!(!pad.pressed(PadAction::Interact));
    }
}
