/// Keyboard and mouse state tracker.
///
/// Keyboard: which keys are held (for continuous left/right/down) and which
/// were freshly pressed this frame (for jump, drop, door, menu keys).
/// Terminals that never report key releases are handled with a hold
/// timeout.
///
/// Mouse: last pointer cell and the cells clicked this frame, consumed by
/// the menu screens.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

/// A key with no Press/Repeat for this long counts as released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Last Press/Repeat per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from "not held" to "held" during the last drain.
    fresh_presses: Vec<KeyCode>,
    /// Raw key events collected during drain.
    pub raw_events: Vec<KeyEvent>,
    /// Set when the terminal reports key releases.
    pub honor_release: bool,

    /// Terminal cell under the pointer, updated on every mouse move.
    pub pointer: Option<(u16, u16)>,
    /// Left-button presses during the last drain, in terminal cells.
    pub clicks: Vec<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
            pointer: None,
            clicks: Vec::with_capacity(2),
        }
    }

    /// Drain all pending terminal events. Call once per frame, before the
    /// simulation step.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.clicks.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.on_key(key),
                Ok(Event::Mouse(m)) => match m.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        self.pointer = Some((m.column, m.row));
                    }
                    MouseEventKind::Down(MouseButton::Left) => {
                        self.pointer = Some((m.column, m.row));
                        self.clicks.push((m.column, m.row));
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Release fallback: drop stale keys.
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn on_key(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        let code = normalize(key.code);

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(code);
                self.last_active.insert(code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(code);
                }
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&normalize(code))
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Edge trigger: pressed during the last drain.
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&normalize(code))
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

/// Letter keys are tracked case-insensitively so Shift or Caps Lock
/// does not break held movement.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn first_press_is_fresh_repeat_is_not() {
        let mut input = InputState::new();
        input.on_key(press('a'));
        assert!(input.was_pressed(KeyCode::Char('a')));
        assert!(input.is_held(KeyCode::Char('a')));

        input.fresh_presses.clear();
        input.on_key(press('a'));
        assert!(!input.was_pressed(KeyCode::Char('a')));
        assert!(input.is_held(KeyCode::Char('a')));
    }

    #[test]
    fn letters_are_case_insensitive() {
        let mut input = InputState::new();
        input.on_key(press('D'));
        assert!(input.is_held(KeyCode::Char('d')));
        assert!(input.any_pressed(&[KeyCode::Char('x'), KeyCode::Char('d')]));
    }

    #[test]
    fn release_only_honored_when_enabled() {
        let mut input = InputState::new();
        input.on_key(press('s'));
        input.on_key(KeyEvent { kind: KeyEventKind::Release, ..press('s') });
        assert!(input.is_held(KeyCode::Char('s')));

        input.honor_release = true;
        input.on_key(KeyEvent { kind: KeyEventKind::Release, ..press('s') });
        assert!(!input.is_held(KeyCode::Char('s')));
    }

    #[test]
    fn ctrl_c_detected() {
        let mut input = InputState::new();
        input.on_key(KeyEvent { modifiers: KeyModifiers::CONTROL, ..press('c') });
        assert!(input.ctrl_c_pressed());
    }
}
