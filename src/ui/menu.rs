/// Menu screens: button layout, hit-testing, pointer and cursor handling.
///
/// Buttons live in absolute terminal cells (the renderer draws the game
/// at the top-left of the terminal), so the same layout serves drawing
/// and mouse hit-testing.

use crate::sim::event::GameEvent;
use crate::sim::flow::{self, MenuAction};
use crate::sim::world::{GameState, GameWorld};

pub const BUTTON_W: u16 = 24;
pub const BUTTON_COL: u16 = (80 - BUTTON_W) / 2;
const FIRST_ROW: u16 = 13;
const ROW_GAP: u16 = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct Button {
    pub label: String,
    pub action: MenuAction,
    pub col: u16,
    pub row: u16,
    pub width: u16,
}

impl Button {
    fn contains(&self, col: u16, row: u16) -> bool {
        row == self.row && col >= self.col && col < self.col + self.width
    }
}

/// Buttons shown in the current state, top to bottom.
pub fn buttons(world: &GameWorld) -> Vec<Button> {
    let music = if world.music_enabled { "Music: On" } else { "Music: Off" };
    let specs: Vec<(&str, MenuAction)> = match world.state {
        GameState::Menu => vec![
            ("Start", MenuAction::Start),
            ("How to play", MenuAction::Tutorial),
            (music, MenuAction::ToggleMusic),
            ("Quit", MenuAction::Quit),
        ],
        GameState::GameOver => vec![
            ("Restart", MenuAction::Restart),
            ("Back to menu", MenuAction::BackToMenu),
        ],
        GameState::Victory => vec![
            ("Play again", MenuAction::PlayAgain),
            ("Back to menu", MenuAction::BackToMenu),
        ],
        GameState::Tutorial => vec![("Back", MenuAction::CloseTutorial)],
        GameState::Playing => vec![],
    };

    let first_row = if world.state == GameState::Tutorial { FIRST_ROW + 12 } else { FIRST_ROW };
    specs.into_iter()
        .enumerate()
        .map(|(i, (label, action))| Button {
            label: label.to_string(),
            action,
            col: BUTTON_COL,
            row: first_row + i as u16 * ROW_GAP,
            width: BUTTON_W,
        })
        .collect()
}

pub fn hit_test(buttons: &[Button], col: u16, row: u16) -> Option<usize> {
    buttons.iter().position(|b| b.contains(col, row))
}

/// Pointer handling: hover follows the pointer, a click on a button
/// activates it. Any click closes the tutorial.
pub fn handle_pointer(
    world: &mut GameWorld,
    pointer: Option<(u16, u16)>,
    clicks: &[(u16, u16)],
    events: &mut Vec<GameEvent>,
) {
    if world.state == GameState::Playing { return; }

    let layout = buttons(world);
    world.hover = pointer.and_then(|(c, r)| hit_test(&layout, c, r));
    if let Some(i) = world.hover {
        world.menu_cursor = i;
    }

    let Some(&(c, r)) = clicks.first() else { return };
    if world.state == GameState::Tutorial {
        flow::activate(world, MenuAction::CloseTutorial, events);
        return;
    }
    if let Some(i) = hit_test(&layout, c, r) {
        flow::activate(world, layout[i].action, events);
    }
}

/// Move the keyboard cursor, wrapping at both ends.
pub fn move_cursor(world: &mut GameWorld, down: bool) {
    let n = buttons(world).len();
    if n == 0 { return; }
    world.menu_cursor = if down {
        (world.menu_cursor + 1) % n
    } else {
        (world.menu_cursor + n - 1) % n
    };
    world.hover = None;
}

/// Activate the button under the keyboard cursor.
pub fn confirm(world: &mut GameWorld, events: &mut Vec<GameEvent>) {
    let layout = buttons(world);
    if let Some(b) = layout.get(world.menu_cursor) {
        flow::activate(world, b.action, events);
    }
}
