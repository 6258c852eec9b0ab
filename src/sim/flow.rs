/// Game state machine: the core-owned actions behind keys and buttons.
///
/// ```text
///            start                door (last level)
///   Menu ───────────▶ Playing ─────────────────────▶ Victory
///    ▲ │               │  ▲ │ door (other levels)       │
///    │ │ tutorial      │  │ └──▶ next level ──┐        │ play again
///    │ ▼               │  └────────────────────┘        ▼
///  Tutorial            │ health 0                     Playing (level 0)
///                      ▼
///                   GameOver ──restart──▶ Playing (same level)
///
///   Escape / "Back to menu" from any state ──▶ Menu (level context cleared)
/// ```
///
/// Entering a state emits its music cue when music is enabled: Menu plays
/// the intro theme, Playing the level's track (emitted by the level
/// loader), Victory the congratulations theme; GameOver and Tutorial stop
/// the music.

use tracing::info;

use crate::domain::physics;
use crate::domain::rules;
use super::event::GameEvent;
use super::level::{self, load_level};
use super::world::{GameState, GameWorld};

pub const INTRO_TRACK: &str = "intro_theme";
pub const VICTORY_TRACK: &str = "congrats";

/// Discrete key presses the core reacts to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyPress {
    Jump,
    Drop,
    Interact,
    ToggleMusic,
    Escape,
}

/// Actions bound to menu buttons.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuAction {
    Start,
    Tutorial,
    ToggleMusic,
    Quit,
    Restart,
    PlayAgain,
    BackToMenu,
    CloseTutorial,
}

// ══════════════════════════════════════════════════════════════
// Transitions
// ══════════════════════════════════════════════════════════════

/// Switch state and emit the matching music cue.
pub fn enter_state(world: &mut GameWorld, state: GameState, events: &mut Vec<GameEvent>) {
    if world.state != state {
        info!(from = ?world.state, to = ?state, level = world.current_level + 1, "state change");
    }
    world.state = state;
    world.menu_cursor = 0;
    world.hover = None;

    if let Some(cue) = music_cue(world) {
        events.push(cue);
    }
}

/// Music for the current state, if music is on.
fn music_cue(world: &GameWorld) -> Option<GameEvent> {
    if !world.music_enabled {
        return None;
    }
    match world.state {
        GameState::Menu => Some(GameEvent::PlayMusic(INTRO_TRACK)),
        GameState::Victory => Some(GameEvent::PlayMusic(VICTORY_TRACK)),
        GameState::GameOver | GameState::Tutorial => Some(GameEvent::StopMusic),
        // The level loader starts the track.
        GameState::Playing => None,
    }
}

/// The track that should be audible in the current state.
pub fn current_track(world: &GameWorld) -> Option<&'static str> {
    match world.state {
        GameState::Menu => Some(INTRO_TRACK),
        GameState::Victory => Some(VICTORY_TRACK),
        GameState::Playing => level::level(world.current_level).map(|l| l.track),
        GameState::GameOver | GameState::Tutorial => None,
    }
}

pub fn start_game(world: &mut GameWorld, events: &mut Vec<GameEvent>) {
    info!(seed = world.seed, "new game");
    load_level(world, 0, events);
    enter_state(world, GameState::Playing, events);
}

/// Reload the current level. Placement reuses the RNG, so the layout
/// differs from the previous attempt.
pub fn restart_level(world: &mut GameWorld, events: &mut Vec<GameEvent>) {
    let idx = world.current_level;
    load_level(world, idx, events);
    enter_state(world, GameState::Playing, events);
}

pub fn play_again(world: &mut GameWorld, events: &mut Vec<GameEvent>) {
    load_level(world, 0, events);
    enter_state(world, GameState::Playing, events);
}

pub fn back_to_menu(world: &mut GameWorld, events: &mut Vec<GameEvent>) {
    world.reset_level_context();
    enter_state(world, GameState::Menu, events);
}

pub fn show_tutorial(world: &mut GameWorld, events: &mut Vec<GameEvent>) {
    if world.state != GameState::Menu { return; }
    events.push(GameEvent::TutorialOpened);
    enter_state(world, GameState::Tutorial, events);
}

pub fn close_tutorial(world: &mut GameWorld, events: &mut Vec<GameEvent>) {
    if world.state != GameState::Tutorial { return; }
    enter_state(world, GameState::Menu, events);
}

pub fn toggle_music(world: &mut GameWorld, events: &mut Vec<GameEvent>) {
    world.music_enabled = !world.music_enabled;
    info!(enabled = world.music_enabled, "music toggled");
    if !world.music_enabled {
        events.push(GameEvent::StopMusic);
    } else if let Some(track) = current_track(world) {
        events.push(GameEvent::PlayMusic(track));
    }
}

pub fn quit(world: &mut GameWorld) {
    world.quit_requested = true;
}

/// Open the door if the gate allows it, then advance or win.
/// Returns whether the door opened.
pub fn try_open_door(world: &mut GameWorld, events: &mut Vec<GameEvent>) -> bool {
    if world.state != GameState::Playing { return false; }

    let hitbox = world.player_hitbox();
    if !rules::can_open_door(&hitbox, &world.door, &world.progress) {
        events.push(GameEvent::DoorLocked);
        return false;
    }

    world.door.open = true;
    events.push(GameEvent::DoorOpened);
    info!(level = world.current_level + 1, "door opened");

    if level::is_last_level(world.current_level) {
        enter_state(world, GameState::Victory, events);
    } else {
        let next = world.current_level + 1;
        load_level(world, next, events);
    }
    true
}

// ══════════════════════════════════════════════════════════════
// Input dispatch
// ══════════════════════════════════════════════════════════════

pub fn handle_key(world: &mut GameWorld, key: KeyPress, events: &mut Vec<GameEvent>) {
    if key == KeyPress::Escape {
        back_to_menu(world, events);
        return;
    }
    if world.state != GameState::Playing { return; }

    match key {
        KeyPress::Jump => {
            if physics::jump(&mut world.player, &world.tuning) {
                events.push(GameEvent::Jumped);
            }
        }
        KeyPress::Drop => {
            if physics::drop_through(&mut world.player, &world.tuning) {
                events.push(GameEvent::Dropped);
            }
        }
        KeyPress::Interact => {
            try_open_door(world, events);
        }
        KeyPress::ToggleMusic => toggle_music(world, events),
        KeyPress::Escape => {}
    }
}

pub fn activate(world: &mut GameWorld, action: MenuAction, events: &mut Vec<GameEvent>) {
    events.push(GameEvent::MenuClick);
    match action {
        MenuAction::Start => start_game(world, events),
        MenuAction::Tutorial => show_tutorial(world, events),
        MenuAction::ToggleMusic => toggle_music(world, events),
        MenuAction::Quit => quit(world),
        MenuAction::Restart => restart_level(world, events),
        MenuAction::PlayAgain => play_again(world, events),
        MenuAction::BackToMenu => back_to_menu(world, events),
        MenuAction::CloseTutorial => close_tutorial(world, events),
    }
}
