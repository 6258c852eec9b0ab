/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::entity::FrameInput;
use domain::metrics::SpriteMetrics;
use sim::event::GameEvent;
use sim::flow::{self, KeyPress};
use sim::step;
use sim::world::{GameState, GameWorld};
use ui::gamepad::{Dir, GamepadState, PadAction};
use ui::input::InputState;
use ui::menu;
use ui::renderer::{Renderer, SpriteTable};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    init_logging(&config);

    let seed = config.general.seed.unwrap_or_else(rand::random::<u64>);
    let metrics = SpriteMetrics::resolve(&SpriteTable);
    let mut world = GameWorld::new(config.physics.clone(), metrics, seed);
    world.music_enabled = config.general.music;
    info!(seed, music = world.music_enabled, "energyquest starting");
    if let Some(path) = &config.source {
        info!(path = %path.display(), "config loaded");
    }

    let mut renderer = Renderer::new();
    let honor_release = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let mut sound = SoundEngine::new(config.general.sound);

    let result = game_loop(&mut world, &mut renderer, sound.as_mut(), &config, honor_release);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Energy Quest!");
}

/// Raw mode owns the terminal, so logs only go to a file.
fn init_logging(config: &GameConfig) {
    let Some(path) = &config.general.log_file else { return };
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {e}", path.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
}

fn game_loop(
    world: &mut GameWorld,
    renderer: &mut Renderer,
    mut sound: Option<&mut SoundEngine>,
    config: &GameConfig,
    honor_release: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = honor_release;
    let mut gp = GamepadState::new(&config.gamepad);
    if gp.connected {
        info!("gamepad connected");
    }
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms.max(1));

    let mut events = Vec::new();
    if let Some(track) = flow::current_track(world).filter(|_| world.music_enabled) {
        events.push(GameEvent::PlayMusic(track));
    }

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        // Discrete presses act immediately; the simulation steps on the tick.
        if world.state == GameState::Playing {
            handle_play_keys(world, &kb, &gp, &mut events);
        } else {
            handle_screen_keys(world, &kb, &gp, &mut events);
            menu::handle_pointer(world, kb.pointer, &kb.clicks, &mut events);
        }

        if world.quit_requested {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            let input = detect_movement(&kb, &gp);
            events.extend(step::step(world, input));
            last_tick = Instant::now();
        }

        process_sound_events(sound.as_deref_mut(), &events);
        events.clear();

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    info!(level = world.current_level + 1, "quit");
    Ok(())
}

fn process_sound_events(sound: Option<&mut SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    for event in events {
        match event {
            GameEvent::Jumped => sfx.play_jump(),
            GameEvent::GemCollected { .. } => sfx.play_collect(),
            GameEvent::KeyTaken => sfx.play_key(),
            GameEvent::PlayerHit { .. } => sfx.play_hit(),
            GameEvent::PlayerDied => sfx.play_game_over(),
            GameEvent::DoorOpened => sfx.play_door(),
            GameEvent::DoorLocked => sfx.play_locked(),
            GameEvent::MenuClick => sfx.play_click(),
            GameEvent::TutorialOpened => sfx.play_tutorial(),
            GameEvent::PlayMusic(track) => sfx.play_music(track),
            GameEvent::StopMusic => sfx.stop_music(),
            GameEvent::Dropped | GameEvent::KeyRevealed => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s')];
const KEYS_INTERACT: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_MUSIC: &[KeyCode] = &[KeyCode::Char('m')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q')];

fn detect_movement(kb: &InputState, gp: &GamepadState) -> FrameInput {
    FrameInput {
        left: kb.any_held(KEYS_LEFT) || gp.held(Dir::Left),
        right: kb.any_held(KEYS_RIGHT) || gp.held(Dir::Right),
        down: kb.any_held(KEYS_DOWN) || gp.held(Dir::Down),
    }
}

fn escape_pressed(kb: &InputState, gp: &GamepadState) -> bool {
    kb.was_pressed(KeyCode::Esc) || gp.pressed(PadAction::Cancel)
}

fn handle_play_keys(world: &mut GameWorld, kb: &InputState, gp: &GamepadState, events: &mut Vec<GameEvent>) {
    let presses = [
        (escape_pressed(kb, gp), KeyPress::Escape),
        (kb.any_pressed(KEYS_MUSIC) || gp.pressed(PadAction::Music), KeyPress::ToggleMusic),
        (kb.any_pressed(KEYS_UP) || gp.pressed(PadAction::Jump) || gp.tapped(Dir::Up), KeyPress::Jump),
        (kb.any_pressed(KEYS_DOWN) || gp.pressed(PadAction::Drop) || gp.tapped(Dir::Down), KeyPress::Drop),
        (kb.any_pressed(KEYS_INTERACT) || gp.pressed(PadAction::Interact), KeyPress::Interact),
    ];
    for (pressed, key) in presses {
        // A door or escape may leave Playing mid-frame.
        if pressed && (world.state == GameState::Playing || key == KeyPress::Escape) {
            flow::handle_key(world, key, events);
        }
    }
}

fn handle_screen_keys(world: &mut GameWorld, kb: &InputState, gp: &GamepadState, events: &mut Vec<GameEvent>) {
    if escape_pressed(kb, gp) {
        if world.state == GameState::Tutorial {
            flow::close_tutorial(world, events);
        } else {
            flow::handle_key(world, KeyPress::Escape, events);
        }
        return;
    }
    if world.state == GameState::Menu && kb.any_pressed(KEYS_QUIT) {
        flow::quit(world);
        return;
    }
    if kb.any_pressed(KEYS_MUSIC) || gp.pressed(PadAction::Music) {
        flow::toggle_music(world, events);
    }
    if kb.any_pressed(KEYS_UP) || gp.tapped(Dir::Up) {
        menu::move_cursor(world, false);
    }
    if kb.any_pressed(KEYS_DOWN) || gp.tapped(Dir::Down) {
        menu::move_cursor(world, true);
    }
    if kb.any_pressed(KEYS_CONFIRM) || gp.pressed(PadAction::Confirm) {
        menu::confirm(world, events);
    }
}
