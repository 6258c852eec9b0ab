/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Structs ──

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gamepad: GamepadConfig,
    /// Where the config was read from, if anywhere.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Gameplay tuning. All values are per frame, in pixels.
#[derive(Clone, Debug, Deserialize)]
pub struct PhysicsConfig {
    #[serde(default = "default_player_speed")]
    pub player_speed: f32,
    #[serde(default = "default_jump_speed")]
    pub jump_speed: f32,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_max_fall")]
    pub max_fall_speed: f32,
    #[serde(default = "default_max_health")]
    pub max_health: u32,        // half-heart units
    #[serde(default = "default_enemy_speed")]
    pub enemy_speed: f32,
    #[serde(default = "default_enemy_damage")]
    pub enemy_damage: u32,
    #[serde(default = "default_knockback")]
    pub knockback: f32,
    #[serde(default = "default_drop_frames")]
    pub drop_frames: u32,       // frames of pass-through after pressing down
}

#[derive(Clone, Debug, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GeneralConfig {
    /// Fixed seed for entity placement; random per run when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_true")]
    pub music: bool,
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GamepadConfig {
    #[serde(default = "default_jump")]
    pub jump: Vec<String>,
    #[serde(default = "default_drop")]
    pub drop: Vec<String>,
    #[serde(default = "default_interact")]
    pub interact: Vec<String>,
    #[serde(default = "default_music")]
    pub music: Vec<String>,
    #[serde(default = "default_confirm")]
    pub confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    pub cancel: Vec<String>,
}

// ── Defaults ──

fn default_player_speed() -> f32 { 5.0 }
fn default_jump_speed() -> f32 { 15.0 }
fn default_gravity() -> f32 { 0.8 }
fn default_max_fall() -> f32 { 20.0 }
fn default_max_health() -> u32 { 6 }     // three hearts
fn default_enemy_speed() -> f32 { 2.0 }
fn default_enemy_damage() -> u32 { 2 }   // one full heart
fn default_knockback() -> f32 { 30.0 }
fn default_drop_frames() -> u32 { 10 }
fn default_tick_rate() -> u64 { 16 }     // ~60 fps, physics is tuned per frame
fn default_true() -> bool { true }

fn default_jump() -> Vec<String> { vec!["A".into()] }
fn default_drop() -> Vec<String> { vec!["B".into()] }
fn default_interact() -> Vec<String> { vec!["X".into(), "R1".into()] }
fn default_music() -> Vec<String> { vec!["Y".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            player_speed: default_player_speed(),
            jump_speed: default_jump_speed(),
            gravity: default_gravity(),
            max_fall_speed: default_max_fall(),
            max_health: default_max_health(),
            enemy_speed: default_enemy_speed(),
            enemy_damage: default_enemy_damage(),
            knockback: default_knockback(),
            drop_frames: default_drop_frames(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            seed: None,
            music: true,
            sound: true,
            log_file: None,
        }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            jump: default_jump(),
            drop: default_drop(),
            interact: default_interact(),
            music: default_music(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/energyquest`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if path.exists() {
                return load_file(&path);
            }
        }
        GameConfig::default()
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

fn load_file(path: &Path) -> GameConfig {
    // The terminal is not in raw mode yet, so plain stderr is readable here.
    match std::fs::read_to_string(path) {
        Ok(text) => match GameConfig::parse(&text) {
            Ok(mut cfg) => {
                cfg.source = Some(path.to_path_buf());
                cfg
            }
            Err(e) => {
                eprintln!("Warning: {} parse error: {e}", path.display());
                eprintln!("Using default settings.");
                GameConfig::default()
            }
        },
        Err(e) => {
            eprintln!("Warning: could not read {}: {e}", path.display());
            GameConfig::default()
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(home).join(".local/share/energyquest");
        if xdg.is_dir() && !dirs.contains(&xdg) {
            dirs.push(xdg);
        }
    }

    dirs
}
