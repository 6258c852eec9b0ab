/// GameWorld: the complete state of a running game.
///
/// One aggregate owns everything the simulation mutates. `step` and the
/// `flow` actions take it by `&mut`; the renderer reads it by `&`.
///
/// ## Lifetimes
///   - `player` is created once and repositioned on every level load.
///   - `enemies`, `gems` and `platforms` are rebuilt on every load and
///     cleared when returning to the menu.
///   - `key` and `door` are singletons, re-placed on every load.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::PhysicsConfig;
use crate::domain::entity::{Door, Enemy, Gem, Key, Player};
use crate::domain::geom::{Rect, Vec2};
use crate::domain::metrics::SpriteMetrics;
use crate::domain::rules::Progress;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Menu,
    Playing,
    GameOver,
    Victory,
    Tutorial,
}

pub struct GameWorld {
    // ── Level ──
    pub platforms: Vec<Rect>,
    pub current_level: usize,

    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub gems: Vec<Gem>,
    pub key: Key,
    pub door: Door,

    // ── Tracking ──
    pub progress: Progress,
    /// Player hitbox overlaps the door zone. Recomputed every frame.
    pub near_door: bool,
    pub frame: u64,

    // ── Meta ──
    pub state: GameState,
    pub music_enabled: bool,
    pub quit_requested: bool,

    // ── Tuning ──
    pub tuning: PhysicsConfig,
    pub metrics: SpriteMetrics,

    // ── Randomness ──
    pub rng: StdRng,
    pub seed: u64,

    // ── Menu ──
    /// Keyboard cursor over the current screen's buttons.
    pub menu_cursor: usize,
    /// Button under the mouse pointer, if any.
    pub hover: Option<usize>,
}

impl GameWorld {
    pub fn new(tuning: PhysicsConfig, metrics: SpriteMetrics, seed: u64) -> Self {
        let health = tuning.max_health;
        GameWorld {
            platforms: vec![],
            current_level: 0,
            player: Player::new(Vec2::default(), health),
            enemies: vec![],
            gems: vec![],
            key: Key::new(),
            door: Door::new(),
            progress: Progress::default(),
            near_door: false,
            frame: 0,
            state: GameState::Menu,
            music_enabled: true,
            quit_requested: false,
            tuning,
            metrics,
            rng: StdRng::seed_from_u64(seed),
            seed,
            menu_cursor: 0,
            hover: None,
        }
    }

    #[cfg(test)]
    pub fn with_seed(seed: u64) -> Self {
        GameWorld::new(PhysicsConfig::default(), SpriteMetrics::default(), seed)
    }

    /// The player's collision rectangle at its current position.
    pub fn player_hitbox(&self) -> Rect {
        self.player.hitbox(self.metrics.hit_w, self.metrics.hit_h)
    }

    /// Clear every per-level entity and counter. The player object and
    /// the music flag survive.
    pub fn reset_level_context(&mut self) {
        self.platforms.clear();
        self.enemies.clear();
        self.gems.clear();
        self.key = Key::new();
        self.door = Door::new();
        self.progress = Progress::default();
        self.near_door = false;
        self.player.health = self.tuning.max_health;
        self.current_level = 0;
        self.frame = 0;
    }
}
