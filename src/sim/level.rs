/// Level catalog and loader.
///
/// ## Catalog
/// Five hand-authored levels, indexed from 0. Fixtures are static and
/// never mutated. Each level ends its platform list with a full-width
/// floor at `SCREEN_H - 20`.
///
/// Gem/key/door positions in the fixtures are hints kept for reference;
/// the live positions are generated by `placement` at load time.
///
/// ## Loading
/// `load_level` rebuilds every per-level entity, resets health and
/// counters, and emits the level's music cue.

use tracing::{debug, info};

use crate::domain::entity::{Enemy, EnemyKind, Gem, GemColor, Pose};
use crate::domain::geom::{Rect, Vec2};
use crate::domain::physics::{is_floor, SCREEN_H, SCREEN_W};
use crate::domain::rules::Progress;
use crate::sim::event::GameEvent;
use crate::sim::placement;
use crate::sim::world::GameWorld;

pub struct GemSpec {
    pub pos: Vec2,
    pub color: GemColor,
}

pub struct EnemySpec {
    pub kind: EnemyKind,
    pub patrol: [Vec2; 2],
}

pub struct Level {
    pub background: &'static str,
    pub track: &'static str,
    pub platforms: &'static [Rect],
    pub gems: &'static [GemSpec],
    pub key_pos: Vec2,
    pub key_color: GemColor,
    pub door_pos: Vec2,
    pub enemies: &'static [EnemySpec],
}

/// Used when a level has no floor platform of its own.
pub const DEFAULT_FLOOR: Rect = Rect::new(0.0, SCREEN_H - 20.0, SCREEN_W, 20.0);

impl Level {
    /// The floor platform: first platform whose top is in the floor band.
    pub fn floor(&self) -> Rect {
        self.platforms.iter().copied().find(is_floor).unwrap_or(DEFAULT_FLOOR)
    }

    pub fn floor_index(&self) -> Option<usize> {
        self.platforms.iter().position(is_floor)
    }
}

const fn gem(x: f32, y: f32, color: GemColor) -> GemSpec {
    GemSpec { pos: Vec2::new(x, y), color }
}

const fn enemy(kind: EnemyKind, a: (f32, f32), b: (f32, f32)) -> EnemySpec {
    EnemySpec { kind, patrol: [Vec2::new(a.0, a.1), Vec2::new(b.0, b.1)] }
}

use EnemyKind::{Beige, Pink, Purple};
use GemColor::{Blue, Green, Red, Yellow};

pub static LEVELS: [Level; 5] = [
    Level {
        background: "background_color_trees",
        track: "grasslands_theme",
        platforms: &[
            Rect::new(100.0, 450.0, 200.0, 20.0),
            Rect::new(400.0, 450.0, 200.0, 20.0),
            Rect::new(200.0, 350.0, 150.0, 20.0),
            Rect::new(500.0, 350.0, 150.0, 20.0),
            DEFAULT_FLOOR,
        ],
        gems: &[
            gem(150.0, 400.0, Blue),
            gem(450.0, 400.0, Red),
            gem(250.0, 300.0, Green),
        ],
        key_pos: Vec2::new(550.0, 300.0),
        key_color: Blue,
        door_pos: Vec2::new(700.0, 400.0),
        // A single enemy on the opening level.
        enemies: &[enemy(Pink, (500.0, 350.0), (650.0, 350.0))],
    },
    Level {
        background: "background_color_desert",
        track: "desert_theme",
        platforms: &[
            Rect::new(50.0, 450.0, 150.0, 20.0),
            Rect::new(300.0, 450.0, 200.0, 20.0),
            Rect::new(600.0, 450.0, 150.0, 20.0),
            Rect::new(200.0, 350.0, 100.0, 20.0),
            Rect::new(500.0, 350.0, 100.0, 20.0),
            DEFAULT_FLOOR,
        ],
        gems: &[
            gem(100.0, 400.0, Yellow),
            gem(350.0, 400.0, Green),
            gem(650.0, 400.0, Red),
            gem(250.0, 300.0, Blue),
        ],
        key_pos: Vec2::new(550.0, 300.0),
        key_color: Red,
        door_pos: Vec2::new(750.0, 400.0),
        enemies: &[
            enemy(Beige, (50.0, 450.0), (200.0, 450.0)),
            enemy(Pink, (300.0, 450.0), (500.0, 450.0)),
            enemy(Purple, (600.0, 450.0), (750.0, 450.0)),
        ],
    },
    Level {
        background: "background_color_mushrooms",
        track: "mushroom_theme",
        platforms: &[
            Rect::new(80.0, 460.0, 180.0, 18.0),
            Rect::new(320.0, 420.0, 160.0, 18.0),
            Rect::new(560.0, 380.0, 160.0, 18.0),
            Rect::new(240.0, 300.0, 120.0, 18.0),
            Rect::new(480.0, 260.0, 120.0, 18.0),
            DEFAULT_FLOOR,
        ],
        gems: &[
            gem(120.0, 420.0, Blue),
            gem(360.0, 380.0, Green),
            gem(600.0, 340.0, Yellow),
            gem(260.0, 260.0, Red),
        ],
        key_pos: Vec2::new(500.0, 220.0),
        key_color: Yellow,
        door_pos: Vec2::new(740.0, 360.0),
        enemies: &[
            enemy(Pink, (320.0, 420.0), (480.0, 420.0)),
            enemy(Purple, (560.0, 380.0), (720.0, 380.0)),
        ],
    },
    Level {
        background: "background_clouds",
        track: "jungle_theme",
        platforms: &[
            Rect::new(60.0, 460.0, 160.0, 18.0),
            Rect::new(260.0, 430.0, 180.0, 18.0),
            Rect::new(520.0, 400.0, 180.0, 18.0),
            Rect::new(180.0, 320.0, 140.0, 18.0),
            Rect::new(420.0, 280.0, 140.0, 18.0),
            DEFAULT_FLOOR,
        ],
        gems: &[
            gem(100.0, 420.0, Red),
            gem(300.0, 390.0, Blue),
            gem(560.0, 360.0, Green),
            gem(200.0, 280.0, Yellow),
        ],
        key_pos: Vec2::new(440.0, 240.0),
        key_color: Green,
        door_pos: Vec2::new(760.0, 360.0),
        enemies: &[
            enemy(Beige, (60.0, 460.0), (220.0, 460.0)),
            enemy(Pink, (260.0, 430.0), (440.0, 430.0)),
            enemy(Purple, (520.0, 400.0), (700.0, 400.0)),
        ],
    },
    Level {
        background: "background_color_trees",
        track: "dungeon_theme",
        platforms: &[
            Rect::new(100.0, 470.0, 180.0, 18.0),
            Rect::new(360.0, 430.0, 180.0, 18.0),
            Rect::new(620.0, 390.0, 150.0, 18.0),
            Rect::new(280.0, 320.0, 140.0, 18.0),
            Rect::new(520.0, 280.0, 140.0, 18.0),
            DEFAULT_FLOOR,
        ],
        gems: &[
            gem(140.0, 430.0, Blue),
            gem(400.0, 390.0, Yellow),
            gem(660.0, 350.0, Red),
            gem(300.0, 280.0, Green),
        ],
        key_pos: Vec2::new(540.0, 240.0),
        key_color: Red,
        door_pos: Vec2::new(740.0, 350.0),
        enemies: &[
            enemy(Beige, (360.0, 430.0), (540.0, 430.0)),
            enemy(Pink, (620.0, 390.0), (760.0, 390.0)),
            enemy(Purple, (100.0, 470.0), (280.0, 470.0)),
        ],
    },
];

/// Read-only lookup by index.
pub fn level(idx: usize) -> Option<&'static Level> {
    LEVELS.get(idx)
}

pub fn level_count() -> usize {
    LEVELS.len()
}

pub fn is_last_level(idx: usize) -> bool {
    idx + 1 >= LEVELS.len()
}

// ══════════════════════════════════════════════════════════════
// Loading
// ══════════════════════════════════════════════════════════════

/// Load a level into the world. Health and counters reset; the music
/// flag is kept. Out-of-range indices are clamped to the last level.
pub fn load_level(world: &mut GameWorld, level_idx: usize, events: &mut Vec<GameEvent>) {
    let level_idx = level_idx.min(LEVELS.len() - 1);
    let def = &LEVELS[level_idx];
    let m = &world.metrics;

    world.current_level = level_idx;
    world.platforms = def.platforms.to_vec();

    let layout = placement::place_entities(def, m, &mut world.rng);

    world.gems = layout.gems.iter()
        .zip(def.gems)
        .map(|(&pos, spec)| Gem { pos, color: spec.color })
        .collect();
    world.progress = Progress::new(world.gems.len());

    world.enemies = def.enemies.iter()
        .map(|e| Enemy::new(e.kind, e.patrol, m.enemy_half_h(e.kind)))
        .collect();

    world.door.pos = layout.door;
    world.door.visible = false;
    world.door.open = false;

    world.key.pos = layout.key;
    world.key.color = def.key_color;
    // With nothing to collect the key is available straight away.
    world.key.visible = world.progress.all_collected();

    let floor = def.floor();
    let spawn = Vec2::new(
        m.player_half.w.max(20.0 + m.player_half.w),
        floor.top - m.hit_h,
    );
    let player = &mut world.player;
    player.pos = spawn;
    player.vel_y = 0.0;
    player.health = world.tuning.max_health;
    player.on_ground = false;
    player.jump_count = 0;
    player.drop_frames = 0;
    player.walk_counter = 0;
    player.pose = Pose::Idle;

    world.near_door = false;
    world.frame = 0;

    debug!(
        gems = ?layout.gems,
        gem_hints = ?def.gems.iter().map(|g| g.pos).collect::<Vec<_>>(),
        door = ?layout.door,
        door_hint = ?def.door_pos,
        door_platform = ?layout.door_platform,
        key = ?layout.key,
        key_hint = ?def.key_pos,
        "placement"
    );
    info!(
        level = level_idx + 1,
        gems = world.progress.total,
        enemies = world.enemies.len(),
        "level loaded"
    );

    if world.music_enabled {
        events.push(GameEvent::PlayMusic(def.track));
    }
}
