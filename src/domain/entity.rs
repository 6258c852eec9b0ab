/// Entities: Player, Enemy, Gem, Key, Door.
/// Every field is declared up front; nothing is attached at runtime.

use super::geom::{Rect, Vec2};

/// Colour tag shared by gems and keys. Cosmetic only.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GemColor {
    Blue,
    Red,
    Green,
    Yellow,
}

impl GemColor {
    pub const ALL: [GemColor; 4] = [GemColor::Blue, GemColor::Red, GemColor::Green, GemColor::Yellow];

    pub fn name(self) -> &'static str {
        match self {
            GemColor::Blue => "blue",
            GemColor::Red => "red",
            GemColor::Green => "green",
            GemColor::Yellow => "yellow",
        }
    }

    pub fn key_sprite(self) -> String {
        format!("items/key_{}", self.name())
    }
}

/// Enemy sprite variant. Does not affect behaviour.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EnemyKind {
    Pink,
    Beige,
    Purple,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Pink, EnemyKind::Beige, EnemyKind::Purple];

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Pink => "pink",
            EnemyKind::Beige => "beige",
            EnemyKind::Purple => "purple",
        }
    }

    pub fn idle_sprite(self) -> String {
        format!("enemies/character_{}_idle", self.name())
    }
}

/// Animation frame for the player sprite.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pose {
    Idle,
    WalkA,
    WalkB,
    Jump,
}

/// Held-key state sampled once per frame.
/// Edge-triggered actions (jump, drop, door) arrive separately as key presses.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub down: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    /// Centre of the sprite; the feet sit at `y + hit_h`.
    pub pos: Vec2,
    pub vel_y: f32,
    /// Half-heart units, 0..=max.
    pub health: u32,
    pub on_ground: bool,
    /// Jumps used since last landing (double-jump budget is 2).
    pub jump_count: u8,
    /// Frames left during which non-floor platforms are ignored.
    pub drop_frames: u32,
    pub walk_counter: u32,
    pub pose: Pose,
}

impl Player {
    pub fn new(pos: Vec2, health: u32) -> Self {
        Player {
            pos,
            vel_y: 0.0,
            health,
            on_ground: false,
            jump_count: 0,
            drop_frames: 0,
            walk_counter: 0,
            pose: Pose::Idle,
        }
    }

    /// Collision rectangle for the given hitbox half-extents.
    pub fn hitbox(&self, hit_w: f32, hit_h: f32) -> Rect {
        Rect::centered(self.pos, hit_w, hit_h)
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub pos: Vec2,
    pub kind: EnemyKind,
    pub patrol: [Vec2; 2],
    /// Index into `patrol` the enemy is walking toward.
    pub target: usize,
    /// Y is pinned here every frame (platform top minus half sprite height).
    pub base_y: f32,
    pub walk_counter: u32,
}

impl Enemy {
    /// Spawn at the first waypoint, heading for the second.
    pub fn new(kind: EnemyKind, patrol: [Vec2; 2], half_h: f32) -> Self {
        let base_y = patrol[0].y - half_h;
        Enemy {
            pos: Vec2::new(patrol[0].x, base_y),
            kind,
            patrol,
            target: 1,
            base_y,
            walk_counter: 0,
        }
    }

    /// Second walk frame is shown during the back half of the cycle.
    pub fn walk_frame_b(&self) -> bool {
        self.walk_counter >= 10
    }
}

#[derive(Clone, Debug)]
pub struct Gem {
    pub pos: Vec2,
    pub color: GemColor,
}

#[derive(Clone, Debug)]
pub struct Key {
    pub pos: Vec2,
    pub color: GemColor,
    pub visible: bool,
}

impl Key {
    pub fn new() -> Self {
        Key { pos: Vec2::default(), color: GemColor::Blue, visible: false }
    }
}

#[derive(Clone, Debug)]
pub struct Door {
    pub pos: Vec2,
    pub visible: bool,
    pub open: bool,
}

impl Door {
    pub fn new() -> Self {
        Door { pos: Vec2::default(), visible: false, open: false }
    }
}
