/// Player physics: gravity, platform landing, horizontal movement.
///
/// ## Frame order (see `step_player`)
///   1. Gravity → integrate Y (the contact hitbox is taken here)
///   2. Drop-through countdown
///   3. Platform landing scan (first match wins)
///   4. Horizontal movement + walk animation + screen clamp
///   5. Bottom-of-world safety clamp
///
/// ## Landing rules
///
/// A platform is ignored for landing when the player is dropping through
/// (down held, or countdown running) unless it is the floor.
///
/// Rule A (swept): falling, feet were at/above the top last frame, and the
/// hitbox now overlaps the platform.
///
/// Rule B (tolerance): falling, centre X within the platform and feet at
/// most `LAND_TOLERANCE` px below its top. Catches grazing contacts that
/// rule A misses at the platform ends.
///
/// Either rule snaps the feet onto the top and resets the jump budget.

use super::entity::{FrameInput, Player, Pose};
use super::geom::Rect;
use super::metrics::SpriteMetrics;
use crate::config::PhysicsConfig;

pub const SCREEN_W: f32 = 800.0;
pub const SCREEN_H: f32 = 600.0;

/// Feet may sink this far below a platform top and still land on it.
pub const LAND_TOLERANCE: f32 = 6.0;
/// Platforms whose top is at or below `SCREEN_H - FLOOR_MARGIN` are floors.
pub const FLOOR_MARGIN: f32 = 25.0;
/// Frames of a walk cycle; first half shows frame A.
const WALK_CYCLE: u32 = 20;
/// Jumps available between landings.
pub const MAX_JUMPS: u8 = 2;
/// Downward nudge applied when starting a drop-through.
const DROP_NUDGE: f32 = 2.0;

/// Floor platforms are never passed through.
#[inline]
pub fn is_floor(platform: &Rect) -> bool {
    platform.top >= SCREEN_H - FLOOR_MARGIN
}

/// Outcome of one physics frame.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PlayerStep {
    /// Index of the platform landed on, if any.
    pub landed: Option<usize>,
    /// Hitbox right after gravity, before the landing snap and the
    /// horizontal move. Contact with enemies, gems, key and door is
    /// tested against this rectangle.
    pub contact: Rect,
}

/// Advance the player one frame against `platforms` (level order).
pub fn step_player(
    player: &mut Player,
    platforms: &[Rect],
    input: FrameInput,
    tuning: &PhysicsConfig,
    metrics: &SpriteMetrics,
) -> PlayerStep {
    let prev_bottom = player.pos.y + metrics.hit_h;
    player.on_ground = false;

    apply_gravity(player, tuning);
    let contact = player.hitbox(metrics.hit_w, metrics.hit_h);

    if player.drop_frames > 0 {
        player.drop_frames -= 1;
    }

    let landed = resolve_landing(player, platforms, input.down, prev_bottom, metrics);
    move_horizontal(player, input, tuning, metrics.player_half.w);
    clamp_to_world(player, metrics.hit_h);

    PlayerStep { landed, contact }
}

pub fn apply_gravity(player: &mut Player, tuning: &PhysicsConfig) {
    player.vel_y = (player.vel_y + tuning.gravity).min(tuning.max_fall_speed);
    player.pos.y += player.vel_y;
}

/// Scan platforms in order; the first one that catches the player wins.
pub fn resolve_landing(
    player: &mut Player,
    platforms: &[Rect],
    down_held: bool,
    prev_bottom: f32,
    metrics: &SpriteMetrics,
) -> Option<usize> {
    let dropping = down_held || player.drop_frames > 0;
    let hitbox = player.hitbox(metrics.hit_w, metrics.hit_h);

    for (i, platform) in platforms.iter().enumerate() {
        if dropping && !is_floor(platform) {
            continue;
        }
        if player.vel_y <= 0.0 {
            continue;
        }

        let swept = prev_bottom <= platform.top
            && hitbox.intersects(platform)
            && hitbox.overlaps_x(platform);

        let bottom = player.pos.y + metrics.hit_h;
        let grazing = platform.spans_x(player.pos.x)
            && platform.top <= bottom
            && bottom <= platform.top + LAND_TOLERANCE;

        if swept || grazing {
            land(player, platform.top, metrics.hit_h);
            return Some(i);
        }
    }
    None
}

fn land(player: &mut Player, top: f32, hit_h: f32) {
    player.pos.y = top - hit_h;
    player.vel_y = 0.0;
    player.pose = Pose::Idle;
    player.jump_count = 0;
    player.on_ground = true;
}

/// Left wins over right when both are held.
pub fn move_horizontal(player: &mut Player, input: FrameInput, tuning: &PhysicsConfig, half_w: f32) {
    let dx = if input.left {
        -tuning.player_speed
    } else if input.right {
        tuning.player_speed
    } else {
        0.0
    };

    if dx != 0.0 {
        player.pos.x += dx;
        player.walk_counter = (player.walk_counter + 1) % WALK_CYCLE;
        player.pose = if player.walk_counter < WALK_CYCLE / 2 { Pose::WalkA } else { Pose::WalkB };
    } else {
        player.pose = Pose::Idle;
    }

    player.pos.x = player.pos.x.clamp(half_w, SCREEN_W - half_w);
}

/// Safety net independent of the level's floor platform.
pub fn clamp_to_world(player: &mut Player, hit_h: f32) {
    let limit = SCREEN_H - hit_h;
    if player.pos.y > limit && player.vel_y > 0.0 {
        player.pos.y = limit;
        player.vel_y = 0.0;
        player.jump_count = 0;
        player.on_ground = true;
    }
}

/// Jump (or double jump). Returns false when the budget is spent.
pub fn jump(player: &mut Player, tuning: &PhysicsConfig) -> bool {
    if player.jump_count >= MAX_JUMPS {
        return false;
    }
    player.vel_y = -tuning.jump_speed;
    player.pose = Pose::Jump;
    player.jump_count += 1;
    player.on_ground = false;
    true
}

/// Start falling through the platform underfoot. Only works when grounded.
pub fn drop_through(player: &mut Player, tuning: &PhysicsConfig) -> bool {
    if !player.on_ground {
        return false;
    }
    player.drop_frames = tuning.drop_frames;
    player.vel_y = player.vel_y.max(DROP_NUDGE);
    player.pos.y += DROP_NUDGE;
    true
}
