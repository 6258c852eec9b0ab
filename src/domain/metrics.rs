/// Sprite dimensions used for centring and hitbox math.
///
/// Dimensions come from an `AssetDimensions` provider (the front end),
/// queried once at start-up. Unknown ids fall back to fixed defaults, so
/// nothing in the per-frame path ever asks for an image.

use super::entity::{EnemyKind, GemColor};

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

impl Size {
    pub const fn new(w: f32, h: f32) -> Self {
        Size { w, h }
    }

    /// Integer half-extents, as sprite centring uses whole pixels.
    pub fn half(self) -> Size {
        Size::new((self.w / 2.0).floor(), (self.h / 2.0).floor())
    }
}

/// Image metadata lookup. Returns `None` when the id cannot be resolved.
pub trait AssetDimensions {
    fn try_load_dimensions(&self, id: &str) -> Option<Size>;
}

/// Provider that knows no images: every lookup uses the defaults.
pub struct NoAssets;

impl AssetDimensions for NoAssets {
    fn try_load_dimensions(&self, _id: &str) -> Option<Size> {
        None
    }
}

pub const PLAYER_SPRITE: &str = "player/idle";
pub const DOOR_SPRITE: &str = "items/door_closed";

const DEFAULT_PLAYER_HALF: Size = Size::new(20.0, 20.0);
const DEFAULT_DOOR_HALF: Size = Size::new(24.0, 40.0);
const DEFAULT_KEY_HALF: Size = Size::new(12.0, 12.0);
const DEFAULT_ENEMY_HALF_H: f32 = 20.0;

const MIN_HIT_W: f32 = 12.0;
const MIN_HIT_H: f32 = 18.0;

#[derive(Clone, Debug)]
pub struct SpriteMetrics {
    pub player_half: Size,
    /// Player hitbox half-width.
    pub hit_w: f32,
    /// Player hitbox half-height; also the feet offset from the centre.
    pub hit_h: f32,
    pub door_half: Size,
    key_half: [Size; 4],
    enemy_half_h: [f32; 3],
}

impl SpriteMetrics {
    pub fn resolve(assets: &dyn AssetDimensions) -> Self {
        let half_of = |id: &str, default: Size| {
            assets.try_load_dimensions(id).map(Size::half).unwrap_or(default)
        };

        let player_half = half_of(PLAYER_SPRITE, DEFAULT_PLAYER_HALF);
        let door_half = half_of(DOOR_SPRITE, DEFAULT_DOOR_HALF);
        let key_half = GemColor::ALL.map(|c| half_of(&c.key_sprite(), DEFAULT_KEY_HALF));
        let enemy_half_h = EnemyKind::ALL.map(|k| {
            assets
                .try_load_dimensions(&k.idle_sprite())
                .map(|s| s.half().h)
                .unwrap_or(DEFAULT_ENEMY_HALF_H)
        });

        // Hitbox is a bit smaller than the sprite for a fairer feel.
        let hit_w = (player_half.w * 0.6).floor().max(MIN_HIT_W);
        let hit_h = (player_half.h * 0.85).floor().max(MIN_HIT_H);

        SpriteMetrics { player_half, hit_w, hit_h, door_half, key_half, enemy_half_h }
    }

    pub fn key_half(&self, color: GemColor) -> Size {
        self.key_half[color as usize]
    }

    pub fn enemy_half_h(&self, kind: EnemyKind) -> f32 {
        self.enemy_half_h[kind as usize]
    }
}

impl Default for SpriteMetrics {
    fn default() -> Self {
        SpriteMetrics::resolve(&NoAssets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Table(HashMap<&'static str, Size>);

    impl AssetDimensions for Table {
        fn try_load_dimensions(&self, id: &str) -> Option<Size> {
            self.0.get(id).copied()
        }
    }

    #[test]
    fn defaults_when_nothing_resolves() {
        let m = SpriteMetrics::resolve(&NoAssets);
        assert_eq!(m.player_half, Size::new(20.0, 20.0));
        assert_eq!(m.hit_w, 12.0);
        assert_eq!(m.hit_h, 18.0);
        assert_eq!(m.door_half, Size::new(24.0, 40.0));
        assert_eq!(m.key_half(GemColor::Red), Size::new(12.0, 12.0));
        assert_eq!(m.enemy_half_h(EnemyKind::Purple), 20.0);
    }

    #[test]
    fn resolved_sizes_drive_hitbox() {
        let mut t = HashMap::new();
        t.insert(PLAYER_SPRITE, Size::new(80.0, 100.0));
        t.insert("items/key_green", Size::new(30.0, 20.0));
        t.insert("enemies/character_beige_idle", Size::new(40.0, 50.0));
        let m = SpriteMetrics::resolve(&Table(t));

        assert_eq!(m.player_half, Size::new(40.0, 50.0));
        assert_eq!(m.hit_w, 24.0);
        assert_eq!(m.hit_h, 42.0);
        assert_eq!(m.key_half(GemColor::Green), Size::new(15.0, 10.0));
        assert_eq!(m.key_half(GemColor::Blue), Size::new(12.0, 12.0));
        assert_eq!(m.enemy_half_h(EnemyKind::Beige), 25.0);
        assert_eq!(m.enemy_half_h(EnemyKind::Pink), 20.0);
    }
}
