/// Interaction rules: enemy contact, pickups, door proximity, door gate.
///
/// ## Pickup chain
///
///   gems ──(all collected)──▶ key visible ──(touched)──▶ has_key, door visible
///
/// ## Door gate
/// ┌──────────────────────────────┬─────────┐
/// │ Condition                     │ Opens?  │
/// ├──────────────────────────────┼─────────┤
/// │ !has_key                      │ NO      │
/// │ collected < total             │ NO      │
/// │ hitbox ∩ door zone = ∅        │ NO      │
/// │ otherwise                     │ YES     │
/// └──────────────────────────────┴─────────┘
///
/// The door zone is a fixed 50×80 box around the door centre. It is
/// checked whether or not the door is visible.

use super::entity::{Door, Enemy, Gem, Key, Player};
use super::geom::Rect;
use crate::config::PhysicsConfig;

pub const GEM_HITBOX_HALF: f32 = 15.0;
pub const KEY_HITBOX_HALF: f32 = 15.0;
pub const ENEMY_HITBOX_HALF: f32 = 20.0;
pub const DOOR_ZONE_W: f32 = 50.0;
pub const DOOR_ZONE_H: f32 = 80.0;

/// Per-level completion counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub collected: usize,
    pub total: usize,
    pub has_key: bool,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Progress { collected: 0, total, has_key: false }
    }

    pub fn all_collected(&self) -> bool {
        self.collected >= self.total
    }
}

/// What the pickup pass changed this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pickups {
    pub gems: usize,
    pub key_revealed: bool,
    pub key_taken: bool,
}

pub fn door_zone(door: &Door) -> Rect {
    Rect::centered(door.pos, DOOR_ZONE_W / 2.0, DOOR_ZONE_H / 2.0)
}

/// First enemy touching the player deals damage and knocks the player
/// away from it. At most one hit per frame. Returns the enemy index.
pub fn resolve_enemy_contact(
    player: &mut Player,
    hitbox: &Rect,
    enemies: &[Enemy],
    tuning: &PhysicsConfig,
) -> Option<usize> {
    let idx = enemies.iter().position(|e| {
        hitbox.intersects(&Rect::centered(e.pos, ENEMY_HITBOX_HALF, ENEMY_HITBOX_HALF))
    })?;

    player.health = player.health.saturating_sub(tuning.enemy_damage);
    if player.pos.x < enemies[idx].pos.x {
        player.pos.x -= tuning.knockback;
    } else {
        player.pos.x += tuning.knockback;
    }
    Some(idx)
}

/// Remove touched gems, then reveal or hand over the key.
pub fn resolve_pickups(
    hitbox: &Rect,
    gems: &mut Vec<Gem>,
    key: &mut Key,
    door: &mut Door,
    progress: &mut Progress,
) -> Pickups {
    let mut out = Pickups::default();

    let before = gems.len();
    gems.retain(|g| !hitbox.intersects(&Rect::centered(g.pos, GEM_HITBOX_HALF, GEM_HITBOX_HALF)));
    out.gems = before - gems.len();

    if out.gems > 0 {
        progress.collected = (progress.collected + out.gems).min(progress.total);
        if progress.all_collected() && !progress.has_key && !key.visible {
            key.visible = true;
            out.key_revealed = true;
        }
    }

    if key.visible && hitbox.intersects(&Rect::centered(key.pos, KEY_HITBOX_HALF, KEY_HITBOX_HALF)) {
        progress.has_key = true;
        key.visible = false;
        door.visible = true;
        out.key_taken = true;
    }

    out
}

pub fn near_door(hitbox: &Rect, door: &Door) -> bool {
    hitbox.intersects(&door_zone(door))
}

pub fn can_open_door(hitbox: &Rect, door: &Door, progress: &Progress) -> bool {
    progress.has_key && progress.all_collected() && near_door(hitbox, door)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{EnemyKind, GemColor};
    use crate::domain::geom::Vec2;

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(Vec2::new(x, y), 6)
    }

    fn hitbox(p: &Player) -> Rect {
        p.hitbox(12.0, 18.0)
    }

    fn gem(x: f32, y: f32) -> Gem {
        Gem { pos: Vec2::new(x, y), color: GemColor::Blue }
    }

    fn enemy_at(x: f32, y: f32) -> Enemy {
        let mut e = Enemy::new(EnemyKind::Pink, [Vec2::new(x, y + 20.0), Vec2::new(x + 100.0, y + 20.0)], 20.0);
        e.pos = Vec2::new(x, y);
        e
    }

    fn door_at(x: f32, y: f32) -> Door {
        Door { pos: Vec2::new(x, y), visible: false, open: false }
    }

    // ── Enemy contact ──

    #[test]
    fn enemy_hit_damages_and_knocks_back() {
        let t = PhysicsConfig::default();
        let mut p = player_at(100.0, 300.0);
        let hb = hitbox(&p);
        let enemies = [enemy_at(110.0, 300.0)];
        assert_eq!(resolve_enemy_contact(&mut p, &hb, &enemies, &t), Some(0));
        assert_eq!(p.health, 4);
        assert_eq!(p.pos.x, 70.0, "pushed left, away from the enemy");

        let mut p = player_at(120.0, 300.0);
        let hb = hitbox(&p);
        resolve_enemy_contact(&mut p, &hb, &enemies, &t);
        assert_eq!(p.pos.x, 150.0, "pushed right");
    }

    #[test]
    fn only_one_enemy_hits_per_frame() {
        let t = PhysicsConfig::default();
        let mut p = player_at(100.0, 300.0);
        let hb = hitbox(&p);
        let enemies = [enemy_at(105.0, 300.0), enemy_at(95.0, 300.0)];
        assert_eq!(resolve_enemy_contact(&mut p, &hb, &enemies, &t), Some(0));
        assert_eq!(p.health, 4);
    }

    #[test]
    fn health_saturates_at_zero() {
        let t = PhysicsConfig::default();
        let mut p = player_at(100.0, 300.0);
        p.health = 1;
        let hb = hitbox(&p);
        resolve_enemy_contact(&mut p, &hb, &[enemy_at(100.0, 300.0)], &t);
        assert_eq!(p.health, 0);
    }

    #[test]
    fn distant_enemy_is_harmless() {
        let t = PhysicsConfig::default();
        let mut p = player_at(100.0, 300.0);
        let hb = hitbox(&p);
        assert_eq!(resolve_enemy_contact(&mut p, &hb, &[enemy_at(300.0, 300.0)], &t), None);
        assert_eq!(p.health, 6);
    }

    // ── Pickups ──

    #[test]
    fn key_revealed_exactly_when_last_gem_collected() {
        let mut gems = vec![gem(100.0, 300.0), gem(200.0, 300.0), gem(300.0, 300.0)];
        let mut key = Key::new();
        let mut door = door_at(700.0, 540.0);
        let mut progress = Progress::new(3);

        for (i, x) in [100.0, 200.0].iter().enumerate() {
            let hb = hitbox(&player_at(*x, 300.0));
            let got = resolve_pickups(&hb, &mut gems, &mut key, &mut door, &mut progress);
            assert_eq!(got.gems, 1);
            assert_eq!(progress.collected, i + 1);
            assert!(!key.visible);
        }

        let hb = hitbox(&player_at(300.0, 300.0));
        let got = resolve_pickups(&hb, &mut gems, &mut key, &mut door, &mut progress);
        assert!(got.key_revealed);
        assert!(key.visible);
        assert_eq!(progress.collected, progress.total);
        assert!(gems.is_empty());
    }

    #[test]
    fn touching_visible_key_reveals_door() {
        let mut gems = vec![];
        let mut key = Key { pos: Vec2::new(400.0, 300.0), color: GemColor::Red, visible: true };
        let mut door = door_at(700.0, 540.0);
        let mut progress = Progress { collected: 2, total: 2, has_key: false };

        let hb = hitbox(&player_at(405.0, 300.0));
        let got = resolve_pickups(&hb, &mut gems, &mut key, &mut door, &mut progress);
        assert!(got.key_taken);
        assert!(progress.has_key);
        assert!(!key.visible);
        assert!(door.visible);
    }

    #[test]
    fn hidden_key_cannot_be_taken() {
        let mut gems = vec![gem(50.0, 50.0)];
        let mut key = Key { pos: Vec2::new(400.0, 300.0), color: GemColor::Red, visible: false };
        let mut door = door_at(700.0, 540.0);
        let mut progress = Progress::new(1);

        let hb = hitbox(&player_at(400.0, 300.0));
        let got = resolve_pickups(&hb, &mut gems, &mut key, &mut door, &mut progress);
        assert!(!got.key_taken);
        assert!(!progress.has_key);
        assert!(!door.visible);
    }

    #[test]
    fn overlapping_gems_collected_together_never_exceed_total() {
        let mut gems = vec![gem(100.0, 300.0), gem(105.0, 300.0)];
        let mut key = Key::new();
        let mut door = door_at(700.0, 540.0);
        let mut progress = Progress::new(2);
        let hb = hitbox(&player_at(102.0, 300.0));
        let got = resolve_pickups(&hb, &mut gems, &mut key, &mut door, &mut progress);
        assert_eq!(got.gems, 2);
        assert_eq!(progress.collected, 2);
        assert!(key.visible);
    }

    // ── Door ──

    #[test]
    fn door_gate_requires_key_gems_and_proximity() {
        let door = door_at(700.0, 540.0);
        let near = hitbox(&player_at(700.0, 560.0));
        let far = hitbox(&player_at(300.0, 560.0));

        let done = Progress { collected: 3, total: 3, has_key: true };
        assert!(can_open_door(&near, &door, &done));
        assert!(!can_open_door(&far, &door, &done));

        let no_key = Progress { has_key: false, ..done };
        assert!(!can_open_door(&near, &door, &no_key));

        let missing_gem = Progress { collected: 2, ..done };
        assert!(!can_open_door(&near, &door, &missing_gem));
    }

    #[test]
    fn proximity_ignores_door_visibility() {
        let mut door = door_at(700.0, 540.0);
        let hb = hitbox(&player_at(700.0, 560.0));
        assert!(near_door(&hb, &door));
        door.visible = true;
        assert!(near_door(&hb, &door));
    }

    #[test]
    fn door_zone_is_50_by_80() {
        let z = door_zone(&door_at(100.0, 100.0));
        assert_eq!((z.left, z.top, z.width, z.height), (75.0, 60.0, 50.0, 80.0));
    }
}
