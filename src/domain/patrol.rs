/// Enemy patrol: deterministic back-and-forth between two waypoints.
///
/// Enemies move along X only. Y is pinned to the spawn baseline every
/// frame; enemies are not physically simulated.

use super::entity::Enemy;

const WALK_CYCLE: u32 = 20;

/// Advance every enemy one frame.
pub fn update_enemies(enemies: &mut [Enemy], speed: f32) {
    for enemy in enemies {
        step_enemy(enemy, speed);
    }
}

pub fn step_enemy(enemy: &mut Enemy, speed: f32) {
    let target_x = enemy.patrol[enemy.target].x;
    if enemy.pos.x < target_x {
        enemy.pos.x += speed;
    } else if enemy.pos.x > target_x {
        enemy.pos.x -= speed;
    }

    enemy.walk_counter = (enemy.walk_counter + 1) % WALK_CYCLE;
    enemy.pos.y = enemy.base_y;

    // Within one step of the waypoint: turn around.
    if (enemy.pos.x - target_x).abs() <= speed {
        enemy.target = 1 - enemy.target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EnemyKind;
    use crate::domain::geom::Vec2;

    fn patroller() -> Enemy {
        Enemy::new(
            EnemyKind::Pink,
            [Vec2::new(500.0, 350.0), Vec2::new(650.0, 350.0)],
            20.0,
        )
    }

    #[test]
    fn walks_toward_second_waypoint_then_turns() {
        let mut e = patroller();
        let mut frames = 0;
        while e.target == 1 {
            step_enemy(&mut e, 2.0);
            frames += 1;
            assert!(frames < 200);
        }
        assert!((e.pos.x - 650.0).abs() <= 2.0, "turned at x={}", e.pos.x);
        assert_eq!(e.target, 0);

        let x = e.pos.x;
        step_enemy(&mut e, 2.0);
        assert!(e.pos.x < x, "reverses direction after turning");
    }

    #[test]
    fn full_lap_returns_to_start() {
        let mut e = patroller();
        let mut turns = 0;
        let mut last = e.target;
        for _ in 0..400 {
            step_enemy(&mut e, 2.0);
            if e.target != last {
                turns += 1;
                last = e.target;
            }
            assert!(e.pos.x >= 498.0 && e.pos.x <= 652.0);
        }
        assert!(turns >= 4);
    }

    #[test]
    fn y_stays_pinned_to_baseline() {
        let mut e = patroller();
        e.pos.y = 0.0;
        step_enemy(&mut e, 2.0);
        assert_eq!(e.pos.y, 330.0);
    }

    #[test]
    fn walk_frames_alternate_every_ten() {
        let mut e = patroller();
        let mut frames = vec![];
        for _ in 0..20 {
            step_enemy(&mut e, 2.0);
            frames.push(e.walk_frame_b());
        }
        assert!(frames[..9].iter().all(|b| !b));
        assert!(frames[9..19].iter().all(|&b| b));
        assert!(!frames[19]);
    }

    #[test]
    fn update_moves_every_enemy() {
        let mut v = vec![patroller(), patroller()];
        update_enemies(&mut v, 2.0);
        assert!(v.iter().all(|e| e.pos.x == 502.0));
    }
}
