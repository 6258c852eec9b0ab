/// Randomised entity placement, run once per level load.
///
/// Gems, key and door are scattered over the level's platforms instead of
/// using the fixture hints. All distance constraints are best-effort:
/// each placement gets `RETRY_BUDGET` samples and keeps the last one if
/// none satisfied the constraint.
///
/// The generator is generic over `rand::Rng` so tests can drive it with a
/// seeded `StdRng`.

use rand::Rng;
use tracing::debug;

use crate::domain::geom::{Rect, Vec2};
use crate::domain::metrics::{Size, SpriteMetrics};
use crate::domain::physics::{is_floor, SCREEN_H, SCREEN_W};
use crate::sim::level::Level;

pub const RETRY_BUDGET: usize = 40;
pub const GEM_MIN_DIST: f32 = 90.0;
pub const KEY_MIN_DIST_FROM_DOOR: f32 = 100.0;
pub const MIN_PLATFORM_WIDTH: f32 = 40.0;
pub const GEM_LIFT: f32 = 30.0;
pub const GEM_MARGIN: f32 = 15.0;
pub const DOOR_ON_FLOOR_CHANCE: f64 = 0.5;

const GEM_FALLBACK: Rect = Rect::new(100.0, 450.0, 150.0, 20.0);
const KEY_FALLBACK: Rect = Rect::new(500.0, 350.0, 120.0, 20.0);

#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    /// One position per gem fixture, in order.
    pub gems: Vec<Vec2>,
    pub door: Vec2,
    pub key: Vec2,
    /// Index into the level's platform list, if the door stands on one.
    pub door_platform: Option<usize>,
}

/// Non-floor platforms wide enough to hold an item.
pub fn eligible_platforms(level: &Level) -> Vec<usize> {
    level.platforms.iter()
        .enumerate()
        .filter(|(_, p)| !is_floor(p) && p.width >= MIN_PLATFORM_WIDTH)
        .map(|(i, _)| i)
        .collect()
}

pub fn place_entities<R: Rng>(level: &Level, metrics: &SpriteMetrics, rng: &mut R) -> Placement {
    let eligible = eligible_platforms(level);

    let gems = place_gems(level, &eligible, level.gems.len(), rng);
    let (door, door_platform) = place_door(level, &eligible, metrics.door_half, rng);
    let key = place_key(level, &eligible, door, door_platform, metrics.key_half(level.key_color), rng);

    Placement { gems, door, key, door_platform }
}

fn place_gems<R: Rng>(level: &Level, eligible: &[usize], count: usize, rng: &mut R) -> Vec<Vec2> {
    let mut placed: Vec<Vec2> = Vec::with_capacity(count);
    let min_sq = GEM_MIN_DIST * GEM_MIN_DIST;

    for i in 0..count {
        let mut candidate = Vec2::new(0.0, 0.0);
        let mut ok = false;
        for _ in 0..RETRY_BUDGET {
            let plat = pick(level, eligible, rng).unwrap_or(GEM_FALLBACK);
            candidate = Vec2::new(
                sample_between(rng, plat.left + GEM_MARGIN, plat.right() - GEM_MARGIN),
                plat.top - GEM_LIFT,
            );
            if placed.iter().all(|p| p.dist_sq(candidate) >= min_sq) {
                ok = true;
                break;
            }
        }
        if !ok {
            debug!(gem = i, x = candidate.x, y = candidate.y, "gem spacing retries exhausted, keeping last sample");
        }
        placed.push(candidate);
    }
    placed
}

fn place_door<R: Rng>(
    level: &Level,
    eligible: &[usize],
    half: Size,
    rng: &mut R,
) -> (Vec2, Option<usize>) {
    let on_floor = rng.random_bool(DOOR_ON_FLOOR_CHANCE) || eligible.is_empty();
    let (idx, plat) = if on_floor {
        (level.floor_index(), level.floor())
    } else {
        let i = eligible[rng.random_range(0..eligible.len())];
        (Some(i), level.platforms[i])
    };

    let pos = Vec2::new(
        sample_between(rng, plat.left + half.w, plat.right() - half.w),
        plat.top - half.h,
    );
    (clamp_to_screen(pos, half), idx)
}

fn place_key<R: Rng>(
    level: &Level,
    eligible: &[usize],
    door: Vec2,
    door_platform: Option<usize>,
    half: Size,
    rng: &mut R,
) -> Vec2 {
    let apart: Vec<usize> = eligible.iter().copied().filter(|&i| Some(i) != door_platform).collect();
    let candidates: &[usize] = if apart.is_empty() { eligible } else { &apart };
    let min_sq = KEY_MIN_DIST_FROM_DOOR * KEY_MIN_DIST_FROM_DOOR;

    // One platform per level load; retries only move the key along it.
    let plat = pick(level, candidates, rng).unwrap_or(KEY_FALLBACK);
    let mut pos = Vec2::new(0.0, plat.top - half.h);
    let mut ok = false;
    for _ in 0..RETRY_BUDGET {
        pos.x = sample_between(rng, plat.left + half.w, plat.right() - half.w);
        if pos.dist_sq(door) >= min_sq {
            ok = true;
            break;
        }
    }
    if !ok {
        debug!(x = pos.x, y = pos.y, "key distance retries exhausted, keeping last sample");
    }
    clamp_to_screen(pos, half)
}

fn pick<R: Rng>(level: &Level, indices: &[usize], rng: &mut R) -> Option<Rect> {
    if indices.is_empty() {
        return None;
    }
    Some(level.platforms[indices[rng.random_range(0..indices.len())]])
}

/// Uniform integer in `[lo, hi]`; the midpoint if the range is empty.
fn sample_between<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    let (a, b) = (lo.ceil() as i32, hi.floor() as i32);
    if a > b {
        return ((lo + hi) / 2.0).floor();
    }
    rng.random_range(a..=b) as f32
}

fn clamp_to_screen(pos: Vec2, half: Size) -> Vec2 {
    Vec2::new(
        pos.x.clamp(half.w, SCREEN_W - half.w),
        pos.y.clamp(half.h, SCREEN_H - half.h),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::GemColor;
    use crate::sim::level::{GemSpec, DEFAULT_FLOOR, LEVELS};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    static ONLY_FLOOR: Level = Level {
        background: "background_clouds",
        track: "jungle_theme",
        platforms: &[Rect::new(300.0, 500.0, 30.0, 18.0), DEFAULT_FLOOR],
        gems: &[
            GemSpec { pos: Vec2::new(0.0, 0.0), color: GemColor::Blue },
            GemSpec { pos: Vec2::new(0.0, 0.0), color: GemColor::Red },
        ],
        key_pos: Vec2::new(0.0, 0.0),
        key_color: GemColor::Green,
        door_pos: Vec2::new(0.0, 0.0),
        enemies: &[],
    };

    /// Narrow floor with a ledge right beside it and one far platform.
    static CRAMPED: Level = Level {
        background: "background_color_trees",
        track: "grasslands_theme",
        platforms: &[
            Rect::new(0.0, 540.0, 60.0, 20.0),
            Rect::new(600.0, 300.0, 100.0, 20.0),
            Rect::new(0.0, 580.0, 60.0, 20.0),
        ],
        gems: &[],
        key_pos: Vec2::new(0.0, 0.0),
        key_color: GemColor::Blue,
        door_pos: Vec2::new(0.0, 0.0),
        enemies: &[],
    };

    fn metrics() -> SpriteMetrics {
        SpriteMetrics::default()
    }

    /// Every x the sampler can produce on `plat` for an item inset by `inset`.
    fn slots(plat: &Rect, inset: f32) -> Vec<f32> {
        let (a, b) = ((plat.left + inset).ceil() as i32, (plat.right() - inset).floor() as i32);
        if a > b {
            vec![((plat.left + plat.right()) / 2.0).floor()]
        } else {
            (a..=b).map(|x| x as f32).collect()
        }
    }

    /// Share of `slots` at height `y` that satisfy `ok`.
    fn share_ok(plat: &Rect, inset: f32, y: f32, ok: impl Fn(Vec2) -> bool) -> f32 {
        let xs = slots(plat, inset);
        xs.iter().filter(|&&x| ok(Vec2::new(x, y))).count() as f32 / xs.len() as f32
    }

    #[test]
    fn same_seed_same_layout() {
        for level in LEVELS.iter() {
            let a = place_entities(level, &metrics(), &mut StdRng::seed_from_u64(1234));
            let b = place_entities(level, &metrics(), &mut StdRng::seed_from_u64(1234));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_seeds_usually_differ() {
        let level = &LEVELS[1];
        let layouts: Vec<Placement> = (0..8)
            .map(|s| place_entities(level, &metrics(), &mut StdRng::seed_from_u64(s)))
            .collect();
        assert!(layouts.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn narrow_and_floor_platforms_are_not_eligible() {
        assert!(eligible_platforms(&ONLY_FLOOR).is_empty());
        assert_eq!(eligible_platforms(&LEVELS[0]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn gems_sit_above_an_eligible_platform() {
        let level = &LEVELS[2];
        let eligible = eligible_platforms(level);
        let mut rng = StdRng::seed_from_u64(99);
        let p = place_entities(level, &metrics(), &mut rng);
        assert_eq!(p.gems.len(), level.gems.len());
        for g in &p.gems {
            let on_some = eligible.iter().any(|&i| {
                let r = level.platforms[i];
                g.y == r.top - GEM_LIFT && g.x >= r.left + GEM_MARGIN && g.x <= r.right() - GEM_MARGIN
            });
            assert!(on_some, "gem at {g:?}");
        }
    }

    #[test]
    fn key_avoids_door_platform_when_possible() {
        let level = &LEVELS[0];
        let m = metrics();
        for seed in 0..50 {
            let p = place_entities(level, &m, &mut StdRng::seed_from_u64(seed));
            let Some(di) = p.door_platform else { continue };
            if is_floor(&level.platforms[di]) {
                continue;
            }
            let door_top = level.platforms[di].top;
            let key_half = m.key_half(level.key_color);
            let on_door_plat = p.key.y == door_top - key_half.h
                && level.platforms[di].spans_x(p.key.x);
            assert!(!on_door_plat, "seed {seed}");
        }
    }

    #[test]
    fn no_eligible_platforms_uses_fallbacks() {
        let m = metrics();
        let p = place_entities(&ONLY_FLOOR, &m, &mut StdRng::seed_from_u64(5));

        for g in &p.gems {
            assert_eq!(g.y, GEM_FALLBACK.top - GEM_LIFT);
            assert!(g.x >= GEM_FALLBACK.left + GEM_MARGIN && g.x <= GEM_FALLBACK.right() - GEM_MARGIN);
        }
        // Door is forced onto the floor.
        assert_eq!(p.door_platform, Some(1));
        assert_eq!(p.door.y, DEFAULT_FLOOR.top - m.door_half.h);
        assert_eq!(p.key.y, KEY_FALLBACK.top - m.key_half(GemColor::Green).h);
    }

    #[test]
    fn key_platform_is_kept_even_when_it_hugs_the_door() {
        let m = metrics();
        let key_half = m.key_half(GemColor::Blue);
        let ledge = CRAMPED.platforms[0];
        let far = CRAMPED.platforms[1];
        let (mut on_ledge, mut on_far) = (0, 0);

        for seed in 0..200 {
            let p = place_entities(&CRAMPED, &m, &mut StdRng::seed_from_u64(seed));
            if p.door_platform != Some(2) {
                continue;
            }
            if p.key.y == ledge.top - key_half.h {
                assert!(slots(&ledge, key_half.w).contains(&p.key.x), "seed {seed}");
                assert!(p.key.dist_sq(p.door) < KEY_MIN_DIST_FROM_DOOR * KEY_MIN_DIST_FROM_DOOR);
                on_ledge += 1;
            } else {
                assert_eq!(p.key.y, far.top - key_half.h, "seed {seed}");
                on_far += 1;
            }
        }
        assert!(on_ledge > 0, "ledge never chosen");
        assert!(on_far > 0, "far platform never chosen");
    }

    #[test]
    fn gems_keep_their_spacing_when_room_allows() {
        let m = metrics();
        let min_sq = GEM_MIN_DIST * GEM_MIN_DIST;
        let mut checked = 0;

        for (li, level) in LEVELS.iter().enumerate() {
            let eligible = eligible_platforms(level);
            assert!(!eligible.is_empty());
            for seed in 0..40 {
                let p = place_entities(level, &m, &mut StdRng::seed_from_u64(seed));
                for (i, gem) in p.gems.iter().enumerate() {
                    let earlier = &p.gems[..i];
                    let clear_of_earlier = |c: Vec2| earlier.iter().all(|e| e.dist_sq(c) >= min_sq);
                    // Chance that a single sample (platform, then x) is acceptable.
                    let chance = eligible.iter()
                        .map(|&pi| {
                            let plat = level.platforms[pi];
                            share_ok(&plat, GEM_MARGIN, plat.top - GEM_LIFT, clear_of_earlier)
                        })
                        .sum::<f32>() / eligible.len() as f32;
                    if chance >= 0.5 {
                        checked += 1;
                        assert!(clear_of_earlier(*gem), "level {li} seed {seed} gem {i} at {gem:?}");
                    }
                }
            }
        }
        assert!(checked >= LEVELS.len() * 40, "only {checked} gems checked");
    }

    #[test]
    fn key_keeps_its_distance_from_the_door_when_room_allows() {
        let m = metrics();
        let min_sq = KEY_MIN_DIST_FROM_DOOR * KEY_MIN_DIST_FROM_DOOR;
        let mut checked = 0;

        for (li, level) in LEVELS.iter().enumerate() {
            let key_half = m.key_half(level.key_color);
            let eligible = eligible_platforms(level);
            for seed in 0..40 {
                let p = place_entities(level, &m, &mut StdRng::seed_from_u64(seed));
                let hosts: Vec<Rect> = eligible.iter()
                    .filter(|&&i| Some(i) != p.door_platform)
                    .map(|&i| level.platforms[i])
                    .filter(|pl| pl.top - key_half.h == p.key.y && slots(pl, key_half.w).contains(&p.key.x))
                    .collect();
                assert!(!hosts.is_empty(), "level {li} seed {seed}: key off every platform");

                let far_from_door = |c: Vec2| c.dist_sq(p.door) >= min_sq;
                let chance = hosts.iter()
                    .map(|pl| share_ok(pl, key_half.w, pl.top - key_half.h, far_from_door))
                    .fold(1.0_f32, f32::min);
                if chance >= 0.5 {
                    checked += 1;
                    assert!(far_from_door(p.key), "level {li} seed {seed}: key {:?} door {:?}", p.key, p.door);
                }
            }
        }
        assert!(checked >= LEVELS.len() * 10, "only {checked} keys checked");
    }

    #[test]
    fn empty_sample_range_uses_midpoint() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(sample_between(&mut rng, 110.0, 90.0), 100.0);
        assert_eq!(sample_between(&mut rng, 42.0, 42.0), 42.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn door_and_key_stay_on_screen(seed in any::<u64>(), idx in 0usize..5) {
                let m = metrics();
                let p = place_entities(&LEVELS[idx], &m, &mut StdRng::seed_from_u64(seed));
                let dh = m.door_half;
                prop_assert!(p.door.x >= dh.w && p.door.x <= SCREEN_W - dh.w);
                prop_assert!(p.door.y >= dh.h && p.door.y <= SCREEN_H - dh.h);
                let kh = m.key_half(LEVELS[idx].key_color);
                prop_assert!(p.key.x >= kh.w && p.key.x <= SCREEN_W - kh.w);
                prop_assert!(p.key.y >= kh.h && p.key.y <= SCREEN_H - kh.h);
            }

            #[test]
            fn gem_count_matches_fixture(seed in any::<u64>(), idx in 0usize..5) {
                let p = place_entities(&LEVELS[idx], &metrics(), &mut StdRng::seed_from_u64(seed));
                prop_assert_eq!(p.gems.len(), LEVELS[idx].gems.len());
            }
        }
    }
}
