/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Enemy patrol
///   2. Player physics (gravity, landing, horizontal move, world clamp)
///   3. Interactions (enemy contact → gems → key → door proximity)
///   4. Outcome (health depleted → GameOver)
///
/// Patrol must run before interactions so contact is tested against this
/// frame's enemy positions. Interactions test the hitbox taken right after
/// gravity, before the landing snap and the horizontal move.

use tracing::info;

use crate::domain::entity::FrameInput;
use crate::domain::geom::Rect;
use crate::domain::{patrol, physics, rules};
use super::event::GameEvent;
use super::flow;
use super::world::{GameState, GameWorld};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut GameWorld, input: FrameInput) -> Vec<GameEvent> {
    if world.state != GameState::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.frame += 1;

    patrol::update_enemies(&mut world.enemies, world.tuning.enemy_speed);
    let moved = physics::step_player(&mut world.player, &world.platforms, input, &world.tuning, &world.metrics);
    resolve_interactions(world, &moved.contact, &mut events);
    resolve_outcome(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Interactions
// ══════════════════════════════════════════════════════════════

fn resolve_interactions(world: &mut GameWorld, hitbox: &Rect, events: &mut Vec<GameEvent>) {
    if rules::resolve_enemy_contact(&mut world.player, hitbox, &world.enemies, &world.tuning).is_some() {
        events.push(GameEvent::PlayerHit { health: world.player.health });
    }

    let got = rules::resolve_pickups(
        hitbox,
        &mut world.gems,
        &mut world.key,
        &mut world.door,
        &mut world.progress,
    );
    if got.gems > 0 {
        events.push(GameEvent::GemCollected { remaining: world.progress.total - world.progress.collected });
    }
    if got.key_revealed {
        events.push(GameEvent::KeyRevealed);
    }
    if got.key_taken {
        events.push(GameEvent::KeyTaken);
    }

    world.near_door = rules::near_door(hitbox, &world.door);
}

// ══════════════════════════════════════════════════════════════
// Outcome
// ══════════════════════════════════════════════════════════════

fn resolve_outcome(world: &mut GameWorld, events: &mut Vec<GameEvent>) {
    if world.player.health == 0 {
        info!(level = world.current_level + 1, frame = world.frame, "player out of health");
        events.push(GameEvent::PlayerDied);
        flow::enter_state(world, GameState::GameOver, events);
    }
}
