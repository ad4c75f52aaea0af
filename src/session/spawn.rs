//! Spawn Director
//!
//! Spawns one enemy whenever the current spawn interval has passed. The
//! interval tightens exponentially with session time:
//! `interval(t) = base * decay ^ (t / period)`.
//!
//! Most spawns are placed ahead of the hero's movement so a running hero keeps
//! meeting enemies; the rest surround the hero at random.

use bevy::prelude::*;
use std::f32::consts::TAU;

use crate::balance::BalanceTable;

use super::components::{Enemy, GameClock, GameRng, Heading};
use super::events::EnemySpawned;
use super::progression::Hero;
use super::scaling::{enemy_stats, select_tier};

#[derive(Resource, Debug, Default)]
pub struct SpawnDirector {
    pub last_spawn_ms: f64,
    pub spawned: u32,
}

impl SpawnDirector {
    /// Seconds between spawns after `elapsed_secs` of session time.
    pub fn interval_secs(elapsed_secs: f32, balance: &BalanceTable) -> f32 {
        let spawning = &balance.spawning;
        spawning.base_interval_secs
            * spawning.interval_decay.powf(elapsed_secs / spawning.decay_period_secs)
    }

    pub fn is_due(&self, now_ms: f64, balance: &BalanceTable) -> bool {
        let interval_ms = Self::interval_secs((now_ms / 1000.0) as f32, balance) as f64 * 1000.0;
        now_ms - self.last_spawn_ms >= interval_ms
    }
}

/// Choose where the next enemy appears, relative to the hero.
///
/// With `heading` non-zero, a directional spawn lands within the configured
/// deviation of the heading; a stationary hero gets a fully random angle.
pub fn pick_spawn_position(hero_position: Vec2, heading: Vec2, rng: &mut GameRng, balance: &BalanceTable) -> Vec2 {
    let spawning = &balance.spawning;
    let directional = rng.random_f32() < spawning.directional_chance;

    let angle = if directional && heading.length_squared() > f32::EPSILON {
        let deviation = spawning.directional_deviation_deg.to_radians();
        heading.y.atan2(heading.x) + rng.random_range(-deviation, deviation)
    } else {
        rng.random_range(0.0, TAU)
    };

    let distance = rng.random_range(spawning.min_distance, spawning.max_distance);
    hero_position + Vec2::from_angle(angle) * distance
}

/// Spawn an enemy when the interval has elapsed.
pub fn spawn_enemies(
    mut commands: Commands,
    clock: Res<GameClock>,
    balance: Res<BalanceTable>,
    mut rng: ResMut<GameRng>,
    mut director: ResMut<SpawnDirector>,
    heroes: Query<(&Hero, &Transform, &Heading)>,
    mut spawned_events: EventWriter<EnemySpawned>,
) {
    let Ok((hero, hero_transform, heading)) = heroes.get_single() else {
        return;
    };
    if !hero.is_alive() || !director.is_due(clock.now_ms, &balance) {
        return;
    }

    let tier = select_tier(hero.level(), rng.random_f32(), &balance);
    let stats = enemy_stats(tier, hero.level(), &balance);
    let position = pick_spawn_position(hero_transform.translation.truncate(), heading.0, &mut rng, &balance);

    let entity = commands
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            Enemy::new(tier, hero.level(), stats),
        ))
        .id();

    director.last_spawn_ms = clock.now_ms;
    director.spawned += 1;
    debug!("Spawned {} enemy ({} HP) at {:?}", tier.name(), stats.hp, position);
    spawned_events.send(EnemySpawned { entity, tier, position });
}
