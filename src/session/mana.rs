//! Mana Economy
//!
//! Enemy deaths become mana for the hero in three steps:
//!
//! 1. Combat pushes a [`DeathRecord`] when an enemy goes from Alive to Dead.
//!    [`reap_dead_enemies`] drains the queue, despawns the enemy and schedules
//!    one drop worth `mana_on_kill[tier]`. Each enemy enters the queue once,
//!    so each death pays out once.
//! 2. After the spawn delay the drop becomes a [`ManaPixel`] entity. When the
//!    live pixel cap is reached the oldest pixel is evicted.
//! 3. Pixels near the hero drift toward it and are collected on contact.
//!    Pixels left far behind expire.

use bevy::prelude::*;
use std::collections::VecDeque;

use crate::balance::BalanceTable;

use super::components::{Element, EnemyTier, FrameInput, GameClock, ManaPixel};
use super::events::{EnemyDied, HeroLeveledUp, ManaPixelCollected, ManaPixelSpawned};
use super::progression::Hero;

/// An enemy that died and has not been reaped yet.
#[derive(Debug, Clone, Copy)]
pub struct DeathRecord {
    pub entity: Entity,
    pub tier: EnemyTier,
    pub position: Vec2,
    pub element: Element,
}

#[derive(Resource, Debug, Default)]
pub struct DeathQueue {
    records: VecDeque<DeathRecord>,
}

impl DeathQueue {
    pub fn push(&mut self, record: DeathRecord) {
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = DeathRecord> + '_ {
        self.records.drain(..)
    }
}

/// A mana drop waiting for its spawn delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingDrop {
    pub position: Vec2,
    pub amount: u32,
    pub release_at_ms: f64,
}

#[derive(Resource, Debug, Default)]
pub struct ManaEconomy {
    pending: Vec<PendingDrop>,
    next_sequence: u64,
    pub pixels_spawned: u32,
    pub pixels_evicted: u32,
    pub pixels_expired: u32,
    pub mana_collected: u64,
}

impl ManaEconomy {
    pub fn schedule_drop(&mut self, position: Vec2, amount: u32, release_at_ms: f64) {
        self.pending.push(PendingDrop {
            position,
            amount,
            release_at_ms,
        });
    }

    pub fn pending(&self) -> &[PendingDrop] {
        &self.pending
    }

    /// Remove and return the drops whose delay has passed, in schedule order.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<PendingDrop> {
        let (due, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|drop| drop.release_at_ms <= now_ms);
        self.pending = waiting;
        due
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }
}

/// Move a pixel toward `target` by at most `step`, without overshooting.
pub fn attract_toward(position: Vec2, target: Vec2, step: f32) -> Vec2 {
    let offset = target - position;
    let distance = offset.length();
    if distance <= step || distance <= f32::EPSILON {
        target
    } else {
        position + offset / distance * step
    }
}

/// Despawn dead enemies and schedule their mana drops.
pub fn reap_dead_enemies(
    mut commands: Commands,
    clock: Res<GameClock>,
    balance: Res<BalanceTable>,
    mut death_queue: ResMut<DeathQueue>,
    mut economy: ResMut<ManaEconomy>,
    mut died_events: EventWriter<EnemyDied>,
) {
    let release_at_ms = clock.now_ms + balance.mana_pixels.spawn_delay_ms as f64;
    for record in death_queue.drain() {
        if let Some(mut entity) = commands.get_entity(record.entity) {
            entity.despawn();
        }
        economy.schedule_drop(record.position, balance.mana_on_kill(record.tier), release_at_ms);
        died_events.send(EnemyDied {
            tier: record.tier,
            position: record.position,
            element: record.element,
        });
    }
}

/// Turn due drops into pixel entities, evicting the oldest beyond the cap.
pub fn release_mana_drops(
    mut commands: Commands,
    clock: Res<GameClock>,
    balance: Res<BalanceTable>,
    mut economy: ResMut<ManaEconomy>,
    pixels: Query<(Entity, &ManaPixel)>,
    mut spawned_events: EventWriter<ManaPixelSpawned>,
) {
    let due = economy.take_due(clock.now_ms);
    if due.is_empty() {
        return;
    }

    let tuning = &balance.mana_pixels;
    let mut live: VecDeque<(Entity, u64)> = {
        let mut existing: Vec<(Entity, u64)> = pixels.iter().map(|(e, pixel)| (e, pixel.sequence)).collect();
        existing.sort_by_key(|(_, sequence)| *sequence);
        existing.into()
    };

    for drop in due {
        while live.len() >= tuning.max_pixels.max(1) {
            let Some((oldest, _)) = live.pop_front() else {
                break;
            };
            commands.entity(oldest).despawn();
            economy.pixels_evicted += 1;
        }

        let sequence = economy.next_sequence();
        let entity = commands
            .spawn((
                Transform::from_translation(drop.position.extend(0.0)),
                ManaPixel {
                    amount: drop.amount,
                    pickup_radius: tuning.pickup_radius,
                    attraction_radius: tuning.attraction_radius,
                    attraction_speed: tuning.attraction_speed,
                    sequence,
                },
            ))
            .id();
        live.push_back((entity, sequence));
        economy.pixels_spawned += 1;
        spawned_events.send(ManaPixelSpawned {
            position: drop.position,
            amount: drop.amount,
        });
    }
}

/// Attract, collect and expire mana pixels.
#[allow(clippy::too_many_arguments)]
pub fn collect_mana_pixels(
    mut commands: Commands,
    input: Res<FrameInput>,
    balance: Res<BalanceTable>,
    mut economy: ResMut<ManaEconomy>,
    mut heroes: Query<(&mut Hero, &Transform)>,
    mut pixels: Query<(Entity, &ManaPixel, &mut Transform), Without<Hero>>,
    mut collected_events: EventWriter<ManaPixelCollected>,
    mut level_events: EventWriter<HeroLeveledUp>,
) {
    let Ok((mut hero, hero_transform)) = heroes.get_single_mut() else {
        return;
    };
    let hero_position = hero_transform.translation.truncate();
    let delta_secs = input.delta_ms / 1000.0;

    for (entity, pixel, mut transform) in pixels.iter_mut() {
        let position = transform.translation.truncate();
        let distance = position.distance(hero_position);

        if distance > balance.mana_pixels.cleanup_distance {
            commands.entity(entity).despawn();
            economy.pixels_expired += 1;
            continue;
        }

        if distance <= pixel.pickup_radius && hero.is_alive() {
            commands.entity(entity).despawn();
            economy.mana_collected += pixel.amount as u64;
            collected_events.send(ManaPixelCollected { amount: pixel.amount });
            if let Some(new_level) = hero.add_mana(pixel.amount, &balance) {
                info!("Hero reached level {}", new_level);
                level_events.send(HeroLeveledUp { new_level });
            }
            continue;
        }

        if distance <= pixel.attraction_radius {
            let moved = attract_toward(position, hero_position, pixel.attraction_speed * delta_secs);
            transform.translation = moved.extend(transform.translation.z);
        }
    }
}
