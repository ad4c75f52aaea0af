//! Combat Resolution
//!
//! Damage formulas and the systems that move hero projectiles, resolve their
//! hits and apply enemy contact strikes.
//!
//! ## Formulas
//!
//! - Armor: `max(1, floor(damage * 100 / (100 + armor)))`, no reduction at
//!   zero or negative armor
//! - Evasion: the hit is negated with probability `evasion%`
//! - Crit: with probability `crit_chance%`, `floor(damage * (1 + crit_damage / 100))`
//! - Lifesteal: `floor(dealt * life_steal / 100)` healing
//! - Explosion: `floor(damage * fraction * (1 - distance / radius))`, skipped
//!   when not positive
//!
//! ## Hit order
//!
//! A projectile hits the nearest alive enemy inside its hit radius and is
//! destroyed. The direct hit lands first; an explosive projectile then splashes
//! every alive enemy around the impact point. Kills are pushed to the
//! [`DeathQueue`] exactly once, on the Alive to Dead transition.

use bevy::prelude::*;

use crate::balance::BalanceTable;

use super::combo::ComboState;
use super::components::{
    DamageOutcome, Element, Enemy, EnemyTier, FrameInput, GameClock, GameRng, Projectile,
};
use super::events::{EnemyReachedHitbox, HeroDamaged, ProjectileHit};
use super::mana::{DeathQueue, DeathRecord};
use super::progression::{HitOutcome, Hero};

// Absorbs f32 error in products that should land on whole numbers.
const FLOOR_EPSILON: f32 = 1e-4;

// ============================================================================
// Formulas
// ============================================================================

pub fn apply_armor(damage: u32, armor: f32) -> u32 {
    if armor <= 0.0 {
        return damage;
    }
    let reduced = (damage as f32 * 100.0 / (100.0 + armor) + FLOOR_EPSILON).floor() as u32;
    reduced.max(1)
}

pub fn apply_crit(damage: u32, crit_damage_pct: f32) -> u32 {
    (damage as f32 * (1.0 + crit_damage_pct / 100.0) + FLOOR_EPSILON).floor() as u32
}

pub fn lifesteal_healing(dealt: u32, life_steal_pct: f32) -> u32 {
    if life_steal_pct <= 0.0 {
        return 0;
    }
    (dealt as f32 * life_steal_pct / 100.0 + FLOOR_EPSILON).floor() as u32
}

/// Extra damage against elite and boss enemies.
pub fn apply_elite_bonus(damage: u32, tier: EnemyTier, damage_to_elites_pct: f32) -> u32 {
    if !tier.is_elite() || damage_to_elites_pct <= 0.0 {
        return damage;
    }
    (damage as f32 * (1.0 + damage_to_elites_pct / 100.0) + FLOOR_EPSILON).floor() as u32
}

/// Splash damage at `distance` from the impact. Zero outside the radius.
pub fn explosion_damage(projectile_damage: u32, distance: f32, balance: &BalanceTable) -> u32 {
    let combos = &balance.combos;
    if distance > combos.explosion_radius {
        return 0;
    }
    let base = projectile_damage as f32 * combos.explosion_damage_fraction;
    let falloff = 1.0 - distance / combos.explosion_radius;
    (base * falloff + FLOOR_EPSILON).floor().max(0.0) as u32
}

/// Direction of each projectile in a volley of `count`, fanned evenly around
/// `aim`.
pub fn volley_directions(aim: Vec2, count: u32, spread_deg: f32) -> Vec<Vec2> {
    let center = (count.max(1) - 1) as f32 / 2.0;
    let base_angle = aim.y.atan2(aim.x);
    (0..count.max(1))
        .map(|i| Vec2::from_angle(base_angle + (i as f32 - center) * spread_deg.to_radians()))
        .collect()
}

// ============================================================================
// Hero attacks
// ============================================================================

/// Fire at the nearest enemy whenever the attack cooldown allows.
pub fn hero_auto_attack(
    mut commands: Commands,
    clock: Res<GameClock>,
    balance: Res<BalanceTable>,
    combo_state: Res<ComboState>,
    mut rng: ResMut<GameRng>,
    mut heroes: Query<(&mut Hero, &Transform)>,
    enemies: Query<(&Enemy, &Transform), Without<Hero>>,
) {
    let Ok((mut hero, hero_transform)) = heroes.get_single_mut() else {
        return;
    };
    if !hero.is_alive() || clock.now_ms < hero.next_attack_ms {
        return;
    }

    let origin = hero_transform.translation.truncate();
    let Some(target) = enemies
        .iter()
        .filter(|(enemy, _)| enemy.is_alive())
        .map(|(_, transform)| transform.translation.truncate())
        .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)))
    else {
        return;
    };

    let to_target = target - origin;
    if to_target.length() < balance.projectiles.min_target_distance {
        return;
    }

    let (damage, is_crit) = hero.roll_damage(&balance, &mut rng);
    let effect = combo_state.effect(&balance);
    let speed = hero.stats.projectile_speed * effect.projectile_speed_multiplier;
    let element = hero.attack_element();

    for direction in volley_directions(to_target, hero.stats.projectile_count, balance.projectiles.spread_deg) {
        commands.spawn((
            Transform::from_translation(origin.extend(0.0)),
            Projectile {
                velocity: direction * speed,
                damage,
                is_crit,
                element,
                remaining_ms: balance.projectiles.lifetime_ms,
                effect,
                bounces_left: hero.stats.projectile_bounces,
                ignore: None,
            },
        ));
    }

    hero.next_attack_ms = clock.now_ms + hero.effective_attack_cooldown_ms(&balance) as f64;
}

/// Advance projectiles and remove the ones whose lifetime ran out.
pub fn move_projectiles(
    mut commands: Commands,
    input: Res<FrameInput>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
) {
    let delta_secs = input.delta_ms / 1000.0;
    for (entity, mut projectile, mut transform) in projectiles.iter_mut() {
        transform.translation += (projectile.velocity * delta_secs).extend(0.0);
        projectile.remaining_ms -= input.delta_ms;
        if projectile.remaining_ms <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

/// Resolve projectile collisions: direct damage, lifesteal, splash and bounces.
#[allow(clippy::too_many_arguments)]
pub fn resolve_projectile_hits(
    mut commands: Commands,
    balance: Res<BalanceTable>,
    mut death_queue: ResMut<DeathQueue>,
    projectiles: Query<(Entity, &Projectile, &Transform)>,
    mut enemies: Query<(Entity, &mut Enemy, &Transform), Without<Projectile>>,
    mut heroes: Query<&mut Hero>,
    mut hit_events: EventWriter<ProjectileHit>,
) {
    let Ok(mut hero) = heroes.get_single_mut() else {
        return;
    };
    let targets: Vec<(Entity, Vec2)> = enemies
        .iter()
        .filter(|(_, enemy, _)| enemy.is_alive())
        .map(|(entity, _, transform)| (entity, transform.translation.truncate()))
        .collect();

    for (projectile_entity, projectile, projectile_transform) in projectiles.iter() {
        if projectile.remaining_ms <= 0.0 {
            continue;
        }
        let impact = projectile_transform.translation.truncate();

        let hit = targets
            .iter()
            .filter(|(entity, _)| Some(*entity) != projectile.ignore)
            .filter(|(entity, _)| enemies.get(*entity).is_ok_and(|(_, enemy, _)| enemy.is_alive()))
            .map(|(entity, position)| (*entity, *position, position.distance(impact)))
            .filter(|(_, _, distance)| *distance < balance.projectiles.hit_radius)
            .min_by(|a, b| a.2.total_cmp(&b.2));
        let Some((target, target_position, _)) = hit else {
            continue;
        };

        commands.entity(projectile_entity).despawn();

        // Direct hit
        if let Ok((_, mut enemy, _)) = enemies.get_mut(target) {
            let damage = apply_elite_bonus(projectile.damage, enemy.tier, hero.stats.damage_to_elites);
            let outcome = enemy.take_damage(damage, projectile.element);
            record_damage(&mut hero, &mut death_queue, target, &enemy, target_position, outcome);

            let healing = lifesteal_healing(outcome.dealt, hero.stats.life_steal);
            hero.heal(healing as f32);

            hit_events.send(ProjectileHit {
                position: impact,
                element: projectile.element,
                damage: outcome.dealt,
                is_crit: projectile.is_crit,
                splash: false,
            });
        }

        // Splash
        if projectile.effect.explosive {
            for (entity, position) in targets.iter() {
                let damage = explosion_damage(projectile.damage, position.distance(impact), &balance);
                if damage == 0 {
                    continue;
                }
                let Ok((_, mut enemy, _)) = enemies.get_mut(*entity) else {
                    continue;
                };
                if !enemy.is_alive() {
                    continue;
                }
                let outcome = enemy.take_damage(damage, Element::Neutral);
                record_damage(&mut hero, &mut death_queue, *entity, &enemy, *position, outcome);
                hit_events.send(ProjectileHit {
                    position: *position,
                    element: Element::Neutral,
                    damage: outcome.dealt,
                    is_crit: false,
                    splash: true,
                });
            }
        }

        // Bounce toward the nearest other living enemy
        if projectile.bounces_left > 0 {
            let next = targets
                .iter()
                .filter(|(entity, _)| *entity != target)
                .filter(|(entity, _)| enemies.get(*entity).is_ok_and(|(_, enemy, _)| enemy.is_alive()))
                .min_by(|a, b| a.1.distance_squared(impact).total_cmp(&b.1.distance_squared(impact)));
            if let Some((_, next_position)) = next {
                let direction = (*next_position - impact).normalize_or_zero();
                if direction != Vec2::ZERO {
                    commands.spawn((
                        Transform::from_translation(impact.extend(0.0)),
                        Projectile {
                            velocity: direction * projectile.velocity.length(),
                            remaining_ms: balance.projectiles.lifetime_ms,
                            bounces_left: projectile.bounces_left - 1,
                            ignore: Some(target),
                            ..projectile.clone()
                        },
                    ));
                }
            }
        }
    }
}

fn record_damage(
    hero: &mut Hero,
    death_queue: &mut DeathQueue,
    entity: Entity,
    enemy: &Enemy,
    position: Vec2,
    outcome: DamageOutcome,
) {
    hero.damage_dealt += outcome.dealt as u64;
    if outcome.killed {
        death_queue.push(DeathRecord {
            entity,
            tier: enemy.tier,
            position,
            element: enemy.last_element,
        });
    }
}

// ============================================================================
// Enemy contact
// ============================================================================

/// Report enemies touching the hero, once per attack interval each.
pub fn detect_enemy_contact(
    clock: Res<GameClock>,
    balance: Res<BalanceTable>,
    heroes: Query<(&Hero, &Transform)>,
    mut enemies: Query<(Entity, &mut Enemy, &Transform), Without<Hero>>,
    mut contact_events: EventWriter<EnemyReachedHitbox>,
) {
    let Ok((hero, hero_transform)) = heroes.get_single() else {
        return;
    };
    if !hero.is_alive() {
        return;
    }
    let hero_position = hero_transform.translation.truncate();

    for (entity, mut enemy, transform) in enemies.iter_mut() {
        if !enemy.is_alive() || clock.now_ms < enemy.next_strike_ms {
            continue;
        }
        if transform.translation.truncate().distance(hero_position) <= balance.enemies.contact_radius {
            enemy.next_strike_ms = clock.now_ms + balance.enemies.attack_interval_ms as f64;
            contact_events.send(EnemyReachedHitbox { enemy: entity });
        }
    }
}

/// Apply enemy strikes to the hero.
pub fn resolve_enemy_strikes(
    mut contact_events: EventReader<EnemyReachedHitbox>,
    mut rng: ResMut<GameRng>,
    enemies: Query<&Enemy>,
    mut heroes: Query<&mut Hero>,
    mut damaged_events: EventWriter<HeroDamaged>,
) {
    let Ok(mut hero) = heroes.get_single_mut() else {
        return;
    };

    for contact in contact_events.read() {
        if !hero.is_alive() {
            break;
        }
        let Ok(enemy) = enemies.get(contact.enemy) else {
            continue;
        };
        if !enemy.is_alive() {
            continue;
        }

        let (amount, evaded) = match hero.receive_hit(enemy.dps, &mut rng) {
            HitOutcome::Evaded => (0, true),
            HitOutcome::Taken(amount) => (amount, false),
        };
        damaged_events.send(HeroDamaged {
            amount,
            evaded,
            remaining_health: hero.health,
        });

        if !hero.is_alive() {
            info!("Hero was slain by a {} enemy", enemy.tier.name());
        }
    }
}
