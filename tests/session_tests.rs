//! Integration tests for a running session
//!
//! These tests verify that:
//! - Enemies spawn on schedule and at the right distance
//! - Kills pay out exactly one mana pixel, which the hero collects
//! - Projectile splash, bounces and lifesteal resolve against live enemies
//! - Enemies stop at the hero's hitbox, and contact damages the hero once
//!   per attack interval
//! - The socket inventory is capped
//! - A fallen hero stops the session's hostile systems

use bevy::prelude::*;

use runeshot::session::components::Heading;
use runeshot::session::mana::ManaEconomy;
use runeshot::session::scaling::EnemyStats;
use runeshot::session::spawn::SpawnDirector;
use runeshot::session::events::{RequestComboActivation, SocketRune};
use runeshot::session::systems::{Enemy, EnemyTier, FrameInput, Hero, ManaPixel, Projectile, Sphere};
use runeshot::session::{SessionLog, SessionLogEventType, SessionPlugin};

fn create_session(frame_ms: f32) -> App {
    let mut app = App::new();
    app.add_plugins(SessionPlugin::seeded(7));
    app.insert_resource(FrameInput {
        delta_ms: frame_ms,
        movement: Vec2::ZERO,
    });
    app.update();
    app
}

fn hero(app: &mut App) -> Hero {
    let world = app.world_mut();
    let mut query = world.query::<&Hero>();
    query.single(world).clone()
}

fn hero_mut(app: &mut App) -> Mut<'_, Hero> {
    let world = app.world_mut();
    let mut query = world.query::<&mut Hero>();
    query.single_mut(world)
}

fn enemy_health(app: &mut App, entity: Entity) -> i32 {
    app.world().get::<Enemy>(entity).map_or(0, |enemy| enemy.health)
}

/// Stationary, harmless and too sturdy to die during a test.
fn dummy() -> EnemyStats {
    EnemyStats {
        hp: 1000,
        dps: 0,
        speed: 0.0,
    }
}

fn hero_position(app: &mut App) -> Vec2 {
    let world = app.world_mut();
    let mut query = world.query_filtered::<&Transform, With<Hero>>();
    query.single(world).translation.truncate()
}

fn count<C: Component>(app: &mut App) -> usize {
    let world = app.world_mut();
    let mut query = world.query::<&C>();
    query.iter(world).count()
}

fn spawn_enemy(app: &mut App, tier: EnemyTier, position: Vec2, stats: EnemyStats) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            Enemy::new(tier, 1, stats),
        ))
        .id()
}

fn run_frames(app: &mut App, frames: u32) {
    for _ in 0..frames {
        app.update();
    }
}

// =============================================================================
// Spawning
// =============================================================================

#[test]
fn test_first_enemy_spawns_after_base_interval() {
    let mut app = create_session(100.0);

    run_frames(&mut app, 23); // 2400ms
    assert_eq!(count::<Enemy>(&mut app), 0, "No enemy before the first interval");

    app.update(); // 2500ms
    assert_eq!(count::<Enemy>(&mut app), 1, "One enemy at the first interval");

    let world = app.world_mut();
    let mut query = world.query::<(&Enemy, &Transform)>();
    let (enemy, transform) = query.single(world);
    assert_eq!(enemy.tier, EnemyTier::Weak, "Level 1 only spawns weak enemies");
    assert_eq!(enemy.health, 30);
    let distance = transform.translation.truncate().length();
    assert!(
        (495.0..=651.0).contains(&distance),
        "Enemy spawned {:.1} units away",
        distance
    );
    assert_eq!(app.world().resource::<SpawnDirector>().spawned, 1);
}

#[test]
fn test_moving_hero_records_heading() {
    let mut app = create_session(100.0);
    app.insert_resource(FrameInput {
        delta_ms: 100.0,
        movement: Vec2::new(3.0, 4.0),
    });
    app.update();

    // 100 units/s for 0.1s along (0.6, 0.8)
    let position = hero_position(&mut app);
    assert!((position - Vec2::new(6.0, 8.0)).length() < 1e-3, "hero at {:?}", position);

    let world = app.world_mut();
    let mut query = world.query_filtered::<&Heading, With<Hero>>();
    assert!(query.single(world).0.length() > 0.0);
}

// =============================================================================
// Mana Economy
// =============================================================================

#[test]
fn test_elite_kill_drops_one_pixel_worth_twenty() {
    let mut app = create_session(1000.0 / 60.0);
    let fragile = EnemyStats {
        hp: 5,
        dps: 0,
        speed: 0.0,
    };
    spawn_enemy(&mut app, EnemyTier::Elite, Vec2::new(50.0, 0.0), fragile);

    // Shot, kill, 500ms drop delay, attraction, pickup
    run_frames(&mut app, 90);

    assert_eq!(count::<Enemy>(&mut app), 0, "Dead enemy should be reaped");
    assert_eq!(count::<ManaPixel>(&mut app), 0, "The pixel should have been collected");

    let economy = app.world().resource::<ManaEconomy>();
    assert_eq!(economy.pixels_spawned, 1, "One kill pays out one pixel");
    assert_eq!(economy.mana_collected, 20);

    let log = app.world().resource::<SessionLog>();
    assert_eq!(log.totals.kills.elite, 1);
    assert_eq!(log.totals.mana_collected, 20);

    assert_eq!(hero(&mut app).mana, 20, "Elite kills are worth 20 mana");
}

#[test]
fn test_far_pixels_expire() {
    let mut app = create_session(1000.0 / 60.0);
    app.world_mut().spawn((
        Transform::from_xyz(250.0, 0.0, 0.0),
        ManaPixel {
            amount: 10,
            pickup_radius: 20.0,
            attraction_radius: 60.0,
            attraction_speed: 100.0,
            sequence: 0,
        },
    ));

    app.update();
    assert_eq!(count::<ManaPixel>(&mut app), 0);
    assert_eq!(app.world().resource::<ManaEconomy>().pixels_expired, 1);
    assert_eq!(hero(&mut app).mana, 0);
}

#[test]
fn test_projectiles_expire_after_lifetime() {
    let mut app = create_session(100.0);
    // Far enough that the shot never arrives
    spawn_enemy(
        &mut app,
        EnemyTier::Normal,
        Vec2::new(5000.0, 0.0),
        EnemyStats {
            hp: 100,
            dps: 0,
            speed: 0.0,
        },
    );

    app.update();
    assert_eq!(count::<Projectile>(&mut app), 1, "Hero fires at the nearest enemy");

    // 3000ms lifetime; the next shot replaces it every second
    run_frames(&mut app, 35);
    assert!(count::<Projectile>(&mut app) <= 3, "Old projectiles should be despawned");
}

// =============================================================================
// Projectile Hits
// =============================================================================

#[test]
fn test_explosive_shot_splashes_nearby_enemies() {
    let mut app = create_session(1000.0 / 60.0);
    hero_mut(&mut app).mana = 100;
    for _ in 0..3 {
        app.world_mut().send_event(SocketRune { sphere: Sphere::E });
    }
    app.world_mut().send_event(RequestComboActivation);
    app.update();
    assert!(hero(&mut app).spheres().is_empty(), "ExplosiveShot consumed the runes");

    let target = spawn_enemy(&mut app, EnemyTier::Normal, Vec2::new(100.0, 0.0), dummy());
    let bystander = spawn_enemy(&mut app, EnemyTier::Normal, Vec2::new(140.0, 0.0), dummy());
    run_frames(&mut app, 25);

    // Target: 10 direct plus 4 splash at the impact point, ~15 units away.
    // Bystander: 2 splash from ~55 units away.
    assert_eq!(enemy_health(&mut app, target), 986);
    assert_eq!(enemy_health(&mut app, bystander), 998);

    let log = app.world().resource::<SessionLog>();
    let explosions = log
        .filter_by_type(SessionLogEventType::Damage)
        .into_iter()
        .filter(|entry| entry.message.starts_with("Explosion"))
        .count();
    assert_eq!(explosions, 2);
    assert_eq!(log.totals.damage_dealt, 16);
    assert_eq!(hero(&mut app).damage_dealt, 16);
}

#[test]
fn test_bounce_skips_the_enemy_it_left() {
    let mut app = create_session(1000.0 / 60.0);
    hero_mut(&mut app).stats.projectile_bounces = 1;
    let first = spawn_enemy(&mut app, EnemyTier::Normal, Vec2::new(100.0, 0.0), dummy());
    let second = spawn_enemy(&mut app, EnemyTier::Normal, Vec2::new(100.0, 60.0), dummy());

    run_frames(&mut app, 40);

    // The bounced shot starts inside the first enemy's hit radius
    assert_eq!(enemy_health(&mut app, first), 990, "First enemy is hit exactly once");
    assert_eq!(enemy_health(&mut app, second), 990, "Bounce carries on to the second enemy");
    assert_eq!(count::<Projectile>(&mut app), 0, "Bounced shot is spent");
}

#[test]
fn test_lifesteal_heals_up_to_max_health() {
    let mut app = create_session(1000.0 / 60.0);
    {
        let mut hero = hero_mut(&mut app);
        hero.stats.life_steal = 50.0;
        hero.health = 50.0;
    }
    spawn_enemy(&mut app, EnemyTier::Normal, Vec2::new(100.0, 0.0), dummy());

    run_frames(&mut app, 25);
    assert_eq!(hero(&mut app).health, 55.0, "Half of 10 damage returns as health");

    hero_mut(&mut app).health = 98.0;
    run_frames(&mut app, 80); // next attack lands
    assert_eq!(hero(&mut app).damage_dealt, 20);
    assert_eq!(hero(&mut app).health, 100.0, "Lifesteal never heals past max health");
}

#[test]
fn test_overkill_is_not_counted_as_damage() {
    let mut app = create_session(1000.0 / 60.0);
    let fragile = EnemyStats {
        hp: 4,
        dps: 0,
        speed: 0.0,
    };
    spawn_enemy(&mut app, EnemyTier::Weak, Vec2::new(100.0, 0.0), fragile);

    run_frames(&mut app, 25);

    let log = app.world().resource::<SessionLog>();
    assert_eq!(log.totals.kills.weak, 1);
    assert_eq!(log.totals.damage_dealt, 4, "Only the enemy's remaining health counts");
    assert_eq!(hero(&mut app).damage_dealt, 4);
}

// =============================================================================
// Contact Damage
// =============================================================================

#[test]
fn test_enemies_stop_at_the_hitbox() {
    let mut app = create_session(100.0);
    let charger = spawn_enemy(
        &mut app,
        EnemyTier::Normal,
        Vec2::new(35.0, 0.0),
        EnemyStats {
            hp: 100_000,
            dps: 10,
            speed: 300.0,
        },
    );

    app.update();

    let position = app.world().get::<Transform>(charger).unwrap().translation.truncate();
    let distance = position.distance(hero_position(&mut app));
    assert!(
        distance > 29.9 && distance <= 30.0,
        "Enemy should halt at the 30 unit contact radius, got {:.3}",
        distance
    );
    assert_eq!(hero(&mut app).health, 90.0, "Contact registers once at the edge");
}

#[test]
fn test_contact_damage_once_per_interval() {
    let mut app = create_session(100.0);
    let biter = EnemyStats {
        hp: 100_000,
        dps: 15,
        speed: 0.0,
    };
    spawn_enemy(&mut app, EnemyTier::Normal, Vec2::new(20.0, 0.0), biter);

    app.update(); // 200ms: first strike
    assert_eq!(hero(&mut app).health, 85.0);

    run_frames(&mut app, 9); // 1100ms
    assert_eq!(hero(&mut app).health, 85.0, "No second strike inside the interval");

    app.update(); // 1200ms
    assert_eq!(hero(&mut app).health, 70.0);

    let log = app.world().resource::<SessionLog>();
    assert_eq!(log.totals.damage_taken, 30);
}

#[test]
fn test_armor_reduces_contact_damage() {
    let mut app = create_session(100.0);
    {
        let world = app.world_mut();
        let mut query = world.query::<&mut Hero>();
        query.single_mut(world).stats.armor = 100.0;
    }
    spawn_enemy(
        &mut app,
        EnemyTier::Normal,
        Vec2::new(0.0, 20.0),
        EnemyStats {
            hp: 100_000,
            dps: 20,
            speed: 0.0,
        },
    );

    app.update();
    assert_eq!(hero(&mut app).health, 90.0, "100 armor halves incoming damage");
}

#[test]
fn test_dead_hero_stops_session() {
    let mut app = create_session(100.0);
    let killer = EnemyStats {
        hp: 100_000,
        dps: 500,
        speed: 0.0,
    };
    spawn_enemy(&mut app, EnemyTier::Boss, Vec2::new(20.0, 0.0), killer);

    app.update();
    let fallen = hero(&mut app);
    assert!(!fallen.is_alive());
    assert_eq!(fallen.health, 0.0, "Health never drops below zero");

    run_frames(&mut app, 50);
    assert_eq!(count::<Enemy>(&mut app), 1, "No spawns after the hero falls");
    assert_eq!(count::<Projectile>(&mut app), 0, "A fallen hero does not attack");
}

// =============================================================================
// Sockets
// =============================================================================

#[test]
fn test_seventh_rune_is_rejected() {
    let mut app = create_session(100.0);
    for _ in 0..7 {
        app.world_mut().send_event(SocketRune { sphere: Sphere::W });
    }
    app.update();

    let hero = hero(&mut app);
    assert_eq!(hero.spheres().len(), 6, "Inventory holds six runes");
    assert_eq!(app.world().resource::<SessionLog>().totals.runes_rejected, 1);

    // Six W spheres at level 1: 6 * 0.6% move speed
    assert!((hero.passives().move_speed_pct - 3.6).abs() < 1e-4);
}

#[test]
fn test_q_spheres_regenerate_health() {
    let mut app = create_session(100.0);
    {
        let world = app.world_mut();
        let mut query = world.query::<&mut Hero>();
        query.single_mut(world).health = 50.0;
    }
    for _ in 0..2 {
        app.world_mut().send_event(SocketRune { sphere: Sphere::Q });
    }
    app.update(); // sockets land, regen starts this frame

    run_frames(&mut app, 10); // one more second at 2 HP/s
    let health = hero(&mut app).health;
    assert!((health - 52.2).abs() < 0.01, "health {}", health);
}
