//! Session Systems API
//!
//! This module provides a stable API for the session simulation systems.
//! Hosts (headless runner, a rendering front end, tests) should import from
//! here rather than directly from internal modules.
//!
//! ## System Phases
//!
//! Session systems run in six ordered phases each frame:
//!
//! 1. **World** - Clock advance, hero movement
//! 2. **Enemies** - Reaping the dead, spawning, combo slow, pursuit, contact strikes
//! 3. **Mana** - Delayed drops, attraction, pickup, expiry
//! 4. **Combat** - Hero auto-attack, projectile flight, hit resolution
//! 5. **Progression** - Combo timers, rune input, passive regeneration
//! 6. **Log** - Session log recording
//!
//! ## Usage
//!
//! ```ignore
//! use runeshot::session::systems;
//!
//! systems::configure_session_system_ordering(&mut app);
//! systems::add_core_session_systems(&mut app, || true);
//! ```

use bevy::prelude::*;

// === Phase 1: World ===
pub use super::world::advance_clock;
pub use super::world::move_hero;

// === Phase 2: Enemies ===
pub use super::mana::reap_dead_enemies;
pub use super::spawn::spawn_enemies;
pub use super::world::apply_combo_slow;
pub use super::world::move_enemies;
pub use super::combat::detect_enemy_contact;
pub use super::combat::resolve_enemy_strikes;

// === Phase 3: Mana ===
pub use super::mana::release_mana_drops;
pub use super::mana::collect_mana_pixels;

// === Phase 4: Combat ===
pub use super::combat::hero_auto_attack;
pub use super::combat::move_projectiles;
pub use super::combat::resolve_projectile_hits;

// === Phase 5: Progression ===
pub use super::combo::expire_combo;
pub use super::combo::process_rune_input;
pub use super::progression::regenerate_health;

// === Phase 6: Log ===
pub use super::log::record_session_log;

// === Components and Resources ===
pub use super::combo::{ComboEffect, ComboKind, ComboState};
pub use super::components::{
    Element, Enemy, EnemyTier, FrameInput, GameClock, GameRng, Heading, ManaPixel, Projectile, Sphere,
};
pub use super::mana::{DeathQueue, ManaEconomy};
pub use super::progression::Hero;
pub use super::spawn::SpawnDirector;

/// System set labels for session system ordering.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionSystemPhase {
    /// Phase 1: Clock and hero movement
    World,
    /// Phase 2: Enemy lifecycle, movement and contact
    Enemies,
    /// Phase 3: Mana pixel lifecycle
    Mana,
    /// Phase 4: Hero attacks and projectiles
    Combat,
    /// Phase 5: Combo timers, rune input, regeneration
    Progression,
    /// Phase 6: Logging
    Log,
}

/// Configures the ordering between session system phases.
///
/// Call this once during app setup before adding session systems.
pub fn configure_session_system_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            SessionSystemPhase::World,
            SessionSystemPhase::Enemies,
            SessionSystemPhase::Mana,
            SessionSystemPhase::Combat,
            SessionSystemPhase::Progression,
            SessionSystemPhase::Log,
        )
            .chain(),
    );
}

/// Adds the core session systems to the app.
///
/// # Arguments
/// * `app` - The Bevy App to add systems to
/// * `run_condition` - A run condition (e.g. `|| true` for headless sessions)
pub fn add_core_session_systems<M>(app: &mut App, run_condition: impl Condition<M> + Clone)
where
    M: 'static,
{
    // Phase 1: World
    app.add_systems(
        Update,
        (advance_clock, move_hero)
            .chain()
            .in_set(SessionSystemPhase::World)
            .run_if(run_condition.clone()),
    );

    // Phase 2: Enemies
    app.add_systems(
        Update,
        (
            reap_dead_enemies,
            spawn_enemies,
            apply_deferred, // Newly spawned enemies join this frame's pursuit
            apply_combo_slow,
            move_enemies,
            detect_enemy_contact,
            resolve_enemy_strikes,
        )
            .chain()
            .in_set(SessionSystemPhase::Enemies)
            .run_if(run_condition.clone()),
    );

    // Phase 3: Mana
    app.add_systems(
        Update,
        (
            release_mana_drops,
            apply_deferred, // Evicted pixels must be gone before pickup
            collect_mana_pixels,
        )
            .chain()
            .in_set(SessionSystemPhase::Mana)
            .run_if(run_condition.clone()),
    );

    // Flush deferred commands between phases
    app.add_systems(
        Update,
        apply_deferred
            .after(SessionSystemPhase::Mana)
            .before(SessionSystemPhase::Combat)
            .run_if(run_condition.clone()),
    );

    // Phase 4: Combat
    app.add_systems(
        Update,
        (
            hero_auto_attack,
            apply_deferred, // Fresh projectiles start moving this frame
            move_projectiles,
            resolve_projectile_hits,
        )
            .chain()
            .in_set(SessionSystemPhase::Combat)
            .run_if(run_condition.clone()),
    );

    // Phase 5: Progression
    app.add_systems(
        Update,
        (expire_combo, process_rune_input, regenerate_health)
            .chain()
            .in_set(SessionSystemPhase::Progression)
            .run_if(run_condition.clone()),
    );

    // Phase 6: Log
    app.add_systems(
        Update,
        record_session_log
            .in_set(SessionSystemPhase::Log)
            .run_if(run_condition),
    );
}
