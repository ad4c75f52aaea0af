//! Session events
//!
//! Inbound events are written by the host (input layer) and consumed by the
//! session. Outbound events are written by the session for presentation
//! (effects, sounds, HUD) and for the [`super::log::SessionLog`]. Nothing in
//! the session waits on a reader: presentation is strictly downstream.

use bevy::prelude::*;

use super::combo::{ComboKind, RuneRejected};
use super::components::{Element, EnemyTier, Sphere};

// ============================================================================
// Inbound
// ============================================================================

/// Socket a rune into the hero.
#[derive(Event, Debug, Clone, Copy)]
pub struct SocketRune {
    pub sphere: Sphere,
}

/// Try to activate a combo from the currently socketed runes.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RequestComboActivation;

/// An enemy is touching the hero and strikes once.
///
/// Sent by contact detection each attack interval; hosts with their own
/// collision layer may send it directly.
#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyReachedHitbox {
    pub enemy: Entity,
}

// ============================================================================
// Outbound
// ============================================================================

#[derive(Event, Debug, Clone, Copy)]
pub struct ComboActivated {
    pub kind: ComboKind,
    /// Hero position at activation
    pub position: Vec2,
    pub mana_spent: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ComboEnded {
    pub kind: ComboKind,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct EnemySpawned {
    pub entity: Entity,
    pub tier: EnemyTier,
    pub position: Vec2,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyDied {
    pub tier: EnemyTier,
    pub position: Vec2,
    /// Element of the killing blow
    pub element: Element,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ProjectileHit {
    pub position: Vec2,
    pub element: Element,
    /// Health actually removed, after overkill
    pub damage: u32,
    pub is_crit: bool,
    /// True for explosion splash damage
    pub splash: bool,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ManaPixelSpawned {
    pub position: Vec2,
    pub amount: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ManaPixelCollected {
    pub amount: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct HeroLeveledUp {
    pub new_level: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct HeroDamaged {
    /// Damage after armor; zero when evaded
    pub amount: u32,
    pub evaded: bool,
    pub remaining_health: f32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct RuneSocketed {
    pub sphere: Sphere,
    pub count: usize,
}

/// A socket or activation request was refused; state is unchanged.
#[derive(Event, Debug, Clone, Copy)]
pub struct RuneRequestRejected {
    pub reason: RuneRejected,
}

/// Register every session event with the app.
pub fn add_session_events(app: &mut App) {
    app.add_event::<SocketRune>()
        .add_event::<RequestComboActivation>()
        .add_event::<EnemyReachedHitbox>()
        .add_event::<ComboActivated>()
        .add_event::<ComboEnded>()
        .add_event::<EnemySpawned>()
        .add_event::<EnemyDied>()
        .add_event::<ProjectileHit>()
        .add_event::<ManaPixelSpawned>()
        .add_event::<ManaPixelCollected>()
        .add_event::<HeroLeveledUp>()
        .add_event::<HeroDamaged>()
        .add_event::<RuneSocketed>()
        .add_event::<RuneRequestRejected>();
}
