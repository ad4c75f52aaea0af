//! Session Simulation
//!
//! One hero, an endless field of enemies, and the rune combo engine that ties
//! them together. A session is driven entirely by the host:
//!
//! - write [`FrameInput`] (frame delta and movement direction) before each
//!   `app.update()`
//! - send [`events::SocketRune`] and [`events::RequestComboActivation`] for
//!   rune input
//! - read the outbound events in [`events`] for presentation
//!
//! All timers read the synthetic [`GameClock`], and all randomness comes from
//! the seeded [`GameRng`], so a session is reproducible from its seed and its
//! input sequence.
//!
//! ## Modules
//!
//! - `progression`: hero level, mana, sockets and effective stats
//! - `combo`: the rune combo state machine
//! - `scaling`, `spawn`: enemy stats, tier rolls and spawn placement
//! - `combat`: damage formulas, projectiles and contact strikes
//! - `mana`: death payout and the mana pixel lifecycle
//! - `world`: clock, hero movement and enemy pursuit
//! - `systems`: the ordered system phases

use bevy::prelude::*;

pub mod combat;
pub mod combo;
pub mod components;
pub mod events;
pub mod log;
pub mod mana;
pub mod progression;
pub mod scaling;
pub mod spawn;
pub mod stats;
pub mod systems;
pub mod world;

pub use combo::{ComboEffect, ComboKind, ComboState, RuneRejected};
pub use components::{Element, Enemy, EnemyTier, FrameInput, GameClock, GameRng, ManaPixel, Projectile, Sphere};
pub use log::{SessionLog, SessionLogEventType};
pub use progression::Hero;
pub use stats::{PassiveBonuses, StatBlock, StatField};

use crate::balance::BalancePlugin;

/// Plugin that sets up a complete session: resources, events, the hero and
/// every session system.
///
/// `seed` makes the session deterministic; an RNG inserted by the host before
/// the plugin is kept as is.
#[derive(Default)]
pub struct SessionPlugin {
    pub seed: Option<u64>,
}

impl SessionPlugin {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<BalancePlugin>() {
            app.add_plugins(BalancePlugin);
        }

        if !app.world().contains_resource::<GameRng>() {
            let rng = match self.seed {
                Some(seed) => {
                    info!("Using deterministic RNG with seed: {}", seed);
                    GameRng::from_seed(seed)
                }
                None => {
                    info!("Using non-deterministic RNG (no seed provided)");
                    GameRng::from_entropy()
                }
            };
            app.insert_resource(rng);
        }

        app.init_resource::<GameClock>()
            .init_resource::<FrameInput>()
            .init_resource::<ComboState>()
            .init_resource::<spawn::SpawnDirector>()
            .init_resource::<mana::DeathQueue>()
            .init_resource::<mana::ManaEconomy>()
            .init_resource::<SessionLog>();

        events::add_session_events(app);

        systems::configure_session_system_ordering(app);
        systems::add_core_session_systems(app, || true);

        app.add_systems(Startup, (progression::spawn_hero, log_session_start));
    }
}

fn log_session_start(mut log: ResMut<SessionLog>) {
    log.clear();
    log.log(SessionLogEventType::SessionEvent, "Session started".to_string());
}
