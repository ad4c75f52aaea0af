//! Rune Combo State Machine
//!
//! Three socketed runes can be spent on a timed combo:
//!
//! ```text
//! Idle --(exactly 3 sockets, mana paid)--> Active(kind, ends_at) --(now >= ends_at)--> Idle
//! ```
//!
//! The sorted three-rune key picks the combo: `QQQ` IceSpikes, `WWW`
//! BerserkerSpeed, `EEE` ExplosiveShot, `EQW` UniversalMode, anything else
//! StandardBuff. A failed payment leaves the sockets untouched; a successful
//! activation clears them.
//!
//! Systems that react to a combo never read the state directly. They take the
//! [`ComboEffect`] projection, which is all-neutral while idle.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::balance::BalanceTable;

use super::components::{Element, GameClock, Sphere};
use super::events::{
    ComboActivated, ComboEnded, RequestComboActivation, RuneRequestRejected, RuneSocketed, SocketRune,
};
use super::progression::Hero;

/// Number of runes consumed by one activation.
pub const COMBO_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComboKind {
    IceSpikes,
    BerserkerSpeed,
    ExplosiveShot,
    UniversalMode,
    StandardBuff,
}

impl ComboKind {
    pub const ALL: [ComboKind; 5] = [
        ComboKind::IceSpikes,
        ComboKind::BerserkerSpeed,
        ComboKind::ExplosiveShot,
        ComboKind::UniversalMode,
        ComboKind::StandardBuff,
    ];

    /// Resolve a sorted rune key such as `"EQW"`.
    pub fn from_key(key: &str) -> Self {
        match key {
            "QQQ" => ComboKind::IceSpikes,
            "WWW" => ComboKind::BerserkerSpeed,
            "EEE" => ComboKind::ExplosiveShot,
            "EQW" => ComboKind::UniversalMode,
            _ => ComboKind::StandardBuff,
        }
    }

    pub fn from_spheres(spheres: &[Sphere]) -> Self {
        Self::from_key(&combo_key(spheres))
    }

    pub fn name(self) -> &'static str {
        match self {
            ComboKind::IceSpikes => "Ice Spikes",
            ComboKind::BerserkerSpeed => "Berserker Speed",
            ComboKind::ExplosiveShot => "Explosive Shot",
            ComboKind::UniversalMode => "Universal Mode",
            ComboKind::StandardBuff => "Standard Buff",
        }
    }

    /// Element of attacks made under this combo. StandardBuff has none.
    pub fn element(self) -> Option<Element> {
        match self {
            ComboKind::IceSpikes => Some(Element::Frost),
            ComboKind::BerserkerSpeed => Some(Element::Storm),
            ComboKind::ExplosiveShot => Some(Element::Fire),
            ComboKind::UniversalMode => Some(Element::Arcane),
            ComboKind::StandardBuff => None,
        }
    }
}

/// Rune symbols sorted alphabetically, e.g. `[W, Q, E]` becomes `"EQW"`.
pub fn combo_key(spheres: &[Sphere]) -> String {
    let mut symbols: Vec<char> = spheres.iter().map(|sphere| sphere.symbol()).collect();
    symbols.sort_unstable();
    symbols.into_iter().collect()
}

/// Why a socket or activation request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuneRejected {
    SocketsFull { capacity: usize },
    WrongSocketCount { have: usize },
    InsufficientMana { cost: u32, available: u32 },
}

impl fmt::Display for RuneRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuneRejected::SocketsFull { capacity } => {
                write!(f, "all {} sockets are filled", capacity)
            }
            RuneRejected::WrongSocketCount { have } => {
                write!(f, "activation needs exactly {} runes, {} socketed", COMBO_SIZE, have)
            }
            RuneRejected::InsufficientMana { cost, available } => {
                write!(f, "combo costs {} mana, {} available", cost, available)
            }
        }
    }
}

/// Read-only view of what the active combo does to the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboEffect {
    pub kind: Option<ComboKind>,
    /// Slow applied to every enemy, within [0, 1]
    pub enemy_slow: f32,
    /// Projectiles splash on impact
    pub explosive: bool,
    pub projectile_speed_multiplier: f32,
}

impl ComboEffect {
    pub const NONE: ComboEffect = ComboEffect {
        kind: None,
        enemy_slow: 0.0,
        explosive: false,
        projectile_speed_multiplier: 1.0,
    };

    pub fn for_kind(kind: Option<ComboKind>, balance: &BalanceTable) -> Self {
        let combos = &balance.combos;
        match kind {
            None => Self::NONE,
            Some(ComboKind::IceSpikes) => Self {
                kind,
                enemy_slow: combos.ice_slow,
                ..Self::NONE
            },
            Some(ComboKind::BerserkerSpeed) => Self {
                kind,
                projectile_speed_multiplier: combos.berserker_projectile_speed_multiplier,
                ..Self::NONE
            },
            Some(ComboKind::ExplosiveShot) => Self {
                kind,
                explosive: true,
                ..Self::NONE
            },
            Some(ComboKind::UniversalMode) => Self {
                kind,
                projectile_speed_multiplier: 1.0 + combos.universal_bonus,
                ..Self::NONE
            },
            Some(ComboKind::StandardBuff) => Self { kind, ..Self::NONE },
        }
    }
}

impl Default for ComboEffect {
    fn default() -> Self {
        Self::NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveCombo {
    pub kind: ComboKind,
    pub started_at_ms: f64,
    pub ends_at_ms: f64,
}

/// The combo state machine. `None` is Idle.
#[derive(Resource, Debug, Default)]
pub struct ComboState {
    active: Option<ActiveCombo>,
    /// Successful activations this session
    pub activations: u32,
}

impl ComboState {
    pub fn active(&self) -> Option<ActiveCombo> {
        self.active
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn effect(&self, balance: &BalanceTable) -> ComboEffect {
        ComboEffect::for_kind(self.active.map(|combo| combo.kind), balance)
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        self.active
            .map(|combo| (combo.ends_at_ms - now_ms).max(0.0))
            .unwrap_or(0.0)
    }

    /// Spend the three socketed runes on a combo.
    ///
    /// Requires exactly three runes and enough mana. On success the sockets
    /// are cleared, the hero receives the buff and the timer starts; an
    /// already active combo is replaced.
    pub fn activate(&mut self, hero: &mut Hero, now_ms: f64, balance: &BalanceTable) -> Result<ComboKind, RuneRejected> {
        let have = hero.spheres().len();
        if have != COMBO_SIZE {
            return Err(RuneRejected::WrongSocketCount { have });
        }

        let kind = ComboKind::from_spheres(hero.spheres());
        let cost = balance.spell_cost(kind, hero.level());
        if !hero.use_mana_for_spell(kind, balance) {
            return Err(RuneRejected::InsufficientMana {
                cost,
                available: hero.mana,
            });
        }

        hero.clear_spheres(balance);
        hero.combo_buff = Some(kind);
        self.active = Some(ActiveCombo {
            kind,
            started_at_ms: now_ms,
            ends_at_ms: now_ms + balance.combos.duration_ms as f64,
        });
        self.activations += 1;
        Ok(kind)
    }

    /// End the active combo once its timer has run out, removing the hero's
    /// buff. Returns the combo that ended.
    pub fn expire(&mut self, hero: &mut Hero, now_ms: f64) -> Option<ComboKind> {
        let combo = self.active?;
        if now_ms < combo.ends_at_ms {
            return None;
        }
        self.active = None;
        if hero.combo_buff == Some(combo.kind) {
            hero.combo_buff = None;
        }
        Some(combo.kind)
    }
}

/// End the combo when its timer runs out.
pub fn expire_combo(
    clock: Res<GameClock>,
    mut combo_state: ResMut<ComboState>,
    mut heroes: Query<&mut Hero>,
    mut ended_events: EventWriter<ComboEnded>,
) {
    let Ok(mut hero) = heroes.get_single_mut() else {
        return;
    };
    if let Some(kind) = combo_state.expire(&mut hero, clock.now_ms) {
        info!("{} ended at {:.0}ms", kind.name(), clock.now_ms);
        ended_events.send(ComboEnded { kind });
    }
}

/// Apply socket and activation requests from the host, in that order.
#[allow(clippy::too_many_arguments)]
pub fn process_rune_input(
    clock: Res<GameClock>,
    balance: Res<BalanceTable>,
    mut combo_state: ResMut<ComboState>,
    mut socket_requests: EventReader<SocketRune>,
    mut activation_requests: EventReader<RequestComboActivation>,
    mut heroes: Query<(&mut Hero, &Transform)>,
    mut socketed_events: EventWriter<RuneSocketed>,
    mut rejected_events: EventWriter<RuneRequestRejected>,
    mut activated_events: EventWriter<ComboActivated>,
) {
    let Ok((mut hero, transform)) = heroes.get_single_mut() else {
        return;
    };

    for request in socket_requests.read() {
        match hero.socket_sphere(request.sphere, &balance) {
            Ok(count) => {
                socketed_events.send(RuneSocketed {
                    sphere: request.sphere,
                    count,
                });
            }
            Err(reason) => {
                debug!("Rune {} rejected: {}", request.sphere.symbol(), reason);
                rejected_events.send(RuneRequestRejected { reason });
            }
        }
    }

    for _ in activation_requests.read() {
        let mana_before = hero.mana;
        match combo_state.activate(&mut hero, clock.now_ms, &balance) {
            Ok(kind) => {
                let mana_spent = mana_before - hero.mana;
                info!(
                    "{} activated at {:.0}ms for {} mana",
                    kind.name(),
                    clock.now_ms,
                    mana_spent
                );
                activated_events.send(ComboActivated {
                    kind,
                    position: transform.translation.truncate(),
                    mana_spent,
                });
            }
            Err(reason) => {
                debug!("Combo activation rejected: {}", reason);
                rejected_events.send(RuneRequestRejected { reason });
            }
        }
    }
}
