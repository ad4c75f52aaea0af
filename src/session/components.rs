//! Session Components and Resources
//!
//! ECS data for a running session: enemies, projectiles and mana pixels, plus
//! the shared game clock, the per-frame host input and the seeded RNG.
//! The hero component lives in [`super::progression`].
//!
//! Positions are stored in each entity's `Transform` (x/y plane, z unused).

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::combo::ComboEffect;
use super::scaling::EnemyStats;

/// Inline capacity of the rune inventory.
pub const SOCKET_CAPACITY: usize = 6;

/// Socketed spheres in the order they were added.
pub type SphereSockets = SmallVec<[Sphere; SOCKET_CAPACITY]>;

// ============================================================================
// Symbols and tags
// ============================================================================

/// A rune that can be socketed into the hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sphere {
    /// Regeneration
    Q,
    /// Movement speed
    W,
    /// Attack speed and damage
    E,
}

impl Sphere {
    pub const ALL: [Sphere; 3] = [Sphere::Q, Sphere::W, Sphere::E];

    /// Parse a rune symbol. Unknown symbols are rejected here, before they
    /// reach the session.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'Q' => Some(Sphere::Q),
            'W' => Some(Sphere::W),
            'E' => Some(Sphere::E),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Sphere::Q => 'Q',
            Sphere::W => 'W',
            Sphere::E => 'E',
        }
    }

    pub fn element(self) -> Element {
        match self {
            Sphere::Q => Element::Frost,
            Sphere::W => Element::Storm,
            Sphere::E => Element::Fire,
        }
    }
}

/// Enemy strength class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyTier {
    Weak,
    Normal,
    Elite,
    Boss,
}

impl EnemyTier {
    pub const ALL: [EnemyTier; 4] = [
        EnemyTier::Weak,
        EnemyTier::Normal,
        EnemyTier::Elite,
        EnemyTier::Boss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnemyTier::Weak => "weak",
            EnemyTier::Normal => "normal",
            EnemyTier::Elite => "elite",
            EnemyTier::Boss => "boss",
        }
    }

    /// Elite and boss enemies take bonus damage from `damage_to_elites`.
    pub fn is_elite(self) -> bool {
        matches!(self, EnemyTier::Elite | EnemyTier::Boss)
    }
}

/// Element of a damage source, used by presentation to pick hit and death effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    #[default]
    Neutral,
    Frost,
    Storm,
    Fire,
    Arcane,
}

// ============================================================================
// Resources
// ============================================================================

/// Seeded random number generator for deterministic sessions.
///
/// Every random decision in the session (spawn placement, tier rolls, crits,
/// evasion) draws from this resource, so a fixed seed and a fixed input
/// sequence always produce the same session.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Uniform f32 in [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Uniform f32 in [min, max)
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    /// Returns true with the given percent chance (0-100).
    pub fn roll_percent(&mut self, chance_pct: f32) -> bool {
        chance_pct > 0.0 && self.random_f32() * 100.0 < chance_pct
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Monotonic game time shared by every timer in the session.
///
/// Advanced once per frame from [`FrameInput::delta_ms`]; never read from the
/// wall clock.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct GameClock {
    pub now_ms: f64,
    pub frame: u64,
}

impl GameClock {
    pub fn advance(&mut self, delta_ms: f32) {
        self.now_ms += delta_ms.max(0.0) as f64;
        self.frame += 1;
    }

    pub fn elapsed_secs(&self) -> f32 {
        (self.now_ms / 1000.0) as f32
    }
}

/// Input written by the host before each frame.
#[derive(Resource, Debug, Clone, Copy)]
pub struct FrameInput {
    /// Length of the frame in milliseconds
    pub delta_ms: f32,
    /// Desired hero movement direction; normalized by the session
    pub movement: Vec2,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            delta_ms: 1000.0 / 60.0,
            movement: Vec2::ZERO,
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Hero displacement during the most recent frame. Zero when standing still.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Heading(pub Vec2);

/// Enemy lifecycle. Dead enemies wait in the death queue until they are
/// reaped (despawned).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeState {
    Alive,
    Dead,
}

/// Result of applying damage to an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// HP actually removed
    pub dealt: u32,
    /// True only on the Alive to Dead transition
    pub killed: bool,
}

#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub tier: EnemyTier,
    /// Hero level the enemy was scaled for
    pub level: u32,
    pub max_health: i32,
    pub health: i32,
    /// Damage per contact strike (one strike per attack interval)
    pub dps: u32,
    pub base_speed: f32,
    /// Fraction of speed removed, within [0, 1]
    pub slow: f32,
    /// Element of the last damage taken
    pub last_element: Element,
    pub life: LifeState,
    /// Game time of the next allowed contact strike
    pub next_strike_ms: f64,
}

impl Enemy {
    pub fn new(tier: EnemyTier, level: u32, stats: EnemyStats) -> Self {
        let health = stats.hp as i32;
        Self {
            tier,
            level,
            max_health: health,
            health,
            dps: stats.dps,
            base_speed: stats.speed,
            slow: 0.0,
            last_element: Element::Neutral,
            life: LifeState::Alive,
            next_strike_ms: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn set_slow(&mut self, slow: f32) {
        self.slow = slow.clamp(0.0, 1.0);
    }

    /// Current movement speed after slow.
    pub fn speed(&self) -> f32 {
        self.base_speed * (1.0 - self.slow)
    }

    /// Apply damage. Dead enemies ignore further hits.
    pub fn take_damage(&mut self, amount: u32, element: Element) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome { dealt: 0, killed: false };
        }

        let dealt = amount.min(self.health.max(0) as u32);
        self.health -= amount as i32;
        self.last_element = element;

        let killed = self.health <= 0;
        if killed {
            self.health = 0;
            self.life = LifeState::Dead;
        }
        DamageOutcome { dealt, killed }
    }
}

/// Hero projectile in flight.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub velocity: Vec2,
    pub damage: u32,
    pub is_crit: bool,
    pub element: Element,
    pub remaining_ms: f32,
    /// Combo effects in force when the projectile was fired
    pub effect: ComboEffect,
    pub bounces_left: u32,
    /// Enemy a bounce originated from; never hit again by this projectile
    pub ignore: Option<Entity>,
}

/// World pickup that grants mana when the hero reaches it.
#[derive(Component, Debug, Clone)]
pub struct ManaPixel {
    pub amount: u32,
    pub pickup_radius: f32,
    pub attraction_radius: f32,
    pub attraction_speed: f32,
    /// Spawn order, used to evict the oldest pixel first
    pub sequence: u64,
}
