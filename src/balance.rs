//! Data-Driven Balance Configuration
//!
//! Every tunable number the session reads lives in one [`BalanceTable`]:
//! hero base stats, per-sphere passive scaling, diminishing-return caps, mana
//! costs, enemy scaling, spawn pacing, combo strengths and mana pickup
//! behaviour. It is defined in `assets/config/balance.ron` and loaded once at
//! startup; the table is never mutated afterwards.
//!
//! `BalanceTable::default()` carries the same numbers as the shipped RON file,
//! so tests and embedders can run a session without touching the filesystem.
//!
//! ## Formulas
//!
//! The closed-form curves (level-up cost, spell cost, passive scaling, soft
//! caps) are methods on the table so gameplay systems and tests share one
//! definition.
//!
//! ## Usage
//! ```ignore
//! fn my_system(balance: Res<BalanceTable>, heroes: Query<&Hero>) {
//!     for hero in heroes.iter() {
//!         let cost = balance.level_up_cost(hero.level());
//!         info!("Next level costs {} mana", cost);
//!     }
//! }
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::session::combo::ComboKind;
use crate::session::components::{EnemyTier, SOCKET_CAPACITY};
use crate::session::stats::StatBlock;

/// Location of the shipped balance file, relative to the working directory.
pub const DEFAULT_BALANCE_PATH: &str = "assets/config/balance.ron";

/// One value per enemy tier.
///
/// Used instead of a map so a missing tier is a parse error rather than a
/// runtime lookup failure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierTable<T> {
    pub weak: T,
    pub normal: T,
    pub elite: T,
    pub boss: T,
}

impl<T: Copy> TierTable<T> {
    pub fn get(&self, tier: EnemyTier) -> T {
        match tier {
            EnemyTier::Weak => self.weak,
            EnemyTier::Normal => self.normal,
            EnemyTier::Elite => self.elite,
            EnemyTier::Boss => self.boss,
        }
    }
}

/// Hero starting values and hard caps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeroBase {
    pub max_health: f32,
    /// Max HP gained on every level-up
    pub health_per_level: f32,
    pub max_mana: u32,
    pub base_damage: u32,
    /// Attacks per second before bonuses (cooldown = 1000 / this)
    pub base_attack_speed: f32,
    /// World units per second before bonuses
    pub base_move_speed: f32,
    pub max_level: u32,
    /// Rune inventory size
    pub max_spheres: usize,
}

/// Per-sphere passive scaling. Each value is granted once per socketed sphere
/// of the matching type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassiveTable {
    /// Q: HP per second per level
    pub regen_per_level: f32,
    /// W: move speed percent, indexed by hero level (entry 0 is level 1)
    pub move_speed_pct_by_level: Vec<f32>,
    /// E: attack speed percent per level
    pub attack_speed_pct_per_level: f32,
    /// E: flat damage per level
    pub damage_flat_per_level: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiminishingReturns {
    /// Hard cap on the attack speed multiplier
    pub max_attack_speed_multiplier: f32,
    /// Move speed bonus percent that is granted at full value
    pub move_speed_soft_cap: f32,
    /// Fraction of the bonus above the soft cap that still applies
    pub move_speed_excess_efficiency: f32,
}

/// Base mana cost for each combo before level scaling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComboCosts {
    pub ice_spikes: u32,
    pub berserker_speed: u32,
    pub explosive_shot: u32,
    pub universal_mode: u32,
    pub standard_buff: u32,
}

impl ComboCosts {
    pub fn get(&self, kind: ComboKind) -> u32 {
        match kind {
            ComboKind::IceSpikes => self.ice_spikes,
            ComboKind::BerserkerSpeed => self.berserker_speed,
            ComboKind::ExplosiveShot => self.explosive_shot,
            ComboKind::UniversalMode => self.universal_mode,
            ComboKind::StandardBuff => self.standard_buff,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManaCosts {
    /// level-up cost = round(level_up_base * level ^ level_up_exponent)
    pub level_up_base: f32,
    pub level_up_exponent: f32,
    pub spell_base_cost: ComboCosts,
    /// Spell cost grows by this fraction per level above 1
    pub spell_cost_growth: f32,
    pub mana_on_kill: TierTable<u32>,
}

/// Enemy base values and per-level growth.
///
/// HP/DPS growth and movement speed growth are independent curves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyScaling {
    pub hp_base: TierTable<f32>,
    pub dps_base: TierTable<f32>,
    pub hp_growth_per_level: f32,
    pub dps_growth_per_level: f32,
    pub speed_base: TierTable<f32>,
    pub speed_growth_per_level: f32,
    /// Time between contact strikes on the hero
    pub attack_interval_ms: f32,
    /// Distance at which an enemy reaches the hero's hitbox
    pub contact_radius: f32,
}

/// Tier weights for all hero levels up to and including `max_level`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierBracket {
    pub max_level: u32,
    pub weights: TierTable<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnTuning {
    pub base_interval_secs: f32,
    /// interval = base * decay ^ (elapsed / decay_period)
    pub interval_decay: f32,
    pub decay_period_secs: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Chance a spawn is placed ahead of the hero's movement
    pub directional_chance: f32,
    /// Maximum deviation from the heading, either side
    pub directional_deviation_deg: f32,
    /// Sorted by `max_level`
    pub tier_brackets: Vec<TierBracket>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComboTuning {
    pub duration_ms: f32,
    /// IceSpikes slow applied to every enemy
    pub ice_slow: f32,
    pub berserker_cooldown_multiplier: f32,
    pub berserker_projectile_speed_multiplier: f32,
    /// UniversalMode damage, attack speed and projectile speed bonus
    pub universal_bonus: f32,
    pub standard_damage_bonus: f32,
    pub explosion_radius: f32,
    /// Splash damage as a fraction of the direct hit
    pub explosion_damage_fraction: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileTuning {
    pub lifetime_ms: f32,
    pub hit_radius: f32,
    /// No shot is fired at targets closer than this
    pub min_target_distance: f32,
    /// Angle between projectiles of a multi-shot volley
    pub spread_deg: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManaPixelTuning {
    pub pickup_radius: f32,
    pub attraction_radius: f32,
    pub attraction_speed: f32,
    /// Oldest pixel is evicted when a new one would exceed this
    pub max_pixels: usize,
    /// Pixels farther than this from the hero expire
    pub cleanup_distance: f32,
    /// Delay between an enemy dying and its pixel appearing
    pub spawn_delay_ms: f32,
}

/// Complete balance data, loaded from RON.
///
/// Inserted as a resource; access via `Res<BalanceTable>` in systems.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceTable {
    pub hero: HeroBase,
    pub passives: PassiveTable,
    pub caps: DiminishingReturns,
    pub mana: ManaCosts,
    pub enemies: EnemyScaling,
    pub spawning: SpawnTuning,
    pub combos: ComboTuning,
    pub projectiles: ProjectileTuning,
    pub mana_pixels: ManaPixelTuning,
    /// Extended combat stats the hero starts a session with
    pub starting_stats: StatBlock,
}

impl Default for BalanceTable {
    fn default() -> Self {
        Self {
            hero: HeroBase {
                max_health: 100.0,
                health_per_level: 20.0,
                max_mana: 100,
                base_damage: 10,
                base_attack_speed: 1.0,
                base_move_speed: 100.0,
                max_level: 10,
                max_spheres: 6,
            },
            passives: PassiveTable {
                regen_per_level: 1.0,
                move_speed_pct_by_level: vec![0.6, 1.2, 1.8, 2.4, 3.0, 3.6, 4.2, 4.8, 5.4, 6.0],
                attack_speed_pct_per_level: 5.0,
                damage_flat_per_level: 2,
            },
            caps: DiminishingReturns {
                max_attack_speed_multiplier: 2.0,
                move_speed_soft_cap: 40.0,
                move_speed_excess_efficiency: 0.5,
            },
            mana: ManaCosts {
                level_up_base: 60.0,
                level_up_exponent: 1.55,
                spell_base_cost: ComboCosts {
                    ice_spikes: 40,
                    berserker_speed: 40,
                    explosive_shot: 50,
                    universal_mode: 60,
                    standard_buff: 30,
                },
                spell_cost_growth: 0.12,
                mana_on_kill: TierTable { weak: 5, normal: 10, elite: 20, boss: 60 },
            },
            enemies: EnemyScaling {
                hp_base: TierTable { weak: 30.0, normal: 60.0, elite: 150.0, boss: 1200.0 },
                dps_base: TierTable { weak: 5.0, normal: 10.0, elite: 18.0, boss: 45.0 },
                hp_growth_per_level: 0.35,
                dps_growth_per_level: 0.22,
                speed_base: TierTable { weak: 30.0, normal: 40.0, elite: 50.0, boss: 25.0 },
                speed_growth_per_level: 0.05,
                attack_interval_ms: 1000.0,
                contact_radius: 30.0,
            },
            spawning: SpawnTuning {
                base_interval_secs: 2.5,
                interval_decay: 0.95,
                decay_period_secs: 30.0,
                min_distance: 500.0,
                max_distance: 650.0,
                directional_chance: 0.7,
                directional_deviation_deg: 30.0,
                tier_brackets: vec![
                    TierBracket {
                        max_level: 2,
                        weights: TierTable { weak: 1.0, normal: 0.0, elite: 0.0, boss: 0.0 },
                    },
                    TierBracket {
                        max_level: 4,
                        weights: TierTable { weak: 0.8, normal: 0.2, elite: 0.0, boss: 0.0 },
                    },
                    TierBracket {
                        max_level: 6,
                        weights: TierTable { weak: 0.6, normal: 0.35, elite: 0.05, boss: 0.0 },
                    },
                    TierBracket {
                        max_level: 8,
                        weights: TierTable { weak: 0.4, normal: 0.45, elite: 0.15, boss: 0.0 },
                    },
                    TierBracket {
                        max_level: 10,
                        weights: TierTable { weak: 0.2, normal: 0.5, elite: 0.25, boss: 0.05 },
                    },
                ],
            },
            combos: ComboTuning {
                duration_ms: 6000.0,
                ice_slow: 0.4,
                berserker_cooldown_multiplier: 0.5,
                berserker_projectile_speed_multiplier: 1.5,
                universal_bonus: 0.15,
                standard_damage_bonus: 0.2,
                explosion_radius: 100.0,
                explosion_damage_fraction: 0.5,
            },
            projectiles: ProjectileTuning {
                lifetime_ms: 3000.0,
                hit_radius: 20.0,
                min_target_distance: 10.0,
                spread_deg: 10.0,
            },
            mana_pixels: ManaPixelTuning {
                pickup_radius: 20.0,
                attraction_radius: 60.0,
                attraction_speed: 100.0,
                max_pixels: 50,
                cleanup_distance: 200.0,
                spawn_delay_ms: 500.0,
            },
            starting_stats: StatBlock::default(),
        }
    }
}

impl BalanceTable {
    /// Mana needed to advance from `level` to `level + 1`.
    pub fn level_up_cost(&self, level: u32) -> u32 {
        let cost = self.mana.level_up_base * (level as f32).powf(self.mana.level_up_exponent);
        cost.round() as u32
    }

    /// Mana cost of activating `kind` at the given hero level.
    pub fn spell_cost(&self, kind: ComboKind, level: u32) -> u32 {
        let base = self.mana.spell_base_cost.get(kind) as f32;
        let growth = 1.0 + self.mana.spell_cost_growth * level.saturating_sub(1) as f32;
        (base * growth).round() as u32
    }

    pub fn mana_on_kill(&self, tier: EnemyTier) -> u32 {
        self.mana.mana_on_kill.get(tier)
    }

    /// HP per second granted by one Q sphere.
    pub fn regen_per_sphere(&self, level: u32) -> f32 {
        self.passives.regen_per_level * level as f32
    }

    /// Move speed percent granted by one W sphere.
    pub fn move_speed_pct_per_sphere(&self, level: u32) -> f32 {
        let table = &self.passives.move_speed_pct_by_level;
        if table.is_empty() {
            return 0.0;
        }
        let index = (level.max(1) as usize - 1).min(table.len() - 1);
        table[index]
    }

    /// Attack speed percent granted by one E sphere.
    pub fn attack_speed_pct_per_sphere(&self, level: u32) -> f32 {
        self.passives.attack_speed_pct_per_level * level as f32
    }

    /// Flat damage granted by one E sphere.
    pub fn damage_flat_per_sphere(&self, level: u32) -> u32 {
        self.passives.damage_flat_per_level * level
    }

    /// Applies the move speed soft cap: linear up to the cap, reduced above it.
    pub fn effective_move_speed_bonus(&self, bonus_pct: f32) -> f32 {
        let cap = self.caps.move_speed_soft_cap;
        let linear = bonus_pct.min(cap);
        let excess = (bonus_pct - cap).max(0.0);
        linear + excess * self.caps.move_speed_excess_efficiency
    }

    /// Attack speed multiplier for a percent bonus, clamped to the hard cap.
    pub fn attack_speed_multiplier(&self, bonus_pct: f32) -> f32 {
        self.clamp_attack_speed_multiplier(1.0 + bonus_pct / 100.0)
    }

    pub fn clamp_attack_speed_multiplier(&self, requested: f32) -> f32 {
        requested.min(self.caps.max_attack_speed_multiplier)
    }

    /// Base cooldown between auto-attacks, before buffs and bonuses.
    pub fn base_attack_cooldown_ms(&self) -> f32 {
        1000.0 / self.hero.base_attack_speed
    }

    /// Tier weights for the bracket containing `level`.
    ///
    /// Levels above the last bracket use the last bracket.
    pub fn tier_weights(&self, level: u32) -> TierTable<f32> {
        let brackets = &self.spawning.tier_brackets;
        brackets
            .iter()
            .find(|bracket| level <= bracket.max_level)
            .or_else(|| brackets.last())
            .map(|bracket| bracket.weights)
            .unwrap_or(TierTable { weak: 1.0, normal: 0.0, elite: 0.0, boss: 0.0 })
    }

    /// Check the table for values the session cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        let hero = &self.hero;
        if hero.max_health <= 0.0 || hero.base_attack_speed <= 0.0 || hero.base_move_speed <= 0.0 {
            return Err("hero base health, attack speed and move speed must be positive".to_string());
        }
        if hero.max_level == 0 {
            return Err("hero.max_level must be at least 1".to_string());
        }
        if hero.max_spheres == 0 || hero.max_spheres > SOCKET_CAPACITY {
            return Err(format!(
                "hero.max_spheres must be between 1 and {}, got {}",
                SOCKET_CAPACITY, hero.max_spheres
            ));
        }
        if self.passives.move_speed_pct_by_level.len() != hero.max_level as usize {
            return Err(format!(
                "passives.move_speed_pct_by_level needs {} entries (one per level), got {}",
                hero.max_level,
                self.passives.move_speed_pct_by_level.len()
            ));
        }
        if self.caps.max_attack_speed_multiplier < 1.0 {
            return Err("caps.max_attack_speed_multiplier must be at least 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.combos.ice_slow) {
            return Err(format!("combos.ice_slow must be within [0, 1], got {}", self.combos.ice_slow));
        }
        if self.combos.duration_ms <= 0.0 {
            return Err("combos.duration_ms must be positive".to_string());
        }
        if self.spawning.min_distance > self.spawning.max_distance {
            return Err("spawning.min_distance must not exceed spawning.max_distance".to_string());
        }
        if self.spawning.base_interval_secs <= 0.0 || self.spawning.decay_period_secs <= 0.0 {
            return Err("spawning intervals must be positive".to_string());
        }
        self.validate_tier_brackets()
    }

    fn validate_tier_brackets(&self) -> Result<(), String> {
        let brackets = &self.spawning.tier_brackets;
        if brackets.is_empty() {
            return Err("spawning.tier_brackets must not be empty".to_string());
        }

        let mut previous_max = 0;
        for bracket in brackets {
            if bracket.max_level <= previous_max {
                return Err(format!(
                    "spawning.tier_brackets must be sorted by max_level (found {} after {})",
                    bracket.max_level, previous_max
                ));
            }
            previous_max = bracket.max_level;

            let w = bracket.weights;
            if [w.weak, w.normal, w.elite, w.boss].iter().any(|weight| *weight < 0.0) {
                return Err(format!("bracket up to level {} has a negative weight", bracket.max_level));
            }
            let sum = w.weak + w.normal + w.elite + w.boss;
            if (sum - 1.0).abs() > 0.001 {
                return Err(format!(
                    "tier weights for levels up to {} sum to {:.3}, expected 1.0",
                    bracket.max_level, sum
                ));
            }
        }

        if previous_max < self.hero.max_level {
            return Err(format!(
                "spawning.tier_brackets only cover levels up to {}, hero.max_level is {}",
                previous_max, self.hero.max_level
            ));
        }
        Ok(())
    }
}

/// Load and validate a balance table from a RON file.
pub fn load_balance_table(path: &Path) -> Result<BalanceTable, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let table: BalanceTable = ron::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    table
        .validate()
        .map_err(|e| format!("Invalid balance table in {}: {}", path.display(), e))?;

    info!("Loaded balance table from {}", path.display());
    Ok(table)
}

/// Bevy plugin that makes a [`BalanceTable`] available to the session.
///
/// Keeps a table already inserted by the host (for example one loaded from a
/// custom path); otherwise falls back to the built-in values.
pub struct BalancePlugin;

impl Plugin for BalancePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<BalanceTable>() {
            app.insert_resource(BalanceTable::default());
        }
    }
}
