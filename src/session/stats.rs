//! Hero stat model: the extended combat stat block and the passive bonuses
//! derived from socketed spheres.

use serde::{Deserialize, Serialize};

use crate::balance::BalanceTable;

use super::components::Sphere;

/// Combat stats consumed by damage resolution.
///
/// Values are percentages where the name says so (`evasion`, `crit_chance`,
/// `life_steal`, `damage_to_elites`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    pub armor: f32,
    pub evasion: f32,
    pub life_steal: f32,
    pub crit_chance: f32,
    /// Extra damage on crit, in percent
    pub crit_damage: f32,
    /// Flat damage added to every attack
    pub bonus_damage: f32,
    /// HP per second, on top of the Q sphere passive
    pub hp_regen: f32,
    pub projectile_count: u32,
    pub projectile_bounces: u32,
    pub projectile_speed: f32,
    pub damage_to_elites: f32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            armor: 0.0,
            evasion: 0.0,
            life_steal: 0.0,
            crit_chance: 0.0,
            crit_damage: 0.0,
            bonus_damage: 0.0,
            hp_regen: 0.0,
            projectile_count: 1,
            projectile_bounces: 0,
            projectile_speed: 400.0,
            damage_to_elites: 0.0,
        }
    }
}

/// Fields of [`StatBlock`] that upgrades and scripted modifiers may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatField {
    Armor,
    Evasion,
    LifeSteal,
    CritChance,
    CritDamage,
    BonusDamage,
    HpRegen,
    ProjectileCount,
    ProjectileBounces,
    ProjectileSpeed,
    DamageToElites,
}

impl StatField {
    pub const ALL: [StatField; 11] = [
        StatField::Armor,
        StatField::Evasion,
        StatField::LifeSteal,
        StatField::CritChance,
        StatField::CritDamage,
        StatField::BonusDamage,
        StatField::HpRegen,
        StatField::ProjectileCount,
        StatField::ProjectileBounces,
        StatField::ProjectileSpeed,
        StatField::DamageToElites,
    ];
}

impl StatBlock {
    pub fn get(&self, field: StatField) -> f32 {
        match field {
            StatField::Armor => self.armor,
            StatField::Evasion => self.evasion,
            StatField::LifeSteal => self.life_steal,
            StatField::CritChance => self.crit_chance,
            StatField::CritDamage => self.crit_damage,
            StatField::BonusDamage => self.bonus_damage,
            StatField::HpRegen => self.hp_regen,
            StatField::ProjectileCount => self.projectile_count as f32,
            StatField::ProjectileBounces => self.projectile_bounces as f32,
            StatField::ProjectileSpeed => self.projectile_speed,
            StatField::DamageToElites => self.damage_to_elites,
        }
    }

    /// Set a field. Count fields are rounded; at least one projectile is
    /// always fired.
    pub fn set(&mut self, field: StatField, value: f32) {
        match field {
            StatField::Armor => self.armor = value,
            StatField::Evasion => self.evasion = value.clamp(0.0, 100.0),
            StatField::LifeSteal => self.life_steal = value.max(0.0),
            StatField::CritChance => self.crit_chance = value.clamp(0.0, 100.0),
            StatField::CritDamage => self.crit_damage = value.max(0.0),
            StatField::BonusDamage => self.bonus_damage = value,
            StatField::HpRegen => self.hp_regen = value,
            StatField::ProjectileCount => self.projectile_count = value.round().max(1.0) as u32,
            StatField::ProjectileBounces => self.projectile_bounces = value.round().max(0.0) as u32,
            StatField::ProjectileSpeed => self.projectile_speed = value.max(0.0),
            StatField::DamageToElites => self.damage_to_elites = value.max(0.0),
        }
    }

    pub fn modify(&mut self, field: StatField, delta: f32) {
        self.set(field, self.get(field) + delta);
    }
}

/// Number of each sphere type in a socket sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SphereCounts {
    pub q: u32,
    pub w: u32,
    pub e: u32,
}

impl SphereCounts {
    pub fn of(spheres: &[Sphere]) -> Self {
        spheres.iter().fold(Self::default(), |mut counts, sphere| {
            match sphere {
                Sphere::Q => counts.q += 1,
                Sphere::W => counts.w += 1,
                Sphere::E => counts.e += 1,
            }
            counts
        })
    }
}

/// Passive bonuses granted by socketed spheres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PassiveBonuses {
    pub health_regen_per_sec: f32,
    pub move_speed_pct: f32,
    pub attack_speed_pct: f32,
    pub attack_damage_flat: u32,
}

/// Derive passive bonuses from the socket sequence and hero level.
///
/// Pure: the same spheres and level always give the same bonuses. Call it
/// after every level or socket change and store the result on the hero.
pub fn recompute_derived_stats(spheres: &[Sphere], level: u32, balance: &BalanceTable) -> PassiveBonuses {
    let counts = SphereCounts::of(spheres);
    PassiveBonuses {
        health_regen_per_sec: counts.q as f32 * balance.regen_per_sphere(level),
        move_speed_pct: counts.w as f32 * balance.move_speed_pct_per_sphere(level),
        attack_speed_pct: counts.e as f32 * balance.attack_speed_pct_per_sphere(level),
        attack_damage_flat: counts.e * balance.damage_flat_per_sphere(level),
    }
}
