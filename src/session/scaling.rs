//! Enemy scaling: tier stats by hero level and the weighted tier roll.
//!
//! HP and DPS grow linearly per level on their own curves; movement speed
//! grows on a third, slower curve. The three are tuned independently.

use crate::balance::BalanceTable;

use super::components::EnemyTier;

/// Stats of a freshly spawned enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub hp: u32,
    pub dps: u32,
    pub speed: f32,
}

/// HP and DPS for a tier at the given hero level, plus movement speed.
pub fn enemy_stats(tier: EnemyTier, level: u32, balance: &BalanceTable) -> EnemyStats {
    let enemies = &balance.enemies;
    let steps = level.saturating_sub(1) as f32;
    let hp = enemies.hp_base.get(tier) * (1.0 + enemies.hp_growth_per_level * steps);
    let dps = enemies.dps_base.get(tier) * (1.0 + enemies.dps_growth_per_level * steps);
    EnemyStats {
        hp: hp.round() as u32,
        dps: dps.round() as u32,
        speed: enemy_speed(tier, level, balance),
    }
}

pub fn enemy_speed(tier: EnemyTier, level: u32, balance: &BalanceTable) -> f32 {
    let enemies = &balance.enemies;
    let steps = level.saturating_sub(1) as f32;
    enemies.speed_base.get(tier) * (1.0 + enemies.speed_growth_per_level * steps)
}

/// Pick a tier with one uniform roll in [0, 1), partitioned by the cumulative
/// weights of the hero's level bracket.
pub fn select_tier(level: u32, roll: f32, balance: &BalanceTable) -> EnemyTier {
    let weights = balance.tier_weights(level);
    let mut cumulative = 0.0;
    let mut fallback = EnemyTier::Weak;

    for tier in EnemyTier::ALL {
        let weight = weights.get(tier);
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        fallback = tier;
        if roll < cumulative {
            return tier;
        }
    }
    // Rounding left the roll just above the total; use the last possible tier.
    fallback
}
