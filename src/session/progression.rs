//! Hero Progression
//!
//! The [`Hero`] component and its rules for leveling, mana, socketed spheres,
//! and the effective stats other systems read.
//!
//! ## Invariants
//!
//! - `passives` is always `recompute_derived_stats(spheres, level)`. Every
//!   method that changes the sockets or the level refreshes it; nothing else
//!   writes it.
//! - `add_mana` performs at most one level-up per call, even when the gain
//!   would cover several thresholds.
//! - A combo buff changes the base damage and base cooldown only while it is
//!   active. Removing the buff restores the unbuffed values because they are
//!   never overwritten.

use bevy::prelude::*;

use crate::balance::BalanceTable;

use super::combat::{apply_armor, apply_crit};
use super::combo::{ComboKind, RuneRejected};
use super::components::{Element, FrameInput, GameRng, Heading, Sphere, SphereSockets};
use super::stats::{recompute_derived_stats, PassiveBonuses, StatBlock};

/// Result of an enemy strike on the hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    Evaded,
    Taken(u32),
}

/// The player character.
#[derive(Component, Debug, Clone)]
pub struct Hero {
    level: u32,
    pub health: f32,
    pub max_health: f32,
    pub mana: u32,
    pub max_mana: u32,
    /// Base damage before combo buffs and bonuses
    pub base_damage: u32,
    /// Cooldown between auto-attacks before combo buffs and attack speed
    pub base_attack_cooldown_ms: f32,
    pub base_move_speed: f32,
    spheres: SphereSockets,
    passives: PassiveBonuses,
    pub stats: StatBlock,
    /// Buff of the active combo, if any
    pub combo_buff: Option<ComboKind>,
    /// Game time at which the next auto-attack may fire
    pub next_attack_ms: f64,
    pub damage_dealt: u64,
    pub damage_taken: f32,
}

impl Hero {
    pub fn new(balance: &BalanceTable) -> Self {
        let base = &balance.hero;
        Self {
            level: 1,
            health: base.max_health,
            max_health: base.max_health,
            mana: 0,
            max_mana: base.max_mana,
            base_damage: base.base_damage,
            base_attack_cooldown_ms: balance.base_attack_cooldown_ms(),
            base_move_speed: base.base_move_speed,
            spheres: SphereSockets::new(),
            passives: PassiveBonuses::default(),
            stats: balance.starting_stats.clone(),
            combo_buff: None,
            next_attack_ms: 0.0,
            damage_dealt: 0,
            damage_taken: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn passives(&self) -> PassiveBonuses {
        self.passives
    }

    fn refresh_passives(&mut self, balance: &BalanceTable) {
        self.passives = recompute_derived_stats(&self.spheres, self.level, balance);
    }

    // ------------------------------------------------------------------------
    // Mana and leveling
    // ------------------------------------------------------------------------

    /// Add mana, clamped to the maximum, then check the level-up threshold
    /// once. Returns the new level if the hero leveled up.
    pub fn add_mana(&mut self, amount: u32, balance: &BalanceTable) -> Option<u32> {
        self.mana = self.mana.saturating_add(amount).min(self.max_mana);

        // Single check per call: a large gain never skips a level.
        let cost = balance.level_up_cost(self.level);
        if self.mana >= cost && self.level < balance.hero.max_level {
            self.mana -= cost;
            if self.level_up(balance) {
                return Some(self.level);
            }
        }
        None
    }

    /// Advance one level: more max HP, full heal, mana emptied.
    /// Returns false (and changes nothing) at the level cap.
    pub fn level_up(&mut self, balance: &BalanceTable) -> bool {
        if self.level >= balance.hero.max_level {
            return false;
        }
        self.level += 1;
        self.max_health += balance.hero.health_per_level;
        self.health = self.max_health;
        self.mana = 0;
        self.refresh_passives(balance);
        true
    }

    /// Pay the mana cost of a combo. Returns false without spending anything
    /// if the hero cannot afford it.
    pub fn use_mana_for_spell(&mut self, kind: ComboKind, balance: &BalanceTable) -> bool {
        let cost = balance.spell_cost(kind, self.level);
        if self.mana < cost {
            return false;
        }
        self.mana -= cost;
        true
    }

    // ------------------------------------------------------------------------
    // Sockets
    // ------------------------------------------------------------------------

    /// Append a sphere to the socket sequence. Returns the new socket count.
    pub fn socket_sphere(&mut self, sphere: Sphere, balance: &BalanceTable) -> Result<usize, RuneRejected> {
        if self.spheres.len() >= balance.hero.max_spheres {
            return Err(RuneRejected::SocketsFull {
                capacity: balance.hero.max_spheres,
            });
        }
        self.spheres.push(sphere);
        self.refresh_passives(balance);
        Ok(self.spheres.len())
    }

    pub fn clear_spheres(&mut self, balance: &BalanceTable) {
        self.spheres.clear();
        self.refresh_passives(balance);
    }

    // ------------------------------------------------------------------------
    // Effective stats
    // ------------------------------------------------------------------------

    pub fn effective_move_speed(&self, balance: &BalanceTable) -> f32 {
        let bonus = balance.effective_move_speed_bonus(self.passives.move_speed_pct);
        self.base_move_speed * (1.0 + bonus / 100.0)
    }

    /// Base cooldown with the active combo buff applied.
    pub fn buffed_attack_cooldown_ms(&self, balance: &BalanceTable) -> f32 {
        let combos = &balance.combos;
        match self.combo_buff {
            Some(ComboKind::BerserkerSpeed) => {
                self.base_attack_cooldown_ms * combos.berserker_cooldown_multiplier
            }
            Some(ComboKind::UniversalMode) => {
                self.base_attack_cooldown_ms * (1.0 - combos.universal_bonus)
            }
            _ => self.base_attack_cooldown_ms,
        }
    }

    pub fn effective_attack_cooldown_ms(&self, balance: &BalanceTable) -> f32 {
        let multiplier = balance.attack_speed_multiplier(self.passives.attack_speed_pct);
        self.buffed_attack_cooldown_ms(balance) / multiplier
    }

    /// Base damage with the active combo buff applied, floored.
    pub fn buffed_base_damage(&self, balance: &BalanceTable) -> u32 {
        let bonus = match self.combo_buff {
            Some(ComboKind::UniversalMode) => balance.combos.universal_bonus,
            Some(ComboKind::StandardBuff) => balance.combos.standard_damage_bonus,
            _ => return self.base_damage,
        };
        (self.base_damage as f32 * (1.0 + bonus) + 1e-4).floor() as u32
    }

    /// Damage of one attack before crit: buffed base, E sphere flat bonus and
    /// the flat stat bonus. Never below 1.
    pub fn attack_damage(&self, balance: &BalanceTable) -> u32 {
        let total = self.buffed_base_damage(balance) as f32
            + self.passives.attack_damage_flat as f32
            + self.stats.bonus_damage;
        total.max(1.0) as u32
    }

    /// Roll one attack's damage. Returns the damage and whether it crit.
    pub fn roll_damage(&self, balance: &BalanceTable, rng: &mut GameRng) -> (u32, bool) {
        let damage = self.attack_damage(balance);
        if rng.roll_percent(self.stats.crit_chance) {
            (apply_crit(damage, self.stats.crit_damage), true)
        } else {
            (damage, false)
        }
    }

    /// Element carried by the hero's attacks: the active combo's, else the
    /// last socketed sphere's.
    pub fn attack_element(&self) -> Element {
        self.combo_buff
            .and_then(ComboKind::element)
            .or_else(|| self.spheres.last().map(|sphere| sphere.element()))
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------------

    /// Heal up to max HP. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Resolve an incoming strike: evasion roll, then armor.
    pub fn receive_hit(&mut self, raw_damage: u32, rng: &mut GameRng) -> HitOutcome {
        if rng.roll_percent(self.stats.evasion) {
            return HitOutcome::Evaded;
        }
        let damage = apply_armor(raw_damage, self.stats.armor);
        self.health = (self.health - damage as f32).max(0.0);
        self.damage_taken += damage as f32;
        HitOutcome::Taken(damage)
    }

    /// HP per second from Q spheres plus the regen stat.
    pub fn regen_per_sec(&self) -> f32 {
        self.passives.health_regen_per_sec + self.stats.hp_regen
    }

    pub fn regenerate(&mut self, delta_secs: f32) {
        let rate = self.regen_per_sec();
        if rate > 0.0 {
            self.heal(rate * delta_secs);
        }
    }
}

/// Spawn the hero at the world origin.
pub fn spawn_hero(mut commands: Commands, balance: Res<BalanceTable>) {
    let hero = Hero::new(&balance);
    info!(
        "Hero spawned: {} HP, {} damage, {:.0}ms attack cooldown",
        hero.max_health, hero.base_damage, hero.base_attack_cooldown_ms
    );
    commands.spawn((Transform::default(), hero, Heading::default()));
}

/// Apply passive health regeneration for this frame.
pub fn regenerate_health(input: Res<FrameInput>, mut heroes: Query<&mut Hero>) {
    let delta_secs = input.delta_ms / 1000.0;
    for mut hero in heroes.iter_mut() {
        hero.regenerate(delta_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> (Hero, BalanceTable) {
        let balance = BalanceTable::default();
        (Hero::new(&balance), balance)
    }

    #[test]
    fn test_new_hero_matches_balance() {
        let (hero, _) = hero();
        assert_eq!(hero.level(), 1);
        assert_eq!(hero.health, 100.0);
        assert_eq!(hero.max_mana, 100);
        assert_eq!(hero.base_attack_cooldown_ms, 1000.0);
        assert!(hero.spheres().is_empty());
    }

    #[test]
    fn test_add_mana_clamps_to_max() {
        let (mut hero, mut balance) = hero();
        // Push the threshold out of reach so only clamping is observed
        balance.mana.level_up_base = 1000.0;
        assert_eq!(hero.add_mana(70, &balance), None);
        assert_eq!(hero.add_mana(70, &balance), None);
        assert_eq!(hero.mana, 100);
    }

    #[test]
    fn test_add_mana_levels_up_at_threshold() {
        let (mut hero, balance) = hero();
        assert_eq!(hero.add_mana(59, &balance), None);
        assert_eq!(hero.add_mana(1, &balance), Some(2));
        assert_eq!(hero.level(), 2);
        assert_eq!(hero.mana, 0, "mana resets on level-up");
        assert_eq!(hero.max_health, 120.0);
        assert_eq!(hero.health, 120.0);
    }

    #[test]
    fn test_add_mana_does_not_cascade() {
        let (mut hero, mut balance) = hero();
        balance.hero.max_mana = 10_000;
        hero.max_mana = 10_000;
        // Enough for level 1 -> 2 (60) and 2 -> 3 (176) combined
        assert_eq!(hero.add_mana(500, &balance), Some(2));
        assert_eq!(hero.level(), 2, "only one level per addition");
    }

    #[test]
    fn test_level_up_stops_at_cap() {
        let (mut hero, balance) = hero();
        for _ in 1..10 {
            assert!(hero.level_up(&balance));
        }
        assert_eq!(hero.level(), 10);
        let max_health = hero.max_health;
        assert!(!hero.level_up(&balance));
        assert_eq!(hero.level(), 10);
        assert_eq!(hero.max_health, max_health);
    }

    #[test]
    fn test_spell_cost_payment() {
        let (mut hero, balance) = hero();
        hero.mana = 39;
        assert!(!hero.use_mana_for_spell(ComboKind::IceSpikes, &balance));
        assert_eq!(hero.mana, 39, "failed payment must not spend mana");
        hero.mana = 45;
        assert!(hero.use_mana_for_spell(ComboKind::IceSpikes, &balance));
        assert_eq!(hero.mana, 5);
    }

    #[test]
    fn test_socket_capacity() {
        let (mut hero, balance) = hero();
        for i in 0..6 {
            assert_eq!(hero.socket_sphere(Sphere::W, &balance), Ok(i + 1));
        }
        assert_eq!(
            hero.socket_sphere(Sphere::Q, &balance),
            Err(RuneRejected::SocketsFull { capacity: 6 })
        );
        assert_eq!(hero.spheres().len(), 6);
        assert_eq!(hero.passives().health_regen_per_sec, 0.0);
    }

    #[test]
    fn test_passives_follow_sockets_and_level() {
        let (mut hero, balance) = hero();
        hero.socket_sphere(Sphere::E, &balance).unwrap();
        assert_eq!(hero.passives().attack_damage_flat, 2);
        hero.level_up(&balance);
        assert_eq!(hero.passives().attack_damage_flat, 4);
        hero.clear_spheres(&balance);
        assert_eq!(hero.passives(), PassiveBonuses::default());
    }

    #[test]
    fn test_attack_cooldown_from_buffs_and_speed() {
        let (mut hero, balance) = hero();
        assert_eq!(hero.effective_attack_cooldown_ms(&balance), 1000.0);

        hero.combo_buff = Some(ComboKind::BerserkerSpeed);
        assert_eq!(hero.effective_attack_cooldown_ms(&balance), 500.0);

        hero.combo_buff = Some(ComboKind::UniversalMode);
        assert!((hero.effective_attack_cooldown_ms(&balance) - 850.0).abs() < 0.01);

        hero.combo_buff = None;
        hero.socket_sphere(Sphere::E, &balance).unwrap();
        hero.socket_sphere(Sphere::E, &balance).unwrap();
        // 2 * 5% at level 1 = 10% attack speed
        assert!((hero.effective_attack_cooldown_ms(&balance) - 1000.0 / 1.1).abs() < 0.01);
    }

    #[test]
    fn test_attack_speed_bonus_is_capped() {
        let (mut hero, balance) = hero();
        for _ in 0..9 {
            hero.level_up(&balance);
        }
        for _ in 0..6 {
            hero.socket_sphere(Sphere::E, &balance).unwrap();
        }
        // 6 * 50% = 300% requested, capped at 2x
        assert_eq!(hero.effective_attack_cooldown_ms(&balance), 500.0);
    }

    #[test]
    fn test_combo_damage_buffs_restore() {
        let (mut hero, balance) = hero();
        hero.combo_buff = Some(ComboKind::UniversalMode);
        assert_eq!(hero.attack_damage(&balance), 11);
        hero.combo_buff = Some(ComboKind::StandardBuff);
        assert_eq!(hero.attack_damage(&balance), 12);
        hero.combo_buff = None;
        assert_eq!(hero.attack_damage(&balance), 10);
    }

    #[test]
    fn test_attack_damage_includes_flat_bonuses() {
        let (mut hero, balance) = hero();
        hero.socket_sphere(Sphere::E, &balance).unwrap();
        hero.stats.bonus_damage = 3.0;
        assert_eq!(hero.attack_damage(&balance), 15);
        hero.stats.bonus_damage = -100.0;
        assert_eq!(hero.attack_damage(&balance), 1);
    }

    #[test]
    fn test_effective_move_speed() {
        let (mut hero, balance) = hero();
        assert_eq!(hero.effective_move_speed(&balance), 100.0);
        for _ in 0..9 {
            hero.level_up(&balance);
        }
        for _ in 0..6 {
            hero.socket_sphere(Sphere::W, &balance).unwrap();
        }
        // 36% bonus, under the soft cap
        assert!((hero.effective_move_speed(&balance) - 136.0).abs() < 0.01);
    }

    #[test]
    fn test_guaranteed_crit() {
        let (mut hero, balance) = hero();
        hero.stats.crit_chance = 100.0;
        hero.stats.crit_damage = 50.0;
        let mut rng = GameRng::from_seed(1);
        assert_eq!(hero.roll_damage(&balance, &mut rng), (15, true));
    }

    #[test]
    fn test_receive_hit_applies_armor_and_evasion() {
        let (mut hero, _) = hero();
        let mut rng = GameRng::from_seed(3);
        hero.stats.armor = 100.0;
        assert_eq!(hero.receive_hit(20, &mut rng), HitOutcome::Taken(10));
        assert_eq!(hero.health, 90.0);

        hero.stats.evasion = 100.0;
        assert_eq!(hero.receive_hit(20, &mut rng), HitOutcome::Evaded);
        assert_eq!(hero.health, 90.0);
    }

    #[test]
    fn test_regeneration_caps_at_max_health() {
        let (mut hero, balance) = hero();
        hero.socket_sphere(Sphere::Q, &balance).unwrap();
        hero.health = 99.5;
        hero.regenerate(1.0);
        assert_eq!(hero.health, 100.0);

        hero.health = 0.0;
        hero.regenerate(1.0);
        assert_eq!(hero.health, 0.0, "dead heroes do not regenerate");
    }

    #[test]
    fn test_attack_element() {
        let (mut hero, balance) = hero();
        assert_eq!(hero.attack_element(), Element::Neutral);
        hero.socket_sphere(Sphere::E, &balance).unwrap();
        assert_eq!(hero.attack_element(), Element::Fire);
        hero.combo_buff = Some(ComboKind::IceSpikes);
        assert_eq!(hero.attack_element(), Element::Frost);
        hero.combo_buff = Some(ComboKind::StandardBuff);
        assert_eq!(hero.attack_element(), Element::Fire);
    }
}
