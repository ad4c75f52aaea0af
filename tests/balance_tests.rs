//! Tests for the shipped balance file
//!
//! These tests verify that:
//! - assets/config/balance.ron parses and validates
//! - The file and the built-in defaults carry the same numbers
//! - The curves derived from the table behave sensibly at every level

use std::path::Path;

use runeshot::balance::{load_balance_table, BalanceTable, DEFAULT_BALANCE_PATH};
use runeshot::session::components::EnemyTier;
use runeshot::session::scaling::enemy_stats;
use runeshot::session::ComboKind;

fn load_shipped() -> BalanceTable {
    load_balance_table(Path::new(DEFAULT_BALANCE_PATH)).expect("Failed to load balance.ron")
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_shipped_file_matches_defaults() {
    assert_eq!(
        load_shipped(),
        BalanceTable::default(),
        "balance.ron and BalanceTable::default() have drifted apart"
    );
}

#[test]
fn test_missing_file_is_an_error() {
    let err = load_balance_table(Path::new("assets/config/does_not_exist.ron")).unwrap_err();
    assert!(err.contains("Failed to read"), "unexpected error: {}", err);
}

#[test]
fn test_invalid_table_is_rejected_on_load() {
    let path = std::env::temp_dir().join("runeshot_bad_balance.ron");
    let mut table = BalanceTable::default();
    table.combos.ice_slow = 1.5;
    let text = ron::ser::to_string_pretty(&table, ron::ser::PrettyConfig::default()).unwrap();
    std::fs::write(&path, text).unwrap();

    let err = load_balance_table(&path).unwrap_err();
    assert!(err.contains("ice_slow"), "unexpected error: {}", err);
    let _ = std::fs::remove_file(&path);
}

// =============================================================================
// Derived Curves
// =============================================================================

#[test]
fn test_every_combo_has_a_positive_cost() {
    let balance = load_shipped();
    for kind in ComboKind::ALL {
        for level in 1..=balance.hero.max_level {
            assert!(
                balance.spell_cost(kind, level) > 0,
                "{} should cost mana at level {}",
                kind.name(),
                level
            );
        }
    }
}

#[test]
fn test_spell_costs_never_decrease_with_level() {
    let balance = load_shipped();
    for kind in ComboKind::ALL {
        for level in 1..balance.hero.max_level {
            assert!(
                balance.spell_cost(kind, level + 1) >= balance.spell_cost(kind, level),
                "{} got cheaper at level {}",
                kind.name(),
                level + 1
            );
        }
    }
}

#[test]
fn test_enemy_stats_grow_with_level() {
    let balance = load_shipped();
    for tier in EnemyTier::ALL {
        for level in 1..balance.hero.max_level {
            let now = enemy_stats(tier, level, &balance);
            let next = enemy_stats(tier, level + 1, &balance);
            assert!(next.hp > now.hp, "{} HP should grow at level {}", tier.name(), level + 1);
            assert!(next.dps >= now.dps, "{} DPS should not shrink", tier.name());
            assert!(next.speed > now.speed, "{} speed should grow", tier.name());
        }
    }
}

#[test]
fn test_tier_weights_cover_every_level() {
    let balance = load_shipped();
    for level in 1..=balance.hero.max_level {
        let w = balance.tier_weights(level);
        let sum = w.weak + w.normal + w.elite + w.boss;
        assert!((sum - 1.0).abs() < 0.001, "weights at level {} sum to {}", level, sum);
    }
    assert_eq!(balance.tier_weights(1).weak, 1.0, "early game is all weak enemies");
    assert!(balance.tier_weights(10).boss > 0.0, "bosses appear by the last bracket");
}
