//! World phase: the game clock, hero movement and enemy pursuit.
//!
//! The hero follows the host's movement input; enemies chase the hero and
//! stop once they reach its hitbox.

use bevy::prelude::*;

use crate::balance::BalanceTable;

use super::combo::ComboState;
use super::components::{Enemy, FrameInput, GameClock, Heading};
use super::progression::Hero;

const HITBOX_SLACK: f32 = 0.01;

/// Advance game time by this frame's delta. Runs first every frame.
pub fn advance_clock(input: Res<FrameInput>, mut clock: ResMut<GameClock>) {
    clock.advance(input.delta_ms);
}

/// Move the hero along the normalized input direction and record the
/// displacement as its heading.
pub fn move_hero(
    input: Res<FrameInput>,
    balance: Res<BalanceTable>,
    mut heroes: Query<(&Hero, &mut Transform, &mut Heading)>,
) {
    let delta_secs = input.delta_ms / 1000.0;
    for (hero, mut transform, mut heading) in heroes.iter_mut() {
        let direction = input.movement.normalize_or_zero();
        if !hero.is_alive() || direction == Vec2::ZERO {
            heading.0 = Vec2::ZERO;
            continue;
        }
        let step = direction * hero.effective_move_speed(&balance) * delta_secs;
        transform.translation += step.extend(0.0);
        heading.0 = step;
    }
}

/// Apply the active combo's slow to every living enemy. Runs every tick, so
/// enemies spawned during the combo are slowed too and the slow lifts as
/// soon as the combo ends.
pub fn apply_combo_slow(
    balance: Res<BalanceTable>,
    combo_state: Res<ComboState>,
    mut enemies: Query<&mut Enemy>,
) {
    let slow = combo_state.effect(&balance).enemy_slow;
    for mut enemy in enemies.iter_mut() {
        if enemy.is_alive() && enemy.slow != slow {
            enemy.set_slow(slow);
        }
    }
}

/// Move living enemies toward the hero.
pub fn move_enemies(
    input: Res<FrameInput>,
    balance: Res<BalanceTable>,
    heroes: Query<&Transform, With<Hero>>,
    mut enemies: Query<(&Enemy, &mut Transform), Without<Hero>>,
) {
    let Ok(hero_transform) = heroes.get_single() else {
        return;
    };
    let hero_position = hero_transform.translation.truncate();
    let delta_secs = input.delta_ms / 1000.0;

    for (enemy, mut transform) in enemies.iter_mut() {
        if !enemy.is_alive() {
            continue;
        }
        let position = transform.translation.truncate();
        let offset = hero_position - position;
        let distance = offset.length();
        if distance <= balance.enemies.contact_radius {
            continue;
        }
        // Stop just inside the hitbox edge so rounding never leaves it short
        let reach = distance - balance.enemies.contact_radius + HITBOX_SLACK;
        let step = (enemy.speed() * delta_secs).min(reach);
        transform.translation += (offset / distance * step).extend(0.0);
    }
}
