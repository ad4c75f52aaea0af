//! Session logging
//!
//! Records every outbound session event for post-session analysis, keeps
//! running totals, and exports the whole log as JSON.

use bevy::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::balance::TierTable;

use super::components::{EnemyTier, GameClock};
use super::events::{
    ComboActivated, ComboEnded, EnemyDied, EnemySpawned, HeroDamaged, HeroLeveledUp, ManaPixelCollected,
    ManaPixelSpawned, ProjectileHit, RuneRequestRejected, RuneSocketed,
};

/// Directory used when no output path is given.
pub const DEFAULT_LOG_DIR: &str = "session_logs";

/// A single entry in the session log
#[derive(Debug, Clone, Serialize)]
pub struct SessionLogEntry {
    /// Session time in seconds
    pub timestamp: f32,
    pub event_type: SessionLogEventType,
    pub message: String,
}

/// Types of session log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionLogEventType {
    /// Session start and end
    SessionEvent,
    /// Rune socketed or rejected
    Rune,
    /// Combo activated or ended
    Combo,
    /// Enemy entered the world
    Spawn,
    /// Damage dealt by the hero
    Damage,
    /// Damage taken (or evaded) by the hero
    HeroHit,
    /// Enemy died
    Death,
    /// Mana pixel spawned or collected
    Mana,
    /// Hero gained a level
    LevelUp,
}

/// Running totals kept alongside the entries.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTotals {
    pub kills: TierTable<u32>,
    pub enemies_spawned: u32,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub hits_evaded: u32,
    pub mana_collected: u64,
    pub combos_activated: u32,
    pub levels_gained: u32,
    pub runes_rejected: u32,
}

impl Default for SessionTotals {
    fn default() -> Self {
        Self {
            kills: TierTable { weak: 0, normal: 0, elite: 0, boss: 0 },
            enemies_spawned: 0,
            damage_dealt: 0,
            damage_taken: 0,
            hits_evaded: 0,
            mana_collected: 0,
            combos_activated: 0,
            levels_gained: 0,
            runes_rejected: 0,
        }
    }
}

impl SessionTotals {
    pub fn total_kills(&self) -> u32 {
        EnemyTier::ALL.iter().map(|tier| self.kills.get(*tier)).sum()
    }
}

/// The session log resource storing all events
#[derive(Resource, Default)]
pub struct SessionLog {
    /// All log entries in chronological order
    pub entries: Vec<SessionLogEntry>,
    /// Current session time in seconds
    pub session_time: f32,
    pub totals: SessionTotals,
}

#[derive(Serialize)]
struct SessionLogFile<'a, M: Serialize> {
    metadata: &'a M,
    totals: &'a SessionTotals,
    entries: &'a [SessionLogEntry],
}

impl SessionLog {
    /// Clear the log for a new session
    pub fn clear(&mut self) {
        self.entries.clear();
        self.session_time = 0.0;
        self.totals = SessionTotals::default();
    }

    pub fn log(&mut self, event_type: SessionLogEventType, message: String) {
        self.entries.push(SessionLogEntry {
            timestamp: self.session_time,
            event_type,
            message,
        });
    }

    pub fn filter_by_type(&self, event_type: SessionLogEventType) -> Vec<&SessionLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&SessionLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Render one entry as a single human-readable line.
    pub fn format_entry(entry: &SessionLogEntry) -> String {
        format!("[{:>7.2}s] {:?}: {}", entry.timestamp, entry.event_type, entry.message)
    }

    /// Write the log and the given metadata as pretty JSON.
    ///
    /// Uses `output_path` when given, otherwise a timestamped file under
    /// [`DEFAULT_LOG_DIR`]. Returns the path written.
    pub fn save_to_file<M: Serialize>(&self, metadata: &M, output_path: Option<&str>) -> Result<String, String> {
        let path = match output_path {
            Some(path) => PathBuf::from(path),
            None => {
                let stamp = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default();
                Path::new(DEFAULT_LOG_DIR).join(format!("session_{}.json", stamp))
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }

        let file = SessionLogFile {
            metadata,
            totals: &self.totals,
            entries: &self.entries,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| format!("Failed to serialize session log: {}", e))?;
        std::fs::write(&path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;

        Ok(path.display().to_string())
    }
}

/// Record this frame's outbound events.
#[allow(clippy::too_many_arguments)]
pub fn record_session_log(
    clock: Res<GameClock>,
    mut log: ResMut<SessionLog>,
    mut socketed: EventReader<RuneSocketed>,
    mut rejected: EventReader<RuneRequestRejected>,
    mut combos_activated: EventReader<ComboActivated>,
    mut combos_ended: EventReader<ComboEnded>,
    mut enemies_spawned: EventReader<EnemySpawned>,
    mut enemies_died: EventReader<EnemyDied>,
    mut projectile_hits: EventReader<ProjectileHit>,
    mut hero_hits: EventReader<HeroDamaged>,
    mut pixels_spawned: EventReader<ManaPixelSpawned>,
    mut pixels_collected: EventReader<ManaPixelCollected>,
    mut level_ups: EventReader<HeroLeveledUp>,
) {
    log.session_time = clock.elapsed_secs();

    for event in socketed.read() {
        log.log(
            SessionLogEventType::Rune,
            format!("Socketed {} ({} in sockets)", event.sphere.symbol(), event.count),
        );
    }
    for event in rejected.read() {
        log.totals.runes_rejected += 1;
        log.log(SessionLogEventType::Rune, format!("Rejected: {}", event.reason));
    }
    for event in combos_activated.read() {
        log.totals.combos_activated += 1;
        log.log(
            SessionLogEventType::Combo,
            format!("{} activated for {} mana", event.kind.name(), event.mana_spent),
        );
    }
    for event in combos_ended.read() {
        log.log(SessionLogEventType::Combo, format!("{} ended", event.kind.name()));
    }
    for event in enemies_spawned.read() {
        log.totals.enemies_spawned += 1;
        log.log(
            SessionLogEventType::Spawn,
            format!(
                "{} enemy spawned at ({:.0}, {:.0})",
                event.tier.name(),
                event.position.x,
                event.position.y
            ),
        );
    }
    for event in projectile_hits.read() {
        log.totals.damage_dealt += event.damage as u64;
        let kind = if event.splash { "Explosion" } else { "Projectile" };
        let crit = if event.is_crit { " (critical)" } else { "" };
        log.log(
            SessionLogEventType::Damage,
            format!("{} hits for {} {:?} damage{}", kind, event.damage, event.element, crit),
        );
    }
    for event in hero_hits.read() {
        if event.evaded {
            log.totals.hits_evaded += 1;
            log.log(SessionLogEventType::HeroHit, "Hero evaded a strike".to_string());
        } else {
            log.totals.damage_taken += event.amount as u64;
            log.log(
                SessionLogEventType::HeroHit,
                format!("Hero takes {} damage ({:.0} HP left)", event.amount, event.remaining_health),
            );
        }
    }
    for event in enemies_died.read() {
        let tier = event.tier;
        let kills = match tier {
            EnemyTier::Weak => &mut log.totals.kills.weak,
            EnemyTier::Normal => &mut log.totals.kills.normal,
            EnemyTier::Elite => &mut log.totals.kills.elite,
            EnemyTier::Boss => &mut log.totals.kills.boss,
        };
        *kills += 1;
        log.log(
            SessionLogEventType::Death,
            format!("{} enemy died ({:?})", tier.name(), event.element),
        );
    }
    for event in pixels_spawned.read() {
        log.log(SessionLogEventType::Mana, format!("Mana pixel worth {} dropped", event.amount));
    }
    for event in pixels_collected.read() {
        log.totals.mana_collected += event.amount as u64;
        log.log(SessionLogEventType::Mana, format!("Collected {} mana", event.amount));
    }
    for event in level_ups.read() {
        log.totals.levels_gained += 1;
        log.log(SessionLogEventType::LevelUp, format!("Reached level {}", event.new_level));
    }
}
