//! Tests for the session log
//!
//! These tests verify that the SessionLog correctly:
//! - Formats entries for display
//! - Filters and trims entries
//! - Records session events and totals during play
//! - Exports to JSON

use bevy::prelude::*;
use regex::Regex;

use runeshot::session::events::{RequestComboActivation, SocketRune};
use runeshot::session::log::SessionLogEntry;
use runeshot::session::systems::{FrameInput, Hero, Sphere};
use runeshot::session::{SessionLog, SessionLogEventType, SessionPlugin};

fn create_test_log() -> SessionLog {
    SessionLog::default()
}

// =============================================================================
// Formatting and Queries
// =============================================================================

#[test]
fn test_format_entry_layout() {
    let entry = SessionLogEntry {
        timestamp: 12.5,
        event_type: SessionLogEventType::Combo,
        message: "Ice Spikes activated for 40 mana".to_string(),
    };
    let line = SessionLog::format_entry(&entry);

    let pattern = Regex::new(r"^\[\s*\d+\.\d{2}s\] Combo: Ice Spikes activated for \d+ mana$").unwrap();
    assert!(pattern.is_match(&line), "unexpected line: {}", line);
}

#[test]
fn test_filter_by_type() {
    let mut log = create_test_log();
    log.log(SessionLogEventType::Rune, "Socketed Q (1 in sockets)".to_string());
    log.log(SessionLogEventType::Death, "Weak enemy died (Frost)".to_string());
    log.log(SessionLogEventType::Rune, "Socketed W (2 in sockets)".to_string());

    assert_eq!(log.filter_by_type(SessionLogEventType::Rune).len(), 2);
    assert_eq!(log.filter_by_type(SessionLogEventType::Death).len(), 1);
    assert!(log.filter_by_type(SessionLogEventType::LevelUp).is_empty());
}

#[test]
fn test_recent_keeps_order() {
    let mut log = create_test_log();
    for i in 0..5 {
        log.log(SessionLogEventType::SessionEvent, format!("event {}", i));
    }
    let recent: Vec<&str> = log.recent(2).iter().map(|e| e.message.as_str()).collect();
    assert_eq!(recent, vec!["event 3", "event 4"]);
}

#[test]
fn test_clear_resets_totals() {
    let mut log = create_test_log();
    log.session_time = 4.0;
    log.totals.combos_activated = 3;
    log.log(SessionLogEventType::Combo, "x".to_string());
    log.clear();

    assert!(log.entries.is_empty());
    assert_eq!(log.session_time, 0.0);
    assert_eq!(log.totals.combos_activated, 0);
}

// =============================================================================
// Recording During Play
// =============================================================================

#[test]
fn test_session_records_rune_and_combo_events() {
    let mut app = App::new();
    app.add_plugins(SessionPlugin::seeded(3));
    app.insert_resource(FrameInput {
        delta_ms: 100.0,
        movement: Vec2::ZERO,
    });
    app.update();

    {
        let world = app.world_mut();
        let mut query = world.query::<&mut Hero>();
        query.single_mut(world).mana = 50;
    }
    for sphere in [Sphere::E, Sphere::E, Sphere::E] {
        app.world_mut().send_event(SocketRune { sphere });
    }
    app.world_mut().send_event(RequestComboActivation);
    app.update();

    let log = app.world().resource::<SessionLog>();
    let session_events = log.filter_by_type(SessionLogEventType::SessionEvent);
    assert_eq!(session_events[0].message, "Session started");

    let runes = log.filter_by_type(SessionLogEventType::Rune);
    assert_eq!(runes.len(), 3);
    assert_eq!(runes[2].message, "Socketed E (3 in sockets)");

    let combos = log.filter_by_type(SessionLogEventType::Combo);
    assert_eq!(combos.len(), 1);
    assert_eq!(combos[0].message, "Explosive Shot activated for 50 mana");
    assert!((combos[0].timestamp - 0.2).abs() < 1e-4, "logged at {}", combos[0].timestamp);
    assert_eq!(log.totals.combos_activated, 1);

    let line_pattern = Regex::new(r"^\[\s*\d+\.\d{2}s\] \w+: .+$").unwrap();
    for entry in &log.entries {
        let line = SessionLog::format_entry(entry);
        assert!(line_pattern.is_match(&line), "unexpected line: {}", line);
    }
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_save_to_file_writes_json() {
    let mut log = create_test_log();
    log.session_time = 1.25;
    log.log(SessionLogEventType::LevelUp, "Reached level 2".to_string());
    log.totals.levels_gained = 1;

    let path = std::env::temp_dir().join("runeshot_session_log_test.json");
    let metadata = serde_json::json!({ "seed": 77 });
    let written = log.save_to_file(&metadata, Some(&path.to_string_lossy())).unwrap();
    assert_eq!(written, path.display().to_string());

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["metadata"]["seed"], 77);
    assert_eq!(json["totals"]["levels_gained"], 1);
    assert_eq!(json["entries"][0]["event_type"], "LevelUp");
    assert_eq!(json["entries"][0]["timestamp"], 1.25);
    let _ = std::fs::remove_file(&path);
}
