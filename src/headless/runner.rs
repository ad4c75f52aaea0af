//! Headless session execution
//!
//! Runs sessions without any graphical output, stepping the simulation at a
//! fixed synthetic frame rate so results depend only on the seed and config.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use serde::Serialize;
use std::collections::VecDeque;
use std::path::Path;

use crate::balance::{load_balance_table, BalanceTable, TierTable, DEFAULT_BALANCE_PATH};
use crate::session::events::{HeroLeveledUp, RequestComboActivation, SocketRune};
use crate::session::systems::{FrameInput, GameClock, Hero, SessionSystemPhase, Sphere};
use crate::session::{SessionLog, SessionLogEventType, SessionPlugin};

use super::config::{HeadlessSessionConfig, ScheduledInput};

/// Result of a completed headless session
///
/// Provides programmatic access to session results for testing and analysis.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    /// Session time simulated, in seconds
    pub elapsed_secs: f32,
    pub hero_survived: bool,
    pub final_level: u32,
    pub final_health: f32,
    pub final_mana: u32,
    /// Spheres still socketed at the end
    pub final_spheres: Vec<Sphere>,
    pub kills: TierTable<u32>,
    pub enemies_spawned: u32,
    pub mana_collected: u64,
    pub combos_activated: u32,
    pub damage_dealt: u64,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

impl SessionResult {
    pub fn total_kills(&self) -> u32 {
        self.kills.weak + self.kills.normal + self.kills.elite + self.kills.boss
    }
}

/// Resource driving scripted input for a headless session
#[derive(Resource)]
pub struct HeadlessSessionState {
    /// Remaining inputs, ordered by time (seconds)
    pub script: VecDeque<(f32, ScheduledInput)>,
}

/// Plugin for headless session execution
pub struct HeadlessPlugin {
    pub config: HeadlessSessionConfig,
    pub script: Vec<(f32, ScheduledInput)>,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(FrameInput {
            delta_ms: self.config.frame_ms(),
            movement: self.config.movement(),
        })
        .insert_resource(HeadlessSessionState {
            script: self.script.iter().copied().collect(),
        })
        .add_plugins(SessionPlugin {
            seed: self.config.random_seed,
        })
        .add_systems(
            Update,
            drive_scripted_input.before(SessionSystemPhase::World),
        );
    }
}

/// Send every scripted input whose time has come.
fn drive_scripted_input(
    clock: Res<GameClock>,
    balance: Res<BalanceTable>,
    mut state: ResMut<HeadlessSessionState>,
    mut heroes: Query<&mut Hero>,
    mut socket_events: EventWriter<SocketRune>,
    mut activation_events: EventWriter<RequestComboActivation>,
    mut level_events: EventWriter<HeroLeveledUp>,
) {
    let now_secs = clock.elapsed_secs();
    while state.script.front().is_some_and(|(at, _)| *at <= now_secs) {
        let Some((_, input)) = state.script.pop_front() else {
            break;
        };
        match input {
            ScheduledInput::Socket(sphere) => {
                socket_events.send(SocketRune { sphere });
            }
            ScheduledInput::Activate => {
                activation_events.send(RequestComboActivation);
            }
            ScheduledInput::GrantMana(amount) => {
                for mut hero in heroes.iter_mut() {
                    if let Some(new_level) = hero.add_mana(amount, &balance) {
                        level_events.send(HeroLeveledUp { new_level });
                    }
                }
            }
            ScheduledInput::ModifyStat(field, delta) => {
                for mut hero in heroes.iter_mut() {
                    hero.stats.modify(field, delta);
                    debug!("{:?} is now {}", field, hero.stats.get(field));
                }
            }
        }
    }
}

/// Resolve the balance table for a session: the configured file, else the
/// shipped file if present, else the built-in table.
pub fn resolve_balance(config: &HeadlessSessionConfig) -> Result<BalanceTable, String> {
    match &config.balance_path {
        Some(path) => load_balance_table(Path::new(path)),
        None if Path::new(DEFAULT_BALANCE_PATH).exists() => load_balance_table(Path::new(DEFAULT_BALANCE_PATH)),
        None => {
            warn!("{} not found, using built-in balance", DEFAULT_BALANCE_PATH);
            Ok(BalanceTable::default())
        }
    }
}

/// Build a ready-to-step headless session app.
pub fn build_session_app(config: &HeadlessSessionConfig, with_logging: bool) -> Result<App, String> {
    config.validate()?;
    let script = config.scheduled_inputs()?;

    let mut app = App::new();
    // Minimal plugins - no window, no rendering. Frames are stepped manually.
    app.add_plugins(MinimalPlugins);
    if with_logging {
        app.add_plugins(LogPlugin::default());
    }

    let balance = resolve_balance(config)?;
    app.insert_resource(balance).add_plugins(HeadlessPlugin {
        config: config.clone(),
        script,
    });
    app.finish();
    app.cleanup();
    Ok(app)
}

/// Run a headless session with the given configuration
pub fn run_headless_session(config: HeadlessSessionConfig) -> Result<SessionResult, String> {
    run_session(config, false)
}

/// Like [`run_headless_session`], with session logs printed to stderr.
pub fn run_headless_session_with_logging(config: HeadlessSessionConfig) -> Result<SessionResult, String> {
    run_session(config, true)
}

fn run_session(config: HeadlessSessionConfig, with_logging: bool) -> Result<SessionResult, String> {
    let mut app = build_session_app(&config, with_logging)?;
    let frames = (config.duration_secs * config.frame_rate).ceil() as u64;

    for _ in 0..frames {
        app.update();
        if !hero_alive(&mut app) {
            break;
        }
    }

    let result = build_session_result(&mut app, config.random_seed)?;
    info!(
        "Session ended after {:.1}s: level {}, {} kills, hero {}",
        result.elapsed_secs,
        result.final_level,
        result.total_kills(),
        if result.hero_survived { "survived" } else { "fell" }
    );

    let mut log = app.world_mut().resource_mut::<SessionLog>();
    log.session_time = result.elapsed_secs;
    log.log(
        SessionLogEventType::SessionEvent,
        format!("Session ended at level {}", result.final_level),
    );

    if let Some(path) = config.output_path.as_deref() {
        match log.save_to_file(&result, Some(path)) {
            Ok(filename) => println!("Session complete. Log saved to: {}", filename),
            Err(e) => eprintln!("Failed to save session log: {}", e),
        }
    }

    Ok(result)
}

fn hero_alive(app: &mut App) -> bool {
    let mut heroes = app.world_mut().query::<&Hero>();
    heroes.iter(app.world()).any(|hero| hero.is_alive())
}

/// Collect the session result from the app's final state.
pub fn build_session_result(app: &mut App, random_seed: Option<u64>) -> Result<SessionResult, String> {
    let mut heroes = app.world_mut().query::<&Hero>();
    let hero = heroes
        .get_single(app.world())
        .map_err(|e| format!("Session has no single hero: {}", e))?
        .clone();

    let world = app.world();
    let elapsed_secs = world.resource::<GameClock>().elapsed_secs();
    let totals = &world.resource::<SessionLog>().totals;

    Ok(SessionResult {
        elapsed_secs,
        hero_survived: hero.is_alive(),
        final_level: hero.level(),
        final_health: hero.health,
        final_mana: hero.mana,
        final_spheres: hero.spheres().to_vec(),
        kills: totals.kills,
        enemies_spawned: totals.enemies_spawned,
        mana_collected: totals.mana_collected,
        combos_activated: totals.combos_activated,
        damage_dealt: hero.damage_dealt,
        random_seed,
    })
}
