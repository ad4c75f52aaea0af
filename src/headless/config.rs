//! JSON configuration parsing for headless mode
//!
//! Parses JSON session configurations, including the scripted rune input a
//! headless session replays.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::session::components::Sphere;
use crate::session::stats::StatField;

/// One scripted host action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuneAction {
    /// Socket a rune by symbol ("Q", "W" or "E")
    Socket(String),
    /// Request combo activation
    Activate,
    /// Grant mana as if pixels had been collected
    GrantMana(u32),
    /// Add a delta to one hero stat
    ModifyStat(StatField, f32),
}

/// An action and the session time it fires at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedAction {
    pub at_secs: f32,
    pub action: RuneAction,
}

/// Parsed form of [`RuneAction`], ready for the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduledInput {
    Socket(Sphere),
    Activate,
    GrantMana(u32),
    ModifyStat(StatField, f32),
}

/// Headless session configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessSessionConfig {
    /// Session length in seconds (default: 60)
    #[serde(default = "default_duration")]
    pub duration_secs: f32,
    /// Simulation steps per second (default: 60)
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    /// Random seed for deterministic session reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Balance RON file (default: assets/config/balance.ron if present)
    #[serde(default)]
    pub balance_path: Option<String>,
    /// Custom output path for the session log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Constant hero movement direction, [x, y] (default: standing still)
    #[serde(default)]
    pub movement: [f32; 2],
    /// Timed rune input
    #[serde(default)]
    pub script: Vec<ScriptedAction>,
}

fn default_duration() -> f32 {
    60.0
}

fn default_frame_rate() -> f32 {
    60.0
}

impl Default for HeadlessSessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration(),
            frame_rate: default_frame_rate(),
            random_seed: None,
            balance_path: None,
            output_path: None,
            movement: [0.0, 0.0],
            script: Vec::new(),
        }
    }
}

impl HeadlessSessionConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: HeadlessSessionConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.duration_secs > 0.0) || !self.duration_secs.is_finite() {
            return Err("duration_secs must be positive".to_string());
        }
        if !(self.frame_rate > 0.0) || !self.frame_rate.is_finite() {
            return Err("frame_rate must be positive".to_string());
        }
        if self.movement.iter().any(|v| !v.is_finite()) {
            return Err("movement must be finite".to_string());
        }

        for (index, scripted) in self.script.iter().enumerate() {
            if !(scripted.at_secs >= 0.0) || !scripted.at_secs.is_finite() {
                return Err(format!("script[{}]: at_secs must be a non-negative time", index));
            }
            match &scripted.action {
                RuneAction::Socket(symbol) => {
                    Self::parse_sphere(symbol).map_err(|e| format!("script[{}]: {}", index, e))?;
                }
                RuneAction::ModifyStat(field, delta) if !delta.is_finite() => {
                    return Err(format!("script[{}]: {:?} delta must be finite", index, field));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Parse a rune symbol string into Sphere
    fn parse_sphere(symbol: &str) -> Result<Sphere, String> {
        let mut chars = symbol.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Sphere::from_symbol(c),
            _ => None,
        }
        .ok_or_else(|| format!("Unknown rune: '{}'. Valid runes: Q, W, E", symbol))
    }

    pub fn movement(&self) -> Vec2 {
        Vec2::new(self.movement[0], self.movement[1])
    }

    pub fn frame_ms(&self) -> f32 {
        1000.0 / self.frame_rate
    }

    /// The script as parsed inputs, ordered by time. Actions at the same time
    /// keep their file order.
    pub fn scheduled_inputs(&self) -> Result<Vec<(f32, ScheduledInput)>, String> {
        let mut inputs = self
            .script
            .iter()
            .map(|scripted| {
                let input = match &scripted.action {
                    RuneAction::Socket(symbol) => ScheduledInput::Socket(Self::parse_sphere(symbol)?),
                    RuneAction::Activate => ScheduledInput::Activate,
                    RuneAction::GrantMana(amount) => ScheduledInput::GrantMana(*amount),
                    RuneAction::ModifyStat(field, delta) => ScheduledInput::ModifyStat(*field, *delta),
                };
                Ok((scripted.at_secs, input))
            })
            .collect::<Result<Vec<_>, String>>()?;
        inputs.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(inputs)
    }
}
