//! Command-line interface for Runeshot
//!
//! Every run is headless: a JSON config (optional) plus flag overrides.

use clap::Parser;
use std::path::PathBuf;

use crate::headless::HeadlessSessionConfig;

/// Rune-combo survival session simulator
#[derive(Parser, Debug)]
#[command(name = "runeshot")]
#[command(about = "Rune-combo survival session simulator")]
#[command(version)]
pub struct Args {
    /// JSON session config file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Random seed for a reproducible session
    #[arg(long)]
    pub seed: Option<u64>,

    /// Session length in seconds
    #[arg(long)]
    pub duration: Option<f32>,

    /// Balance RON file
    #[arg(long, value_name = "BALANCE_FILE")]
    pub balance: Option<PathBuf>,

    /// Output path for the session log
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Load the config file (or defaults) and apply flag overrides.
    pub fn session_config(&self) -> Result<HeadlessSessionConfig, String> {
        let mut config = match &self.config {
            Some(path) => HeadlessSessionConfig::load_from_file(path)?,
            None => HeadlessSessionConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.random_seed = Some(seed);
        }
        if let Some(duration) = self.duration {
            config.duration_secs = duration;
        }
        if let Some(balance) = &self.balance {
            config.balance_path = Some(balance.to_string_lossy().to_string());
        }
        if let Some(output) = &self.output {
            config.output_path = Some(output.to_string_lossy().to_string());
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}
