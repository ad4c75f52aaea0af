//! Runeshot - rune-combo survival session simulator
//!
//! Runs a headless session and prints the result as JSON.

use std::process::ExitCode;

use runeshot::cli;
use runeshot::headless::runner::run_headless_session_with_logging;

fn main() -> ExitCode {
    let args = cli::parse_args();

    let config = match args.session_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid session config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match run_headless_session_with_logging(config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Session failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&result) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize session result: {}", e);
            ExitCode::FAILURE
        }
    }
}
