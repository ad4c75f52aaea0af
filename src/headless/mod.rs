//! Headless mode for automated testing and balance runs
//!
//! Runs complete sessions without any graphical output. The hero follows a
//! constant movement direction and a timed rune script, and the session ends
//! when the configured duration has elapsed or the hero falls.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- --config session.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "duration_secs": 120,
//!   "random_seed": 42,
//!   "movement": [1.0, 0.0],
//!   "script": [
//!     { "at_secs": 1.0, "action": { "GrantMana": 40 } },
//!     { "at_secs": 1.0, "action": { "ModifyStat": ["Armor", 25.0] } },
//!     { "at_secs": 1.0, "action": { "Socket": "Q" } },
//!     { "at_secs": 1.5, "action": { "Socket": "Q" } },
//!     { "at_secs": 2.0, "action": { "Socket": "Q" } },
//!     { "at_secs": 2.5, "action": "Activate" }
//!   ]
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::{HeadlessSessionConfig, RuneAction, ScriptedAction};
pub use runner::{run_headless_session, SessionResult};
