//! Runeshot - Rune-Combo Survival Engine
//!
//! The progression and combat core of an auto-fighter survival game: a hero
//! who shoots automatically, an endless stream of enemies scaled by the
//! hero's level, and three rune types socketed in threes to fire timed combos.
//!
//! This library exposes the session engine for hosts, tests and the headless
//! runner.

pub mod balance;
pub mod cli;
pub mod headless;
pub mod session;

// Re-export commonly used types
pub use balance::{load_balance_table, BalancePlugin, BalanceTable};
pub use headless::{HeadlessSessionConfig, SessionResult};
pub use session::{ComboKind, Hero, SessionLog, SessionLogEventType, SessionPlugin, Sphere};
