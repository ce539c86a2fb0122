//! One round of a Space Invaders style shooter.
//!
//! `entities` holds the plain data, `compute` advances it one frame at a
//! time, `config` carries the tunables and `display` turns a snapshot into
//! terminal commands for the bundled host.

pub mod compute;
pub mod config;
pub mod display;
pub mod entities;
pub mod input;

pub use compute::{init_round, init_round_with, snapshot, tick};
pub use config::{ConfigError, RoundConfig};
pub use entities::{RoundSnapshot, RoundState, RoundStatus};
pub use input::{FireLatch, InputSnapshot};
