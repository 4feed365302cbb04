//! # Connect Four Arena
//!
//! Connect Four against computer opponents of three difficulty tiers, with
//! per-tier statistics for guests and registered players. Features a
//! terminal UI built with Ratatui; the model tiers talk to separately running
//! model servers.
//!
//! ## Modules
//!
//! - [`game`]: Core game logic: board, player, win detection, game lifecycle
//! - [`ai`]: Move sources: random bot, model server clients, timeouts
//! - [`session`]: One human against one bot, turn by turn
//! - [`stats`]: Per-tier counters and where they are recorded
//! - [`tier`]: Difficulty tiers
//! - [`accounts`]: Registration, login, password recovery, stored statistics
//! - [`ui`]: Terminal UI: game view
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod accounts;
pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod session;
pub mod stats;
pub mod tier;
pub mod ui;
