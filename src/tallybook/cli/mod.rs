//! # CLI Layer
//!
//! This module is **one possible UI client** for tallybook, not the
//! application itself. It is the only place that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Structure
//!
//! - `setup.rs`: clap definitions (`tally <tracker> <action>`)
//! - `commands.rs`: `run()`, context setup and per-tracker handlers
//! - `render.rs`: `CmdResult` payloads → strings
//!
//! ## Data Directory
//!
//! Resolved in this order: `--data-dir`, `TALLY_DATA_DIR`, then the
//! platform data directory (`~/.local/share/tallybook` on Linux).
//! `config.json` lives in the same directory.

mod commands;
mod render;
mod setup;

pub use commands::run;
