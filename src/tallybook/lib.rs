//! # Tallybook Architecture
//!
//! Tallybook is a **UI-agnostic record-keeping library**: five small trackers
//! (expenses, students, tasks, quiz attempts, text statistics) that share one
//! shape. Load records from a flat file, change an in-memory collection,
//! recompute aggregates, save the whole collection back.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, holds backend + config        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One module per tracker: load, change, save               │
//! │  - Returns `CmdResult`, never prints                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  aggregate.rs / text.rs                                     │
//! │  - Pure functions over slices: totals, groups, extremes     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/) over codec/                         │
//! │  - StorageBackend trait: FsBackend, MemBackend              │
//! │  - LineStore (one record per line), JsonDocStore (array)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes plain Rust arguments, returns
//! `Result<CmdResult>`, and never writes to stdout/stderr. Diagnostics go
//! through the `log` facade; the binary decides where they end up.
//!
//! ## Testing Strategy
//!
//! 1. **Codecs, stores, aggregates**: unit tests beside the code, using
//!    `MemBackend` so nothing touches the disk.
//! 2. **Commands**: the bulk of the tests, one scenario per operation.
//! 3. **API**: dispatch and session behavior.
//! 4. **CLI**: end-to-end in `tests/`, driving the `tally` binary against a
//!    temporary data directory.

pub mod aggregate;
pub mod api;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;
pub mod text;
