//! `relay`: a one-shot binary that exercises every capability interface and
//! executor entry point `relay-core` exposes (spec §6's "Supplemented" note).
//!
//! The library half exists so the CLI's wiring (`App`, the builtin command
//! handlers, the concrete capability implementations) can be exercised by
//! `tests/` without spawning the binary for every case; `main.rs` is a thin
//! shell around `cli::Cli::run`.

pub mod app;
pub mod capability_impls;
pub mod cli;
pub mod handlers;
