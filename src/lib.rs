//! satbench: structured-analytic worksheet toolkit.
//!
//! Layers:
//! - `domain`: the hypothesis forest, flat-file artifact formats, and
//!   circleboard state (pure data, no I/O)
//! - `application`: sessions, the snapshot mirror, and per-tool file stores
//! - `infrastructure`: I/O boundary traits
//! - `server`: one axum router per worksheet tool
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod server;
