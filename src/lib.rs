//! Cross section lookups for simulated samples.
//!
//! Values are kept in one MySQL table per collision energy (`xs_13TeV`, ...),
//! each with an append-only `_history` companion. The web front end lists a
//! table for browsers, or answers a single sample lookup with the bare value
//! for scripts.

pub mod config;
pub mod db;
pub mod energy;
pub mod handler;
pub mod mysql;
pub mod reader;
pub mod render;
pub mod server;

#[cfg(test)]
pub(crate) mod memory;

pub use energy::{Energy, Table};
pub use handler::{handle, XsecError, XsecParams};

use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Logs to stderr, filtered by `RUST_LOG` with `info` as the default level.
pub fn register_logger() {
    let log_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_writer(std::io::stderr)
        .init();
}
