//! Lexis: multi-dictionary lexeme lookup.
//!
//! `LexisEngine` ties the crates together: the SQLite store and decoders
//! from `lexis_core`, the key-based pager from `lexis_session`, persisted
//! per-dictionary view selections, and a background thread that rebuilds
//! the ordering whenever the view or sort changes.

mod async_worker;
mod engine;
mod error;
pub mod trace_init;

pub use async_worker::RefreshResult;
pub use engine::LexisEngine;
pub use error::EngineError;

pub use lexis_core;
pub use lexis_session;

pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
