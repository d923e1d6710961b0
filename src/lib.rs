//! Chore - a small YAML-based task runner
//!
//! Tasks are declared in a `chore.yml` file with an optional skip-check
//! (`status`), dependencies (`deps`), commands (`cmds`) and deferred
//! cleanup commands (`defer`). Env files listed under `dotenv` are loaded
//! before anything runs.

// Public modules
pub mod cli;
pub mod config;
pub mod envfile;
pub mod error;
pub mod runner;
pub mod ui;

// Re-export commonly used types
pub use error::{ChoreError, Result};

/// Current version of chore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
