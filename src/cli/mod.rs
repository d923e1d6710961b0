//! CLI interface and argument parsing
//!
//! This module handles command-line interface parsing, task listing,
//! and shell completion.

pub mod app;
pub mod completion;

// Re-export main types
pub use app::*;
