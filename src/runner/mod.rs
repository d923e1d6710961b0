//! Task execution engine
//!
//! This module handles the execution of tasks, including command running,
//! skip-checks, conditional logic, and dependency resolution.

pub mod command;
pub mod context;
pub mod executor;
pub mod fingerprint;
pub mod interpolate;
pub mod interrupt;
pub mod task;
pub mod when;

// Re-export main types
pub use command::*;
pub use context::*;
pub use executor::*;
pub use interpolate::*;
pub use interrupt::*;
pub use task::*;
pub use when::*;

pub use crate::ui::Verbosity;
