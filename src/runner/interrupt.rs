//! Interrupt tracking
//!
//! Ctrl-C reaches the running child through the terminal's process group.
//! chore only records it: the child's failure ends the task, its deferred
//! commands still run, and no further command or task is started.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit code when chore stops because of an interrupt (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Shared flag set once SIGINT, SIGTERM or SIGHUP arrives
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route termination signals into this flag instead of exiting.
    /// Only one handler can be installed per process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let flag = Arc::clone(&self.0);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
