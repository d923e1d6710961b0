use std::io;
use std::process;
use chore::runner::Interrupt;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the diagnostic log filter
const LOG_ENV: &str = "CHORE_LOG";

fn main() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let interrupt = Interrupt::new();
    if let Err(e) = interrupt.install() {
        warn!(error = %e, "cannot handle interrupts; deferred commands may be skipped on Ctrl-C");
    }

    if let Err(e) = chore::cli::run(interrupt) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}
