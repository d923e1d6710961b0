//! Command execution
//!
//! This module handles executing shell commands.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{evaluate_when_list, interpolate, interpolate_strict, Command, Context};
use std::io;
use std::path::Path;
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use tracing::debug;

/// Execute a command in the given context
///
/// `quiet` comes from the owning task and suppresses the echo line just
/// like the command's own `quiet` flag does.
pub fn execute_command(cmd: &Command, quiet: bool, ctx: &Context) -> ExecutionResult<()> {
    if !cmd.when.is_empty() && !evaluate_when_list(&cmd.when, ctx)? {
        ctx.print_debug(&format!("Skipping `{}`: condition not met", cmd.exec));
        return Ok(());
    }

    let exec_str = interpolate_strict(&cmd.exec, &ctx.vars)?;

    if !quiet && !cmd.quiet {
        let shown = match &cmd.print {
            Some(print) => interpolate(print, &ctx.vars).unwrap_or_else(|_| print.clone()),
            None => exec_str.clone(),
        };
        ctx.print_command(&shown);
    }

    if ctx.dry_run {
        return Ok(());
    }

    let working_dir = match &cmd.dir {
        Some(dir) => ctx.working_dir.join(interpolate_strict(dir, &ctx.vars)?),
        None => ctx.working_dir.clone(),
    };

    debug!(command = %cmd.exec, dir = %working_dir.display(), "running command");

    // Errors name the command as written so expanded secrets stay out of them
    let mut command = shell_command(&exec_str, &working_dir, ctx).map_err(|source| {
        ExecutionError::Spawn {
            command: cmd.exec.clone(),
            source,
        }
    })?;

    command.stdin(Stdio::inherit());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());

    let status = command.status().map_err(|source| ExecutionError::Spawn {
        command: cmd.exec.clone(),
        source,
    })?;

    if status.success() {
        return Ok(());
    }

    let err = ExecutionError::CommandFailed {
        command: cmd.exec.clone(),
        code: exit_code(&status),
    };
    if cmd.ignore_error {
        ctx.print_warning(&format!("{} (ignored)", err));
        return Ok(());
    }

    Err(err)
}

/// Check if a command succeeds (for status checks and when conditions)
///
/// Anything that keeps the command from exiting 0 counts as failure,
/// including an undefined variable or a command that cannot be spawned.
pub fn check_command(cmd_str: &str, ctx: &Context) -> bool {
    let exec_str = match interpolate_strict(cmd_str, &ctx.vars) {
        Ok(exec_str) => exec_str,
        Err(e) => {
            debug!(command = %cmd_str, error = %e, "check command not runnable");
            return false;
        }
    };

    let mut command = match shell_command(&exec_str, &ctx.working_dir, ctx) {
        Ok(command) => command,
        Err(e) => {
            debug!(command = %cmd_str, error = %e, "check command not runnable");
            return false;
        }
    };

    command.stdin(Stdio::null());
    command.stdout(Stdio::null());
    command.stderr(Stdio::null());

    match command.status() {
        Ok(status) => {
            debug!(command = %cmd_str, code = ?status.code(), "check command finished");
            status.success()
        }
        Err(e) => {
            debug!(command = %cmd_str, error = %e, "check command failed to start");
            false
        }
    }
}

/// Build the interpreter invocation for a command line
fn shell_command(exec_str: &str, dir: &Path, ctx: &Context) -> io::Result<StdCommand> {
    let (program, args) = ctx.interpreter.split_first().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "interpreter is empty")
    })?;

    let mut command = StdCommand::new(program);
    command.args(args);
    command.arg(exec_str);
    command.current_dir(dir);
    command.envs(&ctx.vars);

    Ok(command)
}

/// Exit code of a finished child; signals map to 128 + signal number on Unix
fn exit_code(status: &ExitStatus) -> Option<i32> {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Some(128 + signal);
        }
    }
    status.code()
}
