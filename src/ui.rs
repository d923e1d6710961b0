//! Terminal output
//!
//! Everything chore itself prints goes to stderr so that task output on
//! stdout stays clean for pipes.

use colored::Colorize;
use std::io::{self, Write};

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

/// Print the line announcing a command about to run
pub fn print_command(verbosity: Verbosity, task: &str, command: &str) {
    if verbosity >= Verbosity::Normal {
        eprintln!("{} {}", format!("[{}]", task).cyan().bold(), command);
    }
}

/// Print info message
pub fn print_info(verbosity: Verbosity, message: &str) {
    if verbosity >= Verbosity::Normal {
        eprintln!("{} {}", "chore:".green(), message);
    }
}

/// Print a warning
pub fn print_warning(verbosity: Verbosity, message: &str) {
    if verbosity >= Verbosity::Quiet {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }
}

/// Print debug message (only in verbose mode)
pub fn print_debug(verbosity: Verbosity, message: &str) {
    if verbosity >= Verbosity::Verbose {
        eprintln!("{} {}", "chore:".dimmed(), message.dimmed());
    }
}

/// One row of the task listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub name: String,
    pub usage: Option<String>,
    pub description: Option<String>,
    pub deps: Vec<String>,
}

/// Write the task listing, names aligned in one column
///
/// With `verbose`, each task's description follows on indented lines.
pub fn write_task_list<W: Write>(
    out: &mut W,
    title: Option<&str>,
    tasks: &[TaskSummary],
    verbose: bool,
) -> io::Result<()> {
    if let Some(title) = title {
        writeln!(out, "{}", title.bold())?;
    }

    if tasks.is_empty() {
        writeln!(out, "No tasks defined")?;
        return Ok(());
    }

    writeln!(out, "{}", "Available tasks:".bold())?;
    let width = tasks.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for task in tasks {
        let mut line = format!("  {}", format!("{:<width$}", task.name, width = width).green());
        if let Some(usage) = &task.usage {
            line.push_str("  ");
            line.push_str(usage);
        }
        if !task.deps.is_empty() {
            line.push_str(&format!(" {}", format!("(deps: {})", task.deps.join(", ")).dimmed()));
        }
        writeln!(out, "{}", line.trim_end())?;

        if let Some(description) = task.description.as_deref().filter(|_| verbose) {
            for text in description.lines() {
                writeln!(out, "{:indent$}{}", "", text.dimmed(), indent = width + 4)?;
            }
        }
    }

    Ok(())
}
