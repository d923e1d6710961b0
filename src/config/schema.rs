//! Configuration validation
//!
//! This module provides validation logic for configuration files.

use crate::config::types::{Command, Config, Task};
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashSet;

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    let mut names: Vec<&String> = config.tasks.keys().collect();
    names.sort();

    for name in &names {
        validate_task(name, &config.tasks[*name])?;
    }

    for name in &names {
        for dep in &config.tasks[*name].deps {
            if !config.tasks.contains_key(dep) {
                return Err(ConfigError::UnknownDependency {
                    task: (*name).clone(),
                    dep: dep.clone(),
                });
            }
        }
    }

    detect_circular_task_dependencies(config, &names)?;

    if let Some(interpreter) = &config.interpreter {
        if interpreter.is_empty() || interpreter[0].trim().is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter must name a program".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validate a single task
pub fn validate_task(name: &str, task: &Task) -> ConfigResult<()> {
    if name.trim().is_empty() || name.contains(char::is_whitespace) || name.contains('=') {
        return Err(ConfigError::Invalid(format!(
            "Invalid task name '{}': names cannot be empty or contain whitespace or '='",
            name
        )));
    }

    if !task.sources.is_empty() && task.generates.is_empty() {
        return Err(ConfigError::SourcesWithoutGenerates(name.to_string()));
    }
    if !task.generates.is_empty() && task.sources.is_empty() {
        return Err(ConfigError::GeneratesWithoutSources(name.to_string()));
    }

    for status in &task.status {
        if status.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Task '{}' has an empty status command",
                name
            )));
        }
    }

    for cmd in task.cmds.iter().chain(task.defer.iter()) {
        if command_text(cmd).trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Task '{}' has an empty command",
                name
            )));
        }
    }

    Ok(())
}

fn command_text(cmd: &Command) -> &str {
    match cmd {
        Command::Simple(cmd) => cmd,
        Command::Complex(detail) => &detail.cmd,
    }
}

/// Detect circular dependencies between tasks
fn detect_circular_task_dependencies(config: &Config, names: &[&String]) -> ConfigResult<()> {
    let mut visited = HashSet::new();
    for task_name in names {
        let mut stack = Vec::new();
        check_task_cycle(config, task_name, &mut visited, &mut stack)?;
    }
    Ok(())
}

/// Recursively check for cycles in task dependencies
fn check_task_cycle(
    config: &Config,
    task_name: &str,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
) -> ConfigResult<()> {
    if stack.iter().any(|t| t == task_name) {
        stack.push(task_name.to_string());
        return Err(ConfigError::CircularDependency(stack.join(" -> ")));
    }

    // Skip if already fully processed
    if visited.contains(task_name) {
        return Ok(());
    }

    let task = config
        .tasks
        .get(task_name)
        .ok_or_else(|| ConfigError::TaskNotFound(task_name.to_string()))?;

    stack.push(task_name.to_string());

    for dep in &task.deps {
        check_task_cycle(config, dep, visited, stack)?;
    }

    stack.pop();
    visited.insert(task_name.to_string());

    Ok(())
}
