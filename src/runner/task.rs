//! Runtime task representation
//!
//! These types are built once from `config` and are what the executor walks.

use crate::config;
use std::collections::HashMap;

/// Runtime task representation
#[derive(Debug, Clone)]
pub struct Task {
    /// Task name
    pub name: String,

    /// Usage description
    pub usage: Option<String>,

    /// Longer description
    pub description: Option<String>,

    /// Whether this task is hidden from the listing
    pub private: bool,

    /// Whether this task's commands are echoed
    pub quiet: bool,

    /// Skip-check commands
    pub status: Vec<String>,

    /// Dependencies in declaration order
    pub deps: Vec<String>,

    /// Main commands
    pub cmds: Vec<Command>,

    /// Deferred cleanup commands
    pub defer: Vec<Command>,

    /// Working directory relative to the config file
    pub dir: Option<String>,

    /// Task-level variables
    pub env: HashMap<String, String>,

    /// Source globs
    pub sources: Vec<String>,

    /// Generated file globs
    pub generates: Vec<String>,
}

impl Task {
    /// Create a new task from configuration
    pub fn from_config(name: String, config: config::Task) -> Self {
        Task {
            name,
            usage: config.usage,
            description: config.description,
            private: config.private,
            quiet: config.quiet,
            status: config.status,
            deps: config.deps,
            cmds: config.cmds.into_iter().map(Command::from_config).collect(),
            defer: config.defer.into_iter().map(Command::from_config).collect(),
            dir: config.dir,
            env: config.env,
            sources: config.sources,
            generates: config.generates,
        }
    }

    /// Whether the task carries any check that can mark it up to date
    pub fn has_skip_checks(&self) -> bool {
        !self.status.is_empty() || !self.sources.is_empty()
    }
}

/// Runtime representation of a command
#[derive(Debug, Clone)]
pub struct Command {
    /// Command line handed to the interpreter
    pub exec: String,

    /// Replacement text for the echo line
    pub print: Option<String>,

    pub quiet: bool,

    /// Working directory relative to the task directory
    pub dir: Option<String>,

    pub ignore_error: bool,

    /// Guards; all must hold
    pub when: Vec<WhenCondition>,
}

impl Command {
    /// Create from config
    pub fn from_config(config: config::Command) -> Self {
        match config {
            config::Command::Simple(exec) => Command::new(exec),
            config::Command::Complex(detail) => Command {
                exec: detail.cmd,
                print: detail.print,
                quiet: detail.quiet,
                dir: detail.dir,
                ignore_error: detail.ignore_error,
                when: detail
                    .when
                    .into_iter()
                    .flat_map(WhenCondition::from_config)
                    .collect(),
            },
        }
    }

    /// A plain command with no options
    pub fn new(exec: impl Into<String>) -> Self {
        Command {
            exec: exec.into(),
            print: None,
            quiet: false,
            dir: None,
            ignore_error: false,
            when: Vec::new(),
        }
    }
}

/// Types of when conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhenCondition {
    Equal { left: String, right: String },
    NotEqual { left: String, right: String },
    Command(String),
    Exists(String),
    EnvSet(String),
    EnvNotSet(String),
}

impl WhenCondition {
    /// Every field set on a `when` entry becomes its own condition
    pub fn from_config(config: config::When) -> Vec<Self> {
        let mut conditions = Vec::new();

        if let Some(eq) = config.equal {
            conditions.push(WhenCondition::Equal {
                left: eq.left,
                right: eq.right,
            });
        }
        if let Some(ne) = config.not_equal {
            conditions.push(WhenCondition::NotEqual {
                left: ne.left,
                right: ne.right,
            });
        }
        if let Some(cmd) = config.command {
            conditions.push(WhenCondition::Command(cmd));
        }
        if let Some(path) = config.exists {
            conditions.push(WhenCondition::Exists(path));
        }
        if let Some(var) = config.env_set {
            conditions.push(WhenCondition::EnvSet(var));
        }
        if let Some(var) = config.env_not_set {
            conditions.push(WhenCondition::EnvNotSet(var));
        }

        conditions
    }
}
