//! Execution context for task running
//!
//! The context tracks all the state needed during one invocation.

use crate::runner::Interrupt;
use crate::ui::{self, Verbosity};
use std::collections::{HashMap, HashSet};
use std::env;
use std::path::{Path, PathBuf};

/// Execution context that tracks state during task execution
pub struct Context {
    /// Directory commands run in unless a task says otherwise
    pub working_dir: PathBuf,

    /// Configuration file path
    pub config_path: Option<PathBuf>,

    /// Variables layered over the process environment for every command
    pub vars: HashMap<String, String>,

    /// Custom interpreter (e.g., ["bash", "-c"])
    pub interpreter: Vec<String>,

    /// Stack of tasks being executed (for detecting recursion)
    pub task_stack: Vec<String>,

    /// Command-line assignments; these beat every other source
    pub overrides: HashMap<String, String>,

    /// Tasks already finished (run or skipped) in this invocation
    pub completed: HashSet<String>,

    /// Verbosity level
    pub verbosity: Verbosity,

    /// Print commands instead of running them
    pub dry_run: bool,

    /// Ignore status and sources checks
    pub force: bool,

    /// Set when a termination signal arrives
    pub interrupt: Interrupt,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_path: None,
            vars: HashMap::new(),
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            task_stack: Vec::new(),
            overrides: HashMap::new(),
            completed: HashSet::new(),
            verbosity: Verbosity::Normal,
            dry_run: false,
            force: false,
            interrupt: Interrupt::new(),
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the configuration file path
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Set variables
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = vars;
        self
    }

    /// Set a single variable
    pub fn set_var(&mut self, key: String, value: String) {
        self.vars.insert(key, value);
    }

    /// Get a variable value
    pub fn get_var(&self, key: &str) -> Option<&String> {
        self.vars.get(key)
    }

    /// Set command-line overrides; they are also applied to `vars`
    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.vars
            .extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.overrides = overrides;
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Push a task onto the execution stack
    pub fn push_task(&mut self, task_name: String) {
        self.task_stack.push(task_name);
    }

    /// Pop a task from the execution stack
    pub fn pop_task(&mut self) -> Option<String> {
        self.task_stack.pop()
    }

    /// Check if a task is in the execution stack (detect recursion)
    pub fn is_task_in_stack(&self, task_name: &str) -> bool {
        self.task_stack.iter().any(|t| t == task_name)
    }

    /// Get the current task name (top of stack)
    pub fn current_task(&self) -> Option<&String> {
        self.task_stack.last()
    }

    /// Record that a task has finished for this invocation
    pub fn mark_completed(&mut self, task_name: &str) {
        self.completed.insert(task_name.to_string());
    }

    /// Whether a task already ran (or was skipped) in this invocation
    pub fn is_completed(&self, task_name: &str) -> bool {
        self.completed.contains(task_name)
    }

    /// Get the directory for the config file (or current dir)
    pub fn config_dir(&self) -> PathBuf {
        self.config_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.working_dir.clone())
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        ui::print_info(self.verbosity, message);
    }

    /// Print a warning
    pub fn print_warning(&self, message: &str) {
        ui::print_warning(self.verbosity, message);
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        ui::print_debug(self.verbosity, message);
    }

    /// Print the command line about to run for the current task
    pub fn print_command(&self, command: &str) {
        let task = self.current_task().map(String::as_str).unwrap_or("chore");
        ui::print_command(self.verbosity, task, command);
    }

    /// Print task skip message
    pub fn print_task_skip(&self, task_name: &str, reason: &str) {
        self.print_info(&format!("Task \"{}\" is up to date ({})", task_name, reason));
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
