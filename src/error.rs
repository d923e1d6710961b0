//! Error types for chore

use crate::runner::INTERRUPTED_EXIT_CODE;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for chore operations
pub type Result<T> = std::result::Result<T, ChoreError>;

/// Main error type for chore
#[derive(Error, Debug)]
pub enum ChoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task execution errors
    #[error("{0}")]
    Execution(#[from] ExecutionError),

    /// Variable interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// Environment file errors
    #[error("Environment error: {0}")]
    EnvFile(#[from] EnvFileError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ChoreError {
    /// Process exit code for this error.
    ///
    /// A failing subprocess hands its own exit code through; everything
    /// else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ChoreError::Execution(e) => e.exit_code(),
            _ => 1,
        }
    }
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task '{0}' defines sources without generates")]
    SourcesWithoutGenerates(String),

    #[error("Task '{0}' defines generates without sources")]
    GeneratesWithoutSources(String),

    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),

    #[error("Task '{task}' depends on undefined task '{dep}'")]
    UnknownDependency { task: String, dep: String },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Failed to include file '{path}': {error}")]
    IncludeFile { path: PathBuf, error: String },
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command `{command}` failed with exit code {}", display_code(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Task '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: Box<ExecutionError>,
    },

    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Invalid glob pattern '{pattern}': {error}")]
    Glob { pattern: String, error: String },

    #[error("Interrupted")]
    Interrupted,

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

impl ExecutionError {
    /// Exit code to hand back to the invoking shell
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecutionError::CommandFailed { code: Some(code), .. } => *code,
            ExecutionError::TaskFailed { source, .. } => source.exit_code(),
            ExecutionError::Interrupted => INTERRUPTED_EXIT_CODE,
            _ => 1,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown".to_string(),
    }
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Invalid interpolation syntax: {0}")]
    InvalidSyntax(String),
}

/// Environment file loading errors
#[derive(Error, Debug)]
pub enum EnvFileError {
    #[error("Failed to parse env file '{path}': {error}")]
    Parse { path: PathBuf, error: String },
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;
