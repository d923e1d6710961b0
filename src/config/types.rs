//! Core configuration types
//!
//! This module defines the data structures that represent a chore.yml configuration file.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Application name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Application usage description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Env files probed in order before any task runs
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub dotenv: Vec<String>,

    /// Variables visible to every task
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Tasks defined in the configuration
    #[serde(default)]
    pub tasks: HashMap<String, Task>,

    /// Global interpreter to use for commands (e.g., ["sh", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,
}

/// A task definition
///
/// Unknown keys are rejected so a typo such as `cmd:` cannot silently
/// produce a task that does nothing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Task {
    /// Usage description for the task listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this task is private (hidden from the listing)
    #[serde(default)]
    pub private: bool,

    /// Whether this task should run quietly
    #[serde(default)]
    pub quiet: bool,

    /// Skip-check commands; the task is up to date when all of them exit 0
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub status: Vec<String>,

    /// Tasks to run before this one, in order
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub deps: Vec<String>,

    /// Commands to execute
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub cmds: Vec<Command>,

    /// Deferred commands - always execute once `cmds` has started
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub defer: Vec<Command>,

    /// Working directory, relative to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    /// Variables visible to this task's commands
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Source globs for the up-to-date check
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub sources: Vec<String>,

    /// Generated file globs for the up-to-date check
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub generates: Vec<String>,

    /// Include another file as task definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
}

/// A command to execute
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Command {
    /// Simple string command
    Simple(String),

    /// Complex command with additional options
    Complex(CommandDetail),
}

/// Detailed command specification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandDetail {
    /// The command to execute
    pub cmd: String,

    /// What to print when running (defaults to cmd)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print: Option<String>,

    /// Whether to suppress the command echo
    #[serde(default)]
    pub quiet: bool,

    /// Working directory for the command, relative to the task directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    /// Keep going when the command fails
    #[serde(default, rename = "ignore_error", alias = "ignore-error")]
    pub ignore_error: bool,

    /// Conditions that must all hold for the command to run
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub when: Vec<When>,
}

/// A conditional expression guarding a command
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct When {
    /// Check if values are equal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal: Option<WhenComparison>,

    /// Check if values are not equal
    #[serde(
        default,
        rename = "not-equal",
        skip_serializing_if = "Option::is_none"
    )]
    pub not_equal: Option<WhenComparison>,

    /// Check if a command succeeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Check if a path exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<String>,

    /// Check if environment variable is set
    #[serde(default, rename = "env-set", skip_serializing_if = "Option::is_none")]
    pub env_set: Option<String>,

    /// Check if environment variable is not set
    #[serde(
        default,
        rename = "env-not-set",
        skip_serializing_if = "Option::is_none"
    )]
    pub env_not_set: Option<String>,
}

/// A comparison for when conditions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhenComparison {
    /// Left-hand side of comparison
    pub left: String,

    /// Right-hand side of comparison
    pub right: String,
}

/// Deserialize either a single value or a sequence of values.
///
/// `status: test -d .vercel` and `status: [test -d .vercel]` mean the same
/// thing, and so do a lone command mapping and a list of them.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| T::deserialize(item).map_err(D::Error::custom))
            .collect(),
        // Null or not present
        Value::Null => Ok(Vec::new()),
        other => {
            let item = T::deserialize(other).map_err(D::Error::custom)?;
            Ok(vec![item])
        }
    }
}
