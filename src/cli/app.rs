//! Main CLI application

use crate::cli::completion;
use crate::config::{find_config_file, parse_config_file, Config};
use crate::envfile::load_env_files;
use crate::error::ChoreError;
use crate::runner::{interpolate_map, Context, Interrupt, Runner, Verbosity};
use crate::ui;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Task to run when none is named on the command line
pub const DEFAULT_TASK: &str = "default";

/// CLI application
pub struct App {
    /// Parsed configuration
    config: Config,
    /// Config file path
    config_path: PathBuf,
    /// Validated runtime tasks
    runner: Runner,
}

impl App {
    /// Create a new app by discovering the config file
    pub fn new() -> Result<Self, ChoreError> {
        Self::with_config_file(find_config_file()?)
    }

    /// Create app with a specific config file
    pub fn with_config_file(path: PathBuf) -> Result<Self, ChoreError> {
        let config_path = absolute(path)?;
        let config = parse_config_file(&config_path)?;
        let runner = Runner::from_config(&config)?;
        debug!(path = %config_path.display(), tasks = config.tasks.len(), "loaded config");

        Ok(App {
            config,
            config_path,
            runner,
        })
    }

    /// Directory holding the config file; tasks run here by default
    pub fn config_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Print the task listing to stdout; `verbose` adds descriptions
    pub fn print_tasks(&self, verbose: bool) -> Result<(), ChoreError> {
        let title = self.config.name.as_deref().or(self.config.usage.as_deref());
        ui::write_task_list(
            &mut io::stdout().lock(),
            title,
            &self.runner.summaries(),
            verbose,
        )?;
        Ok(())
    }

    /// Run the application with already parsed command line arguments
    pub fn run(self, matches: &ArgMatches, interrupt: Interrupt) -> Result<(), ChoreError> {
        let (tasks, overrides) = split_targets(
            matches
                .get_many::<String>("targets")
                .into_iter()
                .flatten()
                .map(String::as_str),
        );

        let verbose = get_verbosity(matches) == Verbosity::Verbose;
        if matches.get_flag("list") {
            return self.print_tasks(verbose);
        }

        let tasks = if tasks.is_empty() {
            if self.runner.task(DEFAULT_TASK).is_none() {
                return self.print_tasks(verbose);
            }
            vec![DEFAULT_TASK.to_string()]
        } else {
            tasks
        };

        let mut ctx = self.context(matches, overrides)?.with_interrupt(interrupt);
        self.runner.run_all(&tasks, &mut ctx)?;

        Ok(())
    }

    /// Build the execution context: env files, global env, then overrides
    fn context(
        &self,
        matches: &ArgMatches,
        overrides: HashMap<String, String>,
    ) -> Result<Context, ChoreError> {
        let config_dir = self.config_dir();

        let mut candidates = Vec::new();
        if let Some(files) = matches.get_many::<PathBuf>("env-file") {
            for file in files {
                candidates.push(absolute(file.clone())?.display().to_string());
            }
        }
        candidates.extend(self.config.dotenv.iter().cloned());

        let mut vars = load_env_files(&candidates, &config_dir)?;
        let global = interpolate_map(&self.config.env, &vars)?;
        vars.extend(global);

        let mut ctx = Context::new()
            .with_working_dir(config_dir)
            .with_config_path(self.config_path.clone())
            .with_vars(vars)
            .with_overrides(overrides)
            .with_verbosity(get_verbosity(matches))
            .with_dry_run(matches.get_flag("dry-run"))
            .with_force(matches.get_flag("force"));

        if let Some(interpreter) = &self.config.interpreter {
            ctx = ctx.with_interpreter(interpreter.clone());
        }

        Ok(ctx)
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("chore")
        .version(crate::VERSION)
        .about("A small YAML-based task runner")
        .arg(
            Arg::new("targets")
                .value_name("TASK|NAME=VALUE")
                .help("Tasks to run, and variable assignments for them")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to chore.yml config file"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List available tasks")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("env-file")
                .long("env-file")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Env file probed before those in the config (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Print commands without running them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .help("Run tasks even when their status checks pass")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(value_parser!(Shell))
                .help("Print a shell completion script and exit"),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Separate task names from `NAME=VALUE` assignments
fn split_targets<'a, I>(targets: I) -> (Vec<String>, HashMap<String, String>)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tasks = Vec::new();
    let mut overrides = HashMap::new();

    for target in targets {
        match target.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                overrides.insert(name.to_string(), value.to_string());
            }
            _ => tasks.push(target.to_string()),
        }
    }

    (tasks, overrides)
}

fn absolute(path: PathBuf) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Run the CLI application with the process arguments
pub fn run(interrupt: Interrupt) -> Result<(), ChoreError> {
    run_from(env::args_os(), interrupt)
}

/// Run the CLI application with provided arguments
pub fn run_from<I, T>(args: I, interrupt: Interrupt) -> Result<(), ChoreError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command().get_matches_from(args);

    if let Some(shell) = matches.get_one::<Shell>("completions") {
        completion::print_completions(*shell, &mut io::stdout());
        return Ok(());
    }

    let app = match matches.get_one::<PathBuf>("file") {
        Some(path) => App::with_config_file(path.clone())?,
        None => App::new()?,
    };

    app.run(&matches, interrupt)
}
