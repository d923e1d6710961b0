//! Task interpreter
//!
//! Runs a task's dependencies, its skip-checks, its commands and finally
//! its deferred commands, sharing one [`Context`] across the invocation so
//! that every task runs at most once.

use crate::config::{self, validate_config};
use crate::error::{ConfigResult, ExecutionError, ExecutionResult};
use crate::runner::{
    check_command, execute_command, fingerprint, interpolate_list, interpolate_map,
    interpolate_strict, Command, Context, Task,
};
use crate::ui::TaskSummary;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info_span};

/// The set of runnable tasks loaded from one configuration
#[derive(Debug, Clone)]
pub struct Runner {
    tasks: HashMap<String, Task>,
}

impl Runner {
    /// Validate the configuration and build the runtime tasks
    pub fn from_config(config: &config::Config) -> ConfigResult<Self> {
        validate_config(config)?;

        let tasks = config
            .tasks
            .iter()
            .map(|(name, task)| (name.clone(), Task::from_config(name.clone(), task.clone())))
            .collect();

        Ok(Runner { tasks })
    }

    /// Look up a task by name
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Public tasks sorted by name, for the listing
    pub fn summaries(&self) -> Vec<TaskSummary> {
        let mut summaries: Vec<TaskSummary> = self
            .tasks
            .values()
            .filter(|task| !task.private)
            .map(|task| TaskSummary {
                name: task.name.clone(),
                usage: task.usage.clone(),
                description: task.description.clone(),
                deps: task.deps.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    /// Run several requested tasks in order, stopping at the first failure
    pub fn run_all<S: AsRef<str>>(&self, names: &[S], ctx: &mut Context) -> ExecutionResult<()> {
        for name in names {
            self.run(name.as_ref(), ctx)?;
        }
        Ok(())
    }

    /// Run a task and everything it depends on
    pub fn run(&self, name: &str, ctx: &mut Context) -> ExecutionResult<()> {
        if ctx.is_completed(name) {
            ctx.print_debug(&format!("Task \"{}\" already ran", name));
            return Ok(());
        }

        if ctx.interrupt.is_set() {
            return Err(ExecutionError::Interrupted);
        }

        if ctx.is_task_in_stack(name) {
            let mut chain = ctx.task_stack.clone();
            chain.push(name.to_string());
            return Err(ExecutionError::CircularDependency(chain.join(" -> ")));
        }

        let task = self
            .tasks
            .get(name)
            .ok_or_else(|| ExecutionError::TaskNotFound(name.to_string()))?;

        let _span = info_span!("task", task = %name).entered();

        ctx.push_task(name.to_string());
        let result = self.execute(task, ctx);
        ctx.pop_task();

        if result.is_ok() {
            ctx.mark_completed(name);
        }

        result
    }

    fn execute(&self, task: &Task, ctx: &mut Context) -> ExecutionResult<()> {
        for dep in &task.deps {
            self.run(dep, ctx)?;
        }

        // From here on failures belong to this task
        let wrap = |source: ExecutionError| match source {
            ExecutionError::TaskFailed { .. } => source,
            source => ExecutionError::TaskFailed {
                task: task.name.clone(),
                source: Box::new(source),
            },
        };

        let vars = self.task_vars(task, ctx).map_err(wrap)?;
        let dir = self.task_dir(task, ctx, &vars).map_err(wrap)?;

        let outer_vars = std::mem::replace(&mut ctx.vars, vars);
        let outer_dir = std::mem::replace(&mut ctx.working_dir, dir);

        let result = self.execute_own(task, ctx);

        ctx.vars = outer_vars;
        ctx.working_dir = outer_dir;

        result.map_err(wrap)
    }

    /// Skip-check, then commands, then deferred commands
    fn execute_own(&self, task: &Task, ctx: &mut Context) -> ExecutionResult<()> {
        if !ctx.force {
            if let Some(reason) = self.up_to_date(task, ctx)? {
                ctx.print_task_skip(&task.name, reason);
                return Ok(());
            }
        }

        let result = run_commands(&task.cmds, task.quiet, ctx);

        if task.defer.is_empty() {
            return result;
        }

        ctx.print_debug("Running deferred commands...");
        let deferred = run_deferred(&task.defer, task.quiet, ctx);

        match (result, deferred) {
            (Err(primary), Err(cleanup)) => {
                ctx.print_warning(&format!("deferred command failed: {}", cleanup));
                Err(primary)
            }
            (Err(primary), Ok(())) => Err(primary),
            (Ok(()), deferred) => deferred,
        }
    }

    /// Why the task can be skipped, if it can
    fn up_to_date(&self, task: &Task, ctx: &Context) -> ExecutionResult<Option<&'static str>> {
        if !task.has_skip_checks() {
            return Ok(None);
        }

        for status in &task.status {
            if !check_command(status, ctx) {
                debug!(task = %task.name, status = %status, "status check failed");
                return Ok(None);
            }
        }

        if !task.sources.is_empty() {
            let sources = interpolate_list(&task.sources, &ctx.vars)?;
            let generates = interpolate_list(&task.generates, &ctx.vars)?;
            if !fingerprint::is_up_to_date(&sources, &generates, &ctx.working_dir)? {
                debug!(task = %task.name, "sources changed");
                return Ok(None);
            }
        }

        Ok(Some(if task.status.is_empty() {
            "sources unchanged"
        } else {
            "status check passed"
        }))
    }

    /// Variables for one task: the invocation's vars, the task's own env,
    /// then command-line overrides on top
    fn task_vars(&self, task: &Task, ctx: &Context) -> ExecutionResult<HashMap<String, String>> {
        let mut vars = ctx.vars.clone();
        if !task.env.is_empty() {
            vars.extend(interpolate_map(&task.env, &ctx.vars)?);
            vars.extend(ctx.overrides.clone());
        }
        Ok(vars)
    }

    fn task_dir(
        &self,
        task: &Task,
        ctx: &Context,
        vars: &HashMap<String, String>,
    ) -> ExecutionResult<PathBuf> {
        match &task.dir {
            Some(dir) => Ok(ctx.config_dir().join(interpolate_strict(dir, vars)?)),
            None => Ok(ctx.working_dir.clone()),
        }
    }
}

/// Run the main commands in order; nothing new starts after an interrupt
fn run_commands(cmds: &[Command], quiet: bool, ctx: &Context) -> ExecutionResult<()> {
    for cmd in cmds {
        if ctx.interrupt.is_set() {
            return Err(ExecutionError::Interrupted);
        }
        execute_command(cmd, quiet, ctx)?;
    }
    Ok(())
}

/// Run every deferred command; the first failure is returned, later ones
/// are only reported
fn run_deferred(cmds: &[Command], quiet: bool, ctx: &Context) -> ExecutionResult<()> {
    let mut first_error = None;

    for cmd in cmds {
        if let Err(e) = execute_command(cmd, quiet, ctx) {
            if first_error.is_none() {
                first_error = Some(e);
            } else {
                ctx.print_warning(&format!("deferred command failed: {}", e));
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
