//! When condition evaluation
//!
//! This module handles evaluating the guards attached to individual commands.

use crate::error::ExecutionResult;
use crate::runner::{check_command, interpolate, interpolate_strict, Context, WhenCondition};
use std::env;

/// Evaluate a list of when conditions (all must be true - AND logic)
pub fn evaluate_when_list(when_list: &[WhenCondition], ctx: &Context) -> ExecutionResult<bool> {
    for when in when_list {
        if !evaluate_when(when, ctx)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluate a single when condition
pub fn evaluate_when(when: &WhenCondition, ctx: &Context) -> ExecutionResult<bool> {
    match when {
        WhenCondition::Equal { left, right } => {
            let left_val = interpolate_strict(left, &ctx.vars)?;
            let right_val = interpolate_strict(right, &ctx.vars)?;
            Ok(left_val == right_val)
        }

        WhenCondition::NotEqual { left, right } => {
            let left_val = interpolate_strict(left, &ctx.vars)?;
            let right_val = interpolate_strict(right, &ctx.vars)?;
            Ok(left_val != right_val)
        }

        WhenCondition::Command(cmd) => Ok(check_command(cmd, ctx)),

        WhenCondition::Exists(path) => {
            let path_str = interpolate_strict(path, &ctx.vars)?;
            Ok(ctx.working_dir.join(path_str).exists())
        }

        WhenCondition::EnvSet(var_name) => Ok(is_var_set(var_name, ctx)),

        WhenCondition::EnvNotSet(var_name) => Ok(!is_var_set(var_name, ctx)),
    }
}

/// A variable counts as set when the context or the process environment has it
fn is_var_set(var_name: &str, ctx: &Context) -> bool {
    let var = interpolate(var_name, &ctx.vars).unwrap_or_else(|_| var_name.to_string());
    ctx.vars.contains_key(&var) || env::var_os(&var).is_some()
}
