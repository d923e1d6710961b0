//! Variable interpolation for strings
//!
//! This module handles parsing and replacing variables in strings using the ${var} syntax.
//! `$${` produces a literal `${` and is never expanded.

use crate::error::{InterpolationError, InterpolationResult};
use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::sync::OnceLock;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$(\$)?\{([^}]*)\}").expect("interpolation pattern is valid"))
}

/// Interpolate variables in a string
///
/// Supports:
/// - `${var}` - variable from context, inserted as-is
/// - Environment variables (when not found in context)
///
/// Undefined variables are left untouched.
pub fn interpolate(s: &str, vars: &HashMap<String, String>) -> InterpolationResult<String> {
    expand(s, vars, false)
}

/// Interpolate with strict mode - errors on undefined variables
pub fn interpolate_strict(s: &str, vars: &HashMap<String, String>) -> InterpolationResult<String> {
    expand(s, vars, true)
}

/// Interpolate all values in a HashMap
pub fn interpolate_map(
    map: &HashMap<String, String>,
    vars: &HashMap<String, String>,
) -> InterpolationResult<HashMap<String, String>> {
    map.iter()
        .map(|(key, value)| Ok((key.clone(), interpolate_strict(value, vars)?)))
        .collect()
}

/// Interpolate a list of strings
pub fn interpolate_list(
    list: &[String],
    vars: &HashMap<String, String>,
) -> InterpolationResult<Vec<String>> {
    list.iter().map(|s| interpolate_strict(s, vars)).collect()
}

/// Whether the string still holds an unexpanded `${...}` reference
pub fn has_unresolved(s: &str) -> bool {
    pattern()
        .captures_iter(s)
        .any(|caps| caps.get(1).is_none())
}

fn expand(s: &str, vars: &HashMap<String, String>, strict: bool) -> InterpolationResult<String> {
    let mut out = String::with_capacity(s.len());
    let mut last = 0;

    for caps in pattern().captures_iter(s) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&s[last..whole.start()]);
        last = whole.end();

        let raw_name = caps.get(2).map_or("", |m| m.as_str());

        // $${name} is an escape
        if caps.get(1).is_some() {
            out.push_str("${");
            out.push_str(raw_name);
            out.push('}');
            continue;
        }

        let name = raw_name.trim();
        if name.is_empty() {
            if strict {
                return Err(InterpolationError::InvalidSyntax(whole.as_str().to_string()));
            }
            out.push_str(whole.as_str());
            continue;
        }

        match lookup(name, vars) {
            Some(value) => out.push_str(&value),
            None if strict => {
                return Err(InterpolationError::UndefinedVariable(name.to_string()));
            }
            None => out.push_str(whole.as_str()),
        }
    }

    out.push_str(&s[last..]);
    Ok(out)
}

/// Values in `vars` are final (config maps are expanded when loaded, env
/// files are data) and are never expanded a second time
fn lookup(name: &str, vars: &HashMap<String, String>) -> Option<String> {
    vars.get(name).cloned().or_else(|| env::var(name).ok())
}
