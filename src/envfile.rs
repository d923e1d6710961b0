//! Environment file loading
//!
//! Env files are probed in the order given. Only files that exist are
//! read, a key from an earlier file is never replaced by a later one, and
//! nothing already set in the parent environment is overridden.

use crate::error::EnvFileError;
use crate::runner::{has_unresolved, interpolate};
use directories::BaseDirs;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load key=value pairs from the candidate files
///
/// Relative paths resolve against `base_dir`. Paths may reference
/// `${VAR}` (parent environment or a key loaded from an earlier file)
/// and may start with `~/`; a path whose variables cannot be resolved is
/// skipped.
pub fn load_env_files(
    candidates: &[String],
    base_dir: &Path,
) -> Result<HashMap<String, String>, EnvFileError> {
    let mut loaded = HashMap::new();

    for candidate in candidates {
        let Some(path) = resolve_path(candidate, base_dir, &loaded) else {
            debug!(path = %candidate, "skipping env file with unresolved variables");
            continue;
        };

        if !path.is_file() {
            debug!(path = %path.display(), "env file not found");
            continue;
        }

        let iter = dotenvy::from_path_iter(&path).map_err(|e| EnvFileError::Parse {
            path: path.clone(),
            error: e.to_string(),
        })?;

        let mut count = 0usize;
        for item in iter {
            let (key, value) = item.map_err(|e| EnvFileError::Parse {
                path: path.clone(),
                error: e.to_string(),
            })?;

            if env::var_os(&key).is_some() || loaded.contains_key(&key) {
                continue;
            }
            loaded.insert(key, value);
            count += 1;
        }

        debug!(path = %path.display(), count, "loaded env file");
    }

    Ok(loaded)
}

fn resolve_path(
    candidate: &str,
    base_dir: &Path,
    loaded: &HashMap<String, String>,
) -> Option<PathBuf> {
    let expanded = interpolate(candidate, loaded).ok()?;
    if has_unresolved(&expanded) {
        return None;
    }

    let path = match expanded.strip_prefix("~/") {
        Some(rest) => home_dir()?.join(rest),
        None if expanded == "~" => home_dir()?,
        None => PathBuf::from(expanded),
    };

    if path.is_absolute() {
        Some(path)
    } else {
        Some(base_dir.join(path))
    }
}

fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_file_wins() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.env"), "CHORE_EF_ONE=from_a\n").unwrap();
        fs::write(
            temp_dir.path().join("b.env"),
            "CHORE_EF_ONE=from_b\nCHORE_EF_TWO=from_b\n",
        )
        .unwrap();

        let vars = load_env_files(&strings(&["a.env", "b.env"]), temp_dir.path()).unwrap();
        assert_eq!(vars.get("CHORE_EF_ONE").map(String::as_str), Some("from_a"));
        assert_eq!(vars.get("CHORE_EF_TWO").map(String::as_str), Some("from_b"));
    }

    #[test]
    fn test_missing_files_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".env"), "CHORE_EF_PRESENT=1\n").unwrap();

        let vars = load_env_files(&strings(&["nope.env", ".env"]), temp_dir.path()).unwrap();
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_parent_environment_wins() {
        env::set_var("CHORE_EF_PARENT", "parent");
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".env"), "CHORE_EF_PARENT=file\n").unwrap();

        let vars = load_env_files(&strings(&[".env"]), temp_dir.path()).unwrap();
        assert!(!vars.contains_key("CHORE_EF_PARENT"));

        env::remove_var("CHORE_EF_PARENT");
    }

    #[test]
    fn test_path_uses_earlier_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".env"), "CHORE_EF_MACHINE=laptop\n").unwrap();
        fs::write(temp_dir.path().join("laptop.env"), "CHORE_EF_TOKEN=abc\n").unwrap();

        let vars = load_env_files(
            &strings(&[".env", "${CHORE_EF_MACHINE}.env"]),
            temp_dir.path(),
        )
        .unwrap();
        assert_eq!(vars.get("CHORE_EF_TOKEN").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_unresolved_path_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let vars = load_env_files(&strings(&["${CHORE_EF_NOT_SET}/.env"]), temp_dir.path()).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn test_absolute_path() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("abs.env");
        fs::write(&file, "CHORE_EF_ABS=yes\n").unwrap();

        let vars = load_env_files(
            &[file.display().to_string()],
            Path::new("/definitely/not/here"),
        )
        .unwrap();
        assert_eq!(vars.get("CHORE_EF_ABS").map(String::as_str), Some("yes"));
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".env"), "NOT VALID LINE WITHOUT EQUALS\n").unwrap();

        let result = load_env_files(&strings(&[".env"]), temp_dir.path());
        assert!(matches!(result, Err(EnvFileError::Parse { .. })));
    }
}
