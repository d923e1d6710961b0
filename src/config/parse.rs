//! Configuration file parsing and discovery

use crate::config::types::{Config, Task};
use crate::error::{ChoreError, ConfigError, ConfigResult};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &["chore.yml", "chore.yaml"];

/// Find the configuration file by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the configuration file starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                debug!(path = %config_path.display(), "found config file");
                return Ok(config_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> Result<Config, ChoreError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e))
    })?;

    parse_config(&contents, Some(path))
}

/// Parse configuration from a string
pub fn parse_config(yaml: &str, config_path: Option<&Path>) -> Result<Config, ChoreError> {
    let mut config: Config = serde_yaml::from_str(yaml)?;

    if let Some(base_path) = config_path {
        process_includes(&mut config, base_path)?;
    }

    Ok(config)
}

/// Replace tasks that carry an `include` with the task loaded from that file
fn process_includes(config: &mut Config, config_path: &Path) -> ConfigResult<()> {
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    for (task_name, task) in config.tasks.iter_mut() {
        let Some(include_path) = task.include.clone() else {
            continue;
        };

        let full_include_path = base_dir.join(&include_path);
        debug!(task = %task_name, path = %full_include_path.display(), "including task file");

        let included = load_included_task(&full_include_path)?;
        if included.include.is_some() {
            return Err(ConfigError::IncludeFile {
                path: full_include_path,
                error: "included tasks cannot include further files".to_string(),
            });
        }
        *task = included;
    }

    Ok(())
}

/// Load a task from an included file
fn load_included_task(path: &Path) -> ConfigResult<Task> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::IncludeFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    serde_yaml::from_str(&contents).map_err(|e| ConfigError::IncludeFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_simple_config() {
        let yaml = r#"
tasks:
  hello:
    usage: Say hello
    cmds: echo "hello"
"#;
        let config = parse_config(yaml, None).unwrap();
        assert_eq!(config.tasks.len(), 1);
        assert!(config.tasks.contains_key("hello"));
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("chore.yml");

        fs::write(
            &config_path,
            r#"
tasks:
  test:
    cmds: echo "test"
"#,
        )
        .unwrap();

        let found = find_config_file_from(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("chore.yaml");
        let sub_dir = temp_dir.path().join("subdir");

        fs::create_dir(&sub_dir).unwrap();
        fs::write(&config_path, "tasks: {}\n").unwrap();

        let found = find_config_file_from(sub_dir).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_config_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = find_config_file_from(temp_dir.path().to_path_buf());
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_parse_config_with_interpreter() {
        let yaml = r#"
interpreter:
  - bash
  - -c
tasks:
  hello:
    cmds: echo "hello"
"#;
        let config = parse_config(yaml, None).unwrap();
        assert_eq!(
            config.interpreter,
            Some(vec!["bash".to_string(), "-c".to_string()])
        );
    }

    #[test]
    fn test_include_task_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("chore.yml");
        fs::write(
            temp_dir.path().join("deploy.yml"),
            "deps: setup\ncmds: echo deploying\n",
        )
        .unwrap();

        let yaml = r#"
tasks:
  setup:
    cmds: echo setup
  deploy:
    include: deploy.yml
"#;
        let config = parse_config(yaml, Some(&config_path)).unwrap();
        let deploy = config.tasks.get("deploy").unwrap();
        assert_eq!(deploy.deps, vec!["setup".to_string()]);
        assert!(deploy.include.is_none());
    }

    #[test]
    fn test_include_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("chore.yml");

        let yaml = r#"
tasks:
  deploy:
    include: nope.yml
"#;
        let result = parse_config(yaml, Some(&config_path));
        assert!(matches!(
            result,
            Err(ChoreError::Config(ConfigError::IncludeFile { .. }))
        ));
    }
}
