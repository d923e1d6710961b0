//! The shipped deployment config, driven against a stand-in deployment CLI

#![cfg(unix)]

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::env;
use std::fs;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command as StdCommand, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const DEMO_CONFIG: &str = include_str!("../demos/chore.yml");

/// Records its arguments, creates `.vercel` on link, and on deploy notes
/// whether the bundle files are in place. Exits 3 on deploy when
/// FAIL_DEPLOY is set; touches HANG_DEPLOY and waits when that is set.
const FAKE_VERCEL: &str = r#"#!/bin/sh
echo "$*" >> "$VERCEL_LOG"
case "$1" in
  link)
    mkdir -p .vercel
    ;;
  deploy)
    if [ -f esperoj.tar.gz ] && [ -d scripts ]; then
      echo "bundle present" >> "$VERCEL_LOG"
    fi
    if [ -n "$HANG_DEPLOY" ]; then
      touch "$HANG_DEPLOY"
      sleep 30
    fi
    if [ -n "$FAIL_DEPLOY" ]; then
      exit 3
    fi
    ;;
esac
"#;

struct Fixture {
    _root: TempDir,
    project: PathBuf,
    home: PathBuf,
    bin: PathBuf,
    vercel_log: PathBuf,
    config_file: PathBuf,
    scripts_folder: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let project = root.path().join("web");
        let home = root.path().join("home");
        let bin = root.path().join("bin");
        let secrets = root.path().join("secrets");

        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&home).unwrap();
        fs::create_dir_all(secrets.join("scripts")).unwrap();

        fs::write(project.join("chore.yml"), DEMO_CONFIG).unwrap();
        common::write_script(&bin.join("vercel"), FAKE_VERCEL);

        let config_file = secrets.join("esperoj.toml");
        fs::write(&config_file, "[storage]\n").unwrap();
        let scripts_folder = secrets.join("scripts");
        fs::write(scripts_folder.join("run.sh"), "echo hi\n").unwrap();

        Fixture {
            vercel_log: root.path().join("vercel.log"),
            _root: root,
            project,
            home,
            bin,
            config_file,
            scripts_folder,
        }
    }

    fn chore(&self) -> Command {
        Command::from_std(self.std_command())
    }

    fn std_command(&self) -> StdCommand {
        let path = format!(
            "{}:{}",
            self.bin.display(),
            env::var("PATH").unwrap_or_default()
        );

        let mut cmd = StdCommand::new(env!("CARGO_BIN_EXE_chore"));
        cmd.current_dir(&self.project)
            .env("PATH", path)
            .env("HOME", &self.home)
            .env("NO_COLOR", "1")
            .env("VERCEL_LOG", &self.vercel_log)
            .env("ESPEROJ_CONFIG_FILE", &self.config_file)
            .env("ESPEROJ_SCRIPTS_FOLDER", &self.scripts_folder)
            .env_remove("VERCEL_TOKEN")
            .env_remove("MACHINE_NAME")
            .env_remove("FAIL_DEPLOY")
            .env_remove("HANG_DEPLOY")
            .env_remove("CHORE_LOG");
        cmd
    }

    fn write_dotenv(&self, contents: &str) {
        fs::write(self.project.join(".env"), contents).unwrap();
    }

    fn vercel_calls(&self) -> Vec<String> {
        fs::read_to_string(&self.vercel_log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn assert_cleaned_up(&self) {
        assert!(!self.project.join("esperoj.tar.gz").exists());
        assert!(!self.project.join("scripts").exists());
        // The originals are untouched
        assert!(self.config_file.exists());
        assert!(self.scripts_folder.join("run.sh").exists());
    }
}

#[test]
fn test_setup_links_when_marker_missing() {
    let fx = Fixture::new();
    fx.write_dotenv("VERCEL_TOKEN=tok-from-file\n");

    fx.chore()
        .arg("setup")
        .assert()
        .success()
        .stderr(predicate::str::contains("--token=***"))
        .stderr(predicate::str::contains("tok-from-file").not());

    assert_eq!(fx.vercel_calls(), vec!["link --yes --token=tok-from-file"]);
    assert!(fx.project.join(".vercel").exists());
}

#[test]
fn test_setup_skipped_when_marker_present() {
    let fx = Fixture::new();
    fx.write_dotenv("VERCEL_TOKEN=tok-from-file\n");
    fs::create_dir(fx.project.join(".vercel")).unwrap();

    fx.chore().arg("setup").assert().success();

    assert!(fx.vercel_calls().is_empty());
}

#[test]
fn test_parent_environment_beats_env_file() {
    let fx = Fixture::new();
    fx.write_dotenv("VERCEL_TOKEN=tok-from-file\n");

    fx.chore()
        .env("VERCEL_TOKEN", "tok-from-shell")
        .arg("setup")
        .assert()
        .success();

    assert_eq!(fx.vercel_calls(), vec!["link --yes --token=tok-from-shell"]);
}

#[test]
fn test_machine_env_file_under_home() {
    let fx = Fixture::new();
    let machine_dir = fx.home.join(".config/esperoj");
    fs::create_dir_all(&machine_dir).unwrap();
    fs::write(machine_dir.join("laptop.env"), "VERCEL_TOKEN=tok-machine\n").unwrap();

    fx.chore()
        .env("MACHINE_NAME", "laptop")
        .arg("setup")
        .assert()
        .success();

    assert_eq!(fx.vercel_calls(), vec!["link --yes --token=tok-machine"]);
}

#[test]
fn test_deploy_runs_setup_bundles_and_cleans_up() {
    let fx = Fixture::new();
    fx.write_dotenv("VERCEL_TOKEN=tok\n");

    fx.chore().arg("deploy").assert().success();

    assert_eq!(
        fx.vercel_calls(),
        vec![
            "link --yes --token=tok",
            "deploy --prod --yes --token=tok",
            "bundle present",
        ]
    );
    fx.assert_cleaned_up();
}

#[test]
fn test_deploy_with_linked_project_skips_link() {
    let fx = Fixture::new();
    fx.write_dotenv("VERCEL_TOKEN=tok\n");
    fs::create_dir(fx.project.join(".vercel")).unwrap();

    fx.chore().arg("deploy").assert().success();

    assert_eq!(
        fx.vercel_calls(),
        vec!["deploy --prod --yes --token=tok", "bundle present"]
    );
    fx.assert_cleaned_up();
}

#[test]
fn test_failed_deploy_still_cleans_up() {
    let fx = Fixture::new();
    fx.write_dotenv("VERCEL_TOKEN=tok\n");

    fx.chore()
        .env("FAIL_DEPLOY", "1")
        .arg("deploy")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Task 'deploy' failed"))
        .stderr(predicate::str::contains("--token=tok").not());

    assert_eq!(fx.vercel_calls().len(), 3);
    fx.assert_cleaned_up();
}

#[test]
fn test_interrupted_deploy_still_cleans_up() {
    let fx = Fixture::new();
    fx.write_dotenv("VERCEL_TOKEN=tok\n");
    fs::create_dir(fx.project.join(".vercel")).unwrap();
    let started = fx.vercel_log.with_file_name("deploy-started");

    // Own process group, so the signal reaches chore and its children
    // together the way Ctrl-C in a terminal does
    let child = fx
        .std_command()
        .env("HANG_DEPLOY", &started)
        .arg("deploy")
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .process_group(0)
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(20);
    while !started.exists() {
        assert!(Instant::now() < deadline, "deploy command never started");
        thread::sleep(Duration::from_millis(50));
    }
    assert!(fx.project.join("esperoj.tar.gz").exists());

    let killed = StdCommand::new("kill")
        .args(["-INT", "--", &format!("-{}", child.id())])
        .status()
        .unwrap();
    assert!(killed.success());

    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(130));
    fx.assert_cleaned_up();
}

#[test]
fn test_missing_token_is_fatal() {
    let fx = Fixture::new();

    fx.chore()
        .arg("setup")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("VERCEL_TOKEN"));

    assert!(fx.vercel_calls().is_empty());
    assert!(!fx.project.join(".vercel").exists());
}
