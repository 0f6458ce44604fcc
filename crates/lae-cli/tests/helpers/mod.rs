use assert_cmd::Command;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test harness for running CLI commands with temporary databases
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self { temp_dir, db_path }
    }

    /// Get a Command instance configured for testing. It runs inside the
    /// temp directory so no stray `config.toml` is picked up.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("lae").expect("Failed to find lae binary");
        cmd.current_dir(self.temp_dir.path());
        cmd.env("LAE_DATABASE_PATH", &self.db_path);
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Writes a `config.toml` next to the database.
    pub fn write_config(&self, contents: &str) {
        std::fs::write(self.temp_dir.path().join("config.toml"), contents).expect("Failed to write config");
    }

    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Runs a read command with `--json` appended and parses stdout.
    pub fn run_json(&self, args: &[&str]) -> Value {
        let output = self.command().args(args).arg("--json").output().expect("Failed to run lae");
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is not valid JSON")
    }

    /// Runs an `add` command and returns the id printed in parentheses.
    pub fn add(&self, args: &[&str]) -> String {
        let output = self.command().args(args).output().expect("Failed to run lae");
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        extract_id(&stdout).unwrap_or_else(|| panic!("no id in output: {stdout}"))
    }
}

fn extract_id(stdout: &str) -> Option<String> {
    let line = stdout.lines().find(|l| l.starts_with("Added"))?;
    let start = line.rfind('(')? + 1;
    let end = line.rfind(')')?;
    Some(line[start..end].to_string())
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    pub fn added_successfully() -> impl Predicate<str> {
        predicate::str::starts_with("Added")
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }

    pub fn has_event_table_headers() -> impl Predicate<str> {
        predicate::str::contains("Date")
            .and(predicate::str::contains("Slot"))
            .and(predicate::str::contains("Name"))
    }
}
