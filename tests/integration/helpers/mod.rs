//! CLI test helpers

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Path to a file under tests/fixtures
pub fn fixture_path(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

/// The binary with an isolated home directory and no credentials.
///
/// The returned `TempDir` must outlive the command.
pub fn analyzer() -> (Command, TempDir) {
    let home = TempDir::new().expect("Failed to create temp home");
    let mut cmd = Command::cargo_bin("codex-analyzer").expect("binary is built");
    cmd.env("HOME", home.path())
        .env_remove("GITHUB_TOKEN")
        .env_remove("OPENAI_API_KEY")
        .env_remove("CODEX_ANALYZER_LOG");
    (cmd, home)
}
