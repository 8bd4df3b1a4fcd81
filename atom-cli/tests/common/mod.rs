#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

pub const AUTHORITY: &str = "0x1111111111111111111111111111111111111111";
pub const REGISTRAR: &str = "0x2222222222222222222222222222222222222222";
pub const COLLECTION: &str = "0xc0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0";
pub const OWNER: &str = "0x0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e";
pub const AGENT: &str = "0xa5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5";

pub struct TestEnv {
    pub home_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home_dir: TempDir::new().unwrap(),
        }
    }

    pub fn atom(&self) -> Command {
        let mut cmd = Command::cargo_bin("atom").unwrap();
        let path = self.home_dir.path();
        cmd.env("HOME", path);
        cmd.env("USERPROFILE", path);
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Default state directory under the fake home.
    pub fn state_dir(&self) -> PathBuf {
        self.home_dir.path().join(".atom")
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.home_dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Engine initialized, collection and agent registered, stats record created.
    pub fn with_agent() -> Self {
        let env = Self::new();
        env.atom()
            .args(["init", "--authority", AUTHORITY, "--registrar", REGISTRAR])
            .assert()
            .success();
        env.atom()
            .args(["directory", "add-collection", COLLECTION])
            .assert()
            .success();
        env.atom()
            .args(["directory", "add-asset", "--asset", AGENT, "--owner", OWNER, "--collection", COLLECTION])
            .assert()
            .success();
        env.atom()
            .args(["stats", "init", "--agent", AGENT, "--owner", OWNER, "--collection", COLLECTION])
            .assert()
            .success();
        env
    }

    pub fn show_json(&self, now: u64) -> serde_json::Value {
        let out = self
            .atom()
            .args(["stats", "show", "--agent", AGENT, "--json", "--now", &now.to_string()])
            .output()
            .unwrap();
        assert!(out.status.success());
        serde_json::from_slice(&out.stdout).unwrap()
    }
}
