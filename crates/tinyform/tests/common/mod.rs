#![allow(deprecated)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const PUBLIC_KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5 deploy@host";

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("id_rsa.pub"), format!("{}\n", PUBLIC_KEY)).unwrap();
        Self { root }
    }

    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.root.path().join("main.tf");
        fs::write(&path, content).unwrap();
        path
    }

    #[allow(dead_code)]
    pub fn write_state(&self, content: &str) {
        fs::write(self.state_path(), content).unwrap();
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.path().join(".tfstate")
    }

    /// ユーザー設定と環境変数から切り離したコマンド
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("tinyform").unwrap();
        cmd.current_dir(self.root.path())
            .env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.root.path().join("config"))
            .env_remove("TINYFORM_CONFIG_PATH")
            .env_remove("TINYFORM_API_URL")
            .env_remove("TINYFORM_STATE_FILE")
            .env_remove("TINYFORM_MAX_POLL_ATTEMPTS")
            .env("TINYFORM_PUBLIC_KEY", self.root.path().join("id_rsa.pub"))
            .env("TINYFORM_POLL_INTERVAL", "1");
        cmd
    }
}
