use anyhow::Result;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Config file passed to every command; it does not exist unless a test writes it.
    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    pub fn write_json(&self, name: &str, value: &Value) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }
}
