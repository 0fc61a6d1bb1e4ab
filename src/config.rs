use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::export::SubtitleFormat;
use crate::subtitle::language::{CJK_MIN_LENGTH, LATIN_MIN_LENGTH, LanguageProfile};

pub fn smartsub_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join("smartsub"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(smartsub_config_dir()?.join("config.toml"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartsubConfig {
    /// Directory exports are written to; relative paths resolve against the working directory
    pub download_dir: PathBuf,
    /// Default soft-break threshold for Chinese, Japanese and Korean transcripts
    pub cjk_min_length: usize,
    /// Default soft-break threshold for other transcripts
    pub latin_min_length: usize,
    /// Format used when --format is not given
    pub default_format: SubtitleFormat,
}

impl Default for SmartsubConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("download"),
            cjk_min_length: CJK_MIN_LENGTH,
            latin_min_length: LATIN_MIN_LENGTH,
            default_format: SubtitleFormat::default(),
        }
    }
}

impl SmartsubConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load_from_path(default_config_path()?),
        }
    }

    /// Read the config at `path`, falling back to defaults when it is missing.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading smartsub config from {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing smartsub config {}", path.display()))?;
        config.repair();
        Ok(config)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }

        let toml = toml::to_string_pretty(self).context("serializing smartsub config")?;
        fs::write(path, toml).with_context(|| format!("writing config to {}", path.display()))?;
        Ok(())
    }

    /// Thresholds of zero would break on every comma; reset them.
    fn repair(&mut self) {
        if self.cjk_min_length == 0 {
            self.cjk_min_length = CJK_MIN_LENGTH;
        }
        if self.latin_min_length == 0 {
            self.latin_min_length = LATIN_MIN_LENGTH;
        }
        if self.download_dir.as_os_str().is_empty() {
            self.download_dir = Self::default().download_dir;
        }
    }

    /// Suggested threshold for `text` given the configured defaults.
    pub fn min_length_for(&self, text: &str) -> usize {
        LanguageProfile::of(text).min_length_with(self.cjk_min_length, self.latin_min_length)
    }
}
