use anyhow::Context;
use chrono::Local;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::subtitle::plain_text;

const MAX_STEM_CHARS: usize = 180;
const TASK_ID_PREFIX: usize = 5;

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex =
        Regex::new(r#"[<>:"/\\|?*\x00-\x1f\x7f]"#).expect("valid filename regex");
    static ref REPEATED_UNDERSCORES: Regex = Regex::new(r"_{2,}").expect("valid underscore regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Txt,
}

impl SubtitleFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Txt => "txt",
        }
    }

    /// Convert a rendered SRT document into this format's file contents.
    pub fn render(self, document: &str) -> anyhow::Result<String> {
        match self {
            SubtitleFormat::Srt => Ok(document.to_string()),
            SubtitleFormat::Txt => plain_text(document),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("subtitle document is empty; segmentation produced no cues")]
    EmptyDocument,

    #[error("{} already exists (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Render(#[from] anyhow::Error),
}

/// Descriptive fields the transcription service attaches to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultMetadata {
    pub datestr: String,
    pub uploader: String,
    pub title: String,
}

impl ResultMetadata {
    pub fn from_result(result: &Value) -> Self {
        let data = match result {
            Value::Array(items) => items.first().unwrap_or(&Value::Null),
            other => other,
        };
        let field = |key: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        Self {
            datestr: field("datestr").unwrap_or_else(|| Local::now().format("%y%m%d").to_string()),
            uploader: field("uploader").unwrap_or_else(|| "unknown-uploader".to_string()),
            title: field("title").unwrap_or_else(|| "unknown-title".to_string()),
        }
    }
}

/// `{datestr}_{uploader}_{title}_{task id prefix}`, made safe for a file name.
pub fn export_file_stem(metadata: &ResultMetadata, task_id: &str) -> String {
    let id_prefix: String = task_id.chars().take(TASK_ID_PREFIX).collect();
    sanitize_filename(&format!(
        "{}_{}_{}_{}",
        metadata.datestr, metadata.uploader, metadata.title, id_prefix
    ))
}

pub fn sanitize_filename(name: &str) -> String {
    let replaced = UNSAFE_FILENAME_CHARS.replace_all(name, "_");
    let collapsed = REPEATED_UNDERSCORES.replace_all(&replaced, "_");
    let trimmed: String = collapsed
        .trim_matches(|c: char| c.is_whitespace() || c == '.')
        .chars()
        .take(MAX_STEM_CHARS)
        .collect();
    let trimmed = trimmed.trim_end_matches(|c: char| c.is_whitespace() || c == '.');

    if trimmed.is_empty() {
        "subtitle".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Write `document` as `<dir>/<stem>.<ext>` and return the path.
pub fn write_subtitle(
    dir: &Path,
    stem: &str,
    format: SubtitleFormat,
    document: &str,
    force: bool,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("{}.{}", stem, format.extension()));
    write_subtitle_to(&path, format, document, force)?;
    Ok(path)
}

/// Write `document` to `path` in `format`, creating parent directories.
///
/// An empty document means segmentation failed and is never written.
pub fn write_subtitle_to(
    path: &Path,
    format: SubtitleFormat,
    document: &str,
    force: bool,
) -> Result<(), ExportError> {
    if document.trim().is_empty() {
        return Err(ExportError::EmptyDocument);
    }
    if path.exists() && !force {
        return Err(ExportError::AlreadyExists(path.to_path_buf()));
    }

    let contents = format
        .render(document)
        .with_context(|| format!("converting subtitles for {}", path.display()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
