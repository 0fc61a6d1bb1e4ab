use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::SmartsubConfig;
use crate::export::ResultMetadata;
use crate::subtitle::{TranscriptInput, generate_smart_srt};

/// One transcription task as persisted by the polling layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
}

impl TaskRecord {
    /// The result payload, if the task finished with one.
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref().filter(|value| match value {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            _ => true,
        })
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no task matches '{0}'")]
    UnknownTask(String),

    #[error("'{prefix}' matches {count} tasks; use a longer id")]
    AmbiguousTask { prefix: String, count: usize },

    #[error("no task is selected")]
    NoSelection,

    #[error("task {0} has no result to export")]
    ResultUnavailable(String),

    #[error("failed to generate subtitles for task {0}")]
    SegmentationFailed(String),
}

/// Selection state over a list of tasks.
///
/// Tasks live in an arena and are addressed by index; `by_id` maps task ids
/// to their slot. Selecting a task resets the threshold to the language
/// default for that task.
pub struct ExportSession {
    tasks: Vec<TaskRecord>,
    by_id: HashMap<String, usize>,
    selected: Option<usize>,
    min_length: usize,
    config: SmartsubConfig,
}

impl ExportSession {
    pub fn new(tasks: Vec<TaskRecord>, config: SmartsubConfig) -> Self {
        let by_id = tasks
            .iter()
            .enumerate()
            .map(|(slot, task)| (task.id.clone(), slot))
            .collect();
        let min_length = config.latin_min_length;

        Self {
            tasks,
            by_id,
            selected: None,
            min_length,
            config,
        }
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    /// Select by full id or by an unambiguous id prefix.
    pub fn select(&mut self, id: &str) -> Result<&TaskRecord, SessionError> {
        let slot = match self.by_id.get(id) {
            Some(slot) => *slot,
            None => self.slot_for_prefix(id)?,
        };

        let task = &self.tasks[slot];
        let result = task
            .result()
            .ok_or_else(|| SessionError::ResultUnavailable(task.id.clone()))?;
        let text = TranscriptInput::from_value(result)
            .map(|input| input.text().to_string())
            .unwrap_or_default();

        self.min_length = self.config.min_length_for(&text);
        self.selected = Some(slot);
        Ok(&self.tasks[slot])
    }

    fn slot_for_prefix(&self, prefix: &str) -> Result<usize, SessionError> {
        if prefix.is_empty() {
            return Err(SessionError::UnknownTask(prefix.to_string()));
        }

        let matches: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.id.starts_with(prefix))
            .map(|(slot, _)| slot)
            .collect();

        match matches.as_slice() {
            [slot] => Ok(*slot),
            [] => Err(SessionError::UnknownTask(prefix.to_string())),
            many => Err(SessionError::AmbiguousTask {
                prefix: prefix.to_string(),
                count: many.len(),
            }),
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.min_length = self.config.latin_min_length;
    }

    pub fn selected(&self) -> Option<&TaskRecord> {
        self.selected.map(|slot| &self.tasks[slot])
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn set_min_length(&mut self, min_length: usize) {
        self.min_length = min_length.max(1);
    }

    pub fn metadata(&self) -> Result<ResultMetadata, SessionError> {
        let (_, result) = self.selected_result()?;
        Ok(ResultMetadata::from_result(result))
    }

    /// Regenerate the subtitle document for the selected task.
    pub fn preview(&self) -> Result<String, SessionError> {
        let (task, result) = self.selected_result()?;
        let document = generate_smart_srt(result, self.min_length);
        if document.is_empty() {
            return Err(SessionError::SegmentationFailed(task.id.clone()));
        }
        Ok(document)
    }

    fn selected_result(&self) -> Result<(&TaskRecord, &Value), SessionError> {
        let task = self.selected().ok_or(SessionError::NoSelection)?;
        let result = task
            .result()
            .ok_or_else(|| SessionError::ResultUnavailable(task.id.clone()))?;
        Ok((task, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(id: &str, result: Value) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            url: Some(format!("https://video.example/{id}")),
            status: Some("completed".to_string()),
            result: Some(result),
        }
    }

    fn session() -> ExportSession {
        ExportSession::new(
            vec![
                task(
                    "abc123",
                    json!({
                        "text": "今天我们聊聊字幕，怎么切分比较自然。",
                        "timestamp": (0..16).map(|i| [i * 100, i * 100 + 100]).collect::<Vec<_>>(),
                        "title": "字幕"
                    }),
                ),
                task("abd999", json!({"text": "plain english words here"})),
                task("zzz000", json!({})),
                task("broken", json!({"text": 7})),
            ],
            SmartsubConfig::default(),
        )
    }

    #[test]
    fn select_by_prefix_sets_language_default() {
        let mut session = session();
        assert_eq!(session.select("abc").unwrap().id, "abc123");
        assert_eq!(session.min_length(), 15);

        session.select("abd999").unwrap();
        assert_eq!(session.min_length(), 40);
    }

    #[test]
    fn selection_errors() {
        let mut session = session();
        assert!(matches!(
            session.select("ab"),
            Err(SessionError::AmbiguousTask { count: 2, .. })
        ));
        assert!(matches!(session.select("nope"), Err(SessionError::UnknownTask(_))));
        assert!(matches!(session.select(""), Err(SessionError::UnknownTask(_))));
        assert!(matches!(
            session.select("zzz"),
            Err(SessionError::ResultUnavailable(_))
        ));
        assert!(session.selected().is_none());
        assert!(matches!(session.preview(), Err(SessionError::NoSelection)));
    }

    #[test]
    fn preview_regenerates_with_threshold() {
        let mut session = session();
        session.select("abc123").unwrap();
        let default = session.preview().unwrap();
        assert_eq!(default.matches("-->").count(), 1);

        session.set_min_length(3);
        let short = session.preview().unwrap();
        assert_eq!(short.matches("-->").count(), 2);
        assert!(short.starts_with("1\n00:00:00,000 --> 00:00:00,800\n今天我们聊聊字幕，\n"));

        session.set_min_length(0);
        assert_eq!(session.min_length(), 1);
    }

    #[test]
    fn segmentation_failure_is_reported() {
        let mut session = session();
        session.select("broken").unwrap();
        assert!(matches!(
            session.preview(),
            Err(SessionError::SegmentationFailed(id)) if id == "broken"
        ));
    }

    #[test]
    fn clearing_selection_resets_threshold() {
        let mut session = session();
        session.select("abc123").unwrap();
        session.set_min_length(5);
        session.clear_selection();
        assert!(session.selected().is_none());
        assert_eq!(session.min_length(), 40);
        assert_eq!(session.tasks().len(), 4);
    }

    #[test]
    fn metadata_comes_from_selected_result() {
        let mut session = session();
        session.select("abc123").unwrap();
        assert_eq!(session.metadata().unwrap().title, "字幕");
    }
}
