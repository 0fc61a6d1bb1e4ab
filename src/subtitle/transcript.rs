use serde_json::{Map, Value};

use super::SegmentError;

/// Marks an interval bound that was not an integer; renders as the fallback timecode.
pub const INVALID_MILLIS: i64 = -1;

/// Time span of one content character, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

/// A transcription result reduced to what segmentation needs.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptInput {
    Timed {
        text: String,
        /// One slot per `timestamp` entry; `None` marks an entry that is not a
        /// `[start, end]` pair and only fails segmentation if it gets read.
        intervals: Vec<Option<Interval>>,
    },
    /// The service already returned a rendered subtitle document.
    Rendered(String),
}

impl TranscriptInput {
    /// Normalize a result as returned by the transcription service: either a
    /// mapping or a list whose first element is the mapping.
    ///
    /// Text is read from `text`, then `transcription`; a `srt` field is used
    /// only when neither exists. Missing fields yield empty text.
    pub fn from_value(value: &Value) -> Result<Self, SegmentError> {
        let data = match value {
            Value::Array(items) => items.first().ok_or(SegmentError::EmptyResultList)?,
            other => other,
        };
        let Value::Object(map) = data else {
            return Err(SegmentError::UnexpectedShape(json_kind(data)));
        };

        let text = if let Some(text) = map.get("text") {
            as_text("text", text)?
        } else if let Some(text) = map.get("transcription") {
            as_text("transcription", text)?
        } else if let Some(srt) = map.get("srt") {
            return Ok(Self::Rendered(as_text("srt", srt)?));
        } else {
            String::new()
        };

        Ok(Self::Timed {
            text,
            intervals: read_intervals(map),
        })
    }

    /// The recognized text, or the rendered document for pass-through input.
    pub fn text(&self) -> &str {
        match self {
            Self::Timed { text, .. } => text,
            Self::Rendered(document) => document,
        }
    }
}

fn as_text(field: &'static str, value: &Value) -> Result<String, SegmentError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or(SegmentError::NonTextField {
            field,
            kind: json_kind(value),
        })
}

fn read_intervals(map: &Map<String, Value>) -> Vec<Option<Interval>> {
    let Some(Value::Array(entries)) = map.get("timestamp") else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| match entry.as_array().map(Vec::as_slice) {
            Some([start, end]) => Some(Interval::new(millis(start), millis(end))),
            _ => None,
        })
        .collect()
}

fn millis(value: &Value) -> i64 {
    value
        .as_i64()
        .filter(|ms| *ms >= 0)
        .unwrap_or(INVALID_MILLIS)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_first_element_of_list() {
        let input = TranscriptInput::from_value(&json!([
            {"text": "hi", "timestamp": [[0, 10], [10, 20]]},
            {"text": "ignored"}
        ]))
        .unwrap();
        assert_eq!(
            input,
            TranscriptInput::Timed {
                text: "hi".into(),
                intervals: vec![Some(Interval::new(0, 10)), Some(Interval::new(10, 20))],
            }
        );
    }

    #[test]
    fn text_takes_priority_over_srt() {
        let input = TranscriptInput::from_value(&json!({
            "transcription": "spoken",
            "srt": "1\n00:00:00,000 --> 00:00:01,000\nold\n\n"
        }))
        .unwrap();
        assert_eq!(input.text(), "spoken");
        assert!(matches!(input, TranscriptInput::Timed { ref intervals, .. } if intervals.is_empty()));
    }

    #[test]
    fn srt_passes_through() {
        let input = TranscriptInput::from_value(&json!({"srt": "prebuilt"})).unwrap();
        assert_eq!(input, TranscriptInput::Rendered("prebuilt".into()));
    }

    #[test]
    fn missing_fields_mean_empty_text() {
        let input = TranscriptInput::from_value(&json!({"title": "x", "timestamp": "nope"})).unwrap();
        assert_eq!(input.text(), "");
    }

    #[test]
    fn non_integer_bounds_are_marked_invalid() {
        let input = TranscriptInput::from_value(&json!({
            "text": "ab",
            "timestamp": [[1.5, "x"], [-3, 40]]
        }))
        .unwrap();
        let TranscriptInput::Timed { intervals, .. } = input else {
            panic!("expected timed input");
        };
        assert_eq!(
            intervals,
            vec![
                Some(Interval::new(INVALID_MILLIS, INVALID_MILLIS)),
                Some(Interval::new(INVALID_MILLIS, 40))
            ]
        );
    }

    #[test]
    fn rejects_unexpected_shapes() {
        assert!(matches!(
            TranscriptInput::from_value(&json!("text")),
            Err(SegmentError::UnexpectedShape("string"))
        ));
        assert!(matches!(
            TranscriptInput::from_value(&json!([])),
            Err(SegmentError::EmptyResultList)
        ));
        assert!(matches!(
            TranscriptInput::from_value(&json!({"text": null})),
            Err(SegmentError::NonTextField { field: "text", .. })
        ));
    }

    #[test]
    fn malformed_entries_are_kept_as_empty_slots() {
        let input = TranscriptInput::from_value(&json!({
            "text": "a",
            "timestamp": [[0, 1], [2], "x", [3, 4, 5]]
        }))
        .unwrap();
        assert_eq!(
            input,
            TranscriptInput::Timed {
                text: "a".into(),
                intervals: vec![Some(Interval::new(0, 1)), None, None, None],
            }
        );
    }
}
