use serde_json::Value;

use crate::ui::prelude::*;

use super::SegmentError;
use super::srt::{SubtitleCue, render_document};
use super::transcript::{Interval, TranscriptInput};

/// Always end a clause.
const HARD_BREAKS: [char; 10] = ['。', '？', '！', '；', '：', '?', '!', ';', ':', '\n'];
/// End a clause once it has reached the minimum length.
const SOFT_BREAKS: [char; 5] = ['，', '、', ',', '.', ' '];
/// File, group, record and unit separators: blank in transcripts, though
/// `char::is_whitespace` does not include them.
const SEPARATOR_CONTROLS: [char; 4] = ['\u{1c}', '\u{1d}', '\u{1e}', '\u{1f}'];

pub fn is_space(c: char) -> bool {
    c.is_whitespace() || SEPARATOR_CONTROLS.contains(&c)
}

fn trim_space(s: &str) -> &str {
    s.trim_matches(is_space)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    HardBreak,
    SoftBreak,
    /// Whitespace outside both break sets: buffered, never timed, never breaks.
    Whitespace,
    /// Consumes one interval while any remain.
    Content,
}

pub fn classify(c: char) -> CharClass {
    if HARD_BREAKS.contains(&c) {
        CharClass::HardBreak
    } else if SOFT_BREAKS.contains(&c) {
        CharClass::SoftBreak
    } else if is_space(c) {
        CharClass::Whitespace
    } else {
        CharClass::Content
    }
}

#[derive(Debug, Default)]
struct Clause {
    text: String,
    chars: usize,
    start: Option<i64>,
}

/// Single-pass clause accumulator.
///
/// `open` is `None` between a flush and the next character. The end time is
/// kept across flushes: clauses without any timed character borrow the last
/// known end for both bounds. Interval slots are only inspected when a
/// content character reads them, so a malformed slot past the last content
/// character is never an error.
pub struct Segmenter<'a> {
    intervals: &'a [Option<Interval>],
    cursor: usize,
    min_length: usize,
    open: Option<Clause>,
    last_end: i64,
    cues: Vec<SubtitleCue>,
}

impl<'a> Segmenter<'a> {
    pub fn new(intervals: &'a [Option<Interval>], min_length: usize) -> Self {
        Self {
            intervals,
            cursor: 0,
            min_length,
            open: None,
            last_end: 0,
            cues: Vec::new(),
        }
    }

    pub fn push(&mut self, c: char) -> Result<(), SegmentError> {
        let class = classify(c);
        let interval = match class {
            CharClass::Content => self.next_interval()?,
            _ => None,
        };
        if let Some(interval) = interval {
            self.last_end = interval.end;
        }

        let min_length = self.min_length;
        let clause = self.open.get_or_insert_with(Clause::default);
        if let Some(interval) = interval {
            clause.start.get_or_insert(interval.start);
        }
        clause.text.push(c);
        clause.chars += 1;

        let should_flush = match class {
            CharClass::HardBreak => true,
            CharClass::SoftBreak => clause.chars >= min_length,
            CharClass::Whitespace | CharClass::Content => false,
        };
        if should_flush {
            self.flush();
        }
        Ok(())
    }

    fn next_interval(&mut self) -> Result<Option<Interval>, SegmentError> {
        let Some(&slot) = self.intervals.get(self.cursor) else {
            return Ok(None);
        };
        let position = self.cursor;
        self.cursor += 1;
        slot.map(Some)
            .ok_or(SegmentError::MalformedInterval { position })
    }

    /// Emit the open clause as a cue. A clause holding only whitespace stays
    /// open so its characters still count toward the next clause's length.
    fn flush(&mut self) {
        let Some(clause) = self.open.take_if(|clause| !trim_space(&clause.text).is_empty()) else {
            return;
        };

        self.cues.push(SubtitleCue {
            index: self.cues.len() + 1,
            start_ms: clause.start.unwrap_or(self.last_end),
            end_ms: self.last_end,
            text: trim_space(&clause.text).to_string(),
        });
    }

    pub fn finish(mut self) -> Vec<SubtitleCue> {
        self.flush();
        self.cues
    }
}

/// Split `text` into cues at hard breaks, and at soft breaks once a clause has
/// at least `min_length` characters. Trailing text always becomes a final cue.
///
/// `None` slots stand for malformed `timestamp` entries and fail segmentation
/// only when a content character reaches them.
pub fn segment(
    text: &str,
    intervals: &[Option<Interval>],
    min_length: usize,
) -> Result<Vec<SubtitleCue>, SegmentError> {
    let mut segmenter = Segmenter::new(intervals, min_length);
    for c in text.chars() {
        segmenter.push(c)?;
    }
    Ok(segmenter.finish())
}

/// Render a transcription result as an SRT document.
///
/// Never fails: an unusable result yields an empty string, which callers must
/// report as a failed segmentation. A result carrying a pre-rendered `srt`
/// field is returned unchanged.
pub fn generate_smart_srt(result: &Value, min_length: usize) -> String {
    match try_generate(result, min_length) {
        Ok(document) => document,
        Err(err) => {
            emit(
                Level::Debug,
                "subtitle.generate.failed",
                &format!("Subtitle generation failed: {err}"),
                None,
            );
            String::new()
        }
    }
}

fn try_generate(result: &Value, min_length: usize) -> Result<String, SegmentError> {
    match TranscriptInput::from_value(result)? {
        TranscriptInput::Rendered(document) => {
            emit(
                Level::Debug,
                "subtitle.generate.passthrough",
                "Result already contains a subtitle document, using it as is",
                None,
            );
            Ok(document)
        }
        TranscriptInput::Timed { text, intervals } => {
            let content = text
                .chars()
                .filter(|c| classify(*c) == CharClass::Content)
                .count();
            if content != intervals.len() {
                emit(
                    Level::Debug,
                    "subtitle.generate.misaligned",
                    &format!(
                        "Transcript has {content} content characters but {} intervals",
                        intervals.len()
                    ),
                    None,
                );
            }
            Ok(render_document(&segment(&text, &intervals, min_length)?))
        }
    }
}
