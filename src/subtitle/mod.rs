//! Turning flat transcripts into readable, time-aligned subtitles.
//!
//! A transcript arrives as one text string plus a `[start_ms, end_ms]` pair
//! for every content character. [`segmenter`] groups the characters into
//! clauses at punctuation, [`language`] suggests how long a clause should be,
//! and [`srt`] renders and reads the resulting documents.

pub mod language;
pub mod segmenter;
pub mod srt;
pub mod timecode;
pub mod transcript;

use thiserror::Error;

pub use language::{LanguageProfile, default_min_length, is_mainly_cjk};
pub use segmenter::{generate_smart_srt, segment};
pub use srt::{SubtitleCue, parse_srt, plain_text, render_document};
pub use timecode::{format_time, format_time_value};
pub use transcript::{Interval, TranscriptInput};

#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("transcription result is a {0}, expected a mapping")]
    UnexpectedShape(&'static str),

    #[error("transcription result list is empty")]
    EmptyResultList,

    #[error("field '{field}' holds a {kind}, expected text")]
    NonTextField {
        field: &'static str,
        kind: &'static str,
    },

    #[error("timestamp entry {position} is not a [start, end] pair")]
    MalformedInterval { position: usize },
}
