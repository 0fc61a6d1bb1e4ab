use serde_json::Value;

/// Rendered in place of any timestamp that cannot be formatted.
pub const FALLBACK_TIMECODE: &str = "00:00:00,000";

/// Format a millisecond offset as an SRT timecode (`HH:MM:SS,mmm`).
///
/// Negative offsets render as [`FALLBACK_TIMECODE`] so a single bad interval
/// never aborts a document. Hours are not capped and widen past two digits.
pub fn format_time(milliseconds: i64) -> String {
    if milliseconds < 0 {
        return FALLBACK_TIMECODE.to_string();
    }

    let ms = milliseconds % 1000;
    let total_seconds = milliseconds / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{hours:02}:{minutes:02}:{seconds:02},{ms:03}")
}

/// Like [`format_time`] for loosely typed input. Anything other than an
/// integer (floats, strings, null) renders the fallback timecode.
pub fn format_time_value(value: &Value) -> String {
    match value.as_i64() {
        Some(ms) => format_time(ms),
        None => FALLBACK_TIMECODE.to_string(),
    }
}
