use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;

use super::timecode::format_time;

/// One timed subtitle entry. Indices start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleCue {
    pub index: usize,
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{} --> {}\n{}\n\n",
            self.index,
            format_time(self.start_ms),
            format_time(self.end_ms),
            self.text
        )
    }
}

pub fn render_document(cues: &[SubtitleCue]) -> String {
    cues.iter().map(ToString::to_string).collect()
}

/// Read an SRT document back into cues.
///
/// Cue order is preserved and end-before-start is tolerated, since generated
/// documents may carry fallback timecodes. A missing index line is accepted.
pub fn parse_srt(input: &str) -> Result<Vec<SubtitleCue>> {
    let mut cues = Vec::new();
    let mut lines = input.lines().peekable();

    while let Some(line) = lines.next() {
        let first = line.trim();
        if first.is_empty() {
            continue;
        }

        let times = if first.contains("-->") {
            first
        } else {
            lines
                .next()
                .map(str::trim)
                .with_context(|| format!("SRT cue '{first}' is missing a timestamp line"))?
        };

        let (start_raw, end_raw) = times
            .split_once("-->")
            .map(|(a, b)| (a.trim(), b.trim()))
            .context("SRT cue timestamp line must contain '-->'")?;

        let start_ms = parse_timestamp(start_raw)
            .with_context(|| format!("Failed to parse SRT start timestamp '{start_raw}'"))?;
        let end_ms = parse_timestamp(end_raw)
            .with_context(|| format!("Failed to parse SRT end timestamp '{end_raw}'"))?;

        let mut text_lines = Vec::new();
        while let Some(next) = lines.next_if(|l| !l.trim().is_empty()) {
            text_lines.push(next.trim());
        }

        cues.push(SubtitleCue {
            index: cues.len() + 1,
            start_ms,
            end_ms,
            text: text_lines.join(" "),
        });
    }

    Ok(cues)
}

fn parse_timestamp(value: &str) -> Result<i64> {
    let cleaned = value.trim().replace(',', ".");
    let (time_part, fractional) = cleaned.split_once('.').unwrap_or((&cleaned, "0"));

    let mut hms = time_part.split(':');
    let mut component = |name: &str| -> Result<i64> {
        hms.next()
            .with_context(|| format!("Timestamp missing {name}"))?
            .parse::<i64>()
            .with_context(|| format!("Invalid {name} in timestamp"))
    };
    let hours = component("hours")?;
    let minutes = component("minutes")?;
    let seconds = component("seconds")?;
    if hms.next().is_some() {
        anyhow::bail!("Timestamp has more than three components: {value}");
    }

    let millis = format!("{fractional:0<3}")
        .chars()
        .take(3)
        .collect::<String>()
        .parse::<i64>()
        .context("Invalid millisecond component in timestamp")?;

    hours
        .checked_mul(3600)
        .and_then(|total| total.checked_add(minutes.checked_mul(60)?))
        .and_then(|total| total.checked_add(seconds))
        .and_then(|total| total.checked_mul(1000))
        .and_then(|total| total.checked_add(millis))
        .with_context(|| format!("Timestamp out of range: {value}"))
}

/// The `.txt` export: every cue's text on its own line, headers removed.
pub fn plain_text(document: &str) -> Result<String> {
    let cues = parse_srt(document).context("reading subtitle document for text export")?;
    Ok(cues.iter().map(|cue| format!("{}\n", cue.text)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(index: usize, start_ms: i64, end_ms: i64, text: &str) -> SubtitleCue {
        SubtitleCue {
            index,
            start_ms,
            end_ms,
            text: text.to_string(),
        }
    }

    #[test]
    fn renders_blank_line_after_every_cue() {
        let doc = render_document(&[cue(1, 0, 1_500, "你好。"), cue(2, 1_500, 61_000, "再见！")]);
        assert_eq!(
            doc,
            "1\n00:00:00,000 --> 00:00:01,500\n你好。\n\n2\n00:00:01,500 --> 00:01:01,000\n再见！\n\n"
        );
    }

    #[test]
    fn parse_basic_srt() {
        let input = "1\n00:00:01,000 --> 00:00:03,500\nHello world!\n\n2\n00:00:04,000 --> 00:00:05,000\nNext line\n";
        let cues = parse_srt(input).expect("parse srt");
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Hello world!");
        assert_eq!(cues[0].end_ms, 3_500);
        assert_eq!(cues[1].start_ms, 4_000);
    }

    #[test]
    fn parse_tolerates_missing_index_and_fallback_times() {
        let input = "00:00:05,000 --> 00:00:00,000\nstray\nsecond line\n";
        let cues = parse_srt(input).expect("parse srt");
        assert_eq!(cues, vec![cue(1, 5_000, 0, "stray second line")]);
    }

    #[test]
    fn parse_rejects_garbage_timestamps() {
        assert!(parse_srt("1\nnot a time\ntext\n").is_err());
        assert!(parse_srt("1\n00:00:aa,000 --> 00:00:01,000\ntext\n").is_err());
    }

    #[test]
    fn huge_timestamps_are_rejected() {
        let doc = "1\n99999999999999999:00:00,000 --> 99999999999999999:00:01,000\nx\n\n";
        let err = plain_text(doc).unwrap_err();
        assert!(format!("{err:#}").contains("out of range"), "{err:#}");
        assert!(parse_srt(doc).is_err());
    }

    #[test]
    fn plain_text_strips_headers() {
        let doc = render_document(&[cue(1, 0, 100, "first,"), cue(2, 100, 200, "second.")]);
        assert_eq!(plain_text(&doc).unwrap(), "first,\nsecond.\n");
        assert_eq!(plain_text("").unwrap(), "");
    }
}
