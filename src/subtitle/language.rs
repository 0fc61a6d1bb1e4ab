use serde::Serialize;

/// Only this many leading characters are inspected.
pub const SAMPLE_CHARS: usize = 500;

/// Share of CJK characters above which a sample counts as CJK-dominant.
pub const CJK_RATIO: f64 = 0.15;

pub const CJK_MIN_LENGTH: usize = 15;
pub const LATIN_MIN_LENGTH: usize = 40;

fn is_cjk_char(c: char) -> bool {
    matches!(
        c,
        '\u{4e00}'..='\u{9fff}'     // CJK unified ideographs
            | '\u{3040}'..='\u{309f}' // hiragana
            | '\u{30a0}'..='\u{30ff}' // katakana
            | '\u{ac00}'..='\u{d7af}' // hangul syllables
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageProfile {
    pub sample_chars: usize,
    pub cjk_chars: usize,
}

impl LanguageProfile {
    pub fn of(text: &str) -> Self {
        let (sample_chars, cjk_chars) = text
            .chars()
            .take(SAMPLE_CHARS)
            .fold((0, 0), |(total, cjk), c| {
                (total + 1, cjk + usize::from(is_cjk_char(c)))
            });

        Self {
            sample_chars,
            cjk_chars,
        }
    }

    pub fn is_cjk(&self) -> bool {
        self.sample_chars > 0 && (self.cjk_chars as f64 / self.sample_chars as f64) > CJK_RATIO
    }

    pub fn default_min_length(&self) -> usize {
        self.min_length_with(CJK_MIN_LENGTH, LATIN_MIN_LENGTH)
    }

    /// Pick between configured thresholds for CJK and alphabetic text.
    pub fn min_length_with(&self, cjk: usize, latin: usize) -> usize {
        if self.is_cjk() { cjk } else { latin }
    }
}

/// Whether the start of `text` is mostly Chinese, Japanese or Korean script.
pub fn is_mainly_cjk(text: &str) -> bool {
    LanguageProfile::of(text).is_cjk()
}

pub fn default_min_length(text: &str) -> usize {
    LanguageProfile::of(text).default_min_length()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed(cjk: usize, latin: usize) -> String {
        let mut s = "字".repeat(cjk);
        s.push_str(&"a".repeat(latin));
        s
    }

    #[test]
    fn empty_text_is_not_cjk() {
        assert!(!is_mainly_cjk(""));
        assert_eq!(default_min_length(""), LATIN_MIN_LENGTH);
    }

    #[test]
    fn ratio_boundary() {
        assert!(is_mainly_cjk(&mixed(20, 80)));
        assert!(!is_mainly_cjk(&mixed(10, 90)));
        // exactly 15% is not enough
        assert!(!is_mainly_cjk(&mixed(15, 85)));
    }

    #[test]
    fn only_first_500_characters_count() {
        let mut text = "a".repeat(SAMPLE_CHARS);
        text.push_str(&"漢".repeat(5_000));
        assert!(!is_mainly_cjk(&text));

        let mut text = mixed(100, 400);
        text.push_str(&"b".repeat(10_000));
        assert!(is_mainly_cjk(&text));
    }

    #[test]
    fn kana_and_hangul_count() {
        assert!(is_mainly_cjk("こんにちはカタカナ"));
        assert!(is_mainly_cjk("안녕하세요"));
        assert_eq!(default_min_length("你好，世界。"), CJK_MIN_LENGTH);
    }

    #[test]
    fn embedded_proper_nouns_stay_latin() {
        let text = "We visited 北京 last summer and the weather was lovely throughout.";
        assert!(!is_mainly_cjk(text));
    }
}
