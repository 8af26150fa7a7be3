use regex::Regex;
use std::sync::LazyLock;

/// A named entry in one of the ordered pattern tables.
///
/// Capture group 1 always holds the (first) number; range patterns hold the
/// end of the range in capture group 2.
pub(crate) struct Pattern {
    pub(crate) label: &'static str,
    pub(crate) regex: Regex,
}
impl Pattern {
    fn new(label: &'static str, regex: &str) -> Self {
        Self { label, regex: Regex::new(regex).unwrap() }
    }
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

macro_rules! patterns {
    ($name:ident, [$(($label:literal, $regex:expr)),+ $(,)?]) => {
        pub(crate) static $name: LazyLock<Vec<Pattern>> = LazyLock::new(|| vec![$(Pattern::new($label, $regex)),+]);
    };
}

/// Years are never episode numbers.
pub(crate) const YEAR_RANGE: std::ops::RangeInclusive<u32> = 1950..=2030;
/// Common video resolution tokens that appear as bare numbers.
pub(crate) const RESOLUTIONS: &[u32] = &[480, 720, 1080, 2160, 1920, 1280, 848, 800];
/// Codec markers (`x264`, `H.265`) that look like three-digit episodes.
pub(crate) const CODECS: &[u32] = &[264, 265];
/// Words that qualify a following number as something other than an episode.
pub(crate) const QUALIFIERS: &[&str] = &["season", "volume", "vol", "part", "cour", "movie"];
/// Exclusive upper bound for a range start.
pub(crate) const RANGE_LIMIT: u32 = 9999;

/// Extensions of files that can never carry an episode of video.
pub(crate) const NON_VIDEO_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff", "txt", "nfo", "pdf", "htm", "html", "ttf", "otf", "ttc",
    "woff", "mp3", "flac", "aac", "ogg", "opus", "wav", "m4a", "mka", "zip", "rar", "7z", "sfv", "md5", "sha1",
    "torrent", "cue", "log", "url",
];

regex!(CRC_REGEX, r"\[[0-9A-Fa-f]{8}\]");
regex!(WHITESPACE_REGEX, r"\s+");

// Non-episode content: credit sequences, promotional material and extras.
patterns!(SKIP_MARKERS, [
    ("creditless", r"\b(?:NC)?(?:OP|ED)(?:\s?\d{1,2})?(?:v\d)?\b"),
    ("non-credit", r"(?i)\b(?:creditless|non-?credit)"),
    ("theme", r"(?i)\b(?:opening|ending)(?:\s+theme|\s*\d{1,2}\b)"),
    ("extra", r"(?i)\b(?:preview|trailer|teaser|scans?|booklet)\b"),
    // Stand-alone promo markers only: "[CM]", "PV 2", "Menu".
    ("promo", r"\b(?:PV|CM|(?i:menus?))\s?\d{0,2}(?:v\d)?\s*(?:[\[\]()]|$)"),
]);

patterns!(SEASON_PATTERNS, [
    ("SxxEyy", r"(?i)\bS(\d{1,2})\s?E\d"),
    ("Season N", r"(?i)\bSeason\s*(\d{1,2})\b"),
    ("Nth Season", r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\s+Season\b"),
    ("Sxx", r"\bS(\d{1,2})\b"),
]);

regex!(SPECIAL_REGEX, r"(?i)\b(?:SP|OVA|OAD|ONA|Specials?)\s?[-#]?\s?(\d{1,3})(?:v\d)?\b");

patterns!(RANGE_PATTERNS, [
    ("SxxEyy-Ezz", r"(?i)\bS\d{1,2}\s?E(\d{1,4})\s?-\s?E?(\d{1,4})\b"),
    ("Episodes N-M", r"(?i)\bEp(?:isodes?|s)?\s*(\d{1,4})\s*(?:-|~|to)\s*(\d{1,4})\b"),
    ("[N-M]", r"\[(\d{1,4})\s?[-~]\s?(\d{1,4})\]"),
    ("(N-M)", r"\((\d{1,4})\s?[-~]\s?(\d{1,4})\)"),
    ("N-M", r"(?:^|\s)(\d{1,4})(?:-|\s*~\s*)(\d{1,4})(?:\s|$)"),
    // A spaced dash is usually a title separator; require a bracket or the end after it.
    ("N - M", r"(?:^|\s)(\d{2,4})\s+-\s+(\d{2,4})\s*(?:[\[(]|$)"),
]);

// Highest precision first; positional heuristics last.
patterns!(EPISODE_PATTERNS, [
    ("SxxEyy", r"(?i)\bS\d{1,2}\s?E(\d{1,4})(?:v\d)?\b"),
    ("NxNN", r"(?i)\b\d{1,2}x(\d{2,3})\b"),
    ("Episode N", r"(?i)\bEpisode\s*(\d{1,4})(?:v\d)?\b"),
    ("Ep N", r"(?i)\bEp\s*(\d{1,4})(?:v\d)?\b"),
    ("EN", r"(?i)\bE(\d{1,4})(?:v\d)?\b"),
    ("N of M", r"(?i)\b(\d{1,4})\s+of\s+\d{1,4}\b"),
    ("#N", r"#\s?(\d{1,4})\b"),
    ("第N話", r"第\s?(\d{1,4})\s?[話话集]"),
    ("N話", r"(\d{1,4})\s?[話话]"),
    (" - N [", r"\s-\s(\d{1,4})(?:v\d)?\s*[\[(]"),
    (" - N", r"\s-\s(\d{1,4})(?:v\d)?(?:\s+END)?\s*$"),
    (" - N ", r"\s-\s(\d{1,4})(?:v\d)?\s"),
    ("[N]", r"\[(\d{1,4})(?:v\d)?\]"),
    ("(N)", r"\((\d{1,4})(?:v\d)?\)"),
    ("]N[", r"\]\s?(\d{1,4})(?:v\d)?\s?\["),
    (" N [", r"\s(\d{1,4})(?:v\d)?\s*[\[(]"),
    (" N", r"\s(\d{1,4})(?:v\d)?$"),
    ("N - ", r"^(\d{1,4})(?:v\d)?\s*-\s"),
    ("N ", r"^(\d{1,4})(?:v\d)?\s"),
    ("-N", r"-(\d{1,4})(?:v\d)?\b"),
]);

// Tokens inside square brackets or parentheses, typically the release group.
regex!(BRACKET_TOKEN_REGEX, r"[\[(]([^\[\]()]+)[\])]");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_compile() {
        for table in [&SKIP_MARKERS, &SEASON_PATTERNS, &RANGE_PATTERNS, &EPISODE_PATTERNS] {
            assert!(!table.is_empty());
            for pattern in table.iter() {
                assert!(pattern.regex.captures_len() >= 1, "{}", pattern.label);
            }
        }
        for pattern in RANGE_PATTERNS.iter() {
            assert_eq!(pattern.regex.captures_len(), 3, "{}", pattern.label);
        }
        for pattern in EPISODE_PATTERNS.iter().chain(SEASON_PATTERNS.iter()) {
            assert_eq!(pattern.regex.captures_len(), 2, "{}", pattern.label);
        }
        LazyLock::force(&SPECIAL_REGEX);
        LazyLock::force(&CRC_REGEX);
        LazyLock::force(&BRACKET_TOKEN_REGEX);
    }

    #[test]
    fn test_labels_unique() {
        let mut labels: Vec<_> = EPISODE_PATTERNS.iter().map(|p| p.label).collect();
        labels.sort_unstable();
        let before = labels.len();
        labels.dedup();
        assert_eq!(before, labels.len());
    }
}
