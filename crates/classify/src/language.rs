//! Subtitle track language resolution.
//!
//! Tracks are frequently muxed without a language tag, in which case the
//! upstream index reports them as undetermined (`und`). A [`Lexicon`] infers
//! English from the release context where that is safe to do.

use crate::consts;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use regex::Regex;
use std::collections::HashSet;
use tracing::instrument;

/// ISO 639-2 code for an undetermined language.
pub const UNDETERMINED: &str = "und";
/// ISO 639-2 code for English.
pub const ENGLISH: &str = "eng";
/// ISO 639-2 code for multiple languages.
pub const MULTIPLE: &str = "mul";

/// Release groups that only ever publish English subtitles.
pub const DEFAULT_GROUPS: &[&str] = &[
    "subsplease",
    "horriblesubs",
    "erai-raws",
    "commie",
    "gg",
    "underwater",
    "doki",
    "coalgirls",
    "mtbb",
    "kametsu",
    "judas",
    "ember",
    "asw",
    "yameii",
    "golumpa",
    "kaleido-subs",
    "damedesuyo",
    "utw",
    "vivid",
    "fffpeeps",
    "chihiro",
    "tsundere-raws",
    "sallysubs",
    "davinci",
    "beatrice-raws",
];
/// Phrases marking releases with more than one audio language.
pub const DEFAULT_DUAL_AUDIO: &[&str] = &["dual audio", "dual-audio", "dualaudio", "multi audio", "multi-audio"];
/// Phrases marking an English release.
pub const DEFAULT_ENGLISH: &[&str] = &[
    "crunchyroll",
    "funimation",
    "netflix",
    "amazon",
    "amzn",
    "hidive",
    "disney+",
    "eng sub",
    "eng subs",
    "engsub",
    "english",
    "english sub",
    "english subs",
    "dub",
    "dubbed",
];

/// Canonicalize a raw track tag: trimmed, lowercase, empty as [`UNDETERMINED`],
/// and `enm` (Middle English, a common mislabel) as [`ENGLISH`].
///
/// ```
/// use subcat_classify::language::normalize_tag;
/// assert_eq!(normalize_tag(" ENG "), "eng");
/// assert_eq!(normalize_tag(""), "und");
/// assert_eq!(normalize_tag("enm"), "eng");
/// ```
pub fn normalize_tag(raw: &str) -> String {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => UNDETERMINED.to_string(),
        "enm" => ENGLISH.to_string(),
        tag => tag.to_string(),
    }
}

/// Whether a tag is the undetermined sentinel.
pub fn is_undetermined(tag: &str) -> bool {
    tag.is_empty() || tag.eq_ignore_ascii_case(UNDETERMINED)
}

/// Immutable phrase tables used to resolve undetermined tags.
#[derive(Debug, Clone)]
pub struct Lexicon {
    groups: HashSet<String>,
    dual_audio: Option<Regex>,
    english: Option<Regex>,
}
impl Lexicon {
    /// Build a lexicon from phrase lists. Matching is case-insensitive and
    /// phrases must match whole words.
    pub fn new<S: AsRef<str>>(groups: &[S], dual_audio: &[S], english: &[S]) -> Result<Self> {
        let mut normalized = HashSet::with_capacity(groups.len());
        for group in groups {
            let group = group.as_ref().trim();
            if group.is_empty() {
                exn::bail!(ErrorKind::InvalidPhrase { list: "groups", phrase: group.to_string() });
            }
            normalized.insert(group.to_lowercase());
        }
        Ok(Self {
            groups: normalized,
            dual_audio: phrase_regex("dual_audio", dual_audio)?,
            english: phrase_regex("english", english)?,
        })
    }

    /// Resolve a track's language tag using the release context.
    ///
    /// A tag that is already resolved is returned unchanged. Otherwise, in
    /// order: a known release group in the title resolves to English; a
    /// dual-audio title stays undetermined; an English indicator in the title
    /// or filename resolves to English. Resolution is idempotent.
    ///
    /// ```
    /// use subcat_classify::Lexicon;
    /// let lexicon = Lexicon::default();
    /// let filename = "[SubsPlease] Show - 07 [1080p].mkv";
    /// assert_eq!(lexicon.resolve("und", "[SubsPlease] Show", filename), "eng");
    /// assert_eq!(lexicon.resolve("jpn", "[SubsPlease] Show", filename), "jpn");
    /// ```
    #[instrument(level = "trace", skip(self), ret)]
    pub fn resolve<'a>(&self, raw_tag: &'a str, title: &str, filename: &str) -> &'a str {
        if !is_undetermined(raw_tag) {
            return raw_tag;
        }
        if self.has_group(title) {
            return ENGLISH;
        }
        let title = flatten(title);
        if self.dual_audio.as_ref().is_some_and(|re| re.is_match(&title)) {
            return UNDETERMINED;
        }
        if let Some(english) = &self.english
            && (english.is_match(&title) || english.is_match(&flatten(filename)))
        {
            return ENGLISH;
        }
        UNDETERMINED
    }

    fn has_group(&self, title: &str) -> bool {
        consts::BRACKET_TOKEN_REGEX
            .captures_iter(title)
            .filter_map(|c| c.get(1))
            .any(|token| self.groups.contains(&token.as_str().trim().to_lowercase()))
    }
}
impl Default for Lexicon {
    fn default() -> Self {
        Self::new(DEFAULT_GROUPS, DEFAULT_DUAL_AUDIO, DEFAULT_ENGLISH).expect("built-in phrase lists are valid")
    }
}

/// Dots and underscores separate words in release names.
fn flatten(text: &str) -> String {
    text.replace(['.', '_'], " ")
}

fn phrase_regex<S: AsRef<str>>(list: &'static str, phrases: &[S]) -> Result<Option<Regex>> {
    if phrases.is_empty() {
        return Ok(None);
    }
    let mut alternatives = Vec::with_capacity(phrases.len());
    for phrase in phrases {
        let phrase = phrase.as_ref().trim();
        if phrase.is_empty() {
            exn::bail!(ErrorKind::InvalidPhrase { list, phrase: phrase.to_string() });
        }
        alternatives.push(regex::escape(phrase));
    }
    // Word boundaries only apply next to word characters ("disney+" ends in a symbol).
    let pattern = format!(r"(?i)(?:^|\W)(?:{})(?:$|\W)", alternatives.join("|"));
    let regex = Regex::new(&pattern).or_raise(|| ErrorKind::InvalidPhrase { list, phrase: alternatives.join("|") })?;
    Ok(Some(regex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("und", "[SubsPlease] Show", "[SubsPlease] Show - 07 [1080p].mkv", "eng")]
    #[case("und", "[HorribleSubs] Show (720p)", "Show - 01.mkv", "eng")]
    #[case("und", "Show (Erai-raws)", "Show - 01.mkv", "eng")]
    #[case("und", "[Group] Show Dual Audio Crunchyroll", "Show - 01.mkv", "und")]
    #[case("und", "[SubsPlease] Show Dual-Audio", "Show - 01.mkv", "eng")]
    #[case("und", "[Group] Show CR WEB-DL Crunchyroll", "Show - 01.mkv", "eng")]
    #[case("und", "[Group] Show", "Show.S01E01.AMZN.WEB-DL.mkv", "eng")]
    #[case("und", "[Group] Show English Dub", "Show - 01.mkv", "eng")]
    #[case("und", "[Group] Show", "Show - 01.mkv", "und")]
    #[case("und", "[Group] Dubrovnik Diaries", "Dubrovnik - 01.mkv", "und")]
    #[case("", "[SubsPlease] Show", "Show - 01.mkv", "eng")]
    #[case("UND", "[Group] Show", "Show - 01.mkv", "und")]
    #[case("jpn", "[SubsPlease] Show", "Show - 01.mkv", "jpn")]
    #[case("spa", "[Group] Show English Dub", "Show - 01.mkv", "spa")]
    fn test_resolve(#[case] tag: &str, #[case] title: &str, #[case] filename: &str, #[case] expected: &str) {
        assert_eq!(Lexicon::default().resolve(tag, title, filename), expected);
    }

    #[rstest]
    #[case("und", "[SubsPlease] Show", "a.mkv")]
    #[case("und", "[Group] Show Dual Audio", "a.mkv")]
    #[case("und", "[Group] Show Funimation", "a.mkv")]
    #[case("und", "[Group] Show", "a.mkv")]
    #[case("fre", "[Group] Show", "a.mkv")]
    fn test_resolve_idempotent(#[case] tag: &str, #[case] title: &str, #[case] filename: &str) {
        let lexicon = Lexicon::default();
        let once = lexicon.resolve(tag, title, filename);
        assert_eq!(lexicon.resolve(once, title, filename), once);
    }

    #[rstest]
    #[case("eng", "eng")]
    #[case("ENG", "eng")]
    #[case("  jpn\t", "jpn")]
    #[case("", "und")]
    #[case("enm", "eng")]
    #[case("und", "und")]
    fn test_normalize_tag(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_tag(raw), expected);
    }

    #[test]
    fn test_custom_lexicon() {
        let lexicon = Lexicon::new(&["MyGroup"], &[], &["subbed"]).unwrap();
        assert_eq!(lexicon.resolve("und", "[mygroup] Show", "a.mkv"), "eng");
        assert_eq!(lexicon.resolve("und", "[SubsPlease] Show", "a.mkv"), "und");
        assert_eq!(lexicon.resolve("und", "Show Dual Audio Subbed", "a.mkv"), "eng");
    }

    #[test]
    fn test_blank_phrase_rejected() {
        let err = Lexicon::new(&["ok"], &[" "], &[]).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidPhrase { list: "dual_audio", phrase: String::new() });
        let err = Lexicon::new(&[""], &[], &[]).unwrap_err();
        assert!(matches!(*err, ErrorKind::InvalidPhrase { list: "groups", .. }));
    }

    #[test]
    fn test_empty_lists_resolve_nothing() {
        let empty: &[&str] = &[];
        let lexicon = Lexicon::new(empty, empty, empty).unwrap();
        assert_eq!(lexicon.resolve("und", "[SubsPlease] English", "a.mkv"), "und");
    }
}
