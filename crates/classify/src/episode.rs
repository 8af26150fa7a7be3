use crate::consts::{self, Pattern};
use std::ops::RangeInclusive;
use tracing::instrument;

/// What a filename says about the episode(s) it contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Classification {
    /// The episode number, or the first episode of a range.
    pub episode: Option<u32>,
    pub is_range: bool,
    /// The last episode (inclusive) when [`is_range`](Self::is_range) is set.
    pub range_end: Option<u32>,
    pub season: Option<u32>,
    /// OVA, OAD, ONA and other specials; never a range.
    pub is_special: bool,
}
impl Classification {
    /// Every episode number this classification covers, ranges expanded.
    ///
    /// Specials and unclassified files cover nothing.
    ///
    /// ```
    /// use subcat_classify::classify;
    /// let episodes: Vec<u32> = classify("Show Episodes 01-03 Batch.mkv").episodes().collect();
    /// assert_eq!(episodes, vec![1, 2, 3]);
    /// assert_eq!(classify("[Group] Show OVA 2.mkv").episodes().count(), 0);
    /// ```
    pub fn episodes(&self) -> RangeInclusive<u32> {
        match (self.is_special, self.episode, self.range_end) {
            (true, _, _) | (false, None, _) => RangeInclusive::new(1, 0),
            (false, Some(start), Some(end)) if self.is_range => start..=end,
            (false, Some(episode), _) => episode..=episode,
        }
    }

    /// Whether this classification places the file in a specific episode.
    pub fn is_episode(&self) -> bool {
        !self.is_special && self.episode.is_some()
    }
}

/// A filename reduced to comparable text: directory and extension removed,
/// dots and underscores turned into spaces, CRC tags dropped.
struct Normalized {
    text: String,
    extension: Option<String>,
}
impl Normalized {
    fn new(filename: &str) -> Self {
        let basename = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
        let (stem, extension) = match basename.rsplit_once('.') {
            Some((stem, ext))
                if !stem.is_empty()
                    && (1..=4).contains(&ext.len())
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
                    && ext.chars().any(|c| c.is_ascii_alphabetic()) =>
            {
                (stem, Some(ext.to_ascii_lowercase()))
            },
            _ => (basename, None),
        };
        let text = consts::CRC_REGEX.replace_all(stem, " ").replace(['_', '.'], " ");
        let text = consts::WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned();
        Self { text, extension }
    }

    fn is_skipped(&self) -> bool {
        if let Some(ext) = &self.extension
            && consts::NON_VIDEO_EXTENSIONS.contains(&ext.as_str())
        {
            return true;
        }
        consts::SKIP_MARKERS.iter().any(|marker| marker.regex.is_match(&self.text))
    }
}

/// Extract episode information from a release filename.
///
/// Patterns are tried in a fixed order and the first acceptable match wins;
/// a candidate that looks like a year, a resolution or a codec is rejected
/// and the search continues with the next match. Identical input always
/// produces identical output.
///
/// ```
/// use subcat_classify::classify;
/// let c = classify("[SubsPlease] Show - 07 [1080p].mkv");
/// assert_eq!(c.episode, Some(7));
/// assert!(!c.is_range);
/// ```
#[instrument(level = "trace", ret)]
pub fn classify(filename: &str) -> Classification {
    let name = Normalized::new(filename);
    if name.is_skipped() {
        tracing::trace!(text = %name.text, "non-episode content");
        return Classification::default();
    }
    let season = first_capture(&consts::SEASON_PATTERNS, &name.text, |n, _| n > 0);
    if let Some(captures) = consts::SPECIAL_REGEX.captures(&name.text) {
        let number = captures.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
        return Classification {
            episode: number.filter(|n| *n > 0),
            is_special: true,
            season,
            ..Default::default()
        };
    }
    if let Some((start, end)) = range(&name.text) {
        return Classification {
            episode: Some(start),
            is_range: true,
            range_end: Some(end),
            season,
            ..Default::default()
        };
    }
    Classification {
        episode: first_capture(&consts::EPISODE_PATTERNS, &name.text, is_plausible),
        season,
        ..Default::default()
    }
}

fn first_capture(patterns: &[Pattern], text: &str, accept: impl Fn(u32, &str) -> bool) -> Option<u32> {
    for pattern in patterns {
        for captures in pattern.regex.captures_iter(text) {
            let Some(m) = captures.get(1) else { continue };
            let Ok(number) = m.as_str().parse::<u32>() else { continue };
            if accept(number, &text[..m.start()]) {
                tracing::trace!(pattern = pattern.label, number, "matched");
                return Some(number);
            }
        }
    }
    None
}

fn range(text: &str) -> Option<(u32, u32)> {
    for pattern in consts::RANGE_PATTERNS.iter() {
        for captures in pattern.regex.captures_iter(text) {
            let (Some(first), Some(last)) = (captures.get(1), captures.get(2)) else { continue };
            let (Ok(start), Ok(end)) = (first.as_str().parse::<u32>(), last.as_str().parse::<u32>()) else {
                continue;
            };
            if (1..consts::RANGE_LIMIT).contains(&start)
                && start < end
                && is_plausible(start, &text[..first.start()])
                && is_plausible(end, &text[..last.start()])
            {
                tracing::trace!(pattern = pattern.label, start, end, "matched range");
                return Some((start, end));
            }
        }
    }
    None
}

/// Reject numbers that are more likely a year, resolution, codec or a
/// season/volume number than an episode. `before` is the text preceding the
/// number.
fn is_plausible(number: u32, before: &str) -> bool {
    if number == 0 || consts::YEAR_RANGE.contains(&number) || consts::RESOLUTIONS.contains(&number) {
        return false;
    }
    if consts::CODECS.contains(&number) && !before.ends_with(" - ") {
        let marker = before.strip_suffix([' ', '-']).unwrap_or(before);
        if marker.ends_with(['x', 'X', 'h', 'H']) {
            return false;
        }
    }
    let preceding = before.trim_end().to_ascii_lowercase();
    !consts::QUALIFIERS.iter().any(|q| {
        preceding.strip_suffix(*q).is_some_and(|rest| !rest.ends_with(|c: char| c.is_ascii_alphanumeric()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("[SubsPlease] Show - 07 [1080p].mkv", Some(7))]
    #[case("[Erai-raws] Show - 12v2 [720p][ABCDEF12].mkv", Some(12))]
    #[case("Show.S01E05.1080p.WEB.H.264-GROUP.mkv", Some(5))]
    #[case("Show 1x05 Title.mkv", Some(5))]
    #[case("Show Episode 3 [BD].mkv", Some(3))]
    #[case("Show Ep. 11 (720p).mkv", Some(11))]
    #[case("Show E09.mkv", Some(9))]
    #[case("Show #4.mp4", Some(4))]
    #[case("ショー 第8話.mkv", Some(8))]
    #[case("Show - 24 END.mkv", Some(24))]
    #[case("Show - 13 - Finale.mkv", Some(13))]
    #[case("[Group] Show [05][BD 1080p].mkv", Some(5))]
    #[case("[Group]06[720p].mkv", Some(6))]
    #[case("Show 10 [720p].mkv", Some(10))]
    #[case("Show 08.mkv", Some(8))]
    #[case("01 - Pilot.mkv", Some(1))]
    #[case("Show-03.mkv", Some(3))]
    #[case("path/to/[SubsPlease] Show - 02 (1080p).mkv", Some(2))]
    #[case("[Group] Show - 1000 [1080p].mkv", Some(1000))]
    #[case("[Group] Show - 05 [CM Edition].mkv", Some(5))]
    #[case("[Group] Cmd Show - 06 [pv].mkv", Some(6))]
    fn test_single_episode(#[case] filename: &str, #[case] expected: Option<u32>) {
        let result = classify(filename);
        assert_eq!(result.episode, expected, "{filename}");
        assert!(!result.is_range);
        assert!(!result.is_special);
    }

    #[rstest]
    #[case("Show 2019.mkv")]
    #[case("Show (2021) [1080p].mkv")]
    #[case("Show [720].mkv")]
    #[case("Show 1080.mkv")]
    #[case("Show x264.mkv")]
    #[case("Show H 265.mkv")]
    #[case("Show Season 2.mkv")]
    #[case("Show Vol 3 [BD].mkv")]
    #[case("Show - 00 [1080p].mkv")]
    #[case("The Movie.mkv")]
    fn test_rejected_candidates(#[case] filename: &str) {
        assert_eq!(classify(filename).episode, None, "{filename}");
    }

    #[test]
    fn test_codec_after_episode_dash() {
        assert_eq!(classify("Show - 264 [1080p].mkv").episode, Some(264));
    }

    #[test]
    fn test_fall_through_to_next_match() {
        // The year in brackets is rejected; the next bracketed number still counts.
        assert_eq!(classify("[Group] Show [2019] [05].mkv").episode, Some(5));
    }

    #[rstest]
    #[case("Show Episodes 01-06 Batch.mkv", 1, 6)]
    #[case("Show S01E01-E13 [BD].mkv", 1, 13)]
    #[case("[Group] Show [01-12] [1080p].mkv", 1, 12)]
    #[case("Show (13-24).mkv", 13, 24)]
    #[case("Show 01~26 [BD].mkv", 1, 26)]
    #[case("Show Eps 5 to 8.mkv", 5, 8)]
    #[case("[Group] Show 01 ~ 12 [BD].mkv", 1, 12)]
    #[case("[Group] Show 01 - 12 [Batch].mkv", 1, 12)]
    #[case("Show 13 - 24.mkv", 13, 24)]
    #[case("[Group] Show [01 - 12].mkv", 1, 12)]
    #[case("Show [9998-9999].mkv", 9998, 9999)]
    fn test_range(#[case] filename: &str, #[case] start: u32, #[case] end: u32) {
        let result = classify(filename);
        assert!(result.is_range, "{filename}");
        assert_eq!(result.episode, Some(start));
        assert_eq!(result.range_end, Some(end));
        assert!(!result.is_special);
    }

    #[rstest]
    #[case("Show 12-05 [BD].mkv")]
    #[case("Show 2019-2020.mkv")]
    #[case("Show [720-1080].mkv")]
    #[case("Show [9999-10000].mkv")]
    #[case("01 - Pilot.mkv")]
    #[case("[Group] Show 2 - 05 [1080p].mkv")]
    fn test_invalid_range(#[case] filename: &str) {
        assert!(!classify(filename).is_range, "{filename}");
    }

    #[rstest]
    #[case("[Group] Show OVA 2 [BD].mkv", Some(2))]
    #[case("Show OAD-1.mkv", Some(1))]
    #[case("Show SP1.mkv", Some(1))]
    #[case("Show Special 03 [01-12].mkv", Some(3))]
    #[case("Show Specials 0.mkv", None)]
    fn test_special(#[case] filename: &str, #[case] episode: Option<u32>) {
        let result = classify(filename);
        assert!(result.is_special, "{filename}");
        assert!(!result.is_range);
        assert_eq!(result.episode, episode);
        assert!(!result.is_episode());
    }

    #[rstest]
    #[case("[Group] Show NCOP1 [1080p].mkv")]
    #[case("[Group] Show NCED [1080p].mkv")]
    #[case("Show - Creditless Opening.mkv")]
    #[case("Show Ending 2.mkv")]
    #[case("Show Preview 05.mkv")]
    #[case("Show - 05.jpg")]
    #[case("Show - 05.nfo")]
    #[case("Show Scans 01.zip")]
    #[case("[Group] Show CM 02 [1080p].mkv")]
    #[case("[Group] Show PV2.mkv")]
    #[case("[Group] Show - 05 [Menu].mkv")]
    fn test_skipped(#[case] filename: &str) {
        assert_eq!(classify(filename), Classification::default(), "{filename}");
    }

    #[rstest]
    #[case("Show S02E05.mkv", Some(2))]
    #[case("Show Season 3 - 04.mkv", Some(3))]
    #[case("Show 2nd Season - 04.mkv", Some(2))]
    #[case("Show S4 - 01.mkv", Some(4))]
    #[case("Show - 01.mkv", None)]
    fn test_season(#[case] filename: &str, #[case] season: Option<u32>) {
        assert_eq!(classify(filename).season, season, "{filename}");
    }

    #[test]
    fn test_deterministic() {
        let filename = "[Group] Show S01E03 (2019) [1080p x265].mkv";
        let first = classify(filename);
        for _ in 0..10 {
            assert_eq!(classify(filename), first);
        }
    }

    #[test]
    fn test_episodes_expansion() {
        assert_eq!(classify("Show - 07.mkv").episodes().collect::<Vec<_>>(), vec![7]);
        assert_eq!(classify("Show [01-04].mkv").episodes().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(classify("Show.mkv").episodes().count(), 0);
    }

    #[test]
    fn test_crc_is_not_an_episode() {
        assert_eq!(classify("[Group] Show [12345678].mkv").episode, None);
    }
}
