use super::SubtitleEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Everything the catalog knows about one torrent's subtitles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub torrent_id: u64,
    pub display_name: String,
    pub languages: BTreeSet<String>,
    /// Packs first, then episode entries by episode, then everything else.
    pub subtitle_entries: Vec<SubtitleEntry>,
    pub episodes_available: BTreeSet<u32>,
    pub file_count: u64,
    pub total_size: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub external_ref_id: Option<u64>,
}
impl CatalogRecord {
    /// The span of available episodes, zero-padded: `07` or `01-12`.
    ///
    /// ```
    /// # use subcat_catalog::models::CatalogRecord;
    /// # let mut record = CatalogRecord {
    /// #     torrent_id: 1, display_name: "Show".into(), languages: Default::default(),
    /// #     subtitle_entries: vec![], episodes_available: Default::default(),
    /// #     file_count: 12, total_size: 0, external_ref_id: None,
    /// # };
    /// record.episodes_available.extend([1, 2, 12]);
    /// assert_eq!(record.episode_span().as_deref(), Some("01-12"));
    /// ```
    pub fn episode_span(&self) -> Option<String> {
        let first = self.episodes_available.first()?;
        let last = self.episodes_available.last()?;
        if first == last { Some(format!("{first:02}")) } else { Some(format!("{first:02}-{last:02}")) }
    }

    /// A short, human-readable title: the name, the episode span and the
    /// total size.
    pub fn display_title(&self) -> String {
        let size = format_size(self.total_size);
        match self.episode_span() {
            Some(span) => format!("{} (Eps {span}) ({size})", truncate(&self.display_name, 45)),
            None => format!("{} ({size})", truncate(&self.display_name, 70)),
        }
    }

    /// The torrent-wide archive entry, if one was synthesized.
    pub fn complete_pack(&self) -> Option<&SubtitleEntry> {
        self.subtitle_entries.iter().find(|entry| entry.pack_kind == super::PackKind::CompletePack)
    }
}

/// Format a byte count as `B`, `KB` or `MB` (1024-based, one decimal).
///
/// ```
/// use subcat_catalog::models::format_size;
/// assert_eq!(format_size(512), "512B");
/// assert_eq!(format_size(1536), "1.5KB");
/// assert_eq!(format_size(2_000_000), "1.9MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    match bytes {
        0..KIB => format!("{bytes}B"),
        KIB..MIB => format!("{:.1}KB", bytes as f64 / KIB as f64),
        _ => format!("{:.1}MB", bytes as f64 / MIB as f64),
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(name: &str, episodes: &[u32], total_size: u64) -> CatalogRecord {
        CatalogRecord {
            torrent_id: 1,
            display_name: name.to_string(),
            languages: BTreeSet::new(),
            subtitle_entries: Vec::new(),
            episodes_available: episodes.iter().copied().collect(),
            file_count: 1,
            total_size,
            external_ref_id: None,
        }
    }

    #[rstest]
    #[case(&[], None)]
    #[case(&[7], Some("07"))]
    #[case(&[3, 1, 2], Some("01-03"))]
    #[case(&[1, 120], Some("01-120"))]
    fn test_episode_span(#[case] episodes: &[u32], #[case] expected: Option<&str>) {
        assert_eq!(record("Show", episodes, 0).episode_span().as_deref(), expected);
    }

    #[rstest]
    #[case(0, "0B")]
    #[case(1023, "1023B")]
    #[case(1024, "1.0KB")]
    #[case(50_000, "48.8KB")]
    #[case(1_048_576, "1.0MB")]
    #[case(1_073_741_824, "1024.0MB")]
    fn test_format_size(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(format_size(bytes), expected);
    }

    #[test]
    fn test_display_title() {
        assert_eq!(record("[Group] Show", &[1, 12], 1536).display_title(), "[Group] Show (Eps 01-12) (1.5KB)");
        assert_eq!(record("[Group] Show", &[], 10).display_title(), "[Group] Show (10B)");
        let long = "x".repeat(80);
        let title = record(&long, &[1, 2], 0).display_title();
        assert_eq!(title, format!("{} (Eps 01-02) (0B)", "x".repeat(45)));
        assert_eq!(record("日本語のタイトル", &[], 0).display_title(), "日本語のタイトル (0B)");
    }
}
