use crate::models::{CatalogRecord, PackKind};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use subcat_dump::{LinkStats, ReadStats};

/// What a build produced, for the closing log line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub torrents: u64,
    pub entries: u64,
    /// Entry counts by [`PackKind`].
    pub kinds: BTreeMap<PackKind, u64>,
    pub languages: BTreeSet<String>,
    /// Reader statistics by stream name.
    pub streams: BTreeMap<String, ReadStats>,
    pub link: LinkStats,
}
impl BuildSummary {
    pub fn new(link: LinkStats) -> Self {
        Self { link, ..Default::default() }
    }

    pub fn with_stream(mut self, stream: impl ToString, stats: ReadStats) -> Self {
        self.streams.insert(stream.to_string(), stats);
        self
    }

    pub fn record(&mut self, record: &CatalogRecord) {
        self.torrents += 1;
        self.entries += record.subtitle_entries.len() as u64;
        for entry in &record.subtitle_entries {
            *self.kinds.entry(entry.pack_kind).or_default() += 1;
        }
        self.languages.extend(record.languages.iter().cloned());
    }

    pub fn packs(&self) -> u64 {
        self.kinds.iter().filter(|(kind, _)| kind.is_pack()).map(|(_, count)| count).sum()
    }

    pub fn log(&self) {
        tracing::info!(
            torrents = self.torrents,
            entries = self.entries,
            packs = self.packs(),
            languages = self.languages.len(),
            malformed = self.streams.values().map(|s| s.malformed).sum::<u64>(),
            orphan_attachments = self.link.orphan_attachments,
            orphan_files = self.link.orphan_files,
            "catalog build complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubtitleEntry;

    fn entry(pack_kind: PackKind, url: &str) -> SubtitleEntry {
        SubtitleEntry {
            display_label: "Show".into(),
            resolved_language: "eng".into(),
            byte_size: 1,
            episode_number: None,
            pack_kind,
            download_url: url.into(),
            target_episode: None,
        }
    }

    #[test]
    fn test_summary() {
        let record = CatalogRecord {
            torrent_id: 1,
            display_name: "Show".into(),
            languages: BTreeSet::from(["eng".to_string(), "spa".to_string()]),
            subtitle_entries: vec![
                entry(PackKind::CompletePack, "a"),
                entry(PackKind::EpisodePack, "b"),
                entry(PackKind::EpisodeIndividual, "c"),
                entry(PackKind::None, "d"),
            ],
            episodes_available: BTreeSet::new(),
            file_count: 2,
            total_size: 0,
            external_ref_id: None,
        };
        let mut summary = BuildSummary::new(LinkStats::default())
            .with_stream("files", ReadStats { lines: 3, records: 2, malformed: 1, header: true });
        summary.record(&record);
        summary.record(&record);
        assert_eq!(summary.torrents, 2);
        assert_eq!(summary.entries, 8);
        assert_eq!(summary.packs(), 4);
        assert_eq!(summary.languages.len(), 2);
        assert_eq!(summary.streams["files"].malformed, 1);
    }
}
