//! Pack synthesis.
//!
//! Turns a torrent's classified, language-resolved files into the ordered
//! list of [`SubtitleEntry`]s the catalog exposes:
//!
//! 1. at most one [`PackKind::CompletePack`] for the whole torrent,
//! 2. per-file [`PackKind::EpisodePack`] archives for multi-track episodes,
//! 3. a [`PackKind::EpisodeIndividual`] per episode, language and attachment,
//! 4. a [`PackKind::None`] entry for attachments of files that aren't episodes.
//!
//! Entries are unique by download URL and by `(episode, language, attachment)`.

use crate::models::{ClassifiedFile, PackKind, SubtitleEntry};
use crate::url::Urls;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use subcat_classify::language::{MULTIPLE, UNDETERMINED};
use subcat_dump::TorrentRecord;
use tracing::instrument;

pub const COMPLETE_PACK_LABEL: &str = "All Attachments (Pack)";

/// Thresholds deciding whether a torrent gets pack entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackPolicy {
    /// Distinct attachments at or above which a torrent is a pack.
    pub min_attachments: usize,
    /// Distinct resolved languages at or above which a torrent is a pack.
    pub min_languages: usize,
    /// File count above which a torrent is a pack.
    pub min_file_count: u64,
    /// Total payload size (bytes) above which a torrent is a pack.
    pub min_total_size: u64,
    /// Summed subtitle size (bytes) above which a torrent is a pack.
    pub min_subtitle_bytes: u64,
    /// Lower bound for a complete pack's reported size; archive overhead is unknown.
    pub size_floor: u64,
    /// Case-insensitive name fragments marking batch releases.
    pub keywords: Vec<String>,
}
impl Default for PackPolicy {
    fn default() -> Self {
        Self {
            min_attachments: 3,
            min_languages: 2,
            min_file_count: 3,
            min_total_size: 1024 * 1024 * 1024,
            min_subtitle_bytes: 1_000_000,
            size_floor: 2_000_000,
            keywords: [
                "batch",
                "complete",
                "season",
                "series",
                "collection",
                "volume",
                "vol.",
                "multi-subs",
                "multisubs",
                "dual audio",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}
impl PackPolicy {
    /// Whether any pack criterion holds for this torrent.
    pub fn is_eligible(&self, torrent: &TorrentRecord, files: &[ClassifiedFile]) -> bool {
        let tracks = || files.iter().flat_map(|file| &file.tracks);
        let attachments: HashSet<u64> = tracks().map(|t| t.track.attachment_ref).collect();
        let languages: HashSet<&str> = tracks().map(|t| t.resolved_language.as_str()).collect();
        let subtitle_bytes: u64 = files.iter().map(ClassifiedFile::subtitle_bytes).sum();
        let name = torrent.name.to_lowercase();
        attachments.len() >= self.min_attachments
            || languages.len() >= self.min_languages
            || torrent.file_count > self.min_file_count
            || torrent.total_size > self.min_total_size
            || subtitle_bytes > self.min_subtitle_bytes
            || self.keywords.iter().any(|keyword| name.contains(&keyword.to_lowercase()))
    }
}

/// Emits catalog entries for one torrent at a time.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    pub policy: PackPolicy,
    pub urls: Urls,
}
impl Synthesizer {
    pub fn new(policy: PackPolicy, urls: Urls) -> Self {
        Self { policy, urls }
    }

    #[instrument(level = "trace", skip_all, fields(torrent = torrent.id))]
    pub fn synthesize(&self, torrent: &TorrentRecord, files: &[ClassifiedFile]) -> Vec<SubtitleEntry> {
        let eligible = self.policy.is_eligible(torrent, files);
        let mut entries = Entries::default();

        let bearing: Vec<&ClassifiedFile> = files.iter().filter(|file| !file.tracks.is_empty()).collect();
        if eligible && bearing.len() > 1 {
            let bytes: u64 = bearing.iter().map(|file| file.subtitle_bytes()).sum();
            let languages = bearing.iter().flat_map(|file| &file.tracks).map(|track| &*track.resolved_language);
            entries.push(
                None,
                SubtitleEntry {
                    display_label: COMPLETE_PACK_LABEL.to_string(),
                    resolved_language: pack_language(languages),
                    byte_size: bytes.max(self.policy.size_floor),
                    episode_number: None,
                    pack_kind: PackKind::CompletePack,
                    download_url: self.urls.complete_pack(torrent.id, &torrent.name),
                    target_episode: None,
                },
            );
        }

        for file in &bearing {
            let classification = &file.classification;
            let filename = &file.file.filename;
            if !classification.is_episode() {
                for track in &file.tracks {
                    entries.push(None, SubtitleEntry {
                        display_label: filename.clone(),
                        resolved_language: track.resolved_language.clone(),
                        byte_size: track.track.byte_size,
                        episode_number: None,
                        pack_kind: PackKind::None,
                        download_url: self.urls.attachment(track.track.attachment_ref),
                        target_episode: None,
                    });
                }
                continue;
            }
            let episodes = classification.episodes();
            let (first, last) = (*episodes.start(), *episodes.end());
            let target = (last != first).then_some(last);
            if eligible && file.tracks.len() >= 2 {
                entries.push(None, SubtitleEntry {
                    display_label: filename.clone(),
                    resolved_language: pack_language(file.tracks.iter().map(|t| &*t.resolved_language)),
                    byte_size: file.subtitle_bytes(),
                    episode_number: Some(first),
                    pack_kind: PackKind::EpisodePack,
                    download_url: self.urls.episode_pack(file.file.id, filename),
                    target_episode: Some(last),
                });
            }
            for episode in episodes {
                for track in &file.tracks {
                    let key = (episode, track.resolved_language.clone(), track.track.attachment_ref);
                    entries.push(Some(key), SubtitleEntry {
                        display_label: filename.clone(),
                        resolved_language: track.resolved_language.clone(),
                        byte_size: track.track.byte_size,
                        episode_number: Some(episode),
                        pack_kind: PackKind::EpisodeIndividual,
                        download_url: self.urls.attachment(track.track.attachment_ref),
                        target_episode: target,
                    });
                }
            }
        }
        entries.finish()
    }
}

/// The language of an archive: the single language it contains, or `mul`.
fn pack_language<'a>(languages: impl Iterator<Item = &'a str>) -> String {
    let languages: BTreeSet<&str> = languages.collect();
    match languages.len() {
        0 => UNDETERMINED.to_string(),
        1 => languages.into_iter().next().unwrap_or(UNDETERMINED).to_string(),
        _ => MULTIPLE.to_string(),
    }
}

/// Collects entries, enforcing uniqueness.
#[derive(Default)]
struct Entries {
    entries: Vec<SubtitleEntry>,
    urls: HashSet<String>,
    keys: HashSet<(u32, String, u64)>,
}
impl Entries {
    /// The first entry for a URL or key wins.
    fn push(&mut self, key: Option<(u32, String, u64)>, entry: SubtitleEntry) {
        if self.urls.contains(&entry.download_url) {
            return;
        }
        if let Some(key) = key
            && !self.keys.insert(key)
        {
            return;
        }
        self.urls.insert(entry.download_url.clone());
        self.entries.push(entry);
    }

    /// Complete pack first, then episode-scoped entries by episode, then the rest.
    fn finish(mut self) -> Vec<SubtitleEntry> {
        self.entries.sort_by_key(|entry| match (entry.pack_kind, entry.episode_number) {
            (PackKind::CompletePack, _) => (0, 0),
            (_, Some(episode)) => (1, episode),
            (_, None) => (2, 0),
        });
        self.entries
    }
}
