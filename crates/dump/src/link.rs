use crate::error::Result;
use crate::records::{AttachmentRecord, FileRecord, TorrentRecord};
use crate::sizes::AttachmentSizes;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::instrument;

/// A subtitle track joined to its file, with its byte size resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentTrack {
    pub file_id: u64,
    pub raw_language_tag: String,
    pub attachment_ref: u64,
    pub byte_size: u64,
}

/// A file with at least one subtitle track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedFile {
    pub file: FileRecord,
    pub tracks: Vec<AttachmentTrack>,
}

/// Everything the pipeline needs to know about one torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentBundle {
    pub torrent: TorrentRecord,
    /// Subtitle-bearing files, ordered by file id.
    pub files: Vec<LinkedFile>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    pub torrents: u64,
    pub files: u64,
    pub tracks: u64,
    /// Tracks repeated within the same file.
    pub duplicate_tracks: u64,
    /// Attachment records whose file never appeared.
    pub orphan_attachments: u64,
    /// Subtitle-bearing files whose torrent never appeared.
    pub orphan_files: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Linked {
    /// Ordered by torrent id.
    pub bundles: Vec<TorrentBundle>,
    pub stats: LinkStats,
}

/// Join attachments to files and files to torrents.
///
/// Streams are consumed in dependency order so that only subtitle-bearing
/// files and the torrents that own them are ever held in memory. A record
/// that cannot be joined is dropped; no partial bundle is produced. The
/// first error from any stream aborts the join.
#[instrument(skip_all)]
pub fn link<A, F, T>(sizes: &AttachmentSizes, attachments: A, files: F, torrents: T) -> Result<Linked>
where
    A: IntoIterator<Item = Result<AttachmentRecord>>,
    F: IntoIterator<Item = Result<FileRecord>>,
    T: IntoIterator<Item = Result<TorrentRecord>>,
{
    let mut stats = LinkStats::default();

    let mut tracks: HashMap<u64, Vec<AttachmentTrack>> = HashMap::new();
    let mut seen: HashSet<(u64, u64)> = HashSet::new();
    for record in attachments {
        let record = record?;
        for track in record.tracks {
            if !seen.insert((record.file_id, track.attachment_ref)) {
                stats.duplicate_tracks += 1;
                continue;
            }
            tracks.entry(record.file_id).or_default().push(AttachmentTrack {
                file_id: record.file_id,
                byte_size: sizes.resolve(track.attachment_ref, track.inline_size),
                raw_language_tag: track.language,
                attachment_ref: track.attachment_ref,
            });
        }
    }
    drop(seen);

    let mut by_torrent: HashMap<u64, Vec<LinkedFile>> = HashMap::new();
    for file in files {
        let file = file?;
        if let Some(tracks) = tracks.remove(&file.id) {
            by_torrent.entry(file.torrent_id).or_default().push(LinkedFile { file, tracks });
        }
    }
    stats.orphan_attachments = tracks.len() as u64;

    let mut bundles = BTreeMap::new();
    for torrent in torrents {
        let torrent = torrent?;
        if let Some(mut files) = by_torrent.remove(&torrent.id) {
            files.sort_by_key(|linked| linked.file.id);
            stats.files += files.len() as u64;
            stats.tracks += files.iter().map(|linked| linked.tracks.len() as u64).sum::<u64>();
            bundles.insert(torrent.id, TorrentBundle { torrent, files });
        }
    }
    stats.orphan_files = by_torrent.values().map(|files| files.len() as u64).sum();
    stats.torrents = bundles.len() as u64;

    tracing::info!(
        torrents = stats.torrents,
        files = stats.files,
        tracks = stats.tracks,
        orphan_attachments = stats.orphan_attachments,
        orphan_files = stats.orphan_files,
        "linked attachments"
    );
    Ok(Linked { bundles: bundles.into_values().collect(), stats })
}
