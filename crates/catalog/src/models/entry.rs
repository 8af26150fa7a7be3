use derive_more::Display;
use serde::{Deserialize, Serialize};

/// What a download URL points at.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackKind {
    /// A single attachment that isn't tied to an episode.
    #[default]
    #[display("none")]
    None,
    /// A single attachment for one episode.
    #[display("episode_individual")]
    EpisodeIndividual,
    /// Every attachment of one episode's file, as an archive.
    #[display("episode_pack")]
    EpisodePack,
    /// Every attachment of the torrent, as an archive.
    #[display("complete_pack")]
    CompletePack,
}
impl PackKind {
    pub fn is_pack(&self) -> bool {
        matches!(self, Self::EpisodePack | Self::CompletePack)
    }
}

/// One downloadable subtitle item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubtitleEntry {
    pub display_label: String,
    pub resolved_language: String,
    pub byte_size: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub episode_number: Option<u32>,
    pub pack_kind: PackKind,
    pub download_url: String,
    /// Last episode covered, when the entry spans more than its own episode.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_episode: Option<u32>,
}
