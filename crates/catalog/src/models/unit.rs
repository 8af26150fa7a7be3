use subcat_classify::Classification;
use subcat_dump::{AttachmentTrack, FileRecord};

/// An attachment track with its language resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub track: AttachmentTrack,
    pub resolved_language: String,
}

/// A subtitle-bearing file with its episode classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFile {
    pub file: FileRecord,
    pub classification: Classification,
    pub tracks: Vec<ResolvedTrack>,
}
impl ClassifiedFile {
    pub fn subtitle_bytes(&self) -> u64 {
        self.tracks.iter().map(|t| t.track.byte_size).sum()
    }
}
