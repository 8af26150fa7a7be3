//! Column mappings for the export streams.
//!
//! Exports usually start with a header line naming their columns, and the
//! upstream index has added columns over time. Columns are therefore located
//! by name whenever a header is present; the configured index is only used
//! for headerless exports.

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The export streams consumed by the pipeline.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    #[display("torrents")]
    Torrents,
    #[display("files")]
    Files,
    #[display("attachments")]
    Attachments,
    #[display("attachment sizes")]
    Sizes,
}

/// A named column with its position in headerless exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub index: usize,
}
impl Column {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self { name: name.into(), index }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentColumns {
    pub id: Column,
    pub name: Column,
    pub total_size: Column,
    pub file_count: Column,
    /// Optional external (AniDB) reference; `None` ignores it entirely.
    pub external_ref: Option<Column>,
}
impl Default for TorrentColumns {
    fn default() -> Self {
        Self {
            id: Column::new("id", 0),
            name: Column::new("name", 4),
            total_size: Column::new("totalsize", 9),
            file_count: Column::new("torrentfiles", 15),
            external_ref: Some(Column::new("anidb_aid", 27)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileColumns {
    pub id: Column,
    pub torrent_id: Column,
    pub filename: Column,
}
impl Default for FileColumns {
    fn default() -> Self {
        Self {
            id: Column::new("id", 0),
            torrent_id: Column::new("torrent_id", 1),
            filename: Column::new("filename", 3),
        }
    }
}

/// The JSON column always extends to the end of the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentColumns {
    pub file_id: Column,
    pub data: Column,
}
impl Default for AttachmentColumns {
    fn default() -> Self {
        Self { file_id: Column::new("id", 0), data: Column::new("data", 1) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeColumns {
    pub id: Column,
    pub size: Column,
}
impl Default for SizeColumns {
    fn default() -> Self {
        Self { id: Column::new("id", 0), size: Column::new("filesize", 2) }
    }
}

/// Column mappings for every stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub torrents: TorrentColumns,
    pub files: FileColumns,
    pub attachments: AttachmentColumns,
    pub sizes: SizeColumns,
}

/// A column as requested by a record parser.
pub struct Slot<'a> {
    pub(crate) column: &'a Column,
    pub(crate) required: bool,
}
impl<'a> Slot<'a> {
    pub(crate) fn required(column: &'a Column) -> Self {
        Self { column, required: true }
    }
    pub(crate) fn optional(column: &'a Column) -> Self {
        Self { column, required: false }
    }
}

/// Resolved field positions for one stream, in slot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) stream: Stream,
    pub(crate) indices: Vec<Option<usize>>,
    /// Minimum number of fields a line needs to carry every required column.
    pub(crate) width: usize,
    /// When set, lines are split into at most this many fields and the last
    /// one keeps any embedded tabs.
    pub(crate) limit: Option<usize>,
}
impl Layout {
    /// Locate each slot, by name in `header` when there is one, otherwise by
    /// its configured index.
    pub(crate) fn resolve(stream: Stream, slots: &[Slot<'_>], header: Option<&[&str]>, remainder: bool) -> Result<Self> {
        let mut indices = Vec::with_capacity(slots.len());
        for slot in slots {
            let index = match header {
                None => Some(slot.column.index),
                Some(names) => match names.iter().position(|name| name.trim() == slot.column.name) {
                    Some(index) => Some(index),
                    None if slot.required => exn::bail!(ErrorKind::MissingColumn {
                        stream,
                        column: slot.column.name.clone(),
                    }),
                    None => {
                        tracing::warn!(%stream, column = %slot.column.name, "optional column missing from header");
                        None
                    },
                },
            };
            indices.push(index);
        }
        let width = slots
            .iter()
            .zip(&indices)
            .filter(|(slot, _)| slot.required)
            .filter_map(|(_, index)| *index)
            .max()
            .map_or(0, |max| max + 1);
        let limit = if remainder { indices.last().copied().flatten().map(|last| last + 1) } else { None };
        Ok(Self { stream, indices, width, limit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_headerless_uses_indices() {
        let columns = TorrentColumns::default();
        let slots = [
            Slot::required(&columns.id),
            Slot::required(&columns.name),
            Slot::optional(columns.external_ref.as_ref().unwrap()),
        ];
        let layout = Layout::resolve(Stream::Torrents, &slots, None, false).unwrap();
        assert_eq!(layout.indices, vec![Some(0), Some(4), Some(27)]);
        // Optional columns don't widen the minimum line.
        assert_eq!(layout.width, 5);
        assert_eq!(layout.limit, None);
    }

    #[test]
    fn test_resolve_header_by_name() {
        let columns = FileColumns::default();
        let slots = [Slot::required(&columns.id), Slot::required(&columns.torrent_id), Slot::required(&columns.filename)];
        let header = ["filename", "id", "size", "torrent_id"];
        let layout = Layout::resolve(Stream::Files, &slots, Some(header.as_slice()), false).unwrap();
        assert_eq!(layout.indices, vec![Some(1), Some(3), Some(0)]);
        assert_eq!(layout.width, 4);
    }

    #[test]
    fn test_resolve_missing_required_column() {
        let columns = FileColumns::default();
        let slots = [Slot::required(&columns.id), Slot::required(&columns.filename)];
        let header = ["id", "torrent_id", "name"];
        let err = Layout::resolve(Stream::Files, &slots, Some(header.as_slice()), false).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingColumn { stream: Stream::Files, column: "filename".to_string() });
    }

    #[test]
    fn test_resolve_missing_optional_column() {
        let columns = TorrentColumns::default();
        let slots = [Slot::required(&columns.id), Slot::optional(columns.external_ref.as_ref().unwrap())];
        let header = ["id", "name"];
        let layout = Layout::resolve(Stream::Torrents, &slots, Some(header.as_slice()), false).unwrap();
        assert_eq!(layout.indices, vec![Some(0), None]);
    }

    #[test]
    fn test_resolve_remainder_limit() {
        let columns = AttachmentColumns::default();
        let slots = [Slot::required(&columns.file_id), Slot::required(&columns.data)];
        let layout = Layout::resolve(Stream::Attachments, &slots, None, true).unwrap();
        assert_eq!(layout.limit, Some(2));
    }

    #[test]
    fn test_schema_deserialize_partial() {
        let schema: Schema = serde_json::from_str(r#"{"files": {"id": {"name": "fid", "index": 2},
            "torrent_id": {"name": "tid", "index": 0}, "filename": {"name": "fn", "index": 1}}}"#)
        .unwrap();
        assert_eq!(schema.files.id, Column::new("fid", 2));
        assert_eq!(schema.torrents, TorrentColumns::default());
    }
}
