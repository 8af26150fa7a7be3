use crate::error::Result;
use crate::reader::{Parse, Row};
use crate::schema::{AttachmentColumns, FileColumns, SizeColumns, Slot, Stream, TorrentColumns};
use serde_json::Value;
use subcat_classify::language::{UNDETERMINED, normalize_tag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentRecord {
    pub id: u64,
    pub name: String,
    /// Total size of the torrent payload in bytes.
    pub total_size: u64,
    pub file_count: u64,
    /// AniDB anime id, when the index knows it.
    pub external_ref: Option<u64>,
}
impl Parse for TorrentRecord {
    const STREAM: Stream = Stream::Torrents;
    type Columns = TorrentColumns;

    fn slots(columns: &TorrentColumns) -> Vec<Slot<'_>> {
        let mut slots = vec![
            Slot::required(&columns.id),
            Slot::required(&columns.name),
            Slot::required(&columns.total_size),
            Slot::required(&columns.file_count),
        ];
        if let Some(external_ref) = &columns.external_ref {
            slots.push(Slot::optional(external_ref));
        }
        slots
    }

    fn parse(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.number(0, "non-numeric torrent id")?,
            name: row.field(1)?.trim().to_string(),
            total_size: row.number_or_zero(2),
            file_count: row.number_or_zero(3),
            external_ref: row.optional(4).and_then(|value| value.trim().parse().ok()).filter(|id| *id != 0),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: u64,
    pub torrent_id: u64,
    pub filename: String,
}
impl Parse for FileRecord {
    const STREAM: Stream = Stream::Files;
    type Columns = FileColumns;

    fn slots(columns: &FileColumns) -> Vec<Slot<'_>> {
        vec![Slot::required(&columns.id), Slot::required(&columns.torrent_id), Slot::required(&columns.filename)]
    }

    fn parse(row: &Row<'_>) -> Result<Self> {
        let filename = row.field(2)?.trim();
        if filename.is_empty() {
            return Err(row.malformed("empty filename"));
        }
        Ok(Self {
            id: row.number(0, "non-numeric file id")?,
            torrent_id: row.number(1, "non-numeric torrent id")?,
            filename: filename.to_string(),
        })
    }
}

/// A subtitle track as listed in the attachments export, before its byte
/// size has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub attachment_ref: u64,
    /// Normalized tag; [`UNDETERMINED`] when the track carries none.
    pub language: String,
    /// Size reported alongside the track, if any.
    pub inline_size: Option<u64>,
}
impl TrackRef {
    /// Only `_afid` is required; a `lang` or size of the wrong type counts as absent.
    fn from_value(value: &Value) -> Option<Self> {
        let attachment_ref = value.get("_afid")?.as_u64()?;
        let size = |key: &str| value.get(key).and_then(positive_size);
        Some(Self {
            attachment_ref,
            language: value.get("lang").and_then(Value::as_str).map_or_else(|| UNDETERMINED.to_string(), normalize_tag),
            inline_size: size("size").or_else(|| size("_size")),
        })
    }
}

/// Sizes are sometimes exported as whole floats (`31000.0`).
fn positive_size(value: &Value) -> Option<u64> {
    let whole = |size: &f64| size.fract() == 0.0 && *size >= 0.0 && *size < u64::MAX as f64;
    let size = value.as_u64().or_else(|| value.as_f64().filter(whole).map(|size| size as u64))?;
    (size > 0).then_some(size)
}

/// Subtitle tracks attached to one file.
///
/// The export stores them as `file_id<TAB>JSON`, where the JSON is an array
/// whose second element lists the subtitle tracks. Entries that are not
/// objects or lack an attachment id are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRecord {
    pub file_id: u64,
    pub tracks: Vec<TrackRef>,
}
impl Parse for AttachmentRecord {
    const STREAM: Stream = Stream::Attachments;
    const REMAINDER: bool = true;
    type Columns = AttachmentColumns;

    fn slots(columns: &AttachmentColumns) -> Vec<Slot<'_>> {
        vec![Slot::required(&columns.file_id), Slot::required(&columns.data)]
    }

    fn parse(row: &Row<'_>) -> Result<Self> {
        let file_id = row.number(0, "non-numeric file id")?;
        let value: Value = serde_json::from_str(row.field(1)?.trim()).map_err(|_| row.malformed("invalid JSON"))?;
        let Value::Array(items) = value else {
            return Err(row.malformed("attachment data is not an array"));
        };
        let tracks = match items.get(1) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(subtitles)) => subtitles.iter().filter_map(TrackRef::from_value).collect(),
            Some(_) => return Err(row.malformed("subtitle list is not an array")),
        };
        Ok(Self { file_id, tracks })
    }
}

/// A row of the attachment-size side table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRecord {
    pub attachment_ref: u64,
    pub byte_size: u64,
}
impl Parse for SizeRecord {
    const STREAM: Stream = Stream::Sizes;
    type Columns = SizeColumns;

    fn slots(columns: &SizeColumns) -> Vec<Slot<'_>> {
        vec![Slot::required(&columns.id), Slot::required(&columns.size)]
    }

    fn parse(row: &Row<'_>) -> Result<Self> {
        Ok(Self { attachment_ref: row.number(0, "non-numeric attachment id")?, byte_size: row.number_or_zero(1) })
    }
}
