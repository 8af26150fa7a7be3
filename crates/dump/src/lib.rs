//! Readers for the tab-separated exports of a torrent index, and the linker
//! that joins them into per-torrent bundles of subtitle-bearing files.
//!
//! # Streams
//! - **torrents**: one line per torrent (id, name, size, file count, ...).
//! - **files**: one line per file inside a torrent.
//! - **attachments**: `file_id<TAB>JSON`, listing subtitle tracks per file.
//! - **attachment sizes** (optional): byte size per attachment id.
//!
//! Each stream is read through a [`Reader`], which yields typed records and
//! counts the lines it had to skip. [`link`] consumes the readers in
//! dependency order and produces [`TorrentBundle`]s.

pub mod error;
mod link;
mod reader;
mod records;
pub mod schema;
mod sizes;

pub use crate::link::{AttachmentTrack, LinkStats, LinkedFile, Linked, TorrentBundle, link};
pub use crate::reader::{Parse, ReadStats, Reader, Row};
pub use crate::records::{AttachmentRecord, FileRecord, SizeRecord, TorrentRecord, TrackRef};
pub use crate::schema::{Schema, Stream};
pub use crate::sizes::{AttachmentSizes, DEFAULT_ATTACHMENT_SIZE};
