//! Opening (possibly compressed) export files.

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use exn::ResultExt;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::instrument;
use xz2::read::XzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

/// Compression of an export file.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash)]
pub enum Compression {
    #[default]
    #[display("none")]
    None,
    #[display("gzip")]
    Gzip,
    #[display("xz")]
    Xz,
}
impl Compression {
    /// Detect compression from a file extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("gz") => Compression::Gzip,
            Some("xz") => Compression::Xz,
            _ => Compression::None,
        }
    }

    /// Detect compression from the first bytes of a stream.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Self {
        if bytes.starts_with(&GZIP_MAGIC) {
            return Compression::Gzip;
        }
        if bytes.starts_with(&XZ_MAGIC) {
            return Compression::Xz;
        }
        Compression::None
    }

    /// Wrap a reader with the matching decompression layer.
    pub fn wrap_reader<'a, R: Read + 'a>(&self, reader: R) -> Box<dyn Read + 'a> {
        match self {
            Compression::None => Box::new(reader),
            Compression::Gzip => Box::new(MultiGzDecoder::new(reader)),
            Compression::Xz => Box::new(XzDecoder::new_multi_decoder(reader)),
        }
    }
}

/// Open an export for line-by-line reading.
///
/// The extension decides the compression; files without a recognised
/// extension are sniffed.
#[instrument(fields(path = %path.display(), compression))]
pub fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).or_raise(|| ErrorKind::Input(path.to_path_buf()))?;
    let mut reader = BufReader::new(file);
    let compression = match Compression::from_path(path) {
        Compression::None => {
            Compression::from_magic_bytes(reader.fill_buf().or_raise(|| ErrorKind::Input(path.to_path_buf()))?)
        },
        compression => compression,
    };
    tracing::Span::current().record("compression", tracing::field::display(compression));
    Ok(match compression {
        Compression::None => Box::new(reader),
        compression => Box::new(BufReader::new(compression.wrap_reader(reader))),
    })
}
