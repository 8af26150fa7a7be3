mod entry;
mod record;
mod unit;

pub use self::entry::{PackKind, SubtitleEntry};
pub use self::record::{CatalogRecord, format_size};
pub use self::unit::{ClassifiedFile, ResolvedTrack};
