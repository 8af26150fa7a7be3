use crate::error::Result;
use crate::records::SizeRecord;
use std::collections::HashMap;

/// Byte size assumed for a subtitle track nobody reported a size for.
pub const DEFAULT_ATTACHMENT_SIZE: u64 = 50_000;

/// Attachment byte sizes from the side table.
///
/// Built once before linking and only read afterwards.
#[derive(Debug, Clone)]
pub struct AttachmentSizes {
    sizes: HashMap<u64, u64>,
    fallback: u64,
}
impl AttachmentSizes {
    pub fn new(fallback: u64) -> Self {
        Self { sizes: HashMap::new(), fallback }
    }

    /// Load every record of a side-table stream. Zero sizes are not recorded.
    pub fn load<I>(&mut self, records: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Result<SizeRecord>>,
    {
        for record in records {
            let record = record?;
            if record.byte_size > 0 {
                self.sizes.insert(record.attachment_ref, record.byte_size);
            }
        }
        Ok(self)
    }

    /// Resolve a track's byte size: side table first, then the size reported
    /// with the track, then the fallback.
    pub fn resolve(&self, attachment_ref: u64, inline_size: Option<u64>) -> u64 {
        self.sizes.get(&attachment_ref).copied().or(inline_size).unwrap_or(self.fallback)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}
impl Default for AttachmentSizes {
    fn default() -> Self {
        Self::new(DEFAULT_ATTACHMENT_SIZE)
    }
}
