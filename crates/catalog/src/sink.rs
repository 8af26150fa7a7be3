//! Catalog sinks.
//!
//! A [`CatalogSink`] receives finished [`CatalogRecord`]s. Records are keyed
//! by torrent id: putting a record for a torrent that is already present
//! replaces it, so a sink fed the same records twice ends up in the same state.
//!
//! ```
//! use subcat_catalog::sink::{CatalogSink, MemorySink};
//! # use subcat_catalog::models::CatalogRecord;
//! # fn record(id: u64) -> CatalogRecord {
//! #     CatalogRecord {
//! #         torrent_id: id, display_name: "Show".into(), languages: Default::default(),
//! #         subtitle_entries: vec![], episodes_available: Default::default(),
//! #         file_count: 1, total_size: 0, external_ref_id: None,
//! #     }
//! # }
//! let mut sink = MemorySink::default();
//! sink.put(record(2))?;
//! sink.put(record(1))?;
//! sink.put(record(2))?;
//! sink.finish()?;
//! assert_eq!(sink.records().map(|r| r.torrent_id).collect::<Vec<_>>(), vec![1, 2]);
//! # Ok::<(), subcat_catalog::error::Error>(())
//! ```

use crate::error::{ErrorKind, Result};
use crate::models::CatalogRecord;
use exn::ResultExt;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::instrument;

pub trait CatalogSink: Send {
    /// Store a record, replacing any earlier record for the same torrent.
    fn put(&mut self, record: CatalogRecord) -> Result<()>;

    /// Store every record of an iterator.
    fn put_all(&mut self, records: impl IntoIterator<Item = CatalogRecord>) -> Result<()>
    where
        Self: Sized,
    {
        records.into_iter().try_for_each(|record| self.put(record))
    }

    /// Flush everything that was put. Calling `finish` more than once is harmless.
    fn finish(&mut self) -> Result<()>;
}

/// Keeps the catalog in memory, ordered by torrent id.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: BTreeMap<u64, CatalogRecord>,
}
impl MemorySink {
    pub fn get(&self, torrent_id: u64) -> Option<&CatalogRecord> {
        self.records.get(&torrent_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &CatalogRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<CatalogRecord> {
        self.records.into_values().collect()
    }
}
impl CatalogSink for MemorySink {
    fn put(&mut self, record: CatalogRecord) -> Result<()> {
        self.records.insert(record.torrent_id, record);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes one JSON object per torrent, ordered by torrent id, when finished.
pub struct JsonLinesSink<W: Write + Send> {
    pending: MemorySink,
    writer: W,
}
impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { pending: MemorySink::default(), writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
impl<W: Write + Send> CatalogSink for JsonLinesSink<W> {
    fn put(&mut self, record: CatalogRecord) -> Result<()> {
        self.pending.put(record)
    }

    #[instrument(skip_all, fields(records = self.pending.len()))]
    fn finish(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        for record in pending.records() {
            serde_json::to_writer(&mut self.writer, record).or_raise(|| ErrorKind::Serialize("catalog record"))?;
            self.writer.write_all(b"\n").or_raise(|| ErrorKind::Io)?;
        }
        self.writer.flush().or_raise(|| ErrorKind::Io)?;
        tracing::debug!(written = pending.len(), "wrote catalog records");
        Ok(())
    }
}
