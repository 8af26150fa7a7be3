use crate::error::{Error, ErrorKind, Result};
use crate::schema::{Layout, Slot, Stream};
use exn::ResultExt;
use serde::Serialize;
use std::io::BufRead;
use std::marker::PhantomData;
use tracing::instrument;

/// A record type that can be read from one of the export streams.
pub trait Parse: Sized {
    const STREAM: Stream;
    /// Whether the last column swallows the rest of the line, tabs included.
    const REMAINDER: bool = false;
    type Columns;

    /// The columns this record reads, in the order [`Parse::parse`] indexes
    /// them. The first slot identifies the header line.
    fn slots(columns: &Self::Columns) -> Vec<Slot<'_>>;
    fn parse(row: &Row<'_>) -> Result<Self>;
}

/// Line counters for a single stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    /// Lines read, including the header and blank lines.
    pub lines: u64,
    pub records: u64,
    /// Lines skipped because they could not be parsed.
    pub malformed: u64,
    pub header: bool,
}

/// One data line split into fields.
pub struct Row<'a> {
    stream: Stream,
    line: u64,
    fields: Vec<&'a str>,
    indices: &'a [Option<usize>],
}
impl<'a> Row<'a> {
    /// The raw value of a slot.
    pub fn field(&self, slot: usize) -> Result<&'a str> {
        self.optional(slot).ok_or_else(|| self.malformed("missing column"))
    }

    /// The raw value of a slot that may be absent.
    pub fn optional(&self, slot: usize) -> Option<&'a str> {
        let index = (*self.indices.get(slot)?)?;
        self.fields.get(index).copied()
    }

    /// A slot that must hold a number (identifiers, foreign keys).
    pub fn number(&self, slot: usize, reason: &'static str) -> Result<u64> {
        self.field(slot)?.trim().parse().map_err(|_| self.malformed(reason))
    }

    /// A numeric slot where anything unparseable counts as zero.
    pub fn number_or_zero(&self, slot: usize) -> u64 {
        self.optional(slot).and_then(|value| value.trim().parse().ok()).unwrap_or_default()
    }

    pub fn malformed(&self, reason: &'static str) -> Error {
        exn::Exn::new(self.kind(reason))
    }

    pub fn kind(&self, reason: &'static str) -> ErrorKind {
        ErrorKind::MalformedLine { stream: self.stream, line: self.line, reason }
    }
}

/// Streams typed records out of a tab-separated export.
///
/// Lines are decoded lossily (invalid UTF-8 becomes U+FFFD). Blank lines are
/// ignored and malformed lines are logged, counted and skipped; only I/O
/// failures surface as errors.
pub struct Reader<R, T> {
    inner: R,
    layout: Layout,
    buffer: Vec<u8>,
    pending: Option<(u64, String)>,
    stats: ReadStats,
    failed: bool,
    _record: PhantomData<fn() -> T>,
}
impl<R: BufRead, T: Parse> Reader<R, T> {
    /// Read up to the first non-blank line to determine the column layout.
    ///
    /// The first line is a header when its first field is not a number and
    /// one of its fields names the identifying column.
    #[instrument(skip_all, fields(stream = %T::STREAM))]
    pub fn new(mut inner: R, columns: &T::Columns) -> Result<Self> {
        let mut buffer = Vec::new();
        let mut lines = 0;
        let first = loop {
            let Some(text) = next_line(&mut inner, &mut buffer, T::STREAM)? else {
                exn::bail!(ErrorKind::EmptyStream(T::STREAM));
            };
            lines += 1;
            if !text.trim().is_empty() {
                break text;
            }
        };
        let slots = T::slots(columns);
        let fields: Vec<&str> = first.split('\t').collect();
        let is_header = fields.first().is_some_and(|field| field.trim().parse::<u64>().is_err())
            && slots.first().is_some_and(|slot| fields.iter().any(|field| field.trim() == slot.column.name));
        let layout = Layout::resolve(T::STREAM, &slots, is_header.then_some(fields.as_slice()), T::REMAINDER)?;
        tracing::debug!(header = is_header, indices = ?layout.indices, "resolved column layout");
        Ok(Self {
            inner,
            layout,
            buffer,
            pending: if is_header { None } else { Some((lines, first)) },
            stats: ReadStats { lines, header: is_header, ..Default::default() },
            failed: false,
            _record: PhantomData,
        })
    }

    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    /// Finish with the stream. A stream that produced no records at all is
    /// indistinguishable from an upstream format change, and is an error.
    pub fn finish(self) -> Result<ReadStats> {
        if self.stats.records == 0 {
            exn::bail!(ErrorKind::EmptyStream(T::STREAM));
        }
        tracing::info!(stream = %T::STREAM, records = self.stats.records, malformed = self.stats.malformed, "read stream");
        Ok(self.stats)
    }

    fn parse_line(&self, line: u64, text: &str) -> Result<T> {
        let fields: Vec<&str> = match self.layout.limit {
            Some(limit) => text.splitn(limit, '\t').collect(),
            None => text.split('\t').collect(),
        };
        let row = Row { stream: T::STREAM, line, fields, indices: &self.layout.indices };
        if row.fields.len() < self.layout.width {
            return Err(row.malformed("too few columns"));
        }
        T::parse(&row)
    }
}
impl<R: BufRead, T: Parse> Iterator for Reader<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let (line, text) = match self.pending.take() {
                Some(pending) => pending,
                None => match next_line(&mut self.inner, &mut self.buffer, T::STREAM) {
                    Ok(Some(text)) => {
                        self.stats.lines += 1;
                        (self.stats.lines, text)
                    },
                    Ok(None) => return None,
                    Err(err) => {
                        self.failed = true;
                        return Some(Err(err));
                    },
                },
            };
            if text.trim().is_empty() {
                continue;
            }
            match self.parse_line(line, &text) {
                Ok(record) => {
                    self.stats.records += 1;
                    return Some(Ok(record));
                },
                Err(err) => {
                    self.stats.malformed += 1;
                    let kind: &ErrorKind = &err;
                    tracing::debug!(error = %kind, "skipping line");
                },
            }
        }
    }
}

fn next_line<R: BufRead>(reader: &mut R, buffer: &mut Vec<u8>, stream: Stream) -> Result<Option<String>> {
    buffer.clear();
    let read = reader.read_until(b'\n', buffer).or_raise(|| ErrorKind::Io(stream))?;
    if read == 0 {
        return Ok(None);
    }
    while buffer.last().is_some_and(|byte| matches!(byte, b'\n' | b'\r')) {
        buffer.pop();
    }
    Ok(Some(String::from_utf8_lossy(buffer).into_owned()))
}
