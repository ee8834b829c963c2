
use std::io::{self, Read};

use crate::params::{ByteOrder, Geometry, SumAxes};

/// One record read back from a sink.
///
/// A field is `None` when its axis was not tracked by the batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SumRecord {
    pub rows: Option<Vec<u32>>,
    pub cols: Option<Vec<u32>>,
}

/// Decodes the records a batch wrote to its sink.
///
/// The stream has no header, so the reader is told the batch's geometry, axes
/// and byte order up front. Per-image records and the trailing grand-total
/// record share the same layout and are read the same way.
pub struct RecordReader<R> {
    inner: R,
    geometry: Geometry,
    axes: SumAxes,
    byte_order: ByteOrder,
    buf: Vec<u8>,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R, geometry: Geometry, axes: SumAxes, byte_order: ByteOrder) -> Self {
        Self {
            inner,
            geometry,
            axes,
            byte_order,
            buf: Vec::new(),
        }
    }

    /// Size in bytes of a single record.
    #[must_use]
    pub fn record_size(&self) -> usize {
        self.geometry.record_len(self.axes) * size_of::<u32>()
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` at a clean end of stream, and an
    /// [`io::ErrorKind::UnexpectedEof`] error if the stream stops partway
    /// through a record.
    pub fn read_record(&mut self) -> io::Result<Option<SumRecord>> {
        let size = self.record_size();
        if size == 0 {
            return Ok(None);
        }

        self.buf.resize(size, 0);
        let mut filled = 0;
        while filled < size {
            match self.inner.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled < size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("record truncated after {filled} of {size} bytes"),
            ));
        }

        let mut values = self.buf.chunks_exact(size_of::<u32>()).map(|chunk| {
            self.byte_order
                .decode([chunk[0], chunk[1], chunk[2], chunk[3]])
        });
        let rows = self
            .axes
            .contains(SumAxes::ROWS)
            .then(|| values.by_ref().take(self.geometry.height().get()).collect());
        let cols = self
            .axes
            .contains(SumAxes::COLS)
            .then(|| values.by_ref().take(self.geometry.width().get()).collect());

        Ok(Some(SumRecord { rows, cols }))
    }

    /// Reads every remaining record.
    pub fn read_all(&mut self) -> io::Result<Vec<SumRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
