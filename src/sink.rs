
use std::{
    fmt,
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::debug;

use crate::{error::Error, params::ByteOrder};

/// Append-only destination for sum records.
///
/// Values are written as a flat sequence of `u32` in the configured byte order,
/// with no framing. Writes are buffered, and [`Sink::flush`] pushes a completed
/// record out so that I/O errors surface on the call that produced the record.
pub struct Sink {
    writer: BufWriter<Box<dyn Write + Send>>,
    byte_order: ByteOrder,
    path: Option<PathBuf>,
    scratch: Vec<u8>,
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("byte_order", &self.byte_order)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Sink {
    /// Creates the file at `path`, truncating anything already there.
    pub fn create(path: &Path, byte_order: ByteOrder) -> Result<Self, Error> {
        let file = File::create(path).map_err(|source| Error::SinkOpen {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("opened sink {}", path.display());

        let mut sink = Self::from_writer(Box::new(file), byte_order);
        sink.path = Some(path.to_path_buf());
        Ok(sink)
    }

    #[must_use]
    pub fn from_writer(writer: Box<dyn Write + Send>, byte_order: ByteOrder) -> Self {
        Self {
            writer: BufWriter::new(writer),
            byte_order,
            path: None,
            scratch: Vec::new(),
        }
    }

    /// Changes the encoding of values written from now on.
    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Appends `sums` in index order.
    pub fn write_sums(&mut self, sums: &[u32]) -> io::Result<()> {
        if self.byte_order.is_native() {
            return self.writer.write_all(bytemuck::cast_slice(sums));
        }

        self.scratch.clear();
        self.scratch.reserve(sums.len() * size_of::<u32>());
        for &value in sums {
            self.scratch.extend_from_slice(&self.byte_order.encode(value));
        }
        self.writer.write_all(&self.scratch)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Flushes anything still buffered and closes the underlying writer.
    pub fn close(mut self) -> io::Result<()> {
        self.writer.flush()?;
        if let Some(path) = &self.path {
            debug!("closed sink {}", path.display());
        }
        Ok(())
    }
}
