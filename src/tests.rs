use std::{
    io::{self, Write},
    path::PathBuf,
    sync::{Arc, Mutex},
};

/// In-memory writer whose contents stay readable after it is handed to a sink.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().map(|buf| buf.clone()).unwrap_or_default()
    }

    pub fn native_u32s(&self) -> Vec<u32> {
        self.bytes()
            .chunks_exact(4)
            .map(|chunk| u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("poisoned buffer"))?
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that rejects every write.
#[derive(Debug, Default)]
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _data: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"))
    }
}

/// A path in the system temp directory unique to this process and test.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("imgsum_{}_{}", std::process::id(), name))
}
