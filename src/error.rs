//! Error types for batch summation.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors reported by [`SumEngine`](crate::SumEngine) operations.
///
/// Every error is local to the call that produced it. A failed call leaves the
/// in-memory accumulators consistent.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid geometry {width}x{height}: width must be a positive multiple of 32 and height must be positive")]
    InvalidGeometry { width: u16, height: u16 },

    #[error("Failed to open sink '{path}': {source}")]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write to sink: {source}")]
    SinkWrite {
        #[source]
        source: io::Error,
    },

    #[error("Cannot capture a background before any image has been accumulated")]
    NoImagesAccumulated,

    #[error("Luma buffer has {actual} bytes, expected {expected}")]
    LumaLength { expected: usize, actual: usize },

    #[error("No batch has been started")]
    NotStarted,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
