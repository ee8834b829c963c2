use bitflags::bitflags;
use std::{num::NonZeroUsize, str::FromStr};

use anyhow::{Result, bail};

use crate::error::Error;

/// Width of every image row must be a whole number of these.
pub const WIDTH_ALIGNMENT: usize = 32;

bitflags! {
    /// Which projections a batch tracks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SumAxes: u8 {
        /// One sum per image row.
        const ROWS = 0b01;
        /// One sum per image column.
        const COLS = 0b10;
    }
}

impl SumAxes {
    #[must_use]
    pub fn from_wanted(want_rows: bool, want_cols: bool) -> Self {
        let mut axes = Self::empty();
        axes.set(Self::ROWS, want_rows);
        axes.set(Self::COLS, want_cols);
        axes
    }
}

impl TryFrom<i64> for SumAxes {
    type Error = anyhow::Error;

    fn try_from(val: i64) -> Result<Self> {
        let Ok(bits) = u8::try_from(val) else {
            bail!("Invalid value for 'axes', must be 0-3, got {val}.");
        };
        match Self::from_bits(bits) {
            Some(axes) => Ok(axes),
            None => bail!("Invalid value for 'axes', must be 0-3, got {val}."),
        }
    }
}

/// Byte order of the `u32` values written to a sink.
///
/// The output carries no header, so whoever reads it back has to agree on this
/// out-of-band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteOrder {
    #[default]
    Native = 0,
    Little = 1,
    Big = 2,
}

impl ByteOrder {
    #[must_use]
    pub fn encode(self, value: u32) -> [u8; 4] {
        match self {
            Self::Native => value.to_ne_bytes(),
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }

    #[must_use]
    pub fn decode(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Native => u32::from_ne_bytes(bytes),
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        }
    }

    /// Whether values can be written as their in-memory representation.
    #[must_use]
    pub fn is_native(self) -> bool {
        match self {
            Self::Native => true,
            Self::Little => cfg!(target_endian = "little"),
            Self::Big => cfg!(target_endian = "big"),
        }
    }
}

impl TryFrom<i64> for ByteOrder {
    type Error = anyhow::Error;

    fn try_from(val: i64) -> Result<Self> {
        Ok(match val {
            0 => Self::Native,
            1 => Self::Little,
            2 => Self::Big,
            _ => bail!("Invalid value for 'byteorder', must be 0-2, got {val}."),
        })
    }
}

impl FromStr for ByteOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "native" | "ne" => Self::Native,
            "little" | "le" => Self::Little,
            "big" | "be" => Self::Big,
            _ => bail!("Invalid value for 'byteorder', must be native, little or big, got {s:?}."),
        })
    }
}

/// Dimensions shared by every image of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    width: NonZeroUsize,
    height: NonZeroUsize,
}

impl Geometry {
    /// Validates the dimensions of a batch.
    ///
    /// Rows carry no padding, so `width` must be a multiple of
    /// [`WIDTH_ALIGNMENT`]. Zero-sized images are rejected as well.
    pub fn new(width: u16, height: u16) -> Result<Self, Error> {
        let invalid = Error::InvalidGeometry { width, height };
        if usize::from(width) % WIDTH_ALIGNMENT != 0 {
            return Err(invalid);
        }
        match (
            NonZeroUsize::new(usize::from(width)),
            NonZeroUsize::new(usize::from(height)),
        ) {
            (Some(width), Some(height)) => Ok(Self { width, height }),
            _ => Err(invalid),
        }
    }

    #[must_use]
    pub fn width(&self) -> NonZeroUsize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> NonZeroUsize {
        self.height
    }

    /// Number of bytes in the luma plane of one image.
    #[must_use]
    pub fn luma_len(&self) -> usize {
        self.width.get() * self.height.get()
    }

    /// Number of bytes in one planar YUV 4:2:0 frame: the full-size luma plane
    /// followed by two quarter-size chroma planes.
    #[must_use]
    pub fn yuv420_frame_len(&self) -> usize {
        let chroma_width = self.width.get().div_ceil(2);
        let chroma_height = self.height.get().div_ceil(2);
        self.luma_len() + 2 * chroma_width * chroma_height
    }

    /// Number of `u32` values in one per-image record for the given axes.
    #[must_use]
    pub fn record_len(&self, axes: SumAxes) -> usize {
        let mut len = 0;
        if axes.contains(SumAxes::ROWS) {
            len += self.height.get();
        }
        if axes.contains(SumAxes::COLS) {
            len += self.width.get();
        }
        len
    }
}
