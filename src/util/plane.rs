use crate::{error::Error, params::Geometry};

/// Gets the luma plane of a planar frame.
///
/// Planar YUV layouts store the full-resolution luma plane first, so the plane
/// is the leading `width * height` bytes. Anything after it is chroma and is
/// never read.
pub fn luma_plane<'a>(frame: &'a [u8], geometry: &Geometry) -> Result<&'a [u8], Error> {
    let expected = geometry.luma_len();
    frame.get(..expected).ok_or(Error::LumaLength {
        expected,
        actual: frame.len(),
    })
}

/// Splits a raw stream of back-to-back YUV 4:2:0 frames into their luma planes.
///
/// A trailing partial frame is not yielded.
pub fn split_yuv420_frames<'a>(
    stream: &'a [u8],
    geometry: &Geometry,
) -> impl Iterator<Item = &'a [u8]> + use<'a> {
    let luma_len = geometry.luma_len();
    stream
        .chunks_exact(geometry.yuv420_frame_len())
        .map(move |frame| &frame[..luma_len])
}
