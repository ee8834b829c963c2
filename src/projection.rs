#[cfg(target_arch = "x86_64")]
mod avx2;
mod rust;

#[cfg(test)]
mod tests;

use cfg_if::cfg_if;
use std::num::NonZeroUsize;

/// Computes the row and column projections of an 8-bit luma plane.
///
/// Walks the plane once in row-major order. `row_sums[r]` receives the sum of
/// every sample in row `r` and `col_sums[c]` the sum of every sample in column
/// `c`. Either output may be omitted, in which case that projection is skipped.
/// Both outputs are zeroed before the scan, so they never carry values from a
/// previous image.
///
/// The plane must be tightly packed (no row padding). Widths are expected to be
/// a multiple of 32 so that every row splits evenly into 256-bit vectors.
///
/// # Parameters
/// - `src`: Luma samples, at least `width * height` bytes
/// - `width`: Width of the image in pixels
/// - `height`: Height of the image in pixels
/// - `row_sums`: Optional output of length `height`
/// - `col_sums`: Optional output of length `width`
///
/// # Panics
/// Panics if `src` or either output is shorter than the geometry requires.
pub fn project_luma(
    src: &[u8],
    width: NonZeroUsize,
    height: NonZeroUsize,
    mut row_sums: Option<&mut [u32]>,
    mut col_sums: Option<&mut [u32]>,
) {
    assert!(src.len() >= width.get() * height.get());
    if let Some(rows) = row_sums.as_deref_mut() {
        assert!(rows.len() >= height.get());
        rows.fill(0);
    }
    if let Some(cols) = col_sums.as_deref_mut() {
        assert!(cols.len() >= width.get());
        cols.fill(0);
    }

    cfg_if! {
        if #[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))] {
            if crate::util::has_avx2() && width.get() % 32 == 0 {
                // SAFETY: We check for AVX2 first
                unsafe {
                    avx2::project_luma(src, width, height, row_sums, col_sums);
                }
                return;
            }
        }
    }

    rust::project_luma(src, width, height, row_sums, col_sums);
}
