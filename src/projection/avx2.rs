#![allow(clippy::undocumented_unsafe_blocks)]

use std::{arch::x86_64::*, num::NonZeroUsize};

/// Computes the row and column projections of an 8-bit luma plane.
///
/// Each row is consumed 32 pixels at a time. Row totals come from
/// `_mm256_sad_epu8` against zero, which leaves four 64-bit partial sums per
/// vector. Column totals widen each 8-pixel quarter of the vector to `u32`
/// and add it straight into the output.
///
/// `width` must be a multiple of 32 and the outputs must already be zeroed.
#[target_feature(enable = "avx2")]
pub fn project_luma(
    src: &[u8],
    width: NonZeroUsize,
    height: NonZeroUsize,
    row_sums: Option<&mut [u32]>,
    col_sums: Option<&mut [u32]>,
) {
    let width = width.get();
    let height = height.get();

    // Check the array bounds once at the start of the loop.
    assert!(width % 32 == 0);
    assert!(src.len() >= width * height);
    let rows = row_sums.map(|rows| {
        assert!(rows.len() >= height);
        rows.as_mut_ptr()
    });
    let cols = col_sums.map(|cols| {
        assert!(cols.len() >= width);
        cols.as_mut_ptr()
    });

    unsafe {
        project_luma_u8(src.as_ptr(), width, height, rows, cols);
    }
}

#[target_feature(enable = "avx2")]
unsafe fn project_luma_u8(
    src: *const u8,
    width: usize,
    height: usize,
    rows: Option<*mut u32>,
    cols: Option<*mut u32>,
) {
    let zero = _mm256_setzero_si256();

    for y in 0..height {
        let src_row = src.add(y * width);
        let mut row_acc = zero;

        let mut x = 0;
        while x < width {
            let pixels = _mm256_loadu_si256(src_row.add(x) as *const __m256i);

            if rows.is_some() {
                row_acc = _mm256_add_epi64(row_acc, _mm256_sad_epu8(pixels, zero));
            }

            if let Some(cols) = cols {
                let lo = _mm256_castsi256_si128(pixels);
                let hi = _mm256_extracti128_si256(pixels, 1);
                let quarters = [lo, _mm_srli_si128(lo, 8), hi, _mm_srli_si128(hi, 8)];
                for (i, quarter) in quarters.into_iter().enumerate() {
                    let acc = cols.add(x + i * 8) as *mut __m256i;
                    let widened = _mm256_cvtepu8_epi32(quarter);
                    _mm256_storeu_si256(acc, _mm256_add_epi32(_mm256_loadu_si256(acc), widened));
                }
            }

            x += 32;
        }

        if let Some(rows) = rows {
            let mut lanes = [0u64; 4];
            _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, row_acc);
            *rows.add(y) += lanes.iter().sum::<u64>() as u32;
        }
    }
}
