use std::num::NonZeroUsize;

pub(super) fn project_luma(
    src: &[u8],
    width: NonZeroUsize,
    height: NonZeroUsize,
    mut row_sums: Option<&mut [u32]>,
    mut col_sums: Option<&mut [u32]>,
) {
    let width = width.get();
    let height = height.get();

    for (y, src_row) in src.chunks_exact(width).take(height).enumerate() {
        let row_total = match col_sums.as_deref_mut() {
            Some(cols) => {
                let mut row_total = 0u32;
                for (col, &pix) in cols.iter_mut().zip(src_row) {
                    let pix = u32::from(pix);
                    *col += pix;
                    row_total += pix;
                }
                row_total
            }
            None => src_row.iter().map(|&pix| u32::from(pix)).sum(),
        };

        if let Some(rows) = row_sums.as_deref_mut() {
            rows[y] += row_total;
        }
    }
}
