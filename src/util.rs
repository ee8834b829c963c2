
mod plane;

pub use plane::{luma_plane, split_yuv420_frames};

#[cfg(target_arch = "x86_64")]
cpufeatures::new!(cpuid_avx2, "avx2");

#[cfg(target_arch = "x86_64")]
pub use cpuid_avx2::get as has_avx2;

/// Adds `to_add` into `target` element by element.
///
/// Long batches can overflow the `u32` accumulators; this wraps rather than
/// widening, and callers are expected to bound their batch sizes.
pub fn add_assign_u32(target: &mut [u32], to_add: &[u32]) {
    debug_assert_eq!(target.len(), to_add.len());
    for (t, &a) in target.iter_mut().zip(to_add) {
        *t = t.wrapping_add(a);
    }
}

/// Subtracts `to_sub` from `target` element by element, clamping at zero.
pub fn saturating_sub_assign_u32(target: &mut [u32], to_sub: &[u32]) {
    debug_assert_eq!(target.len(), to_sub.len());
    for (t, &s) in target.iter_mut().zip(to_sub) {
        *t = t.saturating_sub(s);
    }
}

/// Writes `total / count` into `dest` element by element, truncating.
///
/// # Panics
/// Panics if `count` is zero.
pub fn average_u32(dest: &mut [u32], totals: &[u32], count: u32) {
    debug_assert_eq!(dest.len(), totals.len());
    for (d, &t) in dest.iter_mut().zip(totals) {
        *d = t / count;
    }
}
