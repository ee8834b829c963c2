#![allow(clippy::unwrap_used, reason = "allow in test files")]
#![allow(clippy::undocumented_unsafe_blocks, reason = "allow in test files")]

use std::num::NonZeroUsize;

use pastey::paste;
use quickcheck::{Arbitrary, Gen, TestResult};
use quickcheck_macros::quickcheck;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro128StarStar;

use super::project_luma;

fn naive_projection(src: &[u8], width: usize, height: usize) -> (Vec<u32>, Vec<u32>) {
    let mut rows = vec![0u32; height];
    let mut cols = vec![0u32; width];
    for r in 0..height {
        for c in 0..width {
            let v = u32::from(src[r * width + c]);
            rows[r] += v;
            cols[c] += v;
        }
    }
    (rows, cols)
}

fn random_plane(width: usize, height: usize) -> Vec<u8> {
    let mut rng = Xoshiro128StarStar::from_seed(*b"deadbeeflolcakes");
    let mut src = vec![0u8; width * height];
    for p in src.iter_mut() {
        *p = rng.random();
    }
    src
}

#[derive(Debug, Clone)]
struct Plane {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Arbitrary for Plane {
    fn arbitrary(g: &mut Gen) -> Self {
        let width = 32 * (usize::arbitrary(g) % 4 + 1);
        let height = usize::arbitrary(g) % 16 + 1;
        let data = (0..width * height).map(|_| u8::arbitrary(g)).collect();
        Self {
            width,
            height,
            data,
        }
    }
}

#[quickcheck]
fn projection_matches_definition(plane: Plane) -> TestResult {
    let width = NonZeroUsize::new(plane.width).unwrap();
    let height = NonZeroUsize::new(plane.height).unwrap();
    let mut rows = vec![u32::MAX; plane.height];
    let mut cols = vec![u32::MAX; plane.width];

    project_luma(&plane.data, width, height, Some(&mut rows), Some(&mut cols));

    let (expected_rows, expected_cols) = naive_projection(&plane.data, plane.width, plane.height);
    TestResult::from_bool(rows == expected_rows && cols == expected_cols)
}

#[test]
fn projection_without_outputs_is_a_no_op() {
    let src = vec![7u8; 64];
    project_luma(
        &src,
        NonZeroUsize::new(32).unwrap(),
        NonZeroUsize::new(2).unwrap(),
        None,
        None,
    );
}

#[test]
#[should_panic]
fn projection_short_buffer_panics() {
    let src = vec![0u8; 63];
    let mut rows = vec![0u32; 2];
    project_luma(
        &src,
        NonZeroUsize::new(32).unwrap(),
        NonZeroUsize::new(2).unwrap(),
        Some(&mut rows),
        None,
    );
}

#[test]
#[should_panic]
fn projection_short_output_panics() {
    let src = vec![0u8; 64];
    let mut cols = vec![0u32; 31];
    project_luma(
        &src,
        NonZeroUsize::new(32).unwrap(),
        NonZeroUsize::new(2).unwrap(),
        None,
        Some(&mut cols),
    );
}

fn available(module: &str) -> bool {
    match module {
        #[cfg(target_arch = "x86_64")]
        "avx2" => crate::util::has_avx2(),
        "rust" => true,
        _ => false,
    }
}

macro_rules! create_tests {
    ($module:ident) => {
        paste! {
            #[test]
            fn [<test_projection_zeros_ $module>]() {
                if !available(stringify!($module)) {
                    return;
                }
                let src = vec![0u8; 64];
                let mut rows = vec![0u32; 2];
                let mut cols = vec![0u32; 32];

                unsafe {
                    super::$module::project_luma(
                        &src,
                        NonZeroUsize::new(32).unwrap(),
                        NonZeroUsize::new(2).unwrap(),
                        Some(&mut rows),
                        Some(&mut cols),
                    );
                }

                assert_eq!(rows, [0, 0]);
                assert_eq!(cols, [0; 32]);
            }

            #[test]
            fn [<test_projection_ones_ $module>]() {
                if !available(stringify!($module)) {
                    return;
                }
                let src = vec![1u8; 64];
                let mut rows = vec![0u32; 2];
                let mut cols = vec![0u32; 32];

                unsafe {
                    super::$module::project_luma(
                        &src,
                        NonZeroUsize::new(32).unwrap(),
                        NonZeroUsize::new(2).unwrap(),
                        Some(&mut rows),
                        Some(&mut cols),
                    );
                }

                // Each row holds 32 ones; each column spans two rows
                assert_eq!(rows, [32, 32]);
                assert_eq!(cols, [2; 32]);
            }

            #[test]
            fn [<test_projection_sequential_ $module>]() {
                if !available(stringify!($module)) {
                    return;
                }
                // Row r, column c holds r * 64 + c, wrapped to u8
                let (w, h) = (64, 4);
                let src: Vec<u8> = (0..w * h).map(|i| (i % 256) as u8).collect();
                let mut rows = vec![0u32; h];
                let mut cols = vec![0u32; w];

                unsafe {
                    super::$module::project_luma(
                        &src,
                        NonZeroUsize::new(w).unwrap(),
                        NonZeroUsize::new(h).unwrap(),
                        Some(&mut rows),
                        Some(&mut cols),
                    );
                }

                let (expected_rows, expected_cols) = naive_projection(&src, w, h);
                assert_eq!(rows, expected_rows);
                assert_eq!(cols, expected_cols);
            }

            #[test]
            fn [<test_projection_max_values_ $module>]() {
                if !available(stringify!($module)) {
                    return;
                }
                let (w, h) = (1024, 512);
                let src = vec![255u8; w * h];
                let mut rows = vec![0u32; h];
                let mut cols = vec![0u32; w];

                unsafe {
                    super::$module::project_luma(
                        &src,
                        NonZeroUsize::new(w).unwrap(),
                        NonZeroUsize::new(h).unwrap(),
                        Some(&mut rows),
                        Some(&mut cols),
                    );
                }

                assert!(rows.iter().all(|&r| r == 255 * w as u32));
                assert!(cols.iter().all(|&c| c == 255 * h as u32));
            }

            #[test]
            fn [<test_projection_rows_only_ $module>]() {
                if !available(stringify!($module)) {
                    return;
                }
                let (w, h) = (96, 7);
                let src = random_plane(w, h);
                let mut rows = vec![0u32; h];

                unsafe {
                    super::$module::project_luma(
                        &src,
                        NonZeroUsize::new(w).unwrap(),
                        NonZeroUsize::new(h).unwrap(),
                        Some(&mut rows),
                        None,
                    );
                }

                assert_eq!(rows, naive_projection(&src, w, h).0);
            }

            #[test]
            fn [<test_projection_cols_only_ $module>]() {
                if !available(stringify!($module)) {
                    return;
                }
                let (w, h) = (96, 7);
                let src = random_plane(w, h);
                let mut cols = vec![0u32; w];

                unsafe {
                    super::$module::project_luma(
                        &src,
                        NonZeroUsize::new(w).unwrap(),
                        NonZeroUsize::new(h).unwrap(),
                        None,
                        Some(&mut cols),
                    );
                }

                assert_eq!(cols, naive_projection(&src, w, h).1);
            }

            #[test]
            fn [<test_projection_ignores_trailing_bytes_ $module>]() {
                if !available(stringify!($module)) {
                    return;
                }
                // Chroma left after the luma plane must not be read
                let mut src = vec![3u8; 32 * 3];
                src.extend(vec![250u8; 48]);
                let mut rows = vec![0u32; 3];
                let mut cols = vec![0u32; 32];

                unsafe {
                    super::$module::project_luma(
                        &src,
                        NonZeroUsize::new(32).unwrap(),
                        NonZeroUsize::new(3).unwrap(),
                        Some(&mut rows),
                        Some(&mut cols),
                    );
                }

                assert_eq!(rows, [96, 96, 96]);
                assert_eq!(cols, [9; 32]);
            }
        }
    };
}

create_tests!(rust);

#[cfg(target_arch = "x86_64")]
create_tests!(avx2);
