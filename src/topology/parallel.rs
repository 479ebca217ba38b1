//! Two channels converging from opposite ends of the frame.
//!
//! ```text
//!   src: a0 b0 a1 b1 a2 b2 ... an bn
//!   dst: a0 a1 a2 ... an | bn ... b2 b1 b0
//! ```

use crate::topology::{require_even, Algorithm};
use crate::DeinterlaceResult;

pub fn check(_columns: usize, rows: usize) -> DeinterlaceResult<()> {
    require_even(Algorithm::Parallel, "rows", rows)
}

pub fn run<T: Copy>(src: &[T], dst: &mut [T]) {
    let n = src.len();
    for (i, pair) in src.chunks_exact(2).enumerate() {
        dst[i] = pair[0];
        dst[n - 1 - i] = pair[1];
    }
}
