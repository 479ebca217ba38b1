//! Two channels per row, reading from the two ends of the row and
//! meeting in the middle.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::topology::{require_even, Algorithm};
use crate::{DeinterlaceResult, Sample};

/// Rows are independent, so only the column count is constrained.
pub fn check(columns: usize, _rows: usize) -> DeinterlaceResult<()> {
    require_even(Algorithm::Serial, "columns", columns)
}

fn serial_row<T: Copy>(src: &[T], dst: &mut [T]) {
    let w = dst.len();
    for (k, pair) in src.chunks_exact(2).enumerate() {
        dst[k] = pair[0];
        dst[w - 1 - k] = pair[1];
    }
}

#[cfg(feature = "rayon")]
pub fn run<T: Sample>(src: &[T], dst: &mut [T], columns: usize) {
    dst.par_chunks_mut(columns)
        .zip(src.par_chunks(columns))
        .for_each(|(row, raw)| serial_row(raw, row));
}

#[cfg(not(feature = "rayon"))]
pub fn run<T: Sample>(src: &[T], dst: &mut [T], columns: usize) {
    for (row, raw) in dst.chunks_mut(columns).zip(src.chunks(columns)) {
        serial_row(raw, row);
    }
}
