//! Semiconductor Technology Associates STA1600 readout.
//!
//! Sixteen amplifiers in two ranks of eight.  The bottom rank reads rows
//! upward from the bottom edge and the top rank reads rows downward from
//! the top edge, each amplifier owning a stripe of `columns / 8` pixels.
//! Every group of sixteen raw samples is one column position in all
//! stripes of a mirrored row pair:
//!
//! ```text
//!   b7 b6 b5 b4 b3 b2 b1 b0  t7 t6 t5 t4 t3 t2 t1 t0
//! ```
//!
//! where `bN`/`tN` is stripe `N` of the bottom/top row.

use crate::topology::{require_multiple, Algorithm};
use crate::DeinterlaceResult;

const STRIPES: usize = 8;

pub fn check(columns: usize, rows: usize) -> DeinterlaceResult<()> {
    require_multiple(Algorithm::Sta1600, "columns", columns, 2 * STRIPES)?;
    require_multiple(Algorithm::Sta1600, "rows", rows, 2)
}

pub fn run<T: Copy>(src: &[T], dst: &mut [T], columns: usize, rows: usize) {
    let stripe = columns / STRIPES;

    for (g, group) in src.chunks_exact(2 * STRIPES).enumerate() {
        let (r, c) = (g / stripe, g % stripe);
        let bottom = r * columns;
        let top = (rows - 1 - r) * columns;
        let (lower, upper) = group.split_at(STRIPES);

        for s in 0..STRIPES {
            let x = (STRIPES - 1 - s) * stripe + c;
            dst[bottom + x] = lower[s];
            dst[top + x] = upper[s];
        }
    }
}
