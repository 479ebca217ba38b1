//! Four-channel readouts, one amplifier per image quadrant.
//!
//! Raw samples arrive in groups of four, one per amplifier.  With `k`
//! the position of the group within its row pair (`0 .. columns / 2`):
//!
//! ```text
//!   QUAD_CCD, row pair (j, rows - 1 - j), j counting up from the bottom edge:
//!
//!     top:    [3] k ->            <- k [2]
//!     bottom: [0] k ->            <- k [1]
//!
//!   QUAD_IR, row pair (rows/2 - 1 - p, rows/2 + p), p counting out from
//!   the vertical centre:
//!
//!     upper:  [3] k ->            <- k [2]
//!     ----------------- centre ----------------
//!     lower:  [0] k ->            <- k [1]
//! ```
//!
//! QUAD_IR_CDS is a QUAD_IR readout of two stacked sub-frames: the reset
//! frame in the lower half of the buffer, the signal frame in the upper.
//! Each half must itself have an even row count, so the frame height must
//! be a multiple of 4.

use crate::topology::{require_even, Algorithm};
use crate::DeinterlaceResult;

/// Scatter one group of four into a row pair.
///
/// `first` receives samples 0 and 1, `second` samples 3 and 2.
macro_rules! scatter_quad {
    ($dst:ident, $quad:ident, $first:expr, $second:expr, $k:expr, $w:expr) => {{
        $dst[$first + $k] = $quad[0];
        $dst[$first + $w - 1 - $k] = $quad[1];
        $dst[$second + $w - 1 - $k] = $quad[2];
        $dst[$second + $k] = $quad[3];
    }};
}

pub fn check_ccd(columns: usize, rows: usize) -> DeinterlaceResult<()> {
    require_even(Algorithm::QuadCcd, "columns", columns)?;
    require_even(Algorithm::QuadCcd, "rows", rows)
}

pub fn check_ir(columns: usize, rows: usize) -> DeinterlaceResult<()> {
    require_even(Algorithm::QuadIr, "columns", columns)?;
    require_even(Algorithm::QuadIr, "rows", rows)
}

/// Both halves must be valid QUAD_IR frames in their own right.
pub fn check_ir_cds(columns: usize, rows: usize) -> DeinterlaceResult<()> {
    require_even(Algorithm::QuadIrCds, "columns", columns)?;
    require_even(Algorithm::QuadIrCds, "rows", rows)?;
    require_even(Algorithm::QuadIrCds, "rows per sub-frame", rows / 2)
}

pub fn run_ccd<T: Copy>(src: &[T], dst: &mut [T], columns: usize, rows: usize) {
    let half = columns / 2;

    for (g, quad) in src.chunks_exact(4).enumerate() {
        let (j, k) = (g / half, g % half);
        let bottom = j * columns;
        let top = (rows - 1 - j) * columns;

        scatter_quad!(dst, quad, bottom, top, k, columns);
    }
}

pub fn run_ir<T: Copy>(src: &[T], dst: &mut [T], columns: usize, rows: usize) {
    let half = columns / 2;
    let centre = rows / 2;

    for (g, quad) in src.chunks_exact(4).enumerate() {
        let (p, k) = (g / half, g % half);
        let lower = (centre - 1 - p) * columns;
        let upper = (centre + p) * columns;

        scatter_quad!(dst, quad, lower, upper, k, columns);
    }
}

pub fn run_ir_cds<T: Copy>(src: &[T], dst: &mut [T], columns: usize, rows: usize) {
    let split = src.len() / 2;
    let (src_lo, src_hi) = src.split_at(split);
    let (dst_lo, dst_hi) = dst.split_at_mut(split);

    run_ir(src_lo, dst_lo, columns, rows / 2);
    run_ir(src_hi, dst_hi, columns, rows / 2);
}
