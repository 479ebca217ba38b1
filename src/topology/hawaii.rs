//! Teledyne HAWAII-RG readout.
//!
//! Each of the N channels owns a vertical stripe of `columns / N` pixels
//! and reads it left to right.  The controller interleaves the channels
//! round-robin, so every row arrives as
//!
//! ```text
//!   c0[0] c1[0] ... cN[0]  c0[1] c1[1] ... cN[1]  ...
//! ```

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::topology::{require_even, require_multiple, Algorithm};
use crate::{DeinterlaceError, DeinterlaceResult, Sample};

/// Validate the geometry and extract the channel count.
///
/// Returns `None` for a single-channel readout, which needs no
/// reordering.
pub fn check(columns: usize, _rows: usize, args: &[u32]) -> DeinterlaceResult<Option<usize>> {
    let channels = match args {
        [channels] => *channels as usize,
        _ => {
            return Err(DeinterlaceError::invalid(format!(
                "{} takes exactly one argument (the channel count), got {}",
                Algorithm::HawaiiRg,
                args.len()
            )))
        }
    };

    require_even(Algorithm::HawaiiRg, "columns", columns)?;

    if channels == 1 {
        return Ok(None);
    }
    if channels == 0 || channels % 2 != 0 {
        return Err(DeinterlaceError::invalid(format!(
            "{} channel count must be even and greater than zero, got {}",
            Algorithm::HawaiiRg,
            channels
        )));
    }
    require_multiple(Algorithm::HawaiiRg, "columns", columns, channels)?;

    Ok(Some(channels))
}

fn hawaii_row<T: Copy>(src: &[T], dst: &mut [T], channels: usize) {
    let stripe = dst.len() / channels;
    for (c, group) in src.chunks_exact(channels).enumerate() {
        for (ch, &v) in group.iter().enumerate() {
            dst[ch * stripe + c] = v;
        }
    }
}

#[cfg(feature = "rayon")]
pub fn run<T: Sample>(src: &[T], dst: &mut [T], columns: usize, channels: usize) {
    dst.par_chunks_mut(columns)
        .zip(src.par_chunks(columns))
        .for_each(|(row, raw)| hawaii_row(raw, row, channels));
}

#[cfg(not(feature = "rayon"))]
pub fn run<T: Sample>(src: &[T], dst: &mut [T], columns: usize, channels: usize) {
    for (row, raw) in dst.chunks_mut(columns).zip(src.chunks(columns)) {
        hawaii_row(raw, row, channels);
    }
}

#[cfg(test)]
mod tests {
    use super::{check, run};
    use crate::ErrorKind;

    #[test]
    fn test_two_channels() {
        let src = [0u16, 1, 2, 3];
        let mut dst = [0u16; 4];

        assert_eq!(check(4, 1, &[2]).unwrap(), Some(2));
        run(&src, &mut dst, 4, 2);
        assert_eq!(dst, [0, 2, 1, 3]);
    }

    #[test]
    fn test_four_channels() {
        let src = [
            0u32, 1, 2, 3, 4, 5, 6, 7,
            8, 9, 10, 11, 12, 13, 14, 15 ];

        let expected = [
            0u32, 4, 1, 5, 2, 6, 3, 7,
            8, 12, 9, 13, 10, 14, 11, 15 ];

        let mut dst = [0u32; 16];
        run(&src, &mut dst, 8, 4);
        assert_eq!(dst, expected);
    }

    #[test]
    fn test_single_channel() {
        assert_eq!(check(6, 3, &[1]).unwrap(), None);
    }

    #[test]
    fn test_bad_args() {
        let err = |res: Result<_, crate::DeinterlaceError>| res.unwrap_err().kind();

        assert_eq!(err(check(8, 2, &[])), ErrorKind::InvalidArgument);
        assert_eq!(err(check(8, 2, &[2, 2])), ErrorKind::InvalidArgument);
        assert_eq!(err(check(8, 2, &[0])), ErrorKind::InvalidArgument);
        assert_eq!(err(check(8, 2, &[3])), ErrorKind::InvalidArgument);
        assert_eq!(err(check(7, 2, &[2])), ErrorKind::InvalidArgument);
        assert_eq!(err(check(10, 2, &[4])), ErrorKind::InvalidArgument);
    }
}
