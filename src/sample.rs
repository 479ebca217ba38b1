//! Pixel sample definitions.

use std::fmt::Debug;
use std::io::Read;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::plugin::SampleBufMut;
use crate::{DeinterlaceError, DeinterlaceResult};

/// Byte order of a raw frame as delivered by the controller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SampleOrder {
    BigEndian,
    LittleEndian,
}

/// Unsigned integer pixel sample supported by the engine.
///
/// Implemented for [`u16`] and [`u32`] only.
pub trait Sample: Copy + Default + Debug + PartialEq + Send + Sync + 'static {
    /// Bits per sample, as passed to plugins.
    const BITS: u32;

    /// Exclusive upper bound of the values a sensor produces at this width.
    ///
    /// 32-bit frames come from 20-bit converters, so the bound is 2^20
    /// rather than 2^32.
    const MAX_VALUE: u64;

    /// Fill `dst` from `r`, interpreting the bytes with the given order.
    fn read_into(r: &mut dyn Read, order: SampleOrder, dst: &mut [Self]) -> DeinterlaceResult<()>;

    /// Wrap a typed buffer for hand-off to a plugin.
    fn buf_mut(buf: &mut [Self]) -> SampleBufMut<'_>;
}

impl Sample for u16 {
    const BITS: u32 = 16;
    const MAX_VALUE: u64 = 1 << 16;

    fn read_into(r: &mut dyn Read, order: SampleOrder, dst: &mut [u16]) -> DeinterlaceResult<()> {
        match order {
            SampleOrder::BigEndian => r.read_u16_into::<BigEndian>(dst)?,
            SampleOrder::LittleEndian => r.read_u16_into::<LittleEndian>(dst)?,
        }
        Ok(())
    }

    fn buf_mut(buf: &mut [u16]) -> SampleBufMut<'_> {
        SampleBufMut::U16(buf)
    }
}

impl Sample for u32 {
    const BITS: u32 = 32;
    const MAX_VALUE: u64 = 1 << 20;

    fn read_into(r: &mut dyn Read, order: SampleOrder, dst: &mut [u32]) -> DeinterlaceResult<()> {
        match order {
            SampleOrder::BigEndian => r.read_u32_into::<BigEndian>(dst)?,
            SampleOrder::LittleEndian => r.read_u32_into::<LittleEndian>(dst)?,
        }
        Ok(())
    }

    fn buf_mut(buf: &mut [u32]) -> SampleBufMut<'_> {
        SampleBufMut::U32(buf)
    }
}

/// Number of samples in a `columns` x `rows` frame.
///
/// Fails on zero dimensions and on overflow.
pub fn frame_len(columns: usize, rows: usize) -> DeinterlaceResult<usize> {
    if columns == 0 || rows == 0 {
        return Err(DeinterlaceError::invalid(format!(
            "frame dimensions must be non-zero, got {}x{}",
            columns, rows
        )));
    }

    columns.checked_mul(rows).ok_or_else(|| {
        DeinterlaceError::invalid(format!("frame dimensions {}x{} overflow", columns, rows))
    })
}

/// Read a complete raw frame.
pub fn read_frame<T: Sample>(
    r: &mut dyn Read,
    order: SampleOrder,
    columns: usize,
    rows: usize,
) -> DeinterlaceResult<Vec<T>> {
    let mut buf = vec![T::default(); frame_len(columns, rows)?];
    T::read_into(r, order, &mut buf)?;
    Ok(buf)
}

/// Read a complete raw frame into an existing buffer of `columns * rows` samples.
pub fn read_frame_into<T: Sample>(
    r: &mut dyn Read,
    order: SampleOrder,
    columns: usize,
    rows: usize,
    dst: &mut [T],
) -> DeinterlaceResult<()> {
    let len = frame_len(columns, rows)?;
    if dst.len() != len {
        return Err(DeinterlaceError::invalid(format!(
            "buffer holds {} samples, frame needs {}",
            dst.len(),
            len
        )));
    }

    T::read_into(r, order, dst)
}
