//! The deinterlace engine.

use std::path::Path;

use log::debug;

use crate::plugin::PluginManager;
use crate::sample::frame_len;
use crate::topology::{hawaii, parallel, quad, serial, sta1600, Algorithm};
use crate::{DeinterlaceError, DeinterlaceResult, Sample};

/// Reorders raw sensor frames of one sample width.
///
/// The engine keeps a scratch frame that only ever grows, and its own set
/// of plugins.  It is not meant to be shared between threads; use one
/// engine per thread instead.
///
/// # Examples
///
/// ```
/// use deinterlace::{Algorithm, Deinterlacer};
///
/// let mut engine = Deinterlacer::<u16>::new();
/// let mut frame = [0, 1, 2, 3, 4, 5, 6, 7];
///
/// engine.run(&mut frame, 4, 2, Algorithm::Parallel, &[]).unwrap();
/// assert_eq!(frame, [0, 2, 4, 6, 7, 5, 3, 1]);
/// ```
#[derive(Debug)]
pub struct Deinterlacer<T: Sample> {
    scratch: Vec<T>,
    columns: usize,
    rows: usize,
    grown: usize,
    plugins: PluginManager,
}

impl<T: Sample> Default for Deinterlacer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> Deinterlacer<T> {
    pub fn new() -> Self {
        Deinterlacer {
            scratch: Vec::new(),
            columns: 0,
            rows: 0,
            grown: 0,
            plugins: PluginManager::new(),
        }
    }

    /// Exclusive upper bound of sample values at this width.
    pub fn max_value(&self) -> u64 {
        T::MAX_VALUE
    }

    /// Scratch frame capacity, as `(columns, rows)`.
    ///
    /// Each value is the largest seen so far in that dimension, not
    /// necessarily from the same frame.
    pub fn capacity(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    pub fn plugins_mut(&mut self) -> &mut PluginManager {
        &mut self.plugins
    }

    /// Load the plugins found in `dir` into this engine.
    ///
    /// # Safety
    ///
    /// See [`PluginManager::find_plugins`].
    pub unsafe fn find_plugins(&mut self, dir: impl AsRef<Path>) -> DeinterlaceResult<bool> {
        self.plugins.find_plugins(dir)
    }

    /// Reorder `buf` in place using a built-in topology.
    ///
    /// `buf` must hold exactly `columns * rows` samples.  Only
    /// [`Algorithm::HawaiiRg`] reads `args`: exactly one value, the
    /// channel count.  Invalid geometry is reported before `buf` is
    /// touched.
    pub fn run(
        &mut self,
        buf: &mut [T],
        columns: usize,
        rows: usize,
        algorithm: Algorithm,
        args: &[u32],
    ) -> DeinterlaceResult<()> {
        check_len(buf, columns, rows)?;

        match algorithm {
            Algorithm::None => Ok(()),

            Algorithm::Parallel => {
                parallel::check(columns, rows)?;
                self.reorder(buf, columns, rows, |src, dst| parallel::run(src, dst))
            }

            Algorithm::Serial => {
                serial::check(columns, rows)?;
                self.reorder(buf, columns, rows, |src, dst| serial::run(src, dst, columns))
            }

            Algorithm::QuadCcd => {
                quad::check_ccd(columns, rows)?;
                self.reorder(buf, columns, rows, |src, dst| {
                    quad::run_ccd(src, dst, columns, rows)
                })
            }

            Algorithm::QuadIr => {
                quad::check_ir(columns, rows)?;
                self.reorder(buf, columns, rows, |src, dst| {
                    quad::run_ir(src, dst, columns, rows)
                })
            }

            Algorithm::QuadIrCds => {
                quad::check_ir_cds(columns, rows)?;
                self.reorder(buf, columns, rows, |src, dst| {
                    quad::run_ir_cds(src, dst, columns, rows)
                })
            }

            Algorithm::HawaiiRg => match hawaii::check(columns, rows, args)? {
                None => Ok(()),
                Some(channels) => self.reorder(buf, columns, rows, |src, dst| {
                    hawaii::run(src, dst, columns, channels)
                }),
            },

            Algorithm::Sta1600 => {
                sta1600::check(columns, rows)?;
                self.reorder(buf, columns, rows, |src, dst| {
                    sta1600::run(src, dst, columns, rows)
                })
            }

            Algorithm::Custom => Err(DeinterlaceError::UnsupportedAlgorithm(format!(
                "{} (use run_custom with an algorithm name)",
                algorithm
            ))),
        }
    }

    /// Reorder `buf` in place using a plugin algorithm.
    ///
    /// The first loaded plugin advertising `algorithm` runs it, receiving
    /// the first of `args` (or 0).
    pub fn run_custom(
        &mut self,
        buf: &mut [T],
        columns: usize,
        rows: usize,
        algorithm: &str,
        args: &[u32],
    ) -> DeinterlaceResult<()> {
        check_len(buf, columns, rows)?;

        let arg = args.first().copied().unwrap_or(0);
        self.plugins.run(buf, columns, rows, algorithm, arg)
    }

    /// Run a topology from `buf` into the scratch frame and copy it back.
    fn reorder<F>(&mut self, buf: &mut [T], columns: usize, rows: usize, f: F) -> DeinterlaceResult<()>
    where
        F: FnOnce(&[T], &mut [T]),
    {
        self.reserve(columns, rows)?;

        let n = buf.len();
        let scratch = &mut self.scratch[..n];
        f(&*buf, scratch);
        buf.copy_from_slice(scratch);
        Ok(())
    }

    /// Grow the scratch frame to hold `columns` x `rows`.
    ///
    /// Each stored dimension only grows, so the allocation never shrinks.
    fn reserve(&mut self, columns: usize, rows: usize) -> DeinterlaceResult<()> {
        if columns <= self.columns && rows <= self.rows {
            return Ok(());
        }

        let columns = columns.max(self.columns);
        let rows = rows.max(self.rows);
        let len = frame_len(columns, rows)?;

        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(len)
            .map_err(|_| DeinterlaceError::Allocation(len))?;
        scratch.resize(len, T::default());

        self.scratch = scratch;
        self.columns = columns;
        self.rows = rows;
        self.grown += 1;

        debug!(
            "{}-bit scratch frame grown to {}x{} (allocation #{})",
            T::BITS,
            columns,
            rows,
            self.grown
        );
        Ok(())
    }
}

fn check_len<T>(buf: &[T], columns: usize, rows: usize) -> DeinterlaceResult<()> {
    let len = frame_len(columns, rows)?;
    if buf.len() != len {
        return Err(DeinterlaceError::invalid(format!(
            "buffer holds {} samples, a {}x{} frame needs {}",
            buf.len(),
            columns,
            rows,
            len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Deinterlacer;
    use crate::plugin::testing::*;
    use crate::{Algorithm, DeinterlaceError, ErrorKind};

    fn ramp16(n: usize) -> Vec<u16> {
        (0..n as u16).collect()
    }

    #[test]
    fn test_parallel_property() {
        let mut engine = Deinterlacer::<u32>::new();

        for &(w, h) in [(1, 2), (3, 4), (5, 6), (8, 2)].iter() {
            let src: Vec<u32> = (0..(w * h) as u32).collect();
            let mut buf = src.clone();
            engine.run(&mut buf, w, h, Algorithm::Parallel, &[]).unwrap();

            let n = w * h;
            for i in 0..n / 2 {
                assert_eq!(buf[i], src[2 * i]);
                assert_eq!(buf[n - 1 - i], src[2 * i + 1]);
            }
        }
    }

    #[test]
    fn test_serial() {
        let mut engine = Deinterlacer::<u16>::new();
        let mut buf = [0u16, 1, 2, 3];
        engine.run(&mut buf, 4, 1, Algorithm::Serial, &[]).unwrap();
        assert_eq!(buf, [0, 2, 3, 1]);
    }

    #[test]
    fn test_validation_leaves_buffer() {
        let mut engine = Deinterlacer::<u16>::new();
        let cases: [(Algorithm, usize, usize, &[u32]); 9] = [
            (Algorithm::Parallel, 4, 3, &[]),
            (Algorithm::Serial, 3, 4, &[]),
            (Algorithm::QuadCcd, 4, 3, &[]),
            (Algorithm::QuadIr, 3, 4, &[]),
            (Algorithm::QuadIrCds, 4, 2, &[]),
            (Algorithm::HawaiiRg, 4, 3, &[]),
            (Algorithm::HawaiiRg, 4, 3, &[3]),
            (Algorithm::Sta1600, 8, 2, &[]),
            (Algorithm::Sta1600, 16, 3, &[]),
        ];

        for &(algorithm, w, h, args) in cases.iter() {
            let src = ramp16(w * h);
            let mut buf = src.clone();
            let err = engine.run(&mut buf, w, h, algorithm, args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{}", algorithm);
            assert_eq!(buf, src);
        }
        assert_eq!(engine.capacity(), (0, 0));
    }

    #[test]
    fn test_wrong_buffer_len() {
        let mut engine = Deinterlacer::<u16>::new();
        let mut buf = [0u16; 7];
        let err = engine.run(&mut buf, 4, 2, Algorithm::None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_none_and_single_channel_hawaii() {
        let mut engine = Deinterlacer::<u16>::new();
        let src = ramp16(12);

        let mut buf = src.clone();
        engine.run(&mut buf, 4, 3, Algorithm::None, &[]).unwrap();
        assert_eq!(buf, src);

        engine.run(&mut buf, 4, 3, Algorithm::HawaiiRg, &[1]).unwrap();
        assert_eq!(buf, src);
        assert_eq!(engine.capacity(), (0, 0));
    }

    #[test]
    fn test_hawaii() {
        let mut engine = Deinterlacer::<u32>::new();
        let mut buf = [0u32, 1, 2, 3, 4, 5, 6, 7];
        engine.run(&mut buf, 4, 2, Algorithm::HawaiiRg, &[2]).unwrap();
        assert_eq!(buf, [0, 2, 1, 3, 4, 6, 5, 7]);
    }

    #[test]
    fn test_custom_enum_rejected() {
        let mut engine = Deinterlacer::<u16>::new();
        let mut buf = [0u16; 4];
        let res = engine.run(&mut buf, 2, 2, Algorithm::Custom, &[]);
        assert!(matches!(res, Err(DeinterlaceError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_scratch_growth() {
        let mut engine = Deinterlacer::<u16>::new();

        let mut buf = ramp16(16);
        engine.run(&mut buf, 4, 4, Algorithm::QuadCcd, &[]).unwrap();
        assert_eq!(engine.grown, 1);
        assert_eq!(engine.scratch.len(), 16);

        let mut buf = ramp16(4);
        engine.run(&mut buf, 2, 2, Algorithm::QuadCcd, &[]).unwrap();
        assert_eq!(engine.grown, 1);
        assert_eq!(engine.capacity(), (4, 4));

        let mut buf = ramp16(64);
        engine.run(&mut buf, 8, 8, Algorithm::QuadCcd, &[]).unwrap();
        assert_eq!(engine.grown, 2);
        assert_eq!(engine.scratch.len(), 64);
        assert_eq!(engine.capacity(), (8, 8));
    }

    #[test]
    fn test_scratch_never_shrinks() {
        let mut engine = Deinterlacer::<u16>::new();

        let mut buf = ramp16(64);
        engine.run(&mut buf, 8, 8, Algorithm::Parallel, &[]).unwrap();

        let mut buf = ramp16(32);
        engine.run(&mut buf, 16, 2, Algorithm::Parallel, &[]).unwrap();
        assert_eq!(engine.capacity(), (16, 8));
        assert_eq!(engine.scratch.len(), 128);
    }

    #[test]
    fn test_reuse_gives_same_result() {
        let mut engine = Deinterlacer::<u16>::new();
        let mut big = ramp16(64);
        engine.run(&mut big, 8, 8, Algorithm::QuadIr, &[]).unwrap();

        let mut reused = ramp16(16);
        engine.run(&mut reused, 4, 4, Algorithm::QuadIr, &[]).unwrap();

        let mut fresh = ramp16(16);
        Deinterlacer::<u16>::new()
            .run(&mut fresh, 4, 4, Algorithm::QuadIr, &[])
            .unwrap();
        assert_eq!(reused, fresh);
    }

    #[test]
    fn test_max_value() {
        assert_eq!(Deinterlacer::<u16>::new().max_value(), 1 << 16);
        assert_eq!(Deinterlacer::<u32>::new().max_value(), 1 << 20);
    }

    #[test]
    fn test_run_custom() {
        let mut engine = Deinterlacer::<u16>::new();
        let mut buf = [1u16, 2, 3, 4];

        let res = engine.run_custom(&mut buf, 2, 2, "REVERSE", &[]);
        assert!(matches!(res, Err(DeinterlaceError::NoPluginsLoaded)));

        unsafe { engine.plugins_mut().register(reverse_create, reverse_destroy) };
        engine.run_custom(&mut buf, 2, 2, "REVERSE", &[]).unwrap();
        assert_eq!(buf, [4, 3, 2, 1]);

        engine.run_custom(&mut buf, 2, 2, "OFFSET", &[5, 9]).unwrap();
        assert_eq!(buf, [9, 8, 7, 6]);

        match engine.run_custom(&mut buf, 2, 2, "QUAD_CCD", &[]) {
            Err(err @ DeinterlaceError::AlgorithmNotFound(_)) => {
                assert_eq!(err.kind(), ErrorKind::Unsupported);
                assert!(err.to_string().contains("QUAD_CCD"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_plugins_per_instance() {
        let mut a = Deinterlacer::<u16>::new();
        let b = Deinterlacer::<u16>::new();

        unsafe { a.plugins_mut().register(reverse_create, reverse_destroy) };
        assert_eq!(a.plugins().count(), 1);
        assert_eq!(b.plugins().count(), 0);
    }
}
