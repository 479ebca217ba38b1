//! Deinterlace plugin that mirrors and rotates frames.
//!
//! Build as a `cdylib` and drop the library into a plugin directory:
//!
//! ```text
//!   FLIP_HORIZONTAL  mirror every row
//!   FLIP_VERTICAL    swap rows top to bottom
//!   ROTATE_180       both of the above
//! ```

use std::sync::OnceLock;

use deinterlace::plugin::{DeinterlacePlugin, NameList, SampleBufMut};
use deinterlace::{DeinterlaceError, DeinterlaceResult};

const FLIP_HORIZONTAL: &str = "FLIP_HORIZONTAL";
const FLIP_VERTICAL: &str = "FLIP_VERTICAL";
const ROTATE_180: &str = "ROTATE_180";

#[derive(Default)]
pub struct FlipPlugin {
    names: OnceLock<NameList>,
}

impl FlipPlugin {
    pub fn new() -> Self {
        FlipPlugin::default()
    }
}

fn flip_horizontal<T>(buf: &mut [T], columns: usize) {
    for row in buf.chunks_mut(columns) {
        row.reverse();
    }
}

fn flip_vertical<T>(buf: &mut [T], columns: usize) {
    let rows = buf.len() / columns;
    for r in 0..rows / 2 {
        let (top, bottom) = buf.split_at_mut((rows - 1 - r) * columns);
        top[r * columns..(r + 1) * columns].swap_with_slice(&mut bottom[..columns]);
    }
}

fn apply<T>(buf: &mut [T], columns: usize, algorithm: &str) -> DeinterlaceResult<()> {
    match algorithm {
        FLIP_HORIZONTAL => flip_horizontal(buf, columns),
        FLIP_VERTICAL => flip_vertical(buf, columns),
        ROTATE_180 => buf.reverse(),
        _ => return Err(DeinterlaceError::UnsupportedAlgorithm(algorithm.to_string())),
    }
    Ok(())
}

impl DeinterlacePlugin for FlipPlugin {
    fn run(
        &self,
        buf: SampleBufMut<'_>,
        columns: usize,
        rows: usize,
        algorithm: &str,
        _arg: u32,
    ) -> DeinterlaceResult<()> {
        if columns == 0 || columns.checked_mul(rows) != Some(buf.len()) {
            return Err(DeinterlaceError::invalid(format!(
                "{}x{} does not match a buffer of {} samples",
                columns,
                rows,
                buf.len()
            )));
        }

        match buf {
            SampleBufMut::U16(buf) => apply(buf, columns, algorithm),
            SampleBufMut::U32(buf) => apply(buf, columns, algorithm),
        }
    }

    fn name_list(&self) -> &NameList {
        self.names
            .get_or_init(|| [FLIP_HORIZONTAL, FLIP_VERTICAL, ROTATE_180].iter().copied().collect())
    }
}

deinterlace::declare_plugin!(FlipPlugin, FlipPlugin::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let plugin = FlipPlugin::new();
        assert_eq!(plugin.count(), 3);
        assert!(plugin.name_list().contains(ROTATE_180));
        assert!(std::ptr::eq(plugin.name_list(), plugin.name_list()));
    }

    #[test]
    fn test_flips() {
        let plugin = FlipPlugin::new();

        let mut buf = [0u16, 1, 2, 3, 4, 5];
        plugin.run(SampleBufMut::U16(&mut buf), 3, 2, FLIP_HORIZONTAL, 0).unwrap();
        assert_eq!(buf, [2, 1, 0, 5, 4, 3]);

        let mut buf = [0u32, 1, 2, 3, 4, 5];
        plugin.run(SampleBufMut::U32(&mut buf), 2, 3, FLIP_VERTICAL, 0).unwrap();
        assert_eq!(buf, [4, 5, 2, 3, 0, 1]);

        let mut buf = [0u16, 1, 2, 3];
        plugin.run(SampleBufMut::U16(&mut buf), 2, 2, ROTATE_180, 0).unwrap();
        assert_eq!(buf, [3, 2, 1, 0]);
    }

    #[test]
    fn test_errors() {
        let plugin = FlipPlugin::new();
        let mut buf = [0u16; 6];

        assert!(plugin.run(SampleBufMut::U16(&mut buf), 4, 2, ROTATE_180, 0).is_err());
        assert!(plugin.run(SampleBufMut::U16(&mut buf), 3, 2, "SPIN", 0).is_err());
    }

    #[test]
    fn test_entry_points() {
        unsafe {
            let ptr = deinterlace_plugin_create();
            assert!(!ptr.is_null());
            deinterlace_plugin_destroy(ptr);
        }
    }
}
