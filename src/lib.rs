//! This crate reorders raw frames read out of multi-channel CCD and IR
//! sensors into row-major raster order.
//!
//! A [`Deinterlacer`] is created per sample width ([`u16`] or [`u32`]) and
//! applies one of the built-in readout topologies in [`Algorithm`], or a
//! named algorithm provided by a dynamically loaded plugin (see
//! [`plugin`]).  The [`ffi`] module republishes the engine to C with
//! status out-parameters.
//!
//! ```
//! use deinterlace::{Algorithm, Deinterlacer};
//!
//! let mut engine = Deinterlacer::<u32>::new();
//! let mut frame = vec![0, 1, 2, 3];
//! engine.run(&mut frame, 4, 1, Algorithm::Serial, &[]).unwrap();
//! assert_eq!(frame, [0, 2, 3, 1]);
//! ```

extern crate byteorder;
extern crate libc;
extern crate libloading;
extern crate log;

#[macro_use]
extern crate quick_error;

pub use engine::Deinterlacer;
pub use errcode::DeinterlaceError;
pub use errcode::DeinterlaceResult;
pub use errcode::ErrorKind;
pub use sample::{read_frame, read_frame_into, Sample, SampleOrder};
pub use topology::Algorithm;

pub mod ffi;
pub mod plugin;

mod engine;
mod errcode;
mod sample;
mod topology;
