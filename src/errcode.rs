//! Deinterlace error codes.

use quick_error::quick_error;
use std::io;
use std::path::PathBuf;

pub type DeinterlaceResult<T> = Result<T, DeinterlaceError>;

/// Broad classification of a [`DeinterlaceError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    Unsupported,
    Resource,
    OutOfRange,
}

quick_error! {
    #[derive(Debug)]
    pub enum DeinterlaceError {
        InvalidArgument(msg: String) {
            display("Invalid argument: {}", msg)
        }

        UnsupportedAlgorithm(name: String) {
            display("Unsupported algorithm: {}", name)
        }
        NoPluginsLoaded {
            display("No custom deinterlace plugins loaded")
        }
        AlgorithmNotFound(name: String) {
            display("Custom algorithm not found: {}", name)
        }

        Allocation(elements: usize) {
            display("Failed to allocate scratch buffer of {} elements", elements)
        }
        LibraryLoad(path: PathBuf, err: libloading::Error) {
            display("Failed to load plugin library {}: {}", path.display(), err)
            source(err)
        }

        IndexOutOfRange(index: usize, count: usize) {
            display("Plugin index {} out of range, {} plugin(s) loaded", index, count)
        }

        Io(err: io::Error) {
            from()
            display("IO error: {}", err)
            source(err)
        }
    }
}

impl DeinterlaceError {
    /// Shorthand for an [`DeinterlaceError::InvalidArgument`] error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        DeinterlaceError::InvalidArgument(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DeinterlaceError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            DeinterlaceError::UnsupportedAlgorithm(_)
            | DeinterlaceError::NoPluginsLoaded
            | DeinterlaceError::AlgorithmNotFound(_) => ErrorKind::Unsupported,
            DeinterlaceError::Allocation(_)
            | DeinterlaceError::LibraryLoad(..)
            | DeinterlaceError::Io(_) => ErrorKind::Resource,
            DeinterlaceError::IndexOutOfRange(..) => ErrorKind::OutOfRange,
        }
    }
}
