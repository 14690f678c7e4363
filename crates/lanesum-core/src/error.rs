//! Allocation error types.

use std::error::Error;
use std::fmt;
use std::io;

use crate::constants::ALIGNMENT;

/// Errors returned by [`AlignedBuffer::try_new`](crate::AlignedBuffer::try_new).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// Requested size is zero or not a multiple of [`ALIGNMENT`].
    InvalidSize {
        /// Number of bytes requested.
        size: usize,
    },
    /// The system allocator could not satisfy the aligned request.
    OutOfMemory {
        /// Number of bytes requested.
        size: usize,
        /// Platform error code reported by the allocator.
        errno: i32,
    },
}

impl AllocError {
    /// Number of bytes the failed request asked for.
    pub fn size(&self) -> usize {
        match self {
            Self::InvalidSize { size } | Self::OutOfMemory { size, .. } => *size,
        }
    }

    /// Platform error code, if the failure came from the allocator.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::InvalidSize { .. } => None,
            Self::OutOfMemory { errno, .. } => Some(*errno),
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize { size } => {
                write!(
                    f,
                    "allocation size {size} is not a positive multiple of {ALIGNMENT}"
                )
            }
            Self::OutOfMemory { size, errno } => {
                let description = io::Error::from_raw_os_error(*errno);
                write!(
                    f,
                    "aligned allocation of {size} bytes failed: errno {errno} aka '{description}'"
                )
            }
        }
    }
}

impl Error for AllocError {}
