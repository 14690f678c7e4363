//! Aligned buffers, seeded fillers, and lane-wise summation kernels.
//!
//! This crate holds everything the summation benchmarks measure:
//!
//! ```text
//! AlignedBuffer (4096-byte aligned, posix_memalign-backed)
//! ├── fill_zero / BufferFiller::fill_random (ChaCha8, explicit seed)
//! └── views: [u8] / [Element] / [Lane]
//!
//! Kernel (Scalar | Vector | VectorHelper)
//! └── o[i] = a[i] + b[i] (mod 2^32) over `count` elements
//! ```
//!
//! The kernels differ only in how the addition is spelled: one element
//! at a time, one 512-bit [`Lane`] at a time, or one lane at a time
//! through a call the optimizer may not inline. All three compute the
//! same function, so any throughput gap between them is down to code
//! shape alone.
//!
//! `unsafe` is confined to [`aligned`] (raw allocation and the views
//! over it).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod aligned;
pub mod constants;
pub mod error;
pub mod fill;
pub mod kernel;
pub mod lane;

// Public re-exports for the primary API surface.
pub use aligned::AlignedBuffer;
pub use constants::{Element, ALIGNMENT, BUFFER_BYTES, ELEMENT_COUNT, LANE_WIDTH};
pub use error::AllocError;
pub use fill::{fill_zero, zeroed_buffer, BufferFiller};
pub use kernel::{Kernel, Scalar, Vector, VectorHelper};
pub use lane::Lane;
