//! Buffer population: all-zero or seeded-random.
//!
//! [`BufferFiller`] owns the pseudo-random generator. It is passed by
//! `&mut` to whatever needs random data, so every fill advances the same
//! stream in call order. With a fixed seed, identical call sequences
//! produce byte-identical buffers; benchmark cases are therefore only
//! reproducible if they run in a fixed order.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::aligned::AlignedBuffer;

/// Set every byte of `buf` to zero.
pub fn fill_zero(buf: &mut AlignedBuffer) {
    buf.as_bytes_mut().fill(0);
    debug!(bytes = buf.len(), "zero-filled buffer");
}

/// Allocate a buffer of `size` bytes, all zero.
///
/// Aborts on allocation failure, see [`AlignedBuffer::new`].
pub fn zeroed_buffer(size: usize) -> AlignedBuffer {
    let mut buf = AlignedBuffer::new(size);
    fill_zero(&mut buf);
    buf
}

/// A seedable source of random buffer contents.
#[derive(Clone, Debug)]
pub struct BufferFiller {
    rng: ChaCha8Rng,
    seed: Option<u64>,
}

impl BufferFiller {
    /// Seed from `seed`, or from OS entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    /// A deterministic filler.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// A filler seeded from the thread-local OS-entropy generator.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
            seed: None,
        }
    }

    /// The explicit seed, if this filler was given one.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Overwrite `buf` with uniformly random bytes, one `u64` draw per
    /// 8-byte stride.
    pub fn fill_random(&mut self, buf: &mut AlignedBuffer) {
        let len = buf.len();
        let bytes = buf.as_bytes_mut();
        debug_assert_eq!(len % std::mem::size_of::<u64>(), 0);
        debug_assert_eq!(bytes.as_ptr() as usize % std::mem::align_of::<u64>(), 0);
        let words: &mut [u64] = bytemuck::cast_slice_mut(bytes);
        for word in words.iter_mut() {
            *word = self.rng.next_u64();
        }
        debug!(bytes = len, "random-filled buffer");
    }

    /// Allocate a buffer of `size` bytes and fill it with random bytes.
    ///
    /// Aborts on allocation failure, see [`AlignedBuffer::new`].
    pub fn random_buffer(&mut self, size: usize) -> AlignedBuffer {
        let mut buf = AlignedBuffer::new(size);
        self.fill_random(&mut buf);
        buf
    }

}
