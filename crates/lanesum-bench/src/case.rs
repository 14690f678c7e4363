//! One benchmark case per kernel.
//!
//! A [`SumCase`] owns its three buffers for its whole lifetime: two
//! random-filled inputs and a zero-filled output. Each
//! [`iterate`](SumCase::iterate) runs the kernel once and hands the first
//! and last output elements to a [`Retain`] sink, so the optimizer cannot
//! prove the kernel's stores dead. Dropping the case frees the buffers.

use lanesum_core::constants::{BUFFER_BYTES, ELEMENT_COUNT};
use lanesum_core::fill::zeroed_buffer;
use lanesum_core::{AlignedBuffer, BufferFiller, Element, Kernel};
use tracing::debug;

/// A sink for values that must be treated as used.
pub trait Retain {
    /// Mark `value` as observed.
    fn retain(&mut self, value: Element);
}

/// [`Retain`] via [`std::hint::black_box`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BlackBox;

impl Retain for BlackBox {
    #[inline(always)]
    fn retain(&mut self, value: Element) {
        std::hint::black_box(value);
    }
}

/// A kernel plus the buffers it runs over.
pub struct SumCase<K> {
    kernel: K,
    a: AlignedBuffer,
    b: AlignedBuffer,
    o: AlignedBuffer,
    count: u32,
    observed: (Element, Element),
}

impl<K: Kernel> SumCase<K> {
    /// Allocate and fill the buffers for `kernel`.
    ///
    /// Inputs are drawn from `filler` in order `a`, then `b`.
    pub fn new(kernel: K, filler: &mut BufferFiller) -> Self {
        let a = filler.random_buffer(BUFFER_BYTES);
        let b = filler.random_buffer(BUFFER_BYTES);
        let o = zeroed_buffer(BUFFER_BYTES);
        debug!(kernel = kernel.name(), bytes = BUFFER_BYTES, "case set up");
        Self {
            kernel,
            a,
            b,
            o,
            count: ELEMENT_COUNT as u32,
            observed: (0, 0),
        }
    }

    /// The kernel's benchmark name.
    pub fn name(&self) -> &'static str {
        self.kernel.name()
    }

    /// One measured iteration: run the kernel, then retain the first and
    /// last output elements.
    #[inline]
    pub fn iterate<R: Retain>(&mut self, sink: &mut R) {
        self.kernel.run(&self.a, &self.b, &mut self.o, self.count);
        let out = self.o.elements();
        let first = out[0];
        let last = out[ELEMENT_COUNT - 1];
        self.observed = (first, last);
        sink.retain(first);
        sink.retain(last);
    }

    /// The `(first, last)` output pair from the latest iteration.
    pub fn observed(&self) -> (Element, Element) {
        self.observed
    }

    /// The input buffers.
    pub fn inputs(&self) -> (&AlignedBuffer, &AlignedBuffer) {
        (&self.a, &self.b)
    }

    /// The output buffer.
    pub fn output(&self) -> &AlignedBuffer {
        &self.o
    }
}
