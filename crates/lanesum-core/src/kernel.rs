//! Element-wise summation kernels.
//!
//! Every kernel computes `o[i] = a[i] + b[i] (mod 2^32)` for
//! `i in 0..count`. They differ only in the granularity of the add:
//!
//! | Kernel           | Loop body                                   |
//! |------------------|---------------------------------------------|
//! | [`Scalar`]       | one [`Element`] at a time, grouped by lane  |
//! | [`Vector`]       | one [`Lane`] add per iteration              |
//! | [`VectorHelper`] | one [`add_lane`] call per iteration         |
//!
//! # Preconditions
//!
//! `count` must satisfy [`count_is_valid`]. The check is a
//! `debug_assert!`; release builds never pay for it inside the timed loop.
//! Each kernel slices its inputs to the processed length once, up front,
//! so the loops carry no per-element bounds checks and an undersized
//! buffer panics rather than reading past its end.

use crate::aligned::AlignedBuffer;
use crate::constants::{Element, ALIGNMENT, ELEMENT_BYTES, LANE_WIDTH, MAX_ELEMENT_COUNT};
use crate::lane::{add_lane, Lane};

/// Whether `count` is an element count every kernel accepts.
///
/// Requires `(count + 1) * LANE_WIDTH < MAX_ELEMENT_COUNT` and
/// `count * LANE_WIDTH * ELEMENT_BYTES` to be a multiple of [`ALIGNMENT`].
pub fn count_is_valid(count: u32) -> bool {
    let count = u64::from(count);
    let lane = LANE_WIDTH as u64;
    (count + 1) * lane < u64::from(MAX_ELEMENT_COUNT)
        && (count * lane * ELEMENT_BYTES as u64) % ALIGNMENT as u64 == 0
}

/// Scalar kernel: an outer loop over lane-sized groups, an inner loop over
/// single elements.
pub fn sum_scalar(a: &[Element], b: &[Element], o: &mut [Element], count: u32) {
    debug_assert!(count_is_valid(count), "invalid element count {count}");
    let n = count as usize / LANE_WIDTH * LANE_WIDTH;
    let groups = o[..n]
        .chunks_exact_mut(LANE_WIDTH)
        .zip(a[..n].chunks_exact(LANE_WIDTH))
        .zip(b[..n].chunks_exact(LANE_WIDTH));
    for ((o, a), b) in groups {
        for ((o, a), b) in o.iter_mut().zip(a).zip(b) {
            *o = a.wrapping_add(*b);
        }
    }
}

/// Vector kernel: one lane-wide add per iteration over `count / LANE_WIDTH`
/// lanes.
pub fn sum_lanes(a: &[Lane], b: &[Lane], o: &mut [Lane], count: u32) {
    debug_assert!(count_is_valid(count), "invalid element count {count}");
    let n = count as usize / LANE_WIDTH;
    for ((o, a), b) in o[..n].iter_mut().zip(&a[..n]).zip(&b[..n]) {
        *o = *a + *b;
    }
}

/// Vector kernel with every lane add routed through [`add_lane`].
pub fn sum_lanes_helper(a: &[Lane], b: &[Lane], o: &mut [Lane], count: u32) {
    debug_assert!(count_is_valid(count), "invalid element count {count}");
    let n = count as usize / LANE_WIDTH;
    for ((o, a), b) in o[..n].iter_mut().zip(&a[..n]).zip(&b[..n]) {
        *o = add_lane(*a, *b);
    }
}

// ── Kernel trait ───────────────────────────────────────────────────

/// A summation kernel over whole [`AlignedBuffer`]s.
///
/// Implementations pick the buffer view they operate on; callers only see
/// bytes in, bytes out.
pub trait Kernel {
    /// Benchmark name of this kernel.
    fn name(&self) -> &'static str;

    /// Compute `o[i] = a[i] + b[i]` for the first `count` elements.
    fn run(&self, a: &AlignedBuffer, b: &AlignedBuffer, o: &mut AlignedBuffer, count: u32);
}

/// [`sum_scalar`] as a [`Kernel`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Scalar;

/// [`sum_lanes`] as a [`Kernel`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Vector;

/// [`sum_lanes_helper`] as a [`Kernel`].
#[derive(Clone, Copy, Debug, Default)]
pub struct VectorHelper;

impl Kernel for Scalar {
    fn name(&self) -> &'static str {
        "sum"
    }

    #[inline]
    fn run(&self, a: &AlignedBuffer, b: &AlignedBuffer, o: &mut AlignedBuffer, count: u32) {
        sum_scalar(a.elements(), b.elements(), o.elements_mut(), count);
    }
}

impl Kernel for Vector {
    fn name(&self) -> &'static str {
        "sum_vec"
    }

    #[inline]
    fn run(&self, a: &AlignedBuffer, b: &AlignedBuffer, o: &mut AlignedBuffer, count: u32) {
        sum_lanes(a.lanes(), b.lanes(), o.lanes_mut(), count);
    }
}

impl Kernel for VectorHelper {
    fn name(&self) -> &'static str {
        "sum_vec_helper"
    }

    #[inline]
    fn run(&self, a: &AlignedBuffer, b: &AlignedBuffer, o: &mut AlignedBuffer, count: u32) {
        sum_lanes_helper(a.lanes(), b.lanes(), o.lanes_mut(), count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BUFFER_BYTES, ELEMENT_COUNT};
    use crate::fill::{fill_zero, zeroed_buffer, BufferFiller};

    const FULL: u32 = ELEMENT_COUNT as u32;

    fn inputs(seed: u64) -> (AlignedBuffer, AlignedBuffer) {
        let mut filler = BufferFiller::from_seed(seed);
        (
            filler.random_buffer(BUFFER_BYTES),
            filler.random_buffer(BUFFER_BYTES),
        )
    }

    fn run_kernel(kernel: &dyn Kernel, a: &AlignedBuffer, b: &AlignedBuffer, count: u32) -> Vec<u8> {
        let mut o = zeroed_buffer(BUFFER_BYTES);
        kernel.run(a, b, &mut o, count);
        o.as_bytes().to_vec()
    }

    #[test]
    fn count_validity() {
        assert!(count_is_valid(0));
        assert!(count_is_valid(64));
        assert!(count_is_valid(FULL));
        assert!(!count_is_valid(16));
        assert!(!count_is_valid(65));
        assert!(!count_is_valid(MAX_ELEMENT_COUNT));
        assert!(!count_is_valid(u32::MAX));
    }

    #[test]
    fn kernel_names() {
        assert_eq!(Scalar.name(), "sum");
        assert_eq!(Vector.name(), "sum_vec");
        assert_eq!(VectorHelper.name(), "sum_vec_helper");
    }

    #[test]
    fn wraparound_law() {
        let mut a = zeroed_buffer(BUFFER_BYTES);
        let mut b = zeroed_buffer(BUFFER_BYTES);
        a.elements_mut().fill(Element::MAX);
        b.elements_mut().fill(1);
        a.elements_mut()[5] = 0x8000_0000;
        b.elements_mut()[5] = 0x8000_0001;

        let kernels: [&dyn Kernel; 3] = [&Scalar, &Vector, &VectorHelper];
        for kernel in kernels {
            let mut o = zeroed_buffer(BUFFER_BYTES);
            kernel.run(&a, &b, &mut o, FULL);
            assert_eq!(o.elements()[0], 0, "{}", kernel.name());
            assert_eq!(o.elements()[5], 1, "{}", kernel.name());
            assert_eq!(o.elements()[ELEMENT_COUNT - 1], 0, "{}", kernel.name());
        }
    }

    #[test]
    fn output_is_element_wise_sum() {
        let (a, b) = inputs(7);
        let mut o = zeroed_buffer(BUFFER_BYTES);
        Vector.run(&a, &b, &mut o, FULL);
        for i in 0..ELEMENT_COUNT {
            assert_eq!(
                o.elements()[i],
                a.elements()[i].wrapping_add(b.elements()[i]),
                "element {i}"
            );
        }
    }

    #[test]
    fn zero_count_writes_nothing() {
        let (a, b) = inputs(3);
        let kernels: [&dyn Kernel; 3] = [&Scalar, &Vector, &VectorHelper];
        for kernel in kernels {
            let mut o = zeroed_buffer(BUFFER_BYTES);
            o.as_bytes_mut().fill(0xAA);
            kernel.run(&a, &b, &mut o, 0);
            assert!(
                o.as_bytes().iter().all(|&x| x == 0xAA),
                "{} wrote with count 0",
                kernel.name()
            );
        }
    }

    #[test]
    fn partial_count_leaves_tail_untouched() {
        let (a, b) = inputs(11);
        let mut o = zeroed_buffer(BUFFER_BYTES);
        Scalar.run(&a, &b, &mut o, 1024);
        assert_eq!(o.elements()[1023], a.elements()[1023].wrapping_add(b.elements()[1023]));
        assert!(o.elements()[1024..].iter().all(|&x| x == 0));

        fill_zero(&mut o);
        VectorHelper.run(&a, &b, &mut o, 1024);
        assert!(o.elements()[1024..].iter().all(|&x| x == 0));
    }

    #[test]
    #[should_panic]
    fn undersized_output_panics() {
        let a = [0 as Element; 64];
        let b = [0 as Element; 64];
        let mut o = [0 as Element; 32];
        sum_scalar(&a, &b, &mut o, 64);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn all_kernels_agree(seed in any::<u64>(), groups in 0u32..=48) {
                let count = groups * 64;
                let (a, b) = inputs(seed);
                let scalar = run_kernel(&Scalar, &a, &b, count);
                let vector = run_kernel(&Vector, &a, &b, count);
                let helper = run_kernel(&VectorHelper, &a, &b, count);
                prop_assert_eq!(&scalar, &vector);
                prop_assert_eq!(&vector, &helper);
            }

            #[test]
            fn lane_sum_matches_wrapping_add(
                a in proptest::array::uniform16(any::<u32>()),
                b in proptest::array::uniform16(any::<u32>()),
            ) {
                let mut o = [Lane::ZERO; 4];
                let la = [Lane(a); 4];
                let lb = [Lane(b); 4];
                sum_lanes(&la, &lb, &mut o, 64);
                for lane in &o {
                    for i in 0..LANE_WIDTH {
                        prop_assert_eq!(lane.0[i], a[i].wrapping_add(b[i]));
                    }
                }
            }
        }
    }
}
