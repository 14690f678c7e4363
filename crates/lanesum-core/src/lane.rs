//! The 512-bit vector lane.
//!
//! A [`Lane`] is sixteen [`Element`]s treated as one arithmetic unit. It is
//! a plain array with 64-byte alignment rather than a target-specific
//! vector type; the element-wise add is written so that the compiler lowers
//! it to whatever native SIMD the target offers.

use std::ops::Add;

use bytemuck::{Pod, Zeroable};

use crate::constants::{Element, ALIGNMENT, LANE_BYTES, LANE_WIDTH};

/// [`LANE_WIDTH`] elements added as one unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C, align(64))]
pub struct Lane(pub [Element; LANE_WIDTH]);

const _: () = assert!(std::mem::size_of::<Lane>() == LANE_BYTES);
const _: () = assert!(std::mem::align_of::<Lane>() == LANE_BYTES);
const _: () = assert!(ALIGNMENT % std::mem::size_of::<Lane>() == 0);

impl Lane {
    /// A lane of zeros.
    pub const ZERO: Self = Self([0; LANE_WIDTH]);

    /// A lane with every element set to `value`.
    pub const fn splat(value: Element) -> Self {
        Self([value; LANE_WIDTH])
    }

    /// Add corresponding elements, wrapping modulo 2^32.
    #[inline(always)]
    pub fn wrapping_add(self, other: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i].wrapping_add(other.0[i])))
    }
}

impl Add for Lane {
    type Output = Self;

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        self.wrapping_add(other)
    }
}

/// Single-lane add behind a call boundary the optimizer may not remove.
///
/// Used by [`VectorHelper`](crate::kernel::VectorHelper) to measure what an
/// out-of-line call per lane costs.
#[inline(never)]
pub fn add_lane(a: Lane, b: Lane) -> Lane {
    a.wrapping_add(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_element_wise() {
        let a = Lane(std::array::from_fn(|i| i as Element));
        let b = Lane::splat(100);
        let sum = a + b;
        for (i, &v) in sum.0.iter().enumerate() {
            assert_eq!(v, i as Element + 100);
        }
    }

    #[test]
    fn add_wraps_around() {
        let sum = Lane::splat(Element::MAX) + Lane::splat(1);
        assert_eq!(sum, Lane::ZERO);
    }

    #[test]
    fn helper_matches_operator() {
        let a = Lane(std::array::from_fn(|i| (i as Element).wrapping_mul(0x9E37_79B9)));
        let b = Lane(std::array::from_fn(|i| Element::MAX - i as Element));
        assert_eq!(add_lane(a, b), a + b);
    }

    #[test]
    fn zeroed_lane_is_zero() {
        assert_eq!(<Lane as Zeroable>::zeroed(), Lane::ZERO);
        assert_eq!(bytemuck::bytes_of(&Lane::splat(1)).len(), LANE_BYTES);
    }

    #[test]
    fn lane_casts_from_aligned_bytes() {
        #[repr(C, align(64))]
        struct Raw([u8; 128]);
        let raw = Raw([0xFF; 128]);
        let lanes: &[Lane] = bytemuck::cast_slice(&raw.0);
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[1], Lane::splat(Element::MAX));
    }
}
