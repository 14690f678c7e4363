//! Compile-time sizes shared by the allocator, fillers, and kernels.
//!
//! None of these are configurable at runtime. Changing one means
//! rebuilding, and the `const` assertions at the bottom of this file
//! reject combinations the kernels cannot handle.

/// The arithmetic unit of every kernel.
pub type Element = u32;

/// Size of one [`Element`] in bytes.
pub const ELEMENT_BYTES: usize = std::mem::size_of::<Element>();

/// Width of one vector lane in bits.
pub const LANE_BITS: usize = 512;

/// Width of one vector lane in bytes.
pub const LANE_BYTES: usize = LANE_BITS / 8;

/// Number of elements grouped into one lane.
pub const LANE_WIDTH: usize = LANE_BYTES / ELEMENT_BYTES;

/// Start-address alignment of every benchmark buffer, in bytes.
pub const ALIGNMENT: usize = 4096;

/// Byte length of every benchmark buffer (12 KiB).
pub const BUFFER_BYTES: usize = 12 * 1024;

/// Elements per benchmark buffer.
pub const ELEMENT_COUNT: usize = BUFFER_BYTES / ELEMENT_BYTES;

/// Lanes per benchmark buffer.
pub const LANE_COUNT: usize = BUFFER_BYTES / LANE_BYTES;

/// Overflow guard for kernel element counts: `(count + 1) * LANE_WIDTH`
/// must stay strictly below this.
pub const MAX_ELEMENT_COUNT: u32 = u32::MAX / 2;

const _: () = assert!(ALIGNMENT.is_power_of_two());
const _: () = assert!(ALIGNMENT % LANE_BYTES == 0);
const _: () = assert!(BUFFER_BYTES % ALIGNMENT == 0);
const _: () = assert!(BUFFER_BYTES % LANE_BYTES == 0);
const _: () = assert!(ELEMENT_COUNT < MAX_ELEMENT_COUNT as usize);
