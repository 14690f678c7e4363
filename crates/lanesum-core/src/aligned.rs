//! Page-aligned heap buffers.
//!
//! An [`AlignedBuffer`] owns one region whose start address is a multiple
//! of [`ALIGNMENT`] and whose length is a positive multiple of it. The
//! region is freed exactly once, when the buffer is dropped.
//!
//! Allocation failure has no recovery path: [`AlignedBuffer::new`] reports
//! the size and the platform error on stderr and aborts. Callers that want
//! to handle the failure themselves use [`AlignedBuffer::try_new`].

#![allow(unsafe_code)]

use std::fmt;
use std::ptr::NonNull;

use tracing::debug;

use crate::constants::{Element, ALIGNMENT};
use crate::error::AllocError;
use crate::lane::Lane;

/// An owned, zero-initialised, [`ALIGNMENT`]-aligned byte region.
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    len: usize,
}

// SAFETY: the buffer is the sole owner of its region. Shared references
// only hand out `&[u8]` views, mutation requires `&mut self`.
unsafe impl Send for AlignedBuffer {}
// SAFETY: see above.
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocate `size` bytes aligned to [`ALIGNMENT`].
    ///
    /// The region is zeroed before it is returned so every view over it is
    /// initialised memory.
    ///
    /// # Errors
    ///
    /// - [`AllocError::InvalidSize`] if `size` is zero or not a multiple of
    ///   [`ALIGNMENT`].
    /// - [`AllocError::OutOfMemory`] if the system allocator refuses.
    pub fn try_new(size: usize) -> Result<Self, AllocError> {
        if size == 0 || size % ALIGNMENT != 0 {
            return Err(AllocError::InvalidSize { size });
        }
        let ptr = sys::alloc(size).map_err(|errno| AllocError::OutOfMemory { size, errno })?;
        debug_assert_eq!(ptr.as_ptr() as usize % ALIGNMENT, 0);
        debug!(size, addr = ?ptr, "allocated aligned buffer");
        Ok(Self { ptr, len: size })
    }

    /// Allocate `size` bytes aligned to [`ALIGNMENT`], aborting on failure.
    ///
    /// A benchmark without its working memory has no valid run, so any
    /// [`AllocError`] is printed to stderr and the process aborts.
    pub fn new(size: usize) -> Self {
        match Self::try_new(size) {
            Ok(buf) => buf,
            Err(err) => alloc_failed(&err),
        }
    }

    /// Length of the region in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: zero-length buffers are rejected at allocation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start address of the region.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// The region as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `ptr` points at `len` initialised bytes owned by `self`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The region as mutable bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// The region as [`Element`]s.
    pub fn elements(&self) -> &[Element] {
        bytemuck::cast_slice(self.as_bytes())
    }

    /// The region as mutable [`Element`]s.
    pub fn elements_mut(&mut self) -> &mut [Element] {
        bytemuck::cast_slice_mut(self.as_bytes_mut())
    }

    /// The region as [`Lane`]s.
    pub fn lanes(&self) -> &[Lane] {
        bytemuck::cast_slice(self.as_bytes())
    }

    /// The region as mutable [`Lane`]s.
    pub fn lanes_mut(&mut self) -> &mut [Lane] {
        bytemuck::cast_slice_mut(self.as_bytes_mut())
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        debug!(size = self.len, addr = ?self.ptr, "freeing aligned buffer");
        // SAFETY: `ptr` came from `sys::alloc(self.len)` and is freed only here.
        unsafe { sys::free(self.ptr, self.len) }
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

#[cold]
#[inline(never)]
fn alloc_failed(err: &AllocError) -> ! {
    eprintln!("lanesum: {err}");
    std::process::abort()
}

#[cfg(unix)]
mod sys {
    use std::ptr::{self, NonNull};

    use crate::constants::ALIGNMENT;

    pub(super) fn alloc(size: usize) -> Result<NonNull<u8>, i32> {
        let mut raw: *mut libc::c_void = ptr::null_mut();
        // SAFETY: ALIGNMENT is a power of two and a multiple of
        // `size_of::<*mut c_void>()`, as posix_memalign requires.
        let ret = unsafe { libc::posix_memalign(&mut raw, ALIGNMENT, size) };
        if ret != 0 {
            return Err(ret);
        }
        let ptr = NonNull::new(raw.cast::<u8>()).ok_or(libc::ENOMEM)?;
        // SAFETY: posix_memalign succeeded, so `ptr` is writable for `size` bytes.
        unsafe { ptr.as_ptr().write_bytes(0, size) };
        Ok(ptr)
    }

    /// # Safety
    ///
    /// `ptr` must come from [`alloc`] and must not have been freed.
    pub(super) unsafe fn free(ptr: NonNull<u8>, _size: usize) {
        // SAFETY: forwarded from the caller.
        unsafe { libc::free(ptr.as_ptr().cast()) }
    }
}

#[cfg(not(unix))]
mod sys {
    use std::alloc::{self, Layout};
    use std::io;
    use std::ptr::NonNull;

    use crate::constants::ALIGNMENT;

    // EINVAL
    const INVALID_ARGUMENT: i32 = 22;

    pub(super) fn alloc(size: usize) -> Result<NonNull<u8>, i32> {
        let layout = Layout::from_size_align(size, ALIGNMENT).map_err(|_| INVALID_ARGUMENT)?;
        // SAFETY: `size` is non-zero, checked by the caller.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        NonNull::new(raw).ok_or_else(|| io::Error::last_os_error().raw_os_error().unwrap_or(0))
    }

    /// # Safety
    ///
    /// `ptr` must come from [`alloc`] with the same `size` and must not
    /// have been freed.
    pub(super) unsafe fn free(ptr: NonNull<u8>, size: usize) {
        // SAFETY: `alloc` built this exact layout successfully.
        unsafe {
            let layout = Layout::from_size_align_unchecked(size, ALIGNMENT);
            alloc::dealloc(ptr.as_ptr(), layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BUFFER_BYTES, ELEMENT_COUNT, LANE_COUNT};

    #[test]
    fn address_is_aligned_for_multiples_of_alignment() {
        for pages in 1..=8 {
            let buf = AlignedBuffer::new(pages * ALIGNMENT);
            assert_eq!(buf.as_ptr() as usize % ALIGNMENT, 0, "{pages} pages");
            assert_eq!(buf.len(), pages * ALIGNMENT);
        }
    }

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(
            AlignedBuffer::try_new(0).unwrap_err(),
            AllocError::InvalidSize { size: 0 }
        );
    }

    #[test]
    fn unaligned_size_is_rejected() {
        let err = AlignedBuffer::try_new(ALIGNMENT + 64).unwrap_err();
        assert_eq!(err, AllocError::InvalidSize { size: ALIGNMENT + 64 });
    }

    #[cfg(unix)]
    #[test]
    fn allocator_refusal_is_out_of_memory() {
        let size = (usize::MAX / 2) & !(ALIGNMENT - 1);
        let err = AlignedBuffer::try_new(size).unwrap_err();
        assert_eq!(
            err,
            AllocError::OutOfMemory {
                size,
                errno: libc::ENOMEM
            }
        );
        assert!(err.to_string().contains(&size.to_string()), "{err}");
    }

    /// Set in the child process spawned by `new_aborts_on_invalid_size`.
    const ABORT_CHILD_ENV: &str = "LANESUM_ALIGNED_ABORT_CHILD";

    #[test]
    fn new_aborts_on_invalid_size() {
        let size = ALIGNMENT + 1;
        if std::env::var_os(ABORT_CHILD_ENV).is_some() {
            let _buf = AlignedBuffer::new(size);
            return;
        }

        let exe = std::env::current_exe().unwrap();
        let output = std::process::Command::new(exe)
            .args([
                "--exact",
                "aligned::tests::new_aborts_on_invalid_size",
                "--nocapture",
                "--test-threads=1",
            ])
            .env(ABORT_CHILD_ENV, "1")
            .output()
            .unwrap();

        assert!(!output.status.success(), "child exited cleanly");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains(&size.to_string()), "stderr: {stderr}");
    }

    #[test]
    fn fresh_buffer_is_zeroed() {
        let buf = AlignedBuffer::new(BUFFER_BYTES);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn views_cover_the_whole_region() {
        let buf = AlignedBuffer::new(BUFFER_BYTES);
        assert!(!buf.is_empty());
        assert_eq!(buf.as_bytes().len(), BUFFER_BYTES);
        assert_eq!(buf.elements().len(), ELEMENT_COUNT);
        assert_eq!(buf.lanes().len(), LANE_COUNT);
    }

    #[test]
    fn element_and_lane_views_alias() {
        let mut buf = AlignedBuffer::new(BUFFER_BYTES);
        buf.elements_mut()[17] = 0xDEAD_BEEF;
        assert_eq!(buf.lanes()[1].0[1], 0xDEAD_BEEF);

        buf.lanes_mut()[2].0[0] = 7;
        assert_eq!(buf.elements()[32], 7);
    }

    #[test]
    fn buffer_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AlignedBuffer>();
    }
}
