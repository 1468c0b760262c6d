//! POSIX backend: `posix_memalign` paired with `free`.

#![allow(unsafe_code)]

use std::mem;
use std::ptr;

/// Name of the primitive, recorded on trace events.
pub(crate) const BACKEND: &str = "posix_memalign";

/// Allocates `size` bytes aligned to `align`.
///
/// `posix_memalign` rejects alignments below the pointer size, so those are
/// raised; a larger power of two is still a multiple of the one requested.
/// Returns null on failure, including `EINVAL` for a non-power-of-two
/// alignment.
pub(crate) fn aligned_malloc(size: usize, align: usize) -> *mut u8 {
    let align = align.max(mem::size_of::<*mut libc::c_void>());
    let mut out: *mut libc::c_void = ptr::null_mut();

    // SAFETY: `out` is a valid, writable location for the result pointer.
    let rc = unsafe { libc::posix_memalign(&mut out, align, size) };
    if rc == 0 {
        out.cast()
    } else {
        ptr::null_mut()
    }
}

/// Releases a block returned by [`aligned_malloc`].
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by [`aligned_malloc`].
pub(crate) unsafe fn aligned_free(ptr: *mut u8) {
    // SAFETY: memory from posix_memalign is released with free; free(NULL) is a no-op.
    unsafe { libc::free(ptr.cast()) }
}
