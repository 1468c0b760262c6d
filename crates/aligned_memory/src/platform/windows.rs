//! Windows backend: `_aligned_malloc` paired with `_aligned_free`.

#![allow(unsafe_code)]

/// Name of the primitive, recorded on trace events.
pub(crate) const BACKEND: &str = "_aligned_malloc";

/// Allocates `size` bytes aligned to `align`. Returns null on failure.
pub(crate) fn aligned_malloc(size: usize, align: usize) -> *mut u8 {
    // SAFETY: the CRT validates size and alignment and reports failure as NULL.
    unsafe { libc::aligned_malloc(size, align).cast() }
}

/// Releases a block returned by [`aligned_malloc`].
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by [`aligned_malloc`].
pub(crate) unsafe fn aligned_free(ptr: *mut u8) {
    // SAFETY: blocks from _aligned_malloc must go to _aligned_free, which accepts NULL.
    unsafe { libc::aligned_free(ptr.cast()) }
}
