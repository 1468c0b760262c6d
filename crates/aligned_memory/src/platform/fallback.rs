//! Portable backend on top of `std::alloc`.
//!
//! `std::alloc::dealloc` needs the original layout while `aligned_free` only
//! receives the pointer, so every block carries a two-word header directly
//! in front of the user pointer:
//!
//! ```text
//! base                       user = base + offset
//! |<------ offset ---------->|
//! [ padding ][ total ][ align ][ user data ........ ]
//! ```

#![allow(unsafe_code)]

use std::alloc::{alloc, dealloc, Layout};
use std::mem;
use std::ptr;

/// Name of the primitive, recorded on trace events.
pub(crate) const BACKEND: &str = "std::alloc";

const HEADER: usize = 2 * mem::size_of::<usize>();

/// Distance from the base of the allocation to the user pointer.
///
/// Both operands are powers of two, so the larger is a multiple of the
/// smaller and the user pointer keeps the requested alignment.
fn offset_for(align: usize) -> usize {
    HEADER.max(align)
}

/// Allocates `size` bytes aligned to `align`. Returns null on failure.
pub(crate) fn aligned_malloc(size: usize, align: usize) -> *mut u8 {
    let align = align.max(mem::align_of::<usize>());
    let offset = offset_for(align);
    let Some(total) = size.checked_add(offset) else {
        return ptr::null_mut();
    };
    let Ok(layout) = Layout::from_size_align(total, align) else {
        return ptr::null_mut();
    };

    // SAFETY: `total` is non-zero because it includes the header.
    let base = unsafe { alloc(layout) };
    if base.is_null() {
        return ptr::null_mut();
    }

    // SAFETY: `offset < total`, and `offset >= HEADER` leaves room for the
    // two header words, which are usize-aligned because `align` is.
    unsafe {
        let user = base.add(offset);
        let header = user.cast::<usize>().sub(2);
        header.write(total);
        header.add(1).write(align);
        user
    }
}

/// Releases a block returned by [`aligned_malloc`].
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by [`aligned_malloc`].
pub(crate) unsafe fn aligned_free(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: the header was written by `aligned_malloc` and describes the
    // exact layout of the underlying allocation.
    unsafe {
        let header = ptr.cast::<usize>().sub(2);
        let total = header.read();
        let align = header.add(1).read();
        let base = ptr.sub(offset_for(align));
        dealloc(base, Layout::from_size_align_unchecked(total, align));
    }
}
