//! # Raw Aligned Allocation
//!
//! The lowest layer: untyped blocks at a caller-chosen alignment, straight
//! from the platform primitive.
//!
//! ## Contract
//!
//! - Failure is reported as a null pointer, never as a panic.
//! - A block from [`allocate_aligned`] goes back through [`free_aligned`]
//!   and nothing else. Mixing it with `std::alloc::dealloc`, `Box`, or a
//!   second `free_aligned` is undefined behaviour.
//! - The alignment must be a power of two. This is only checked in debug
//!   builds.

// SAFETY: This module forwards to the platform allocation primitive.
#![allow(unsafe_code)]

use std::mem;
use std::ptr;

use crate::platform;

/// Allocates `element_size * count` bytes aligned to `alignment`.
///
/// A zero-byte request is served as a one-byte block, so a non-null result
/// always means success and the pointer is always valid for
/// [`free_aligned`].
///
/// # Returns
///
/// The start of the block, or null if the platform allocator failed or the
/// total size overflows `usize`.
///
/// # Example
///
/// ```rust,ignore
/// use aligned_memory::{allocate_aligned, free_aligned, is_aligned};
///
/// let p = allocate_aligned(4, 64, 16);
/// assert!(!p.is_null());
/// assert!(is_aligned(p, 64));
/// unsafe { free_aligned(p) };
/// ```
#[must_use]
pub fn allocate_aligned(element_size: usize, alignment: usize, count: usize) -> *mut u8 {
    debug_assert!(
        alignment.is_power_of_two(),
        "alignment must be a power of two, got {alignment}"
    );

    let Some(size) = element_size.checked_mul(count) else {
        tracing::trace!(element_size, count, "aligned allocation size overflow");
        return ptr::null_mut();
    };

    let block = platform::aligned_malloc(size.max(1), alignment);
    tracing::trace!(
        size,
        align = alignment,
        backend = platform::BACKEND,
        ok = !block.is_null(),
        "aligned allocate"
    );
    block
}

/// Allocates uninitialized storage for `count` values of `T` at `T`'s
/// natural alignment.
///
/// Returns null on failure. Release with [`free_aligned`].
#[must_use]
pub fn allocate_aligned_for<T>(count: usize) -> *mut T {
    allocate_aligned(mem::size_of::<T>(), mem::align_of::<T>(), count).cast()
}

/// Releases a block returned by [`allocate_aligned`].
///
/// Passing null does nothing.
///
/// # Safety
///
/// `ptr` must be null or a pointer returned by [`allocate_aligned`] (or
/// [`allocate_aligned_for`]) that has not been released yet. Any values
/// living in the block must already have been dropped.
pub unsafe fn free_aligned(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    tracing::trace!(backend = platform::BACKEND, "aligned free");

    // SAFETY: guaranteed by the caller.
    unsafe { platform::aligned_free(ptr) }
}

/// Returns `true` if the address of `ptr` is a multiple of `alignment`.
///
/// A zero alignment is never satisfied.
#[inline]
#[must_use]
pub fn is_aligned<T: ?Sized>(ptr: *const T, alignment: usize) -> bool {
    alignment != 0 && (ptr.cast::<u8>() as usize) % alignment == 0
}
