//! # Heaps
//!
//! A [`Heap`] bundles the two allocation paths the owning handles can take:
//!
//! ```text
//! default path:  std::alloc::alloc / dealloc   (alignment <= MIN_ALIGNMENT)
//! aligned path:  allocate_aligned / free_aligned (platform primitive)
//! ```
//!
//! Handles store their heap by value. [`SystemHeap`] is zero-sized, so the
//! production handles are a single pointer wide; applications can supply
//! their own heap to instrument or redirect allocations.

// SAFETY: This module implements the allocation paths on raw memory.
#![allow(unsafe_code)]

use std::alloc::{self, Layout};

use crate::raw;

/// Source of raw storage for the owning handles.
///
/// # Safety
///
/// Implementations must uphold, for both paths:
/// - A non-null result points to a block of at least the requested size,
///   aligned to at least the requested alignment, that stays valid until it
///   is released through the matching `free_*` method.
/// - `free_default` accepts exactly the blocks of `allocate_default` and
///   `free_aligned` exactly the blocks of `allocate_aligned`.
pub unsafe trait Heap {
    /// Allocates a block on the default path. Returns null on failure.
    ///
    /// # Safety
    ///
    /// `layout.size()` must be non-zero.
    unsafe fn allocate_default(&self, layout: Layout) -> *mut u8;

    /// Releases a block from [`Heap::allocate_default`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate_default` on this heap with the same
    /// `layout`, and must not have been released yet.
    unsafe fn free_default(&self, ptr: *mut u8, layout: Layout);

    /// Allocates `size` bytes aligned to `align` on the aligned path.
    /// Returns null on failure.
    fn allocate_aligned(&self, size: usize, align: usize) -> *mut u8;

    /// Releases a block from [`Heap::allocate_aligned`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate_aligned` on this heap and must not have
    /// been released yet.
    unsafe fn free_aligned(&self, ptr: *mut u8);
}

/// The process heap: the global allocator for the default path and the
/// platform primitive for the aligned path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SystemHeap;

// SAFETY: each path pairs an allocator with its own release function.
unsafe impl Heap for SystemHeap {
    #[inline]
    unsafe fn allocate_default(&self, layout: Layout) -> *mut u8 {
        debug_assert!(layout.size() > 0, "default path needs a non-zero size");
        // SAFETY: non-zero size guaranteed by the caller.
        unsafe { alloc::alloc(layout) }
    }

    #[inline]
    unsafe fn free_default(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: guaranteed by the caller.
        unsafe { alloc::dealloc(ptr, layout) }
    }

    #[inline]
    fn allocate_aligned(&self, size: usize, align: usize) -> *mut u8 {
        raw::allocate_aligned(size, align, 1)
    }

    #[inline]
    unsafe fn free_aligned(&self, ptr: *mut u8) {
        // SAFETY: guaranteed by the caller.
        unsafe { raw::free_aligned(ptr) }
    }
}
