//! # Allocation Routes
//!
//! Type-level tags choosing which [`Heap`] path a handle uses. The route is
//! part of the handle's type, so a block can only ever be released through
//! the path that produced it.
//!
//! | Tag         | Allocates with                  | Used by |
//! |-------------|---------------------------------|---------|
//! | [`Natural`] | default path                    | plain heap objects |
//! | [`Aligned`] | aligned path                    | `AlignedBox`, `AlignedShared` |
//! | [`Auto`]    | aligned iff the type needs it   | `Exclusive`, `Shared` |
//!
//! Zero-sized types never reach the heap: they get a dangling, well-aligned
//! pointer and releasing it is a no-op.
//!
//! [`Route`] is sealed. Handles write into and release whatever a route
//! hands back, so the three tags above are the only implementors.

// SAFETY: Routes hand raw blocks between the heap and the lifecycle layer.
#![allow(unsafe_code)]

use std::alloc::Layout;
use std::mem;
use std::ptr::NonNull;

use crate::class::AlignmentClass;
use crate::heap::Heap;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Natural {}
    impl Sealed for super::Aligned {}
    impl Sealed for super::Auto {}
}

/// A compile-time choice of allocation path.
///
/// Sealed: only [`Natural`], [`Aligned`] and [`Auto`] implement it.
///
/// ```compile_fail
/// use std::ptr::NonNull;
/// use aligned_memory::{Heap, Route, Unique};
///
/// enum Rogue {}
///
/// impl Route for Rogue {
///     const NAME: &'static str = "rogue";
///     fn allocate<T, H: Heap>(_: &H) -> Option<NonNull<T>> {
///         NonNull::new(0x40 as *mut T)
///     }
///     unsafe fn release<T, H: Heap>(_: &H, _: NonNull<T>) {}
/// }
///
/// let _ = Unique::<[u64; 8], Rogue>::new([7; 8]);
/// ```
pub trait Route: sealed::Sealed {
    /// Short name recorded on log events.
    const NAME: &'static str;

    /// Acquires uninitialized storage for one `T`, or `None` if the heap
    /// is exhausted.
    fn allocate<T, H: Heap>(heap: &H) -> Option<NonNull<T>>;

    /// Releases storage acquired by [`Route::allocate`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `Self::allocate::<T, H>` on the same heap, must
    /// not have been released, and must not hold a live value.
    unsafe fn release<T, H: Heap>(heap: &H, ptr: NonNull<T>);
}

/// Always the default path.
#[derive(Debug)]
pub enum Natural {}

/// Always the aligned path.
#[derive(Debug)]
pub enum Aligned {}

/// The default path for default-alignment-safe types, the aligned path for
/// types that require custom alignment.
#[derive(Debug)]
pub enum Auto {}

impl Route for Natural {
    const NAME: &'static str = "natural";

    #[inline]
    fn allocate<T, H: Heap>(heap: &H) -> Option<NonNull<T>> {
        let layout = Layout::new::<T>();
        if layout.size() == 0 {
            return Some(NonNull::dangling());
        }
        // SAFETY: size checked non-zero above.
        NonNull::new(unsafe { heap.allocate_default(layout) }.cast())
    }

    #[inline]
    unsafe fn release<T, H: Heap>(heap: &H, ptr: NonNull<T>) {
        let layout = Layout::new::<T>();
        if layout.size() == 0 {
            return;
        }
        // SAFETY: the block came from allocate_default with this layout.
        unsafe { heap.free_default(ptr.as_ptr().cast(), layout) }
    }
}

impl Route for Aligned {
    const NAME: &'static str = "aligned";

    #[inline]
    fn allocate<T, H: Heap>(heap: &H) -> Option<NonNull<T>> {
        if mem::size_of::<T>() == 0 {
            return Some(NonNull::dangling());
        }
        NonNull::new(heap.allocate_aligned(mem::size_of::<T>(), mem::align_of::<T>()).cast())
    }

    #[inline]
    unsafe fn release<T, H: Heap>(heap: &H, ptr: NonNull<T>) {
        if mem::size_of::<T>() == 0 {
            return;
        }
        // SAFETY: the block came from allocate_aligned on this heap.
        unsafe { heap.free_aligned(ptr.as_ptr().cast()) }
    }
}

impl Route for Auto {
    const NAME: &'static str = "auto";

    #[inline]
    fn allocate<T, H: Heap>(heap: &H) -> Option<NonNull<T>> {
        if <T as AlignmentClass>::REQUIRES_CUSTOM_ALIGNMENT {
            Aligned::allocate::<T, H>(heap)
        } else {
            Natural::allocate::<T, H>(heap)
        }
    }

    #[inline]
    unsafe fn release<T, H: Heap>(heap: &H, ptr: NonNull<T>) {
        // SAFETY: the same constant picked the path in `allocate`.
        unsafe {
            if <T as AlignmentClass>::REQUIRES_CUSTOM_ALIGNMENT {
                Aligned::release(heap, ptr);
            } else {
                Natural::release(heap, ptr);
            }
        }
    }
}
