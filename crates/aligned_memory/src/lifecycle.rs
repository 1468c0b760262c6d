//! # Construct / Destruct Lifecycle
//!
//! Two-phase construction on top of raw storage, with a matching two-phase
//! teardown:
//!
//! ```text
//! acquire storage ──► initialize in place ──► ... ──► drop in place ──► release storage
//!        │                    │
//!        └── null: fatal      └── panic / Err: storage released, failure re-raised
//! ```
//!
//! [`Storage`] owns an acquired block until a value has been written into
//! it. Dropping it at any earlier point releases the block, which is what
//! keeps a panicking or failing initializer from leaking.

// SAFETY: This module writes values into raw blocks and drops them in place.
#![allow(unsafe_code)]

use std::alloc::{handle_alloc_error, Layout};
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

use bytemuck::Zeroable;

use crate::error::{AllocError, AllocResult};
use crate::heap::{Heap, SystemHeap};
use crate::route::{Aligned, Route};

/// Uninitialized storage for one `T`, released on drop.
pub(crate) struct Storage<'h, T, R: Route, H: Heap> {
    ptr: NonNull<T>,
    heap: &'h H,
    _route: PhantomData<R>,
}

impl<'h, T, R: Route, H: Heap> Storage<'h, T, R, H> {
    /// Acquires storage, or `None` if the heap is exhausted.
    pub(crate) fn acquire(heap: &'h H) -> Option<Self> {
        R::allocate::<T, H>(heap).map(|ptr| Self {
            ptr,
            heap,
            _route: PhantomData,
        })
    }

    /// Acquires storage, treating exhaustion as fatal.
    pub(crate) fn acquire_or_abort(heap: &'h H) -> Self {
        match Self::acquire(heap) {
            Some(storage) => storage,
            None => {
                let layout = Layout::new::<T>();
                tracing::error!(
                    size = layout.size(),
                    align = layout.align(),
                    route = R::NAME,
                    "aligned construction failed: out of memory"
                );
                handle_alloc_error(layout)
            }
        }
    }

    /// Writes `value` into the storage and hands the block over to the
    /// caller.
    pub(crate) fn init(self, value: T) -> NonNull<T> {
        // SAFETY: the block is valid for one T and holds no value yet.
        unsafe { self.ptr.as_ptr().write(value) };
        self.into_inner()
    }

    /// Fills the storage with zero bytes and hands the block over.
    pub(crate) fn init_zeroed(self) -> NonNull<T>
    where
        T: Zeroable,
    {
        // SAFETY: the block is valid for one T, and all-zero bytes are a
        // valid T by the `Zeroable` contract.
        unsafe { self.ptr.as_ptr().write_bytes(0, 1) };
        self.into_inner()
    }

    fn into_inner(self) -> NonNull<T> {
        let ptr = self.ptr;
        mem::forget(self);
        ptr
    }
}

impl<T, R: Route, H: Heap> Drop for Storage<'_, T, R, H> {
    fn drop(&mut self) {
        // SAFETY: the block came from R::allocate on this heap and holds no
        // live value: either it was never initialized, or the value was
        // already dropped in place by `destruct_in`.
        unsafe { R::release(self.heap, self.ptr) }
    }
}

/// Allocates through `R`, runs `init`, and writes its result in place.
///
/// `init` only runs once storage exists. If it panics, the storage is
/// released during unwinding.
pub(crate) fn construct_in<T, R, H, F>(heap: &H, init: F) -> NonNull<T>
where
    R: Route,
    H: Heap,
    F: FnOnce() -> T,
{
    let storage = Storage::<T, R, H>::acquire_or_abort(heap);
    let value = init();
    storage.init(value)
}

/// Like [`construct_in`], for initializers that can fail.
///
/// On `Err` the storage is released before the error is returned.
pub(crate) fn try_construct_in<T, E, R, H, F>(heap: &H, init: F) -> Result<NonNull<T>, E>
where
    R: Route,
    H: Heap,
    F: FnOnce() -> Result<T, E>,
{
    let storage = Storage::<T, R, H>::acquire_or_abort(heap);
    match init() {
        Ok(value) => Ok(storage.init(value)),
        Err(err) => {
            tracing::debug!(route = R::NAME, "initializer failed, storage reclaimed");
            drop(storage);
            Err(err)
        }
    }
}

/// Moves `value` into fresh storage, reporting exhaustion as an error.
pub(crate) fn try_place_in<T, R: Route, H: Heap>(heap: &H, value: T) -> AllocResult<NonNull<T>> {
    let storage = Storage::<T, R, H>::acquire(heap).ok_or(AllocError::OutOfMemory {
        size: mem::size_of::<T>(),
        align: mem::align_of::<T>(),
    })?;
    Ok(storage.init(value))
}

/// Allocates through `R` and zero-fills the storage in place.
pub(crate) fn construct_zeroed_in<T: Zeroable, R: Route, H: Heap>(heap: &H) -> NonNull<T> {
    Storage::<T, R, H>::acquire_or_abort(heap).init_zeroed()
}

/// Drops the value in place, then releases its storage.
///
/// The storage is released even if the value's `Drop` panics.
///
/// # Safety
///
/// `ptr` must come from one of the construct functions with the same route
/// and heap, and must not have been destructed yet.
pub(crate) unsafe fn destruct_in<T, R: Route, H: Heap>(heap: &H, ptr: NonNull<T>) {
    let storage = Storage::<T, R, H> {
        ptr,
        heap,
        _route: PhantomData,
    };
    // SAFETY: guaranteed by the caller; `storage` releases the block once
    // the value is gone.
    unsafe { ptr::drop_in_place(ptr.as_ptr()) };
    drop(storage);
}

/// Allocates aligned storage for a `T`, then constructs the value in place.
///
/// The block is aligned to `T`'s natural alignment and comes from the
/// platform primitive. The returned pointer owns the value; release it with
/// [`destruct_aligned`].
///
/// # Panics
///
/// Allocation failure is fatal and goes through
/// [`std::alloc::handle_alloc_error`]. If `init` panics, the block is freed
/// and the panic continues.
///
/// # Example
///
/// ```rust,ignore
/// #[repr(C, align(64))]
/// struct Particles([f32; 16]);
///
/// let p = construct_aligned(|| Particles([0.0; 16]));
/// unsafe { destruct_aligned(p.as_ptr()) };
/// ```
#[must_use]
pub fn construct_aligned<T>(init: impl FnOnce() -> T) -> NonNull<T> {
    construct_in::<T, Aligned, SystemHeap, _>(&SystemHeap, init)
}

/// Like [`construct_aligned`], for initializers that can fail.
///
/// # Errors
///
/// Returns the initializer's error after the block has been freed.
pub fn try_construct_aligned<T, E>(init: impl FnOnce() -> Result<T, E>) -> Result<NonNull<T>, E> {
    try_construct_in::<T, E, Aligned, SystemHeap, _>(&SystemHeap, init)
}

/// Drops the value at `ptr` and frees its block. Null is a no-op.
///
/// # Safety
///
/// `ptr` must be null or come from [`construct_aligned`] /
/// [`try_construct_aligned`] and not have been destructed yet.
pub unsafe fn destruct_aligned<T>(ptr: *mut T) {
    if let Some(ptr) = NonNull::new(ptr) {
        // SAFETY: guaranteed by the caller.
        unsafe { destruct_in::<T, Aligned, SystemHeap>(&SystemHeap, ptr) }
    }
}

/// [`construct_aligned`] on a caller-supplied heap.
#[must_use]
pub fn construct_aligned_in<T, H: Heap>(heap: &H, init: impl FnOnce() -> T) -> NonNull<T> {
    construct_in::<T, Aligned, H, _>(heap, init)
}

/// [`try_construct_aligned`] on a caller-supplied heap.
///
/// # Errors
///
/// Returns the initializer's error after the block has been freed.
pub fn try_construct_aligned_in<T, E, H: Heap>(
    heap: &H,
    init: impl FnOnce() -> Result<T, E>,
) -> Result<NonNull<T>, E> {
    try_construct_in::<T, E, Aligned, H, _>(heap, init)
}

/// [`destruct_aligned`] on a caller-supplied heap.
///
/// # Safety
///
/// `ptr` must be null or come from [`construct_aligned_in`] /
/// [`try_construct_aligned_in`] on the same heap and not have been
/// destructed yet.
pub unsafe fn destruct_aligned_in<T, H: Heap>(heap: &H, ptr: *mut T) {
    if let Some(ptr) = NonNull::new(ptr) {
        // SAFETY: guaranteed by the caller.
        unsafe { destruct_in::<T, Aligned, H>(heap, ptr) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::is_aligned;
    use std::cell::Cell;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    #[derive(Debug, PartialEq)]
    #[repr(C, align(64))]
    struct Block {
        lanes: [f32; 16],
    }

    struct DropFlag(Rc<Cell<u32>>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_construct_then_destruct() {
        let p = construct_aligned(|| Block { lanes: [1.5; 16] });
        assert!(is_aligned(p.as_ptr(), 64));
        unsafe {
            assert_eq!(p.as_ref().lanes[15], 1.5);
            destruct_aligned(p.as_ptr());
        }
    }

    #[test]
    fn test_destruct_runs_drop_once() {
        let drops = Rc::new(Cell::new(0));
        let p = construct_aligned(|| DropFlag(Rc::clone(&drops)));
        assert_eq!(drops.get(), 0);
        unsafe { destruct_aligned(p.as_ptr()) };
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn test_destruct_null_is_noop() {
        unsafe { destruct_aligned::<Block>(ptr::null_mut()) };
    }

    #[test]
    fn test_failing_initializer_is_reported() {
        let result = try_construct_aligned::<Block, _>(|| Err("bad input"));
        assert_eq!(result, Err("bad input"));
    }

    #[test]
    fn test_panicking_initializer_propagates() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            construct_aligned::<Block>(|| panic!("constructor exploded"))
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_zeroed_construction() {
        #[derive(Clone, Copy, Zeroable)]
        #[repr(C, align(32))]
        struct Lanes([u32; 8]);

        let p = construct_zeroed_in::<Lanes, Aligned, _>(&SystemHeap);
        assert!(is_aligned(p.as_ptr(), 32));
        unsafe {
            assert_eq!(p.as_ref().0, [0; 8]);
            destruct_in::<Lanes, Aligned, _>(&SystemHeap, p);
        }
    }
}
