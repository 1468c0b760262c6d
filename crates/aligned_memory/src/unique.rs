//! # Exclusive Handles
//!
//! [`Unique`] owns one heap value on a fixed route. Dropping it runs the
//! full teardown: drop in place, then release through the same route.
//!
//! Two aliases cover the common cases:
//!
//! - [`AlignedBox`] always takes the aligned path.
//! - [`Exclusive`] takes the aligned path only when the type needs it.

// SAFETY: Unique is an owning raw pointer; Send/Sync mirror Box.
#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use bytemuck::Zeroable;

use crate::error::AllocResult;
use crate::heap::{Heap, SystemHeap};
use crate::lifecycle;
use crate::route::{Aligned, Auto, Route};

/// Exclusively owned heap value allocated through route `R` on heap `H`.
pub struct Unique<T, R: Route = Auto, H: Heap = SystemHeap> {
    ptr: NonNull<T>,
    heap: H,
    _marker: PhantomData<(T, R)>,
}

/// Exclusive handle that always uses the aligned path.
pub type AlignedBox<T, H = SystemHeap> = Unique<T, Aligned, H>;

/// Exclusive handle routed by the type's alignment class.
pub type Exclusive<T, H = SystemHeap> = Unique<T, Auto, H>;

impl<T, R: Route> Unique<T, R> {
    /// Moves `value` into a new allocation on the system heap.
    ///
    /// # Panics
    ///
    /// Allocation failure is fatal (see [`std::alloc::handle_alloc_error`]).
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::new_in(value, SystemHeap)
    }

    /// Allocates first, then constructs the value in place with `init`.
    ///
    /// If `init` panics the allocation is released before unwinding
    /// continues.
    #[must_use]
    pub fn new_with(init: impl FnOnce() -> T) -> Self {
        Self::new_with_in(init, SystemHeap)
    }

    /// Like [`Unique::new_with`], for initializers that can fail.
    ///
    /// # Errors
    ///
    /// Returns the initializer's error after the allocation is released.
    pub fn try_new_with<E>(init: impl FnOnce() -> Result<T, E>) -> Result<Self, E> {
        Self::try_new_with_in(init, SystemHeap)
    }

    /// Moves `value` into a new allocation, reporting exhaustion instead of
    /// aborting.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::OutOfMemory`](crate::AllocError::OutOfMemory)
    /// if the heap cannot satisfy the request. `value` is dropped.
    pub fn try_new(value: T) -> AllocResult<Self> {
        Self::try_new_in(value, SystemHeap)
    }

    /// Reclaims a pointer produced by [`Unique::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `into_raw` on a handle with the same `T` and
    /// `R`, and must not be owned by anything else.
    #[must_use]
    pub unsafe fn from_raw(ptr: NonNull<T>) -> Self {
        // SAFETY: guaranteed by the caller.
        unsafe { Self::from_raw_in(ptr, SystemHeap) }
    }

    /// Gives up ownership without dropping the value or releasing the
    /// block.
    ///
    /// For [`AlignedBox`] the pointer can be passed to
    /// [`destruct_aligned`](crate::destruct_aligned).
    #[must_use]
    pub fn into_raw(this: Self) -> NonNull<T> {
        Self::into_raw_parts(this).0
    }
}

impl<T: Zeroable, R: Route> Unique<T, R> {
    /// Allocates a value whose bytes are all zero, without building it on
    /// the stack first.
    #[must_use]
    pub fn zeroed() -> Self {
        Self::zeroed_in(SystemHeap)
    }
}

impl<T, R: Route, H: Heap> Unique<T, R, H> {
    /// Moves `value` into a new allocation on `heap`.
    #[must_use]
    pub fn new_in(value: T, heap: H) -> Self {
        Self::new_with_in(|| value, heap)
    }

    /// [`Unique::new_with`] on `heap`.
    #[must_use]
    pub fn new_with_in(init: impl FnOnce() -> T, heap: H) -> Self {
        let ptr = lifecycle::construct_in::<T, R, H, _>(&heap, init);
        // SAFETY: freshly constructed on this heap through route R.
        unsafe { Self::from_raw_in(ptr, heap) }
    }

    /// [`Unique::try_new_with`] on `heap`.
    ///
    /// # Errors
    ///
    /// Returns the initializer's error after the allocation is released.
    pub fn try_new_with_in<E>(init: impl FnOnce() -> Result<T, E>, heap: H) -> Result<Self, E> {
        let ptr = lifecycle::try_construct_in::<T, E, R, H, _>(&heap, init)?;
        // SAFETY: freshly constructed on this heap through route R.
        Ok(unsafe { Self::from_raw_in(ptr, heap) })
    }

    /// [`Unique::try_new`] on `heap`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::OutOfMemory`](crate::AllocError::OutOfMemory)
    /// if `heap` cannot satisfy the request.
    pub fn try_new_in(value: T, heap: H) -> AllocResult<Self> {
        let ptr = lifecycle::try_place_in::<T, R, H>(&heap, value)?;
        // SAFETY: freshly constructed on this heap through route R.
        Ok(unsafe { Self::from_raw_in(ptr, heap) })
    }

    /// [`Unique::zeroed`] on `heap`.
    #[must_use]
    pub fn zeroed_in(heap: H) -> Self
    where
        T: Zeroable,
    {
        let ptr = lifecycle::construct_zeroed_in::<T, R, H>(&heap);
        // SAFETY: freshly constructed on this heap through route R.
        unsafe { Self::from_raw_in(ptr, heap) }
    }

    /// Takes ownership of a value living in a block from `heap`.
    ///
    /// # Safety
    ///
    /// `ptr` must hold an initialized `T` in storage allocated through route
    /// `R` on `heap`, and nothing else may own it.
    #[must_use]
    pub unsafe fn from_raw_in(ptr: NonNull<T>, heap: H) -> Self {
        Self {
            ptr,
            heap,
            _marker: PhantomData,
        }
    }

    /// Gives up ownership, returning the pointer and the heap it belongs to.
    #[must_use]
    pub fn into_raw_parts(this: Self) -> (NonNull<T>, H) {
        let this = ManuallyDrop::new(this);
        // SAFETY: `this` is never dropped, so the heap is moved out once.
        let heap = unsafe { ptr::read(&this.heap) };
        (this.ptr, heap)
    }

    /// Returns a raw pointer to the value.
    #[inline]
    #[must_use]
    pub fn as_ptr(this: &Self) -> *const T {
        this.ptr.as_ptr()
    }

    /// Returns the heap that owns the allocation.
    #[inline]
    #[must_use]
    pub fn heap(this: &Self) -> &H {
        &this.heap
    }
}

impl<T, R: Route, H: Heap> Drop for Unique<T, R, H> {
    fn drop(&mut self) {
        // SAFETY: `ptr` was constructed through route R on `self.heap` and
        // is dropped exactly once, here.
        unsafe { lifecycle::destruct_in::<T, R, H>(&self.heap, self.ptr) }
    }
}

impl<T, R: Route, H: Heap> Deref for Unique<T, R, H> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: the value is initialized and owned by this handle.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T, R: Route, H: Heap> DerefMut for Unique<T, R, H> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the value is initialized and exclusively owned.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T, R: Route, H: Heap> AsRef<T> for Unique<T, R, H> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T, R: Route, H: Heap> AsMut<T> for Unique<T, R, H> {
    fn as_mut(&mut self) -> &mut T {
        self
    }
}

impl<T: fmt::Debug, R: Route, H: Heap> fmt::Debug for Unique<T, R, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: Default, R: Route> Default for Unique<T, R> {
    fn default() -> Self {
        Self::new_with(T::default)
    }
}

// SAFETY: Unique owns its T like Box does; the heap travels with it.
unsafe impl<T: Send, R: Route, H: Heap + Send> Send for Unique<T, R, H> {}

// SAFETY: shared access only hands out &T and &H.
unsafe impl<T: Sync, R: Route, H: Heap + Sync> Sync for Unique<T, R, H> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::is_aligned;

    #[derive(Debug, Default, PartialEq, Clone, Copy, Zeroable)]
    #[repr(C, align(64))]
    struct Mat4 {
        m: [f32; 16],
    }

    #[test]
    fn test_aligned_box_alignment() {
        let b = AlignedBox::new(Mat4 { m: [2.0; 16] });
        assert!(is_aligned(Unique::as_ptr(&b), 64));
        assert_eq!(b.m[7], 2.0);
    }

    #[test]
    fn test_aligned_box_for_small_type() {
        let b = AlignedBox::new(7u8);
        assert_eq!(*b, 7);
    }

    #[test]
    fn test_exclusive_mutation() {
        let mut e = Exclusive::new(Mat4::default());
        e.m[0] = 9.0;
        assert_eq!(e.m[0], 9.0);
        assert!(is_aligned(Unique::as_ptr(&e), 64));
    }

    #[test]
    fn test_zeroed() {
        let z = AlignedBox::<Mat4>::zeroed();
        assert_eq!(*z, Mat4::default());
    }

    #[test]
    fn test_try_new_with_error() {
        let r = Exclusive::<Mat4>::try_new_with(|| Err::<Mat4, _>(42));
        assert_eq!(r.unwrap_err(), 42);
    }

    #[test]
    fn test_into_raw_then_destruct_aligned() {
        let b = AlignedBox::new(Mat4::default());
        let raw = Unique::into_raw(b);
        unsafe { crate::lifecycle::destruct_aligned(raw.as_ptr()) };
    }

    #[test]
    fn test_into_raw_then_from_raw() {
        let b = Exclusive::new(String::from("voxel"));
        let raw = Unique::into_raw(b);
        let b = unsafe { Exclusive::<String>::from_raw(raw) };
        assert_eq!(b.as_str(), "voxel");
    }

    #[test]
    fn test_zero_sized_value() {
        let b = AlignedBox::new(());
        assert_eq!(Unique::as_ptr(&b), NonNull::<()>::dangling().as_ptr().cast_const());
    }

    #[test]
    fn test_debug_forwards_to_value() {
        let b = Exclusive::new(5u32);
        assert_eq!(format!("{b:?}"), "5");
    }
}
