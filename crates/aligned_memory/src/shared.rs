//! # Shared Handles
//!
//! [`SharedBox`] is a reference-counted [`Unique`]. Clones share one value;
//! the last clone to go runs the teardown through the value's route.
//!
//! ```text
//! SharedBox ─┐
//! SharedBox ─┼─► Arc ─► Unique<T, R, H> ─► block (route R)
//! SharedBox ─┘
//! ```
//!
//! The count lives in its own allocation, so the value's block keeps the
//! exact size and alignment its route asked for.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use bytemuck::Zeroable;

use crate::error::AllocResult;
use crate::heap::{Heap, SystemHeap};
use crate::route::{Aligned, Auto, Route};
use crate::unique::Unique;

/// Shared-ownership heap value allocated through route `R` on heap `H`.
pub struct SharedBox<T, R: Route = Auto, H: Heap = SystemHeap> {
    inner: Arc<Unique<T, R, H>>,
}

/// Shared handle that always uses the aligned path.
pub type AlignedShared<T, H = SystemHeap> = SharedBox<T, Aligned, H>;

/// Shared handle routed by the type's alignment class.
pub type Shared<T, H = SystemHeap> = SharedBox<T, Auto, H>;

impl<T, R: Route> SharedBox<T, R> {
    /// Moves `value` into a new shared allocation on the system heap.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::from(Unique::<T, R>::new(value))
    }

    /// Allocates first, then constructs the value in place with `init`.
    #[must_use]
    pub fn new_with(init: impl FnOnce() -> T) -> Self {
        Self::from(Unique::<T, R>::new_with(init))
    }

    /// Like [`SharedBox::new_with`], for initializers that can fail.
    ///
    /// # Errors
    ///
    /// Returns the initializer's error after the allocation is released.
    pub fn try_new_with<E>(init: impl FnOnce() -> Result<T, E>) -> Result<Self, E> {
        Unique::<T, R>::try_new_with(init).map(Self::from)
    }

    /// Moves `value` into a new allocation, reporting exhaustion instead of
    /// aborting.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::OutOfMemory`](crate::AllocError::OutOfMemory)
    /// if the heap cannot satisfy the request.
    pub fn try_new(value: T) -> AllocResult<Self> {
        Unique::<T, R>::try_new(value).map(Self::from)
    }
}

impl<T: Zeroable, R: Route> SharedBox<T, R> {
    /// Allocates a shared value whose bytes are all zero.
    #[must_use]
    pub fn zeroed() -> Self {
        Self::from(Unique::<T, R>::zeroed())
    }
}

impl<T, R: Route, H: Heap> SharedBox<T, R, H> {
    /// Moves `value` into a new shared allocation on `heap`.
    #[must_use]
    pub fn new_in(value: T, heap: H) -> Self {
        Self::from(Unique::<T, R, H>::new_in(value, heap))
    }

    /// [`SharedBox::new_with`] on `heap`.
    #[must_use]
    pub fn new_with_in(init: impl FnOnce() -> T, heap: H) -> Self {
        Self::from(Unique::<T, R, H>::new_with_in(init, heap))
    }

    /// Number of handles sharing the value.
    #[must_use]
    pub fn strong_count(this: &Self) -> usize {
        Arc::strong_count(&this.inner)
    }

    /// Returns `true` if both handles share the same value.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }

    /// Returns a raw pointer to the value.
    #[must_use]
    pub fn as_ptr(this: &Self) -> *const T {
        Unique::as_ptr(&*this.inner)
    }

    /// Returns the exclusive handle if this is the only owner.
    ///
    /// # Errors
    ///
    /// Gives the shared handle back when other owners exist.
    pub fn try_unwrap(this: Self) -> Result<Unique<T, R, H>, Self> {
        Arc::try_unwrap(this.inner).map_err(|inner| Self { inner })
    }
}

impl<T, R: Route, H: Heap> From<Unique<T, R, H>> for SharedBox<T, R, H> {
    fn from(unique: Unique<T, R, H>) -> Self {
        Self {
            inner: Arc::new(unique),
        }
    }
}

impl<T, R: Route, H: Heap> Clone for SharedBox<T, R, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, R: Route, H: Heap> Deref for SharedBox<T, R, H> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T, R: Route, H: Heap> AsRef<T> for SharedBox<T, R, H> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T: fmt::Debug, R: Route, H: Heap> fmt::Debug for SharedBox<T, R, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
