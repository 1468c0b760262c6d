//! # Alignment Classification
//!
//! Splits types into two classes, decided once per type at compile time:
//!
//! ```text
//! align_of::<T>() <= MIN_ALIGNMENT   ->  default-alignment-safe
//! align_of::<T>() >  MIN_ALIGNMENT   ->  requires custom alignment
//! ```
//!
//! The class selects the allocation path of the [`Auto`](crate::route::Auto)
//! route.

use std::mem;

use crate::config::MIN_ALIGNMENT;

/// Returns `true` if `T`'s natural alignment exceeds [`MIN_ALIGNMENT`].
#[inline]
#[must_use]
pub const fn requires_custom_alignment<T>() -> bool {
    mem::align_of::<T>() > MIN_ALIGNMENT
}

/// Static alignment facts about a type.
///
/// Implemented for every sized type; the constants are evaluated per
/// monomorphization, so branching on them costs nothing at runtime.
pub trait AlignmentClass: Sized {
    /// The type's natural alignment in bytes.
    const NATURAL_ALIGNMENT: usize;

    /// Whether values of this type must take the aligned allocation path.
    const REQUIRES_CUSTOM_ALIGNMENT: bool;
}

impl<T> AlignmentClass for T {
    const NATURAL_ALIGNMENT: usize = mem::align_of::<T>();
    const REQUIRES_CUSTOM_ALIGNMENT: bool = requires_custom_alignment::<T>();
}
