//! # Factories
//!
//! One call site per ownership model, whatever the type's alignment:
//!
//! ```rust,ignore
//! #[repr(C, align(64))]
//! struct Simd([f32; 16]);
//!
//! let a = make_exclusive(Simd([0.0; 16])); // aligned path
//! let b = make_exclusive(42u32);           // default path
//! let c = make_shared(Simd([1.0; 16]));    // aligned path, shared
//! ```
//!
//! The `*_aligned` factories force the aligned path for any type. The `_in`
//! variants take an explicit [`Heap`].

use crate::heap::Heap;
use crate::shared::{AlignedShared, Shared, SharedBox};
use crate::unique::{AlignedBox, Exclusive, Unique};

/// Exclusive handle on the aligned path.
#[must_use]
pub fn make_exclusive_aligned<T>(value: T) -> AlignedBox<T> {
    AlignedBox::new(value)
}

/// Shared handle on the aligned path.
#[must_use]
pub fn make_shared_aligned<T>(value: T) -> AlignedShared<T> {
    AlignedShared::new(value)
}

/// Exclusive handle, aligned path only if `T` requires custom alignment.
#[must_use]
pub fn make_exclusive<T>(value: T) -> Exclusive<T> {
    Exclusive::new(value)
}

/// Shared handle, aligned path only if `T` requires custom alignment.
#[must_use]
pub fn make_shared<T>(value: T) -> Shared<T> {
    Shared::new(value)
}

/// [`make_exclusive_aligned`] on `heap`.
#[must_use]
pub fn make_exclusive_aligned_in<T, H: Heap>(value: T, heap: H) -> AlignedBox<T, H> {
    Unique::new_in(value, heap)
}

/// [`make_shared_aligned`] on `heap`.
#[must_use]
pub fn make_shared_aligned_in<T, H: Heap>(value: T, heap: H) -> AlignedShared<T, H> {
    SharedBox::new_in(value, heap)
}

/// [`make_exclusive`] on `heap`.
#[must_use]
pub fn make_exclusive_in<T, H: Heap>(value: T, heap: H) -> Exclusive<T, H> {
    Unique::new_in(value, heap)
}

/// [`make_shared`] on `heap`.
#[must_use]
pub fn make_shared_in<T, H: Heap>(value: T, heap: H) -> Shared<T, H> {
    SharedBox::new_in(value, heap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::SystemHeap;
    use crate::raw::is_aligned;

    #[allow(dead_code)]
    #[repr(C, align(64))]
    struct Simd([f32; 16]);

    #[test]
    fn test_generic_call_site() {
        let a = make_exclusive(Simd([0.0; 16]));
        let b = make_exclusive(42u32);
        let c = make_shared(Simd([1.0; 16]));
        let d = make_shared(String::from("grass"));

        assert!(is_aligned(Unique::as_ptr(&a), 64));
        assert_eq!(*b, 42);
        assert!(is_aligned(SharedBox::as_ptr(&c), 64));
        assert_eq!(d.len(), 5);
    }

    #[test]
    fn test_forced_aligned_factories() {
        let a = make_exclusive_aligned(1u16);
        let s = make_shared_aligned(2u16);
        assert_eq!(*a + *s, 3);

        let a = make_exclusive_aligned_in(Simd([3.0; 16]), SystemHeap);
        assert_eq!(a.0[0], 3.0);
    }
}
