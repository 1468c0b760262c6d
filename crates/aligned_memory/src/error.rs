//! # Allocation Error Types
//!
//! Errors surfaced by the recoverable allocation surface. The raw primitives
//! report failure through a null pointer instead, and the construct/make
//! helpers treat allocation failure as fatal.

use thiserror::Error;

/// Errors that can occur while acquiring aligned storage.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The allocator could not satisfy the request.
    #[error("out of memory: failed to allocate {size} bytes aligned to {align}")]
    OutOfMemory {
        /// Requested size in bytes.
        size: usize,
        /// Requested alignment in bytes.
        align: usize,
    },

    /// `element_size * count` does not fit in `usize`.
    #[error("layout overflow: {count} elements of {element_size} bytes")]
    LayoutOverflow {
        /// Size of one element in bytes.
        element_size: usize,
        /// Number of elements requested.
        count: usize,
    },
}

/// Result type for allocation operations.
pub type AllocResult<T> = Result<T, AllocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let oom = AllocError::OutOfMemory { size: 64, align: 32 };
        assert_eq!(
            oom.to_string(),
            "out of memory: failed to allocate 64 bytes aligned to 32"
        );

        let overflow = AllocError::LayoutOverflow {
            element_size: 8,
            count: usize::MAX,
        };
        assert!(overflow.to_string().starts_with("layout overflow"));
    }
}
