//! # Aligned Memory
//!
//! Alignment-aware allocation for engine data that must sit on wide
//! boundaries: SIMD lanes, cache-line padded state, GPU upload staging.
//!
//! ## Layers
//!
//! ```text
//! make_exclusive / make_shared          one call site for every type
//!        │
//! Unique / SharedBox<T, Route, Heap>    owning handles, teardown on drop
//!        │
//! construct_aligned / destruct_aligned  two-phase lifecycle on raw blocks
//!        │
//! allocate_aligned / free_aligned       platform primitive, null on failure
//! ```
//!
//! ## Rules
//!
//! 1. **A block goes back the way it came** - the route is part of the
//!    handle type, so aligned blocks are only released on the aligned path.
//! 2. **Over-alignment is decided at compile time** - a type takes the
//!    aligned path iff its alignment exceeds [`MIN_ALIGNMENT`].
//! 3. **No leaks on failure** - storage acquired for a value that never got
//!    built is released before the failure reaches the caller.
//!
//! ## Example
//!
//! ```rust,ignore
//! use aligned_memory::{make_exclusive, make_shared, requires_custom_alignment};
//!
//! #[repr(C, align(64))]
//! struct Particles { x: [f32; 16] }
//!
//! assert!(requires_custom_alignment::<Particles>());
//! let owned = make_exclusive(Particles { x: [0.0; 16] });
//! let shared = make_shared(Particles { x: [1.0; 16] });
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod class;
pub mod config;
pub mod error;
pub mod heap;
pub mod lifecycle;
pub mod make;
pub mod raw;
pub mod route;
pub mod shared;
pub mod unique;

#[cfg_attr(unix, path = "platform/posix.rs")]
#[cfg_attr(windows, path = "platform/windows.rs")]
#[cfg_attr(not(any(unix, windows)), path = "platform/fallback.rs")]
mod platform;

// The portable backend is exercised on every target.
#[cfg(all(test, any(unix, windows)))]
#[path = "platform/fallback.rs"]
mod fallback_platform;

pub use class::{requires_custom_alignment, AlignmentClass};
pub use config::MIN_ALIGNMENT;
pub use error::{AllocError, AllocResult};
pub use heap::{Heap, SystemHeap};
pub use lifecycle::{
    construct_aligned, construct_aligned_in, destruct_aligned, destruct_aligned_in,
    try_construct_aligned, try_construct_aligned_in,
};
pub use make::{
    make_exclusive, make_exclusive_aligned, make_exclusive_aligned_in, make_exclusive_in,
    make_shared, make_shared_aligned, make_shared_aligned_in, make_shared_in,
};
pub use raw::{allocate_aligned, allocate_aligned_for, free_aligned, is_aligned};
pub use route::{Aligned, Auto, Natural, Route};
pub use shared::{AlignedShared, Shared, SharedBox};
pub use unique::{AlignedBox, Exclusive, Unique};
