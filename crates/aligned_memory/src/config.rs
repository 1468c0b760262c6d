//! # Allocator Configuration
//!
//! The minimum alignment the default allocation path guarantees is fixed at
//! build time. Types whose natural alignment exceeds it are routed through
//! the aligned path.
//!
//! ## Selecting the value
//!
//! ```text
//! feature min-align-32  ->  32
//! feature min-align-16  ->  16
//! feature min-align-8   ->   8
//! (none, 64-bit target) ->  16
//! (none, other)         ->   8
//! ```
//!
//! When several features are enabled the largest wins, so a dependency can
//! only ever make the classification more conservative.

/// Minimum alignment, in bytes, guaranteed by the default allocation path.
pub const MIN_ALIGNMENT: usize = if cfg!(feature = "min-align-32") {
    32
} else if cfg!(feature = "min-align-16") {
    16
} else if cfg!(feature = "min-align-8") {
    8
} else if cfg!(target_pointer_width = "64") {
    16
} else {
    8
};

const _: () = assert!(MIN_ALIGNMENT.is_power_of_two(), "MIN_ALIGNMENT must be a power of two");
