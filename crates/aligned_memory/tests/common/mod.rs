//! Counting heap shared by the integration tests.

#![allow(dead_code)]
#![allow(unsafe_code)]

use std::alloc::Layout;
use std::collections::HashSet;
use std::sync::Arc;

use aligned_memory::{Heap, SystemHeap};
use parking_lot::Mutex;

/// One call into the heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    AllocateDefault { size: usize, align: usize },
    FreeDefault { size: usize, align: usize },
    AllocateAligned { size: usize, align: usize },
    FreeAligned,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    live: HashSet<usize>,
    exhausted: bool,
}

/// Heap double that records every call and forwards to [`SystemHeap`].
///
/// Releasing an address that is not live panics, so a double free or a
/// block freed on the wrong path fails the test.
#[derive(Clone, Default)]
pub struct CountingHeap {
    state: Arc<Mutex<State>>,
}

impl CountingHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A heap whose every allocation fails.
    pub fn exhausted() -> Self {
        let heap = Self::default();
        heap.state.lock().exhausted = true;
        heap
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn default_allocs(&self) -> usize {
        self.count(|c| matches!(c, Call::AllocateDefault { .. }))
    }

    pub fn default_frees(&self) -> usize {
        self.count(|c| matches!(c, Call::FreeDefault { .. }))
    }

    pub fn aligned_allocs(&self) -> usize {
        self.count(|c| matches!(c, Call::AllocateAligned { .. }))
    }

    pub fn aligned_frees(&self) -> usize {
        self.count(|c| matches!(c, Call::FreeAligned))
    }

    pub fn live_blocks(&self) -> usize {
        self.state.lock().live.len()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn track_alloc(&self, call: Call, ptr: *mut u8) -> *mut u8 {
        let mut state = self.state.lock();
        state.calls.push(call);
        if !ptr.is_null() {
            state.live.insert(ptr as usize);
        }
        ptr
    }

    fn track_free(&self, call: Call, ptr: *mut u8) {
        let mut state = self.state.lock();
        state.calls.push(call);
        assert!(
            state.live.remove(&(ptr as usize)),
            "released a block that is not live: {ptr:p}"
        );
    }
}

unsafe impl Heap for CountingHeap {
    unsafe fn allocate_default(&self, layout: Layout) -> *mut u8 {
        let call = Call::AllocateDefault {
            size: layout.size(),
            align: layout.align(),
        };
        if self.state.lock().exhausted {
            return self.track_alloc(call, std::ptr::null_mut());
        }
        let ptr = unsafe { SystemHeap.allocate_default(layout) };
        self.track_alloc(call, ptr)
    }

    unsafe fn free_default(&self, ptr: *mut u8, layout: Layout) {
        self.track_free(
            Call::FreeDefault {
                size: layout.size(),
                align: layout.align(),
            },
            ptr,
        );
        unsafe { SystemHeap.free_default(ptr, layout) }
    }

    fn allocate_aligned(&self, size: usize, align: usize) -> *mut u8 {
        let call = Call::AllocateAligned { size, align };
        if self.state.lock().exhausted {
            return self.track_alloc(call, std::ptr::null_mut());
        }
        self.track_alloc(call, SystemHeap.allocate_aligned(size, align))
    }

    unsafe fn free_aligned(&self, ptr: *mut u8) {
        self.track_free(Call::FreeAligned, ptr);
        unsafe { SystemHeap.free_aligned(ptr) }
    }
}
