//! Per-thread allocation counting.
//!
//! Install [`CountingAllocator`] as the global allocator in a benchmark
//! binary to get non-zero allocation figures from [`WallClockAdapter`]:
//!
//! ```ignore
//! #[global_allocator]
//! static ALLOC: scalebench::alloc::CountingAllocator = scalebench::alloc::CountingAllocator;
//! ```
//!
//! Counters are kept per thread, so a snapshot pair taken on one execution
//! unit only sees that unit's allocations even while other units run.
//!
//! [`WallClockAdapter`]: crate::adapter::WallClockAdapter

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

thread_local! {
    static ALLOCATIONS: Cell<u64> = const { Cell::new(0) };
    static BYTES_ALLOCATED: Cell<u64> = const { Cell::new(0) };
}

/// Forwards to the system allocator and counts every allocation.
pub struct CountingAllocator;

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        System.alloc_zeroed(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        record(new_size);
        System.realloc(ptr, layout, new_size)
    }
}

// `try_with` because allocations still happen while thread-locals are torn down.
fn record(size: usize) {
    let _ = ALLOCATIONS.try_with(|n| n.set(n.get().wrapping_add(1)));
    let _ = BYTES_ALLOCATED.try_with(|n| n.set(n.get().wrapping_add(size as u64)));
}

/// Counter values at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocSnapshot {
    pub allocations: u64,
    pub bytes: u64,
}

impl AllocSnapshot {
    /// Counters of the calling thread.
    pub fn capture() -> Self {
        Self {
            allocations: ALLOCATIONS.try_with(Cell::get).unwrap_or_default(),
            bytes: BYTES_ALLOCATED.try_with(Cell::get).unwrap_or_default(),
        }
    }

    /// `(allocations, bytes)` since `earlier`.
    pub fn since(&self, earlier: &AllocSnapshot) -> (i64, i64) {
        (
            self.allocations.wrapping_sub(earlier.allocations) as i64,
            self.bytes.wrapping_sub(earlier.bytes) as i64,
        )
    }
}
