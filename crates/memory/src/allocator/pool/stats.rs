//! Pool allocator statistics
//!
//! Counters live in `Cell`s: the pool is single-threaded and is shared by
//! reference between the lists that draw from it.

use core::cell::Cell;

/// Snapshot of pool allocator statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total successful `allocate` calls
    pub total_allocs: u64,
    /// Total successful `deallocate` calls
    pub total_deallocs: u64,
    /// Allocations served from a free pool
    pub reuse_hits: u64,
    /// Allocations that went to the system heap
    pub system_allocs: u64,
    /// Bytes currently handed out
    pub current_usage: usize,
    /// Highest value `current_usage` has reached
    pub peak_usage: usize,
    /// Blocks currently handed out
    pub allocated_blocks: usize,
    /// Blocks waiting in free pools
    pub free_blocks: usize,
    /// Distinct layouts with a free pool
    pub size_classes: usize,
}

impl PoolStats {
    /// Fraction of allocations served by reuse, in `0.0..=1.0`
    pub fn reuse_ratio(&self) -> f64 {
        if self.total_allocs == 0 {
            0.0
        } else {
            self.reuse_hits as f64 / self.total_allocs as f64
        }
    }
}

/// Running counters behind [`PoolStats`]
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    total_allocs: Cell<u64>,
    total_deallocs: Cell<u64>,
    reuse_hits: Cell<u64>,
    system_allocs: Cell<u64>,
    peak_usage: Cell<usize>,
}

impl PoolCounters {
    pub(crate) fn record_alloc(&self, reused: bool, current_usage: usize) {
        bump(&self.total_allocs);
        if reused {
            bump(&self.reuse_hits);
        } else {
            bump(&self.system_allocs);
        }
        if current_usage > self.peak_usage.get() {
            self.peak_usage.set(current_usage);
        }
    }

    pub(crate) fn record_dealloc(&self) {
        bump(&self.total_deallocs);
    }

    pub(crate) fn reset(&self, current_usage: usize) {
        self.total_allocs.set(0);
        self.total_deallocs.set(0);
        self.reuse_hits.set(0);
        self.system_allocs.set(0);
        self.peak_usage.set(current_usage);
    }

    pub(crate) fn snapshot(
        &self,
        current_usage: usize,
        allocated_blocks: usize,
        free_blocks: usize,
        size_classes: usize,
    ) -> PoolStats {
        PoolStats {
            total_allocs: self.total_allocs.get(),
            total_deallocs: self.total_deallocs.get(),
            reuse_hits: self.reuse_hits.get(),
            system_allocs: self.system_allocs.get(),
            current_usage,
            peak_usage: self.peak_usage.get(),
            allocated_blocks,
            free_blocks,
            size_classes,
        }
    }
}

#[inline]
fn bump(counter: &Cell<u64>) {
    counter.set(counter.get() + 1);
}
