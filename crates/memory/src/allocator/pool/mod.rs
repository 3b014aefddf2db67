//! Size-classed pool allocator
//!
//! The pool hands out blocks obtained from the system heap and keeps every
//! block it ever obtained until it is dropped. Released blocks are parked in
//! a free pool keyed by their exact [`Layout`] and handed out again, most
//! recently released first, to the next request with the same layout.
//!
//! # Bookkeeping
//! ```text
//! allocated:  addr -> layout            (blocks owned by callers)
//! free:       layout -> [addr, addr, ..] (LIFO stack per size class)
//! ```
//!
//! An address lives in exactly one of the two maps. Releasing an address
//! that is not in `allocated` (a double release or a foreign pointer) is
//! rejected and leaves both maps untouched.
//!
//! # Use Cases
//! - Node storage for linked containers that churn through equal-sized nodes
//! - Several containers sharing one recycling memory source

mod config;
mod stats;

use core::alloc::{GlobalAlloc, Layout};
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ptr::{self, NonNull};
use std::alloc::System;

use hashbrown::HashMap;
#[cfg(feature = "logging")]
use tracing::{debug, trace};

pub use config::PoolConfig;
pub use stats::PoolStats;
use stats::PoolCounters;

use super::{AllocError, AllocResult, Allocator, MemoryUsage};

/// Recycling allocator with one LIFO free pool per layout
///
/// Interior mutability lets any number of containers share one pool through
/// `&PoolAllocator`. The pool is `!Sync`; it is meant for one thread.
///
/// # Example
/// ```
/// use core::alloc::Layout;
/// use pool_memory::allocator::{Allocator, PoolAllocator};
///
/// let pool = PoolAllocator::new();
/// let layout = Layout::from_size_align(100, 8).unwrap();
///
/// let first = pool.allocate(layout).unwrap();
/// unsafe { pool.deallocate(first.cast(), layout).unwrap() };
///
/// // The released block is handed out again
/// let second = pool.allocate(layout).unwrap();
/// assert_eq!(first.cast::<u8>(), second.cast::<u8>());
/// # unsafe { pool.deallocate(second.cast(), layout).unwrap() };
/// ```
pub struct PoolAllocator {
    /// Blocks currently owned by callers
    allocated: RefCell<HashMap<NonNull<u8>, Layout>>,

    /// Released blocks, most recent last
    free: RefCell<HashMap<Layout, Vec<NonNull<u8>>>>,

    /// Sum of requested sizes over `allocated`
    allocated_bytes: Cell<usize>,

    /// Block and byte totals over `free`
    free_blocks: Cell<usize>,
    free_bytes: Cell<usize>,

    config: PoolConfig,
    counters: PoolCounters,
}

impl PoolAllocator {
    /// Creates an empty pool with default configuration
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Creates an empty pool with custom configuration
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            allocated: RefCell::new(HashMap::new()),
            free: RefCell::new(HashMap::new()),
            allocated_bytes: Cell::new(0),
            free_blocks: Cell::new(0),
            free_bytes: Cell::new(0),
            config,
            counters: PoolCounters::default(),
        }
    }

    /// Creates a pool with production config
    pub fn production() -> Self {
        Self::with_config(PoolConfig::production())
    }

    /// Creates a pool with debug config
    pub fn debug() -> Self {
        Self::with_config(PoolConfig::debug())
    }

    /// Returns the active configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of blocks currently handed out
    pub fn allocated_count(&self) -> usize {
        self.allocated.borrow().len()
    }

    /// Bytes currently handed out (sum of requested sizes)
    pub fn total_allocated(&self) -> usize {
        self.allocated_bytes.get()
    }

    /// Number of blocks waiting in free pools
    pub fn free_count(&self) -> usize {
        self.free_blocks.get()
    }

    /// Bytes waiting in free pools (sum of requested sizes)
    pub fn free_bytes(&self) -> usize {
        self.free_bytes.get()
    }

    /// Number of layouts that currently have at least one free block
    pub fn size_class_count(&self) -> usize {
        self.free
            .borrow()
            .values()
            .filter(|blocks| !blocks.is_empty())
            .count()
    }

    /// Checks if `ptr` is a block this pool has currently handed out
    pub fn owns(&self, ptr: *const u8) -> bool {
        NonNull::new(ptr.cast_mut()).is_some_and(|ptr| self.allocated.borrow().contains_key(&ptr))
    }

    /// Identity comparison: two handles are interchangeable only if they
    /// refer to the same pool
    pub fn is_same(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }

    /// Get statistics (if tracking is enabled)
    pub fn stats(&self) -> Option<PoolStats> {
        if !self.config.track_stats {
            return None;
        }

        Some(self.counters.snapshot(
            self.total_allocated(),
            self.allocated_count(),
            self.free_count(),
            self.size_class_count(),
        ))
    }

    /// Zeroes the running counters; the peak restarts at current usage
    pub fn reset_statistics(&self) {
        self.counters.reset(self.total_allocated());
    }

    /// Pops the most recently released block of exactly `layout`
    fn take_free(&self, layout: Layout) -> Option<NonNull<u8>> {
        let ptr = self.free.borrow_mut().get_mut(&layout)?.pop()?;
        self.free_blocks.set(self.free_blocks.get() - 1);
        self.free_bytes.set(self.free_bytes.get() - layout.size());
        Some(ptr)
    }

    /// Requests a fresh block from the system heap
    fn obtain_from_system(layout: Layout) -> AllocResult<NonNull<u8>> {
        let backing = backing_layout(layout)?;
        let ptr = unsafe { System.alloc(backing) };
        NonNull::new(ptr).ok_or_else(|| AllocError::allocation_failed_with_layout(layout))
    }
}

/// Layout actually requested from the system for a block of `layout`
///
/// Zero-sized requests are backed by one byte so every block has its own
/// address.
fn backing_layout(layout: Layout) -> AllocResult<Layout> {
    if layout.size() != 0 {
        return Ok(layout);
    }
    Layout::from_size_align(1, layout.align())
        .map_err(|_| AllocError::allocation_failed_with_layout(layout))
}

impl Default for PoolAllocator {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl Allocator for PoolAllocator {
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        // Make room in the bookkeeping first so a failure leaves nothing half-done
        self.allocated
            .borrow_mut()
            .try_reserve(1)
            .map_err(|_| AllocError::allocation_failed_with_layout(layout))?;

        let (ptr, reused) = match self.take_free(layout) {
            Some(ptr) => (ptr, true),
            None => (Self::obtain_from_system(layout)?, false),
        };

        if let Some(pattern) = self.config.alloc_pattern {
            unsafe { ptr::write_bytes(ptr.as_ptr(), pattern, layout.size()) };
        }

        self.allocated.borrow_mut().insert(ptr, layout);
        self.allocated_bytes
            .set(self.allocated_bytes.get() + layout.size());

        if self.config.track_stats {
            self.counters.record_alloc(reused, self.allocated_bytes.get());
        }

        #[cfg(feature = "logging")]
        trace!(
            size = layout.size(),
            align = layout.align(),
            reused,
            "pool allocate"
        );

        Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) -> AllocResult<()> {
        {
            let mut allocated = self.allocated.borrow_mut();
            match allocated.get(&ptr).copied() {
                None => return Err(AllocError::invalid_release(ptr.addr().get())),
                Some(recorded) if recorded != layout => {
                    return Err(AllocError::layout_mismatch(recorded, layout));
                },
                Some(_) => {
                    allocated.remove(&ptr);
                },
            }
        }

        if let Some(pattern) = self.config.dealloc_pattern {
            unsafe { ptr::write_bytes(ptr.as_ptr(), pattern, layout.size()) };
        }

        self.free
            .borrow_mut()
            .entry(layout)
            .or_default()
            .push(ptr);

        self.allocated_bytes
            .set(self.allocated_bytes.get() - layout.size());
        self.free_blocks.set(self.free_blocks.get() + 1);
        self.free_bytes.set(self.free_bytes.get() + layout.size());

        if self.config.track_stats {
            self.counters.record_dealloc();
        }

        #[cfg(feature = "logging")]
        trace!(size = layout.size(), align = layout.align(), "pool deallocate");

        Ok(())
    }
}

impl MemoryUsage for PoolAllocator {
    fn used_memory(&self) -> usize {
        self.total_allocated()
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.free_bytes())
    }
}

impl Drop for PoolAllocator {
    fn drop(&mut self) {
        let allocated = core::mem::take(self.allocated.get_mut());
        let free = core::mem::take(self.free.get_mut());

        #[cfg(feature = "logging")]
        debug!(
            allocated_blocks = allocated.len(),
            free_blocks = self.free_blocks.get(),
            "releasing pool blocks to the system"
        );

        let blocks = allocated.into_iter().chain(
            free.into_iter()
                .flat_map(|(layout, ptrs)| ptrs.into_iter().map(move |ptr| (ptr, layout))),
        );
        for (ptr, layout) in blocks {
            // The backing layout was computable when the block was obtained
            if let Ok(backing) = backing_layout(layout) {
                unsafe { System.dealloc(ptr.as_ptr(), backing) };
            }
        }
    }
}

impl fmt::Debug for PoolAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("allocated_blocks", &self.allocated_count())
            .field("allocated_bytes", &self.total_allocated())
            .field("free_blocks", &self.free_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
