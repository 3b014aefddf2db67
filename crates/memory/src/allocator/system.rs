//! System allocator implementation
//!
//! Forwards every request to the process heap. Lists that are not given a
//! pool use the shared [`SYSTEM`] instance.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::{self, NonNull};
use std::alloc::System;

use super::{AllocError, AllocResult, Allocator};

/// Shared instance backing [`ForwardList::new`](crate::list::ForwardList::new)
pub static SYSTEM: SystemAllocator = SystemAllocator::new();

/// Wrapper for the system's default allocator
///
/// Stateless: it cannot detect double releases, so `deallocate` always
/// reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl SystemAllocator {
    /// Creates a new SystemAllocator
    #[inline]
    pub const fn new() -> Self {
        SystemAllocator
    }
}

unsafe impl Allocator for SystemAllocator {
    #[inline]
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            // Zero-sized requests get a dangling pointer aligned to `layout`
            let ptr = unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(layout.align())) };
            return Ok(NonNull::slice_from_raw_parts(ptr, 0));
        }

        let ptr = unsafe { System.alloc(layout) };
        NonNull::new(ptr)
            .map(|ptr| NonNull::slice_from_raw_parts(ptr, layout.size()))
            .ok_or_else(|| AllocError::allocation_failed_with_layout(layout))
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) -> AllocResult<()> {
        if layout.size() != 0 {
            unsafe { System.dealloc(ptr.as_ptr(), layout) };
        }
        Ok(())
    }
}
