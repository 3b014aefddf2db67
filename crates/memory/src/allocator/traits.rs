//! Allocator traits
//!
//! The containers in this crate talk to their memory source only through
//! [`Allocator`], so a list can be built on the recycling
//! [`PoolAllocator`](super::PoolAllocator), the plain
//! [`SystemAllocator`](super::SystemAllocator), or anything else that honours
//! the contract below.
//!
//! # Safety
//!
//! ## Trait Safety Contracts
//!
//! - **Allocator**: returned blocks must be valid for reads and writes of
//!   `layout.size()` bytes, aligned to `layout.align()`, and exclusive until
//!   they are handed back through `deallocate`.
//! - Blanket impls for `&T` forward every call to `T` and add no unsafe
//!   operations of their own.

use core::alloc::Layout;
use core::ptr::NonNull;

use super::AllocResult;

/// Source of raw memory blocks
///
/// # Safety Requirements
///
/// Implementors must ensure that:
/// - Returned pointers are valid until deallocated
/// - Memory is properly aligned according to the layout
/// - Two live allocations never overlap
pub unsafe trait Allocator {
    /// Allocates a block for `layout`
    ///
    /// The block content is uninitialized.
    ///
    /// # Errors
    /// Returns [`AllocationFailed`](crate::MemoryError::AllocationFailed) if
    /// no memory can be obtained.
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>>;

    /// Hands a block back to the allocator
    ///
    /// # Safety
    /// - `ptr` must have been returned by `allocate` on this allocator
    /// - `layout` must match the layout used for that allocation
    /// - After this call, `ptr` must not be used
    ///
    /// # Errors
    /// Allocators that track their blocks report releases they cannot match
    /// instead of corrupting their bookkeeping.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) -> AllocResult<()>;

    /// Like [`deallocate`](Self::deallocate), but a null pointer is a no-op
    ///
    /// # Safety
    /// Same as [`deallocate`](Self::deallocate) for non-null pointers.
    unsafe fn release(&self, ptr: *mut u8, layout: Layout) -> AllocResult<()> {
        match NonNull::new(ptr) {
            Some(ptr) => unsafe { self.deallocate(ptr, layout) },
            None => Ok(()),
        }
    }
}

unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) -> AllocResult<()> {
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

/// Memory usage introspection
///
/// Intended for tests and observability, not for control flow.
pub trait MemoryUsage {
    /// Bytes currently handed out to callers
    fn used_memory(&self) -> usize;

    /// Bytes held for reuse, if the allocator keeps any
    fn available_memory(&self) -> Option<usize> {
        None
    }

    /// All bytes the allocator currently holds, if known
    fn total_memory(&self) -> Option<usize> {
        self.available_memory()
            .map(|available| available + self.used_memory())
    }

    /// Share of held memory that is in use, in percent
    fn memory_usage_percent(&self) -> Option<f32> {
        self.total_memory().map(|total| {
            if total == 0 {
                0.0
            } else {
                (self.used_memory() as f32 / total as f32) * 100.0
            }
        })
    }
}
