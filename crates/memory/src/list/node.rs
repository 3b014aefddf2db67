//! Node storage for [`ForwardList`](super::ForwardList)
//!
//! # Safety
//!
//! - `Node::create`: the block comes from `Allocator::allocate` for
//!   `Node::<T>::LAYOUT`, so it is valid and aligned for one `Node<T>`;
//!   `ptr::write` initializes it without reading the old bytes
//! - `Node::destroy`: `ptr::read` moves the node out exactly once, then the
//!   block goes back with the layout it was allocated with

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::allocator::Allocator;
use crate::error::MemoryResult;

/// Owning link to the next node
pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) next: Link<T>,
}

impl<T> Node<T> {
    pub(crate) const LAYOUT: Layout = Layout::new::<Self>();

    /// Allocates a node from `alloc` and moves `value` into it
    ///
    /// On allocation failure nothing is allocated and `value` is dropped.
    pub(crate) fn create<A: Allocator + ?Sized>(
        alloc: &A,
        value: T,
        next: Link<T>,
    ) -> MemoryResult<NonNull<Self>> {
        let ptr = alloc.allocate(Self::LAYOUT)?.cast::<Self>();
        unsafe { ptr.as_ptr().write(Self { value, next }) };
        Ok(ptr)
    }

    /// Moves the node out of its block and hands the block back to `alloc`
    ///
    /// The node is returned even if the allocator rejects the block.
    ///
    /// # Safety
    /// `node` must have been produced by [`Node::create`] with the same
    /// allocator, and must not be used after this call.
    pub(crate) unsafe fn destroy<A: Allocator + ?Sized>(
        alloc: &A,
        node: NonNull<Self>,
    ) -> (Self, MemoryResult<()>) {
        let contents = unsafe { node.as_ptr().read() };
        let released = unsafe { alloc.deallocate(node.cast(), Self::LAYOUT) };
        (contents, released)
    }
}
