//! Singly-linked list with allocator-sourced nodes
//!
//! # Safety
//!
//! `ForwardList` owns a chain of raw node pointers:
//! - every node comes from `Node::create` on `self.alloc` and is released
//!   through `Node::destroy` on the same allocator, exactly once
//! - `head` and `len` always describe the same chain; a failed operation
//!   leaves both untouched or leaves a shorter, still consistent chain
//! - cursors and iterators borrow the list, so the chain cannot be mutated
//!   while they walk it
//!
//! ## Moving Lists
//!
//! A move hands over the head link, length and allocator handle; no node is
//! touched. The moved-from list stays usable and empty.

mod cursor;
mod iter;
mod node;

use core::fmt;
use core::marker::PhantomData;
use std::alloc::handle_alloc_error;

#[cfg(feature = "logging")]
use tracing::warn;

pub use cursor::Cursor;
pub use iter::{IntoIter, Iter, IterMut};
use node::{Link, Node};

use crate::allocator::{Allocator, PoolAllocator, SYSTEM, SystemAllocator};
use crate::error::{MemoryError, MemoryResult};

/// Forward list whose nodes all come from one allocator
///
/// The list borrows its allocator, so any number of lists can share one
/// [`PoolAllocator`] and none of them can outlive it.
///
/// # Example
/// ```
/// use pool_memory::allocator::PoolAllocator;
/// use pool_memory::list::ForwardList;
///
/// let pool = PoolAllocator::new();
/// let mut list = ForwardList::new_in(&pool);
///
/// list.push_front(10)?;
/// list.push_front(20)?;
/// list.push_front(30)?;
/// assert_eq!(list.len(), 3);
/// assert_eq!(*list.front()?, 30);
/// assert!(list.iter().eq(&[30, 20, 10]));
///
/// list.pop_front()?;
/// list.pop_front()?;
/// assert_eq!(*list.front()?, 10);
/// assert_eq!(pool.allocated_count(), 1);
/// # Ok::<(), pool_memory::MemoryError>(())
/// ```
pub struct ForwardList<'a, T, A: Allocator + ?Sized = PoolAllocator> {
    head: Link<T>,
    len: usize,
    alloc: &'a A,
    marker: PhantomData<Box<Node<T>>>,
}

impl<T> ForwardList<'static, T, SystemAllocator> {
    /// Creates an empty list backed by the system allocator
    pub fn new() -> Self {
        Self::new_in(&SYSTEM)
    }
}

impl<T> Default for ForwardList<'static, T, SystemAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, A: Allocator + ?Sized> ForwardList<'a, T, A> {
    /// Creates an empty list that sources its nodes from `alloc`
    pub const fn new_in(alloc: &'a A) -> Self {
        Self {
            head: None,
            len: 0,
            alloc,
            marker: PhantomData,
        }
    }

    /// Allocator handle the nodes come from
    pub fn allocator(&self) -> &'a A {
        self.alloc
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks if the list has no elements
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `value` at the front
    ///
    /// # Errors
    /// [`MemoryError::AllocationFailed`] if no node storage could be
    /// obtained; the list is left exactly as it was.
    pub fn push_front(&mut self, value: T) -> MemoryResult<()> {
        let node = Node::create(self.alloc, value, self.head)?;
        self.head = Some(node);
        self.len += 1;
        Ok(())
    }

    /// Removes the front element and returns it
    ///
    /// The element is returned even if the allocator refuses the node
    /// storage; the refusal is logged like in [`clear`](Self::clear).
    ///
    /// # Errors
    /// [`MemoryError::EmptyContainer`] if the list is empty.
    pub fn pop_front(&mut self) -> MemoryResult<T> {
        let (value, released) = self
            .take_head()
            .ok_or_else(|| MemoryError::empty_container("pop_front"))?;
        if let Err(error) = released {
            report_release_failure(&error);
        }
        Ok(value)
    }

    /// Front element
    ///
    /// # Errors
    /// [`MemoryError::EmptyContainer`] if the list is empty.
    pub fn front(&self) -> MemoryResult<&T> {
        match self.head {
            Some(node) => Ok(unsafe { &(*node.as_ptr()).value }),
            None => Err(MemoryError::empty_container("front")),
        }
    }

    /// Front element, mutably
    ///
    /// # Errors
    /// [`MemoryError::EmptyContainer`] if the list is empty.
    pub fn front_mut(&mut self) -> MemoryResult<&mut T> {
        match self.head {
            Some(node) => Ok(unsafe { &mut (*node.as_ptr()).value }),
            None => Err(MemoryError::empty_container("front_mut")),
        }
    }

    /// Removes every element, returning all node storage to the allocator
    pub fn clear(&mut self) {
        while let Some((_value, released)) = self.take_head() {
            if let Err(error) = released {
                report_release_failure(&error);
            }
        }
    }

    /// Moves the contents out into a new list, leaving this one empty
    ///
    /// O(1); both lists keep the same allocator.
    #[must_use = "the taken elements are dropped if the returned list is unused"]
    pub fn take(&mut self) -> Self {
        let taken = Self {
            head: self.head.take(),
            len: self.len,
            alloc: self.alloc,
            marker: PhantomData,
        };
        self.len = 0;
        taken
    }

    /// Replaces this list's contents with `other`'s, leaving `other` empty
    ///
    /// The current elements are released first. The allocator handle moves
    /// along with the nodes.
    pub fn move_from(&mut self, other: &mut Self) {
        self.clear();
        self.head = other.head.take();
        self.len = core::mem::take(&mut other.len);
        self.alloc = other.alloc;
    }

    /// Deep copy drawing every node from the same allocator
    ///
    /// # Errors
    /// [`MemoryError::AllocationFailed`] if node storage runs out; the
    /// partial copy is released and `self` is untouched.
    pub fn try_clone(&self) -> MemoryResult<Self>
    where
        T: Clone,
    {
        let mut copy = Self::new_in(self.alloc);
        copy.append_cloned(self)?;
        Ok(copy)
    }

    /// Replaces this list's contents with a deep copy of `source`
    ///
    /// Current elements are released first; new nodes come from this list's
    /// allocator.
    ///
    /// # Errors
    /// [`MemoryError::AllocationFailed`] if node storage runs out; the list
    /// is left empty.
    pub fn assign_from(&mut self, source: &Self) -> MemoryResult<()>
    where
        T: Clone,
    {
        self.clear();
        self.append_cloned(source).inspect_err(|_| self.clear())
    }

    /// Cursor on the first element, or the end sentinel if empty
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.head)
    }

    /// End sentinel, one past the last element
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(None)
    }

    /// Iterates from front to back
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.head, self.len)
    }

    /// Iterates mutably from front to back
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.head, self.len)
    }

    /// Unlinks the head node and hands its storage back
    ///
    /// The value is returned even when the allocator rejects the storage.
    fn take_head(&mut self) -> Option<(T, MemoryResult<()>)> {
        let head = self.head?;
        let (node, released) = unsafe { Node::destroy(self.alloc, head) };
        self.head = node.next;
        self.len -= 1;
        Some((node.value, released))
    }

    /// Appends clones of `source`'s elements, in order, to an empty list
    fn append_cloned(&mut self, source: &Self) -> MemoryResult<()>
    where
        T: Clone,
    {
        debug_assert!(self.head.is_none());

        let mut tail = &mut self.head;
        for value in source {
            let node = Node::create(self.alloc, value.clone(), None)?;
            *tail = Some(node);
            tail = unsafe { &mut (*node.as_ptr()).next };
            self.len += 1;
        }
        Ok(())
    }
}

/// Logs storage the allocator refused to take back
///
/// Only reachable with an allocator that breaks its contract; callers that
/// cannot return an error (drop, clear, draining) report it here.
#[cfg_attr(not(feature = "logging"), allow(unused_variables))]
fn report_release_failure(error: &MemoryError) {
    #[cfg(feature = "logging")]
    warn!(%error, "allocator rejected list node storage");
}

impl<T, A: Allocator + ?Sized> Drop for ForwardList<'_, T, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Clone, A: Allocator + ?Sized> Clone for ForwardList<'_, T, A> {
    /// Deep copy; aborts through [`handle_alloc_error`] if storage runs out,
    /// like the standard collections. Use [`try_clone`](Self::try_clone) to
    /// handle the failure instead.
    fn clone(&self) -> Self {
        self.try_clone()
            .unwrap_or_else(|_| handle_alloc_error(Node::<T>::LAYOUT))
    }

    fn clone_from(&mut self, source: &Self) {
        if self.assign_from(source).is_err() {
            handle_alloc_error(Node::<T>::LAYOUT);
        }
    }
}

impl<T: fmt::Debug, A: Allocator + ?Sized> fmt::Debug for ForwardList<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, A, B> PartialEq<ForwardList<'_, T, B>> for ForwardList<'_, T, A>
where
    T: PartialEq,
    A: Allocator + ?Sized,
    B: Allocator + ?Sized,
{
    fn eq(&self, other: &ForwardList<'_, T, B>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: Allocator + ?Sized> Eq for ForwardList<'_, T, A> {}

impl<'a, 'b, T, A: Allocator + ?Sized> IntoIterator for &'b ForwardList<'a, T, A> {
    type Item = &'b T;
    type IntoIter = Iter<'b, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, 'b, T, A: Allocator + ?Sized> IntoIterator for &'b mut ForwardList<'a, T, A> {
    type Item = &'b mut T;
    type IntoIter = IterMut<'b, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<'a, T, A: Allocator + ?Sized> IntoIterator for ForwardList<'a, T, A> {
    type Item = T;
    type IntoIter = IntoIter<'a, T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

#[cfg(test)]
mod tests {
    use core::alloc::Layout;
    use core::cell::Cell;
    use core::ptr::NonNull;
    use std::rc::Rc;

    use super::*;
    use crate::allocator::AllocResult;

    /// Pool wrapper that refuses allocations once its budget is spent
    struct BudgetAllocator {
        inner: PoolAllocator,
        budget: Cell<usize>,
    }

    impl BudgetAllocator {
        fn new(budget: usize) -> Self {
            Self {
                inner: PoolAllocator::new(),
                budget: Cell::new(budget),
            }
        }
    }

    unsafe impl Allocator for BudgetAllocator {
        fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
            if self.budget.get() == 0 {
                return Err(MemoryError::allocation_failed_with_layout(layout));
            }
            self.budget.set(self.budget.get() - 1);
            self.inner.allocate(layout)
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) -> AllocResult<()> {
            unsafe { self.inner.deallocate(ptr, layout) }
        }
    }

    /// Pool wrapper that refuses every release
    struct RejectingAllocator(PoolAllocator);

    unsafe impl Allocator for RejectingAllocator {
        fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
            self.0.allocate(layout)
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, _layout: Layout) -> AllocResult<()> {
            Err(MemoryError::invalid_release(ptr.addr().get()))
        }
    }

    /// Counts how many times values carrying it were dropped
    #[derive(Clone)]
    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn collect(list: &ForwardList<'_, i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn end_to_end_scenario() {
        let pool = PoolAllocator::new();
        let mut list = ForwardList::new_in(&pool);

        list.push_front(10).unwrap();
        list.push_front(20).unwrap();
        list.push_front(30).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(*list.front().unwrap(), 30);
        assert_eq!(collect(&list), [30, 20, 10]);

        assert_eq!(list.pop_front().unwrap(), 30);
        assert_eq!(list.pop_front().unwrap(), 20);
        assert_eq!(*list.front().unwrap(), 10);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn empty_list_errors_do_not_mutate() {
        let pool = PoolAllocator::new();
        let mut list: ForwardList<'_, i32> = ForwardList::new_in(&pool);

        assert_eq!(
            list.pop_front(),
            Err(MemoryError::EmptyContainer {
                operation: "pop_front"
            })
        );
        assert!(list.front().is_err());
        assert!(list.front_mut().unwrap_err().is_recoverable());
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
        assert_eq!(pool.allocated_count(), 0);
    }

    #[test]
    fn front_mut_edits_head() {
        let pool = PoolAllocator::new();
        let mut list = ForwardList::new_in(&pool);
        list.push_front(1).unwrap();
        list.push_front(2).unwrap();

        *list.front_mut().unwrap() += 40;
        assert_eq!(collect(&list), [42, 1]);
    }

    #[test]
    fn nodes_are_drawn_from_and_returned_to_the_pool() {
        let pool = PoolAllocator::new();
        {
            let mut list = ForwardList::new_in(&pool);
            list.push_front(1).unwrap();
            list.push_front(2).unwrap();
            list.push_front(3).unwrap();
            assert_eq!(pool.allocated_count(), 3);

            list.pop_front().unwrap();
            assert_eq!(pool.allocated_count(), 2);

            list.clear();
            assert_eq!(pool.allocated_count(), 0);
            assert_eq!(pool.free_count(), 3);

            // Reuse: no new system blocks for the next two nodes
            list.push_front(10).unwrap();
            list.push_front(20).unwrap();
            assert_eq!(pool.free_count(), 1);
            assert_eq!(collect(&list), [20, 10]);
        }
        assert_eq!(pool.allocated_count(), 0);
        assert_eq!(pool.free_count(), 3);
    }

    #[test]
    fn clear_is_idempotent() {
        let pool = PoolAllocator::new();
        let mut list = ForwardList::new_in(&pool);
        list.clear();
        list.push_front(5).unwrap();
        list.clear();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.begin(), list.end());
    }

    #[test]
    fn lists_share_one_pool() {
        let pool = PoolAllocator::new();
        let mut a = ForwardList::new_in(&pool);
        let mut b = ForwardList::new_in(&pool);

        a.push_front(1).unwrap();
        a.pop_front().unwrap();

        // b picks up the block a released
        b.push_front(2).unwrap();
        assert_eq!(pool.allocated_count(), 1);
        assert_eq!(pool.free_count(), 0);
        assert!(a.is_empty());
        assert_eq!(collect(&b), [2]);
        assert!(a.allocator().is_same(b.allocator()));
    }

    #[test]
    fn copy_is_deep_and_independent() {
        let pool = PoolAllocator::new();
        let mut original = ForwardList::new_in(&pool);
        for value in [3, 2, 1] {
            original.push_front(value).unwrap();
        }

        let mut copy = original.try_clone().unwrap();
        assert_eq!(collect(&copy), [1, 2, 3]);
        assert_eq!(pool.allocated_count(), 6);

        original.pop_front().unwrap();
        copy.push_front(0).unwrap();
        assert_eq!(collect(&original), [2, 3]);
        assert_eq!(collect(&copy), [0, 1, 2, 3]);
        assert_eq!(original.clone(), original);
    }

    #[test]
    fn assign_from_replaces_contents() {
        let pool = PoolAllocator::new();
        let mut source = ForwardList::new_in(&pool);
        source.push_front(100).unwrap();
        source.push_front(200).unwrap();

        let mut target = ForwardList::new_in(&pool);
        for value in [10, 20, 30] {
            target.push_front(value).unwrap();
        }

        target.assign_from(&source).unwrap();
        assert_eq!(collect(&target), [200, 100]);
        assert_eq!(pool.allocated_count(), 4);

        target.pop_front().unwrap();
        target.push_front(99).unwrap();
        assert_eq!(collect(&source), [200, 100]);
        assert_eq!(collect(&target), [99, 100]);

        let mut third = ForwardList::new_in(&pool);
        third.clone_from(&target);
        assert_eq!(third, target);
    }

    #[test]
    fn take_and_move_from_transfer_without_allocating() {
        let pool = PoolAllocator::new();
        let mut list = ForwardList::new_in(&pool);
        for value in [1, 2, 3] {
            list.push_front(value).unwrap();
        }
        let allocations = pool.allocated_count();

        let mut moved = list.take();
        assert_eq!(collect(&moved), [3, 2, 1]);
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(pool.allocated_count(), allocations);

        let mut target = ForwardList::new_in(&pool);
        target.push_front(42).unwrap();
        target.move_from(&mut moved);
        assert_eq!(collect(&target), [3, 2, 1]);
        assert!(moved.is_empty());
        assert_eq!(pool.allocated_count(), allocations);

        // Moved-from lists stay usable
        list.push_front(7).unwrap();
        moved.push_front(8).unwrap();
        assert_eq!(collect(&list), [7]);
        assert_eq!(collect(&moved), [8]);
    }

    #[test]
    fn failed_push_leaves_list_unchanged() {
        let alloc = BudgetAllocator::new(2);
        let mut list = ForwardList::new_in(&alloc);
        list.push_front(1).unwrap();
        list.push_front(2).unwrap();

        let err = list.push_front(3).unwrap_err();
        assert!(matches!(err, MemoryError::AllocationFailed { .. }));
        assert!(!err.is_recoverable());
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), [2, 1]);
        assert_eq!(alloc.inner.allocated_count(), 2);
    }

    #[test]
    fn failed_copy_releases_partial_chain() {
        let alloc = BudgetAllocator::new(4);
        let mut source = ForwardList::new_in(&alloc);
        for value in [1, 2, 3] {
            source.push_front(value).unwrap();
        }

        // One node of budget left: the copy fails on its second node
        assert!(source.try_clone().is_err());
        assert_eq!(source.len(), 3);
        assert_eq!(alloc.inner.allocated_count(), 3);

        let mut target = ForwardList::new_in(&alloc);
        alloc.budget.set(1);
        assert!(target.assign_from(&source).is_err());
        assert!(target.is_empty());
        assert_eq!(alloc.inner.allocated_count(), 3);
    }

    #[test]
    fn pop_front_returns_value_when_release_is_refused() {
        let alloc = RejectingAllocator(PoolAllocator::new());
        let mut list = ForwardList::new_in(&alloc);
        list.push_front(1).unwrap();
        list.push_front(2).unwrap();

        assert_eq!(list.pop_front(), Ok(2));
        assert_eq!(list.len(), 1);
        assert_eq!(*list.front().unwrap(), 1);

        assert_eq!(list.pop_front(), Ok(1));
        assert!(list.is_empty());
        assert!(list.pop_front().is_err());
    }

    #[test]
    fn values_are_dropped_exactly_once() {
        let drops = Rc::new(Cell::new(0));
        let pool = PoolAllocator::new();
        {
            let mut list = ForwardList::new_in(&pool);
            for _ in 0..5 {
                list.push_front(DropCounter(Rc::clone(&drops))).unwrap();
            }

            drop(list.pop_front().unwrap());
            assert_eq!(drops.get(), 1);

            let copy = list.try_clone().unwrap();
            list.clear();
            assert_eq!(drops.get(), 5);

            let mut drained = copy.into_iter();
            drop(drained.next());
            assert_eq!(drops.get(), 6);
        }
        assert_eq!(drops.get(), 9);
        assert_eq!(pool.allocated_count(), 0);
    }

    #[test]
    fn system_backed_list() {
        let mut list = ForwardList::new();
        list.push_front("b").unwrap();
        list.push_front("a").unwrap();
        assert_eq!(format!("{list:?}"), r#"["a", "b"]"#);
        assert_eq!(list.into_iter().collect::<Vec<_>>(), ["a", "b"]);
        assert!(ForwardList::<u8, SystemAllocator>::default().is_empty());
    }

    #[test]
    fn zero_sized_elements() {
        let pool = PoolAllocator::new();
        let mut list = ForwardList::new_in(&pool);
        for _ in 0..3 {
            list.push_front(()).unwrap();
        }
        assert_eq!(list.iter().count(), 3);
        assert_eq!(pool.allocated_count(), 3);
    }
}
