//! Explicit begin/end cursor over a [`ForwardList`](super::ForwardList)
//!
//! A cursor is either on a node or on the end sentinel, the position one
//! past the last node. Reading through the end sentinel is an error;
//! advancing it is a no-op.

use core::fmt;
use core::marker::PhantomData;

use super::node::Link;
use crate::error::{MemoryError, MemoryResult};

/// Forward-only position in a list
///
/// Holds a shared borrow of the list, so the chain cannot change while the
/// cursor is alive.
///
/// # Example
/// ```
/// use pool_memory::allocator::PoolAllocator;
/// use pool_memory::list::ForwardList;
///
/// let pool = PoolAllocator::new();
/// let mut list = ForwardList::new_in(&pool);
/// list.push_front(2)?;
/// list.push_front(1)?;
///
/// let mut cursor = list.begin();
/// let mut seen = Vec::new();
/// while cursor != list.end() {
///     seen.push(*cursor.get()?);
///     cursor.advance();
/// }
/// assert_eq!(seen, [1, 2]);
/// assert!(cursor.get().is_err());
/// # Ok::<(), pool_memory::MemoryError>(())
/// ```
pub struct Cursor<'a, T> {
    node: Link<T>,
    marker: PhantomData<&'a T>,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(node: Link<T>) -> Self {
        Self {
            node,
            marker: PhantomData,
        }
    }

    /// Whether the cursor is on the end sentinel
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Element under the cursor
    ///
    /// # Errors
    /// [`MemoryError::InvalidIterator`] on the end sentinel.
    pub fn get(&self) -> MemoryResult<&'a T> {
        match self.node {
            Some(node) => Ok(unsafe { &(*node.as_ptr()).value }),
            None => Err(MemoryError::invalid_iterator()),
        }
    }

    /// Moves to the next node; stays put on the end sentinel
    pub fn advance(&mut self) -> &mut Self {
        if let Some(node) = self.node {
            self.node = unsafe { (*node.as_ptr()).next };
        }
        self
    }

    /// Moves to the next node and returns the previous position
    pub fn post_advance(&mut self) -> Self {
        let previous = *self;
        self.advance();
        previous
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Ok(value) => f.debug_tuple("Cursor").field(value).finish(),
            Err(_) => f.write_str("Cursor(end)"),
        }
    }
}
