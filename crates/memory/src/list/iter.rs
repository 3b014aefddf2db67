//! Iterators over a [`ForwardList`]
//!
//! All three walk the chain head to tail, so they yield elements most
//! recently pushed first.

use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use super::node::Link;
use super::{ForwardList, report_release_failure};
use crate::allocator::Allocator;

/// Shared iterator returned by [`ForwardList::iter`]
pub struct Iter<'a, T> {
    next: Link<T>,
    remaining: usize,
    marker: PhantomData<&'a T>,
}

impl<T> Iter<'_, T> {
    pub(super) fn new(head: Link<T>, len: usize) -> Self {
        Self {
            next: head,
            remaining: len,
            marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = unsafe { &*self.next?.as_ptr() };
        self.next = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            remaining: self.remaining,
            marker: PhantomData,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Mutable iterator returned by [`ForwardList::iter_mut`]
pub struct IterMut<'a, T> {
    next: Link<T>,
    remaining: usize,
    marker: PhantomData<&'a mut T>,
}

impl<T> IterMut<'_, T> {
    pub(super) fn new(head: Link<T>, len: usize) -> Self {
        Self {
            next: head,
            remaining: len,
            marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = unsafe { &mut *self.next?.as_ptr() };
        self.next = node.next;
        self.remaining -= 1;
        Some(&mut node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator that drains the list front to back
///
/// Node storage goes back to the allocator as each element is yielded;
/// whatever is left is released when the iterator is dropped.
pub struct IntoIter<'a, T, A: Allocator + ?Sized> {
    pub(super) list: ForwardList<'a, T, A>,
}

impl<T, A: Allocator + ?Sized> Iterator for IntoIter<'_, T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let (value, released) = self.list.take_head()?;
        if let Err(error) = released {
            report_release_failure(&error);
        }
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T, A: Allocator + ?Sized> ExactSizeIterator for IntoIter<'_, T, A> {}

impl<T, A: Allocator + ?Sized> FusedIterator for IntoIter<'_, T, A> {}

impl<T: fmt::Debug, A: Allocator + ?Sized> fmt::Debug for IntoIter<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}
