//! Node storage for the map.
//!
//! The map never holds pointers between nodes. Every node, sentinels included,
//! lives in an [`Allocator`] and links are the indices the allocator hands
//! out. An index stays valid until the element is deallocated; after that the
//! slot may be reused, which is why the map stamps nodes with a generation.

use std::ops::{Index, IndexMut};

use slab::Slab;

/// Index addressable storage with stable indices.
///
/// Indexing an index that is not occupied panics, the same way slice
/// indexing does.
pub trait Allocator<T>: Index<usize, Output = T> + IndexMut<usize, Output = T> {
    /// Moves `value` into storage and returns its index.
    fn allocate(&mut self, value: T) -> usize;

    /// Removes the element at `index` and hands it back, if present.
    fn deallocate(&mut self, index: usize) -> Option<T>;

    fn get(&self, index: usize) -> Option<&T>;

    fn get_mut(&mut self, index: usize) -> Option<&mut T>;

    /// Number of occupied slots.
    fn len(&self) -> usize;

    /// Mutable borrows of every occupied slot at once, in any order. The
    /// borrows are disjoint, so they may be held together.
    fn entries_mut<'a>(&'a mut self) -> Vec<(usize, &'a mut T)>
    where
        T: 'a;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Allocator<T> for Slab<T> {
    #[inline]
    fn allocate(&mut self, value: T) -> usize {
        self.insert(value)
    }

    #[inline]
    fn deallocate(&mut self, index: usize) -> Option<T> {
        self.try_remove(index)
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        Slab::get(self, index)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        Slab::get_mut(self, index)
    }

    #[inline]
    fn len(&self) -> usize {
        Slab::len(self)
    }

    fn entries_mut<'a>(&'a mut self) -> Vec<(usize, &'a mut T)>
    where
        T: 'a,
    {
        self.iter_mut().collect()
    }
}
