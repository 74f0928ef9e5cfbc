//! Borrowing and owning iterators over a `SkipListMap`.
//!
//! Every iterator walks the level-0 chain. The front and the back each keep
//! a node id, and a count of the entries left keeps them from crossing.
//! `IterMut` is the exception: it collects its borrows before yielding.

use crate::alloc::Allocator;
use crate::map::SkipListMap;
use crate::node::{Node, NodeId};

use std::collections::HashMap;
use std::iter::FusedIterator;
use std::marker::PhantomData;

pub struct Iter<'a, K, V, A> {
    arena: &'a A,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
    _marker: PhantomData<&'a Node<K, V>>,
}

impl<'a, K, V, A> Iterator for Iter<'a, K, V, A>
where
    A: Allocator<Node<K, V>>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let arena = self.arena;
        let node = &arena[self.front?];
        self.front = node.next_at(0);
        self.remaining -= 1;
        node.key_value()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V, A> DoubleEndedIterator for Iter<'a, K, V, A>
where
    A: Allocator<Node<K, V>>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let arena = self.arena;
        let node = &arena[self.back?];
        self.back = node.prev_at(0);
        self.remaining -= 1;
        node.key_value()
    }
}

impl<'a, K, V, A> ExactSizeIterator for Iter<'a, K, V, A> where A: Allocator<Node<K, V>> {}

impl<'a, K, V, A> FusedIterator for Iter<'a, K, V, A> where A: Allocator<Node<K, V>> {}

impl<'a, K, V, A> Clone for Iter<'a, K, V, A> {
    fn clone(&self) -> Self {
        Iter {
            arena: self.arena,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

/// Mutable iterator. The entries are split into disjoint borrows up front,
/// which costs one pass over the arena and a buffer of `len()` pairs.
pub struct IterMut<'a, K, V> {
    entries: std::vec::IntoIter<(&'a K, &'a mut V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}

impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}

/// Owning iterator. Entries are unlinked from the map as they are yielded.
pub struct IntoIter<K, V, C, A, const MAX_LEVEL: usize> {
    map: SkipListMap<K, V, C, A, MAX_LEVEL>,
}

impl<K, V, C, A, const MAX_LEVEL: usize> Iterator for IntoIter<K, V, C, A, MAX_LEVEL>
where
    A: Allocator<Node<K, V>>,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.map.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.map.len(), Some(self.map.len()))
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> DoubleEndedIterator for IntoIter<K, V, C, A, MAX_LEVEL>
where
    A: Allocator<Node<K, V>>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        self.map.pop_last()
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> ExactSizeIterator for IntoIter<K, V, C, A, MAX_LEVEL> where
    A: Allocator<Node<K, V>>
{
}

impl<K, V, C, A, const MAX_LEVEL: usize> FusedIterator for IntoIter<K, V, C, A, MAX_LEVEL> where
    A: Allocator<Node<K, V>>
{
}

pub struct Keys<'a, K, V, A> {
    inner: Iter<'a, K, V, A>,
}

impl<'a, K, V, A> Iterator for Keys<'a, K, V, A>
where
    A: Allocator<Node<K, V>>,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V, A> DoubleEndedIterator for Keys<'a, K, V, A>
where
    A: Allocator<Node<K, V>>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<'a, K, V, A> ExactSizeIterator for Keys<'a, K, V, A> where A: Allocator<Node<K, V>> {}

pub struct Values<'a, K, V, A> {
    inner: Iter<'a, K, V, A>,
}

impl<'a, K, V, A> Iterator for Values<'a, K, V, A>
where
    A: Allocator<Node<K, V>>,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V, A> DoubleEndedIterator for Values<'a, K, V, A>
where
    A: Allocator<Node<K, V>>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<'a, K, V, A> ExactSizeIterator for Values<'a, K, V, A> where A: Allocator<Node<K, V>> {}

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for ValuesMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<'a, K, V> ExactSizeIterator for ValuesMut<'a, K, V> {}

impl<K, V, C, A, const MAX_LEVEL: usize> SkipListMap<K, V, C, A, MAX_LEVEL>
where
    A: Allocator<Node<K, V>>,
{
    /// Iterates over the entries in key order.
    pub fn iter(&self) -> Iter<K, V, A> {
        Iter {
            arena: &self.arena_,
            front: self.first_id(),
            back: self.last_id(),
            remaining: self.length_,
            _marker: PhantomData,
        }
    }

    /// Iterates over the entries in key order, with mutable access to the
    /// values. Keys stay immutable since they determine the order.
    pub fn iter_mut(&mut self) -> IterMut<K, V> {
        let mut ranks = HashMap::with_capacity(self.length_);
        let mut current = self.first_id();
        while let Some(id) = current {
            ranks.insert(id, ranks.len());
            current = self.arena_[id].next_at(0).filter(|next| *next != self.tail_);
        }

        let mut slots: Vec<Option<(&K, &mut V)>> = (0..ranks.len()).map(|_| None).collect();
        for (id, node) in self.arena_.entries_mut() {
            if let Some(&rank) = ranks.get(&id) {
                slots[rank] = node.key_value_mut();
            }
        }

        let entries: Vec<(&K, &mut V)> = slots.into_iter().flatten().collect();
        IterMut {
            entries: entries.into_iter(),
        }
    }

    pub fn keys(&self) -> Keys<K, V, A> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<K, V, A> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }
}

impl<'a, K, V, C, A, const MAX_LEVEL: usize> IntoIterator for &'a SkipListMap<K, V, C, A, MAX_LEVEL>
where
    A: Allocator<Node<K, V>>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C, A, const MAX_LEVEL: usize> IntoIterator
    for &'a mut SkipListMap<K, V, C, A, MAX_LEVEL>
where
    A: Allocator<Node<K, V>>,
{
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> IntoIterator for SkipListMap<K, V, C, A, MAX_LEVEL>
where
    A: Allocator<Node<K, V>>,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, C, A, MAX_LEVEL>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { map: self }
    }
}
