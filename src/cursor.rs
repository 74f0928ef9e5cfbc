//! Cursors over a `SkipListMap`.
//!
//! A cursor points either at an entry or at the end of the map (one past the
//! last entry). `Cursor` borrows the map, so it cannot outlive a mutation;
//! use a [`Position`](crate::map::Position) to keep a place across mutations.

use crate::alloc::Allocator;
use crate::compare::Comparator;
use crate::error::{Error, Result};
use crate::map::{Position, SkipListMap};
use crate::node::{Node, NodeId};

use std::fmt;

pub struct Cursor<'a, K, V, C, A, const MAX_LEVEL: usize> {
    map: &'a SkipListMap<K, V, C, A, MAX_LEVEL>,
    current: NodeId,
}

impl<'a, K, V, C, A, const MAX_LEVEL: usize> Cursor<'a, K, V, C, A, MAX_LEVEL>
where
    A: Allocator<Node<K, V>>,
{
    #[inline]
    fn node(&self) -> &'a Node<K, V> {
        let map = self.map;
        &map.arena_[self.current]
    }

    /// Returns `true` if the cursor sits past the last entry.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.current == self.map.tail_
    }

    pub fn key(&self) -> Result<&'a K> {
        self.node().key().ok_or(Error::DereferenceOfEndIterator)
    }

    pub fn value(&self) -> Result<&'a V> {
        self.node().value().ok_or(Error::DereferenceOfEndIterator)
    }

    pub fn key_value(&self) -> Result<(&'a K, &'a V)> {
        self.node().key_value().ok_or(Error::DereferenceOfEndIterator)
    }

    /// Advances to the next entry, or to the end. Fails if already at the end.
    pub fn move_next(&mut self) -> Result<()> {
        if self.is_end() {
            return Err(Error::IteratorOutOfRange);
        }

        self.current = self.node().next()?;
        Ok(())
    }

    /// Steps back to the previous entry. Fails on the first entry, and at the
    /// end of an empty map.
    pub fn move_prev(&mut self) -> Result<()> {
        let previous = self.node().prev()?;
        if previous == self.map.head_ {
            return Err(Error::IteratorOutOfRange);
        }

        self.current = previous;
        Ok(())
    }

    /// Number of levels the current node takes part in.
    pub fn level(&self) -> usize {
        self.node().level()
    }

    pub fn position(&self) -> Position {
        self.map.position_of(self.current)
    }
}

impl<'a, K, V, C, A, const MAX_LEVEL: usize> Clone for Cursor<'a, K, V, C, A, MAX_LEVEL> {
    fn clone(&self) -> Self {
        Cursor {
            map: self.map,
            current: self.current,
        }
    }
}

impl<'a, K, V, C, A, const MAX_LEVEL: usize> Copy for Cursor<'a, K, V, C, A, MAX_LEVEL> {}

/// Cursors are equal when they point at the same node of the same map.
impl<'a, K, V, C, A, const MAX_LEVEL: usize> PartialEq for Cursor<'a, K, V, C, A, MAX_LEVEL> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.map, other.map) && self.current == other.current
    }
}

impl<'a, K, V, C, A, const MAX_LEVEL: usize> Eq for Cursor<'a, K, V, C, A, MAX_LEVEL> {}

impl<'a, K, V, C, A, const MAX_LEVEL: usize> fmt::Debug for Cursor<'a, K, V, C, A, MAX_LEVEL>
where
    K: fmt::Debug,
    V: fmt::Debug,
    A: Allocator<Node<K, V>>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("entry", &self.key_value().ok())
            .finish()
    }
}

/// A cursor with exclusive access to the map. It can modify the value under
/// it and remove entries.
pub struct CursorMut<'a, K, V, C, A, const MAX_LEVEL: usize> {
    map: &'a mut SkipListMap<K, V, C, A, MAX_LEVEL>,
    current: NodeId,
}

impl<'a, K, V, C, A, const MAX_LEVEL: usize> CursorMut<'a, K, V, C, A, MAX_LEVEL>
where
    A: Allocator<Node<K, V>>,
{
    /// A read-only view of the current place.
    pub fn as_cursor(&self) -> Cursor<K, V, C, A, MAX_LEVEL> {
        Cursor {
            map: &*self.map,
            current: self.current,
        }
    }

    pub fn is_end(&self) -> bool {
        self.current == self.map.tail_
    }

    pub fn key(&self) -> Result<&K> {
        self.map.arena_[self.current]
            .key()
            .ok_or(Error::DereferenceOfEndIterator)
    }

    pub fn value(&self) -> Result<&V> {
        self.map.arena_[self.current]
            .value()
            .ok_or(Error::DereferenceOfEndIterator)
    }

    pub fn key_value(&self) -> Result<(&K, &V)> {
        self.map.arena_[self.current]
            .key_value()
            .ok_or(Error::DereferenceOfEndIterator)
    }

    pub fn value_mut(&mut self) -> Result<&mut V> {
        self.map.arena_[self.current]
            .value_mut()
            .ok_or(Error::DereferenceOfEndIterator)
    }

    pub fn move_next(&mut self) -> Result<()> {
        let mut cursor = self.as_cursor();
        cursor.move_next()?;
        let current = cursor.current;
        self.current = current;
        Ok(())
    }

    pub fn move_prev(&mut self) -> Result<()> {
        let mut cursor = self.as_cursor();
        cursor.move_prev()?;
        let current = cursor.current;
        self.current = current;
        Ok(())
    }

    pub fn level(&self) -> usize {
        self.map.arena_[self.current].level()
    }

    pub fn position(&self) -> Position {
        self.map.position_of(self.current)
    }

    /// Removes the current entry and moves to the one after it.
    pub fn remove_current(&mut self) -> Result<(K, V)> {
        if self.is_end() {
            return Err(Error::DereferenceOfEndIterator);
        }

        let next = self.map.arena_[self.current].next()?;
        let entry = self
            .map
            .unlink(self.current)
            .ok_or(Error::DereferenceOfEndIterator)?;
        self.current = next;
        Ok(entry)
    }
}

impl<'a, K, V, C, A, const MAX_LEVEL: usize> fmt::Debug for CursorMut<'a, K, V, C, A, MAX_LEVEL>
where
    K: fmt::Debug,
    V: fmt::Debug,
    A: Allocator<Node<K, V>>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("entry", &self.key_value().ok())
            .finish()
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> SkipListMap<K, V, C, A, MAX_LEVEL>
where
    A: Allocator<Node<K, V>>,
{
    fn cursor(&self, current: NodeId) -> Cursor<K, V, C, A, MAX_LEVEL> {
        Cursor { map: self, current }
    }

    fn cursor_mut(&mut self, current: NodeId) -> CursorMut<K, V, C, A, MAX_LEVEL> {
        CursorMut { map: self, current }
    }

    /// A cursor at the first entry, or at the end if the map is empty.
    pub fn cursor_front(&self) -> Cursor<K, V, C, A, MAX_LEVEL> {
        self.cursor(self.first_id().unwrap_or(self.tail_))
    }

    /// A cursor at the last entry, or at the end if the map is empty.
    pub fn cursor_back(&self) -> Cursor<K, V, C, A, MAX_LEVEL> {
        self.cursor(self.last_id().unwrap_or(self.tail_))
    }

    pub fn cursor_end(&self) -> Cursor<K, V, C, A, MAX_LEVEL> {
        self.cursor(self.tail_)
    }

    /// A cursor at `position`, if it still refers to a live entry or the end.
    pub fn cursor_at(&self, position: Position) -> Result<Cursor<K, V, C, A, MAX_LEVEL>> {
        let id = self.resolve(position)?;
        Ok(self.cursor(id))
    }

    pub fn cursor_front_mut(&mut self) -> CursorMut<K, V, C, A, MAX_LEVEL> {
        let id = self.first_id().unwrap_or(self.tail_);
        self.cursor_mut(id)
    }

    pub fn cursor_back_mut(&mut self) -> CursorMut<K, V, C, A, MAX_LEVEL> {
        let id = self.last_id().unwrap_or(self.tail_);
        self.cursor_mut(id)
    }

    pub fn cursor_at_mut(
        &mut self,
        position: Position,
    ) -> Result<CursorMut<K, V, C, A, MAX_LEVEL>> {
        let id = self.resolve(position)?;
        Ok(self.cursor_mut(id))
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> SkipListMap<K, V, C, A, MAX_LEVEL>
where
    C: Comparator<K>,
    A: Allocator<Node<K, V>>,
{
    /// A cursor at `key`, or at the end if the key is absent.
    pub fn find(&self, key: &K) -> Cursor<K, V, C, A, MAX_LEVEL> {
        self.cursor(self.search_key(key))
    }

    pub fn find_mut(&mut self, key: &K) -> CursorMut<K, V, C, A, MAX_LEVEL> {
        let id = self.search_key(key);
        self.cursor_mut(id)
    }

    /// A cursor at the first entry whose key does not sort before `key`.
    pub fn lower_bound(&self, key: &K) -> Cursor<K, V, C, A, MAX_LEVEL> {
        self.cursor(self.search_lower_bound(key))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::map::SkipListMap;

    #[test]
    fn end_cursor_of_empty_map() {
        let list: SkipListMap<i32, i32> = SkipListMap::new();
        let mut cursor = list.cursor_front();
        assert!(cursor.is_end());
        assert_eq!(cursor, list.cursor_end());
        assert_eq!(cursor, list.cursor_back());
        assert_eq!(cursor.key(), Err(Error::DereferenceOfEndIterator));
        assert_eq!(cursor.move_next(), Err(Error::IteratorOutOfRange));
        assert_eq!(cursor.move_prev(), Err(Error::IteratorOutOfRange));
    }

    #[test]
    fn cursors_of_different_maps_differ() {
        let a: SkipListMap<i32, i32> = SkipListMap::new();
        let b: SkipListMap<i32, i32> = SkipListMap::new();
        assert_ne!(a.cursor_end(), b.cursor_end());
    }

    #[test]
    fn level_of_end_is_the_max_level() {
        let list: SkipListMap<i32, i32> = vec![(1, 1)].into_iter().collect();
        assert_eq!(list.cursor_end().level(), 16);
        assert!(list.cursor_front().level() >= 1);
    }

    #[test]
    fn remove_current_advances() {
        let mut list: SkipListMap<i32, i32> = (0..5).map(|i| (i, i)).collect();
        let mut cursor = list.find_mut(&3);
        assert_eq!(cursor.remove_current(), Ok((3, 3)));
        assert_eq!(cursor.key(), Ok(&4));
        assert_eq!(cursor.remove_current(), Ok((4, 4)));
        assert!(cursor.is_end());
        assert_eq!(cursor.remove_current(), Err(Error::DereferenceOfEndIterator));
        cursor.move_prev().unwrap();
        assert_eq!(cursor.key(), Ok(&2));

        assert_eq!(list.len(), 3);
    }
}
