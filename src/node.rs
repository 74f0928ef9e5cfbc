use crate::alloc::Allocator;
use crate::error::{Error, Result};

/// Index of a node inside the map's allocator.
pub type NodeId = usize;

/// A single entry of the skip list, together with its links.
///
/// A node of level `n` keeps a forward and a backward link for each of the
/// levels `0..n`. Links at level 0 form the doubly linked chain of every
/// entry; higher levels are the express lanes used by searches.
///
/// Sentinels (the head and tail of every map) are nodes without an entry.
#[derive(Debug)]
pub struct Node<K, V> {
    entry_: Option<(K, V)>,
    forward_: Vec<Option<NodeId>>,
    backward_: Vec<Option<NodeId>>,
    generation_: u64,
}

impl<K, V> Node<K, V> {
    pub fn new(key: K, value: V, level: usize, max_level: usize) -> Result<Node<K, V>> {
        if level == 0 || level > max_level {
            return Err(Error::LevelOutOfBounds { max: max_level });
        }

        Ok(Self::with_level(key, value, level))
    }

    /// Callers guarantee `level >= 1`.
    pub(crate) fn with_level(key: K, value: V, level: usize) -> Node<K, V> {
        debug_assert!(level >= 1);
        Node {
            entry_: Some((key, value)),
            forward_: vec![None; level],
            backward_: vec![None; level],
            generation_: 0,
        }
    }

    pub(crate) fn sentinel(level: usize) -> Node<K, V> {
        Node {
            entry_: None,
            forward_: vec![None; level],
            backward_: vec![None; level],
            generation_: 0,
        }
    }

    /// Links `left` and `right` to each other at levels `0..levels`, as far as
    /// both nodes reach.
    pub(crate) fn bind<A>(arena: &mut A, left: NodeId, right: NodeId, levels: usize)
    where
        A: Allocator<Node<K, V>>,
    {
        let levels = levels.min(arena[left].level()).min(arena[right].level());
        for level in 0..levels {
            arena[left].link_forward(level, Some(right));
            arena[right].link_backward(level, Some(left));
        }
    }

    #[inline]
    pub fn level(&self) -> usize {
        self.forward_.len()
    }

    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.entry_.is_none()
    }

    #[inline]
    pub fn key(&self) -> Option<&K> {
        self.entry_.as_ref().map(|(key, _)| key)
    }

    #[inline]
    pub fn value(&self) -> Option<&V> {
        self.entry_.as_ref().map(|(_, value)| value)
    }

    #[inline]
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.entry_.as_mut().map(|(_, value)| value)
    }

    #[inline]
    pub fn key_value(&self) -> Option<(&K, &V)> {
        self.entry_.as_ref().map(|(key, value)| (key, value))
    }

    #[inline]
    pub fn key_value_mut(&mut self) -> Option<(&K, &mut V)> {
        self.entry_.as_mut().map(|(key, value)| (&*key, value))
    }

    /// Stores `value` and returns the previous one. Sentinels hold no value.
    pub fn replace_value(&mut self, value: V) -> Result<V> {
        match self.value_mut() {
            Some(slot) => Ok(std::mem::replace(slot, value)),
            None => Err(Error::DereferenceOfEndIterator),
        }
    }

    pub fn forward(&self, level: usize) -> Result<Option<NodeId>> {
        self.forward_
            .get(level)
            .copied()
            .ok_or(Error::LevelOutOfBounds { max: self.level() })
    }

    pub fn backward(&self, level: usize) -> Result<Option<NodeId>> {
        self.backward_
            .get(level)
            .copied()
            .ok_or(Error::LevelOutOfBounds { max: self.level() })
    }

    pub fn set_forward(&mut self, level: usize, node: Option<NodeId>) -> Result<()> {
        let max = self.level();
        let slot = self
            .forward_
            .get_mut(level)
            .ok_or(Error::LevelOutOfBounds { max })?;
        *slot = node;
        Ok(())
    }

    pub fn set_backward(&mut self, level: usize, node: Option<NodeId>) -> Result<()> {
        let max = self.level();
        let slot = self
            .backward_
            .get_mut(level)
            .ok_or(Error::LevelOutOfBounds { max })?;
        *slot = node;
        Ok(())
    }

    /// The level-0 successor.
    pub fn next(&self) -> Result<NodeId> {
        self.forward_
            .first()
            .copied()
            .flatten()
            .ok_or(Error::DereferenceOfEndIterator)
    }

    /// The level-0 predecessor.
    pub fn prev(&self) -> Result<NodeId> {
        self.backward_
            .first()
            .copied()
            .flatten()
            .ok_or(Error::DereferenceOfEndIterator)
    }

    #[inline]
    pub(crate) fn next_at(&self, level: usize) -> Option<NodeId> {
        debug_assert!(level < self.level());
        self.forward_[level]
    }

    #[inline]
    pub(crate) fn prev_at(&self, level: usize) -> Option<NodeId> {
        debug_assert!(level < self.level());
        self.backward_[level]
    }

    #[inline]
    pub(crate) fn link_forward(&mut self, level: usize, destination: Option<NodeId>) {
        debug_assert!(level < self.level());
        self.forward_[level] = destination;
    }

    #[inline]
    pub(crate) fn link_backward(&mut self, level: usize, destination: Option<NodeId>) {
        debug_assert!(level < self.level());
        self.backward_[level] = destination;
    }

    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.generation_
    }

    #[inline]
    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation_ = generation;
    }

    pub(crate) fn into_entry(self) -> Option<(K, V)> {
        self.entry_
    }
}

/// A node with no entry and no links. Following its links always fails.
impl<K, V> Default for Node<K, V> {
    fn default() -> Self {
        Node::sentinel(0)
    }
}

/// Copies the entry and the level. The copy is not part of any chain until the
/// caller links it.
impl<K: Clone, V: Clone> Clone for Node<K, V> {
    fn clone(&self) -> Self {
        Node {
            entry_: self.entry_.clone(),
            forward_: vec![None; self.level()],
            backward_: vec![None; self.level()],
            generation_: self.generation_,
        }
    }
}
