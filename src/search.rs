use crate::alloc::Allocator;
use crate::compare::Comparator;
use crate::map::SkipListMap;
use crate::node::{Node, NodeId};

impl<K, V, C, A, const MAX_LEVEL: usize> SkipListMap<K, V, C, A, MAX_LEVEL>
where
    C: Comparator<K>,
    A: Allocator<Node<K, V>>,
{
    /// Moves right from `current` along `level` while the next node sorts
    /// before `key`, and returns the last node visited.
    #[inline]
    fn advance(&self, mut current: NodeId, level: usize, key: &K) -> NodeId {
        while let Some(next) = self.arena_[current].next_at(level) {
            match self.arena_[next].key() {
                Some(found) if self.comparator().less(found, key) => current = next,
                _ => break,
            }
        }

        current
    }

    /// Finds, for each level below `level`, the rightmost node whose key
    /// sorts before `key`. `predecessors[i]` is the node after which a new
    /// node would be linked at level `i`.
    pub(crate) fn search_predecessors(&self, key: &K, level: usize) -> Vec<NodeId> {
        let mut predecessors = vec![self.head_; level];

        // Levels above the current height only hold the head and the tail, so
        // the descent skips them unless a taller node is being placed.
        let start = std::cmp::max(level, self.height());
        let mut current = self.head_;
        for height in (0..start).rev() {
            current = self.advance(current, height, key);
            if height < level {
                predecessors[height] = current;
            }
        }

        predecessors
    }

    /// Returns the node holding a key equivalent to `key`, or the tail when
    /// there is none.
    pub(crate) fn search_key(&self, key: &K) -> NodeId {
        if self.is_empty() {
            return self.tail_;
        }

        let mut current = self.head_;
        for height in (0..self.height()).rev() {
            current = self.advance(current, height, key);
        }

        match self.arena_[current].next_at(0) {
            Some(next) => match self.arena_[next].key() {
                Some(found) if self.comparator().equivalent(found, key) => next,
                _ => self.tail_,
            },
            None => self.tail_,
        }
    }

    /// Returns the first node whose key does not sort before `key`, which may
    /// be the tail.
    pub(crate) fn search_lower_bound(&self, key: &K) -> NodeId {
        let mut current = self.head_;
        for height in (0..self.height()).rev() {
            current = self.advance(current, height, key);
        }

        self.arena_[current].next_at(0).unwrap_or(self.tail_)
    }
}
