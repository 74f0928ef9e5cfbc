use crate::alloc::Allocator;
use crate::compare::{Ascending, Comparator};
use crate::config::{Config, DEFAULT_MAX_LEVEL, DEFAULT_PROBABILITY};
use crate::error::{Error, Result};
use crate::height_control::{GeometricalGenerator, HeightControl};
use crate::level::Level;
use crate::node::{Node, NodeId};

use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;

use log::{debug, trace};
use slab::Slab;

/// A detached handle to an entry (or to the end) of a `SkipListMap`.
///
/// Positions do not borrow the map, so they survive mutations. A position
/// whose entry was erased is detected through the node generation and
/// rejected with `Error::InvalidPosition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub(crate) node: NodeId,
    pub(crate) generation: u64,
}

/// An ordered map backed by a skip list.
///
/// Keys are unique and kept in the order defined by the comparator `C`. Nodes
/// live in the allocator `A` and reference each other by index. Every node is
/// linked both ways at each of its levels, so removal never needs a second
/// search and iteration works from both ends.
pub struct SkipListMap<
    K,
    V,
    C = Ascending,
    A = Slab<Node<K, V>>,
    const MAX_LEVEL: usize = DEFAULT_MAX_LEVEL,
> {
    /// Index of the head sentinel. The head is created along with the map, is
    /// never removed, has `MAX_LEVEL` levels and holds no entry. Searches start
    /// from it.
    pub(crate) head_: NodeId,

    /// Index of the tail sentinel. Every chain ends at it, so the level-0
    /// chain can be walked backwards from the tail.
    pub(crate) tail_: NodeId,

    /// Number of entries.
    pub(crate) length_: usize,

    /// Highest level any entry currently occupies.
    height_: Level<MAX_LEVEL>,

    /// `level_counts_[i]` is the number of entries linked at level `i`. Used to
    /// shrink `height_` on removal without scanning the list.
    level_counts_: [usize; MAX_LEVEL],

    /// Last generation handed out to a node.
    generation_: u64,

    comparator_: C,

    pub(crate) arena_: A,

    /// Used to generate the height for any given node when inserting data.
    controller_: Box<dyn HeightControl>,

    _marker: PhantomData<Node<K, V>>,
}

impl<K, V> SkipListMap<K, V> {
    /// An empty map in ascending key order.
    pub fn new() -> Self {
        Self::with_comparator(Ascending)
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> SkipListMap<K, V, C, A, MAX_LEVEL>
where
    A: Allocator<Node<K, V>> + Default,
{
    pub fn with_comparator(comparator: C) -> Self {
        Self::with_comparator_and_allocator(comparator, A::default())
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> SkipListMap<K, V, C, A, MAX_LEVEL>
where
    A: Allocator<Node<K, V>>,
{
    fn build(controller: Box<dyn HeightControl>, comparator: C, allocator: A) -> Self {
        assert!(MAX_LEVEL > 0, "a skip list needs at least one level");

        let mut arena = allocator;
        let head = arena.allocate(Node::sentinel(MAX_LEVEL));
        let tail = arena.allocate(Node::sentinel(MAX_LEVEL));
        Node::bind(&mut arena, head, tail, MAX_LEVEL);

        let mut map = SkipListMap {
            head_: head,
            tail_: tail,
            length_: 0,
            height_: Level::ZERO,
            level_counts_: [0; MAX_LEVEL],
            generation_: 0,
            comparator_: comparator,
            arena_: arena,
            controller_: controller,
            _marker: PhantomData,
        };

        // The tail is a valid position (the end), so it gets a generation too.
        let generation = map.next_generation();
        map.arena_[tail].set_generation(generation);

        debug!(
            "created skip list (max level {}, generator max height {})",
            MAX_LEVEL,
            map.controller_.max_height()
        );
        map
    }

    pub fn with_comparator_and_allocator(comparator: C, allocator: A) -> Self {
        let controller = GeometricalGenerator::new(MAX_LEVEL, DEFAULT_PROBABILITY);
        Self::build(Box::new(controller), comparator, allocator)
    }

    /// Builds a map from validated settings.
    pub fn with_config(config: Config, comparator: C, allocator: A) -> Result<Self> {
        config.validate::<MAX_LEVEL>()?;
        let controller = GeometricalGenerator::from_config(&config);
        Ok(Self::build(Box::new(controller), comparator, allocator))
    }

    /// Builds a map around a custom height controller. Its maximum height must
    /// lie in `1..=MAX_LEVEL`.
    pub fn with_height_control(
        controller: Box<dyn HeightControl>,
        comparator: C,
        allocator: A,
    ) -> Result<Self> {
        let max_height = controller.max_height();
        if max_height == 0 || max_height > MAX_LEVEL {
            return Err(Error::LevelOutOfBounds { max: MAX_LEVEL });
        }

        Ok(Self::build(controller, comparator, allocator))
    }

    /// Returns the number of elements stored in the structure.
    #[inline]
    pub fn len(&self) -> usize {
        self.length_
    }

    /// Returns `true` if there are no elements stored within the structure.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length_ == 0
    }

    /// Returns the highest level currently used by any entry.
    #[inline]
    pub fn height(&self) -> usize {
        self.height_.get()
    }

    /// Returns the maximum height the height controller can generate.
    pub fn max_height(&self) -> usize {
        self.controller_.max_height()
    }

    pub fn comparator(&self) -> &C {
        &self.comparator_
    }

    /// Removes all elements. The sentinels are kept, so the map stays usable.
    pub fn clear(&mut self) {
        let mut current = self.arena_[self.head_].next_at(0);
        while let Some(id) = current {
            if id == self.tail_ {
                break;
            }

            current = self.arena_[id].next_at(0);
            self.arena_.deallocate(id);
        }

        Node::bind(&mut self.arena_, self.head_, self.tail_, MAX_LEVEL);
        debug!("cleared {} entries", self.length_);
        self.length_ = 0;
        self.height_ = Level::ZERO;
        self.level_counts_ = [0; MAX_LEVEL];
    }

    /// Exchanges the contents of two maps in constant time.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.first_id().and_then(|id| self.arena_[id].key_value())
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.last_id().and_then(|id| self.arena_[id].key_value())
    }

    /// Removes and returns the first entry.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let id = self.first_id()?;
        self.unlink(id)
    }

    /// Removes and returns the last entry.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let id = self.last_id()?;
        self.unlink(id)
    }

    /// The position of the first entry, or the end position if empty.
    pub fn begin_position(&self) -> Position {
        let first = self.first_id().unwrap_or(self.tail_);
        self.position_of(first)
    }

    /// The position one past the last entry.
    pub fn end_position(&self) -> Position {
        self.position_of(self.tail_)
    }

    /// Erases the entry at `position` and returns the position that follows
    /// it. Erasing the end position does nothing.
    pub fn erase_at(&mut self, position: Position) -> Result<Position> {
        let id = self.resolve(position)?;
        if id == self.tail_ {
            return Ok(position);
        }

        let next = self.arena_[id].next()?;
        self.unlink(id);
        Ok(self.position_of(next))
    }

    /// Erases every entry in `[first, last)` and returns how many were
    /// removed. `last` itself is kept. Fails without touching the map if
    /// either position is stale or `last` does not follow `first`.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Result<usize> {
        let first = self.resolve(first)?;
        let last = self.resolve(last)?;

        let mut doomed = Vec::new();
        let mut current = first;
        while current != last {
            if current == self.tail_ {
                return Err(Error::InvalidPosition);
            }

            doomed.push(current);
            current = self.arena_[current].next()?;
        }

        for id in &doomed {
            self.unlink(*id);
        }

        trace!("erased a range of {} entries", doomed.len());
        Ok(doomed.len())
    }

    pub(crate) fn position_of(&self, id: NodeId) -> Position {
        Position {
            node: id,
            generation: self.arena_[id].generation(),
        }
    }

    /// Maps a position back to a node, rejecting stale positions. The head is
    /// never handed out as a position.
    pub(crate) fn resolve(&self, position: Position) -> Result<NodeId> {
        match self.arena_.get(position.node) {
            Some(node)
                if node.generation() == position.generation && position.node != self.head_ =>
            {
                Ok(position.node)
            }
            _ => Err(Error::InvalidPosition),
        }
    }

    #[inline]
    pub(crate) fn is_entry(&self, id: NodeId) -> bool {
        id != self.head_ && id != self.tail_
    }

    pub(crate) fn first_id(&self) -> Option<NodeId> {
        self.arena_[self.head_]
            .next_at(0)
            .filter(|id| *id != self.tail_)
    }

    pub(crate) fn last_id(&self) -> Option<NodeId> {
        self.arena_[self.tail_]
            .prev_at(0)
            .filter(|id| *id != self.head_)
    }

    fn next_generation(&mut self) -> u64 {
        self.generation_ += 1;
        self.generation_
    }

    fn value_mut_of(&mut self, id: NodeId) -> &mut V {
        match self.arena_[id].value_mut() {
            Some(value) => value,
            None => unreachable!("sentinel {} has no value", id),
        }
    }

    /// Allocates a node of `height` levels and splices it right after
    /// `predecessors[i]` at every level `i`.
    pub(crate) fn link_new(&mut self, key: K, value: V, predecessors: &[NodeId]) -> NodeId {
        let height = predecessors.len();

        // Allocation happens before any link is touched, so a failure here
        // leaves the structure as it was.
        let mut node = Node::with_level(key, value, height);
        node.set_generation(self.next_generation());
        let id = self.arena_.allocate(node);

        for (level, &predecessor) in predecessors.iter().enumerate() {
            let successor = self.arena_[predecessor].next_at(level);
            self.arena_[id].link_forward(level, successor);
            self.arena_[id].link_backward(level, Some(predecessor));
            self.arena_[predecessor].link_forward(level, Some(id));
            if let Some(successor) = successor {
                self.arena_[successor].link_backward(level, Some(id));
            }

            self.level_counts_[level] += 1;
        }

        if let Ok(level) = Level::new(height) {
            self.height_ = std::cmp::max(self.height_, level);
        }

        self.length_ += 1;
        trace!("linked node {} at height {} (length {})", id, height, self.length_);
        id
    }

    /// Detaches an entry from every level it participates in and frees it.
    pub(crate) fn unlink(&mut self, id: NodeId) -> Option<(K, V)> {
        if !self.is_entry(id) {
            return None;
        }

        let height = self.arena_[id].level();
        for level in 0..height {
            let predecessor = self.arena_[id].prev_at(level);
            let successor = self.arena_[id].next_at(level);
            if let Some(predecessor) = predecessor {
                self.arena_[predecessor].link_forward(level, successor);
            }
            if let Some(successor) = successor {
                self.arena_[successor].link_backward(level, predecessor);
            }

            self.level_counts_[level] -= 1;
        }

        loop {
            match self.height_.checked_sub(1usize) {
                Ok(lower) if self.level_counts_[lower.get()] == 0 => self.height_ = lower,
                _ => break,
            }
        }

        self.length_ -= 1;
        trace!("unlinked node {} of height {} (length {})", id, height, self.length_);
        self.arena_.deallocate(id).and_then(Node::into_entry)
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> SkipListMap<K, V, C, A, MAX_LEVEL>
where
    C: Comparator<K>,
    A: Allocator<Node<K, V>>,
{
    /// Inserts `key` with `value`. If an equivalent key is already present its
    /// value is replaced and the old value returned; the stored key is kept.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert_node(key, value).1
    }

    /// Like `insert`, but reports the position of the entry and whether a new
    /// entry was created.
    pub fn insert_with_position(&mut self, key: K, value: V) -> (Position, bool) {
        let (id, old) = self.insert_node(key, value);
        (self.position_of(id), old.is_none())
    }

    fn insert_node(&mut self, key: K, value: V) -> (NodeId, Option<V>) {
        let height = self.controller_.get_height().max(1).min(MAX_LEVEL);
        let predecessors = self.search_predecessors(&key, height);

        // The lower bound's next node, if present, could be the same as the
        // key we are looking for.
        if let Some(next) = self.arena_[predecessors[0]].next_at(0) {
            let existing = match self.arena_[next].key() {
                Some(found) => self.comparator_.equivalent(found, &key),
                None => false,
            };

            if existing {
                trace!("updated node {} in place", next);
                return (next, self.arena_[next].replace_value(value).ok());
            }
        }

        (self.link_new(key, value, &predecessors), None)
    }

    /// Erases `key` if present and returns the number of entries left.
    pub fn erase(&mut self, key: &K) -> usize {
        let id = self.search_key(key);
        self.unlink(id);
        self.length_
    }

    /// Removes `key` from the map, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let id = self.search_key(key);
        self.unlink(id)
    }

    /// Returns a reference to the value of `key`, failing with
    /// `Error::KeyNotFound` if it is absent.
    pub fn at(&self, key: &K) -> Result<&V> {
        let id = self.locate(key)?;
        self.arena_[id].value().ok_or(Error::KeyNotFound)
    }

    /// Mutable counterpart of `at`; both share the same lookup.
    pub fn at_mut(&mut self, key: &K) -> Result<&mut V> {
        let id = self.locate(key)?;
        self.arena_[id].value_mut().ok_or(Error::KeyNotFound)
    }

    /// Returns a const reference to the element with key `key`, if it exists.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.at(key).ok()
    }

    /// Returns a mutable reference to the element with key `key`, if it exists.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.at_mut(key).ok()
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let id = self.locate(key).ok()?;
        self.arena_[id].key_value()
    }

    /// Returns true if `key` is in the map.
    pub fn contains_key(&self, key: &K) -> bool {
        self.locate(key).is_ok()
    }

    /// Number of entries with key `key`; keys are unique, so 0 or 1.
    pub fn count(&self, key: &K) -> usize {
        if self.contains_key(key) {
            1
        } else {
            0
        }
    }

    /// Position of `key`, or the end position if absent.
    pub fn find_position(&self, key: &K) -> Position {
        self.position_of(self.search_key(key))
    }

    /// Returns the value of `key`, inserting `V::default()` first if the key is
    /// absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let id = match self.locate(&key) {
            Ok(id) => id,
            Err(_) => self.insert_node(key, V::default()).0,
        };

        self.value_mut_of(id)
    }

    fn locate(&self, key: &K) -> Result<NodeId> {
        let id = self.search_key(key);
        if id == self.tail_ {
            Err(Error::KeyNotFound)
        } else {
            Ok(id)
        }
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> Default for SkipListMap<K, V, C, A, MAX_LEVEL>
where
    C: Default,
    A: Allocator<Node<K, V>> + Default,
{
    fn default() -> Self {
        Self::with_comparator_and_allocator(C::default(), A::default())
    }
}

/// Rebuilds the structure node by node. Each copy keeps the level of the node
/// it was copied from, so the shape of the list is preserved.
///
/// The copy gets a fresh `A::default()` allocator rather than a clone of the
/// source's, and a forked height controller (see `HeightControl::fork`), so
/// the two maps do not draw the same heights for later inserts.
impl<K, V, C, A, const MAX_LEVEL: usize> Clone for SkipListMap<K, V, C, A, MAX_LEVEL>
where
    K: Clone,
    V: Clone,
    C: Clone,
    A: Allocator<Node<K, V>> + Default,
{
    fn clone(&self) -> Self {
        let mut copied = Self::build(
            self.controller_.fork(),
            self.comparator_.clone(),
            A::default(),
        );

        // `last[i]` is the most recent copied node linked at level `i`.
        let mut last = [copied.head_; MAX_LEVEL];
        let mut current = self.first_id();
        while let Some(id) = current {
            let mut node = self.arena_[id].clone();
            node.set_generation(copied.next_generation());
            let height = node.level();
            let copy = copied.arena_.allocate(node);

            for (level, previous) in last.iter_mut().enumerate().take(height) {
                copied.arena_[*previous].link_forward(level, Some(copy));
                copied.arena_[copy].link_backward(level, Some(*previous));
                copied.level_counts_[level] += 1;
                *previous = copy;
            }

            current = self.arena_[id].next_at(0).filter(|next| *next != self.tail_);
        }

        let tail = copied.tail_;
        for (level, previous) in last.iter().enumerate() {
            copied.arena_[*previous].link_forward(level, Some(tail));
            copied.arena_[tail].link_backward(level, Some(*previous));
        }

        copied.length_ = self.length_;
        copied.height_ = self.height_;
        debug!("cloned skip list of {} entries", copied.length_);
        copied
    }
}

/// Two maps are equal when they hold the same number of entries and, walking
/// both in order, every pair of keys is equivalent under `self`'s comparator
/// and every pair of values compares equal. Two empty maps are equal.
impl<K, V, C, A, C2, A2, const M: usize, const N: usize> PartialEq<SkipListMap<K, V, C2, A2, N>>
    for SkipListMap<K, V, C, A, M>
where
    V: PartialEq,
    C: Comparator<K>,
    A: Allocator<Node<K, V>>,
    A2: Allocator<Node<K, V>>,
{
    fn eq(&self, other: &SkipListMap<K, V, C2, A2, N>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((k1, v1), (k2, v2))| self.comparator_.equivalent(k1, k2) && v1 == v2)
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> fmt::Display for SkipListMap<K, V, C, A, MAX_LEVEL>
where
    K: fmt::Display,
    V: fmt::Display,
    A: Allocator<Node<K, V>>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;

        for (index, (key, value)) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }

        write!(f, "]")
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> fmt::Debug for SkipListMap<K, V, C, A, MAX_LEVEL>
where
    K: fmt::Debug,
    V: fmt::Debug,
    A: Allocator<Node<K, V>>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C, A, const MAX_LEVEL: usize> std::ops::Index<&'a K>
    for SkipListMap<K, V, C, A, MAX_LEVEL>
where
    C: Comparator<K>,
    A: Allocator<Node<K, V>>,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if `index` is not in the map.
    fn index(&self, index: &'a K) -> &Self::Output {
        match self.get(index) {
            Some(value) => value,
            None => panic!("key not found in skip list"),
        }
    }
}

impl<'a, K, V, C, A, const MAX_LEVEL: usize> std::ops::IndexMut<&'a K>
    for SkipListMap<K, V, C, A, MAX_LEVEL>
where
    C: Comparator<K>,
    A: Allocator<Node<K, V>>,
{
    fn index_mut(&mut self, index: &'a K) -> &mut Self::Output {
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("key not found in skip list"),
        }
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> Extend<(K, V)> for SkipListMap<K, V, C, A, MAX_LEVEL>
where
    C: Comparator<K>,
    A: Allocator<Node<K, V>>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize> FromIterator<(K, V)> for SkipListMap<K, V, C, A, MAX_LEVEL>
where
    C: Comparator<K> + Default,
    A: Allocator<Node<K, V>> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C, A, const MAX_LEVEL: usize, const N: usize> From<[(K, V); N]>
    for SkipListMap<K, V, C, A, MAX_LEVEL>
where
    C: Comparator<K> + Default,
    A: Allocator<Node<K, V>> + Default,
{
    fn from(entries: [(K, V); N]) -> Self {
        IntoIterator::into_iter(entries).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{quickcheck, Arbitrary, Gen, TestResult};

    impl<K, V, C, A, const MAX_LEVEL: usize> SkipListMap<K, V, C, A, MAX_LEVEL>
    where
        A: Allocator<Node<K, V>>,
        C: Comparator<K>,
    {
        /// Walks every level and checks ordering, link symmetry and the
        /// bookkeeping counters.
        fn assert_invariants(&self) {
            let mut expected_height = 0;
            for level in 0..MAX_LEVEL {
                let mut count = 0;
                let mut previous = self.head_;
                let mut current = self.arena_[self.head_].next_at(level).unwrap();
                while current != self.tail_ {
                    let node = &self.arena_[current];
                    assert!(node.level() > level);
                    assert_eq!(node.prev_at(level), Some(previous));
                    if previous != self.head_ {
                        let before = self.arena_[previous].key().unwrap();
                        assert!(self.comparator_.less(before, node.key().unwrap()));
                    }

                    count += 1;
                    previous = current;
                    current = node.next_at(level).unwrap();
                }

                assert_eq!(self.arena_[self.tail_].prev_at(level), Some(previous));
                assert_eq!(self.level_counts_[level], count);
                if level == 0 {
                    assert_eq!(count, self.length_);
                }
                if count > 0 {
                    expected_height = level + 1;
                }
            }

            assert_eq!(self.height(), expected_height);
            assert_eq!(self.arena_.len(), self.length_ + 2);
        }

        fn levels(&self) -> Vec<usize> {
            let mut levels = Vec::new();
            let mut current = self.first_id();
            while let Some(id) = current {
                levels.push(self.arena_[id].level());
                current = self.arena_[id].next_at(0).filter(|next| *next != self.tail_);
            }
            levels
        }
    }

    #[derive(Debug, Clone)]
    struct Tall {
        max_height: usize,
    }

    impl HeightControl for Tall {
        fn max_height(&self) -> usize {
            self.max_height
        }

        fn get_height(&mut self) -> usize {
            self.max_height
        }

        fn box_clone(&self) -> Box<dyn HeightControl> {
            Box::new(self.clone())
        }
    }

    impl<K, V> Arbitrary for SkipListMap<K, V>
    where
        K: Ord + Arbitrary,
        V: Arbitrary,
    {
        fn arbitrary(gen: &mut Gen) -> SkipListMap<K, V> {
            let max_height = usize::arbitrary(gen) % DEFAULT_MAX_LEVEL + 1;
            let upgrade_probability = (u8::arbitrary(gen) % 98 + 1) as f64 / 100.0;
            let seed = u64::arbitrary(gen);
            let config = Config::default()
                .with_max_level(max_height)
                .with_probability(upgrade_probability)
                .with_seed(seed);
            let mut list = SkipListMap::with_config(config, Ascending, Slab::new()).unwrap();

            let entries: Vec<(K, V)> = Arbitrary::arbitrary(gen);
            list.extend(entries);
            list
        }
    }

    #[test]
    fn new_is_empty() {
        let list: SkipListMap<i32, i32> = SkipListMap::new();
        assert!(list.is_empty());
        assert_eq!(list.height(), 0);
        assert_eq!(list.max_height(), DEFAULT_MAX_LEVEL);
        list.assert_invariants();
    }

    #[test]
    fn invariants_hold_under_random_workload() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let config = Config::default().with_seed(11);
        let mut list: SkipListMap<u16, u32> =
            SkipListMap::with_config(config, Ascending, Slab::new()).unwrap();
        let mut reference = std::collections::BTreeMap::new();

        for step in 0..5000u32 {
            let key = rng.gen_range(0..512u16);
            if rng.gen_bool(0.6) {
                assert_eq!(list.insert(key, step), reference.insert(key, step));
            } else {
                assert_eq!(list.remove(&key), reference.remove(&key));
            }

            if step % 250 == 0 {
                list.assert_invariants();
            }
        }

        list.assert_invariants();
        assert!(list.iter().eq(reference.iter()));
    }

    #[test]
    fn height_shrinks_when_tall_nodes_leave() {
        let tall = Box::new(Tall { max_height: 6 });
        let mut list: SkipListMap<i32, i32, Ascending, Slab<Node<i32, i32>>, 8> =
            SkipListMap::with_height_control(tall, Ascending, Slab::new()).unwrap();
        list.insert(1, 1);
        assert_eq!(list.height(), 6);

        list.controller_ = Box::new(Tall { max_height: 2 });
        list.insert(2, 2);
        list.insert(3, 3);
        assert_eq!(list.height(), 6);
        list.assert_invariants();

        list.remove(&1);
        assert_eq!(list.height(), 2);
        list.assert_invariants();

        list.clear();
        assert_eq!(list.height(), 0);
        list.assert_invariants();
    }

    #[test]
    fn height_control_above_max_level_is_rejected() {
        let tall = Box::new(Tall { max_height: 5 });
        let result: Result<SkipListMap<i32, i32, Ascending, Slab<Node<i32, i32>>, 4>> =
            SkipListMap::with_height_control(tall, Ascending, Slab::new());
        assert_eq!(result.err(), Some(Error::LevelOutOfBounds { max: 4 }));

        let flat = Box::new(Tall { max_height: 0 });
        let result: Result<SkipListMap<i32, i32>> =
            SkipListMap::with_height_control(flat, Ascending, Slab::new());
        assert!(result.is_err());
    }

    #[test]
    fn config_is_validated() {
        let config = Config::default().with_max_level(17);
        let result: Result<SkipListMap<i32, i32>> =
            SkipListMap::with_config(config, Ascending, Slab::new());
        assert!(result.is_err());

        let config = Config::default().with_probability(1.5);
        let result: Result<SkipListMap<i32, i32>> =
            SkipListMap::with_config(config, Ascending, Slab::new());
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn clone_preserves_levels() {
        let config = Config::default().with_seed(3);
        let mut list: SkipListMap<u32, String> =
            SkipListMap::with_config(config, Ascending, Slab::new()).unwrap();
        for i in 0..300 {
            list.insert(i, i.to_string());
        }

        let copied = list.clone();
        copied.assert_invariants();
        assert_eq!(copied.levels(), list.levels());
        assert_eq!(copied.height(), list.height());
        assert_eq!(copied, list);
    }

    #[test]
    fn clone_draws_its_own_heights() {
        let config = Config::default().with_seed(21);
        let mut list: SkipListMap<u32, u32> =
            SkipListMap::with_config(config, Ascending, Slab::new()).unwrap();
        list.extend((0..10).map(|i| (i, i)));

        let mut copied = list.clone();
        for key in 100..164 {
            list.insert(key, key);
            copied.insert(key, key);
        }

        assert_eq!(copied, list);
        assert_ne!(copied.levels()[10..], list.levels()[10..]);
        copied.assert_invariants();
    }

    #[test]
    fn clone_is_independent() {
        let mut list: SkipListMap<i32, i32> = SkipListMap::new();
        list.extend((0..50).map(|i| (i, i)));

        let mut copied = list.clone();
        copied.insert(100, 100);
        copied.remove(&3);
        *copied.get_mut(&4).unwrap() = -4;

        assert_eq!(list.len(), 50);
        assert!(!list.contains_key(&100));
        assert_eq!(list.get(&3), Some(&3));
        assert_eq!(list.get(&4), Some(&4));
        list.assert_invariants();
        copied.assert_invariants();
    }

    #[test]
    fn erase_range_rejects_backwards_ranges() {
        let mut list: SkipListMap<i32, i32> = SkipListMap::new();
        list.extend((0..10).map(|i| (i, i)));

        let first = list.find_position(&7);
        let last = list.find_position(&2);
        assert_eq!(list.erase_range(first, last), Err(Error::InvalidPosition));
        assert_eq!(list.len(), 10);
        list.assert_invariants();
    }

    #[test]
    fn stale_positions_are_detected() {
        let mut list: SkipListMap<i32, i32> = SkipListMap::new();
        list.extend((0..10).map(|i| (i, i)));

        let position = list.find_position(&5);
        list.remove(&5);
        // Slab reuses the freed slot for the next node.
        list.insert(42, 42);
        assert_eq!(list.erase_at(position), Err(Error::InvalidPosition));
        assert_eq!(list.len(), 10);
        list.assert_invariants();
    }

    #[test]
    fn clear_empties() {
        fn prop(mut list: SkipListMap<i32, i32>) -> TestResult {
            list.clear();
            list.assert_invariants();
            TestResult::from_bool(list.len() == 0 && list.is_empty())
        }

        quickcheck(prop as fn(SkipListMap<i32, i32>) -> TestResult);
    }

    #[test]
    fn insert_adds_one_to_length() {
        fn prop(mut list: SkipListMap<i32, i32>) -> TestResult {
            let length = list.len();
            // This just needs to produce a value that is not in the list yet...
            let key = match list.last_key_value() {
                Some((key, _)) if *key == i32::max_value() => return TestResult::discard(),
                Some((key, _)) => key + 1,
                None => 0,
            };
            list.insert(key, 0);
            list.assert_invariants();
            TestResult::from_bool(list.len() == length + 1)
        }

        quickcheck(prop as fn(SkipListMap<i32, i32>) -> TestResult);
    }

    #[test]
    fn remove_takes_one_from_length() {
        fn prop(mut list: SkipListMap<i32, i32>) -> TestResult {
            let length = list.len();
            let first = match list.first_key_value() {
                Some((key, _)) => *key,
                None => return TestResult::discard(),
            };

            list.remove(&first);
            list.assert_invariants();
            TestResult::from_bool(list.len() == length - 1 && !list.contains_key(&first))
        }

        quickcheck(prop as fn(SkipListMap<i32, i32>) -> TestResult);
    }

    #[test]
    fn iteration_is_sorted_and_reversible() {
        fn prop(list: SkipListMap<i32, i32>) -> bool {
            let forward: Vec<i32> = list.keys().cloned().collect();
            let mut backward: Vec<i32> = list.keys().rev().cloned().collect();
            backward.reverse();
            forward.windows(2).all(|pair| pair[0] < pair[1]) && forward == backward
        }

        quickcheck(prop as fn(SkipListMap<i32, i32>) -> bool);
    }
}
