//! Partial Heap implementation
//!
//! A bounded, approximately-ordered collection of identifier/value pairs.
//! The first `size` ranks of the entry store form a binary max-heap; the
//! ranks after that are an unordered overflow tail. Keeping only a bounded
//! prefix ordered makes every update O(log cap) no matter how many entries
//! are stored, at the price of exact top-K retrieval once the cap is exceeded.
//!
//! # Layout
//!
//! ```text
//! rank:     1   2   3   4   5 | 6   7   8
//!          [ max-heap prefix ]|[ overflow ]
//!                        size ┘
//! ```
//!
//! The entry store is a dense vector addressed by 1-based rank, and a rank
//! index maps every stored identifier back to its rank. The two are kept in
//! bijection by routing every slot write through a single `set` primitive.
//!
//! # Time Complexity
//!
//! | Operation           | Complexity         |
//! |---------------------|--------------------|
//! | `update` (insert)   | O(log cap)         |
//! | `update` (increase) | O(log cap)         |
//! | `update` (decrease) | O(log cap)         |
//! | `update` (remove)   | O(log cap)         |
//! | `value_of`          | O(1) expected      |
//! | `head` / `tail`     | O(1)               |
//!
//! Debug builds re-verify every invariant after each `update`, which makes
//! updates O(N) there; release builds keep the bounds above.
//!
//! # Approximation
//!
//! When the heap boundary would reach the cap it is halved, demoting a whole
//! bottom layer of the tree to overflow at once. Overflow entries are only
//! pulled back into the heap when their value increases. [`Membership`]
//! exposes which side of the boundary an identifier is on.
//!
//! # Example
//!
//! ```rust
//! use partial_heap::{Membership, PartialHeap, RankedCollection};
//!
//! let mut heap: PartialHeap<u32, u64> = PartialHeap::new();
//!
//! // With a cap of 2 only one entry can stay heap-ordered.
//! heap.set_value(1, 10, 2).unwrap();
//! heap.set_value(2, 20, 2).unwrap();
//!
//! assert_eq!(heap.head(), 2);
//! assert_eq!(heap.heap_size(), 1);
//! assert_eq!(heap.membership(2), Some(Membership::Ranked));
//! assert_eq!(heap.membership(1), Some(Membership::Unranked));
//!
//! // Removing is setting the value to zero.
//! heap.set_value(2, 0, 2).unwrap();
//! assert_eq!(heap.value_of(2), 0);
//! assert_eq!(heap.len(), 1);
//! ```

use crate::rank::{compute_size, left_child, parent, right_child, Rank, NO_RANK};
use crate::traits::{HeapError, Identifier, RankedCollection, Value};
use rustc_hash::FxHashMap;
use std::fmt;

/// A stored identifier/value pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry<K, V> {
    /// The identifier this entry belongs to
    pub id: K,
    /// The value, never zero while stored
    pub value: V,
}

/// Which side of the heap boundary an identifier sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Within ranks `1..=size`, ordered by the heap property
    Ranked,
    /// Beyond the heap boundary, present but unordered
    Unranked,
}

/// A structural inconsistency reported by [`PartialHeap::check_invariants`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The rank index and the entry store have different sizes
    IndexSizeMismatch {
        /// Number of stored entries
        entries: usize,
        /// Number of identifiers in the rank index
        indexed: usize,
    },
    /// The entry at `rank` is not indexed back to `rank`
    BrokenBijection {
        /// Rank of the offending entry
        rank: Rank,
    },
    /// The entry at `rank` stores the reserved zero value
    StoredZero {
        /// Rank of the offending entry
        rank: Rank,
    },
    /// A child inside the heap boundary outranks its parent
    HeapOrder {
        /// Rank of the parent
        parent: Rank,
        /// Rank of the larger child
        child: Rank,
    },
    /// The heap boundary lies beyond the end of the store
    SizeOutOfBounds {
        /// The heap boundary
        size: usize,
        /// Number of stored entries
        len: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::IndexSizeMismatch { entries, indexed } => {
                write!(f, "{} entries but {} indexed identifiers", entries, indexed)
            }
            InvariantViolation::BrokenBijection { rank } => {
                write!(f, "entry at rank {} is not indexed to its rank", rank)
            }
            InvariantViolation::StoredZero { rank } => {
                write!(f, "entry at rank {} stores the zero value", rank)
            }
            InvariantViolation::HeapOrder { parent, child } => {
                write!(f, "child at rank {} exceeds parent at rank {}", child, parent)
            }
            InvariantViolation::SizeOutOfBounds { size, len } => {
                write!(f, "heap size {} exceeds length {}", size, len)
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// A bounded, approximately-ordered max-heap keyed by identifier
///
/// See the [module documentation](self) for the layout and guarantees.
#[derive(Debug, Clone)]
pub struct PartialHeap<K, V> {
    /// Entry store; rank `r` lives at index `r - 1`
    entries: Vec<Entry<K, V>>,
    /// Rank index; identifiers missing here have rank 0
    ranks: FxHashMap<K, Rank>,
    /// Heap boundary: ranks `1..=size` are heap-ordered
    size: usize,
}

impl<K: Identifier, V: Value> Default for PartialHeap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Identifier, V: Value> PartialHeap<K, V> {
    /// Creates an empty partial heap
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            ranks: FxHashMap::default(),
            size: 0,
        }
    }

    /// Creates an empty partial heap with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ranks: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            size: 0,
        }
    }

    /// Sets the value of `id`, reading its former value from the store
    ///
    /// This is [`update`](RankedCollection::update) without the caller having
    /// to track the stored value. A `new` of zero removes the entry.
    ///
    /// # Errors
    /// Returns `HeapError::InvalidIdentifier` when inserting the sentinel.
    pub fn set_value(&mut self, id: K, new: V, max_capacity: usize) -> Result<(), HeapError> {
        let former = self.value_of(id);
        self.update(id, former, new, max_capacity)
    }

    /// Returns the heap boundary: the number of heap-ordered leading ranks
    #[inline]
    pub fn heap_size(&self) -> usize {
        self.size
    }

    /// Returns the rank of `id`, or [`NO_RANK`] if absent
    #[inline]
    pub fn rank_of(&self, id: K) -> Rank {
        self.ranks.get(&id).copied().unwrap_or(NO_RANK)
    }

    /// Returns true if `id` is stored
    #[inline]
    pub fn contains(&self, id: K) -> bool {
        self.ranks.contains_key(&id)
    }

    /// Returns whether `id` is heap-ordered, in the overflow, or absent
    pub fn membership(&self, id: K) -> Option<Membership> {
        match self.rank_of(id) {
            NO_RANK => None,
            rank if rank <= self.size => Some(Membership::Ranked),
            _ => Some(Membership::Unranked),
        }
    }

    /// Returns the entry at `rank`, if any
    pub fn entry_at(&self, rank: Rank) -> Option<&Entry<K, V>> {
        rank.checked_sub(1).and_then(|index| self.entries.get(index))
    }

    /// Returns the heap-ordered entries, ranks `1..=size`
    pub fn ranked(&self) -> &[Entry<K, V>] {
        &self.entries[..self.size]
    }

    /// Returns the overflow entries, ranks `size + 1..=len`
    pub fn unranked(&self) -> &[Entry<K, V>] {
        &self.entries[self.size..]
    }

    /// Iterates over all entries in rank order
    pub fn iter(&self) -> std::slice::Iter<'_, Entry<K, V>> {
        self.entries.iter()
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.ranks.clear();
        self.size = 0;
    }

    /// Verifies the bijection, the prefix heap property and the boundary
    ///
    /// # Errors
    /// Returns the first [`InvariantViolation`] found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let len = self.entries.len();
        if self.ranks.len() != len {
            return Err(InvariantViolation::IndexSizeMismatch {
                entries: len,
                indexed: self.ranks.len(),
            });
        }
        if self.size > len {
            return Err(InvariantViolation::SizeOutOfBounds {
                size: self.size,
                len,
            });
        }

        for (index, entry) in self.entries.iter().enumerate() {
            let rank = index + 1;
            if self.rank_of(entry.id) != rank {
                return Err(InvariantViolation::BrokenBijection { rank });
            }
            if entry.value.is_zero() {
                return Err(InvariantViolation::StoredZero { rank });
            }
        }

        for child in 2..=self.size {
            let parent_rank = parent(child);
            if self.value_at(child) > self.value_at(parent_rank) {
                return Err(InvariantViolation::HeapOrder {
                    parent: parent_rank,
                    child,
                });
            }
        }

        Ok(())
    }

    #[inline]
    fn value_at(&self, rank: Rank) -> V {
        self.entries[rank - 1].value
    }

    /// Writes `entry` at `rank` and points the rank index at it
    #[inline]
    fn set(&mut self, rank: Rank, entry: Entry<K, V>) {
        self.entries[rank - 1] = entry;
        self.ranks.insert(entry.id, rank);
    }

    fn swap(&mut self, rank1: Rank, rank2: Rank) {
        let entry1 = self.entries[rank1 - 1];
        let entry2 = self.entries[rank2 - 1];
        self.set(rank1, entry2);
        self.set(rank2, entry1);
    }

    /// Moves the entry at `rank` up while it exceeds its parent
    fn shift_up(&mut self, mut rank: Rank) {
        let entry = self.entries[rank - 1];
        while rank > 1 {
            let parent_rank = parent(rank);
            let parent_entry = self.entries[parent_rank - 1];
            if entry.value <= parent_entry.value {
                break;
            }
            self.set(rank, parent_entry);
            rank = parent_rank;
        }
        self.set(rank, entry);
    }

    /// Moves the entry at `rank` down while a child within the boundary exceeds it
    fn shift_down(&mut self, mut rank: Rank) {
        let entry = self.entries[rank - 1];
        let size = self.size;
        let mut child_rank = left_child(rank);
        while child_rank <= size {
            // Pick the larger child; the right one only counts inside the boundary.
            let right_rank = right_child(rank);
            if right_rank <= size && self.value_at(right_rank) > self.value_at(child_rank) {
                child_rank = right_rank;
            }
            let child_entry = self.entries[child_rank - 1];
            if child_entry.value <= entry.value {
                break;
            }
            self.set(rank, child_entry);
            rank = child_rank;
            child_rank = left_child(rank);
        }
        self.set(rank, entry);
    }

    fn insert(&mut self, id: K, value: V, max_capacity: usize) {
        self.entries.push(Entry { id, value });
        let len = self.entries.len();
        self.ranks.insert(id, len);

        let new_size = self.size + 1;
        self.swap(new_size, len);
        self.shift_up(new_size);
        self.resize(new_size, max_capacity);
    }

    fn increase(&mut self, rank: Rank, new: V, max_capacity: usize) {
        self.entries[rank - 1].value = new;
        if rank <= self.size {
            self.shift_up(rank);
        } else {
            // rank > size implies size < len, so there is always room to promote.
            let boundary = self.size + 1;
            log::debug!("promoting overflow rank {} to heap boundary {}", rank, boundary);
            self.swap(boundary, rank);
            self.shift_up(boundary);
            self.resize(boundary, max_capacity);
        }
    }

    fn decrease(&mut self, rank: Rank, new: V) {
        self.entries[rank - 1].value = new;
        if rank <= self.size {
            self.shift_down(rank);
        }
    }

    fn remove(&mut self, id: K, rank: Rank, removed: V) {
        let len = self.entries.len();
        self.swap(rank, len);
        if self.size == len {
            self.size -= 1;
        }
        self.entries.pop();
        self.ranks.remove(&id);

        // The entry swapped in from the end may be too small or too large for `rank`.
        if rank <= self.size {
            if removed > self.value_at(rank) {
                self.shift_down(rank);
            } else {
                self.shift_up(rank);
            }
        }
    }

    /// Sets the boundary to `size`, halved below `max_capacity`
    fn resize(&mut self, size: usize, max_capacity: usize) {
        let new_size = compute_size(size, max_capacity);
        if new_size != size {
            log::debug!(
                "heap boundary halved from {} to {} (cap {})",
                size,
                new_size,
                max_capacity
            );
        }
        self.size = new_size;
    }
}

impl<K: Identifier, V: Value> RankedCollection<K, V> for PartialHeap<K, V> {
    fn update(&mut self, id: K, former: V, new: V, max_capacity: usize) -> Result<(), HeapError> {
        let rank = self.rank_of(id);
        let stored = if rank == NO_RANK {
            V::ZERO
        } else {
            self.value_at(rank)
        };
        if former != stored {
            log::debug!(
                "rejecting update of {:?}: former {:?}, stored {:?}",
                id,
                former,
                stored
            );
            return Err(HeapError::FormerValueMismatch);
        }
        if rank == NO_RANK && !new.is_zero() && id.is_none() {
            return Err(HeapError::InvalidIdentifier);
        }

        let size = self.size;
        self.resize(size, max_capacity);

        if rank == NO_RANK {
            if !new.is_zero() {
                log::trace!("insert {:?} = {:?}", id, new);
                self.insert(id, new, max_capacity);
            }
        } else if former != new {
            if new.is_zero() {
                log::trace!("remove {:?} (was {:?})", id, former);
                self.remove(id, rank, former);
            } else if former < new {
                log::trace!("increase {:?}: {:?} -> {:?}", id, former, new);
                self.increase(rank, new, max_capacity);
            } else {
                log::trace!("decrease {:?}: {:?} -> {:?}", id, former, new);
                self.decrease(rank, new);
            }
        }

        #[cfg(debug_assertions)]
        {
            if let Err(violation) = self.check_invariants() {
                panic!("partial heap corrupted by update of {:?}: {}", id, violation);
            }
        }

        Ok(())
    }

    fn value_of(&self, id: K) -> V {
        match self.rank_of(id) {
            NO_RANK => V::ZERO,
            rank => self.value_at(rank),
        }
    }

    fn head(&self) -> K {
        self.entries.first().map_or(K::NONE, |entry| entry.id)
    }

    fn tail(&self) -> K {
        self.entries.last().map_or(K::NONE, |entry| entry.id)
    }

    fn prev(&self, id: K) -> K {
        match self.rank_of(id) {
            NO_RANK => K::NONE,
            rank => self.entry_at(rank - 1).map_or(K::NONE, |entry| entry.id),
        }
    }

    fn next(&self, id: K) -> K {
        match self.rank_of(id) {
            NO_RANK => K::NONE,
            rank => self.entry_at(rank + 1).map_or(K::NONE, |entry| entry.id),
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<'a, K, V> IntoIterator for &'a PartialHeap<K, V> {
    type Item = &'a Entry<K, V>;
    type IntoIter = std::slice::Iter<'a, Entry<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
