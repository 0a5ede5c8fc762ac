//! Common traits for ranked identifier collections
//!
//! This module provides the vocabulary shared by every ranked collection:
//!
//! - [`Identifier`]: opaque, equality-comparable keys with one reserved sentinel
//! - [`Value`]: unsigned scalars where zero means "absent"
//! - [`RankedCollection`]: the update/read interface collaborators drive
//!
//! The [`RankedCollection`] trait is deliberately narrow: a single mutating
//! entry point (`update`) and a handful of positional reads. A partial heap,
//! a sorted list or a bucket index can all sit behind it, which lets the
//! surrounding application swap orderings without changing call sites.

use std::fmt;
use std::hash::Hash;

/// Error type for ranked collection operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The identifier is the reserved sentinel and cannot be stored
    InvalidIdentifier,
    /// The former value passed to `update` differs from the stored value
    FormerValueMismatch,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::InvalidIdentifier => {
                write!(f, "identifier is the reserved sentinel")
            }
            HeapError::FormerValueMismatch => {
                write!(f, "former value does not match the stored value")
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// An opaque identifier with one reserved "absent" token.
///
/// Identifiers are only ever compared for equality and hashed; no ordering
/// is assumed. [`Identifier::NONE`] is returned by reads that have nothing
/// to report and is rejected on insert.
pub trait Identifier: Copy + Eq + Hash + fmt::Debug {
    /// The sentinel meaning "no identifier".
    const NONE: Self;

    /// Returns true if this is the sentinel.
    #[inline]
    fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

macro_rules! impl_identifier_for_int {
    ($($t:ty),*) => {
        $(
            impl Identifier for $t {
                const NONE: Self = 0;
            }
        )*
    };
}

impl_identifier_for_int!(u16, u32, u64, u128, usize);

/// Address-like identifiers: twenty raw bytes, all-zero is the sentinel.
impl Identifier for [u8; 20] {
    const NONE: Self = [0; 20];
}

/// An unsigned scalar stored against an identifier.
///
/// [`Value::ZERO`] is reserved: a present entry never stores it, and
/// setting an entry to it removes the entry.
pub trait Value: Copy + Ord + fmt::Debug {
    /// The "entry does not exist" value.
    const ZERO: Self;

    /// Returns true if this is the reserved zero.
    #[inline]
    fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

macro_rules! impl_value_for_uint {
    ($($t:ty),*) => {
        $(
            impl Value for $t {
                const ZERO: Self = 0;
            }
        )*
    };
}

impl_value_for_uint!(u8, u16, u32, u64, u128, usize);

/// A collection of identifier/value pairs kept in some (possibly approximate) order
///
/// All mutation goes through [`update`](RankedCollection::update); every other
/// method is a read that never mutates.
///
/// # Example
///
/// ```rust
/// use partial_heap::{PartialHeap, RankedCollection};
///
/// let mut heap: PartialHeap<u64, u64> = PartialHeap::new();
/// heap.update(7, 0, 100, 16).unwrap();
/// heap.update(9, 0, 250, 16).unwrap();
///
/// assert_eq!(heap.head(), 9);
/// assert_eq!(heap.value_of(7), 100);
/// assert_eq!(heap.len(), 2);
/// ```
pub trait RankedCollection<K: Identifier, V: Value> {
    /// Moves `id` from `former` to `new`, using `max_capacity` to bound the ordered region
    ///
    /// `former` must be the currently stored value (or zero when absent) and
    /// `new` the value after the call. A `new` of zero removes the entry.
    ///
    /// # Errors
    /// - `HeapError::InvalidIdentifier` when inserting the sentinel.
    /// - `HeapError::FormerValueMismatch` when `former` is not the stored value.
    fn update(&mut self, id: K, former: V, new: V, max_capacity: usize) -> Result<(), HeapError>;

    /// Returns the value stored for `id`, or zero if absent
    fn value_of(&self, id: K) -> V;

    /// Returns the first identifier, or the sentinel if empty
    fn head(&self) -> K;

    /// Returns the last identifier, or the sentinel if empty
    fn tail(&self) -> K;

    /// Returns the identifier stored before `id`, or the sentinel
    fn prev(&self, id: K) -> K;

    /// Returns the identifier stored after `id`, or the sentinel
    fn next(&self, id: K) -> K;

    /// Returns the number of stored entries
    fn len(&self) -> usize;

    /// Returns true if nothing is stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_sentinels() {
        assert!(0u32.is_none());
        assert!(!1u64.is_none());
        assert!(<usize as Identifier>::NONE.is_none());
    }

    #[test]
    fn test_address_sentinel() {
        let mut addr = [0u8; 20];
        assert!(addr.is_none());
        addr[19] = 1;
        assert!(!addr.is_none());
    }

    #[test]
    fn test_value_zero() {
        assert!(0u8.is_zero());
        assert!(!42u128.is_zero());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            HeapError::InvalidIdentifier.to_string(),
            "identifier is the reserved sentinel"
        );
        assert_eq!(
            HeapError::FormerValueMismatch.to_string(),
            "former value does not match the stored value"
        );
    }
}
