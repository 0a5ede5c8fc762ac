//! Bounded, approximately-ordered priority collections for Rust
//!
//! This crate provides a "partial heap": a ranked working set of
//! identifier/value pairs where only a capped prefix is kept in strict
//! max-heap order and the rest is an unordered overflow tail.
//!
//! # Features
//!
//! - **Partial Heap**: O(log cap) insert, increase, decrease and remove, independent of
//!   the total number of entries; O(1) lookup of any identifier's value
//! - **Per-call cap**: the ordered prefix is bounded by a capacity supplied on every update,
//!   so the bound can change at any time and is honored immediately
//! - **Explicit approximation**: [`Membership`] tells ranked entries apart from overflow ones
//!
//! # Example
//!
//! ```rust
//! use partial_heap::{PartialHeap, RankedCollection};
//!
//! let mut heap: PartialHeap<u64, u64> = PartialHeap::new();
//! heap.update(1, 0, 500, 8).unwrap();
//! heap.update(2, 0, 700, 8).unwrap();
//! heap.update(1, 500, 900, 8).unwrap();
//!
//! assert_eq!(heap.head(), 1);
//! assert_eq!(heap.value_of(2), 700);
//! ```

pub mod partial_heap;
pub mod rank;
pub mod traits;

// Re-export the main types for convenience
pub use partial_heap::{Entry, InvariantViolation, Membership, PartialHeap};
pub use traits::{HeapError, Identifier, RankedCollection, Value};
