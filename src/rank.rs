//! Rank type and the 1-based tree arithmetic of the entry store.
//!
//! # Why 1-based?
//!
//! Ranks start at 1 so that rank 0 can mean "not present" in the rank index
//! without an `Option` wrapper. The implicit binary tree is then the classic
//! one: the children of `r` are `2r` and `2r + 1`, its parent is `r / 2`.
//!
//! # Heap Boundary
//!
//! Only ranks `1..=size` are heap-ordered. [`compute_size`] is the controller
//! that keeps `size` below the caller's cap by halving it, which cuts a whole
//! bottom layer of the tree at once instead of trimming a single leaf.

/// Type alias for 1-based positions in the entry store.
pub type Rank = usize;

/// Rank of an identifier that is not stored.
pub const NO_RANK: Rank = 0;

/// Parent of `rank` in the implicit tree (0 for the root).
#[inline]
pub fn parent(rank: Rank) -> Rank {
    rank / 2
}

/// Left child of `rank`.
#[inline]
pub fn left_child(rank: Rank) -> Rank {
    2 * rank
}

/// Right child of `rank`.
#[inline]
pub fn right_child(rank: Rank) -> Rank {
    2 * rank + 1
}

/// Halves `size` until it is strictly below `max_capacity`.
///
/// A `max_capacity` of 0 can never be satisfied, so the loop also stops once
/// the size reaches 0.
///
/// # Example
///
/// ```rust
/// use partial_heap::rank::compute_size;
///
/// assert_eq!(compute_size(3, 4), 3);
/// assert_eq!(compute_size(4, 4), 2);
/// assert_eq!(compute_size(17, 4), 2);
/// ```
#[inline]
pub fn compute_size(mut size: usize, max_capacity: usize) -> usize {
    while size >= max_capacity && size > 0 {
        size /= 2;
    }
    size
}
