//! Property-based tests using proptest
//!
//! These tests generate random sequences of updates and verify that the
//! partial heap invariants hold after every single one of them.

use partial_heap::{Membership, PartialHeap, RankedCollection};
use proptest::prelude::*;

use std::collections::HashMap;

/// One generated call: identifier, new value, cap
type Op = (u32, u64, usize);

fn ops_strategy(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    // Small id and value ranges so removals, no-ops and collisions are common.
    prop::collection::vec((1u32..40, 0u64..20, 1usize..16), 0..max_ops)
}

/// Test bijection, prefix heap property and size bound after every update
fn test_structural_invariants(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut heap: PartialHeap<u32, u64> = PartialHeap::new();

    for (id, value, cap) in ops {
        let former = heap.value_of(id);
        heap.update(id, former, value, cap).unwrap();

        prop_assert_eq!(heap.check_invariants(), Ok(()));
        prop_assert!(heap.heap_size() <= heap.len());
        prop_assert!(
            heap.heap_size() < cap || heap.heap_size() == 0,
            "size {} not below cap {}",
            heap.heap_size(),
            cap
        );

        for (index, entry) in heap.iter().enumerate() {
            prop_assert_eq!(heap.rank_of(entry.id), index + 1);
        }
        for child in 2..=heap.heap_size() {
            let parent = heap.entry_at(child / 2).unwrap().value;
            prop_assert!(parent >= heap.entry_at(child).unwrap().value);
        }
    }

    Ok(())
}

/// Test that the heap agrees with a plain map on values and length
fn test_model_agreement(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut heap: PartialHeap<u32, u64> = PartialHeap::new();
    let mut model: HashMap<u32, u64> = HashMap::new();

    for (id, value, cap) in ops {
        heap.set_value(id, value, cap).unwrap();
        if value == 0 {
            model.remove(&id);
        } else {
            model.insert(id, value);
        }

        prop_assert_eq!(heap.len(), model.len());
        for (&id, &value) in &model {
            prop_assert_eq!(heap.value_of(id), value);
        }
    }

    // Head is the maximum of the ordered region
    if !heap.is_empty() && heap.heap_size() > 0 {
        let max_ranked = heap.ranked().iter().map(|entry| entry.value).max();
        prop_assert_eq!(Some(heap.value_of(heap.head())), max_ranked);
    }

    Ok(())
}

/// Test that inserting then removing an identifier leaves no trace
fn test_round_trip(setup: Vec<(u32, u64)>, value: u64, cap: usize) -> Result<(), TestCaseError> {
    let mut heap: PartialHeap<u32, u64> = PartialHeap::new();
    for (id, v) in setup {
        heap.set_value(id, v, cap).unwrap();
    }
    let (len, size) = (heap.len(), heap.heap_size());

    heap.update(1000, 0, value, cap).unwrap();
    heap.update(1000, value, 0, cap).unwrap();

    prop_assert_eq!(heap.len(), len);
    prop_assert_eq!(heap.value_of(1000), 0);
    prop_assert_eq!(heap.membership(1000), None);
    prop_assert_eq!(heap.check_invariants(), Ok(()));

    // The boundary only survives unchanged when it spans the store and never halves
    if size == len && size + 1 < cap {
        prop_assert_eq!(heap.heap_size(), size);
    } else {
        prop_assert!(heap.heap_size() <= size + 1);
    }

    Ok(())
}

/// Test that promotion puts an increased overflow entry inside the boundary
fn test_promotion(values: Vec<u64>, bump: u64) -> Result<(), TestCaseError> {
    let mut heap: PartialHeap<u32, u64> = PartialHeap::new();
    for (i, value) in values.iter().enumerate() {
        heap.set_value(i as u32 + 1, *value, 4).unwrap();
    }

    let Some(overflow) = heap.unranked().first().copied() else {
        return Ok(());
    };
    // A large cap leaves room for the promoted entry to stay ranked.
    heap.set_value(overflow.id, overflow.value + bump, 1024).unwrap();

    prop_assert_eq!(heap.membership(overflow.id), Some(Membership::Ranked));
    prop_assert_eq!(heap.check_invariants(), Ok(()));

    Ok(())
}

proptest! {
    #[test]
    fn test_partial_heap_structural_invariants(ops in ops_strategy(200)) {
        test_structural_invariants(ops)?;
    }

    #[test]
    fn test_partial_heap_model_agreement(ops in ops_strategy(200)) {
        test_model_agreement(ops)?;
    }

    #[test]
    fn test_partial_heap_round_trip(
        setup in prop::collection::vec((1u32..100, 1u64..50), 0..60),
        value in 1u64..100,
        cap in 1usize..32
    ) {
        test_round_trip(setup, value, cap)?;
    }

    #[test]
    fn test_partial_heap_promotion(
        values in prop::collection::vec(1u64..100, 4..40),
        bump in 1u64..100
    ) {
        test_promotion(values, bump)?;
    }
}
