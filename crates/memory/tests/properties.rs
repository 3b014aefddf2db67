//! Property tests for list ordering and pool accounting.

use pool_memory::allocator::PoolAllocator;
use pool_memory::list::ForwardList;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Push(i16),
    Pop,
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i16>().prop_map(Op::Push),
        2 => Just(Op::Pop),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn traversal_reverses_push_order(values in proptest::collection::vec(any::<i32>(), 0..64)) {
        let pool = PoolAllocator::new();
        let mut list = ForwardList::new_in(&pool);
        for &value in &values {
            list.push_front(value).unwrap();
        }

        let expected: Vec<i32> = values.iter().rev().copied().collect();
        prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), expected);
        prop_assert_eq!(list.len(), values.len());
        prop_assert_eq!(pool.allocated_count(), values.len());
    }

    #[test]
    fn pops_shrink_by_one(pushes in 0usize..48, pops in 0usize..48) {
        let pool = PoolAllocator::new();
        let mut list = ForwardList::new_in(&pool);
        for i in 0..pushes {
            list.push_front(i).unwrap();
        }

        for _ in 0..pops.min(pushes) {
            list.pop_front().unwrap();
        }
        let expected = pushes - pops.min(pushes);
        prop_assert_eq!(list.len(), expected);
        prop_assert_eq!(pool.allocated_count(), expected);
        prop_assert_eq!(pool.free_count(), pushes - expected);
    }

    #[test]
    fn copy_is_unaffected_by_source_edits(
        values in proptest::collection::vec(any::<u8>(), 1..32),
        extra in any::<u8>(),
    ) {
        let pool = PoolAllocator::new();
        let mut source = ForwardList::new_in(&pool);
        for &value in &values {
            source.push_front(value).unwrap();
        }

        let copy = source.try_clone().unwrap();
        let snapshot: Vec<u8> = copy.iter().copied().collect();

        source.pop_front().unwrap();
        source.push_front(extra).unwrap();
        source.push_front(extra).unwrap();
        prop_assert_eq!(copy.iter().copied().collect::<Vec<_>>(), snapshot);
    }

    #[test]
    fn cleared_list_behaves_like_new(
        before in proptest::collection::vec(any::<i64>(), 0..16),
        after in proptest::collection::vec(any::<i64>(), 0..16),
    ) {
        let pool = PoolAllocator::new();
        let mut reused = ForwardList::new_in(&pool);
        for &value in &before {
            reused.push_front(value).unwrap();
        }
        reused.clear();

        let mut fresh = ForwardList::new_in(&pool);
        for &value in &after {
            reused.push_front(value).unwrap();
            fresh.push_front(value).unwrap();
        }
        prop_assert_eq!(&reused, &fresh);
    }

    #[test]
    fn pool_accounting_matches_list(ops in proptest::collection::vec(op(), 0..96)) {
        let pool = PoolAllocator::new();
        let mut list = ForwardList::new_in(&pool);
        let mut model: Vec<i16> = Vec::new();
        let mut high_water = 0usize;

        for op in ops {
            match op {
                Op::Push(value) => {
                    list.push_front(value).unwrap();
                    model.push(value);
                }
                Op::Pop => {
                    prop_assert_eq!(list.pop_front().ok(), model.pop());
                }
                Op::Clear => {
                    list.clear();
                    model.clear();
                }
            }
            high_water = high_water.max(model.len());

            // Every block ever obtained is either live in the list or parked
            prop_assert_eq!(pool.allocated_count(), model.len());
            prop_assert_eq!(pool.allocated_count() + pool.free_count(), high_water);
        }

        prop_assert!(list.iter().eq(model.iter().rev()));
    }
}
