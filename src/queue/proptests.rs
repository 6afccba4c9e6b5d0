//! Property-based tests for the blocking queue using proptest
//!
//! Single-threaded sequences only ever use operations that cannot block given the
//! model state, so every case terminates.

use crate::queue::{BlockingQueue, QueueState};
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    Insert(i32),
    Remove,
    TryInsert(i32),
    TryRemove,
    Shutdown,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Insert),
        3 => Just(Op::Remove),
        2 => any::<i32>().prop_map(Op::TryInsert),
        2 => Just(Op::TryRemove),
        1 => Just(Op::Shutdown),
    ]
}

proptest! {
    #[test]
    fn test_fifo_ordering(values in prop::collection::vec(any::<i32>(), 1..64)) {
        let queue = BlockingQueue::new(values.len()).unwrap();
        for &value in &values {
            queue.insert(value);
        }
        for &expected in &values {
            prop_assert_eq!(queue.remove(), Some(expected));
        }
        prop_assert!(queue.is_empty());
    }

    #[test]
    fn test_capacity_invariant(
        capacity in 1usize..32,
        values in prop::collection::vec(any::<i32>(), 1..96)
    ) {
        let queue = BlockingQueue::new(capacity).unwrap();
        let mut accepted = Vec::new();

        for &value in &values {
            match queue.try_insert(value) {
                Ok(()) => accepted.push(value),
                Err(err) => {
                    prop_assert!(err.is_full());
                    prop_assert_eq!(err.into_inner(), value);
                }
            }
            prop_assert!(queue.len() <= capacity);
        }

        prop_assert_eq!(accepted.len(), values.len().min(capacity));
        prop_assert_eq!(queue.drain(), accepted);
    }

    #[test]
    fn test_shutdown_drains_then_returns_empty(
        capacity in 1usize..32,
        fill in 0usize..32,
        extra in prop::collection::vec(any::<i32>(), 0..8)
    ) {
        let fill = fill.min(capacity);
        let queue = BlockingQueue::new(capacity).unwrap();
        let queued: Vec<i32> = (0..fill as i32).collect();
        for &value in &queued {
            queue.insert(value);
        }

        queue.shutdown();
        for &value in &extra {
            queue.insert(value);
        }
        prop_assert_eq!(queue.len(), fill);

        for &expected in &queued {
            prop_assert_eq!(queue.remove(), Some(expected));
        }
        for _ in 0..3 {
            prop_assert_eq!(queue.remove(), None);
        }
        prop_assert_eq!(queue.state(), QueueState::Drained);
    }

    #[test]
    fn test_shutdown_idempotent(repeats in 1usize..5, fill in 0usize..4) {
        let once = BlockingQueue::new(4).unwrap();
        let many = BlockingQueue::new(4).unwrap();
        for value in 0..fill {
            once.insert(value);
            many.insert(value);
        }

        once.shutdown();
        for _ in 0..repeats {
            many.shutdown();
        }

        prop_assert_eq!(once.state(), many.state());
        prop_assert_eq!(once.drain(), many.drain());
        prop_assert_eq!(once.remove(), many.remove());
    }

    #[test]
    fn test_matches_model(
        capacity in 1usize..8,
        ops in prop::collection::vec(op_strategy(), 1..128)
    ) {
        let queue = BlockingQueue::new(capacity).unwrap();
        let mut model: VecDeque<i32> = VecDeque::new();
        let mut shutdown = false;

        for op in ops {
            match op {
                Op::Insert(value) => {
                    // A blocking insert into a full, live queue would never return
                    if model.len() == capacity && !shutdown {
                        continue;
                    }
                    queue.insert(value);
                    if !shutdown {
                        model.push_back(value);
                    }
                }
                Op::Remove => {
                    if model.is_empty() && !shutdown {
                        continue;
                    }
                    prop_assert_eq!(queue.remove(), model.pop_front());
                }
                Op::TryInsert(value) => {
                    let result = queue.try_insert(value);
                    if shutdown {
                        prop_assert!(result.unwrap_err().is_shutdown());
                    } else if model.len() == capacity {
                        prop_assert!(result.unwrap_err().is_full());
                    } else {
                        prop_assert!(result.is_ok());
                        model.push_back(value);
                    }
                }
                Op::TryRemove => {
                    prop_assert_eq!(queue.try_remove(), model.pop_front());
                }
                Op::Shutdown => {
                    queue.shutdown();
                    shutdown = true;
                }
            }

            prop_assert_eq!(queue.len(), model.len());
            prop_assert_eq!(queue.is_empty(), model.is_empty());
            prop_assert_eq!(queue.is_shutdown(), shutdown);
        }

        let expected: Vec<i32> = model.into_iter().collect();
        prop_assert_eq!(queue.drain(), expected);
    }
}
