//! Integration tests for boundq
//!
//! These exercise the public API the way producer/consumer programs use it: shared
//! handles, thread pools, shutdown-driven termination, and absent handles.

use boundq::metrics::MetricsCollector;
use boundq::{BlockingQueue, Error, QueueHandle, QueueState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn test_create_destroy() {
    let mut queue: QueueHandle<usize> = QueueHandle::new(10).unwrap();
    assert!(queue.is_valid());
    assert!(queue.is_empty());
    assert!(!queue.is_shutdown());
    queue.destroy();
    assert!(!queue.is_valid());
}

#[test]
fn test_construct_rejects_zero_capacity() {
    assert_eq!(BlockingQueue::<u8>::new(0).unwrap_err(), Error::InvalidCapacity);
    assert!(QueueHandle::<u8>::new(0).is_err());
}

#[test]
fn test_boxed_payload_identity_is_preserved() {
    let queue = QueueHandle::new(10).unwrap();
    let values: Vec<Box<u64>> = (0..3).map(Box::new).collect();
    let addresses: Vec<*const u64> = values.iter().map(|b| &**b as *const u64).collect();

    for value in values {
        queue.insert(value);
    }
    for address in addresses {
        let value = queue.remove().unwrap();
        assert_eq!(&*value as *const u64, address);
    }
}

#[test]
fn test_small_queue() {
    let queue = QueueHandle::new(1).unwrap();
    queue.insert(1);
    assert_eq!(queue.remove(), Some(1));
    assert!(queue.is_empty());
    queue.insert(2);
    assert_eq!(queue.remove(), Some(2));
}

#[test]
fn test_absent_handle_operations() {
    let mut queue: QueueHandle<&'static str> = QueueHandle::absent();

    queue.destroy();
    queue.insert("ignored");
    assert_eq!(queue.remove(), None);
    assert!(queue.is_empty());
    assert!(queue.is_shutdown());
    queue.shutdown();
}

#[test]
fn test_destroyed_handle_operations() {
    let mut queue = QueueHandle::new(4).unwrap();
    queue.insert(1);
    queue.destroy();

    queue.insert(2);
    assert_eq!(queue.remove(), None);
    assert!(queue.is_empty());
    assert!(queue.is_shutdown());
    queue.destroy();
}

#[test]
fn test_destroy_releases_blocked_threads() {
    let mut queue = QueueHandle::new(1).unwrap();
    queue.insert(0);

    let producer = {
        let queue = queue.clone();
        thread::spawn(move || queue.insert(1))
    };
    let mut idle = QueueHandle::<i32>::new(1).unwrap();
    let consumer = {
        let idle = idle.clone();
        thread::spawn(move || idle.remove())
    };

    thread::sleep(Duration::from_millis(50));
    queue.destroy();
    idle.destroy();

    producer.join().unwrap();
    assert_eq!(consumer.join().unwrap(), None);
}

#[test]
fn test_worker_pool_processes_every_job() {
    let queue = Arc::new(BlockingQueue::new(16).unwrap());
    let processed = Arc::new(AtomicUsize::new(0));
    let num_workers = 4;
    let num_jobs = 1_000;

    let workers: Vec<_> = (0..num_workers)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let processed = Arc::clone(&processed);
            thread::spawn(move || {
                let mut sum = 0u64;
                while let Some(job) = queue.remove() {
                    sum += job;
                    processed.fetch_add(1, Ordering::Relaxed);
                }
                sum
            })
        })
        .collect();

    for job in 0..num_jobs {
        queue.insert(job);
    }
    queue.shutdown();

    let total: u64 = workers.into_iter().map(|w| w.join().unwrap()).sum();
    assert_eq!(processed.load(Ordering::Relaxed), num_jobs as usize);
    assert_eq!(total, num_jobs * (num_jobs - 1) / 2);
    assert_eq!(queue.state(), QueueState::Drained);

    let metrics = queue.metrics();
    assert_eq!(metrics.inserted, num_jobs);
    assert_eq!(metrics.removed, num_jobs);
    assert_eq!(metrics.empty_removes, num_workers as u64);
}

#[test]
fn test_pipeline_stages_shut_down_in_order() {
    let raw = QueueHandle::new(4).unwrap();
    let squared = QueueHandle::new(4).unwrap();

    let stage = {
        let raw = raw.clone();
        let squared = squared.clone();
        thread::spawn(move || {
            while let Some(value) = raw.remove() {
                squared.insert(value * value);
            }
            squared.shutdown();
        })
    };

    let sink = {
        let squared = squared.clone();
        thread::spawn(move || {
            let mut out = Vec::new();
            while let Some(value) = squared.remove() {
                out.push(value);
            }
            out
        })
    };

    for value in 1..=20u32 {
        raw.insert(value);
    }
    raw.shutdown();

    stage.join().unwrap();
    let out = sink.join().unwrap();
    assert_eq!(out, (1..=20u32).map(|v| v * v).collect::<Vec<_>>());
    assert!(squared.is_shutdown() && squared.is_empty());
}

#[test]
fn test_concurrent_shutdown_callers() {
    let queue = Arc::new(BlockingQueue::<u8>::new(2).unwrap());
    let barrier = Arc::new(Barrier::new(4));

    let callers: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                queue.shutdown();
                queue.remove()
            })
        })
        .collect();

    for caller in callers {
        assert_eq!(caller.join().unwrap(), None);
    }
    assert!(queue.is_shutdown());
}

#[test]
fn test_try_insert_confirms_delivery() {
    let queue = BlockingQueue::new(2).unwrap();
    let mut rejected = Vec::new();

    for value in 0..4 {
        if let Err(err) = queue.try_insert(value) {
            rejected.push(err.into_inner());
        }
    }
    queue.shutdown();
    if let Err(err) = queue.try_insert(99) {
        assert_eq!(err.error(), Error::Closed);
        rejected.push(err.into_inner());
    }

    assert_eq!(rejected, vec![2, 3, 99]);
    assert_eq!(queue.drain(), vec![0, 1]);
}
