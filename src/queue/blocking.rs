//! Bounded Blocking Queue
//!
//! A fixed-capacity FIFO ring buffer guarded by one mutex and two condition variables,
//! following the classic monitor discipline:
//!
//! ```text
//! Producer (insert)                      Consumer (remove)
//! -----------------                      -----------------
//! lock                                   lock
//! while full && !shutdown:               while empty && !shutdown:
//!     wait(not_full)                         wait(not_empty)
//! write slot[tail], tail += 1            read slot[head], head += 1
//! notify_one(not_empty)   ---------->    notify_one(not_full)
//! unlock                                 unlock
//! ```
//!
//! ## Shutdown
//!
//! [`BlockingQueue::shutdown`] sets a one-way flag and broadcasts both conditions:
//!
//! - blocked and future [`insert`](BlockingQueue::insert) calls return without enqueueing
//!   (the value is dropped)
//! - [`remove`](BlockingQueue::remove) keeps returning queued values in order, then returns
//!   `None` forever once the queue is drained
//!
//! ```text
//! Active ──shutdown──> ShuttingDown ──remove drains──> Drained
//!    └───────────shutdown while empty───────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use boundq::BlockingQueue;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(BlockingQueue::new(2)?);
//!
//! let producer = thread::spawn({
//!     let queue = Arc::clone(&queue);
//!     move || {
//!         for i in 0..10 {
//!             queue.insert(i); // blocks while the queue is full
//!         }
//!         queue.shutdown();
//!     }
//! });
//!
//! let mut received = Vec::new();
//! while let Some(value) = queue.remove() {
//!     received.push(value);
//! }
//!
//! producer.join().unwrap();
//! assert_eq!(received, (0..10).collect::<Vec<_>>());
//! # Ok::<(), boundq::Error>(())
//! ```

use crate::metrics::{AtomicMetrics, MetricsCollector, PerformanceMetrics};
use crate::{Error, Result};
use log::{debug, trace};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Lifecycle of a queue, as observed by [`BlockingQueue::state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueState {
    /// Accepting inserts and removes
    Active,
    /// Shut down with values still waiting to be removed
    ShuttingDown,
    /// Shut down and empty; terminal
    Drained,
}

/// Error returned by [`BlockingQueue::try_insert`], carrying the rejected value
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum TryInsertError<T> {
    /// The queue was at capacity
    Full(T),
    /// The queue has been shut down
    Shutdown(T),
}

impl<T> TryInsertError<T> {
    /// Take back the value that was not inserted
    pub fn into_inner(self) -> T {
        match self {
            TryInsertError::Full(value) | TryInsertError::Shutdown(value) => value,
        }
    }

    /// The crate-level error this rejection corresponds to
    pub fn error(&self) -> Error {
        match self {
            TryInsertError::Full(_) => Error::WouldBlock,
            TryInsertError::Shutdown(_) => Error::Closed,
        }
    }

    /// Returns `true` if the queue was full
    pub fn is_full(&self) -> bool {
        matches!(self, TryInsertError::Full(_))
    }

    /// Returns `true` if the queue was shut down
    pub fn is_shutdown(&self) -> bool {
        matches!(self, TryInsertError::Shutdown(_))
    }
}

impl<T> core::fmt::Debug for TryInsertError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TryInsertError::Full(_) => f.write_str("Full(..)"),
            TryInsertError::Shutdown(_) => f.write_str("Shutdown(..)"),
        }
    }
}

impl<T> core::fmt::Display for TryInsertError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TryInsertError::Full(_) => write!(f, "Queue is full"),
            TryInsertError::Shutdown(_) => write!(f, "Queue is shut down"),
        }
    }
}

impl<T> std::error::Error for TryInsertError<T> {}

impl<T> From<TryInsertError<T>> for Error {
    fn from(err: TryInsertError<T>) -> Self {
        err.error()
    }
}

/// Ring buffer state; only ever touched through the queue's mutex
#[derive(Debug)]
struct Ring<T> {
    // Fixed-length storage, `None` outside the live region
    slots: Box<[Option<T>]>,
    // Next slot to remove from
    head: usize,
    // Next slot to insert into
    tail: usize,
    // Live values between head (inclusive) and tail (exclusive), circularly
    count: usize,
    // One-way: false -> true
    shutdown: bool,
}

impl<T> Ring<T> {
    fn with_capacity(capacity: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| Error::AllocationFailed)?;
        slots.resize_with(capacity, || None);

        Ok(Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            tail: 0,
            count: 0,
            shutdown: false,
        })
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    fn push_back(&mut self, value: T) {
        debug_assert!(!self.is_full());
        debug_assert!(self.slots[self.tail].is_none());

        self.slots[self.tail] = Some(value);
        self.tail = (self.tail + 1) % self.capacity();
        self.count += 1;
    }

    fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let value = self.slots[self.head].take();
        debug_assert!(value.is_some());
        self.head = (self.head + 1) % self.capacity();
        self.count -= 1;
        value
    }

    fn state(&self) -> QueueState {
        match (self.shutdown, self.is_empty()) {
            (false, _) => QueueState::Active,
            (true, false) => QueueState::ShuttingDown,
            (true, true) => QueueState::Drained,
        }
    }
}

/// A fixed-capacity, blocking, multi-producer multi-consumer FIFO queue
///
/// Values are moved in by [`insert`](Self::insert) and out by [`remove`](Self::remove);
/// the queue never clones or inspects them. Both calls block without spinning until they
/// can make progress or the queue is [shut down](Self::shutdown).
///
/// # Ordering
///
/// Values come out in the order their inserts completed. Which of several waiting threads
/// is woken first is unspecified.
///
/// # Examples
///
/// ```rust
/// use boundq::BlockingQueue;
///
/// let queue = BlockingQueue::new(3)?;
/// queue.insert('A');
/// queue.insert('B');
/// queue.insert('C');
/// assert_eq!(queue.remove(), Some('A'));
/// assert_eq!(queue.remove(), Some('B'));
/// queue.insert('D'); // wraps around the ring
/// assert_eq!(queue.remove(), Some('C'));
/// assert_eq!(queue.remove(), Some('D'));
/// # Ok::<(), boundq::Error>(())
/// ```
#[derive(Debug)]
pub struct BlockingQueue<T> {
    ring: Mutex<Ring<T>>,

    // Signalled when a slot frees up (and broadcast on shutdown)
    not_full: Condvar,

    // Signalled when a value arrives (and broadcast on shutdown)
    not_empty: Condvar,

    // Immutable after construction, so readable without the lock
    capacity: usize,

    metrics: AtomicMetrics,
}

impl<T> BlockingQueue<T> {
    /// Create a new queue holding at most `capacity` values
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidCapacity`] if `capacity` is 0
    /// * [`Error::AllocationFailed`] if the backing store cannot be allocated
    ///
    /// # Examples
    ///
    /// ```rust
    /// use boundq::{BlockingQueue, Error};
    ///
    /// let queue: BlockingQueue<u64> = BlockingQueue::new(10)?;
    /// assert_eq!(queue.capacity(), 10);
    ///
    /// assert_eq!(BlockingQueue::<u64>::new(0).unwrap_err(), Error::InvalidCapacity);
    /// # Ok::<(), boundq::Error>(())
    /// ```
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity);
        }

        let ring = Ring::with_capacity(capacity)?;
        let metrics = AtomicMetrics::default();
        metrics.update_memory_usage(capacity.saturating_mul(core::mem::size_of::<Option<T>>()));

        Ok(Self {
            ring: Mutex::new(ring),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
            metrics,
        })
    }

    /// Insert a value at the back of the queue, blocking while the queue is full
    ///
    /// If the queue is shut down before space becomes available (or already was), the call
    /// returns without enqueueing and `value` is dropped. Use
    /// [`try_insert`](Self::try_insert) when the value must not be lost.
    pub fn insert(&self, value: T) {
        let started = self.start_timer();
        let mut ring = self.ring.lock();
        self.wait_while(&mut ring, &self.not_full, |ring| {
            ring.is_full() && !ring.shutdown
        });

        if ring.shutdown {
            drop(ring);
            self.metrics.record_discard();
            trace!("insert discarded: queue is shut down");
            return;
        }

        ring.push_back(value);
        self.not_empty.notify_one();
        drop(ring);

        self.metrics.record_insert(elapsed(started));
    }

    /// Remove the value at the front of the queue, blocking while the queue is empty
    ///
    /// Returns `None` only once the queue is shut down and every value queued before the
    /// shutdown has been removed. From then on every call returns `None` immediately.
    pub fn remove(&self) -> Option<T> {
        let started = self.start_timer();
        let mut ring = self.ring.lock();
        self.wait_while(&mut ring, &self.not_empty, |ring| {
            ring.is_empty() && !ring.shutdown
        });

        let value = ring.pop_front();
        if value.is_some() {
            self.not_full.notify_one();
        }
        drop(ring);

        match value {
            Some(value) => {
                self.metrics.record_remove(elapsed(started));
                Some(value)
            }
            None => {
                self.metrics.record_empty_remove();
                trace!("remove returned empty: queue is shut down and drained");
                None
            }
        }
    }

    /// Insert a value without blocking
    ///
    /// # Errors
    ///
    /// Hands the value back as [`TryInsertError::Shutdown`] once the queue is shut down,
    /// or as [`TryInsertError::Full`] if it is at capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use boundq::{BlockingQueue, TryInsertError};
    ///
    /// let queue = BlockingQueue::new(1)?;
    /// assert!(queue.try_insert(1).is_ok());
    /// assert_eq!(queue.try_insert(2), Err(TryInsertError::Full(2)));
    ///
    /// queue.shutdown();
    /// assert_eq!(queue.try_insert(3).unwrap_err().into_inner(), 3);
    /// # Ok::<(), boundq::Error>(())
    /// ```
    pub fn try_insert(&self, value: T) -> core::result::Result<(), TryInsertError<T>> {
        let started = self.start_timer();
        let mut ring = self.ring.lock();

        if ring.shutdown {
            drop(ring);
            self.metrics.record_rejection();
            return Err(TryInsertError::Shutdown(value));
        }
        if ring.is_full() {
            drop(ring);
            self.metrics.record_rejection();
            return Err(TryInsertError::Full(value));
        }

        ring.push_back(value);
        self.not_empty.notify_one();
        drop(ring);

        self.metrics.record_insert(elapsed(started));
        Ok(())
    }

    /// Remove the front value without blocking, `None` if the queue is currently empty
    pub fn try_remove(&self) -> Option<T> {
        let started = self.start_timer();
        let mut ring = self.ring.lock();
        let value = ring.pop_front();
        if value.is_some() {
            self.not_full.notify_one();
        }
        drop(ring);

        if value.is_some() {
            self.metrics.record_remove(elapsed(started));
        }
        value
    }

    /// Remove every value currently in the queue, in FIFO order, without blocking
    pub fn drain(&self) -> Vec<T> {
        let started = self.start_timer();
        let mut ring = self.ring.lock();
        let mut values = Vec::with_capacity(ring.count);
        while let Some(value) = ring.pop_front() {
            values.push(value);
        }
        if !values.is_empty() {
            self.not_full.notify_all();
        }
        drop(ring);

        self.metrics.record_removes(values.len() as u64, elapsed(started));
        values
    }

    /// Shut the queue down and wake every blocked producer and consumer
    ///
    /// Idempotent: calling it again has no further effect.
    pub fn shutdown(&self) {
        let mut ring = self.ring.lock();
        if !ring.shutdown {
            ring.shutdown = true;
            debug!(
                "queue shut down with {} of {} slots occupied",
                ring.count, self.capacity
            );
        }
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Whether the queue holds no values
    ///
    /// The answer is a snapshot and may be stale by the time it is used.
    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_shutdown(&self) -> bool {
        self.ring.lock().shutdown
    }

    /// Number of values currently queued (snapshot)
    pub fn len(&self) -> usize {
        self.ring.lock().count
    }

    /// Maximum number of values the queue can hold
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current lifecycle state (snapshot)
    pub fn state(&self) -> QueueState {
        self.ring.lock().state()
    }

    #[inline]
    fn start_timer(&self) -> Option<Instant> {
        self.metrics.is_enabled().then(Instant::now)
    }

    // Block on `condition` for as long as `blocked` holds. The predicate is re-checked
    // after every wake-up, so spurious and stolen wake-ups just go back to waiting.
    fn wait_while<F>(&self, ring: &mut MutexGuard<'_, Ring<T>>, condition: &Condvar, blocked: F)
    where
        F: Fn(&Ring<T>) -> bool,
    {
        if !blocked(&**ring) {
            return;
        }

        self.metrics.record_contention();
        while blocked(&**ring) {
            condition.wait(ring);
        }
    }
}

// Time since `started`, zero when metrics were off at call entry
#[inline]
fn elapsed(started: Option<Instant>) -> Duration {
    started.map_or(Duration::ZERO, |started| started.elapsed())
}

impl<T> MetricsCollector for BlockingQueue<T> {
    fn metrics(&self) -> PerformanceMetrics {
        self.metrics.snapshot()
    }

    fn reset_metrics(&self) {
        self.metrics.reset();
    }

    fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics.set_enabled(enabled);
    }

    fn is_metrics_enabled(&self) -> bool {
        self.metrics.is_enabled()
    }
}
