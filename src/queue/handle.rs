//! Shared, nullable queue handles
//!
//! [`QueueHandle`] is the owner-facing way to pass a [`BlockingQueue`] around: it is
//! cheap to clone, and every operation is a safe no-op on a handle that was never
//! constructed or has already been destroyed.
//!
//! | Operation      | Live handle                 | Absent handle |
//! |----------------|-----------------------------|---------------|
//! | `insert`       | blocking insert             | no-op         |
//! | `remove`       | blocking remove             | `None`        |
//! | `shutdown`     | shut down the queue         | no-op         |
//! | `is_empty`     | snapshot                    | `true`        |
//! | `is_shutdown`  | snapshot                    | `true`        |
//! | `destroy`      | shut down, release handle   | no-op         |

use super::blocking::BlockingQueue;
use crate::Result;
use log::debug;
use std::sync::Arc;

/// A shareable reference to a [`BlockingQueue`] that may be absent
///
/// # Examples
///
/// ```rust
/// use boundq::QueueHandle;
/// use std::thread;
///
/// let mut queue = QueueHandle::new(5)?;
///
/// let consumer = thread::spawn({
///     let queue = queue.clone();
///     move || {
///         let mut received = Vec::new();
///         while let Some(value) = queue.remove() {
///             received.push(value);
///         }
///         received
///     }
/// });
///
/// for i in 0..5 {
///     queue.insert(i);
/// }
/// queue.destroy(); // wakes the consumer once it has drained
///
/// assert_eq!(consumer.join().unwrap(), vec![0, 1, 2, 3, 4]);
/// assert!(!queue.is_valid());
/// assert_eq!(queue.remove(), None);
/// # Ok::<(), boundq::Error>(())
/// ```
#[derive(Debug)]
pub struct QueueHandle<T> {
    inner: Option<Arc<BlockingQueue<T>>>,
}

impl<T> QueueHandle<T> {
    /// Construct a new queue with the given capacity and return a handle to it
    ///
    /// # Errors
    ///
    /// Same as [`BlockingQueue::new`]; no handle is produced on failure.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self::from(BlockingQueue::new(capacity)?))
    }

    /// A handle that refers to no queue
    pub const fn absent() -> Self {
        Self { inner: None }
    }

    /// Whether this handle still refers to a queue
    pub fn is_valid(&self) -> bool {
        self.inner.is_some()
    }

    /// Borrow the underlying queue, if any
    pub fn queue(&self) -> Option<&BlockingQueue<T>> {
        self.inner.as_deref()
    }

    /// Blocking insert; see [`BlockingQueue::insert`]
    pub fn insert(&self, value: T) {
        if let Some(queue) = self.queue() {
            queue.insert(value);
        }
    }

    /// Blocking remove; see [`BlockingQueue::remove`]
    pub fn remove(&self) -> Option<T> {
        self.queue().and_then(BlockingQueue::remove)
    }

    /// Shut the queue down; see [`BlockingQueue::shutdown`]
    pub fn shutdown(&self) {
        if let Some(queue) = self.queue() {
            queue.shutdown();
        }
    }

    /// Whether the queue is empty; `true` for an absent handle
    pub fn is_empty(&self) -> bool {
        self.queue().map_or(true, BlockingQueue::is_empty)
    }

    /// Whether the queue is shut down; `true` for an absent handle
    pub fn is_shutdown(&self) -> bool {
        self.queue().map_or(true, BlockingQueue::is_shutdown)
    }

    /// Shut the queue down, waking every blocked thread, and release this handle
    ///
    /// The handle becomes absent. Storage is freed once the last handle (or other
    /// reference) to the queue is gone; values still queued at that point are dropped.
    pub fn destroy(&mut self) {
        if let Some(queue) = self.inner.take() {
            queue.shutdown();
            debug!(
                "queue handle destroyed, {} other reference(s) remain",
                Arc::strong_count(&queue) - 1
            );
        }
    }
}

impl<T> Clone for QueueHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for QueueHandle<T> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<T> From<BlockingQueue<T>> for QueueHandle<T> {
    fn from(queue: BlockingQueue<T>) -> Self {
        Self::from(Arc::new(queue))
    }
}

impl<T> From<Arc<BlockingQueue<T>>> for QueueHandle<T> {
    fn from(queue: Arc<BlockingQueue<T>>) -> Self {
        Self { inner: Some(queue) }
    }
}
