//! # boundq
//!
//! A fixed-capacity, thread-safe FIFO queue for handing values between producer and
//! consumer threads, with a cooperative shutdown protocol.
//!
//! ## Features
//!
//! - **Blocking queue**: [`BlockingQueue`] blocks producers while full and consumers while
//!   empty, using a mutex and two condition variables (no busy-waiting)
//! - **Cooperative shutdown**: one call wakes every blocked thread; consumers keep draining
//!   what was queued before shutdown, producers stop enqueueing
//! - **Nullable handles**: [`QueueHandle`] tolerates being used after `destroy` or without
//!   ever being constructed
//! - **Metrics**: per-queue operation counters through [`metrics::MetricsCollector`]
//!
//! ## Quick Start
//!
//! ```rust
//! use boundq::BlockingQueue;
//!
//! let queue = BlockingQueue::new(3)?;
//! queue.insert("a");
//! queue.insert("b");
//! assert_eq!(queue.remove(), Some("a"));
//!
//! queue.shutdown();
//! assert_eq!(queue.remove(), Some("b")); // still drains
//! assert_eq!(queue.remove(), None); // then the empty sentinel, forever
//! # Ok::<(), boundq::Error>(())
//! ```
//!
//! ## Thread Safety
//!
//! Every read and write of queue state happens with the queue's lock held. Share a queue
//! between threads with [`std::sync::Arc`] or clone a [`QueueHandle`].

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod metrics;
pub mod queue;

pub use crate::queue::{BlockingQueue, QueueHandle, QueueState, TryInsertError};

/// Error types for boundq operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Queue was constructed with a capacity of zero
    InvalidCapacity,
    /// Backing store could not be allocated
    AllocationFailed,
    /// Operation would block (queue full or empty)
    WouldBlock,
    /// Queue has been shut down
    Closed,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidCapacity => write!(f, "Queue capacity must be greater than 0"),
            Error::AllocationFailed => write!(f, "Failed to allocate queue storage"),
            Error::WouldBlock => write!(f, "Operation would block"),
            Error::Closed => write!(f, "Queue is shut down"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for boundq operations
pub type Result<T> = core::result::Result<T, Error>;
