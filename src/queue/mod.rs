//! Queue implementations
//!
//! ## Available Types
//!
//! - [`BlockingQueue`]: fixed-capacity FIFO with blocking `insert`/`remove` and shutdown
//! - [`QueueHandle`]: cloneable, nullable handle over a shared [`BlockingQueue`]
//!
//! ## Guarantees
//!
//! - **FIFO**: the n-th completed insert is returned by the n-th successful remove
//! - **No busy-waiting**: blocked calls sleep on a condition variable and re-check their
//!   predicate on every wake-up
//! - **Deterministic release**: `shutdown` wakes every blocked producer and consumer
//! - **Drain after shutdown**: values queued before shutdown are still delivered
//!
//! ## Operation Summary
//!
//! | Operation | Blocks | After shutdown |
//! |-----------|--------|----------------|
//! | `insert` | while full | returns at once, value dropped |
//! | `remove` | while empty | drains, then `None` |
//! | `try_insert` | never | `Err(Shutdown(value))` |
//! | `try_remove` | never | drains, then `None` |
//! | `shutdown` | never | no-op |
//!
//! ## Examples
//!
//! ```rust
//! use boundq::queue::{BlockingQueue, QueueHandle};
//!
//! let queue = BlockingQueue::new(10)?;
//! queue.insert(1);
//! assert_eq!(queue.remove(), Some(1));
//!
//! let handle: QueueHandle<&str> = QueueHandle::new(10)?;
//! handle.insert("hello");
//! assert_eq!(handle.remove(), Some("hello"));
//! # Ok::<(), boundq::Error>(())
//! ```
pub mod blocking;
pub mod handle;

pub use blocking::{BlockingQueue, QueueState, TryInsertError};
pub use handle::QueueHandle;


#[cfg(test)]
mod proptests;
