//! Producer/consumer example for boundq
//!
//! Several producers push work items through a small shared queue while a pool of
//! consumers processes them. When every producer is done the queue is shut down and the
//! consumers drain what is left before exiting.
//!
//! Run with: cargo run --example producer_consumer

use boundq::metrics::MetricsCollector;
use boundq::QueueHandle;
use std::thread;
use std::time::Instant;

#[derive(Debug)]
struct WorkItem {
    producer: usize,
    seq: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let num_producers = 4;
    let num_consumers = 3;
    let items_per_producer = 25_000;
    let capacity = 32;

    println!("boundq producer/consumer example");
    println!("================================");
    println!("  Producers: {}", num_producers);
    println!("  Consumers: {}", num_consumers);
    println!("  Items per producer: {}", items_per_producer);
    println!("  Queue capacity: {}\n", capacity);

    let mut queue: QueueHandle<WorkItem> = QueueHandle::new(capacity)?;
    let start = Instant::now();

    let consumers: Vec<_> = (0..num_consumers)
        .map(|consumer_id| {
            let queue = queue.clone();
            thread::spawn(move || {
                let mut handled = 0usize;
                let mut checksum = 0usize;
                while let Some(item) = queue.remove() {
                    handled += 1;
                    checksum = checksum.wrapping_add(item.producer * items_per_producer + item.seq);
                }
                println!("  Consumer {} handled {} items", consumer_id, handled);
                (handled, checksum)
            })
        })
        .collect();

    let producers: Vec<_> = (0..num_producers)
        .map(|producer| {
            let queue = queue.clone();
            thread::spawn(move || {
                for seq in 0..items_per_producer {
                    queue.insert(WorkItem { producer, seq });
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().map_err(|_| "producer thread panicked")?;
    }

    let metrics = queue.queue().map(|q| q.metrics());

    // Wakes the consumers once they have drained everything
    queue.destroy();

    let mut handled = 0;
    let mut checksum = 0usize;
    for consumer in consumers {
        let (count, sum) = consumer.join().map_err(|_| "consumer thread panicked")?;
        handled += count;
        checksum = checksum.wrapping_add(sum);
    }

    let total = num_producers * items_per_producer;
    let expected: usize = (0..total).sum();
    println!("\nProcessed {} of {} items in {:?}", handled, total, start.elapsed());
    println!("Checksum {}", if checksum == expected { "ok" } else { "MISMATCH" });

    if let Some(metrics) = metrics {
        println!("\nQueue metrics (at shutdown):");
        println!("  Inserted: {}", metrics.inserted);
        println!("  Removed: {}", metrics.removed);
        println!(
            "  Contended calls: {} ({:.1}%)",
            metrics.contended_operations,
            metrics.contention_rate()
        );
        println!("  Avg operation: {:?}", metrics.avg_operation_time());
        println!("  Max operation: {:?}", metrics.max_operation_time());
    }

    Ok(())
}
