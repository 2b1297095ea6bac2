//! Provides a queue of ray batches for the worker threads. The queue
//! itself is not changed after creation, we simply work through it
//! with an atomic counter to track the index of the next batch to
//! work on.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The queue of batches to be worked on, shared immutably between
/// worker threads.
pub struct BlockQueue {
    /// Number of items all batches cover
    n_items: usize,
    /// Items per batch, the last one may be shorter
    batch_size: usize,
    /// Index of the next batch to be worked on
    next: AtomicUsize,
}

impl BlockQueue {
    /// Split `n_items` into batches of `batch_size` (at least one).
    pub fn new(n_items: usize, batch_size: usize) -> BlockQueue {
        BlockQueue {
            n_items,
            batch_size: batch_size.max(1),
            next: AtomicUsize::new(0),
        }
    }
    /// Get an iterator to work through the queue
    pub fn iter(&self) -> BlockQueueIterator<'_> {
        BlockQueueIterator { queue: self }
    }
    /// Get the next batch in the queue or None if the queue is finished
    pub fn next(&self) -> Option<Range<usize>> {
        let i: usize = self.next.fetch_add(1, Ordering::AcqRel);
        if i >= self.len() {
            None
        } else {
            let start: usize = i * self.batch_size;
            Some(start..(start + self.batch_size).min(self.n_items))
        }
    }
    /// Get the number of batches
    pub fn len(&self) -> usize {
        (self.n_items + self.batch_size - 1) / self.batch_size
    }
    /// Check if all batches have been handed out
    pub fn is_empty(&self) -> bool {
        self.next.load(Ordering::Acquire) >= self.len()
    }
}

/// Iterator to work through the queue safely
pub struct BlockQueueIterator<'a> {
    queue: &'a BlockQueue,
}

impl<'a> Iterator for BlockQueueIterator<'a> {
    type Item = Range<usize>;
    fn next(&mut self) -> Option<Range<usize>> {
        self.queue.next()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn batches_cover_all_items_once() {
        let bq = BlockQueue::new(10, 4);
        assert_eq!(bq.len(), 3);
        let batches: Vec<Range<usize>> = bq.iter().collect();
        assert_eq!(batches, vec![0..4, 4..8, 8..10]);
        assert!(bq.is_empty());
        assert!(bq.next().is_none());
    }

    #[test]
    fn shared_between_threads() {
        let bq = BlockQueue::new(1000, 7);
        let mut counts: Vec<usize> = Vec::new();
        crossbeam::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|_| bq.iter().map(|r| r.len()).sum::<usize>()))
                .collect();
            for h in handles {
                counts.push(h.join().unwrap());
            }
        })
        .unwrap();
        assert_eq!(counts.iter().sum::<usize>(), 1000);
    }

    #[test]
    fn empty_queue() {
        let bq = BlockQueue::new(0, 16);
        assert_eq!(bq.len(), 0);
        assert!(bq.is_empty());
        assert!(bq.iter().next().is_none());
    }
}
