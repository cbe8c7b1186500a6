use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::Config;
use crate::decay::{self, DecaySource};
use crate::hashing::ItemHasher;
use crate::priority_queue::{Node, TopKHeap};
use crate::sketch::BucketArray;

/// Shared HeavyKeeper state: the bucket array, the Top-K heap and the hash
/// family. Every ingestion worker applies updates to the same `Estimator`.
pub(crate) struct Estimator {
    decay: f64,
    hasher: ItemHasher,
    buckets: BucketArray,
    heap: TopKHeap,
    started: AtomicU64,
    processed: AtomicU64,
}

impl Estimator {
    pub(crate) fn new(config: &Config) -> Self {
        Estimator {
            decay: config.decay,
            hasher: ItemHasher::new(config.seed),
            buckets: BucketArray::new(config.width, config.depth),
            heap: TopKHeap::with_capacity(config.k),
            started: AtomicU64::new(0),
            processed: AtomicU64::new(0),
        }
    }

    /// Applies one occurrence of `item` and returns its estimated count.
    ///
    /// Heap membership and minimum are read once before the rows are
    /// visited and are not re-checked under the bucket locks; a concurrent
    /// update may make them stale. Rows are locked one at a time in
    /// ascending order. The heap keeps the count of whichever update for
    /// `item` started last, even if an older one finishes after it.
    pub(crate) fn update<R: DecaySource + ?Sized>(&self, item: &[u8], rng: &mut R) -> u64 {
        let seq = self.started.fetch_add(1, Ordering::Relaxed) + 1;
        let fingerprint = self.hasher.fingerprint(item);
        let heap_index = self.heap.find(item);
        let heap_min = self.heap.min();
        let tracked = heap_index.is_some();

        let width = self.buckets.width();
        let mut max_count = 0;
        for row in 0..self.buckets.depth() {
            let col = self.hasher.column(item, row, width);
            let mut bucket = self.buckets.lock(row, col);
            let (occupant, count) = bucket.get();

            if count == 0 {
                bucket.set(fingerprint, 1);
                max_count = max_count.max(1);
            } else if occupant == fingerprint {
                // untracked items stop growing once above the heap minimum
                if tracked || count <= heap_min {
                    bucket.set(fingerprint, count + 1);
                    max_count = max_count.max(count + 1);
                }
            } else if rng.draw() < decay::probability(self.decay, count) {
                if count == 1 {
                    // evicted, the slot goes to the arriving item at once
                    bucket.set(fingerprint, 1);
                    max_count = max_count.max(1);
                } else {
                    bucket.set(occupant, count - 1);
                }
            }
        }

        self.heap.reconcile(item, heap_index, max_count, seq);
        self.processed.fetch_add(1, Ordering::Relaxed);
        max_count
    }

    pub(crate) fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub(crate) fn tracked(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn contains(&self, item: &[u8]) -> bool {
        self.heap.find(item).is_some()
    }

    pub(crate) fn count(&self, item: &[u8]) -> Option<u64> {
        self.heap.count(item)
    }

    pub(crate) fn list(&self) -> Vec<Node> {
        self.heap.sorted()
    }
}
