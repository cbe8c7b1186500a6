use parking_lot::{Mutex, MutexGuard};

/// One counting slot. A zero count marks the slot empty; its fingerprint is
/// only meaningful while the count is positive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bucket {
    fingerprint: u64,
    count: u64,
}

impl Bucket {
    #[inline]
    pub fn get(&self) -> (u64, u64) {
        (self.fingerprint, self.count)
    }

    #[inline]
    pub fn set(&mut self, fingerprint: u64, count: u64) {
        self.fingerprint = fingerprint;
        self.count = count;
    }
}

/// `depth x width` matrix of independently lockable buckets.
///
/// The shape is fixed at construction. Cells are stored row-major in one
/// allocation; each has its own lock so updates touching different cells
/// never contend.
pub(crate) struct BucketArray {
    width: usize,
    depth: usize,
    cells: Box<[Mutex<Bucket>]>,
}

impl BucketArray {
    pub fn new(width: usize, depth: usize) -> Self {
        let cells = (0..width * depth)
            .map(|_| Mutex::new(Bucket::default()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        BucketArray { width, depth, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Locks the bucket at `(row, col)`. The guard must be held across the
    /// whole read-modify-write step applied to the bucket.
    #[inline]
    pub fn lock(&self, row: usize, col: usize) -> MutexGuard<'_, Bucket> {
        debug_assert!(row < self.depth && col < self.width);
        self.cells[row * self.width + col].lock()
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, col: usize) -> (u64, u64) {
        self.lock(row, col).get()
    }

    #[cfg(test)]
    pub fn set(&self, row: usize, col: usize, fingerprint: u64, count: u64) {
        self.lock(row, col).set(fingerprint, count)
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.cells.iter().map(|cell| cell.lock().get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new() {
        let buckets = BucketArray::new(100, 5);
        assert_eq!(buckets.width(), 100);
        assert_eq!(buckets.depth(), 5);
        assert_eq!(buckets.iter().count(), 500);
        assert!(buckets.iter().all(|(_, count)| count == 0));
    }

    #[test]
    fn test_get_set() {
        let buckets = BucketArray::new(4, 3);
        buckets.set(2, 3, 0xdead_beef, 7);
        assert_eq!(buckets.get(2, 3), (0xdead_beef, 7));
        // neighbours in other rows and columns are untouched
        assert_eq!(buckets.get(1, 3), (0, 0));
        assert_eq!(buckets.get(2, 2), (0, 0));
    }

    #[test]
    fn test_locked_read_modify_write() {
        let buckets = Arc::new(BucketArray::new(2, 2));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let buckets = Arc::clone(&buckets);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let mut bucket = buckets.lock(1, 1);
                        let (fingerprint, count) = bucket.get();
                        bucket.set(fingerprint, count + 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(buckets.get(1, 1).1, 8000);
    }
}
