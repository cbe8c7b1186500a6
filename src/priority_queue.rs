use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use log::trace;
use parking_lot::RwLock;

/// An item tracked in the Top-K heap together with its estimated count.
///
/// Equality and hashing look at `item` and `count` only.
#[derive(Debug, Clone)]
pub struct Node {
    pub item: Vec<u8>,
    pub count: u64,
    // sequence number of the update that last wrote `count`
    seq: u64,
}

impl Node {
    pub fn new(item: impl Into<Vec<u8>>, count: u64) -> Self {
        Node {
            item: item.into(),
            count,
            seq: 0,
        }
    }

    /// Heap order: smaller count first; among equal counts the
    /// lexicographically greater item is the smaller node, so it is evicted first.
    #[inline]
    fn less(&self, other: &Self) -> bool {
        self.count < other.count || (self.count == other.count && self.item > other.item)
    }

    /// Ranking order: count descending, ties by item ascending.
    fn rank(a: &Self, b: &Self) -> Ordering {
        b.count.cmp(&a.count).then_with(|| a.item.cmp(&b.item))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.item == other.item && self.count == other.count
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.item.hash(state);
        self.count.hash(state);
    }
}

/// Fixed-capacity binary min-heap of [`Node`]s shared between ingestion workers.
///
/// Lookup by item is a linear scan, which is fine for the small `k` this is
/// used with. Readers (`min`, `find`, `count`, `sorted`) share the lock;
/// mutations take it exclusively.
pub(crate) struct TopKHeap {
    capacity: usize,
    nodes: RwLock<Vec<Node>>,
}

impl TopKHeap {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            nodes: RwLock::new(Vec::with_capacity(capacity)),
        }
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Inserts while below capacity; once full, replaces the minimum only
    /// when `node.count` is strictly greater than it.
    #[cfg(test)]
    pub(crate) fn add(&self, node: Node) {
        let mut nodes = self.nodes.write();
        offer(&mut nodes, self.capacity, node.count, node.seq, || node.item);
    }

    /// Overwrites the count at `index` and restores heap order from there.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[cfg(test)]
    pub(crate) fn fix(&self, index: usize, count: u64) {
        let mut nodes = self.nodes.write();
        let seq = nodes[index].seq;
        fix_at(&mut nodes, index, count, seq);
    }

    /// Minimum tracked count, or 0 when empty. A snapshot: it may be stale by
    /// the time the caller acts on it.
    pub(crate) fn min(&self) -> u64 {
        self.nodes.read().first().map(|node| node.count).unwrap_or(0)
    }

    pub(crate) fn find(&self, item: &[u8]) -> Option<usize> {
        self.nodes.read().iter().position(|node| node.item == item)
    }

    /// Looks up and reads the count under the same lock, so the position
    /// cannot shift between the two.
    pub(crate) fn count(&self, item: &[u8]) -> Option<u64> {
        self.nodes
            .read()
            .iter()
            .find(|node| node.item == item)
            .map(|node| node.count)
    }

    /// Copy of the tracked nodes, count descending, ties by item ascending.
    pub(crate) fn sorted(&self) -> Vec<Node> {
        let mut nodes = self.nodes.read().clone();
        nodes.sort_by(Node::rank);
        nodes
    }

    /// Applies an update engine result: fixes the item in place when it is
    /// tracked, otherwise offers it for admission.
    ///
    /// `hint` is the position observed before the update; it is trusted only
    /// if it still names `item`, since other workers may have moved nodes.
    ///
    /// `seq` orders updates by when they started. A tracked node only takes
    /// counts from updates newer than the one that last wrote it, so a worker
    /// that was preempted mid-update cannot roll back a fresher count.
    pub(crate) fn reconcile(&self, item: &[u8], hint: Option<usize>, count: u64, seq: u64) {
        let mut nodes = self.nodes.write();
        let position = hint
            .filter(|&i| nodes.get(i).is_some_and(|node| node.item == item))
            .or_else(|| nodes.iter().position(|node| node.item == item));
        match position {
            Some(i) if seq > nodes[i].seq => fix_at(&mut nodes, i, count, seq),
            Some(i) => trace!(
                "dropping stale count {} for {:?} (seq {} <= {})",
                count,
                String::from_utf8_lossy(item),
                seq,
                nodes[i].seq
            ),
            None => offer(&mut nodes, self.capacity, count, seq, || item.to_vec()),
        }
    }

    #[cfg(test)]
    pub(crate) fn nodes(&self) -> Vec<Node> {
        self.nodes.read().clone()
    }
}

// The item bytes are only materialised once admission is decided.
fn offer(
    nodes: &mut Vec<Node>,
    capacity: usize,
    count: u64,
    seq: u64,
    item: impl FnOnce() -> Vec<u8>,
) {
    if nodes.len() < capacity {
        nodes.push(Node { item: item(), count, seq });
        let last = nodes.len() - 1;
        sift_up(nodes, last);
    } else if let Some(min) = nodes.first() {
        if count > min.count {
            let node = Node { item: item(), count, seq };
            trace!(
                "evicting {:?} ({}) for {:?} ({})",
                String::from_utf8_lossy(&min.item),
                min.count,
                String::from_utf8_lossy(&node.item),
                node.count
            );
            nodes[0] = node;
            sift_down(nodes, 0);
        }
    }
}

fn fix_at(nodes: &mut [Node], index: usize, count: u64, seq: u64) {
    nodes[index].count = count;
    nodes[index].seq = seq;
    if !sift_down(nodes, index) {
        sift_up(nodes, index);
    }
}

// Binary heap helpers (0-based indexing)
fn parent(i: usize) -> usize {
    (i - 1) >> 1
}

fn left(i: usize) -> usize {
    2 * i + 1
}

fn sift_up(nodes: &mut [Node], mut pos: usize) {
    while pos > 0 {
        let parent = parent(pos);
        if !nodes[pos].less(&nodes[parent]) {
            break;
        }
        nodes.swap(parent, pos);
        pos = parent;
    }
}

/// Returns whether the node moved.
fn sift_down(nodes: &mut [Node], start: usize) -> bool {
    let mut pos = start;
    loop {
        let left = left(pos);
        if left >= nodes.len() {
            break;
        }
        let right = left + 1;
        let mut child = left;
        if right < nodes.len() && nodes[right].less(&nodes[left]) {
            child = right;
        }
        if !nodes[child].less(&nodes[pos]) {
            break;
        }
        nodes.swap(pos, child);
        pos = child;
    }
    pos > start
}
