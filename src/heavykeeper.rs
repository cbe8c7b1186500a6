use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info};
use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::decay::{self, DecaySource};
use crate::engine::Estimator;
use crate::error::TopKError;
use crate::priority_queue::Node;

/// Concurrent HeavyKeeper Top-K estimator.
///
/// Items passed to [`add`](TopK::add) are queued and applied by a fixed pool
/// of worker threads. Call [`drain`](TopK::drain) before trusting
/// [`contains`](TopK::contains), [`count`](TopK::count) or
/// [`list`](TopK::list): until then they reflect whatever subset of the
/// submitted items the workers have reached.
///
/// ```
/// use concurrent_heavykeeper::{Config, TopK};
///
/// let topk = TopK::new(Config::new(2, 64, 4, 0.9, 42, 1)).unwrap();
/// for word in ["a", "a", "b", "b", "b"] {
///     topk.add(word).unwrap();
/// }
/// topk.drain();
/// assert_eq!(topk.count("b"), Some(3));
/// ```
pub struct TopK {
    config: Config,
    estimator: Arc<Estimator>,
    sender: RwLock<Option<Sender<Vec<u8>>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl TopK {
    /// Validates `config` and starts the ingestion workers.
    pub fn new(config: Config) -> Result<Self, TopKError> {
        config.validate()?;

        let estimator = Arc::new(Estimator::new(&config));
        let (sender, receiver) = match config.queue_capacity {
            Some(capacity) => crossbeam_channel::bounded(capacity),
            None => crossbeam_channel::unbounded(),
        };

        // dropping `sender` on error closes the queue so already spawned
        // workers exit on their own
        let mut workers = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            let estimator = Arc::clone(&estimator);
            let receiver = receiver.clone();
            let rng = decay::worker_rng(config.rng_seed, id);
            let handle = thread::Builder::new()
                .name(format!("heavykeeper-worker-{}", id))
                .spawn(move || run_worker(id, &estimator, receiver, rng))?;
            workers.push(handle);
        }

        debug!(
            "started {} workers (k={}, width={}, depth={}, decay={})",
            config.workers, config.k, config.width, config.depth, config.decay
        );

        Ok(TopK {
            config,
            estimator,
            sender: RwLock::new(Some(sender)),
            workers: Mutex::new(workers),
        })
    }

    /// Queues one occurrence of `item`. Blocks only when a bounded queue is
    /// full. Fails with [`TopKError::Drained`] once [`drain`](TopK::drain)
    /// has been called.
    pub fn add(&self, item: impl Into<Vec<u8>>) -> Result<(), TopKError> {
        let sender = self.sender.read();
        let sender = sender.as_ref().ok_or(TopKError::Drained)?;
        sender.send(item.into()).map_err(|_| TopKError::Drained)
    }

    /// Closes the queue and waits until every worker has applied the items
    /// queued before the call and exited. Calling it again is a no-op.
    ///
    /// # Panics
    ///
    /// Re-raises the panic of a worker that died while applying an update.
    pub fn drain(&self) {
        drop(self.sender.write().take());

        // held while joining so a concurrent drain also waits for the workers
        let mut workers = self.workers.lock();
        if workers.is_empty() {
            return;
        }
        for handle in workers.drain(..) {
            if let Err(panic) = handle.join() {
                std::panic::resume_unwind(panic);
            }
        }
        info!(
            "drained: {} items applied, {} tracked",
            self.estimator.processed(),
            self.estimator.tracked()
        );
    }

    /// Whether `item` currently holds a Top-K slot.
    pub fn contains(&self, item: impl AsRef<[u8]>) -> bool {
        self.estimator.contains(item.as_ref())
    }

    /// Estimated count of `item` if it holds a Top-K slot.
    pub fn count(&self, item: impl AsRef<[u8]>) -> Option<u64> {
        self.estimator.count(item.as_ref())
    }

    /// Tracked items by count descending; equal counts list the
    /// lexicographically smaller item first.
    pub fn list(&self) -> Vec<Node> {
        self.estimator.list()
    }

    /// Number of items currently holding a Top-K slot.
    pub fn len(&self) -> usize {
        self.estimator.tracked()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items the workers have fully applied so far.
    pub fn processed(&self) -> u64 {
        self.estimator.processed()
    }

    pub fn is_drained(&self) -> bool {
        self.sender.read().is_none()
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    pub fn width(&self) -> usize {
        self.config.width
    }

    pub fn depth(&self) -> usize {
        self.config.depth
    }

    pub fn decay(&self) -> f64 {
        self.config.decay
    }

    pub fn workers(&self) -> usize {
        self.config.workers
    }
}

impl Drop for TopK {
    // Closes the queue without joining; detached workers finish what is
    // queued and exit.
    fn drop(&mut self) {
        self.sender.get_mut().take();
    }
}

fn run_worker<R: DecaySource>(
    id: usize,
    estimator: &Estimator,
    items: Receiver<Vec<u8>>,
    mut rng: R,
) {
    debug!("worker {} started", id);
    let mut applied = 0u64;
    for item in items.iter() {
        estimator.update(&item, &mut rng);
        applied += 1;
    }
    debug!("worker {} exiting after {} items", id, applied);
}
