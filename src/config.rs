use crate::error::TopKError;

/// Construction parameters for a [`TopK`](crate::TopK).
///
/// The six parameters taken by [`Config::new`] are required. Queue bound and
/// decay RNG seeding are optional and default to an unbounded queue and
/// OS-seeded generators.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of heavy hitters tracked by the heap.
    pub k: usize,
    /// Buckets per sketch row.
    pub width: usize,
    /// Number of sketch rows.
    pub depth: usize,
    /// Base of the collision decay probability, in `(0, 1]`.
    pub decay: f64,
    /// Selects the hash family used for fingerprints and bucket columns.
    pub seed: u64,
    /// Number of ingestion worker threads.
    pub workers: usize,
    /// Optional bound on the ingestion queue. `None` means unbounded.
    pub queue_capacity: Option<usize>,
    /// Optional seed for the per-worker decay generators.
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn new(
        k: usize,
        width: usize,
        depth: usize,
        decay: f64,
        seed: u64,
        workers: usize,
    ) -> Self {
        Config {
            k,
            width,
            depth,
            decay,
            seed,
            workers,
            queue_capacity: None,
            rng_seed: None,
        }
    }

    /// Bounds the ingestion queue; [`TopK::add`](crate::TopK::add) blocks while it is full.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Seeds worker `i`'s decay generator with `seed + i`.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), TopKError> {
        if self.k == 0 {
            return Err(TopKError::InvalidConfig("k must be greater than 0".into()));
        }
        if self.width == 0 {
            return Err(TopKError::InvalidConfig("width must be greater than 0".into()));
        }
        if self.depth == 0 {
            return Err(TopKError::InvalidConfig("depth must be greater than 0".into()));
        }
        if self.width.checked_mul(self.depth).is_none() {
            return Err(TopKError::InvalidConfig(format!(
                "width * depth overflows ({} * {})",
                self.width, self.depth
            )));
        }
        // written this way so NaN is rejected too
        if !(self.decay > 0.0 && self.decay <= 1.0) {
            return Err(TopKError::InvalidConfig(format!(
                "decay must be in (0, 1], got {}",
                self.decay
            )));
        }
        if self.workers == 0 {
            return Err(TopKError::InvalidConfig("workers must be at least 1".into()));
        }
        if self.queue_capacity == Some(0) {
            return Err(TopKError::InvalidConfig(
                "queue capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config::new(10, 100, 5, 0.9, 42, 2)
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate().is_ok());
        assert!(valid().with_queue_capacity(16).validate().is_ok());
        assert!(Config { decay: 1.0, ..valid() }.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        for config in [
            Config { k: 0, ..valid() },
            Config { width: 0, ..valid() },
            Config { depth: 0, ..valid() },
            Config { workers: 0, ..valid() },
            valid().with_queue_capacity(0),
        ] {
            assert!(matches!(config.validate(), Err(TopKError::InvalidConfig(_))), "{:?}", config);
        }
    }

    #[test]
    fn test_rejects_oversized_sketch() {
        let config = Config { width: usize::MAX, depth: 2, ..valid() };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, TopKError::InvalidConfig(_)));
        assert!(err.to_string().contains("overflows"), "{}", err);
        assert!(Config { width: usize::MAX, depth: 1, ..valid() }.validate().is_ok());
    }

    #[test]
    fn test_rejects_decay_out_of_range() {
        for decay in [0.0, -0.5, 1.0001, f64::NAN, f64::INFINITY] {
            let err = Config { decay, ..valid() }.validate().unwrap_err();
            assert!(err.to_string().contains("decay"), "decay {} gave {}", decay, err);
        }
    }

    #[test]
    fn test_builder_methods() {
        let config = valid().with_queue_capacity(8).with_rng_seed(7);
        assert_eq!(config.queue_capacity, Some(8));
        assert_eq!(config.rng_seed, Some(7));
    }
}
