use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Uniform `[0, 1)` draws used to decide collision decay.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait DecaySource {
    fn draw(&mut self) -> f64;
}

impl DecaySource for SmallRng {
    #[inline]
    fn draw(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Generator for ingestion worker `worker`: derived from `seed` when one is
/// configured, otherwise seeded from the OS.
pub(crate) fn worker_rng(seed: Option<u64>, worker: usize) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(worker as u64)),
        None => SmallRng::from_os_rng(),
    }
}

/// Probability `decay^count` that a colliding occupant loses one unit.
#[inline]
pub(crate) fn probability(decay: f64, count: u64) -> f64 {
    decay.powf(count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability() {
        assert_eq!(probability(0.9, 0), 1.0);
        assert!((probability(0.9, 1) - 0.9).abs() < 1e-12);
        assert!((probability(0.5, 3) - 0.125).abs() < 1e-12);
        assert_eq!(probability(1.0, 1_000_000), 1.0);
        assert!(probability(0.9, 10_000) < 1e-300);
    }

    #[test]
    fn test_draws_in_unit_interval() {
        let mut rng = worker_rng(None, 0);
        for _ in 0..10_000 {
            let x = rng.draw();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_seeded_workers() {
        let a: Vec<f64> = {
            let mut rng = worker_rng(Some(5), 1);
            (0..8).map(|_| rng.draw()).collect()
        };
        let b: Vec<f64> = {
            let mut rng = worker_rng(Some(5), 1);
            (0..8).map(|_| rng.draw()).collect()
        };
        let c: Vec<f64> = {
            let mut rng = worker_rng(Some(5), 2);
            (0..8).map(|_| rng.draw()).collect()
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
