//! # Seeded random source
//!
//! Every Monte Carlo run owns a [`SimRng`] seeded with `base_seed + run
//! index`, which makes runs reproducible and embarrassingly parallel: two
//! invocations with the same seed and identical inputs walk identical
//! uniform streams and therefore produce identical count matrices.
//!
//! ChaCha8 is a high-quality small-state generator; the engine needs
//! reproducibility, not cryptographic strength.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Reproducible uniform source for one Monte Carlo run.
#[derive(Debug, Clone)]
pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    /// RNG seeded directly with a 64-bit seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// RNG for run `run_index` under `base_seed`.
    pub fn for_run(base_seed: u64, run_index: u64) -> Self {
        Self::seeded(base_seed.wrapping_add(run_index))
    }

    /// Uniform sample in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Bernoulli trial with success probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }

    /// Standard Gaussian sample via Box-Muller.
    ///
    /// Both uniforms must be strictly positive for the logarithm; a zero
    /// draw is resampled, which terminates almost surely.
    pub fn gaussian(&mut self) -> f64 {
        let mut u = self.uniform();
        while u <= 0.0 {
            u = self.uniform();
        }
        let mut v = self.uniform();
        while v <= 0.0 {
            v = self.uniform();
        }
        (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use more_asserts::{assert_ge, assert_lt};

    #[test]
    fn uniform_in_unit_interval() {
        let mut rng = SimRng::seeded(7);
        for _ in 0..10_000 {
            let u = rng.uniform();
            assert_ge!(u, 0.0);
            assert_lt!(u, 1.0);
        }
    }

    #[test]
    fn identical_seeds_identical_streams() {
        let mut a = SimRng::seeded(12345);
        let mut b = SimRng::seeded(12345);
        for _ in 0..1000 {
            assert_eq!(a.uniform().to_bits(), b.uniform().to_bits());
        }
    }

    #[test]
    fn run_seeding_is_base_plus_index() {
        let mut direct = SimRng::seeded(100 + 42);
        let mut derived = SimRng::for_run(100, 42);
        assert_eq!(direct.uniform().to_bits(), derived.uniform().to_bits());
    }

    #[test]
    fn gaussian_moments() {
        let mut rng = SimRng::seeded(99);
        let n = 50_000;
        let samples: Vec<f64> = (0..n).map(|_| rng.gaussian()).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.02, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "var {var}");
    }
}
